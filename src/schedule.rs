//! Adaptive annealing of the soft-fixing intensity.

use crate::EPSILON;

/// Outcome of a schedule update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleSignal {
    Continue,
    /// The parameter hit its floor without progress; the outer loop
    /// terminates. This is the sole termination condition of the
    /// soft-fixing stage.
    End,
}

/// Alpha/beta annealing state. Alpha controls how strongly a
/// soft-fixing round restricts the neighborhood; it is reset to 0.9 on
/// progress and stepped down by 0.1 otherwise, guaranteeing at most
/// eight decrements between improvements.
#[derive(Debug, Clone)]
pub struct Schedule {
    pub alpha: f64,
    pub beta: f64,
}

impl Default for Schedule {
    fn default() -> Self {
        Schedule::new()
    }
}

impl Schedule {
    #[must_use]
    pub fn new() -> Self {
        Schedule {
            alpha: 0.9,
            beta: 20.0,
        }
    }

    /// Update alpha after an outer iteration's integer solve.
    ///
    /// An improved incumbent resets alpha. Otherwise a still-raised
    /// `column_flag` (the soft-fixing round discovered a pattern)
    /// resets alpha and consumes the flag. Failing both, alpha steps
    /// down until its floor, then signals `End`. The flag is left
    /// untouched on the improvement path, exactly as in the reference
    /// behavior.
    pub fn update_alpha(&mut self, improved: bool, column_flag: &mut bool) -> ScheduleSignal {
        if improved {
            self.alpha = 0.9;
            ScheduleSignal::Continue
        } else if *column_flag {
            self.alpha = 0.9;
            *column_flag = false;
            ScheduleSignal::Continue
        } else if self.alpha > 0.1 + EPSILON {
            self.alpha -= 0.1;
            ScheduleSignal::Continue
        } else {
            ScheduleSignal::End
        }
    }

    /// Alternate annealing schedule over beta (20 down to 2, step 1,
    /// reset on improvement). Defined by the original design but not
    /// wired into the outer loop; kept as the documented alternate
    /// strategy.
    pub fn update_beta(&mut self, improved: bool) -> ScheduleSignal {
        if improved {
            self.beta = 20.0;
            ScheduleSignal::Continue
        } else if self.beta > 2.0 {
            self.beta -= 1.0;
            ScheduleSignal::Continue
        } else {
            ScheduleSignal::End
        }
    }
}
