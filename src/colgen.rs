//! The column-generation loop.
//!
//! A two-state machine: while the oracle keeps pricing out improving
//! patterns the loop stays in its pricing state; on exhaustion it
//! terminates, records the relaxation value and the ceiling-rounding
//! heuristic total, and hands control back. Exhaustive mode iterates
//! to the LP optimum of the current (possibly soft-fixed) master;
//! single-step mode runs exactly one iteration and reports whether a
//! column was found, which the Type 3 retry interleaves with
//! constraint re-application.

use std::time::Instant;

use crate::error::Result;
use crate::master::Master;
use crate::model::LpSolver;
use crate::pricing::PricingOracle;
use crate::ui::Ui;
use crate::EPSILON;

/// How an exhaustive CG run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CgExit {
    /// Pricing signalled that no improving column exists.
    Exhausted,
    /// The wall-clock deadline fired before exhaustion.
    Deadline,
}

/// Result of one single-step iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CgStep {
    ColumnFound,
    Exhausted,
    Deadline,
}

/// Run CG until no improving column exists (or the deadline fires).
pub fn run_exhaustive<S: LpSolver, P: LpSolver>(
    master: &mut Master<S>,
    oracle: &mut PricingOracle<P>,
    ui: &Ui,
    deadline: Option<Instant>,
) -> Result<CgExit> {
    loop {
        if deadline_hit(deadline) {
            return Ok(CgExit::Deadline);
        }

        let (_, duals) = master.solve_relaxation()?;
        match oracle.price(&duals)? {
            Some(pattern) => master.add_column(&pattern),
            None => {
                finish(master, ui);
                return Ok(CgExit::Exhausted);
            }
        }
    }
}

/// Run exactly one iteration: solve the relaxation, price once, add
/// the column if one was found.
pub fn run_single_step<S: LpSolver, P: LpSolver>(
    master: &mut Master<S>,
    oracle: &mut PricingOracle<P>,
    ui: &Ui,
    deadline: Option<Instant>,
) -> Result<CgStep> {
    if deadline_hit(deadline) {
        return Ok(CgStep::Deadline);
    }

    let (_, duals) = master.solve_relaxation()?;
    match oracle.price(&duals)? {
        Some(pattern) => {
            master.add_column(&pattern);
            Ok(CgStep::ColumnFound)
        }
        None => {
            finish(master, ui);
            Ok(CgStep::Exhausted)
        }
    }
}

fn deadline_hit(deadline: Option<Instant>) -> bool {
    deadline.is_some_and(|d| Instant::now() > d)
}

/// Termination bookkeeping: record the relaxation value, compute the
/// ceiling-rounding total and print the pattern usage block.
fn finish<S: LpSolver>(master: &mut Master<S>, ui: &Ui) {
    master.last_relaxation = master.lb;
    let rounded = master.compute_rounded();

    let usage: Vec<(usize, u64, Vec<(u32, f64)>)> = master
        .last_primal()
        .iter()
        .enumerate()
        .filter(|&(_, &x)| x > EPSILON)
        .map(|(j, &x)| {
            let pieces = master
                .pattern_matrix()
                .pattern(j)
                .iter()
                .enumerate()
                .filter(|&(_, &count)| count > 0)
                .map(|(i, &count)| (count, master.instance().widths[i]))
                .collect();
            (j, x.ceil() as u64, pieces)
        })
        .collect();

    ui.cg_result(master.last_relaxation, rounded, &usage);
}
