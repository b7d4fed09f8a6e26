//! The two-stage outer loop.
//!
//! Stage one runs column generation to exhaustion and solves the
//! integer master once, establishing the first incumbent. Stage two
//! repeats: apply the selected soft-fixing strategy, regenerate columns
//! inside the restricted region, undo the fixing, and re-solve the
//! integer master. The adaptive alpha schedule decides when the stage
//! has stopped paying off; a wall-clock limit can cut either stage
//! short.

use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::colgen::{self, CgExit, CgStep};
use crate::error::{Error, Result};
use crate::instance::Instance;
use crate::master::Master;
use crate::model::LpSolver;
use crate::pricing::PricingOracle;
use crate::report::Report;
use crate::schedule::{Schedule, ScheduleSignal};
use crate::soft_fixing::SoftFixing;
use crate::ui::Ui;
use crate::EPSILON;

/// Strategy selection for stage two, decoded from the CLI codes 0-9.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    /// Code 0: plain column generation, one outer iteration.
    NoFixing,
    /// One strategy per iteration (codes 1, 2, 4, 5, 6 and 9).
    Single(SoftFixing),
    /// Code 3: type 3 interleaved with single-step column generation,
    /// re-applied around every fresh relaxation.
    Intensify,
    /// Codes 7 and 8: two strategies back to back, each with its own
    /// regeneration round.
    Sequence(SoftFixing, SoftFixing),
}

impl Selector {
    /// Decode a CLI strategy code.
    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            0 => Ok(Selector::NoFixing),
            1 => Ok(Selector::Single(SoftFixing::Type1)),
            2 => Ok(Selector::Single(SoftFixing::Type2)),
            3 => Ok(Selector::Intensify),
            4 => Ok(Selector::Single(SoftFixing::Type4)),
            5 => Ok(Selector::Single(SoftFixing::Type5)),
            6 => Ok(Selector::Single(SoftFixing::Type6)),
            7 => Ok(Selector::Sequence(SoftFixing::Type4, SoftFixing::Type5)),
            8 => Ok(Selector::Sequence(SoftFixing::Type5, SoftFixing::Type4)),
            9 => Ok(Selector::Single(SoftFixing::Type7)),
            other => Err(Error::Input(format!(
                "unknown soft-fixing code {other}, expected 0-9"
            ))),
        }
    }
}

impl Display for Selector {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Selector::NoFixing => write!(f, "no fixing"),
            Selector::Single(s) => write!(f, "{s}"),
            Selector::Intensify => write!(f, "soft fixing type 3, single-step"),
            Selector::Sequence(a, b) => write!(f, "{a} then {b}"),
        }
    }
}

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Alpha reached its floor without progress.
    ScheduleEnd,
    /// The wall-clock limit fired.
    TimeLimit,
}

impl Display for Termination {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Termination::ScheduleEnd => write!(f, "alpha floor reached"),
            Termination::TimeLimit => write!(f, "time limit"),
        }
    }
}

/// Knobs of a run. `Default` matches the CLI defaults.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Wall-clock limit in seconds over both stages.
    pub time_limit: Option<f64>,
    /// Override for the pricing DP cell budget.
    pub dp_cell_budget: Option<usize>,
    /// Magnitude of the dual perturbation in pricing; 0 disables it.
    pub perturbation: f64,
    /// Seed of the pricing RNG.
    pub seed: u64,
    /// Directory the run report is written into, if any.
    pub report_dir: Option<PathBuf>,
    /// Suppress the styled stdout log.
    pub quiet: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            time_limit: None,
            dp_cell_budget: None,
            perturbation: 0.0,
            seed: 123,
            report_dir: None,
            quiet: false,
        }
    }
}

/// Per-iteration snapshot, printed by the UI and persisted in the
/// report.
#[derive(Debug, Clone, Copy)]
pub struct IterationStats {
    pub k: usize,
    pub relaxation: f64,
    pub best_lb: f64,
    pub rounded: u64,
    pub integer: f64,
    pub best_ip: f64,
    pub columns_added: usize,
    pub total_columns: usize,
}

/// Final result of a run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub termination: Termination,
    pub iterations: usize,
    pub best_lb: f64,
    pub best_ip: f64,
    pub total_columns: usize,
    pub cg_seconds: f64,
    pub sf_seconds: f64,
    pub report_path: Option<PathBuf>,
}

pub struct Orchestrator<S: LpSolver> {
    master: Master<S>,
    oracle: PricingOracle<S>,
    schedule: Schedule,
    selector: Selector,
    config: RunConfig,
    ui: Ui,
    report: Report,
}

impl<S: LpSolver> Orchestrator<S> {
    /// `master_solver` backs the restricted master, `pricing_solver`
    /// the oracle's fallback path; they never share state.
    pub fn new(
        instance: &Instance,
        selector: Selector,
        config: RunConfig,
        master_solver: S,
        pricing_solver: S,
    ) -> Self {
        let mut oracle = PricingOracle::new(instance, pricing_solver, config.seed);
        if let Some(cells) = config.dp_cell_budget {
            oracle = oracle.with_cell_budget(cells);
        }
        if config.perturbation > 0.0 {
            oracle = oracle.with_perturbation(config.perturbation);
        }

        let ui = if config.quiet { Ui::quiet() } else { Ui::new() };

        Orchestrator {
            master: Master::new(instance, master_solver),
            oracle,
            schedule: Schedule::new(),
            selector,
            config,
            ui,
            report: Report::new(instance),
        }
    }

    /// Run both stages to completion and return the summary.
    pub fn solve(mut self) -> Result<RunSummary> {
        let deadline = self
            .config
            .time_limit
            .map(|secs| Instant::now() + Duration::from_secs_f64(secs));

        // Stage one: exhaust CG, then the first incumbent.
        self.ui.phase("Column Generation");
        let cg_start = Instant::now();
        colgen::run_exhaustive(&mut self.master, &mut self.oracle, &self.ui, deadline)?;
        let incumbent = self.master.solve_integer()?;
        self.ui.new_best(incumbent);
        let cg_seconds = cg_start.elapsed().as_secs_f64();
        self.report.stage_one(
            self.master.last_relaxation,
            self.master.rounded,
            incumbent,
            self.master.take_columns_added(),
            self.master.total_columns(),
            cg_seconds,
        );

        // Stage two: soft fixing around the incumbent.
        self.ui.phase("Soft Fixing");
        self.ui.log(&format!("Strategy: {}", self.selector));
        let sf_start = Instant::now();
        let mut termination = Termination::ScheduleEnd;
        let mut k = 0;
        loop {
            k += 1;

            let previous_best = self.master.best_ip;
            let exit = self
                .run_iteration(deadline)
                .map_err(|e| e.with_iteration(k))?;
            if exit == CgExit::Deadline {
                termination = Termination::TimeLimit;
                break;
            }

            let integer = self.master.solve_integer().map_err(|e| e.with_iteration(k))?;
            let improved = integer < previous_best - EPSILON;
            if improved {
                self.ui.new_best(integer);
            }

            let stats = IterationStats {
                k,
                relaxation: self.master.last_relaxation,
                best_lb: self.master.best_lb,
                rounded: self.master.rounded,
                integer,
                best_ip: self.master.best_ip,
                columns_added: self.master.take_columns_added(),
                total_columns: self.master.total_columns(),
            };
            self.ui.iteration(&stats, self.schedule.alpha);
            self.report
                .iteration(stats, self.schedule.alpha, &self.selector.to_string());

            if self.selector == Selector::NoFixing {
                break;
            }
            let signal = self
                .schedule
                .update_alpha(improved, &mut self.master.column_flag);
            if signal == ScheduleSignal::End {
                break;
            }
        }
        let sf_seconds = sf_start.elapsed().as_secs_f64();

        let (best_lb, best_ip) = self.master.bounds_snapshot()?;
        self.ui.times(cg_seconds, sf_seconds);

        self.report
            .finish(best_lb, best_ip, termination, cg_seconds, sf_seconds);
        let report_path = match &self.config.report_dir {
            Some(dir) => Some(self.report.write(dir)?),
            None => None,
        };

        Ok(RunSummary {
            termination,
            iterations: k,
            best_lb,
            best_ip,
            total_columns: self.master.total_columns(),
            cg_seconds,
            sf_seconds,
            report_path,
        })
    }

    /// One stage-two regeneration round for the configured selector.
    /// Every applied fixing is removed before this returns, including
    /// on the deadline path; only solver errors may leave constraints
    /// behind, and those abort the run.
    fn run_iteration(&mut self, deadline: Option<Instant>) -> Result<CgExit> {
        let alpha = self.schedule.alpha;
        match self.selector {
            Selector::NoFixing => {
                colgen::run_exhaustive(&mut self.master, &mut self.oracle, &self.ui, deadline)
            }
            Selector::Single(strategy) => {
                let applied = self.master.apply_soft_fixing(strategy, alpha);
                let exit =
                    colgen::run_exhaustive(&mut self.master, &mut self.oracle, &self.ui, deadline);
                self.master.remove_soft_fixing(applied);
                exit
            }
            Selector::Sequence(first, second) => {
                for strategy in [first, second] {
                    let applied = self.master.apply_soft_fixing(strategy, alpha);
                    let exit = colgen::run_exhaustive(
                        &mut self.master,
                        &mut self.oracle,
                        &self.ui,
                        deadline,
                    );
                    self.master.remove_soft_fixing(applied);
                    if exit? == CgExit::Deadline {
                        return Ok(CgExit::Deadline);
                    }
                }
                Ok(CgExit::Exhausted)
            }
            // Type 3 triggers on the latest primal, so the constraint is
            // rebuilt around every fresh relaxation.
            Selector::Intensify => loop {
                let applied = self.master.apply_soft_fixing(SoftFixing::Type3, alpha);
                let step =
                    colgen::run_single_step(&mut self.master, &mut self.oracle, &self.ui, deadline);
                self.master.remove_soft_fixing(applied);
                match step? {
                    CgStep::ColumnFound => {}
                    CgStep::Exhausted => return Ok(CgExit::Exhausted),
                    CgStep::Deadline => return Ok(CgExit::Deadline),
                }
            },
        }
    }
}

#[cfg(all(test, feature = "highs"))]
mod tests {
    use super::*;
    use crate::solvers::HighsSolver;

    fn run(text: &str, selector: Selector) -> RunSummary {
        let ins = Instance::parse("orc", text).unwrap();
        let config = RunConfig {
            quiet: true,
            ..RunConfig::default()
        };
        Orchestrator::new(&ins, selector, config, HighsSolver::new(), HighsSolver::new())
            .solve()
            .unwrap()
    }

    #[test]
    fn plain_cg_runs_exactly_one_outer_iteration() {
        let summary = run("10\n4 10\n", Selector::NoFixing);
        assert_eq!(summary.iterations, 1);
        assert_eq!(summary.termination, Termination::ScheduleEnd);
        assert!((summary.best_ip - 5.0).abs() < 1e-6);
    }

    #[test]
    fn type5_run_reaches_the_optimum() {
        let summary = run("7\n5 3\n2 4\n", Selector::from_code(5).unwrap());
        assert!((summary.best_ip - 4.0).abs() < 1e-6);
        // the recorded maximum LP objective is the initial restricted
        // master: 3 rolls for the width-5 demand plus 4/3 for width 2
        assert!((summary.best_lb - 13.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn intensify_run_terminates() {
        let summary = run("7\n5 3\n2 4\n", Selector::from_code(3).unwrap());
        assert_eq!(summary.termination, Termination::ScheduleEnd);
        assert!(summary.iterations >= 1);
    }

    #[test]
    fn sequence_codes_decode_in_both_orders() {
        assert_eq!(
            Selector::from_code(7).unwrap(),
            Selector::Sequence(SoftFixing::Type4, SoftFixing::Type5)
        );
        assert_eq!(
            Selector::from_code(8).unwrap(),
            Selector::Sequence(SoftFixing::Type5, SoftFixing::Type4)
        );
        assert!(Selector::from_code(10).is_err());
    }

    #[test]
    fn report_is_written_when_requested() {
        let dir = tempfile::tempdir().unwrap();
        let ins = Instance::parse("rep", "10\n4 10\n").unwrap();
        let config = RunConfig {
            quiet: true,
            report_dir: Some(dir.path().to_path_buf()),
            ..RunConfig::default()
        };
        let summary = Orchestrator::new(
            &ins,
            Selector::from_code(1).unwrap(),
            config,
            HighsSolver::new(),
            HighsSolver::new(),
        )
        .solve()
        .unwrap();

        let path = summary.report_path.expect("report path");
        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.contains("Instance: rep"));
        assert!(text.contains("---- Summary ----"));
    }
}
