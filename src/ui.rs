//! Styled run log on stdout.
//!
//! Single-threaded and synchronous: every event is printed from the
//! orchestrator's own thread of control, so there is no channel or
//! background printer.

use console::{pad_str, pad_str_with, style, Alignment};

use crate::orchestrator::IterationStats;

pub struct Ui {
    enabled: bool,
}

impl Default for Ui {
    fn default() -> Self {
        Ui::new()
    }
}

impl Ui {
    #[must_use]
    pub fn new() -> Self {
        Ui {
            enabled: !cfg!(feature = "disable_ui"),
        }
    }

    /// A silent log, for library callers and tests.
    #[must_use]
    pub fn quiet() -> Self {
        Ui { enabled: false }
    }

    pub fn phase(&self, title: &str) {
        if !self.enabled {
            return;
        }
        println!("{}", pad_str_with("", 30, Alignment::Center, None, '⎯'));
        println!("{}", style(pad_str(title, 30, Alignment::Center, None)).green());
        println!("{}", "⎯".repeat(30));
    }

    pub fn log(&self, msg: &str) {
        if self.enabled {
            println!("{msg}");
        }
    }

    pub fn new_best(&self, obj: f64) {
        if self.enabled {
            println!(
                "{} {}",
                style("Has new best:").black().on_green().bold(),
                style(obj.to_string()).bold()
            );
        }
    }

    /// Pattern usage block printed when a CG run terminates. `usage`
    /// holds `(pattern index, rounded rolls, [(count, width)])` for
    /// every pattern with positive LP value.
    pub fn cg_result(&self, relaxation: f64, rounded: u64, usage: &[(usize, u64, Vec<(u32, f64)>)]) {
        if !self.enabled {
            return;
        }
        println!("{} Result {}", "=".repeat(20), "=".repeat(20));
        for (pattern, rolls, pieces) in usage {
            println!("{rolls:>3} rolls of pattern {pattern}.");
            for (count, width) in pieces {
                println!("\t {count} pieces of size {width}.");
            }
        }
        println!("{}", "=".repeat(48));
        println!("Objective Function Relaxation: {relaxation}");
        println!("Rounding Solution ...");
        println!("Total Rolls Used: {rounded}");
    }

    pub fn iteration(&self, stats: &IterationStats, alpha: f64) {
        if self.enabled {
            println!(
                "{}",
                style(format!(
                    "k=<{}> relax=<{:.6}> lb*=<{:.6}> rounded=<{}> ip=<{}> ip*=<{}> cols=<+{}/{}> alpha=<{:.1}>",
                    stats.k,
                    stats.relaxation,
                    stats.best_lb,
                    stats.rounded,
                    stats.integer,
                    stats.best_ip,
                    stats.columns_added,
                    stats.total_columns,
                    alpha
                ))
                .dim()
            );
        }
    }

    pub fn times(&self, cg_seconds: f64, sf_seconds: f64) {
        if !self.enabled {
            return;
        }
        println!("{}", pad_str_with("Statistics", 30, Alignment::Center, None, '⎯'));
        println!(
            "Column Generation time: {cg_seconds:.4} seconds.\nColumn Generation with Soft Fixing time: {sf_seconds:.4} seconds.\nTotal time: {:.4} seconds.",
            cg_seconds + sf_seconds
        );
        println!("{}", "⎯".repeat(30));
    }
}
