//! Plain-text run report.
//!
//! One file per run, `Report_<instance>.txt`, collecting the instance
//! header, the pure column-generation stage, one line per soft-fixing
//! iteration and a closing summary. The report is accumulated in memory
//! and written once at the end of the run, so an aborted run leaves no
//! partial file behind.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::instance::Instance;
use crate::orchestrator::{IterationStats, Termination};

pub struct Report {
    instance: String,
    capacity: f64,
    items: usize,
    total_demand: f64,
    stage_one: Option<StageOne>,
    iterations: Vec<IterationLine>,
    summary: Option<Summary>,
}

struct StageOne {
    relaxation: f64,
    rounded: u64,
    integer: f64,
    columns_added: usize,
    total_columns: usize,
    seconds: f64,
}

struct IterationLine {
    stats: IterationStats,
    alpha: f64,
    strategy: String,
}

struct Summary {
    best_lb: f64,
    best_ip: f64,
    termination: Termination,
    cg_seconds: f64,
    sf_seconds: f64,
}

impl Report {
    #[must_use]
    pub fn new(instance: &Instance) -> Self {
        Report {
            instance: instance.name.clone(),
            capacity: instance.capacity,
            items: instance.num_items(),
            total_demand: instance.demands.iter().sum(),
            stage_one: None,
            iterations: Vec::new(),
            summary: None,
        }
    }

    pub fn stage_one(
        &mut self,
        relaxation: f64,
        rounded: u64,
        integer: f64,
        columns_added: usize,
        total_columns: usize,
        seconds: f64,
    ) {
        self.stage_one = Some(StageOne {
            relaxation,
            rounded,
            integer,
            columns_added,
            total_columns,
            seconds,
        });
    }

    pub fn iteration(&mut self, stats: IterationStats, alpha: f64, strategy: &str) {
        self.iterations.push(IterationLine {
            stats,
            alpha,
            strategy: strategy.to_owned(),
        });
    }

    pub fn finish(
        &mut self,
        best_lb: f64,
        best_ip: f64,
        termination: Termination,
        cg_seconds: f64,
        sf_seconds: f64,
    ) {
        self.summary = Some(Summary {
            best_lb,
            best_ip,
            termination,
            cg_seconds,
            sf_seconds,
        });
    }

    /// Write `Report_<instance>.txt` into `dir` and return its path.
    pub fn write(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(format!("Report_{}.txt", self.instance));
        let mut out = BufWriter::new(File::create(&path)?);

        writeln!(out, "Instance: {}", self.instance)?;
        writeln!(out, "Capacity: {}", self.capacity)?;
        writeln!(out, "Items: {}", self.items)?;
        writeln!(out, "Total demand: {}", self.total_demand)?;

        if let Some(stage) = &self.stage_one {
            writeln!(out)?;
            writeln!(out, "---- Column Generation ----")?;
            writeln!(out, "Relaxation: {:.6}", stage.relaxation)?;
            writeln!(out, "Rounded: {}", stage.rounded)?;
            writeln!(out, "Integer: {}", stage.integer)?;
            writeln!(
                out,
                "Columns: +{}/{}",
                stage.columns_added, stage.total_columns
            )?;
            writeln!(out, "Time: {:.4} s", stage.seconds)?;
        }

        if !self.iterations.is_empty() {
            writeln!(out)?;
            writeln!(out, "---- Soft Fixing ----")?;
            for line in &self.iterations {
                let s = &line.stats;
                writeln!(
                    out,
                    "k={} strategy=<{}> alpha={:.1} relax={:.6} lb*={:.6} rounded={} ip={} ip*={} cols=+{}/{}",
                    s.k,
                    line.strategy,
                    line.alpha,
                    s.relaxation,
                    s.best_lb,
                    s.rounded,
                    s.integer,
                    s.best_ip,
                    s.columns_added,
                    s.total_columns,
                )?;
            }
        }

        if let Some(summary) = &self.summary {
            writeln!(out)?;
            writeln!(out, "---- Summary ----")?;
            writeln!(out, "Best LB: {:.6}", summary.best_lb)?;
            writeln!(out, "Best IP: {}", summary.best_ip)?;
            writeln!(out, "Termination: {}", summary.termination)?;
            writeln!(out, "CG time: {:.4} s", summary.cg_seconds)?;
            writeln!(out, "SF time: {:.4} s", summary.sf_seconds)?;
            writeln!(
                out,
                "Total time: {:.4} s",
                summary.cg_seconds + summary.sf_seconds
            )?;
        }

        out.flush()?;
        Ok(path)
    }
}
