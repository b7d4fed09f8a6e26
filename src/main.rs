use std::path::PathBuf;
use std::process::exit;

use clap::Parser;

use colgen_softfix::error::Result;
use colgen_softfix::solvers::HighsSolver;
use colgen_softfix::{Instance, Orchestrator, RunConfig, Selector};

/// Column generation with soft fixing for the one-dimensional
/// cutting-stock problem.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Instance file: capacity on the first line, then one
    /// `width demand` pair per line
    instance: PathBuf,

    /// Soft-fixing strategy code:
    /// 0 plain column generation;
    /// 1-2 aggregate / per-item fixing on active variables;
    /// 3 low-value fixing with single-step regeneration;
    /// 4-5 per-item / per-variable fixing on the integer solution;
    /// 6 weighted aggregate fixing;
    /// 7-8 type 4 and type 5 back to back, in either order;
    /// 9 fixing on underused integer variables
    #[arg(value_parser = clap::value_parser!(u8).range(0..=9))]
    soft_type: u8,

    /// Wall-clock limit in seconds
    #[arg(long)]
    time_limit: Option<f64>,

    /// Directory to write the run report into
    #[arg(long)]
    report_dir: Option<PathBuf>,

    /// Seed of the pricing RNG
    #[arg(long, default_value_t = 123)]
    seed: u64,

    /// Magnitude of the dual perturbation in pricing
    #[arg(long, default_value_t = 0.0)]
    perturbation: f64,

    /// Suppress the styled run log
    #[arg(long)]
    quiet: bool,
}

fn run(args: Args) -> Result<()> {
    let instance = Instance::from_path(&args.instance)?;
    let selector = Selector::from_code(args.soft_type)?;
    if !args.quiet {
        print!("{instance}");
    }

    let config = RunConfig {
        time_limit: args.time_limit,
        dp_cell_budget: None,
        perturbation: args.perturbation,
        seed: args.seed,
        report_dir: args.report_dir,
        quiet: args.quiet,
    };

    let mut master_solver = HighsSolver::new();
    let mut pricing_solver = HighsSolver::new();
    if let Some(seconds) = args.time_limit {
        master_solver.set_time_limit(seconds);
        pricing_solver.set_time_limit(seconds);
    }

    let summary =
        Orchestrator::new(&instance, selector, config, master_solver, pricing_solver).solve()?;

    println!(
        "{}: best lower bound {:.6}, best integer {} ({}, {} iterations, {} columns)",
        instance.name,
        summary.best_lb,
        summary.best_ip,
        summary.termination,
        summary.iterations,
        summary.total_columns,
    );
    if let Some(path) = summary.report_path {
        println!("report written to {}", path.display());
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    if let Err(err) = run(args) {
        eprintln!("error: {err}");
        exit(1);
    }
}
