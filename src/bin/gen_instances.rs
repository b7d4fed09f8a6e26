use std::path::PathBuf;
use std::process::exit;

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;

use colgen_softfix::error::Result;
use colgen_softfix::generator;

/// Generate the benchmark instance grid: every combination of item
/// count, mean demand and width distribution, 100 files in total.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Output directory; created if missing
    #[arg(long, default_value = "instances")]
    out: PathBuf,

    /// RNG seed
    #[arg(long, default_value_t = 123)]
    seed: u64,
}

fn run(args: Args) -> Result<()> {
    std::fs::create_dir_all(&args.out)?;

    let mut rng = StdRng::seed_from_u64(args.seed);
    let grid = generator::generate_grid(&mut rng);
    let count = grid.len();
    for instance in &grid {
        generator::write_instance(instance, &args.out)?;
    }

    println!("wrote {count} instances to {}", args.out.display());
    Ok(())
}

fn main() {
    let args = Args::parse();
    if let Err(err) = run(args) {
        eprintln!("error: {err}");
        exit(1);
    }
}
