// Problem family adapted from https://www2.imm.dtu.dk/courses/02717/columngeneration/columngeneration.pdf
#![cfg(feature = "highs")]

use colgen_softfix::solvers::HighsSolver;
use colgen_softfix::{Instance, Orchestrator, RunConfig, RunSummary, Selector, Termination};

fn solve(text: &str, code: u8) -> RunSummary {
    solve_with(text, code, RunConfig {
        quiet: true,
        ..RunConfig::default()
    })
}

fn solve_with(text: &str, code: u8, config: RunConfig) -> RunSummary {
    let instance = Instance::parse("test", text).unwrap();
    let selector = Selector::from_code(code).unwrap();
    Orchestrator::new(
        &instance,
        selector,
        config,
        HighsSolver::new(),
        HighsSolver::new(),
    )
    .solve()
    .unwrap()
}

// Ten pieces of width 4 on rolls of width 10: two per roll, five
// rolls. The single trivial pattern is already optimal, so pricing
// terminates on the first call.
#[test]
fn single_item_needs_no_generated_column() {
    let summary = solve("10\n4 10\n", 5);
    assert_eq!(summary.total_columns, 1);
    assert!((summary.best_ip - 5.0).abs() < 1e-6);
    assert!((summary.best_lb - 5.0).abs() < 1e-6);
    assert_eq!(summary.termination, Termination::ScheduleEnd);
}

// Widths 5 and 3 on rolls of width 10: the coverage duals are 1/2 and
// 1/3, and no pattern packs a knapsack value above 1. Pricing never
// generates a column and the trivial patterns alone give 4 rolls.
#[test]
fn balanced_duals_price_out_nothing() {
    let summary = solve("10\n5 3\n3 4\n", 1);
    assert_eq!(summary.total_columns, 2);
    assert!((summary.best_ip - 4.0).abs() < 1e-6);
}

// Widths 5 and 2 on rolls of width 7: the initial duals 1 and 1/3
// make the mixed pattern (1, 1) worth 4/3, so generation kicks in.
// Three rolls cannot carry the 23 units of demand, so 4 is optimal.
#[test]
fn mixed_pattern_improves_the_master() {
    let summary = solve("7\n5 3\n2 4\n", 1);
    assert!(summary.total_columns > 2);
    assert!((summary.best_ip - 4.0).abs() < 1e-6);
}

// Strategy code 0 disables soft fixing entirely: one outer iteration,
// then the run ends regardless of the alpha schedule.
#[test]
fn plain_column_generation_stops_after_one_iteration() {
    let summary = solve("7\n5 3\n2 4\n", 0);
    assert_eq!(summary.iterations, 1);
    assert_eq!(summary.termination, Termination::ScheduleEnd);
}

#[test]
fn every_strategy_code_reaches_the_optimum() {
    for code in 0..=9 {
        let summary = solve("7\n5 3\n2 4\n", code);
        assert_eq!(
            summary.termination,
            Termination::ScheduleEnd,
            "code {code}"
        );
        assert!(
            (summary.best_ip - 4.0).abs() < 1e-6,
            "code {code}: best_ip {}",
            summary.best_ip
        );
        // the converged relaxation is 10/3; the recorded maximum over
        // all restricted LPs can only exceed it
        assert!(
            summary.best_lb >= 10.0 / 3.0 - 1e-6,
            "code {code}: best_lb {}",
            summary.best_lb
        );
        assert!(summary.total_columns >= 2, "code {code}");
    }
}

#[test]
fn three_item_instance_solves_under_every_strategy() {
    // total demand width is 71 on rolls of 13, so no strategy can do
    // better than 6 rolls; the trivial patterns plus the priced-out
    // (2, 1, 0) pattern already give 7
    let text = "13\n4 7\n5 5\n6 3\n";
    for code in 0..=9 {
        let summary = solve(text, code);
        assert_eq!(summary.termination, Termination::ScheduleEnd, "code {code}");
        assert!(
            summary.best_ip >= 6.0 - 1e-6 && summary.best_ip <= 7.0 + 1e-6,
            "code {code}: best_ip {}",
            summary.best_ip
        );
    }
}

// One `key=value` token out of a report iteration line.
fn report_field(line: &str, key: &str) -> f64 {
    line.split_whitespace()
        .find_map(|token| token.strip_prefix(key))
        .unwrap_or_else(|| panic!("missing {key} in {line:?}"))
        .parse()
        .unwrap()
}

#[test]
fn bound_records_are_monotone_across_iterations() {
    let dir = tempfile::tempdir().unwrap();
    let summary = solve_with(
        "13\n4 7\n5 5\n6 3\n",
        5,
        RunConfig {
            quiet: true,
            report_dir: Some(dir.path().to_path_buf()),
            ..RunConfig::default()
        },
    );
    let text = std::fs::read_to_string(summary.report_path.expect("report path")).unwrap();

    let iterations: Vec<&str> = text.lines().filter(|l| l.starts_with("k=")).collect();
    assert!(
        iterations.len() >= 2,
        "expected several soft-fixing iterations, got {}",
        iterations.len()
    );

    let mut prev_lb = f64::NEG_INFINITY;
    let mut prev_ip = f64::INFINITY;
    for line in iterations {
        let lb = report_field(line, "lb*=");
        let ip = report_field(line, "ip*=");
        assert!(lb >= prev_lb, "lb* dropped from {prev_lb} to {lb}: {line}");
        assert!(ip <= prev_ip, "ip* rose from {prev_ip} to {ip}: {line}");
        prev_lb = lb;
        prev_ip = ip;
    }
}

#[test]
fn report_and_time_limit_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let summary = solve_with(
        "7\n5 3\n2 4\n",
        5,
        RunConfig {
            quiet: true,
            time_limit: Some(60.0),
            report_dir: Some(dir.path().to_path_buf()),
            ..RunConfig::default()
        },
    );
    assert_eq!(summary.termination, Termination::ScheduleEnd);

    let path = summary.report_path.expect("report path");
    let text = std::fs::read_to_string(path).unwrap();
    assert!(text.contains("Instance: test"));
    assert!(text.contains("---- Column Generation ----"));
    assert!(text.contains("---- Soft Fixing ----"));
    assert!(text.contains("---- Summary ----"));
}

#[test]
fn generated_instances_are_accepted_end_to_end() {
    use colgen_softfix::generator::{self, WidthDistribution};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    let mut rng = StdRng::seed_from_u64(123);
    let instance = generator::generate(10, 10, WidthDistribution::Quarter, &mut rng);

    let dir = tempfile::tempdir().unwrap();
    let path = generator::write_instance(&instance, dir.path()).unwrap();
    let parsed = Instance::from_path(&path).unwrap();

    let summary = Orchestrator::new(
        &parsed,
        Selector::from_code(5).unwrap(),
        RunConfig {
            quiet: true,
            time_limit: Some(60.0),
            ..RunConfig::default()
        },
        HighsSolver::new(),
        HighsSolver::new(),
    )
    .solve()
    .unwrap();

    assert!(summary.best_ip.is_finite());
    assert!(summary.best_ip >= 1.0);
}
