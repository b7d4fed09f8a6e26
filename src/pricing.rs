//! Bounded-knapsack pricing.
//!
//! Given the coverage duals `pi`, find item counts `y` maximizing
//! `sum(pi_i * y_i)` under `sum(w_i * y_i) <= W`. A knapsack value
//! above `1 + EPSILON` means the corresponding pattern has negative
//! reduced cost in the unit-objective master. The subproblem is solved
//! exactly by dynamic programming over capacity levels whenever the
//! data permits a dense table; otherwise it is handed to the solver
//! interface as a small integer program.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{Error, Result, SolveStage};
use crate::instance::Instance;
use crate::model::{Domain, LinearModel, LpSolver, Relation, Sense, SolveStatus};
use crate::EPSILON;

/// Cells the dense DP table may occupy before the oracle falls back to
/// the solver interface.
const DEFAULT_CELL_BUDGET: usize = 1 << 24;

/// Tolerance for treating capacity and widths as integral.
const INTEGRALITY_TOL: f64 = 1e-9;

pub struct PricingOracle<S: LpSolver> {
    capacity: f64,
    widths: Vec<f64>,
    fallback: S,
    rng: StdRng,
    cell_budget: usize,
    perturbation: f64,
}

impl<S: LpSolver> PricingOracle<S> {
    /// `fallback` is only exercised when the DP table would exceed the
    /// cell budget. The RNG is owned explicitly; there is no
    /// process-wide seed state.
    pub fn new(instance: &Instance, fallback: S, seed: u64) -> Self {
        PricingOracle {
            capacity: instance.capacity,
            widths: instance.widths.clone(),
            fallback,
            rng: StdRng::seed_from_u64(seed),
            cell_budget: DEFAULT_CELL_BUDGET,
            perturbation: 0.0,
        }
    }

    #[must_use]
    pub fn with_cell_budget(mut self, cells: usize) -> Self {
        self.cell_budget = cells;
        self
    }

    /// Additive uniform jitter on the duals, for tie-breaking between
    /// equal-value patterns. Disabled by default.
    #[must_use]
    pub fn with_perturbation(mut self, magnitude: f64) -> Self {
        self.perturbation = magnitude;
        self
    }

    /// Price the duals. `Ok(Some(pattern))` is an improving column;
    /// `Ok(None)` signals exhaustion — no improving column exists.
    pub fn price(&mut self, duals: &[f64]) -> Result<Option<Vec<u32>>> {
        debug_assert_eq!(duals.len(), self.widths.len());

        let prices: Vec<f64> = if self.perturbation > 0.0 {
            duals
                .iter()
                .map(|&pi| pi + self.rng.gen::<f64>() * self.perturbation)
                .collect()
        } else {
            duals.to_vec()
        };

        let (value, pattern) = if let Some(capacity) = self.dense_capacity() {
            self.solve_dp(capacity, &prices)
        } else {
            self.solve_via_fallback(&prices)?
        };

        if value > 1.0 + EPSILON {
            Ok(Some(pattern))
        } else {
            Ok(None)
        }
    }

    /// Dense table size when capacity and widths are integral and the
    /// table fits the budget. Widths must round to at least one unit:
    /// a zero-weight item would let the backtracking loop stall at a
    /// fixed capacity level.
    fn dense_capacity(&self) -> Option<usize> {
        let integral = |v: f64| (v - v.round()).abs() < INTEGRALITY_TOL;
        if !integral(self.capacity)
            || !self.widths.iter().all(|&w| integral(w) && w.round() >= 1.0)
        {
            return None;
        }
        let capacity = self.capacity.round() as usize;
        (capacity + 1 <= self.cell_budget).then_some(capacity)
    }

    /// Unbounded knapsack over capacity levels `0..=capacity`, with
    /// the chosen item recorded per level for backtracking. Items with
    /// non-positive price never enter an optimal solution and are
    /// skipped up front.
    pub(crate) fn solve_dp(&self, capacity: usize, prices: &[f64]) -> (f64, Vec<u32>) {
        const SKIP: usize = usize::MAX;

        let weights: Vec<usize> = self.widths.iter().map(|&w| w.round() as usize).collect();

        let mut best = vec![0.0_f64; capacity + 1];
        let mut choice = vec![SKIP; capacity + 1];

        for level in 1..=capacity {
            best[level] = best[level - 1];
            for (i, &w) in weights.iter().enumerate() {
                if prices[i] > 0.0 && w <= level {
                    let candidate = best[level - w] + prices[i];
                    if candidate > best[level] {
                        best[level] = candidate;
                        choice[level] = i;
                    }
                }
            }
        }

        let mut pattern = vec![0_u32; self.widths.len()];
        let mut level = capacity;
        while level > 0 {
            match choice[level] {
                SKIP => level -= 1,
                item => {
                    pattern[item] += 1;
                    level -= weights[item];
                }
            }
        }

        (best[capacity], pattern)
    }

    /// The knapsack as a small IP on the solver interface: integer
    /// `y_i >= 0`, maximize `sum(pi_i * y_i)`, one capacity row.
    fn solve_via_fallback(&mut self, prices: &[f64]) -> Result<(f64, Vec<u32>)> {
        let mut model = LinearModel::new(Sense::Maximize);
        let vars: Vec<_> = prices
            .iter()
            .map(|&pi| model.add_variable(Domain::Integer, 0.0, pi))
            .collect();
        model.add_constraint(
            vars.iter()
                .zip(&self.widths)
                .map(|(&y, &w)| (y, w))
                .collect(),
            Relation::LessEqual,
            self.capacity,
        );

        let solution = self.fallback.solve(&model)?;
        if solution.status != SolveStatus::Optimal {
            return Err(Error::SolverFailure {
                stage: SolveStage::Pricing,
                iteration: None,
                status: solution.status,
            });
        }

        let pattern = solution.primal.iter().map(|&y| y.round() as u32).collect();
        Ok((solution.objective, pattern))
    }
}
