//! The seven soft-fixing strategies.
//!
//! Each strategy injects transient constraints that bias the next CG
//! round toward the neighborhood of the previous solution, trading
//! diversification for intensification. The constraints live on a
//! handle stack: `remove` deletes exactly the handles `apply`
//! returned, newest first, so the constraint space of the master never
//! drifts.

use std::fmt::{Display, Formatter};

use crate::master::Master;
use crate::model::{ConstrId, LpSolver, Relation, VarId};

/// Strategy tags. `Type1`/`Type2`/`Type3`/`Type6` trigger on the most
/// recent solve's primal values; `Type4`/`Type5`/`Type7` trigger on
/// the last integer solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoftFixing {
    /// Keep the aggregate usage of currently active variables at an
    /// alpha fraction of its value.
    Type1,
    /// Per item: active-variable count must cover an alpha fraction of
    /// the item's demand.
    Type2,
    /// Keep an `(1 - alpha)` fraction of the barely-used variables;
    /// paired with single-step CG by the orchestrator.
    Type3,
    /// Per item: patterns active in the last IP solution must keep an
    /// alpha fraction of their coverage contribution.
    Type4,
    /// Per active IP variable: a direct lower bound at an alpha
    /// fraction of its integer value.
    Type5,
    /// One aggregate constraint over LP-active patterns, weighted by
    /// pattern coefficients.
    Type6,
    /// Per item: patterns underused in the last IP solution must keep
    /// a `(1 - alpha)` fraction of their contribution.
    Type7,
}

impl Display for SoftFixing {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let k = match self {
            SoftFixing::Type1 => 1,
            SoftFixing::Type2 => 2,
            SoftFixing::Type3 => 3,
            SoftFixing::Type4 => 4,
            SoftFixing::Type5 => 5,
            SoftFixing::Type6 => 6,
            SoftFixing::Type7 => 7,
        };
        write!(f, "soft fixing type {k}")
    }
}

/// Receipt for one applied strategy: the constraint handles it added,
/// in insertion order. Must be handed back to
/// [`Master::remove_soft_fixing`] before the next strategy or the next
/// outer iteration touches the model.
#[derive(Debug)]
pub struct AppliedFixing {
    pub strategy: SoftFixing,
    handles: Vec<ConstrId>,
}

impl AppliedFixing {
    #[must_use]
    pub fn num_constraints(&self) -> usize {
        self.handles.len()
    }
}

impl<S: LpSolver> Master<S> {
    /// Apply one strategy around the previous solution with intensity
    /// `alpha`, returning the handles to undo it.
    pub fn apply_soft_fixing(&mut self, strategy: SoftFixing, alpha: f64) -> AppliedFixing {
        let handles = match strategy {
            SoftFixing::Type1 => self.apply_type1(alpha),
            SoftFixing::Type2 => self.apply_type2(alpha),
            SoftFixing::Type3 => self.apply_type3(alpha),
            SoftFixing::Type4 => self.apply_type4(alpha),
            SoftFixing::Type5 => self.apply_type5(alpha),
            SoftFixing::Type6 => self.apply_type6(alpha),
            SoftFixing::Type7 => self.apply_type7(alpha),
        };
        AppliedFixing { strategy, handles }
    }

    /// Remove exactly the constraints the paired apply added, newest
    /// first.
    pub fn remove_soft_fixing(&mut self, applied: AppliedFixing) {
        for handle in applied.handles.into_iter().rev() {
            self.model.remove_constraint(handle);
        }
    }

    /// Variables whose latest primal value satisfies `predicate`.
    fn triggered(&self, predicate: impl Fn(f64) -> bool) -> Vec<(usize, f64)> {
        self.last_primal
            .iter()
            .copied()
            .enumerate()
            .filter(|&(_, x)| predicate(x))
            .collect()
    }

    fn apply_type1(&mut self, alpha: f64) -> Vec<ConstrId> {
        let triggered = self.triggered(|x| x > 0.5);
        let value: f64 = triggered.iter().map(|&(_, x)| x).sum();
        let coefficients: Vec<(VarId, f64)> =
            triggered.iter().map(|&(j, _)| (self.vars[j], 1.0)).collect();
        vec![self.model.add_constraint(
            coefficients,
            Relation::GreaterEqual,
            (alpha * value).ceil(),
        )]
    }

    fn apply_type2(&mut self, alpha: f64) -> Vec<ConstrId> {
        let triggered = self.triggered(|x| x > 0.5);
        let coefficients: Vec<(VarId, f64)> =
            triggered.iter().map(|&(j, _)| (self.vars[j], 1.0)).collect();
        (0..self.instance.num_items())
            .map(|i| {
                self.model.add_constraint(
                    coefficients.clone(),
                    Relation::GreaterEqual,
                    (alpha * self.instance.demands[i]).ceil(),
                )
            })
            .collect()
    }

    fn apply_type3(&mut self, alpha: f64) -> Vec<ConstrId> {
        let triggered = self.triggered(|x| x < 0.3);
        let value: f64 = triggered.iter().map(|&(_, x)| x).sum();
        let coefficients: Vec<(VarId, f64)> =
            triggered.iter().map(|&(j, _)| (self.vars[j], 1.0)).collect();
        let beta = 1.0 - alpha;
        vec![self.model.add_constraint(
            coefficients,
            Relation::GreaterEqual,
            (beta * value).ceil(),
        )]
    }

    fn apply_type4(&mut self, alpha: f64) -> Vec<ConstrId> {
        let active: Vec<usize> = (0..self.x_ip.len()).filter(|&j| self.x_ip[j] > 0.5).collect();
        (0..self.instance.num_items())
            .map(|i| {
                let mut coefficients = Vec::new();
                let mut rhs = 0.0;
                for &j in &active {
                    let count = self.patterns.entry(i, j);
                    if count > 0 {
                        coefficients.push((self.vars[j], f64::from(count)));
                    }
                    rhs += f64::from(count) * self.x_ip[j];
                }
                self.model
                    .add_constraint(coefficients, Relation::GreaterEqual, (alpha * rhs).ceil())
            })
            .collect()
    }

    fn apply_type5(&mut self, alpha: f64) -> Vec<ConstrId> {
        (0..self.x_ip.len())
            .filter(|&j| self.x_ip[j] > 0.5)
            .map(|j| {
                self.model.add_constraint(
                    vec![(self.vars[j], 1.0)],
                    Relation::GreaterEqual,
                    (alpha * self.x_ip[j]).ceil(),
                )
            })
            .collect()
    }

    fn apply_type6(&mut self, alpha: f64) -> Vec<ConstrId> {
        let triggered = self.triggered(|x| x > 0.3);
        let mut coefficients = Vec::new();
        let mut rhs = 0.0;
        for &(j, x) in &triggered {
            let weight: f64 = (0..self.instance.num_items())
                .map(|i| f64::from(self.patterns.entry(i, j)))
                .sum();
            coefficients.push((self.vars[j], weight));
            rhs += weight * x;
        }
        vec![self
            .model
            .add_constraint(coefficients, Relation::GreaterEqual, (alpha * rhs).ceil())]
    }

    fn apply_type7(&mut self, alpha: f64) -> Vec<ConstrId> {
        let underused: Vec<usize> = (0..self.x_ip.len()).filter(|&j| self.x_ip[j] < 0.2).collect();
        let beta = 1.0 - alpha;
        (0..self.instance.num_items())
            .map(|i| {
                let mut coefficients = Vec::new();
                let mut rhs = 0.0;
                for &j in &underused {
                    let count = self.patterns.entry(i, j);
                    if count > 0 {
                        coefficients.push((self.vars[j], f64::from(count)));
                    }
                    rhs += f64::from(count) * self.x_ip[j];
                }
                self.model
                    .add_constraint(coefficients, Relation::GreaterEqual, (beta * rhs).ceil())
            })
            .collect()
    }
}

#[cfg(all(test, feature = "highs"))]
mod tests {
    use super::*;
    use crate::instance::Instance;
    use crate::solvers::HighsSolver;

    fn solved_master() -> Master<HighsSolver> {
        let ins = Instance::parse("sf", "10\n5 3\n3 4\n").unwrap();
        let mut master = Master::new(&ins, HighsSolver::new());
        master.solve_integer().unwrap();
        master
    }

    #[test]
    fn apply_remove_restores_constraint_count() {
        let mut master = solved_master();
        let before = master.constraint_count();

        for strategy in [
            SoftFixing::Type1,
            SoftFixing::Type2,
            SoftFixing::Type3,
            SoftFixing::Type4,
            SoftFixing::Type5,
            SoftFixing::Type6,
            SoftFixing::Type7,
        ] {
            let applied = master.apply_soft_fixing(strategy, 0.9);
            assert!(master.constraint_count() >= before, "{strategy}");
            master.remove_soft_fixing(applied);
            assert_eq!(master.constraint_count(), before, "{strategy}");
        }
    }

    #[test]
    fn per_item_variants_add_one_constraint_per_item() {
        let mut master = solved_master();
        for strategy in [SoftFixing::Type2, SoftFixing::Type4, SoftFixing::Type7] {
            let applied = master.apply_soft_fixing(strategy, 0.9);
            assert_eq!(applied.num_constraints(), 2, "{strategy}");
            master.remove_soft_fixing(applied);
        }
    }

    #[test]
    fn type5_adds_one_constraint_per_active_variable() {
        let mut master = solved_master();
        // baseline IP: x0 = 2 (2x0 >= 3), x1 = 2 (3x1 >= 4), both active
        let applied = master.apply_soft_fixing(SoftFixing::Type5, 0.9);
        assert_eq!(applied.num_constraints(), 2);
        master.remove_soft_fixing(applied);
    }

    #[test]
    fn type5_keeps_integer_solution_feasible() {
        let mut master = solved_master();
        let z_before = master.z_ip;
        let applied = master.apply_soft_fixing(SoftFixing::Type5, 0.9);
        // the previous integer solution satisfies its own fixing, so
        // the restricted model stays solvable at the same objective
        let z_after = master.solve_integer().unwrap();
        assert!((z_after - z_before).abs() < 1e-6);
        master.remove_soft_fixing(applied);
    }

    #[test]
    fn interleaved_strategies_unwind_cleanly() {
        let mut master = solved_master();
        let before = master.constraint_count();
        let first = master.apply_soft_fixing(SoftFixing::Type4, 0.9);
        let second = master.apply_soft_fixing(SoftFixing::Type5, 0.8);
        master.remove_soft_fixing(second);
        master.remove_soft_fixing(first);
        assert_eq!(master.constraint_count(), before);
    }
}
