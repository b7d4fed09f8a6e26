//! HiGHS backend.
//!
//! Each call builds a fresh `highs` problem from the [`LinearModel`]
//! description and runs one blocking solve. Rebuilding keeps the
//! backend stateless: constraint removal and domain toggles on the
//! model side never have to be mirrored into vendor handles.

use highs::{HighsModelStatus, RowProblem, Sense as HighsSense};

use crate::error::Result;
use crate::model::{Domain, LinearModel, LpSolver, Relation, Sense, Solution, SolveStatus};

pub struct HighsSolver {
    time_limit: Option<f64>,
}

impl HighsSolver {
    #[must_use]
    pub fn new() -> Self {
        HighsSolver { time_limit: None }
    }

    /// Wall-clock limit per solve, in seconds.
    pub fn set_time_limit(&mut self, seconds: f64) {
        self.time_limit = Some(seconds);
    }
}

impl Default for HighsSolver {
    fn default() -> Self {
        HighsSolver::new()
    }
}

impl LpSolver for HighsSolver {
    fn solve(&mut self, model: &LinearModel) -> Result<Solution> {
        let mut problem = RowProblem::default();

        let cols: Vec<highs::Col> = model
            .vars
            .iter()
            .map(|v| match v.domain {
                Domain::Continuous => problem.add_column(v.objective, v.lower_bound..),
                Domain::Integer => problem.add_integer_column(v.objective, v.lower_bound..),
            })
            .collect();

        for (_, constr) in model.active() {
            let factors: Vec<(highs::Col, f64)> = constr
                .coefficients
                .iter()
                .map(|&(var, coeff)| (cols[var.0 as usize], coeff))
                .collect();
            match constr.relation {
                Relation::GreaterEqual => {
                    problem.add_row(constr.rhs.., factors);
                }
                Relation::LessEqual => {
                    problem.add_row(..=constr.rhs, factors);
                }
                Relation::Equal => {
                    problem.add_row(constr.rhs..=constr.rhs, factors);
                }
            }
        }

        let sense = match model.sense.unwrap_or(Sense::Minimize) {
            Sense::Minimize => HighsSense::Minimise,
            Sense::Maximize => HighsSense::Maximise,
        };

        let mut highs_model = problem.optimise(sense);
        highs_model.set_option("output_flag", false);
        if let Some(seconds) = self.time_limit {
            highs_model.set_option("time_limit", seconds);
        }

        let solved = highs_model.solve();

        let status = match solved.status() {
            HighsModelStatus::Optimal => SolveStatus::Optimal,
            HighsModelStatus::Infeasible => SolveStatus::Infeasible,
            HighsModelStatus::Unbounded | HighsModelStatus::UnboundedOrInfeasible => {
                SolveStatus::Unbounded
            }
            _ => SolveStatus::Other,
        };

        if status != SolveStatus::Optimal {
            return Ok(Solution {
                status,
                objective: f64::NAN,
                primal: Vec::new(),
                dual: Vec::new(),
            });
        }

        let objective = solved.objective_value();
        let solution = solved.get_solution();
        let primal = solution.columns().to_vec();
        // duals are only meaningful for pure LPs
        let dual = if model.has_integer_variables() {
            Vec::new()
        } else {
            solution.dual_rows().to_vec()
        };

        Ok(Solution {
            status,
            objective,
            primal,
            dual,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Domain, LinearModel, Relation, Sense};

    #[test]
    fn solves_a_small_lp_with_duals() {
        // min x0 + x1  s.t.  2 x0 >= 3,  3 x1 >= 4
        let mut model = LinearModel::new(Sense::Minimize);
        let x0 = model.add_variable(Domain::Continuous, 0.0, 1.0);
        let x1 = model.add_variable(Domain::Continuous, 0.0, 1.0);
        model.add_constraint(vec![(x0, 2.0)], Relation::GreaterEqual, 3.0);
        model.add_constraint(vec![(x1, 3.0)], Relation::GreaterEqual, 4.0);

        let sol = HighsSolver::new().solve(&model).unwrap();
        assert_eq!(sol.status, SolveStatus::Optimal);
        assert!((sol.objective - (1.5 + 4.0 / 3.0)).abs() < 1e-6);
        assert!((sol.primal[0] - 1.5).abs() < 1e-6);
        assert!((sol.dual[0] - 0.5).abs() < 1e-6);
        assert!((sol.dual[1] - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn integer_domain_rounds_up() {
        // min x  s.t.  2 x >= 3, x integer  ->  x = 2
        let mut model = LinearModel::new(Sense::Minimize);
        let x = model.add_variable(Domain::Integer, 0.0, 1.0);
        model.add_constraint(vec![(x, 2.0)], Relation::GreaterEqual, 3.0);

        let sol = HighsSolver::new().solve(&model).unwrap();
        assert_eq!(sol.status, SolveStatus::Optimal);
        assert!((sol.primal[0] - 2.0).abs() < 1e-6);
        assert!(sol.dual.is_empty());
    }

    #[test]
    fn reports_infeasible() {
        // x >= 2 and x <= 1
        let mut model = LinearModel::new(Sense::Minimize);
        let x = model.add_variable(Domain::Continuous, 0.0, 1.0);
        model.add_constraint(vec![(x, 1.0)], Relation::GreaterEqual, 2.0);
        model.add_constraint(vec![(x, 1.0)], Relation::LessEqual, 1.0);

        let sol = HighsSolver::new().solve(&model).unwrap();
        assert_eq!(sol.status, SolveStatus::Infeasible);
    }
}
