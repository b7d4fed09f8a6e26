//! The abstract linear model handed to a solver backend.
//!
//! The master problem never talks to a vendor crate directly; it edits
//! a [`LinearModel`] through stable handles and asks an [`LpSolver`]
//! for an optimum. A backend treats every call as a blocking,
//! synchronous black-box solve.

use crate::error::Result;

/// Variable handle. Equals the insertion index of the variable and
/// stays valid for the lifetime of the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VarId(pub u32);

/// Constraint handle. Handles stay valid across removals of other
/// constraints: slots are tombstoned rather than shifted, so there is
/// no index drift when transient constraints come and go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConstrId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    Continuous,
    Integer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    LessEqual,
    GreaterEqual,
    Equal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Minimize,
    Maximize,
}

#[derive(Debug, Clone)]
pub(crate) struct VarSpec {
    pub domain: Domain,
    pub lower_bound: f64,
    pub objective: f64,
}

#[derive(Debug, Clone)]
pub(crate) struct ConstrSpec {
    pub coefficients: Vec<(VarId, f64)>,
    pub relation: Relation,
    pub rhs: f64,
}

/// In-memory description of an LP/IP. Grows variables and constraints,
/// supports removing constraints by handle and toggling variable
/// domains without re-solving.
#[derive(Debug, Clone, Default)]
pub struct LinearModel {
    pub(crate) sense: Option<Sense>,
    pub(crate) vars: Vec<VarSpec>,
    pub(crate) constrs: Vec<Option<ConstrSpec>>,
    active_constrs: usize,
}

impl LinearModel {
    #[must_use]
    pub fn new(sense: Sense) -> Self {
        LinearModel {
            sense: Some(sense),
            vars: Vec::new(),
            constrs: Vec::new(),
            active_constrs: 0,
        }
    }

    pub fn add_variable(&mut self, domain: Domain, lower_bound: f64, objective: f64) -> VarId {
        self.vars.push(VarSpec {
            domain,
            lower_bound,
            objective,
        });
        VarId((self.vars.len() - 1) as u32)
    }

    pub fn add_constraint(
        &mut self,
        coefficients: Vec<(VarId, f64)>,
        relation: Relation,
        rhs: f64,
    ) -> ConstrId {
        self.constrs.push(Some(ConstrSpec {
            coefficients,
            relation,
            rhs,
        }));
        self.active_constrs += 1;
        ConstrId((self.constrs.len() - 1) as u32)
    }

    /// Remove a constraint. Removing twice is a caller bug; the LIFO
    /// discipline of the soft-fixing stack guarantees it cannot happen
    /// there.
    pub fn remove_constraint(&mut self, id: ConstrId) {
        let slot = &mut self.constrs[id.0 as usize];
        assert!(slot.is_some(), "constraint {id:?} removed twice");
        *slot = None;
        self.active_constrs -= 1;
    }

    /// Give an existing constraint a coefficient for a (typically
    /// freshly added) variable. This is how a generated column enters
    /// the coverage rows.
    pub fn add_coefficient(&mut self, constr: ConstrId, var: VarId, coefficient: f64) {
        let slot = self.constrs[constr.0 as usize]
            .as_mut()
            .expect("coefficient added to removed constraint");
        slot.coefficients.push((var, coefficient));
    }

    pub fn set_variable_domain(&mut self, id: VarId, domain: Domain) {
        self.vars[id.0 as usize].domain = domain;
    }

    #[must_use]
    pub fn num_variables(&self) -> usize {
        self.vars.len()
    }

    /// Number of live (non-removed) constraints.
    #[must_use]
    pub fn num_constraints(&self) -> usize {
        self.active_constrs
    }

    #[must_use]
    pub fn has_integer_variables(&self) -> bool {
        self.vars.iter().any(|v| v.domain == Domain::Integer)
    }

    /// Live constraints in ascending handle order, with their handles.
    pub(crate) fn active(&self) -> impl Iterator<Item = (ConstrId, &ConstrSpec)> {
        self.constrs
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.as_ref().map(|c| (ConstrId(i as u32), c)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    Optimal,
    Infeasible,
    Unbounded,
    Other,
}

/// Result of one blocking solve.
#[derive(Debug, Clone)]
pub struct Solution {
    pub status: SolveStatus,
    pub objective: f64,
    /// One value per variable, in handle order.
    pub primal: Vec<f64>,
    /// One value per live constraint, in ascending handle order. Empty
    /// after an integer solve: duals are only meaningful for pure LPs.
    pub dual: Vec<f64>,
}

/// The external solve interface. Implementations run simplex /
/// branch-and-bound on the given model; this crate layers the
/// decomposition and heuristic control logic on top and never
/// reimplements that machinery.
pub trait LpSolver {
    fn solve(&mut self, model: &LinearModel) -> Result<Solution>;
}
