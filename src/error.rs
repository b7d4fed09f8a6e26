use crate::model::SolveStatus;
use thiserror::Error;

/// Stage of the workflow a solver failure was observed in.
/// Carried in [`Error::SolverFailure`] so an aborted run can be
/// diagnosed instead of propagating stale results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStage {
    Relaxation,
    Integer,
    Pricing,
}

impl std::fmt::Display for SolveStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolveStage::Relaxation => write!(f, "relaxation"),
            SolveStage::Integer => write!(f, "integer"),
            SolveStage::Pricing => write!(f, "pricing"),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    /// Malformed instance file or invalid CLI argument. Fatal; nothing
    /// is persisted.
    #[error("input error: {0}")]
    Input(String),

    /// An item cannot be packed into any roll. Detected before the
    /// master problem is built.
    #[error("infeasible instance: item {item} has width {width} exceeding capacity {capacity}")]
    Infeasible { item: usize, width: f64, capacity: f64 },

    /// The external solve returned a non-optimal status where an
    /// optimum was required.
    #[error("solver failure during {stage} solve{}: status {status:?}", iteration.map(|k| format!(" (outer iteration {k})")).unwrap_or_default())]
    SolverFailure {
        stage: SolveStage,
        iteration: Option<usize>,
        status: SolveStatus,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Attach outer-iteration context to a solver failure; other
    /// variants pass through unchanged.
    #[must_use]
    pub fn with_iteration(self, k: usize) -> Self {
        match self {
            Error::SolverFailure { stage, status, .. } => Error::SolverFailure {
                stage,
                iteration: Some(k),
                status,
            },
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
