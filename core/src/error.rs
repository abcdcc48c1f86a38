use thiserror::Error;

/// Errors surfaced by constructors, measure mutation and the equation solver.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// A redeclared composite shape contradicts the traversal order already
    /// registered for the same point set.
    #[error("inconsistent orientation: {0}")]
    IdentityConflict(String),

    /// An attempt to bind a measure to a value inconsistent with its current
    /// binding or outside its dimension's domain.
    #[error("measure conflict: {0}")]
    MeasureConflict(String),

    /// The accumulated system of equations has no solution.
    #[error("inconsistent system of equations: {0}")]
    SystemContradiction(String),

    /// Degenerate constructor input: wrong arity, repeated points, invalid
    /// labels.
    #[error("malformed construction: {0}")]
    MalformedConstruction(String),
}

pub type Result<T> = std::result::Result<T, GeometryError>;
