//! Defines the `Error` type for the pgmodel library

use std::result;

use thiserror::Error;

pub type Result<T> = result::Result<T, PgmError>;

#[derive(Clone, Debug, PartialEq, Error)]
pub enum PgmError {

    /// A model variant was constructed with a graph or factor set that breaks one of its
    /// invariants. The message names the invariant.
    #[error("structural validation failed: {0}")]
    StructuralValidation(String),

    /// A factor could not classify the assignment it was handed
    #[error("unknown assignment: {0}")]
    UnknownAssignment(String),

    /// Evidence or query references an unknown variable, an out-of-domain value, or the two sets
    /// overlap
    #[error("invalid evidence: {0}")]
    InvalidEvidence(String),

    /// Exactly what it sounds like
    #[error("division by zero during normalization")]
    DivisionByZero,

    /// A random variable was declared with an unusable domain
    #[error("invalid variable: {0}")]
    InvalidVariable(String),

    /// A factor table has the wrong shape, a negative entry, or is not a conditional distribution
    /// where one was required
    #[error("invalid factor: {0}")]
    InvalidFactor(String),

    /// Represents an error where a certain constraint on a scope was not satisfied
    #[error("invalid scope: {0}")]
    InvalidScope(String),

}
