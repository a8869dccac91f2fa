//! Error types for ScoreForge

use thiserror::Error;

/// Main error type for ScoreForge operations
#[derive(Debug, Error)]
pub enum SolverForgeError {
    /// Error in solver, termination or constraint configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error in domain model definition or usage
    #[error("Domain model error: {0}")]
    DomainModel(String),

    /// Incremental score diverged from a from-scratch recalculation
    #[error("{0}")]
    ScoreCorruption(String),

    /// Invalid operation for current solver state
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Result type alias for ScoreForge operations
pub type Result<T> = std::result::Result<T, SolverForgeError>;
