//! Solver and termination configuration for ScoreForge.
//!
//! Configuration deserializes from TOML or YAML. Termination limits are
//! validated lazily by the `calculate_*` methods, which name the offending
//! field in their errors.
//!
//! ```
//! use scoreforge_config::{PhaseConfig, SolverConfig};
//!
//! let config = SolverConfig::from_toml_str(r#"
//!     environment_mode = "full_assert"
//!
//!     [termination]
//!     minutes_spent_limit = 2
//!     seconds_spent_limit = 30
//!
//!     [[phases]]
//!     type = "construction_heuristic"
//!
//!     [[phases]]
//!     type = "local_search"
//!     termination = { unimproved_step_count_limit = 500 }
//! "#).unwrap();
//!
//! let termination = config.termination.as_ref().unwrap();
//! assert_eq!(termination.calculate_time_millis_spent_limit().unwrap(), Some(150_000));
//! assert!(config.environment_mode.is_fully_asserted());
//! assert_eq!(config.phases[1].type_name(), "local_search");
//! ```

use scoreforge_core::SolverForgeError;
use thiserror::Error;

mod phase;
mod solver;
mod termination;

pub use phase::{CustomPhaseConfig, PhaseConfig, PhaseSettings};
pub use solver::{EnvironmentMode, SolverConfig, SolverConfigOverride};
pub use termination::{
    AdaptiveConfig, DiminishedReturnsConfig, TerminationCompositionStyle, TerminationConfig,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A value that parses but breaks a configuration rule.
    #[error("{0}")]
    Invalid(String),
}

impl From<ConfigError> for SolverForgeError {
    fn from(error: ConfigError) -> Self {
        SolverForgeError::Config(error.to_string())
    }
}

#[cfg(test)]
mod tests;
