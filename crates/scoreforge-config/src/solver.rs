//! Top-level solver configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, PhaseConfig, TerminationConfig};

/// Environment mode, a solver termination and the phases to run in order.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct SolverConfig {
    pub environment_mode: EnvironmentMode,
    pub termination: Option<TerminationConfig>,
    pub phases: Vec<PhaseConfig>,
}

impl SolverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a TOML or YAML file, chosen by its extension. Anything that is
    /// not `.yaml` or `.yml` is read as TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml" | "yml") => Self::from_yaml_file(path),
            _ => Self::from_toml_file(path),
        }
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(ConfigError::from)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_yaml_str(&std::fs::read_to_string(path)?)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(text).map_err(ConfigError::from)
    }

    pub fn with_environment_mode(mut self, mode: EnvironmentMode) -> Self {
        self.environment_mode = mode;
        self
    }

    pub fn with_termination(mut self, termination: TerminationConfig) -> Self {
        self.termination = Some(termination);
        self
    }

    /// Replaces the solver time limit and keeps every other termination.
    pub fn with_termination_seconds(mut self, seconds: i64) -> Self {
        let termination = self.termination.get_or_insert_with(TerminationConfig::default);
        termination.overwrite_spent_limit(None);
        termination.seconds_spent_limit = Some(seconds);
        self
    }

    pub fn with_phase(mut self, phase: PhaseConfig) -> Self {
        self.phases.push(phase);
        self
    }
}

/// How much checking the score director does while solving.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvironmentMode {
    #[default]
    NonReproducible,
    Reproducible,
    /// Corruption checks run on request.
    FastAssert,
    /// Every score calculation is checked against a full recalculation.
    FullAssert,
}

impl EnvironmentMode {
    pub fn is_asserted(self) -> bool {
        matches!(self, EnvironmentMode::FastAssert | EnvironmentMode::FullAssert)
    }

    pub fn is_fully_asserted(self) -> bool {
        self == EnvironmentMode::FullAssert
    }

    pub fn is_reproducible(self) -> bool {
        self != EnvironmentMode::NonReproducible
    }
}

/// Settings applied over a loaded configuration at run time.
#[derive(Debug, Clone, Default)]
pub struct SolverConfigOverride {
    pub termination: Option<TerminationConfig>,
}

impl SolverConfigOverride {
    pub fn with_termination(termination: TerminationConfig) -> Self {
        Self {
            termination: Some(termination),
        }
    }

    /// The overriding termination inherits whatever it leaves unset from
    /// the configured one.
    pub fn apply(&self, config: &mut SolverConfig) {
        let Some(termination) = &self.termination else {
            return;
        };
        let mut merged = termination.clone();
        if let Some(configured) = &config.termination {
            merged.inherit(configured);
        }
        config.termination = Some(merged);
    }
}
