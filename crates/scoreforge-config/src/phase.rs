//! Phase configuration.

use serde::{Deserialize, Serialize};

use crate::TerminationConfig;

/// One solver phase, tagged by `type` in configuration files.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PhaseConfig {
    ConstructionHeuristic(PhaseSettings),
    LocalSearch(PhaseSettings),
    ExhaustiveSearch(PhaseSettings),
    Custom(CustomPhaseConfig),
}

impl PhaseConfig {
    /// The `type` tag of this phase.
    pub fn type_name(&self) -> &'static str {
        match self {
            PhaseConfig::ConstructionHeuristic(_) => "construction_heuristic",
            PhaseConfig::LocalSearch(_) => "local_search",
            PhaseConfig::ExhaustiveSearch(_) => "exhaustive_search",
            PhaseConfig::Custom(_) => "custom",
        }
    }

    pub fn termination(&self) -> Option<&TerminationConfig> {
        match self {
            PhaseConfig::ConstructionHeuristic(settings)
            | PhaseConfig::LocalSearch(settings)
            | PhaseConfig::ExhaustiveSearch(settings) => settings.termination.as_ref(),
            PhaseConfig::Custom(custom) => custom.termination.as_ref(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct PhaseSettings {
    pub termination: Option<TerminationConfig>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct CustomPhaseConfig {
    /// Name the custom phase was registered under.
    pub custom_phase_name: Option<String>,
    pub termination: Option<TerminationConfig>,
}
