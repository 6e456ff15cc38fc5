//! Governance policy configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::GovernanceError;

/// How `execute_proposal` decides the final status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomePolicy {
    /// The executing caller's outcome is final. Tallies are informational.
    #[default]
    CallerAsserted,
    /// The outcome is `yes > no ? Approved : Rejected`. The caller's outcome
    /// is kept on the proposal for audit only.
    TallyDerived,
}

/// Configuration for a [`GovernanceEngine`](crate::GovernanceEngine).
///
/// Can be loaded from a TOML file via [`GovernanceConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceConfig {
    /// Policy for the final status of an executed proposal.
    #[serde(default)]
    pub outcome_policy: OutcomePolicy,

    /// Reject votes once the deadline has passed, even before execution.
    #[serde(default)]
    pub close_voting_at_deadline: bool,

    /// Longest accepted proposal description, in bytes.
    #[serde(default = "default_max_description_len")]
    pub max_description_len: usize,
}

fn default_max_description_len() -> usize {
    4096
}

impl GovernanceConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, GovernanceError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| GovernanceError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, GovernanceError> {
        let config: Self =
            toml::from_str(s).map_err(|e| GovernanceError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, GovernanceError> {
        toml::to_string_pretty(self).map_err(|e| GovernanceError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), GovernanceError> {
        if self.max_description_len == 0 {
            return Err(GovernanceError::Config(
                "max_description_len must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            outcome_policy: OutcomePolicy::default(),
            close_voting_at_deadline: false,
            max_description_len: default_max_description_len(),
        }
    }
}
