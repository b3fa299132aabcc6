//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading vacation
//! policies from YAML files.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};
use crate::models::EmploymentType;

use super::types::{EmploymentTypesConfig, PeriodRules, PolicyConfig, PolicyFile, PolicyMetadata};

/// Loads and provides access to the vacation policy.
///
/// # Directory Structure
///
/// ```text
/// config/clt/
/// ├── policy.yaml            # Metadata, deadlines, entitlement, fan-out
/// └── employment_types.yaml  # Per employment type overrides
/// ```
///
/// # Example
///
/// ```no_run
/// use vacation_engine::config::ConfigLoader;
/// use vacation_engine::models::EmploymentType;
///
/// let loader = ConfigLoader::load("./config/clt").unwrap();
/// let rules = loader.rules_for(EmploymentType::Clt);
/// println!("Days allowed: {}", rules.days_allowed);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: PolicyConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// Returns an error if a file is missing, contains invalid YAML, or
    /// describes an impossible policy (zero-length periods, an `ultimate`
    /// deadline before `limit_enterprise`).
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let policy_file = Self::load_yaml::<PolicyFile>(&path.join("policy.yaml"))?;
        let employment_types =
            Self::load_yaml::<EmploymentTypesConfig>(&path.join("employment_types.yaml"))?;

        let config = PolicyConfig::new(
            policy_file.metadata,
            policy_file.policy,
            policy_file.aggregation,
            employment_types.employment_types,
        );
        Self::validate(&config)?;

        Ok(Self { config })
    }

    /// Wraps an already-built configuration.
    pub fn from_config(config: PolicyConfig) -> EngineResult<Self> {
        Self::validate(&config)?;
        Ok(Self { config })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    fn validate(config: &PolicyConfig) -> EngineResult<()> {
        let policy = config.policy();

        if policy.accrual_period_months == 0 {
            return Err(EngineError::InvalidConfig {
                message: "accrual_period_months must be positive".to_string(),
            });
        }
        if policy.ultimate_months < policy.limit_enterprise_months {
            return Err(EngineError::InvalidConfig {
                message: format!(
                    "ultimate_months ({}) is before limit_enterprise_months ({})",
                    policy.ultimate_months, policy.limit_enterprise_months
                ),
            });
        }
        if config.aggregation().max_concurrency == 0 {
            return Err(EngineError::InvalidConfig {
                message: "aggregation.max_concurrency must be positive".to_string(),
            });
        }

        Ok(())
    }

    /// Returns the underlying policy configuration.
    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Returns the policy metadata.
    pub fn metadata(&self) -> &PolicyMetadata {
        self.config.metadata()
    }

    /// Resolves the engine rules for an employment type.
    pub fn rules_for(&self, employment_type: EmploymentType) -> PeriodRules {
        self.config.rules_for(employment_type)
    }
}
