//! Configuration loading and management for the vacation engine.
//!
//! This module loads the vacation policy from YAML files: the accrual
//! period length, the entitlement, the employer and legal deadlines, the
//! warning window, and the per employment type overrides.
//!
//! # Example
//!
//! ```no_run
//! use vacation_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/clt").unwrap();
//! println!("Loaded policy: {}", config.metadata().name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    AggregationConfig, EmploymentTypeRules, EmploymentTypesConfig, PeriodRules, PolicyConfig,
    PolicyFile, PolicyMetadata, VacationPolicy,
};
