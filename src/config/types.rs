//! Configuration types for the vacation policy.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use serde::Deserialize;
use std::collections::HashMap;

use crate::models::EmploymentType;

/// Metadata identifying the policy and its legal source.
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyMetadata {
    /// Short code for the policy (e.g., "CLT-130").
    pub code: String,
    /// Human-readable policy name.
    pub name: String,
    /// Reference to the legal text the constants come from.
    #[serde(default)]
    pub source_url: String,
}

/// Deadline and entitlement constants shared by every employment type.
#[derive(Debug, Clone, Deserialize)]
pub struct VacationPolicy {
    /// Length of one accrual period, in months.
    #[serde(default = "default_accrual_period_months")]
    pub accrual_period_months: u32,
    /// Default entitlement per accrual period, in days.
    #[serde(default = "default_days_allowed")]
    pub days_allowed: u32,
    /// Months from the period start until the employer's grant deadline.
    #[serde(default = "default_limit_enterprise_months")]
    pub limit_enterprise_months: u32,
    /// Months from the period start until the hard legal deadline.
    #[serde(default = "default_ultimate_months")]
    pub ultimate_months: u32,
    /// Days before `limit_enterprise` at which a period becomes due soon.
    #[serde(default = "default_due_soon_warning_days")]
    pub due_soon_warning_days: u32,
}

fn default_accrual_period_months() -> u32 {
    12
}

fn default_days_allowed() -> u32 {
    30
}

fn default_limit_enterprise_months() -> u32 {
    11
}

fn default_ultimate_months() -> u32 {
    14
}

fn default_due_soon_warning_days() -> u32 {
    60
}

impl Default for VacationPolicy {
    fn default() -> Self {
        Self {
            accrual_period_months: default_accrual_period_months(),
            days_allowed: default_days_allowed(),
            limit_enterprise_months: default_limit_enterprise_months(),
            ultimate_months: default_ultimate_months(),
            due_soon_warning_days: default_due_soon_warning_days(),
        }
    }
}

/// Settings for the collaborator listing fan-out.
#[derive(Debug, Clone, Deserialize)]
pub struct AggregationConfig {
    /// Upper bound on concurrent period computations.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

fn default_max_concurrency() -> usize {
    8
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
        }
    }
}

/// Structure of `policy.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyFile {
    /// Policy metadata.
    pub metadata: PolicyMetadata,
    /// Shared constants.
    #[serde(default)]
    pub policy: VacationPolicy,
    /// Listing fan-out settings.
    #[serde(default)]
    pub aggregation: AggregationConfig,
}

/// Per employment type overrides.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmploymentTypeRules {
    /// Entitlement override, in days.
    #[serde(default)]
    pub days_allowed: Option<u32>,
    /// When set, deadline statuses (`DUE_SOON`, `OVERDUE`) are suppressed.
    #[serde(default)]
    pub deadline_exempt: bool,
}

/// Structure of `employment_types.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct EmploymentTypesConfig {
    /// Overrides keyed by employment type.
    pub employment_types: HashMap<EmploymentType, EmploymentTypeRules>,
}

/// The rules the period engine applies to one collaborator.
///
/// Resolved from the shared [`VacationPolicy`] and the collaborator's
/// employment type through [`PolicyConfig::rules_for`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodRules {
    /// Length of one accrual period, in months.
    pub accrual_period_months: u32,
    /// Entitlement per accrual period, in days.
    pub days_allowed: u32,
    /// Months from period start until `limit_enterprise`.
    pub limit_enterprise_months: u32,
    /// Months from period start until `ultimate`.
    pub ultimate_months: u32,
    /// Warning window before `limit_enterprise`, in days.
    pub due_soon_warning_days: u32,
    /// Whether deadline statuses are suppressed for this employment type.
    pub deadline_exempt: bool,
}

impl Default for PeriodRules {
    fn default() -> Self {
        PolicyConfig::default().rules_for(EmploymentType::Clt)
    }
}

/// The complete vacation configuration loaded from YAML files.
#[derive(Debug, Clone)]
pub struct PolicyConfig {
    metadata: PolicyMetadata,
    policy: VacationPolicy,
    aggregation: AggregationConfig,
    employment_types: HashMap<EmploymentType, EmploymentTypeRules>,
}

impl PolicyConfig {
    /// Creates a new PolicyConfig from its component parts.
    pub fn new(
        metadata: PolicyMetadata,
        policy: VacationPolicy,
        aggregation: AggregationConfig,
        employment_types: HashMap<EmploymentType, EmploymentTypeRules>,
    ) -> Self {
        Self {
            metadata,
            policy,
            aggregation,
            employment_types,
        }
    }

    /// Returns the policy metadata.
    pub fn metadata(&self) -> &PolicyMetadata {
        &self.metadata
    }

    /// Returns the shared policy constants.
    pub fn policy(&self) -> &VacationPolicy {
        &self.policy
    }

    /// Returns the listing fan-out settings.
    pub fn aggregation(&self) -> &AggregationConfig {
        &self.aggregation
    }

    /// Resolves the engine rules for an employment type.
    ///
    /// Types without an override entry use the shared constants and are not
    /// deadline exempt.
    pub fn rules_for(&self, employment_type: EmploymentType) -> PeriodRules {
        let overrides = self.employment_types.get(&employment_type);
        PeriodRules {
            accrual_period_months: self.policy.accrual_period_months,
            days_allowed: overrides
                .and_then(|o| o.days_allowed)
                .unwrap_or(self.policy.days_allowed),
            limit_enterprise_months: self.policy.limit_enterprise_months,
            ultimate_months: self.policy.ultimate_months,
            due_soon_warning_days: self.policy.due_soon_warning_days,
            deadline_exempt: overrides.is_some_and(|o| o.deadline_exempt),
        }
    }
}

impl Default for PolicyConfig {
    /// The built-in policy: 12-month periods, 30 days, 11/14-month
    /// deadlines, 60-day warning, contractors exempt from deadlines.
    fn default() -> Self {
        let mut employment_types = HashMap::new();
        employment_types.insert(
            EmploymentType::Contractor,
            EmploymentTypeRules {
                days_allowed: None,
                deadline_exempt: true,
            },
        );
        Self {
            metadata: PolicyMetadata {
                code: "CLT-130".to_string(),
                name: "Built-in vacation policy".to_string(),
                source_url: String::new(),
            },
            policy: VacationPolicy::default(),
            aggregation: AggregationConfig::default(),
            employment_types,
        }
    }
}
