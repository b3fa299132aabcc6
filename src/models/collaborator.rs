//! Collaborator model and related types.
//!
//! This module defines the Collaborator struct and EmploymentType enum
//! for representing employees whose vacation entitlement is tracked.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::VacationRequest;

/// Maximum length of a collaborator name.
pub const MAX_NAME_LENGTH: usize = 100;

/// Represents the type of employment arrangement.
///
/// The employment type selects the entitlement and deadline rules applied
/// by the period engine (see [`crate::config::PolicyConfig::rules_for`]).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentType {
    /// Employee under the labor code.
    #[default]
    Clt,
    /// Intern with a recess entitlement.
    Intern,
    /// Contractor, outside the legal deadline statuses.
    Contractor,
}

/// Represents a collaborator together with its loaded vacation requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collaborator {
    /// Surrogate identifier.
    pub id: Uuid,
    /// Registration number, the natural key.
    pub register: String,
    /// Full name.
    pub name: String,
    /// Contact e-mail.
    pub email: String,
    /// The date the collaborator was hired.
    pub hiring_date: NaiveDate,
    /// The type of employment arrangement.
    #[serde(default)]
    pub employment_type: EmploymentType,
    /// Vacation requests, ordered by start date.
    #[serde(default)]
    pub requests: Vec<VacationRequest>,
}

impl Collaborator {
    /// Returns the natural key used for deduplication.
    pub fn natural_key(&self) -> &str {
        self.register.trim()
    }
}

/// Input for creating a collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCollaborator {
    /// Registration number.
    pub register: String,
    /// Full name.
    pub name: String,
    /// Contact e-mail.
    pub email: String,
    /// The date the collaborator was hired.
    pub hiring_date: NaiveDate,
    /// The type of employment arrangement.
    #[serde(default)]
    pub employment_type: EmploymentType,
}

/// Partial update merged into an existing collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaboratorPatch {
    /// New registration number.
    #[serde(default)]
    pub register: Option<String>,
    /// New name.
    #[serde(default)]
    pub name: Option<String>,
    /// New e-mail.
    #[serde(default)]
    pub email: Option<String>,
    /// New hiring date.
    #[serde(default)]
    pub hiring_date: Option<NaiveDate>,
    /// New employment type.
    #[serde(default)]
    pub employment_type: Option<EmploymentType>,
}

impl CollaboratorPatch {
    /// Merges the set fields into `collaborator`.
    pub fn apply(self, collaborator: &mut Collaborator) {
        if let Some(register) = self.register {
            collaborator.register = register.trim().to_string();
        }
        if let Some(name) = self.name {
            collaborator.name = name;
        }
        if let Some(email) = self.email {
            collaborator.email = email;
        }
        if let Some(hiring_date) = self.hiring_date {
            collaborator.hiring_date = hiring_date;
        }
        if let Some(employment_type) = self.employment_type {
            collaborator.employment_type = employment_type;
        }
    }
}
