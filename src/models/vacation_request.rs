//! Vacation request and approval models.
//!
//! A [`VacationRequest`] is charged against one accrual period through its
//! `start_period`. Live requests carry an [`ApprovalVacation`]; imported
//! requests come from historical data and need none.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status of an approval record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum RequestStatus {
    /// Waiting for a decision.
    Pending,
    /// Granted.
    Approved,
    /// Denied.
    Rejected,
}

/// The approval record of a vacation request (1:1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalVacation {
    /// Surrogate identifier.
    pub id: Uuid,
    /// The request this approval belongs to.
    pub vacation_request_id: Uuid,
    /// Current decision.
    pub status: RequestStatus,
    /// Reference to the approving actor, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approver: Option<String>,
}

/// A vacation request with its approval loaded.
///
/// # Example
///
/// ```
/// use vacation_engine::models::{RequestStatus, VacationRequest};
/// use chrono::NaiveDate;
/// use uuid::Uuid;
///
/// let request = VacationRequest {
///     id: Uuid::new_v4(),
///     collaborator_id: Uuid::new_v4(),
///     start_date: NaiveDate::from_ymd_opt(2022, 6, 1).unwrap(),
///     final_date: NaiveDate::from_ymd_opt(2022, 6, 15).unwrap(),
///     start_period: NaiveDate::from_ymd_opt(2022, 1, 10).unwrap(),
///     came_imported: true,
///     approval: None,
/// };
/// assert_eq!(request.status(), RequestStatus::Approved);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VacationRequest {
    /// Surrogate identifier.
    pub id: Uuid,
    /// The owning collaborator.
    pub collaborator_id: Uuid,
    /// First day of leave (inclusive).
    pub start_date: NaiveDate,
    /// Last day of leave (inclusive).
    pub final_date: NaiveDate,
    /// Start of the accrual period this request is charged against.
    pub start_period: NaiveDate,
    /// True when seeded from historical data.
    #[serde(default)]
    pub came_imported: bool,
    /// The approval record, when one exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval: Option<ApprovalVacation>,
}

impl VacationRequest {
    /// Returns the status derived from the approval record.
    ///
    /// Imported requests without an approval are considered approved;
    /// live requests without one are pending.
    pub fn status(&self) -> RequestStatus {
        match &self.approval {
            Some(approval) => approval.status,
            None if self.came_imported => RequestStatus::Approved,
            None => RequestStatus::Pending,
        }
    }

    /// Returns true for a live request whose approval was never written.
    pub fn is_missing_approval(&self) -> bool {
        !self.came_imported && self.approval.is_none()
    }
}

/// Input for creating a vacation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVacationRequest {
    /// First day of leave (inclusive).
    pub start_date: NaiveDate,
    /// Last day of leave (inclusive).
    pub final_date: NaiveDate,
    /// Start of the accrual period to charge.
    pub start_period: NaiveDate,
    /// True when seeded from historical data.
    #[serde(default)]
    pub came_imported: bool,
}

/// Partial update merged into an existing vacation request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VacationRequestPatch {
    /// New first day of leave.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// New last day of leave.
    #[serde(default)]
    pub final_date: Option<NaiveDate>,
    /// New accrual period to charge.
    #[serde(default)]
    pub start_period: Option<NaiveDate>,
}

impl VacationRequestPatch {
    /// Merges the set fields into `request`.
    pub fn apply(self, request: &mut VacationRequest) {
        if let Some(start_date) = self.start_date {
            request.start_date = start_date;
        }
        if let Some(final_date) = self.final_date {
            request.final_date = final_date;
        }
        if let Some(start_period) = self.start_period {
            request.start_period = start_period;
        }
    }
}

/// Input for creating an approval record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewApproval {
    /// The request being approved.
    pub vacation_request_id: Uuid,
    /// Initial decision.
    pub status: RequestStatus,
    /// Reference to the approving actor, if any.
    #[serde(default)]
    pub approver: Option<String>,
}

/// Decision merged into an existing approval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalDecision {
    /// New status.
    pub status: RequestStatus,
    /// Reference to the deciding actor.
    #[serde(default)]
    pub approver: Option<String>,
}
