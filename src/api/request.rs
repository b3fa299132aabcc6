//! Request bodies for the vacation API.
//!
//! Collaborator bodies reuse the model inputs directly; the types here
//! exist where the wire shape differs from the model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{ApprovalDecision, NewVacationRequest, RequestStatus};

/// Body of `POST /collaborators/:id/requests`.
///
/// Clients cannot mark a request as imported.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VacationRequestBody {
    /// First day of leave (inclusive).
    pub start_date: NaiveDate,
    /// Last day of leave (inclusive).
    pub final_date: NaiveDate,
    /// Start of the accrual period to charge.
    pub start_period: NaiveDate,
}

impl From<VacationRequestBody> for NewVacationRequest {
    fn from(body: VacationRequestBody) -> Self {
        NewVacationRequest {
            start_date: body.start_date,
            final_date: body.final_date,
            start_period: body.start_period,
            came_imported: false,
        }
    }
}

/// Body of `PUT /requests/:id/approval`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalBody {
    /// The decision.
    pub status: RequestStatus,
    /// Who decided.
    #[serde(default)]
    pub approver: Option<String>,
}

impl From<ApprovalBody> for ApprovalDecision {
    fn from(body: ApprovalBody) -> Self {
        ApprovalDecision {
            status: body.status,
            approver: body.approver,
        }
    }
}
