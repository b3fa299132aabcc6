//! HTTP API module for the vacation engine.
//!
//! This module exposes collaborators, their open accrual period, vacation
//! requests with their approvals, and the bulk import over REST.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{ApprovalBody, VacationRequestBody};
pub use response::{ApiError, ApiErrorResponse, HealthResponse};
pub use state::AppState;
