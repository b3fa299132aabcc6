//! Services over the period engine and the repositories.
//!
//! - [`CollaboratorService`]: listing with situations, period detail, and
//!   collaborator maintenance.
//! - [`RequestLifecycle`]: request creation, historical seeding, and
//!   approval decisions.
//! - [`ImportService`]: bulk import of collaborators from spreadsheet rows.

mod collaborators;
mod import;
mod requests;
mod serial_date;

#[cfg(test)]
pub(crate) mod test_support;

use uuid::Uuid;

use crate::error::{EngineError, EngineResult};

pub use collaborators::{CollaboratorPeriodView, CollaboratorService, CollaboratorSummary};
pub use import::{DateCell, ImportReport, ImportRow, ImportService, RecordFailure, SkippedRecord};
pub use requests::{HistoricalPlan, RequestLifecycle, plan_historical_pair, shift_to_year};
pub use serial_date::{MAX_SERIAL, from_excel_serial};

/// Parses an id supplied by a caller.
///
/// Empty and malformed ids are [`EngineError::Validation`] errors on `field`.
pub fn parse_id(field: &str, raw: &str) -> EngineResult<Uuid> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(EngineError::validation(field, "id not provided"));
    }
    Uuid::parse_str(raw)
        .map_err(|_| EngineError::validation(field, format!("'{raw}' is not a valid id")))
}
