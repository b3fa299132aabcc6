//! Bulk import of collaborators with their vacation history.
//!
//! Rows arrive as loose JSON objects taken from the spreadsheet. Each row is
//! converted and handled on its own: a row that does not parse or does not
//! validate is reported and the rest of the batch goes through. Rows whose
//! register is already known are skipped, so importing the same batch twice
//! inserts nothing the second time.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::config::PolicyConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{Collaborator, EmploymentType, NewCollaborator};
use crate::store::{CollaboratorFilter, VacationStore};

use super::collaborators::validate_identity;
use super::requests::{RequestLifecycle, plan_historical_pair};
use super::serial_date::from_excel_serial;

/// A hiring date cell: a spreadsheet serial number or an ISO date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateCell {
    /// Serial number in the 1900 date system.
    Serial(f64),
    /// `YYYY-MM-DD`, or a serial number stored as text.
    Text(String),
}

impl DateCell {
    /// Converts the cell to a calendar date.
    pub fn to_date(&self) -> EngineResult<NaiveDate> {
        match self {
            DateCell::Serial(serial) => from_excel_serial(*serial),
            DateCell::Text(text) => {
                let text = text.trim();
                if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
                    return Ok(date);
                }
                match text.parse::<f64>() {
                    Ok(serial) => from_excel_serial(serial),
                    Err(_) => Err(EngineError::validation(
                        "hiringDate",
                        format!("'{text}' is neither a date nor a serial number"),
                    )),
                }
            }
        }
    }
}

/// One spreadsheet row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRow {
    /// Registration number; numeric cells are read as text.
    #[serde(deserialize_with = "text_or_number")]
    pub register: String,
    /// Full name.
    pub name: String,
    /// Contact e-mail.
    pub email: String,
    /// Hiring date cell.
    pub hiring_date: DateCell,
    /// Year of the last fully enjoyed accrual period.
    pub period_ok: i32,
    /// Days already taken from the period after `period_ok`.
    #[serde(default)]
    pub days_enjoyed: u32,
    /// Whether the collaborator uses the self-service application. Not
    /// persisted, so any cell value is accepted.
    #[serde(default, deserialize_with = "lenient_flag")]
    pub use_application: bool,
    /// Employment arrangement; `clt` when absent.
    #[serde(default)]
    pub employment_type: EmploymentType,
}

fn text_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Cell {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Cell::deserialize(deserializer)? {
        Cell::Text(text) => text,
        Cell::Number(number) => number.to_string(),
    })
}

fn lenient_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Bool(flag)) => flag,
        Some(Value::Number(number)) => number.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(text)) => matches!(
            text.trim().to_lowercase().as_str(),
            "sim" | "s" | "yes" | "y" | "true" | "1" | "x"
        ),
        _ => false,
    })
}

impl ImportRow {
    /// Converts one raw batch element.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}

/// Best-effort register of a raw row, for failure reports.
fn raw_register(value: &Value) -> Option<String> {
    let register = match value.get("register")? {
        Value::String(text) => text.trim().to_string(),
        Value::Number(number) => number.to_string(),
        _ => return None,
    };
    (!register.is_empty()).then_some(register)
}

/// A row that could not be imported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordFailure {
    /// Position of the row in the batch.
    pub index: usize,
    /// The row's register, when it had one.
    pub register: Option<String>,
    /// What went wrong.
    pub reason: String,
}

/// A row left out because its register is already known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedRecord {
    /// Position of the row in the batch.
    pub index: usize,
    /// The duplicate register.
    pub register: String,
}

/// Outcome of an import batch.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    /// Collaborators created, with their seeded requests.
    pub inserted: Vec<Collaborator>,
    /// Rows skipped as duplicates.
    pub skipped: Vec<SkippedRecord>,
    /// Rows that failed.
    pub failures: Vec<RecordFailure>,
}

impl ImportReport {
    /// Returns true when no row failed.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Turns a report with failures into [`EngineError::PartialBatchFailure`].
    pub fn ensure_complete(self) -> EngineResult<Self> {
        if self.is_complete() {
            Ok(self)
        } else {
            Err(EngineError::PartialBatchFailure {
                inserted: self.inserted.len(),
                failures: self.failures,
            })
        }
    }
}

/// Imports collaborator batches.
#[derive(Clone)]
pub struct ImportService<S> {
    store: S,
    config: Arc<PolicyConfig>,
    lifecycle: RequestLifecycle<S>,
}

impl<S: VacationStore> ImportService<S> {
    /// Creates the service.
    pub fn new(store: S, config: Arc<PolicyConfig>) -> Self {
        let lifecycle = RequestLifecycle::new(store.clone(), Arc::clone(&config));
        Self {
            store,
            config,
            lifecycle,
        }
    }

    /// Imports `batch` against the collaborators currently stored.
    pub async fn import_batch(&self, batch: Vec<Value>) -> EngineResult<ImportReport> {
        let existing = self
            .store
            .find_collaborators(CollaboratorFilter::default())
            .await?;
        Ok(self.reconcile(batch, &existing).await)
    }

    /// Imports the rows of `batch` whose register is not in `existing`.
    ///
    /// Each imported collaborator is created and then seeded with its
    /// history. When seeding fails the collaborator is removed again and the
    /// row is reported as failed. A register the store already holds but
    /// `existing` did not list is skipped like any other known register.
    pub async fn reconcile(&self, batch: Vec<Value>, existing: &[Collaborator]) -> ImportReport {
        let mut known: HashSet<String> = existing
            .iter()
            .map(|c| c.natural_key().to_string())
            .collect();
        let mut report = ImportReport::default();

        for (index, value) in batch.into_iter().enumerate() {
            let fallback_register = raw_register(&value);
            let row = match ImportRow::from_value(value) {
                Ok(row) => row,
                Err(e) => {
                    warn!(index, error = %e, "Import row is malformed");
                    report.failures.push(RecordFailure {
                        index,
                        register: fallback_register,
                        reason: format!("malformed row: {e}"),
                    });
                    continue;
                }
            };

            let register = row.register.trim().to_string();
            if known.contains(&register) {
                report.skipped.push(SkippedRecord { index, register });
                continue;
            }

            match self.import_row(row).await {
                Ok(collaborator) => {
                    known.insert(register);
                    report.inserted.push(collaborator);
                }
                Err(EngineError::Conflict { .. }) => {
                    debug!(index, register = %register, "Register stored since the snapshot");
                    known.insert(register.clone());
                    report.skipped.push(SkippedRecord { index, register });
                }
                Err(e) => {
                    warn!(index, register = %register, error = %e, "Import row failed");
                    report.failures.push(RecordFailure {
                        index,
                        register: (!register.is_empty()).then_some(register),
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            inserted = report.inserted.len(),
            skipped = report.skipped.len(),
            failed = report.failures.len(),
            "Import batch reconciled"
        );
        report
    }

    async fn import_row(&self, row: ImportRow) -> EngineResult<Collaborator> {
        validate_identity(&row.register, &row.name)?;
        let hiring_date = row.hiring_date.to_date()?;
        let rules = self.config.rules_for(row.employment_type);
        plan_historical_pair(hiring_date, row.period_ok, row.days_enjoyed, &rules)?;

        let collaborator = self
            .store
            .create_collaborator(NewCollaborator {
                register: row.register.trim().to_string(),
                name: row.name,
                email: row.email,
                hiring_date,
                employment_type: row.employment_type,
            })
            .await?;

        match self
            .lifecycle
            .create_historical_pair(&collaborator, row.period_ok, row.days_enjoyed)
            .await
        {
            Ok(requests) => Ok(Collaborator {
                requests,
                ..collaborator
            }),
            Err(e) => {
                if let Err(cleanup) = self.store.delete_collaborator(collaborator.id).await {
                    error!(
                        collaborator_id = %collaborator.id,
                        error = %cleanup,
                        "Could not remove partially imported collaborator"
                    );
                }
                Err(e)
            }
        }
    }
}
