//! Collaborator listing, period detail, and maintenance.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};
use uuid::Uuid;

use crate::clock::Clock;
use crate::config::{PeriodRules, PolicyConfig};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    Collaborator, CollaboratorPatch, EmploymentType, MAX_NAME_LENGTH, NewCollaborator, Period,
    Situation,
};
use crate::period::{compute_period, is_period_boundary};
use crate::store::{CollaboratorFilter, VacationStore};

use super::parse_id;

/// A collaborator in a listing, with the situation of its open period.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaboratorSummary {
    /// The collaborator with its requests.
    #[serde(flatten)]
    pub collaborator: Collaborator,
    /// `None` when the situation could not be computed.
    pub situation: Option<Situation>,
    /// Why the situation is missing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub situation_error: Option<String>,
}

/// A collaborator's identity together with its open period.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaboratorPeriodView {
    /// Surrogate identifier.
    pub id: Uuid,
    /// Registration number.
    pub register: String,
    /// Full name.
    pub name: String,
    /// Employment arrangement.
    pub employment_type: EmploymentType,
    /// Hiring date.
    pub hiring_date: NaiveDate,
    /// The open accrual period.
    pub period: Period,
}

/// Checks the fields shared by creation and import.
pub(crate) fn validate_identity(register: &str, name: &str) -> EngineResult<()> {
    if register.trim().is_empty() {
        return Err(EngineError::validation("register", "register must not be empty"));
    }
    if name.trim().is_empty() {
        return Err(EngineError::validation("name", "name must not be empty"));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(EngineError::validation(
            "name",
            format!("name must have at most {MAX_NAME_LENGTH} characters"),
        ));
    }
    Ok(())
}

/// Rejects request data the period engine would silently clamp.
fn validate_history(collaborator: &Collaborator, rules: &PeriodRules) -> Result<(), String> {
    for request in &collaborator.requests {
        if request.start_date > request.final_date {
            return Err(format!(
                "request {} ends on {} before it starts on {}",
                request.id, request.final_date, request.start_date
            ));
        }
        if !is_period_boundary(collaborator.hiring_date, request.start_period, rules) {
            return Err(format!(
                "request {} is charged to {}, which is not an accrual period start",
                request.id, request.start_period
            ));
        }
    }
    Ok(())
}

fn situation_of(
    collaborator: &Collaborator,
    rules: &PeriodRules,
    today: NaiveDate,
) -> Result<Situation, String> {
    validate_history(collaborator, rules)?;
    let period = compute_period(collaborator.hiring_date, &collaborator.requests, rules, today);
    Ok(period.situation)
}

/// Reads and maintains collaborators.
#[derive(Clone)]
pub struct CollaboratorService<S> {
    store: S,
    config: Arc<PolicyConfig>,
    clock: Arc<dyn Clock>,
}

impl<S: VacationStore> CollaboratorService<S> {
    /// Creates the service.
    pub fn new(store: S, config: Arc<PolicyConfig>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            config,
            clock,
        }
    }

    /// Lists collaborators with the situation of their open period.
    ///
    /// Situations are computed concurrently, at most
    /// `aggregation.max_concurrency` at a time. A collaborator whose
    /// situation cannot be computed is still listed, with `situation` unset
    /// and `situation_error` explaining why. The output keeps the store's
    /// sort order.
    pub async fn list_collaborators(
        &self,
        filter: CollaboratorFilter,
    ) -> EngineResult<Vec<CollaboratorSummary>> {
        let collaborators = self.store.find_collaborators(filter).await?;
        let today = self.clock.today();
        let semaphore = Arc::new(Semaphore::new(self.config.aggregation().max_concurrency.max(1)));

        let mut tasks = JoinSet::new();
        for (index, collaborator) in collaborators.iter().enumerate() {
            let collaborator = collaborator.clone();
            let rules = self.config.rules_for(collaborator.employment_type);
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                // The semaphore is never closed.
                let _permit = semaphore.acquire_owned().await.ok();
                (index, situation_of(&collaborator, &rules, today))
            });
        }

        let mut outcomes: Vec<Result<Situation, String>> = collaborators
            .iter()
            .map(|_| Err("situation computation did not complete".to_string()))
            .collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => outcomes[index] = outcome,
                Err(e) => warn!(error = %e, "Situation task failed"),
            }
        }

        let summaries = collaborators
            .into_iter()
            .zip(outcomes)
            .map(|(collaborator, outcome)| match outcome {
                Ok(situation) => CollaboratorSummary {
                    collaborator,
                    situation: Some(situation),
                    situation_error: None,
                },
                Err(reason) => {
                    warn!(
                        collaborator_id = %collaborator.id,
                        register = %collaborator.register,
                        reason = %reason,
                        "Listing collaborator without situation"
                    );
                    CollaboratorSummary {
                        collaborator,
                        situation: None,
                        situation_error: Some(reason),
                    }
                }
            })
            .collect();

        Ok(summaries)
    }

    /// Returns a collaborator's open period.
    ///
    /// `id` comes straight from the caller: empty or malformed ids are
    /// validation errors, unknown ids are not-found errors. History the
    /// listing would degrade (an inverted request, or one charged to a date
    /// that is not a period start) is a validation error on `requests`.
    pub async fn get_collaborator_detail(&self, id: &str) -> EngineResult<CollaboratorPeriodView> {
        let id = parse_id("id", id)?;
        let collaborator = self.store.find_collaborator(id).await?;
        let rules = self.config.rules_for(collaborator.employment_type);
        validate_history(&collaborator, &rules)
            .map_err(|reason| EngineError::validation("requests", reason))?;
        let period = compute_period(
            collaborator.hiring_date,
            &collaborator.requests,
            &rules,
            self.clock.today(),
        );

        Ok(CollaboratorPeriodView {
            id: collaborator.id,
            register: collaborator.register,
            name: collaborator.name,
            employment_type: collaborator.employment_type,
            hiring_date: collaborator.hiring_date,
            period,
        })
    }

    /// Loads a collaborator with its requests and approvals.
    pub async fn find_one_or_fail(&self, id: Uuid) -> EngineResult<Collaborator> {
        Ok(self.store.find_collaborator(id).await?)
    }

    /// Creates a collaborator.
    pub async fn create(&self, new: NewCollaborator) -> EngineResult<Collaborator> {
        validate_identity(&new.register, &new.name)?;
        let collaborator = self.store.create_collaborator(new).await?;
        info!(
            collaborator_id = %collaborator.id,
            register = %collaborator.register,
            "Created collaborator"
        );
        Ok(collaborator)
    }

    /// Merges `patch` into a collaborator.
    pub async fn update(&self, id: Uuid, patch: CollaboratorPatch) -> EngineResult<Collaborator> {
        let current = self.store.find_collaborator(id).await?;
        validate_identity(
            patch.register.as_deref().unwrap_or(&current.register),
            patch.name.as_deref().unwrap_or(&current.name),
        )?;
        let collaborator = self.store.save_collaborator(id, patch).await?;
        info!(collaborator_id = %id, "Updated collaborator");
        Ok(collaborator)
    }

    /// Deletes a collaborator with its requests and approvals.
    pub async fn delete_by_id(&self, id: Uuid) -> EngineResult<()> {
        self.store.delete_collaborator(id).await?;
        info!(collaborator_id = %id, "Deleted collaborator");
        Ok(())
    }
}
