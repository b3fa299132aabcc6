//! Request lifecycle: historical seeding, live requests, and approvals.
//!
//! A request and its approval are two writes. The approval is only written
//! once the request write has returned its id; when the approval write
//! fails the request is left without one and is reported by
//! [`RequestLifecycle::find_requests_missing_approval`].

use std::sync::Arc;

use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::config::{PeriodRules, PolicyConfig};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    ApprovalDecision, ApprovalVacation, Collaborator, NewApproval, NewVacationRequest,
    RequestStatus, VacationRequest,
};
use crate::period::is_period_boundary;
use crate::store::{RequestFilter, VacationStore};

/// Length of the imported request recorded for a fully enjoyed period.
const IMPORTED_SPAN_DAYS: u64 = 29;

/// The requests that reproduce a collaborator's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalPlan {
    /// Marks the last fully enjoyed period; carries no approval.
    pub imported: NewVacationRequest,
    /// Days already taken from the following period; approved on creation.
    pub current: Option<NewVacationRequest>,
}

/// Moves `date` to `year`, clamping 29 February to the 28th.
pub fn shift_to_year(date: NaiveDate, year: i32) -> Option<NaiveDate> {
    date.with_year(year)
        .or_else(|| NaiveDate::from_ymd_opt(year, date.month(), 28))
}

/// Plans the historical requests for a collaborator.
///
/// `period_ok_year` is the year of the last accrual period fully enjoyed and
/// `days_enjoyed` the days already taken from the period after it.
///
/// # Example
///
/// ```
/// use vacation_engine::config::PeriodRules;
/// use vacation_engine::services::plan_historical_pair;
/// use chrono::NaiveDate;
///
/// let hiring = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
/// let plan = plan_historical_pair(hiring, 2021, 10, &PeriodRules::default()).unwrap();
///
/// assert_eq!(plan.imported.final_date, NaiveDate::from_ymd_opt(2021, 1, 30).unwrap());
/// let current = plan.current.unwrap();
/// assert_eq!(current.start_date, NaiveDate::from_ymd_opt(2022, 1, 1).unwrap());
/// assert_eq!(current.final_date, NaiveDate::from_ymd_opt(2022, 1, 10).unwrap());
/// ```
pub fn plan_historical_pair(
    hiring_date: NaiveDate,
    period_ok_year: i32,
    days_enjoyed: u32,
    rules: &PeriodRules,
) -> EngineResult<HistoricalPlan> {
    if period_ok_year < hiring_date.year() {
        return Err(EngineError::validation(
            "periodOk",
            format!(
                "{period_ok_year} is before the hiring year {}",
                hiring_date.year()
            ),
        ));
    }
    if days_enjoyed > rules.days_allowed {
        return Err(EngineError::validation(
            "daysEnjoyed",
            format!(
                "{days_enjoyed} exceeds the entitlement of {} days",
                rules.days_allowed
            ),
        ));
    }

    let imported_start = anniversary(hiring_date, period_ok_year)?;
    let imported = NewVacationRequest {
        start_date: imported_start,
        final_date: add_days(imported_start, IMPORTED_SPAN_DAYS)?,
        start_period: imported_start,
        came_imported: true,
    };

    let current = if days_enjoyed > 0 {
        let start = anniversary(hiring_date, period_ok_year.saturating_add(1))?;
        Some(NewVacationRequest {
            start_date: start,
            final_date: add_days(start, u64::from(days_enjoyed - 1))?,
            start_period: start,
            came_imported: false,
        })
    } else {
        None
    };

    Ok(HistoricalPlan { imported, current })
}

fn anniversary(hiring_date: NaiveDate, year: i32) -> EngineResult<NaiveDate> {
    shift_to_year(hiring_date, year)
        .ok_or_else(|| EngineError::validation("periodOk", format!("{year} is outside the calendar")))
}

fn add_days(date: NaiveDate, days: u64) -> EngineResult<NaiveDate> {
    date.checked_add_days(Days::new(days))
        .ok_or_else(|| EngineError::validation("periodOk", format!("{date} is too close to the end of the calendar")))
}

/// Creates vacation requests and drives their approvals.
#[derive(Clone)]
pub struct RequestLifecycle<S> {
    store: S,
    config: Arc<PolicyConfig>,
}

impl<S: VacationStore> RequestLifecycle<S> {
    /// Creates a lifecycle manager over `store`.
    pub fn new(store: S, config: Arc<PolicyConfig>) -> Self {
        Self { store, config }
    }

    /// Persists the historical requests of a freshly imported collaborator.
    ///
    /// Returns the created requests, approvals loaded.
    pub async fn create_historical_pair(
        &self,
        collaborator: &Collaborator,
        period_ok_year: i32,
        days_enjoyed: u32,
    ) -> EngineResult<Vec<VacationRequest>> {
        let rules = self.config.rules_for(collaborator.employment_type);
        let plan = plan_historical_pair(
            collaborator.hiring_date,
            period_ok_year,
            days_enjoyed,
            &rules,
        )?;

        let imported = self
            .store
            .create_request(collaborator.id, plan.imported)
            .await?;
        let mut created = vec![imported];

        if let Some(current) = plan.current {
            let mut request = self.store.create_request(collaborator.id, current).await?;
            let approval = self
                .attach_approval(&request, RequestStatus::Approved, None)
                .await?;
            request.approval = Some(approval);
            created.push(request);
        }

        info!(
            collaborator_id = %collaborator.id,
            period_ok_year,
            days_enjoyed,
            requests = created.len(),
            "Seeded vacation history"
        );
        Ok(created)
    }

    /// Creates a live request with a pending approval.
    pub async fn create_request(
        &self,
        collaborator_id: Uuid,
        new: NewVacationRequest,
    ) -> EngineResult<VacationRequest> {
        if new.start_date > new.final_date {
            return Err(EngineError::validation(
                "finalDate",
                format!("{} is before the start date {}", new.final_date, new.start_date),
            ));
        }

        let collaborator = self.store.find_collaborator(collaborator_id).await?;
        let rules = self.config.rules_for(collaborator.employment_type);
        if !is_period_boundary(collaborator.hiring_date, new.start_period, &rules) {
            return Err(EngineError::validation(
                "startPeriod",
                format!("{} is not the start of an accrual period", new.start_period),
            ));
        }

        let new = NewVacationRequest {
            came_imported: false,
            ..new
        };
        let mut request = self.store.create_request(collaborator_id, new).await?;
        let approval = self
            .attach_approval(&request, RequestStatus::Pending, None)
            .await?;
        request.approval = Some(approval);

        info!(
            collaborator_id = %collaborator_id,
            request_id = %request.id,
            start_date = %request.start_date,
            final_date = %request.final_date,
            "Created vacation request"
        );
        Ok(request)
    }

    /// Records an approval decision for a request.
    ///
    /// A live request whose approval was never written gets one now.
    pub async fn decide(
        &self,
        request_id: Uuid,
        decision: ApprovalDecision,
    ) -> EngineResult<ApprovalVacation> {
        let request = self.store.find_request(request_id).await?;

        let approval = match request.approval {
            Some(existing) => self.store.save_approval(existing.id, decision).await?,
            None if request.came_imported => {
                return Err(EngineError::validation(
                    "requestId",
                    "imported requests are approved by definition",
                ));
            }
            None => {
                self.store
                    .create_approval(NewApproval {
                        vacation_request_id: request_id,
                        status: decision.status,
                        approver: decision.approver,
                    })
                    .await?
            }
        };

        info!(
            request_id = %request_id,
            status = ?approval.status,
            "Recorded approval decision"
        );
        Ok(approval)
    }

    /// Lists live requests that have no approval record.
    pub async fn find_requests_missing_approval(&self) -> EngineResult<Vec<VacationRequest>> {
        let orphans = self
            .store
            .find_requests(RequestFilter {
                missing_approval: true,
                ..RequestFilter::default()
            })
            .await?;
        Ok(orphans)
    }

    async fn attach_approval(
        &self,
        request: &VacationRequest,
        status: RequestStatus,
        approver: Option<String>,
    ) -> EngineResult<ApprovalVacation> {
        let new = NewApproval {
            vacation_request_id: request.id,
            status,
            approver,
        };
        self.store.create_approval(new).await.map_err(|e| {
            error!(
                request_id = %request.id,
                collaborator_id = %request.collaborator_id,
                error = %e,
                "Approval write failed; request left without approval"
            );
            EngineError::from(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EmploymentType, NewCollaborator};
    use crate::services::test_support::FlakyStore;
    use crate::store::{CollaboratorRepository, MemoryStore, VacationRequestRepository};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn seed_collaborator<S: VacationStore>(store: &S, hiring: NaiveDate) -> Collaborator {
        store
            .create_collaborator(NewCollaborator {
                register: "R-001".to_string(),
                name: "Ana Souza".to_string(),
                email: "ana@example.com".to_string(),
                hiring_date: hiring,
                employment_type: EmploymentType::Clt,
            })
            .await
            .unwrap()
    }

    #[test]
    fn test_plan_imported_only() {
        let plan =
            plan_historical_pair(date(2020, 1, 1), 2021, 0, &PeriodRules::default()).unwrap();

        assert_eq!(plan.imported.start_date, date(2021, 1, 1));
        assert_eq!(plan.imported.final_date, date(2021, 1, 30));
        assert_eq!(plan.imported.start_period, date(2021, 1, 1));
        assert!(plan.imported.came_imported);
        assert!(plan.current.is_none());
    }

    #[test]
    fn test_plan_with_days_enjoyed() {
        let plan =
            plan_historical_pair(date(2020, 1, 1), 2021, 10, &PeriodRules::default()).unwrap();

        let current = plan.current.unwrap();
        assert_eq!(current.start_date, date(2022, 1, 1));
        assert_eq!(current.final_date, date(2022, 1, 10));
        assert_eq!(current.start_period, date(2022, 1, 1));
        assert!(!current.came_imported);
    }

    #[test]
    fn test_plan_single_day_enjoyed() {
        let plan =
            plan_historical_pair(date(2020, 1, 1), 2021, 1, &PeriodRules::default()).unwrap();
        let current = plan.current.unwrap();
        assert_eq!(current.start_date, current.final_date);
    }

    #[test]
    fn test_plan_clamps_leap_day_hire() {
        let plan =
            plan_historical_pair(date(2020, 2, 29), 2021, 5, &PeriodRules::default()).unwrap();

        assert_eq!(plan.imported.start_date, date(2021, 2, 28));
        assert_eq!(plan.current.unwrap().start_date, date(2022, 2, 28));
    }

    #[test]
    fn test_plan_rejects_year_before_hiring() {
        let result = plan_historical_pair(date(2020, 1, 1), 2019, 0, &PeriodRules::default());
        assert!(matches!(
            result,
            Err(EngineError::Validation { ref field, .. }) if field == "periodOk"
        ));
    }

    #[test]
    fn test_plan_rejects_days_above_entitlement() {
        let result = plan_historical_pair(date(2020, 1, 1), 2021, 31, &PeriodRules::default());
        assert!(matches!(
            result,
            Err(EngineError::Validation { ref field, .. }) if field == "daysEnjoyed"
        ));
    }

    #[test]
    fn test_shift_to_year() {
        assert_eq!(shift_to_year(date(2022, 1, 10), 2024), Some(date(2024, 1, 10)));
        assert_eq!(shift_to_year(date(2024, 2, 29), 2025), Some(date(2025, 2, 28)));
        assert_eq!(shift_to_year(date(2024, 2, 29), 2028), Some(date(2028, 2, 29)));
    }

    #[tokio::test]
    async fn test_create_historical_pair_persists_both_requests() {
        let store = MemoryStore::new();
        let collaborator = seed_collaborator(&store, date(2020, 1, 1)).await;
        let lifecycle = RequestLifecycle::new(store.clone(), Arc::new(PolicyConfig::default()));

        let created = lifecycle
            .create_historical_pair(&collaborator, 2021, 10)
            .await
            .unwrap();

        assert_eq!(created.len(), 2);
        let stored = store.find_collaborator(collaborator.id).await.unwrap();
        assert_eq!(stored.requests.len(), 2);

        let imported = &stored.requests[0];
        assert!(imported.came_imported);
        assert!(imported.approval.is_none());
        assert_eq!(imported.status(), RequestStatus::Approved);

        let current = &stored.requests[1];
        assert!(!current.came_imported);
        assert_eq!(current.status(), RequestStatus::Approved);
    }

    #[tokio::test]
    async fn test_create_request_starts_pending() {
        let store = MemoryStore::new();
        let collaborator = seed_collaborator(&store, date(2022, 1, 10)).await;
        let lifecycle = RequestLifecycle::new(store, Arc::new(PolicyConfig::default()));

        let request = lifecycle
            .create_request(
                collaborator.id,
                NewVacationRequest {
                    start_date: date(2022, 6, 1),
                    final_date: date(2022, 6, 15),
                    start_period: date(2022, 1, 10),
                    came_imported: true,
                },
            )
            .await
            .unwrap();

        assert!(!request.came_imported);
        assert_eq!(request.status(), RequestStatus::Pending);
    }

    #[tokio::test]
    async fn test_create_request_rejects_inverted_dates() {
        let store = MemoryStore::new();
        let collaborator = seed_collaborator(&store, date(2022, 1, 10)).await;
        let lifecycle = RequestLifecycle::new(store, Arc::new(PolicyConfig::default()));

        let result = lifecycle
            .create_request(
                collaborator.id,
                NewVacationRequest {
                    start_date: date(2022, 6, 15),
                    final_date: date(2022, 6, 1),
                    start_period: date(2022, 1, 10),
                    came_imported: false,
                },
            )
            .await;

        assert!(matches!(result, Err(EngineError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_create_request_rejects_non_boundary_period() {
        let store = MemoryStore::new();
        let collaborator = seed_collaborator(&store, date(2022, 1, 10)).await;
        let lifecycle = RequestLifecycle::new(store, Arc::new(PolicyConfig::default()));

        let result = lifecycle
            .create_request(
                collaborator.id,
                NewVacationRequest {
                    start_date: date(2022, 6, 1),
                    final_date: date(2022, 6, 5),
                    start_period: date(2022, 2, 1),
                    came_imported: false,
                },
            )
            .await;

        assert!(matches!(
            result,
            Err(EngineError::Validation { ref field, .. }) if field == "startPeriod"
        ));
    }

    #[tokio::test]
    async fn test_decide_updates_approval() {
        let store = MemoryStore::new();
        let collaborator = seed_collaborator(&store, date(2022, 1, 10)).await;
        let lifecycle = RequestLifecycle::new(store, Arc::new(PolicyConfig::default()));
        let request = lifecycle
            .create_request(
                collaborator.id,
                NewVacationRequest {
                    start_date: date(2022, 6, 1),
                    final_date: date(2022, 6, 5),
                    start_period: date(2022, 1, 10),
                    came_imported: false,
                },
            )
            .await
            .unwrap();

        let approval = lifecycle
            .decide(
                request.id,
                ApprovalDecision {
                    status: RequestStatus::Rejected,
                    approver: Some("manager-7".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(approval.status, RequestStatus::Rejected);
        assert_eq!(approval.approver.as_deref(), Some("manager-7"));
    }

    #[tokio::test]
    async fn test_failed_approval_leaves_detectable_orphan() {
        let store = FlakyStore::failing_approvals();
        let collaborator = seed_collaborator(&store, date(2020, 1, 1)).await;
        let lifecycle = RequestLifecycle::new(store.clone(), Arc::new(PolicyConfig::default()));

        let result = lifecycle.create_historical_pair(&collaborator, 2021, 10).await;
        assert!(matches!(result, Err(EngineError::Store { .. })));

        let orphans = lifecycle.find_requests_missing_approval().await.unwrap();
        assert_eq!(orphans.len(), 1);
        assert_eq!(orphans[0].start_date, date(2022, 1, 1));

        // Once the store recovers, a decision repairs the orphan.
        store.recover();
        lifecycle
            .decide(
                orphans[0].id,
                ApprovalDecision {
                    status: RequestStatus::Approved,
                    approver: None,
                },
            )
            .await
            .unwrap();
        assert!(lifecycle.find_requests_missing_approval().await.unwrap().is_empty());
        let repaired = store.find_request(orphans[0].id).await.unwrap();
        assert_eq!(repaired.status(), RequestStatus::Approved);
    }
}
