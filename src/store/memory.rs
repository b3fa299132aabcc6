//! [`MemoryStore`], the in-process implementation of the repositories.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{
    ApprovalDecision, ApprovalVacation, Collaborator, CollaboratorPatch, NewApproval,
    NewCollaborator, NewVacationRequest, VacationRequest, VacationRequestPatch,
};

use super::{
    ApprovalFilter, ApprovalRepository, CollaboratorFilter, CollaboratorRepository,
    RepositoryError, RepositoryResult, RequestFilter, SortDirection, SortField,
    VacationRequestRepository,
};

const COLLABORATOR: &str = "collaborator";
const VACATION_REQUEST: &str = "vacation request";
const APPROVAL: &str = "approval";

/// Rows as stored; relations are attached on read.
#[derive(Debug, Default)]
struct Tables {
    collaborators: HashMap<Uuid, Collaborator>,
    requests: HashMap<Uuid, VacationRequest>,
    approvals: HashMap<Uuid, ApprovalVacation>,
}

impl Tables {
    fn approval_for(&self, request_id: Uuid) -> Option<&ApprovalVacation> {
        self.approvals
            .values()
            .find(|a| a.vacation_request_id == request_id)
    }

    fn load_request(&self, row: &VacationRequest) -> VacationRequest {
        let mut request = row.clone();
        request.approval = self.approval_for(row.id).cloned();
        request
    }

    fn load_requests_of(&self, collaborator_id: Uuid) -> Vec<VacationRequest> {
        let mut requests: Vec<_> = self
            .requests
            .values()
            .filter(|r| r.collaborator_id == collaborator_id)
            .map(|r| self.load_request(r))
            .collect();
        requests.sort_by_key(|r| (r.start_date, r.id));
        requests
    }

    fn load_collaborator(&self, row: &Collaborator) -> Collaborator {
        let mut collaborator = row.clone();
        collaborator.requests = self.load_requests_of(row.id);
        collaborator
    }

    fn register_taken(&self, register: &str, except: Option<Uuid>) -> bool {
        let register = register.trim();
        self.collaborators
            .values()
            .any(|c| Some(c.id) != except && c.natural_key() == register)
    }

    fn remove_request(&mut self, id: Uuid) {
        self.requests.remove(&id);
        self.approvals.retain(|_, a| a.vacation_request_id != id);
    }
}

fn compare(a: &Collaborator, b: &Collaborator, field: SortField) -> Ordering {
    let primary = match field {
        SortField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        SortField::Register => a.register.cmp(&b.register),
        SortField::Email => a.email.to_lowercase().cmp(&b.email.to_lowercase()),
        SortField::HiringDate => a.hiring_date.cmp(&b.hiring_date),
    };
    primary.then_with(|| a.register.cmp(&b.register))
}

/// An in-memory store for collaborators, requests, and approvals.
///
/// Cloning is cheap; clones share the same tables. Every call takes the
/// lock once, so each operation is atomic.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl CollaboratorRepository for MemoryStore {
    fn find_collaborators(
        &self,
        filter: CollaboratorFilter,
    ) -> impl Future<Output = RepositoryResult<Vec<Collaborator>>> + Send + '_ {
        async move {
            let tables = self.tables.read().await;
            let needle = filter.search.trim().to_lowercase();

            let mut rows: Vec<&Collaborator> = tables
                .collaborators
                .values()
                .filter(|c| needle.is_empty() || c.name.to_lowercase().contains(&needle))
                .collect();

            rows.sort_by(|a, b| {
                let ordering = compare(a, b, filter.sort_by);
                match filter.sort {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            });

            let (skip, take) = match filter.limit {
                Some(limit) => {
                    let page = filter.page.unwrap_or(1).max(1);
                    ((page as usize - 1) * limit as usize, limit as usize)
                }
                None => (0, usize::MAX),
            };

            Ok(rows
                .into_iter()
                .skip(skip)
                .take(take)
                .map(|c| tables.load_collaborator(c))
                .collect())
        }
    }

    fn find_collaborator(
        &self,
        id: Uuid,
    ) -> impl Future<Output = RepositoryResult<Collaborator>> + Send + '_ {
        async move {
            let tables = self.tables.read().await;
            tables
                .collaborators
                .get(&id)
                .map(|c| tables.load_collaborator(c))
                .ok_or(RepositoryError::NotFound {
                    entity: COLLABORATOR,
                    id,
                })
        }
    }

    fn create_collaborator(
        &self,
        new: NewCollaborator,
    ) -> impl Future<Output = RepositoryResult<Collaborator>> + Send + '_ {
        async move {
            let mut tables = self.tables.write().await;
            if tables.register_taken(&new.register, None) {
                return Err(RepositoryError::Conflict {
                    entity: COLLABORATOR,
                    key: new.register.trim().to_string(),
                });
            }

            let collaborator = Collaborator {
                id: Uuid::new_v4(),
                register: new.register.trim().to_string(),
                name: new.name,
                email: new.email,
                hiring_date: new.hiring_date,
                employment_type: new.employment_type,
                requests: vec![],
            };
            tables
                .collaborators
                .insert(collaborator.id, collaborator.clone());
            Ok(collaborator)
        }
    }

    fn save_collaborator(
        &self,
        id: Uuid,
        patch: CollaboratorPatch,
    ) -> impl Future<Output = RepositoryResult<Collaborator>> + Send + '_ {
        async move {
            let mut tables = self.tables.write().await;
            if let Some(register) = &patch.register {
                if tables.register_taken(register, Some(id)) {
                    return Err(RepositoryError::Conflict {
                        entity: COLLABORATOR,
                        key: register.trim().to_string(),
                    });
                }
            }

            let row = tables
                .collaborators
                .get_mut(&id)
                .ok_or(RepositoryError::NotFound {
                    entity: COLLABORATOR,
                    id,
                })?;
            patch.apply(row);
            let row = row.clone();
            Ok(tables.load_collaborator(&row))
        }
    }

    fn delete_collaborator(
        &self,
        id: Uuid,
    ) -> impl Future<Output = RepositoryResult<()>> + Send + '_ {
        async move {
            let mut tables = self.tables.write().await;
            if tables.collaborators.remove(&id).is_none() {
                return Err(RepositoryError::NotFound {
                    entity: COLLABORATOR,
                    id,
                });
            }

            let owned: Vec<Uuid> = tables
                .requests
                .values()
                .filter(|r| r.collaborator_id == id)
                .map(|r| r.id)
                .collect();
            for request_id in owned {
                tables.remove_request(request_id);
            }
            Ok(())
        }
    }
}

impl VacationRequestRepository for MemoryStore {
    fn find_requests(
        &self,
        filter: RequestFilter,
    ) -> impl Future<Output = RepositoryResult<Vec<VacationRequest>>> + Send + '_ {
        async move {
            let tables = self.tables.read().await;
            let mut requests: Vec<_> = tables
                .requests
                .values()
                .filter(|r| filter.collaborator_id.is_none_or(|id| r.collaborator_id == id))
                .map(|r| tables.load_request(r))
                .filter(|r| !filter.missing_approval || r.is_missing_approval())
                .collect();
            requests.sort_by_key(|r| (r.start_date, r.id));
            Ok(requests)
        }
    }

    fn find_request(
        &self,
        id: Uuid,
    ) -> impl Future<Output = RepositoryResult<VacationRequest>> + Send + '_ {
        async move {
            let tables = self.tables.read().await;
            tables
                .requests
                .get(&id)
                .map(|r| tables.load_request(r))
                .ok_or(RepositoryError::NotFound {
                    entity: VACATION_REQUEST,
                    id,
                })
        }
    }

    fn create_request(
        &self,
        collaborator_id: Uuid,
        new: NewVacationRequest,
    ) -> impl Future<Output = RepositoryResult<VacationRequest>> + Send + '_ {
        async move {
            let mut tables = self.tables.write().await;
            if !tables.collaborators.contains_key(&collaborator_id) {
                return Err(RepositoryError::NotFound {
                    entity: COLLABORATOR,
                    id: collaborator_id,
                });
            }

            let request = VacationRequest {
                id: Uuid::new_v4(),
                collaborator_id,
                start_date: new.start_date,
                final_date: new.final_date,
                start_period: new.start_period,
                came_imported: new.came_imported,
                approval: None,
            };
            tables.requests.insert(request.id, request.clone());
            Ok(request)
        }
    }

    fn save_request(
        &self,
        id: Uuid,
        patch: VacationRequestPatch,
    ) -> impl Future<Output = RepositoryResult<VacationRequest>> + Send + '_ {
        async move {
            let mut tables = self.tables.write().await;
            let row = tables
                .requests
                .get_mut(&id)
                .ok_or(RepositoryError::NotFound {
                    entity: VACATION_REQUEST,
                    id,
                })?;
            patch.apply(row);
            let row = row.clone();
            Ok(tables.load_request(&row))
        }
    }

    fn delete_request(&self, id: Uuid) -> impl Future<Output = RepositoryResult<()>> + Send + '_ {
        async move {
            let mut tables = self.tables.write().await;
            if !tables.requests.contains_key(&id) {
                return Err(RepositoryError::NotFound {
                    entity: VACATION_REQUEST,
                    id,
                });
            }
            tables.remove_request(id);
            Ok(())
        }
    }
}

impl ApprovalRepository for MemoryStore {
    fn find_approvals(
        &self,
        filter: ApprovalFilter,
    ) -> impl Future<Output = RepositoryResult<Vec<ApprovalVacation>>> + Send + '_ {
        async move {
            let tables = self.tables.read().await;
            Ok(tables
                .approvals
                .values()
                .filter(|a| filter.status.is_none_or(|status| a.status == status))
                .cloned()
                .collect())
        }
    }

    fn find_approval(
        &self,
        id: Uuid,
    ) -> impl Future<Output = RepositoryResult<ApprovalVacation>> + Send + '_ {
        async move {
            let tables = self.tables.read().await;
            tables
                .approvals
                .get(&id)
                .cloned()
                .ok_or(RepositoryError::NotFound { entity: APPROVAL, id })
        }
    }

    fn create_approval(
        &self,
        new: NewApproval,
    ) -> impl Future<Output = RepositoryResult<ApprovalVacation>> + Send + '_ {
        async move {
            let mut tables = self.tables.write().await;
            if !tables.requests.contains_key(&new.vacation_request_id) {
                return Err(RepositoryError::NotFound {
                    entity: VACATION_REQUEST,
                    id: new.vacation_request_id,
                });
            }
            if tables.approval_for(new.vacation_request_id).is_some() {
                return Err(RepositoryError::Conflict {
                    entity: APPROVAL,
                    key: new.vacation_request_id.to_string(),
                });
            }

            let approval = ApprovalVacation {
                id: Uuid::new_v4(),
                vacation_request_id: new.vacation_request_id,
                status: new.status,
                approver: new.approver,
            };
            tables.approvals.insert(approval.id, approval.clone());
            Ok(approval)
        }
    }

    fn save_approval(
        &self,
        id: Uuid,
        decision: ApprovalDecision,
    ) -> impl Future<Output = RepositoryResult<ApprovalVacation>> + Send + '_ {
        async move {
            let mut tables = self.tables.write().await;
            let approval = tables
                .approvals
                .get_mut(&id)
                .ok_or(RepositoryError::NotFound { entity: APPROVAL, id })?;
            approval.status = decision.status;
            if decision.approver.is_some() {
                approval.approver = decision.approver;
            }
            Ok(approval.clone())
        }
    }

    fn delete_approval(&self, id: Uuid) -> impl Future<Output = RepositoryResult<()>> + Send + '_ {
        async move {
            let mut tables = self.tables.write().await;
            tables
                .approvals
                .remove(&id)
                .map(|_| ())
                .ok_or(RepositoryError::NotFound { entity: APPROVAL, id })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EmploymentType, RequestStatus};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn new_collaborator(register: &str, name: &str) -> NewCollaborator {
        NewCollaborator {
            register: register.to_string(),
            name: name.to_string(),
            email: format!("{}@example.com", register.to_lowercase()),
            hiring_date: date(2022, 1, 10),
            employment_type: EmploymentType::Clt,
        }
    }

    fn new_request(start: NaiveDate, end: NaiveDate) -> NewVacationRequest {
        NewVacationRequest {
            start_date: start,
            final_date: end,
            start_period: date(2022, 1, 10),
            came_imported: false,
        }
    }

    #[tokio::test]
    async fn test_duplicate_register_is_a_conflict() {
        let store = MemoryStore::new();
        store
            .create_collaborator(new_collaborator("R-001", "Ana"))
            .await
            .unwrap();

        let result = store
            .create_collaborator(new_collaborator(" R-001 ", "Bruno"))
            .await;

        assert_eq!(
            result,
            Err(RepositoryError::Conflict {
                entity: "collaborator",
                key: "R-001".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_and_sorted() {
        let store = MemoryStore::new();
        for (register, name) in [("R-1", "Carla Dias"), ("R-2", "ana lima"), ("R-3", "Bruno Alves")] {
            store
                .create_collaborator(new_collaborator(register, name))
                .await
                .unwrap();
        }

        let all = store
            .find_collaborators(CollaboratorFilter::default())
            .await
            .unwrap();
        let names: Vec<_> = all.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["ana lima", "Bruno Alves", "Carla Dias"]);

        let found = store
            .find_collaborators(CollaboratorFilter {
                search: "LI".to_string(),
                ..CollaboratorFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].register, "R-2");
    }

    #[tokio::test]
    async fn test_descending_sort_and_paging() {
        let store = MemoryStore::new();
        for register in ["R-1", "R-2", "R-3", "R-4", "R-5"] {
            store
                .create_collaborator(new_collaborator(register, register))
                .await
                .unwrap();
        }

        let page = store
            .find_collaborators(CollaboratorFilter {
                sort_by: SortField::Register,
                sort: SortDirection::Desc,
                page: Some(2),
                limit: Some(2),
                ..CollaboratorFilter::default()
            })
            .await
            .unwrap();

        let registers: Vec<_> = page.iter().map(|c| c.register.as_str()).collect();
        assert_eq!(registers, vec!["R-3", "R-2"]);
    }

    #[tokio::test]
    async fn test_collaborator_loads_requests_and_approvals() {
        let store = MemoryStore::new();
        let collaborator = store
            .create_collaborator(new_collaborator("R-001", "Ana"))
            .await
            .unwrap();
        let later = store
            .create_request(collaborator.id, new_request(date(2022, 9, 1), date(2022, 9, 5)))
            .await
            .unwrap();
        let earlier = store
            .create_request(collaborator.id, new_request(date(2022, 6, 1), date(2022, 6, 5)))
            .await
            .unwrap();
        store
            .create_approval(NewApproval {
                vacation_request_id: earlier.id,
                status: RequestStatus::Approved,
                approver: Some("manager".to_string()),
            })
            .await
            .unwrap();

        let loaded = store.find_collaborator(collaborator.id).await.unwrap();

        assert_eq!(loaded.requests.len(), 2);
        assert_eq!(loaded.requests[0].id, earlier.id);
        assert_eq!(loaded.requests[0].status(), RequestStatus::Approved);
        assert_eq!(loaded.requests[1].id, later.id);
        assert!(loaded.requests[1].is_missing_approval());
    }

    #[tokio::test]
    async fn test_request_for_unknown_collaborator_is_not_found() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();

        let result = store
            .create_request(id, new_request(date(2022, 6, 1), date(2022, 6, 5)))
            .await;

        assert_eq!(
            result,
            Err(RepositoryError::NotFound {
                entity: "collaborator",
                id
            })
        );
    }

    #[tokio::test]
    async fn test_second_approval_for_request_is_a_conflict() {
        let store = MemoryStore::new();
        let collaborator = store
            .create_collaborator(new_collaborator("R-001", "Ana"))
            .await
            .unwrap();
        let request = store
            .create_request(collaborator.id, new_request(date(2022, 6, 1), date(2022, 6, 5)))
            .await
            .unwrap();
        let approval = NewApproval {
            vacation_request_id: request.id,
            status: RequestStatus::Pending,
            approver: None,
        };
        store.create_approval(approval.clone()).await.unwrap();

        let result = store.create_approval(approval).await;

        assert!(matches!(result, Err(RepositoryError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_delete_collaborator_cascades() {
        let store = MemoryStore::new();
        let collaborator = store
            .create_collaborator(new_collaborator("R-001", "Ana"))
            .await
            .unwrap();
        let request = store
            .create_request(collaborator.id, new_request(date(2022, 6, 1), date(2022, 6, 5)))
            .await
            .unwrap();
        store
            .create_approval(NewApproval {
                vacation_request_id: request.id,
                status: RequestStatus::Approved,
                approver: None,
            })
            .await
            .unwrap();

        store.delete_collaborator(collaborator.id).await.unwrap();

        assert!(store
            .find_requests(RequestFilter::default())
            .await
            .unwrap()
            .is_empty());
        assert!(store
            .find_approvals(ApprovalFilter::default())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_missing_approval_filter() {
        let store = MemoryStore::new();
        let collaborator = store
            .create_collaborator(new_collaborator("R-001", "Ana"))
            .await
            .unwrap();
        let orphan = store
            .create_request(collaborator.id, new_request(date(2022, 6, 1), date(2022, 6, 5)))
            .await
            .unwrap();
        let mut imported = new_request(date(2022, 7, 1), date(2022, 7, 5));
        imported.came_imported = true;
        store.create_request(collaborator.id, imported).await.unwrap();

        let missing = store
            .find_requests(RequestFilter {
                missing_approval: true,
                ..RequestFilter::default()
            })
            .await
            .unwrap();

        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].id, orphan.id);
    }

    #[tokio::test]
    async fn test_save_collaborator_rejects_taken_register() {
        let store = MemoryStore::new();
        store
            .create_collaborator(new_collaborator("R-001", "Ana"))
            .await
            .unwrap();
        let bruno = store
            .create_collaborator(new_collaborator("R-002", "Bruno"))
            .await
            .unwrap();

        let result = store
            .save_collaborator(
                bruno.id,
                CollaboratorPatch {
                    register: Some("R-001".to_string()),
                    ..CollaboratorPatch::default()
                },
            )
            .await;

        assert!(matches!(result, Err(RepositoryError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_register_is_stored_trimmed() {
        let store = MemoryStore::new();
        let created = store
            .create_collaborator(new_collaborator(" R-002 ", "Ana"))
            .await
            .unwrap();
        store
            .create_collaborator(new_collaborator("R-001", "Bruno"))
            .await
            .unwrap();

        assert_eq!(created.register, "R-002");
        let saved = store
            .save_collaborator(
                created.id,
                CollaboratorPatch {
                    register: Some("  R-003\t".to_string()),
                    ..CollaboratorPatch::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(saved.register, "R-003");

        let by_register = store
            .find_collaborators(CollaboratorFilter {
                sort_by: SortField::Register,
                ..CollaboratorFilter::default()
            })
            .await
            .unwrap();
        let registers: Vec<_> = by_register.iter().map(|c| c.register.as_str()).collect();
        assert_eq!(registers, vec!["R-001", "R-003"]);
    }

    #[tokio::test]
    async fn test_save_request_merges_patch() {
        let store = MemoryStore::new();
        let collaborator = store
            .create_collaborator(new_collaborator("R-001", "Ana"))
            .await
            .unwrap();
        let request = store
            .create_request(collaborator.id, new_request(date(2022, 6, 1), date(2022, 6, 5)))
            .await
            .unwrap();
        store
            .create_approval(NewApproval {
                vacation_request_id: request.id,
                status: RequestStatus::Pending,
                approver: None,
            })
            .await
            .unwrap();

        let saved = store
            .save_request(
                request.id,
                VacationRequestPatch {
                    final_date: Some(date(2022, 6, 12)),
                    ..VacationRequestPatch::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(saved.start_date, date(2022, 6, 1));
        assert_eq!(saved.final_date, date(2022, 6, 12));
        assert_eq!(saved.start_period, date(2022, 1, 10));
        assert_eq!(saved.status(), RequestStatus::Pending);
        assert_eq!(store.find_request(request.id).await.unwrap(), saved);
    }

    #[tokio::test]
    async fn test_save_unknown_request_is_not_found() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();

        let result = store
            .save_request(id, VacationRequestPatch::default())
            .await;

        assert_eq!(
            result,
            Err(RepositoryError::NotFound {
                entity: "vacation request",
                id
            })
        );
    }

    #[tokio::test]
    async fn test_delete_request_removes_its_approval() {
        let store = MemoryStore::new();
        let collaborator = store
            .create_collaborator(new_collaborator("R-001", "Ana"))
            .await
            .unwrap();
        let kept = store
            .create_request(collaborator.id, new_request(date(2022, 9, 1), date(2022, 9, 5)))
            .await
            .unwrap();
        let removed = store
            .create_request(collaborator.id, new_request(date(2022, 6, 1), date(2022, 6, 5)))
            .await
            .unwrap();
        for request_id in [kept.id, removed.id] {
            store
                .create_approval(NewApproval {
                    vacation_request_id: request_id,
                    status: RequestStatus::Approved,
                    approver: None,
                })
                .await
                .unwrap();
        }

        store.delete_request(removed.id).await.unwrap();

        let approvals = store.find_approvals(ApprovalFilter::default()).await.unwrap();
        assert_eq!(approvals.len(), 1);
        assert_eq!(approvals[0].vacation_request_id, kept.id);
        let loaded = store.find_collaborator(collaborator.id).await.unwrap();
        assert_eq!(loaded.requests.len(), 1);
        assert_eq!(loaded.requests[0].id, kept.id);
        assert_eq!(
            store.delete_request(removed.id).await,
            Err(RepositoryError::NotFound {
                entity: "vacation request",
                id: removed.id
            })
        );
    }

    #[tokio::test]
    async fn test_find_and_delete_approval_by_id() {
        let store = MemoryStore::new();
        let collaborator = store
            .create_collaborator(new_collaborator("R-001", "Ana"))
            .await
            .unwrap();
        let request = store
            .create_request(collaborator.id, new_request(date(2022, 6, 1), date(2022, 6, 5)))
            .await
            .unwrap();
        let approval = store
            .create_approval(NewApproval {
                vacation_request_id: request.id,
                status: RequestStatus::Pending,
                approver: Some("manager-1".to_string()),
            })
            .await
            .unwrap();

        let found = store.find_approval(approval.id).await.unwrap();
        assert_eq!(found, approval);

        store.delete_approval(approval.id).await.unwrap();

        assert_eq!(
            store.find_approval(approval.id).await,
            Err(RepositoryError::NotFound {
                entity: "approval",
                id: approval.id
            })
        );
        assert!(store.find_request(request.id).await.unwrap().is_missing_approval());
    }

    #[tokio::test]
    async fn test_unknown_approval_is_not_found() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();

        assert_eq!(
            store.find_approval(id).await,
            Err(RepositoryError::NotFound {
                entity: "approval",
                id
            })
        );
        assert_eq!(
            store.delete_approval(id).await,
            Err(RepositoryError::NotFound {
                entity: "approval",
                id
            })
        );
    }
}
