//! A store wrapper whose writes can be made to fail.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use uuid::Uuid;

use crate::models::{
    ApprovalDecision, ApprovalVacation, Collaborator, CollaboratorPatch, NewApproval,
    NewCollaborator, NewVacationRequest, VacationRequest, VacationRequestPatch,
};
use crate::store::{
    ApprovalFilter, ApprovalRepository, CollaboratorFilter, CollaboratorRepository, MemoryStore,
    RepositoryError, RepositoryResult, RequestFilter, VacationRequestRepository,
};

/// Delegates to a [`MemoryStore`] but rejects approval writes while
/// `fail_approvals` is set.
#[derive(Debug, Clone, Default)]
pub(crate) struct FlakyStore {
    inner: MemoryStore,
    fail_approvals: Arc<AtomicBool>,
}

impl FlakyStore {
    pub(crate) fn failing_approvals() -> Self {
        let store = Self::default();
        store.fail_approvals.store(true, Ordering::SeqCst);
        store
    }

    pub(crate) fn recover(&self) {
        self.fail_approvals.store(false, Ordering::SeqCst);
    }
}

impl CollaboratorRepository for FlakyStore {
    fn find_collaborators(
        &self,
        filter: CollaboratorFilter,
    ) -> impl Future<Output = RepositoryResult<Vec<Collaborator>>> + Send + '_ {
        self.inner.find_collaborators(filter)
    }

    fn find_collaborator(
        &self,
        id: Uuid,
    ) -> impl Future<Output = RepositoryResult<Collaborator>> + Send + '_ {
        self.inner.find_collaborator(id)
    }

    fn create_collaborator(
        &self,
        new: NewCollaborator,
    ) -> impl Future<Output = RepositoryResult<Collaborator>> + Send + '_ {
        self.inner.create_collaborator(new)
    }

    fn save_collaborator(
        &self,
        id: Uuid,
        patch: CollaboratorPatch,
    ) -> impl Future<Output = RepositoryResult<Collaborator>> + Send + '_ {
        self.inner.save_collaborator(id, patch)
    }

    fn delete_collaborator(
        &self,
        id: Uuid,
    ) -> impl Future<Output = RepositoryResult<()>> + Send + '_ {
        self.inner.delete_collaborator(id)
    }
}

impl VacationRequestRepository for FlakyStore {
    fn find_requests(
        &self,
        filter: RequestFilter,
    ) -> impl Future<Output = RepositoryResult<Vec<VacationRequest>>> + Send + '_ {
        self.inner.find_requests(filter)
    }

    fn find_request(
        &self,
        id: Uuid,
    ) -> impl Future<Output = RepositoryResult<VacationRequest>> + Send + '_ {
        self.inner.find_request(id)
    }

    fn create_request(
        &self,
        collaborator_id: Uuid,
        new: NewVacationRequest,
    ) -> impl Future<Output = RepositoryResult<VacationRequest>> + Send + '_ {
        self.inner.create_request(collaborator_id, new)
    }

    fn save_request(
        &self,
        id: Uuid,
        patch: VacationRequestPatch,
    ) -> impl Future<Output = RepositoryResult<VacationRequest>> + Send + '_ {
        self.inner.save_request(id, patch)
    }

    fn delete_request(&self, id: Uuid) -> impl Future<Output = RepositoryResult<()>> + Send + '_ {
        self.inner.delete_request(id)
    }
}

impl ApprovalRepository for FlakyStore {
    fn find_approvals(
        &self,
        filter: ApprovalFilter,
    ) -> impl Future<Output = RepositoryResult<Vec<ApprovalVacation>>> + Send + '_ {
        self.inner.find_approvals(filter)
    }

    fn find_approval(
        &self,
        id: Uuid,
    ) -> impl Future<Output = RepositoryResult<ApprovalVacation>> + Send + '_ {
        self.inner.find_approval(id)
    }

    fn create_approval(
        &self,
        new: NewApproval,
    ) -> impl Future<Output = RepositoryResult<ApprovalVacation>> + Send + '_ {
        async move {
            if self.fail_approvals.load(Ordering::SeqCst) {
                return Err(RepositoryError::Unavailable(
                    "approval table is read-only".to_string(),
                ));
            }
            self.inner.create_approval(new).await
        }
    }

    fn save_approval(
        &self,
        id: Uuid,
        decision: ApprovalDecision,
    ) -> impl Future<Output = RepositoryResult<ApprovalVacation>> + Send + '_ {
        self.inner.save_approval(id, decision)
    }

    fn delete_approval(&self, id: Uuid) -> impl Future<Output = RepositoryResult<()>> + Send + '_ {
        self.inner.delete_approval(id)
    }
}
