//! Repository abstraction over collaborators, requests, and approvals.
//!
//! The services depend on these traits, not on a concrete backend.
//! [`MemoryStore`] is the in-process implementation used by the binary and
//! the tests.
//!
//! All methods return `Send` futures so the traits can be used from axum
//! handlers on a multi-threaded runtime. Method names carry the entity name
//! because one store type implements all three traits.

mod memory;

use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    ApprovalDecision, ApprovalVacation, Collaborator, CollaboratorPatch, NewApproval,
    NewCollaborator, NewVacationRequest, RequestStatus, VacationRequest, VacationRequestPatch,
};

pub use memory::MemoryStore;

/// Error enumeration for repository failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// The id does not resolve to a record.
    #[error("{entity} {id} not found")]
    NotFound {
        /// The entity kind.
        entity: &'static str,
        /// The id looked up.
        id: Uuid,
    },
    /// A uniqueness constraint was violated.
    #[error("{entity} with key {key} already exists")]
    Conflict {
        /// The entity kind.
        entity: &'static str,
        /// The conflicting key.
        key: String,
    },
    /// The backend could not serve the call.
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// A type alias for Results that return RepositoryError.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

// ─── Query types ─────────────────────────────────────────────────────────────

/// Field a collaborator listing is sorted by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    /// Collaborator name (default).
    #[default]
    Name,
    /// Registration number.
    Register,
    /// E-mail address.
    Email,
    /// Hiring date.
    HiringDate,
}

/// Sort direction; accepts `ASC`/`DESC` as well as `1`/`-1`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    /// Ascending (default).
    #[default]
    #[serde(rename = "ASC", alias = "asc", alias = "1")]
    Asc,
    /// Descending.
    #[serde(rename = "DESC", alias = "desc", alias = "-1")]
    Desc,
}

/// Filter for collaborator listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaboratorFilter {
    /// Sort field, `name` by default.
    #[serde(default)]
    pub sort_by: SortField,
    /// Sort direction, `ASC` by default.
    #[serde(default)]
    pub sort: SortDirection,
    /// Case-insensitive substring matched against the name.
    #[serde(default)]
    pub search: String,
    /// 1-based page number; requires `limit`.
    #[serde(default)]
    pub page: Option<u32>,
    /// Page size.
    #[serde(default)]
    pub limit: Option<u32>,
}

/// Filter for vacation request listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestFilter {
    /// Restrict to one collaborator.
    pub collaborator_id: Option<Uuid>,
    /// Only live requests without an approval record.
    pub missing_approval: bool,
}

/// Filter for approval listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApprovalFilter {
    /// Restrict to one status.
    pub status: Option<RequestStatus>,
}

// ─── Traits ──────────────────────────────────────────────────────────────────

/// Persistence of collaborators.
///
/// Collaborators are returned with their requests (and the requests'
/// approvals) loaded, ordered by start date.
pub trait CollaboratorRepository: Send + Sync {
    /// List collaborators matching `filter`, sorted and paged.
    fn find_collaborators(
        &self,
        filter: CollaboratorFilter,
    ) -> impl Future<Output = RepositoryResult<Vec<Collaborator>>> + Send + '_;

    /// Load one collaborator with its relations.
    fn find_collaborator(
        &self,
        id: Uuid,
    ) -> impl Future<Output = RepositoryResult<Collaborator>> + Send + '_;

    /// Persist a new collaborator; the register must be unused.
    fn create_collaborator(
        &self,
        new: NewCollaborator,
    ) -> impl Future<Output = RepositoryResult<Collaborator>> + Send + '_;

    /// Merge `patch` into a collaborator and save it.
    fn save_collaborator(
        &self,
        id: Uuid,
        patch: CollaboratorPatch,
    ) -> impl Future<Output = RepositoryResult<Collaborator>> + Send + '_;

    /// Delete a collaborator together with its requests and approvals.
    fn delete_collaborator(&self, id: Uuid)
    -> impl Future<Output = RepositoryResult<()>> + Send + '_;
}

/// Persistence of vacation requests.
pub trait VacationRequestRepository: Send + Sync {
    /// List requests matching `filter`, ordered by start date.
    fn find_requests(
        &self,
        filter: RequestFilter,
    ) -> impl Future<Output = RepositoryResult<Vec<VacationRequest>>> + Send + '_;

    /// Load one request with its approval.
    fn find_request(
        &self,
        id: Uuid,
    ) -> impl Future<Output = RepositoryResult<VacationRequest>> + Send + '_;

    /// Persist a new request for an existing collaborator.
    fn create_request(
        &self,
        collaborator_id: Uuid,
        new: NewVacationRequest,
    ) -> impl Future<Output = RepositoryResult<VacationRequest>> + Send + '_;

    /// Merge `patch` into a request and save it.
    fn save_request(
        &self,
        id: Uuid,
        patch: VacationRequestPatch,
    ) -> impl Future<Output = RepositoryResult<VacationRequest>> + Send + '_;

    /// Delete a request together with its approval.
    fn delete_request(&self, id: Uuid) -> impl Future<Output = RepositoryResult<()>> + Send + '_;
}

/// Persistence of approval records.
pub trait ApprovalRepository: Send + Sync {
    /// List approvals matching `filter`.
    fn find_approvals(
        &self,
        filter: ApprovalFilter,
    ) -> impl Future<Output = RepositoryResult<Vec<ApprovalVacation>>> + Send + '_;

    /// Load one approval.
    fn find_approval(
        &self,
        id: Uuid,
    ) -> impl Future<Output = RepositoryResult<ApprovalVacation>> + Send + '_;

    /// Persist an approval for an existing request that has none yet.
    fn create_approval(
        &self,
        new: NewApproval,
    ) -> impl Future<Output = RepositoryResult<ApprovalVacation>> + Send + '_;

    /// Merge a decision into an approval and save it.
    fn save_approval(
        &self,
        id: Uuid,
        decision: ApprovalDecision,
    ) -> impl Future<Output = RepositoryResult<ApprovalVacation>> + Send + '_;

    /// Delete an approval.
    fn delete_approval(&self, id: Uuid) -> impl Future<Output = RepositoryResult<()>> + Send + '_;
}

/// Everything the services need from a backend.
pub trait VacationStore:
    CollaboratorRepository + VacationRequestRepository + ApprovalRepository + Clone + 'static
{
}

impl<T> VacationStore for T where
    T: CollaboratorRepository + VacationRequestRepository + ApprovalRepository + Clone + 'static
{
}
