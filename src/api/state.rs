//! Application state for the vacation API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::clock::Clock;
use crate::config::ConfigLoader;
use crate::services::{CollaboratorService, ImportService, RequestLifecycle};
use crate::store::VacationStore;

/// Shared application state.
///
/// Holds the loaded policy and the services built over one store.
#[derive(Clone)]
pub struct AppState<S> {
    config: Arc<ConfigLoader>,
    collaborators: CollaboratorService<S>,
    requests: RequestLifecycle<S>,
    import: ImportService<S>,
}

impl<S: VacationStore> AppState<S> {
    /// Creates the application state over `store`.
    pub fn new(config: ConfigLoader, store: S, clock: Arc<dyn Clock>) -> Self {
        let policy = Arc::new(config.config().clone());
        Self {
            config: Arc::new(config),
            collaborators: CollaboratorService::new(store.clone(), Arc::clone(&policy), clock),
            requests: RequestLifecycle::new(store.clone(), Arc::clone(&policy)),
            import: ImportService::new(store, policy),
        }
    }

    /// Returns a reference to the configuration loader.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// Returns the collaborator service.
    pub fn collaborators(&self) -> &CollaboratorService<S> {
        &self.collaborators
    }

    /// Returns the request lifecycle manager.
    pub fn requests(&self) -> &RequestLifecycle<S> {
        &self.requests
    }

    /// Returns the import service.
    pub fn import(&self) -> &ImportService<S> {
        &self.import
    }
}
