//! HTTP request handlers for the vacation API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::EngineError;
use crate::models::{CollaboratorPatch, NewCollaborator};
use crate::services::parse_id;
use crate::store::{CollaboratorFilter, VacationStore};

use super::request::{ApprovalBody, VacationRequestBody};
use super::response::{ApiError, ApiErrorResponse, HealthResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router<S: VacationStore>(state: AppState<S>) -> Router {
    Router::new()
        .route("/health", get(health_handler::<S>))
        .route(
            "/collaborators",
            get(list_collaborators_handler::<S>).post(create_collaborator_handler::<S>),
        )
        .route("/collaborators/import", post(import_handler::<S>))
        .route(
            "/collaborators/:id",
            get(get_collaborator_handler::<S>)
                .put(update_collaborator_handler::<S>)
                .delete(delete_collaborator_handler::<S>),
        )
        .route("/collaborators/:id/period", get(period_handler::<S>))
        .route(
            "/collaborators/:id/requests",
            post(create_request_handler::<S>),
        )
        .route(
            "/requests/missing-approval",
            get(missing_approval_handler::<S>),
        )
        .route("/requests/:id/approval", put(decide_handler::<S>))
        .with_state(state)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn error_response(correlation_id: Uuid, error: EngineError) -> Response {
    match &error {
        EngineError::Validation { .. }
        | EngineError::NotFound { .. }
        | EngineError::Conflict { .. }
        | EngineError::PartialBatchFailure { .. } => {
            warn!(correlation_id = %correlation_id, error = %error, "Request rejected");
        }
        _ => {
            error!(correlation_id = %correlation_id, error = %error, "Request failed");
        }
    }
    let api_error: ApiErrorResponse = error.into();
    json_response(api_error.status, api_error.error)
}

fn json_rejection_response(correlation_id: Uuid, rejection: JsonRejection) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            ApiError::validation_error(body_text)
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    json_response(StatusCode::BAD_REQUEST, error)
}

/// Handler for GET /health.
async fn health_handler<S: VacationStore>(State(state): State<AppState<S>>) -> Response {
    json_response(
        StatusCode::OK,
        HealthResponse {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            policy: state.config().metadata().code.clone(),
        },
    )
}

/// Handler for GET /collaborators.
///
/// Lists collaborators with the situation of their open period.
async fn list_collaborators_handler<S: VacationStore>(
    State(state): State<AppState<S>>,
    query: Result<Query<CollaboratorFilter>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();

    let filter = match query {
        Ok(Query(filter)) => filter,
        Err(rejection) => {
            warn!(correlation_id = %correlation_id, error = %rejection, "Invalid query");
            return json_response(
                StatusCode::BAD_REQUEST,
                ApiError::validation_error(rejection.body_text()),
            );
        }
    };
    info!(
        correlation_id = %correlation_id,
        search = %filter.search,
        sort_by = ?filter.sort_by,
        sort = ?filter.sort,
        "Listing collaborators"
    );

    let start_time = Instant::now();
    match state.collaborators().list_collaborators(filter).await {
        Ok(summaries) => {
            let degraded = summaries.iter().filter(|s| s.situation.is_none()).count();
            info!(
                correlation_id = %correlation_id,
                count = summaries.len(),
                degraded,
                duration_us = start_time.elapsed().as_micros(),
                "Listing completed"
            );
            json_response(StatusCode::OK, summaries)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for POST /collaborators.
async fn create_collaborator_handler<S: VacationStore>(
    State(state): State<AppState<S>>,
    payload: Result<Json<NewCollaborator>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let new = match payload {
        Ok(Json(new)) => new,
        Err(rejection) => return json_rejection_response(correlation_id, rejection),
    };

    match state.collaborators().create(new).await {
        Ok(collaborator) => json_response(StatusCode::CREATED, collaborator),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for GET /collaborators/:id.
async fn get_collaborator_handler<S: VacationStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let result = match parse_id("id", &id) {
        Ok(id) => state.collaborators().find_one_or_fail(id).await,
        Err(err) => Err(err),
    };
    match result {
        Ok(collaborator) => json_response(StatusCode::OK, collaborator),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for PUT /collaborators/:id.
async fn update_collaborator_handler<S: VacationStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    payload: Result<Json<CollaboratorPatch>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let patch = match payload {
        Ok(Json(patch)) => patch,
        Err(rejection) => return json_rejection_response(correlation_id, rejection),
    };

    let result = match parse_id("id", &id) {
        Ok(id) => state.collaborators().update(id, patch).await,
        Err(err) => Err(err),
    };
    match result {
        Ok(collaborator) => json_response(StatusCode::OK, collaborator),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for DELETE /collaborators/:id.
async fn delete_collaborator_handler<S: VacationStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let result = match parse_id("id", &id) {
        Ok(id) => state.collaborators().delete_by_id(id).await,
        Err(err) => Err(err),
    };
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for GET /collaborators/:id/period.
///
/// Returns the collaborator's open accrual period.
async fn period_handler<S: VacationStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    match state.collaborators().get_collaborator_detail(&id).await {
        Ok(view) => {
            info!(
                correlation_id = %correlation_id,
                collaborator_id = %view.id,
                period_start = %view.period.start,
                situation = %view.period.situation,
                days_balance = view.period.days_balance,
                "Computed period"
            );
            json_response(StatusCode::OK, view)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for POST /collaborators/:id/requests.
async fn create_request_handler<S: VacationStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    payload: Result<Json<VacationRequestBody>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => return json_rejection_response(correlation_id, rejection),
    };

    let result = match parse_id("id", &id) {
        Ok(id) => state.requests().create_request(id, body.into()).await,
        Err(err) => Err(err),
    };
    match result {
        Ok(request) => json_response(StatusCode::CREATED, request),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for POST /collaborators/import.
///
/// The body must be a JSON array; its elements are converted one by one, so
/// a malformed row only fails itself. Responds 200 when every row was
/// inserted or skipped and 207 when some rows failed; the body is the import
/// report either way.
async fn import_handler<S: VacationStore>(
    State(state): State<AppState<S>>,
    payload: Result<Json<Vec<Value>>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let rows = match payload {
        Ok(Json(rows)) => rows,
        Err(rejection) => return json_rejection_response(correlation_id, rejection),
    };
    info!(correlation_id = %correlation_id, rows = rows.len(), "Importing collaborators");

    match state.import().import_batch(rows).await {
        Ok(report) => {
            let status = if report.is_complete() {
                StatusCode::OK
            } else {
                warn!(
                    correlation_id = %correlation_id,
                    failed = report.failures.len(),
                    "Import completed with failures"
                );
                StatusCode::MULTI_STATUS
            };
            json_response(status, report)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for PUT /requests/:id/approval.
async fn decide_handler<S: VacationStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    payload: Result<Json<ApprovalBody>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => return json_rejection_response(correlation_id, rejection),
    };

    let result = match parse_id("requestId", &id) {
        Ok(id) => state.requests().decide(id, body.into()).await,
        Err(err) => Err(err),
    };
    match result {
        Ok(approval) => json_response(StatusCode::OK, approval),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for GET /requests/missing-approval.
async fn missing_approval_handler<S: VacationStore>(State(state): State<AppState<S>>) -> Response {
    let correlation_id = Uuid::new_v4();
    match state.requests().find_requests_missing_approval().await {
        Ok(orphans) => {
            if !orphans.is_empty() {
                warn!(
                    correlation_id = %correlation_id,
                    count = orphans.len(),
                    "Requests without approval found"
                );
            }
            json_response(StatusCode::OK, orphans)
        }
        Err(err) => error_response(correlation_id, err),
    }
}
