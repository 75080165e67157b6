// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod session;

use axum::{
    Json, Router,
    extract::{Path, Query, State as AxumState},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::Parser;
use presence::{FormSession, Page, SessionEvent};
use presence_api::{
    ApiError, AttendanceHistoryResponse, CheckInRequest, CheckInResponse,
    ConfirmConversionsResponse, IdentifierAllocation, ListVisitorsResponse, NavigateRequest,
    PromoteVisitorResponse, SessionCheckIn, SessionConversions, SessionResponse,
    ToggleVisitorRequest, allocate_identifier, apply_session_event, confirm_session_conversions,
    get_attendance_history, list_visitors, parse_identifier, parse_page, parse_status,
    promote_visitor, submit_check_in,
};
use presence_domain::{FieldViolation, Identifier, PersonStatus, parse_date};
use presence_persistence::Persistence;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use time::Date;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::session::{SessionStore, StaffAccess};

/// Presence Server - HTTP server for Sunday attendance check-in
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Database location: a `SQLite` file path or `sqlite://` URL. Uses an
    /// in-memory database when absent.
    #[arg(short, long, env = "PRESENCE_DATABASE_URL")]
    database: Option<String>,

    /// Access key required by staff routes (`Authorization: Bearer <key>`)
    #[arg(long, env = "PRESENCE_ACCESS_KEY")]
    access_key: String,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Address to bind the server to
    #[arg(short, long, default_value = "127.0.0.1")]
    bind: String,
}

/// Application state shared across handlers.
///
/// Handlers that need both locks take `sessions` first.
#[derive(Clone)]
struct AppState {
    /// The persistence layer.
    persistence: Arc<Mutex<Persistence>>,
    /// Open form sessions.
    sessions: Arc<Mutex<SessionStore>>,
    /// The staff access key.
    access_key: Arc<String>,
}

/// Query parameters for the visitor list.
#[derive(Debug, Deserialize)]
struct ListVisitorsQuery {
    /// Only visitors first seen on this day (`YYYY-MM-DD`).
    first_attendance: Option<String>,
    /// Session whose "wants to stay" toggles are shown.
    session: Option<String>,
}

/// Query parameters for the identifier allocator.
#[derive(Debug, Deserialize)]
struct NextIdentifierQuery {
    /// `visitor` or `member`.
    status: String,
}

/// API response for a session check-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionCheckInApiResponse {
    session: SessionResponse,
    check_in: CheckInResponse,
}

/// API response for confirmed conversions.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionConversionsApiResponse {
    session: SessionResponse,
    conversions: ConfirmConversionsResponse,
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Error message.
    message: String,
    /// Rejected form fields, for refused check-ins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    violations: Option<Vec<FieldViolation>>,
}

/// HTTP error wrapper that implements `IntoResponse`.
#[derive(Debug)]
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
    /// Rejected form fields, if any.
    violations: Option<Vec<FieldViolation>>,
}

impl HttpError {
    fn session_not_found(key: &str) -> Self {
        warn!(session_key = %key, "Unknown session");
        Self {
            status: StatusCode::NOT_FOUND,
            message: format!("Session not found: {key}"),
            violations: None,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
            violations: self.violations,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let message: String = err.to_string();
        match err {
            ApiError::ValidationFailed { violations } => Self {
                status: StatusCode::BAD_REQUEST,
                message,
                violations: Some(violations),
            },
            ApiError::InvalidInput { .. } => Self {
                status: StatusCode::BAD_REQUEST,
                message,
                violations: None,
            },
            ApiError::DuplicateValue { .. } => Self {
                status: StatusCode::CONFLICT,
                message,
                violations: None,
            },
            ApiError::PreconditionFailed { .. } => Self {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                message,
                violations: None,
            },
            ApiError::ResourceNotFound { .. } => Self {
                status: StatusCode::NOT_FOUND,
                message,
                violations: None,
            },
            ApiError::Internal { .. } => {
                error!(error = %message, "Internal error");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message,
                    violations: None,
                }
            }
        }
    }
}

/// The check-in date: the UTC calendar day at request time.
fn today() -> Date {
    time::OffsetDateTime::now_utc().date()
}

/// Handler for POST `/sessions` endpoint.
///
/// Opens a fresh form session on the attendance page.
async fn handle_create_session(
    AxumState(app_state): AxumState<AppState>,
) -> (StatusCode, Json<SessionResponse>) {
    let mut sessions = app_state.sessions.lock().await;
    let (key, session): (String, FormSession) = sessions.create();
    drop(sessions);
    info!("Created session");

    (
        StatusCode::CREATED,
        Json(SessionResponse::from_session(&key, &session)),
    )
}

/// Handler for GET `/sessions/{key}` endpoint.
async fn handle_get_session(
    AxumState(app_state): AxumState<AppState>,
    Path(key): Path<String>,
) -> Result<Json<SessionResponse>, HttpError> {
    let mut sessions = app_state.sessions.lock().await;
    let session: FormSession = sessions
        .get(&key)
        .ok_or_else(|| HttpError::session_not_found(&key))?;

    Ok(Json(SessionResponse::from_session(&key, &session)))
}

/// Applies a form-only event to a stored session.
async fn update_session(
    app_state: &AppState,
    key: &str,
    event: SessionEvent,
) -> Result<Json<SessionResponse>, HttpError> {
    let mut sessions = app_state.sessions.lock().await;
    let session: FormSession = sessions
        .get(key)
        .ok_or_else(|| HttpError::session_not_found(key))?;

    let next: FormSession = apply_session_event(&session, event)?;
    sessions.replace(key, next.clone());

    Ok(Json(SessionResponse::from_session(key, &next)))
}

/// Handler for POST `/sessions/{key}/check_in` endpoint.
///
/// Submits the check-in form. A refused form is stored on the session
/// (phase `rejected`) and also returned as an error.
async fn handle_session_check_in(
    AxumState(app_state): AxumState<AppState>,
    Path(key): Path<String>,
    Json(request): Json<CheckInRequest>,
) -> Result<Json<SessionCheckInApiResponse>, HttpError> {
    info!(session_key = %key, first_time = request.first_time, "Handling check_in request");

    let mut sessions = app_state.sessions.lock().await;
    let session: FormSession = sessions
        .get(&key)
        .ok_or_else(|| HttpError::session_not_found(&key))?;

    let mut persistence = app_state.persistence.lock().await;
    let outcome: SessionCheckIn = submit_check_in(&mut persistence, &session, &request, today())?;
    drop(persistence);

    sessions.replace(&key, outcome.session.clone());
    drop(sessions);

    let check_in: CheckInResponse = outcome.result?;
    Ok(Json(SessionCheckInApiResponse {
        session: SessionResponse::from_session(&key, &outcome.session),
        check_in,
    }))
}

/// Handler for POST `/sessions/{key}/reset` endpoint.
///
/// Clears the form for the next attendee.
async fn handle_reset_session(
    AxumState(app_state): AxumState<AppState>,
    Path(key): Path<String>,
) -> Result<Json<SessionResponse>, HttpError> {
    update_session(&app_state, &key, SessionEvent::Reset).await
}

/// Handler for POST `/sessions/{key}/navigate` endpoint.
async fn handle_navigate_session(
    AxumState(app_state): AxumState<AppState>,
    Path(key): Path<String>,
    Json(request): Json<NavigateRequest>,
) -> Result<Json<SessionResponse>, HttpError> {
    let page: Page = parse_page(&request.page)?;
    update_session(&app_state, &key, SessionEvent::Navigate(page)).await
}

/// Handler for POST `/sessions/{key}/visitors/{identifier}/selection`
/// endpoint (staff).
///
/// Sets a visitor's "wants to stay" box.
async fn handle_toggle_visitor(
    AxumState(app_state): AxumState<AppState>,
    _staff: StaffAccess,
    Path((key, identifier)): Path<(String, String)>,
    Json(request): Json<ToggleVisitorRequest>,
) -> Result<Json<SessionResponse>, HttpError> {
    let identifier: Identifier = parse_identifier(&identifier)?;
    update_session(
        &app_state,
        &key,
        SessionEvent::ToggleVisitor {
            identifier,
            wants_to_stay: request.wants_to_stay,
        },
    )
    .await
}

/// Handler for POST `/sessions/{key}/conversions` endpoint (staff).
///
/// Converts every visitor selected in the session to a member.
async fn handle_confirm_conversions(
    AxumState(app_state): AxumState<AppState>,
    _staff: StaffAccess,
    Path(key): Path<String>,
) -> Result<Json<SessionConversionsApiResponse>, HttpError> {
    info!(session_key = %key, "Handling confirm_conversions request");

    let mut sessions = app_state.sessions.lock().await;
    let session: FormSession = sessions
        .get(&key)
        .ok_or_else(|| HttpError::session_not_found(&key))?;

    let mut persistence = app_state.persistence.lock().await;
    let outcome: SessionConversions = confirm_session_conversions(&mut persistence, &session)?;
    drop(persistence);

    sessions.replace(&key, outcome.session.clone());

    Ok(Json(SessionConversionsApiResponse {
        session: SessionResponse::from_session(&key, &outcome.session),
        conversions: outcome.response,
    }))
}

/// Handler for GET `/visitors` endpoint (staff).
async fn handle_list_visitors(
    AxumState(app_state): AxumState<AppState>,
    _staff: StaffAccess,
    Query(query): Query<ListVisitorsQuery>,
) -> Result<Json<ListVisitorsResponse>, HttpError> {
    info!(
        first_attendance = ?query.first_attendance,
        "Handling list_visitors request"
    );

    let first_attendance_on: Option<Date> = query
        .first_attendance
        .as_deref()
        .map(parse_date)
        .transpose()
        .map_err(presence_api::translate_domain_error)?;

    let selections: BTreeMap<Identifier, bool> = match &query.session {
        Some(key) => {
            let mut sessions = app_state.sessions.lock().await;
            sessions
                .get(key)
                .ok_or_else(|| HttpError::session_not_found(key))?
                .selections
        }
        None => BTreeMap::new(),
    };

    let mut persistence = app_state.persistence.lock().await;
    let response: ListVisitorsResponse =
        list_visitors(&mut persistence, first_attendance_on, &selections)?;

    Ok(Json(response))
}

/// Handler for POST `/visitors/{identifier}/promote` endpoint (staff).
async fn handle_promote_visitor(
    AxumState(app_state): AxumState<AppState>,
    _staff: StaffAccess,
    Path(identifier): Path<String>,
) -> Result<Json<PromoteVisitorResponse>, HttpError> {
    info!(identifier = %identifier, "Handling promote_visitor request");

    let mut persistence = app_state.persistence.lock().await;
    let response: PromoteVisitorResponse = promote_visitor(&mut persistence, &identifier)?;

    Ok(Json(response))
}

/// Handler for GET `/persons/{identifier}/attendance` endpoint (staff).
async fn handle_get_attendance_history(
    AxumState(app_state): AxumState<AppState>,
    _staff: StaffAccess,
    Path(identifier): Path<String>,
) -> Result<Json<AttendanceHistoryResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: AttendanceHistoryResponse =
        get_attendance_history(&mut persistence, &identifier)?;

    Ok(Json(response))
}

/// Handler for GET `/identifiers/next` endpoint.
///
/// Proposes the next identifier without reserving it.
async fn handle_next_identifier(
    AxumState(app_state): AxumState<AppState>,
    Query(query): Query<NextIdentifierQuery>,
) -> Result<Json<IdentifierAllocation>, HttpError> {
    let status: PersonStatus = parse_status(&query.status)?;

    let mut persistence = app_state.persistence.lock().await;
    let allocation: IdentifierAllocation = allocate_identifier(&mut persistence, status);

    Ok(Json(allocation))
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/sessions", post(handle_create_session))
        .route("/sessions/{key}", get(handle_get_session))
        .route("/sessions/{key}/check_in", post(handle_session_check_in))
        .route("/sessions/{key}/reset", post(handle_reset_session))
        .route("/sessions/{key}/navigate", post(handle_navigate_session))
        .route(
            "/sessions/{key}/visitors/{identifier}/selection",
            post(handle_toggle_visitor),
        )
        .route(
            "/sessions/{key}/conversions",
            post(handle_confirm_conversions),
        )
        .route("/visitors", get(handle_list_visitors))
        .route(
            "/visitors/{identifier}/promote",
            post(handle_promote_visitor),
        )
        .route(
            "/persons/{identifier}/attendance",
            get(handle_get_attendance_history),
        )
        .route("/identifiers/next", get(handle_next_identifier))
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Presence Server");

    let persistence: Persistence = if let Some(database_url) = &args.database {
        info!("Using database at: {}", database_url);
        Persistence::new_with_url(database_url)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };

    let app_state: AppState = AppState {
        persistence: Arc::new(Mutex::new(persistence)),
        sessions: Arc::new(Mutex::new(SessionStore::new())),
        access_key: Arc::new(args.access_key),
    };

    let app: Router = build_router(app_state);

    let addr: std::net::SocketAddr = format!("{}:{}", args.bind, args.port).parse()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests;
