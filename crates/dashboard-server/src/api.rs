use axum::{
    Router,
    body::Bytes,
    extract::{DefaultBodyLimit, Path, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Json, Response},
    routing::{get, patch, post},
};
use domain::{AuthSession, BinStatus, DomainError, FilterState, PageRequest, TableType};
use application::admin::UploadRequest;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::state::AppState;

const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/login", post(login))
        .route("/api/logout", post(logout))
        .route("/api/session", get(current_session))
        .route("/api/sheets", post(list_sheets))
        .route("/api/{table}/records", get(list_records))
        .route("/api/{table}/records/{id}/status", patch(update_status))
        .route("/api/{table}/summary", get(summary))
        .route("/api/{table}/facets", get(facets))
        .route("/api/{table}/export", get(export))
        .route("/api/{table}/uploads", post(upload))
        .route("/api/{table}/imports", get(import_history))
        .route("/api/{table}/weeks/{week}", get(preview_deletion).delete(delete_week))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Domain error rendered as an HTTP response.
pub struct ApiError(DomainError);

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            e if e.is_validation() => StatusCode::BAD_REQUEST,
            DomainError::ParseFailed { .. } | DomainError::Spreadsheet(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            DomainError::RecordNotFound(_) => StatusCode::NOT_FOUND,
            DomainError::RecordBusy(_) | DomainError::StatusNotTracked(_) => StatusCode::CONFLICT,
            DomainError::InvalidCredentials | DomainError::Unauthorized => {
                StatusCode::UNAUTHORIZED
            }
            DomainError::Forbidden => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            warn!(error = %self.0, "Request failed");
        }

        let body = match &self.0 {
            DomainError::ParseFailed { errors } => json!({
                "error": self.0.to_string(),
                "details": errors.iter().map(ToString::to_string).collect::<Vec<_>>(),
            }),
            e => json!({ "error": e.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

fn parse_table(raw: &str) -> Result<TableType, DomainError> {
    raw.parse()
}

async fn user_session(state: &AppState, headers: &HeaderMap) -> Result<AuthSession, DomainError> {
    let session = state.session(headers).await;
    session.require_user()?;
    Ok(session)
}

async fn admin_session(state: &AppState, headers: &HeaderMap) -> Result<AuthSession, DomainError> {
    let session = state.session(headers).await;
    session.require_admin()?;
    Ok(session)
}

#[derive(Deserialize)]
struct LoginRequest {
    password: String,
    #[serde(default)]
    admin: bool,
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let session = state.auth.authenticate(&payload.password, payload.admin)?;
    let token = state.issue_token(session).await;
    info!(admin = session.is_admin, "Login succeeded");
    Ok(Json(json!({
        "token": token,
        "is_authenticated": session.is_authenticated,
        "is_admin": session.is_admin,
    })))
}

async fn logout(State(state): State<Arc<AppState>>, headers: HeaderMap) -> StatusCode {
    state.revoke(&headers).await;
    StatusCode::NO_CONTENT
}

async fn current_session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    Json(state.session(&headers).await)
}

/// Filter fields as query parameters; empty or absent means no filter.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FilterQuery {
    hub_name: String,
    employee_name: String,
    search_text: String,
    week_label: String,
    status: String,
    page: Option<u64>,
}

impl FilterQuery {
    fn filter(&self) -> Result<FilterState, DomainError> {
        Ok(FilterState {
            hub_name: self.hub_name.clone(),
            employee_name: self.employee_name.clone(),
            search_text: self.search_text.clone(),
            week_label: self.week_label.clone(),
            status: FilterState::parse_status(&self.status)?,
        })
    }
}

async fn list_records(
    State(state): State<Arc<AppState>>,
    Path(table): Path<String>,
    Query(query): Query<FilterQuery>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    user_session(&state, &headers).await?;
    let table = parse_table(&table)?;
    let filter = query.filter()?;
    let request = PageRequest::new(query.page.unwrap_or(1));
    let page = state.records.page(table, &filter, request).await?;
    Ok(Json(page))
}

async fn summary(
    State(state): State<Arc<AppState>>,
    Path(table): Path<String>,
    Query(query): Query<FilterQuery>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    user_session(&state, &headers).await?;
    let table = parse_table(&table)?;
    let summary = state.summary.summarize(table, &query.filter()?).await?;
    Ok(Json(json!({
        "total": summary.total,
        "unique_customers": summary.unique_customers,
        "unique_hubs": summary.unique_hubs,
        "status": summary.status,
        "completion_percent": summary.completion_percent(),
    })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FacetQuery {
    hub_name: String,
}

async fn facets(
    State(state): State<Arc<AppState>>,
    Path(table): Path<String>,
    Query(query): Query<FacetQuery>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    user_session(&state, &headers).await?;
    let table = parse_table(&table)?;
    let hub = if query.hub_name.is_empty() {
        None
    } else {
        Some(query.hub_name.as_str())
    };

    let hubs = state.facets.hubs(table).await?;
    let weeks = state.facets.weeks(table).await?;
    let employees = state.facets.employees(table, hub).await?;
    let status_counts = if state.dashboard.status_tracking.is_tracked(table) {
        Some(state.facets.partition_status_counts(table).await?)
    } else {
        None
    };

    Ok(Json(json!({
        "hubs": hubs,
        "weeks": weeks,
        "employees": employees,
        "status_counts": status_counts,
    })))
}

#[derive(Deserialize)]
struct StatusChange {
    status: String,
}

async fn update_status(
    State(state): State<Arc<AppState>>,
    Path((table, id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(payload): Json<StatusChange>,
) -> ApiResult<impl IntoResponse> {
    user_session(&state, &headers).await?;
    let table = parse_table(&table)?;
    let status: BinStatus = payload.status.parse()?;
    let record = state.records.update_status(table, &id, status).await?;
    Ok(Json(record))
}

async fn export(
    State(state): State<Arc<AppState>>,
    Path(table): Path<String>,
    Query(query): Query<FilterQuery>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    user_session(&state, &headers).await?;
    let table = parse_table(&table)?;
    let today = chrono::Local::now().date_naive();
    let file = state.records.export(table, &query.filter()?, today).await?;

    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", file.file_name))
        .map_err(|e| DomainError::Unexpected(e.to_string()))?;
    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(XLSX_CONTENT_TYPE)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.bytes,
    )
        .into_response())
}

async fn list_sheets(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<impl IntoResponse> {
    admin_session(&state, &headers).await?;
    let sheets = state.uploads.list_sheets(&body)?;
    Ok(Json(sheets))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UploadQuery {
    file_name: String,
    week_label: String,
    sheet: Option<String>,
}

async fn upload(
    State(state): State<Arc<AppState>>,
    Path(table): Path<String>,
    Query(query): Query<UploadQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<impl IntoResponse> {
    admin_session(&state, &headers).await?;
    let table = parse_table(&table)?;
    let outcome = state
        .uploads
        .upload(UploadRequest {
            table,
            file_name: query.file_name,
            bytes: body.to_vec(),
            week_label: query.week_label,
            sheet: query.sheet.filter(|s| !s.is_empty()),
        })
        .await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

async fn import_history(
    State(state): State<Arc<AppState>>,
    Path(table): Path<String>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    admin_session(&state, &headers).await?;
    let table = parse_table(&table)?;
    Ok(Json(state.uploads.import_history(table).await?))
}

async fn preview_deletion(
    State(state): State<Arc<AppState>>,
    Path((table, week)): Path<(String, String)>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    admin_session(&state, &headers).await?;
    let table = parse_table(&table)?;
    let pending = state.deletions.prepare(table, &week).await?;
    Ok(Json(json!({
        "table": pending.table(),
        "week_label": pending.week(),
        "matching": pending.matching(),
    })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DeleteQuery {
    confirm: bool,
}

async fn delete_week(
    State(state): State<Arc<AppState>>,
    Path((table, week)): Path<(String, String)>,
    Query(query): Query<DeleteQuery>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    admin_session(&state, &headers).await?;
    let table = parse_table(&table)?;
    let pending = state.deletions.prepare(table, &week).await?;
    if !query.confirm {
        return Err(DomainError::Validation(format!(
            "Deleting {} record(s) of {} requires confirm=true",
            pending.matching(),
            pending.week()
        ))
        .into());
    }
    let outcome = state.deletions.execute(pending.confirm()).await?;
    Ok(Json(outcome))
}
