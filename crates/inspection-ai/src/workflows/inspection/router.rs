use std::sync::Arc;

use axum::{
    async_trait,
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        FromRequestParts, Path, Query, State,
    },
    http::{request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error};

use super::access::{self, DECIDE_REPORT, SUBMIT_REPORT};
use super::domain::{
    deserialize_answers, Answers, Caller, FormId, ReportId, ReportStatus, Role, UserId,
};
use super::repository::InspectionRepository;
use super::review::DEFAULT_PAGE_SIZE;
use super::service::{InspectionWorkflow, ReportServiceError};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Router builder exposing report submission, review, and statistics endpoints.
pub fn report_router<R>(workflow: Arc<InspectionWorkflow<R>>) -> Router
where
    R: InspectionRepository + 'static,
{
    Router::new()
        .route("/reports", post(submit_handler::<R>).get(list_handler::<R>))
        .route("/reports/stats", get(report_stats_handler::<R>))
        .route("/reports/:report_id/status", patch(status_handler::<R>))
        .route("/stats", get(dashboard_stats_handler::<R>))
        .with_state(workflow)
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitReportRequest {
    #[serde(rename = "formId")]
    pub(crate) form_id: FormId,
    #[serde(default, deserialize_with = "deserialize_answers")]
    pub(crate) data: Answers,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusUpdateRequest {
    pub(crate) status: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListQuery {
    pub(crate) page: Option<u32>,
    pub(crate) limit: Option<u32>,
}

/// Identity headers missing or malformed; the gateway did not authenticate the request.
#[derive(Debug)]
pub struct Unauthenticated(&'static str);

impl IntoResponse for Unauthenticated {
    fn into_response(self) -> Response {
        let payload = json!({ "error": self.0 });
        (StatusCode::UNAUTHORIZED, Json(payload)).into_response()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = Unauthenticated;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        caller_from_headers(&parts.headers)
    }
}

fn caller_from_headers(headers: &HeaderMap) -> Result<Caller, Unauthenticated> {
    let id = headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .ok_or(Unauthenticated("missing or invalid x-user-id header"))?;
    let role = headers
        .get(USER_ROLE_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<Role>().ok())
        .ok_or(Unauthenticated("missing or invalid x-user-role header"))?;

    Ok(Caller::new(UserId(id), role))
}

impl IntoResponse for ReportServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            ReportServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ReportServiceError::Forbidden(denied) => {
                debug!(role = %denied.actual, "request forbidden");
                StatusCode::FORBIDDEN
            }
            ReportServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ReportServiceError::InvalidTransition { .. } => StatusCode::CONFLICT,
            ReportServiceError::Store(err) => {
                error!(error = %err, "report store failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let payload = json!({ "error": self.to_string() });
        (status, Json(payload)).into_response()
    }
}

pub(crate) async fn submit_handler<R>(
    State(workflow): State<Arc<InspectionWorkflow<R>>>,
    caller: Caller,
    payload: Result<Json<SubmitReportRequest>, JsonRejection>,
) -> Result<Response, ReportServiceError>
where
    R: InspectionRepository + 'static,
{
    access::require(caller.role, SUBMIT_REPORT)?;
    let Json(request) =
        payload.map_err(|rejection| ReportServiceError::Validation(rejection.body_text()))?;

    let report = workflow
        .submission()
        .submit_report(caller, request.form_id, request.data)
        .await?;

    Ok((StatusCode::CREATED, Json(report)).into_response())
}

pub(crate) async fn list_handler<R>(
    State(workflow): State<Arc<InspectionWorkflow<R>>>,
    caller: Caller,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Response, ReportServiceError>
where
    R: InspectionRepository + 'static,
{
    let Query(query) =
        query.map_err(|rejection| ReportServiceError::Validation(rejection.body_text()))?;

    let listing = workflow.review().list_reports(
        caller,
        query.page.unwrap_or(1),
        query.limit.unwrap_or(DEFAULT_PAGE_SIZE),
    )?;

    Ok((StatusCode::OK, Json(listing)).into_response())
}

pub(crate) async fn status_handler<R>(
    State(workflow): State<Arc<InspectionWorkflow<R>>>,
    caller: Caller,
    report_id: Result<Path<u64>, PathRejection>,
    payload: Result<Json<StatusUpdateRequest>, JsonRejection>,
) -> Result<Response, ReportServiceError>
where
    R: InspectionRepository + 'static,
{
    access::require(caller.role, DECIDE_REPORT)?;
    let Path(report_id) =
        report_id.map_err(|rejection| ReportServiceError::Validation(rejection.body_text()))?;
    let Json(request) =
        payload.map_err(|rejection| ReportServiceError::Validation(rejection.body_text()))?;
    let status = request
        .status
        .parse::<ReportStatus>()
        .map_err(|_| {
            ReportServiceError::Validation(format!(
                "status must be APPROVED or REJECTED, got '{}'",
                request.status
            ))
        })?;

    let report = workflow
        .review()
        .set_status(caller.role, ReportId(report_id), status)?;

    Ok((StatusCode::OK, Json(report)).into_response())
}

pub(crate) async fn report_stats_handler<R>(
    State(workflow): State<Arc<InspectionWorkflow<R>>>,
    caller: Caller,
) -> Result<Response, ReportServiceError>
where
    R: InspectionRepository + 'static,
{
    let stats = workflow.review().get_stats(caller.role)?;
    Ok((StatusCode::OK, Json(stats)).into_response())
}

pub(crate) async fn dashboard_stats_handler<R>(
    State(workflow): State<Arc<InspectionWorkflow<R>>>,
    caller: Caller,
) -> Result<Response, ReportServiceError>
where
    R: InspectionRepository + 'static,
{
    let stats = workflow.review().dashboard_stats(caller.role)?;
    Ok((StatusCode::OK, Json(stats)).into_response())
}
