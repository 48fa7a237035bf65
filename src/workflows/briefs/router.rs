use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use super::domain::{BriefId, ResponseId};
use super::eligibility::IneligibleReason;
use super::export;
use super::repository::{MarketplaceStore, StoreError};
use super::service::{
    BriefService, BriefServiceError, BriefView, CreateBrief, ResponseSubmission, ResponseView,
};

/// Router builder exposing the brief and response endpoints.
pub fn brief_router<S>(service: Arc<BriefService<S>>) -> Router
where
    S: MarketplaceStore,
{
    Router::new()
        .route("/api/v1/briefs", post(create_brief_handler::<S>))
        .route("/api/v1/briefs/:brief_id", get(get_brief_handler::<S>))
        .route(
            "/api/v1/briefs/:brief_id/publish",
            post(publish_brief_handler::<S>),
        )
        .route(
            "/api/v1/briefs/:brief_id/withdraw",
            post(withdraw_brief_handler::<S>),
        )
        .route(
            "/api/v1/briefs/:brief_id/responses",
            post(create_response_handler::<S>),
        )
        .route(
            "/api/v1/briefs/:brief_id/responses.csv",
            get(export_responses_handler::<S>),
        )
        .route(
            "/api/v1/brief-responses/:response_id",
            get(get_response_handler::<S>),
        )
        .route(
            "/api/v1/brief-responses/:response_id/submit",
            post(submit_response_handler::<S>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
struct CreateBriefRequest {
    #[serde(flatten)]
    brief: CreateBrief,
    updated_by: String,
}

#[derive(Debug, Deserialize)]
struct CreateResponseRequest {
    #[serde(flatten)]
    submission: ResponseSubmission,
    updated_by: String,
}

#[derive(Debug, Deserialize)]
struct UpdaterRequest {
    updated_by: String,
}

async fn create_brief_handler<S>(
    State(service): State<Arc<BriefService<S>>>,
    axum::Json(request): axum::Json<CreateBriefRequest>,
) -> Response
where
    S: MarketplaceStore,
{
    let now = Utc::now();
    match service.create_brief(request.brief, &request.updated_by, now) {
        Ok(brief) => {
            let view = BriefView::from_brief(&brief, now);
            (StatusCode::CREATED, axum::Json(json!({ "briefs": view }))).into_response()
        }
        Err(error) => error_response(error),
    }
}

async fn get_brief_handler<S>(
    State(service): State<Arc<BriefService<S>>>,
    Path(brief_id): Path<u64>,
) -> Response
where
    S: MarketplaceStore,
{
    let now = Utc::now();
    match service.get_brief(BriefId(brief_id)) {
        Ok(brief) => {
            let view = BriefView::from_brief(&brief, now);
            (StatusCode::OK, axum::Json(json!({ "briefs": view }))).into_response()
        }
        Err(error) => error_response(error),
    }
}

async fn publish_brief_handler<S>(
    State(service): State<Arc<BriefService<S>>>,
    Path(brief_id): Path<u64>,
    axum::Json(request): axum::Json<UpdaterRequest>,
) -> Response
where
    S: MarketplaceStore,
{
    let now = Utc::now();
    match service.publish_brief(BriefId(brief_id), &request.updated_by, now) {
        Ok(brief) => {
            let view = BriefView::from_brief(&brief, now);
            (StatusCode::OK, axum::Json(json!({ "briefs": view }))).into_response()
        }
        Err(error) => error_response(error),
    }
}

async fn withdraw_brief_handler<S>(
    State(service): State<Arc<BriefService<S>>>,
    Path(brief_id): Path<u64>,
    axum::Json(request): axum::Json<UpdaterRequest>,
) -> Response
where
    S: MarketplaceStore,
{
    let now = Utc::now();
    match service.withdraw_brief(BriefId(brief_id), &request.updated_by, now) {
        Ok(brief) => {
            let view = BriefView::from_brief(&brief, now);
            (StatusCode::OK, axum::Json(json!({ "briefs": view }))).into_response()
        }
        Err(error) => error_response(error),
    }
}

async fn create_response_handler<S>(
    State(service): State<Arc<BriefService<S>>>,
    Path(brief_id): Path<u64>,
    axum::Json(request): axum::Json<CreateResponseRequest>,
) -> Response
where
    S: MarketplaceStore,
{
    let now = Utc::now();
    match service.create_response(BriefId(brief_id), request.submission, &request.updated_by, now)
    {
        Ok(response) => {
            let view = ResponseView::from_response(&response);
            (
                StatusCode::CREATED,
                axum::Json(json!({ "briefResponses": view })),
            )
                .into_response()
        }
        Err(error) => error_response(error),
    }
}

async fn get_response_handler<S>(
    State(service): State<Arc<BriefService<S>>>,
    Path(response_id): Path<u64>,
) -> Response
where
    S: MarketplaceStore,
{
    match service.get_response(ResponseId(response_id)) {
        Ok(response) => {
            let view = ResponseView::from_response(&response);
            (StatusCode::OK, axum::Json(json!({ "briefResponses": view }))).into_response()
        }
        Err(error) => error_response(error),
    }
}

async fn submit_response_handler<S>(
    State(service): State<Arc<BriefService<S>>>,
    Path(response_id): Path<u64>,
    axum::Json(request): axum::Json<UpdaterRequest>,
) -> Response
where
    S: MarketplaceStore,
{
    match service.submit_response(ResponseId(response_id), &request.updated_by, Utc::now()) {
        Ok(response) => {
            let view = ResponseView::from_response(&response);
            (StatusCode::OK, axum::Json(json!({ "briefResponses": view }))).into_response()
        }
        Err(error) => error_response(error),
    }
}

async fn export_responses_handler<S>(
    State(service): State<Arc<BriefService<S>>>,
    Path(brief_id): Path<u64>,
) -> Response
where
    S: MarketplaceStore,
{
    let brief = match service.get_brief(BriefId(brief_id)) {
        Ok(brief) => brief,
        Err(error) => return error_response(error),
    };
    let responses = match service.responses_for_brief(brief.id) {
        Ok(responses) => responses,
        Err(error) => return error_response(error),
    };

    let csv = export::responses_csv(&brief, &responses, |response| {
        service
            .supplier_name(response.supplier_code)
            .ok()
            .flatten()
            .unwrap_or_default()
    });

    match csv {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(error) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

/// Map service failures onto the HTTP contract: validation and state errors
/// are 400, eligibility refusals 403 (except the response-bound refusal,
/// which surfaces as a 409 conflict), missing records 404, duplicates 409.
fn error_response(error: BriefServiceError) -> Response {
    match error {
        BriefServiceError::Validation(errors) => {
            let payload = json!({ "errors": errors });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
        BriefServiceError::Ineligible(reason) => {
            let status = if reason == IneligibleReason::AlreadyResponded {
                StatusCode::CONFLICT
            } else {
                StatusCode::FORBIDDEN
            };
            let payload = json!({
                "error": reason.description(),
                "reason": reason.code(),
            });
            (status, axum::Json(payload)).into_response()
        }
        BriefServiceError::Store(StoreError::NotFound) => {
            let payload = json!({ "error": "record not found" });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        BriefServiceError::Store(StoreError::Conflict) => {
            let payload = json!({
                "error": "a response for this seller already exists",
                "reason": IneligibleReason::AlreadyResponded.code(),
            });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        BriefServiceError::Store(error @ StoreError::Unavailable(_)) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
        other => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
    }
}
