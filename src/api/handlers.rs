use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;

use crate::service::DetectError;

use super::types::*;
use super::AppState;

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

fn api_error(status: StatusCode, msg: impl Into<String>) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse { error: msg.into() }),
    )
}

/// Map service failures to HTTP statuses without leaking internals:
/// infrastructure errors go out as a generic message and are logged here.
fn map_error(err: DetectError) -> (StatusCode, Json<ErrorResponse>) {
    match &err {
        DetectError::Unauthorized => api_error(StatusCode::FORBIDDEN, err.to_string()),
        DetectError::InvalidInput(_) => api_error(StatusCode::BAD_REQUEST, err.to_string()),
        DetectError::InsufficientHistory => {
            api_error(StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
        }
        DetectError::NotFound => api_error(StatusCode::NOT_FOUND, err.to_string()),
        DetectError::Infrastructure(report) => {
            tracing::error!(error = %report, "Request failed on infrastructure error");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
        }
    }
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        threshold: state.threshold,
    })
}

pub async fn check_anomaly(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CheckAnomalyRequest>,
) -> ApiResult<CheckAnomalyResponse> {
    let check = state
        .service
        .check_anomaly(&request.wallet_address, &request.transaction, &request.user_id)
        .await
        .map_err(map_error)?;

    Ok(Json(CheckAnomalyResponse {
        score: check.score,
        is_anomaly: check.is_anomaly,
        threshold: check.threshold,
        severity: check.severity,
        summary: check.summary,
    }))
}

pub async fn compute_baseline(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
    Json(request): Json<ComputeBaselineRequest>,
) -> ApiResult<ComputeBaselineResponse> {
    let baseline = state
        .service
        .compute_baseline(&address, &request.user_id)
        .await
        .map_err(map_error)?;

    Ok(Json(ComputeBaselineResponse {
        success: true,
        baseline: baseline.into(),
    }))
}

pub async fn get_baseline(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
) -> ApiResult<BaselineSummary> {
    let baseline = state
        .service
        .get_baseline(&address)
        .await
        .map_err(map_error)?;

    Ok(Json(baseline.into()))
}
