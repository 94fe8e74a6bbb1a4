//! Axum route handlers for the Assessment API.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ai_client::schema::CareerAnalysis;
use crate::assessment::pipeline;
use crate::errors::AppError;
use crate::models::assessment::AssessmentRow;
use crate::models::riasec::{ResponseMap, RiasecScores};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub user_id: Uuid,
    pub responses: ResponseMap,
    pub scores: RiasecScores,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub assessment_id: Uuid,
    pub cached: bool,
}

#[derive(Debug, Serialize)]
pub struct AssessmentStatusResponse {
    pub id: Uuid,
    /// `"pending"` signals the surface to poll again; `"complete"` is
    /// terminal and carries the analysis.
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<CareerAnalysis>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub status: &'static str,
    pub analysis: CareerAnalysis,
}

#[derive(Debug, Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

fn status_response(record: AssessmentRow) -> Result<AssessmentStatusResponse, AppError> {
    let analysis = record.analysis().map_err(anyhow::Error::from)?;
    Ok(AssessmentStatusResponse {
        id: record.id,
        status: if analysis.is_some() {
            "complete"
        } else {
            "pending"
        },
        analysis,
        created_at: record.created_at,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/assessments
///
/// Submits a quiz. Identical answer sets with a completed analysis come back
/// as `cached: true` without consuming a credit.
pub async fn handle_submit(
    State(state): State<AppState>,
    Json(request): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>, AppError> {
    let outcome = pipeline::submit(
        state.store.as_ref(),
        request.user_id,
        &request.responses,
        &request.scores,
    )
    .await?;
    Ok(Json(SubmitResponse {
        assessment_id: outcome.assessment_id,
        cached: outcome.cached,
    }))
}

/// GET /api/v1/assessments/:id
///
/// Pure status read for the polling surface — never triggers analysis.
/// Completion is only observable by re-polling; there is no push channel.
pub async fn handle_get_assessment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AssessmentStatusResponse>, AppError> {
    let record = state
        .store
        .load(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Assessment {id} not found")))?;
    Ok(Json(status_response(record)?))
}

/// POST /api/v1/assessments/:id/analyze
///
/// Runs the analysis if the record is still pending, otherwise returns the
/// stored result. Failures surface as a retryable `ANALYSIS_FAILED`.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let analysis =
        pipeline::ensure_analyzed(state.store.as_ref(), state.analyzer.as_ref(), id).await?;
    Ok(Json(AnalyzeResponse {
        status: "complete",
        analysis,
    }))
}

/// GET /api/v1/assessments/latest?user_id=
///
/// The user's most recent completed analysis, for dashboards that show the
/// last result without knowing its id.
pub async fn handle_latest(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<AssessmentStatusResponse>, AppError> {
    let record = state
        .store
        .latest_analyzed(params.user_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("No analyzed assessment for user {}", params.user_id))
        })?;
    Ok(Json(status_response(record)?))
}
