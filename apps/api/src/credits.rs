//! Credit ledger API — balance reads and purchase grants.
//!
//! Payment verification lives with the payment-provider integration in
//! front of this service; this API only applies a confirmed grant to the
//! ledger. Deductions happen inside the assessment pipeline, one credit per
//! non-cached submission.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct CreditsResponse {
    pub credits: i32,
}

#[derive(Debug, Deserialize)]
pub struct GrantRequest {
    pub user_id: Uuid,
    pub credits: i32,
}

/// GET /api/v1/credits
///
/// Current balance. Auto-provisions the default balance for users created
/// out of band.
pub async fn handle_get_credits(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<CreditsResponse>, AppError> {
    let credits = state.store.credit_balance(params.user_id).await?;
    Ok(Json(CreditsResponse { credits }))
}

/// POST /api/v1/credits/grant
pub async fn handle_grant_credits(
    State(state): State<AppState>,
    Json(request): Json<GrantRequest>,
) -> Result<Json<CreditsResponse>, AppError> {
    if request.credits < 1 {
        return Err(AppError::Validation(
            "credits must be a positive amount".to_string(),
        ));
    }
    let credits = state
        .store
        .grant_credits(request.user_id, request.credits)
        .await?;
    info!(
        user_id = %request.user_id,
        granted = request.credits,
        balance = credits,
        "credits granted"
    );
    Ok(Json(CreditsResponse { credits }))
}
