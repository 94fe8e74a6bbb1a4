//! Stateless analysis API — profile-based career recommendations and the
//! detailed personality mode.
//!
//! Neither endpoint persists anything or touches the credit ledger; results
//! go straight back to the caller.

use axum::{extract::State, Json};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::ai_client::schema::{CareerAnalysis, DetailedPersonalityAnalysis};
use crate::errors::AppError;
use crate::models::profile::ProfileAttributes;
use crate::models::riasec::RiasecScores;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ProfileAnalysisRequest {
    pub user_id: Uuid,
    pub profile: ProfileAttributes,
}

#[derive(Debug, Deserialize)]
pub struct PersonalityAnalysisRequest {
    pub user_id: Uuid,
    pub scores: RiasecScores,
}

/// POST /api/v1/analysis/career
pub async fn handle_profile_analysis(
    State(state): State<AppState>,
    Json(request): Json<ProfileAnalysisRequest>,
) -> Result<Json<CareerAnalysis>, AppError> {
    let profile = &request.profile;
    if profile.education_level.is_none()
        && profile.field_of_study.is_none()
        && profile.bio.is_none()
        && profile.interests.is_empty()
        && profile.skills.is_empty()
    {
        return Err(AppError::Validation(
            "profile must include at least one attribute".to_string(),
        ));
    }

    info!(user_id = %request.user_id, "profile analysis requested");
    let analysis = state
        .analyzer
        .analyze_career_from_profile(profile)
        .await
        .map_err(AppError::Analysis)?;
    Ok(Json(analysis))
}

/// POST /api/v1/analysis/personality
pub async fn handle_personality_analysis(
    State(state): State<AppState>,
    Json(request): Json<PersonalityAnalysisRequest>,
) -> Result<Json<DetailedPersonalityAnalysis>, AppError> {
    if request.scores.is_empty() {
        return Err(AppError::Validation("scores must not be empty".to_string()));
    }

    info!(user_id = %request.user_id, "personality analysis requested");
    let analysis = state
        .analyzer
        .analyze_personality(&request.scores)
        .await
        .map_err(AppError::Analysis)?;
    Ok(Json(analysis))
}
