use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::ai_client::schema::CareerAnalysis;
use crate::models::riasec::RiasecScores;

/// One submitted quiz. `traits` is an empty JSON object until analysis
/// completes; a non-empty, schema-valid `traits` is the terminal state.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AssessmentRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub assessment_type: String,
    pub responses: Value,
    pub scores: Value,
    pub traits: Value,
    pub ai_analysis: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AssessmentRow {
    pub fn is_analyzed(&self) -> bool {
        self.traits.as_object().is_some_and(|m| !m.is_empty())
    }

    /// The stored analysis, or `None` while pending. Stored values were
    /// validated at write time, so a decode failure here means the row was
    /// corrupted out of band.
    pub fn analysis(&self) -> Result<Option<CareerAnalysis>, serde_json::Error> {
        if !self.is_analyzed() {
            return Ok(None);
        }
        serde_json::from_value(self.traits.clone()).map(Some)
    }

    pub fn riasec_scores(&self) -> Result<RiasecScores, serde_json::Error> {
        serde_json::from_value(self.scores.clone())
    }
}
