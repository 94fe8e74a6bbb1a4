//! Assessment store and credit ledger.
//!
//! One trait covers both because they live in the same database and the
//! pipeline always uses them together. `PgStore` is the production
//! implementation; tests drive the pipeline against an in-memory fake.

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::ai_client::schema::CareerAnalysis;
use crate::models::assessment::AssessmentRow;
use crate::models::riasec::{ResponseMap, RiasecScores};
use crate::models::user::UserRow;

/// Placeholder summary carried by a record until analysis completes.
pub const PENDING_SUMMARY: &str = "Pending analysis...";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("insufficient credits")]
    InsufficientCredits,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("stored data is corrupt: {0}")]
    Corrupt(String),
}

#[async_trait]
pub trait AssessmentStore: Send + Sync {
    /// Latest analyzed record for this user whose responses exactly equal
    /// the submitted set. This is the content-addressed cache lookup.
    async fn find_analyzed(
        &self,
        user_id: Uuid,
        responses: &ResponseMap,
    ) -> Result<Option<AssessmentRow>, StoreError>;

    /// Latest analyzed record for this user, regardless of responses.
    async fn latest_analyzed(&self, user_id: Uuid) -> Result<Option<AssessmentRow>, StoreError>;

    async fn load(&self, id: Uuid) -> Result<Option<AssessmentRow>, StoreError>;

    /// Creates a record in the pending state (empty traits).
    async fn create_pending(
        &self,
        user_id: Uuid,
        responses: &ResponseMap,
        scores: &RiasecScores,
    ) -> Result<AssessmentRow, StoreError>;

    /// Compare-and-set completion write: persists the analysis (and its
    /// summary) only while the record is still pending. Returns `false`
    /// when another writer completed the record first.
    async fn save_analysis(&self, id: Uuid, analysis: &CareerAnalysis)
        -> Result<bool, StoreError>;

    /// Current balance, auto-provisioning a default when the user row is
    /// missing (safety net for out-of-band identity creation).
    async fn credit_balance(&self, user_id: Uuid) -> Result<i32, StoreError>;

    /// Atomically consumes one credit; the guard clause means the balance
    /// can never go negative, under any interleaving. Auto-provisions
    /// missing users before failing them for lack of credits.
    async fn reserve_credit(&self, user_id: Uuid) -> Result<i32, StoreError>;

    /// Compensating increment for a reservation whose follow-up write
    /// failed.
    async fn refund_credit(&self, user_id: Uuid) -> Result<i32, StoreError>;

    /// Adds purchased credits, creating the user row if needed. Returns the
    /// new balance.
    async fn grant_credits(&self, user_id: Uuid, amount: i32) -> Result<i32, StoreError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Postgres implementation
// ────────────────────────────────────────────────────────────────────────────

pub struct PgStore {
    pool: PgPool,
    initial_credits: i32,
}

impl PgStore {
    pub fn new(pool: PgPool, initial_credits: i32) -> Self {
        Self {
            pool,
            initial_credits,
        }
    }

    async fn provision_user(&self, user_id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("INSERT INTO users (id, credits) VALUES ($1, $2) ON CONFLICT (id) DO NOTHING")
            .bind(user_id)
            .bind(self.initial_credits)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 1 {
            info!(%user_id, credits = self.initial_credits, "auto-provisioned missing user record");
        }
        Ok(())
    }

    async fn try_decrement(&self, user_id: Uuid) -> Result<Option<i32>, StoreError> {
        let remaining: Option<i32> = sqlx::query_scalar(
            "UPDATE users SET credits = credits - 1 WHERE id = $1 AND credits >= 1 RETURNING credits",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(remaining)
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, StoreError> {
    serde_json::to_value(value).map_err(|e| StoreError::Corrupt(e.to_string()))
}

#[async_trait]
impl AssessmentStore for PgStore {
    async fn find_analyzed(
        &self,
        user_id: Uuid,
        responses: &ResponseMap,
    ) -> Result<Option<AssessmentRow>, StoreError> {
        let row = sqlx::query_as::<_, AssessmentRow>(
            r#"
            SELECT * FROM personality_assessments
            WHERE user_id = $1 AND responses = $2 AND traits <> '{}'::jsonb
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(to_json(responses)?)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn latest_analyzed(&self, user_id: Uuid) -> Result<Option<AssessmentRow>, StoreError> {
        let row = sqlx::query_as::<_, AssessmentRow>(
            r#"
            SELECT * FROM personality_assessments
            WHERE user_id = $1 AND traits <> '{}'::jsonb
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn load(&self, id: Uuid) -> Result<Option<AssessmentRow>, StoreError> {
        let row =
            sqlx::query_as::<_, AssessmentRow>("SELECT * FROM personality_assessments WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row)
    }

    async fn create_pending(
        &self,
        user_id: Uuid,
        responses: &ResponseMap,
        scores: &RiasecScores,
    ) -> Result<AssessmentRow, StoreError> {
        let row = sqlx::query_as::<_, AssessmentRow>(
            r#"
            INSERT INTO personality_assessments
                (user_id, assessment_type, responses, scores, traits, ai_analysis)
            VALUES ($1, 'riasec', $2, $3, '{}'::jsonb, $4)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(to_json(responses)?)
        .bind(to_json(scores)?)
        .bind(PENDING_SUMMARY)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn save_analysis(
        &self,
        id: Uuid,
        analysis: &CareerAnalysis,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE personality_assessments
            SET traits = $2, ai_analysis = $3
            WHERE id = $1 AND traits = '{}'::jsonb
            "#,
        )
        .bind(id)
        .bind(to_json(analysis)?)
        .bind(&analysis.user_profile_summary)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn credit_balance(&self, user_id: Uuid) -> Result<i32, StoreError> {
        let user = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        if let Some(user) = user {
            return Ok(user.credits);
        }
        self.provision_user(user_id).await?;
        let user = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(user.credits)
    }

    async fn reserve_credit(&self, user_id: Uuid) -> Result<i32, StoreError> {
        if let Some(remaining) = self.try_decrement(user_id).await? {
            return Ok(remaining);
        }
        // Either the user row is missing or the balance is exhausted.
        let existing: Option<i32> = sqlx::query_scalar("SELECT credits FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        match existing {
            Some(_) => Err(StoreError::InsufficientCredits),
            None => {
                self.provision_user(user_id).await?;
                self.try_decrement(user_id)
                    .await?
                    .ok_or(StoreError::InsufficientCredits)
            }
        }
    }

    async fn refund_credit(&self, user_id: Uuid) -> Result<i32, StoreError> {
        sqlx::query_scalar("UPDATE users SET credits = credits + 1 WHERE id = $1 RETURNING credits")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::Corrupt(format!("credit refund for unknown user {user_id}")))
    }

    async fn grant_credits(&self, user_id: Uuid, amount: i32) -> Result<i32, StoreError> {
        let balance: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO users (id, credits) VALUES ($1, $2)
            ON CONFLICT (id) DO UPDATE SET credits = users.credits + EXCLUDED.credits
            RETURNING credits
            "#,
        )
        .bind(user_id)
        .bind(amount)
        .fetch_one(&self.pool)
        .await?;
        Ok(balance)
    }
}
