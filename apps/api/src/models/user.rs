use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// User row as seen by this service: identity plus the credit balance.
/// Identity fields are owned by the auth layer in front of us; rows created
/// by the auto-provision safety net carry only an id and credits.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub credits: i32,
    pub created_at: DateTime<Utc>,
}
