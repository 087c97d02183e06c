use serde_json::Value;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Row of `palm_analyses`, keyed by the client-generated session id.
#[derive(Debug, Clone, FromRow)]
pub struct PalmAnalysis {
    pub session_id: String,
    pub user_id: Option<Uuid>,
    pub preview_text: String,
    pub full_text: String,
    pub hand_score: f32,
    pub seed_data: Value,
    pub ip_hash: Option<String>,
    pub paid_at: Option<OffsetDateTime>,
    pub refresh_count: i32,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewPalmAnalysis {
    pub session_id: String,
    pub user_id: Option<Uuid>,
    pub preview_text: String,
    pub full_text: String,
    pub hand_score: f32,
    pub seed_data: Value,
    pub ip_hash: String,
}
