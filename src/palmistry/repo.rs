use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;

use super::repo_types::{NewPalmAnalysis, PalmAnalysis};

#[async_trait]
pub trait PalmStore: Send + Sync {
    async fn find(&self, session_id: &str) -> anyhow::Result<Option<PalmAnalysis>>;
    /// Returns `false` when a row with the same session id already existed.
    async fn insert_if_absent(&self, analysis: NewPalmAnalysis) -> anyhow::Result<bool>;
    async fn increment_refresh(&self, session_id: &str) -> anyhow::Result<()>;
    async fn mark_paid(&self, session_id: &str) -> anyhow::Result<()>;
}

#[derive(Clone)]
pub struct PgPalmStore {
    db: PgPool,
}

impl PgPalmStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PalmStore for PgPalmStore {
    async fn find(&self, session_id: &str) -> anyhow::Result<Option<PalmAnalysis>> {
        let row = sqlx::query_as::<_, PalmAnalysis>(
            r#"
            SELECT session_id, user_id, preview_text, full_text, hand_score, seed_data,
                   ip_hash, paid_at, refresh_count, created_at
              FROM palm_analyses
             WHERE session_id = $1
            "#,
        )
        .bind(session_id)
        .fetch_optional(&self.db)
        .await
        .context("find palm analysis")?;
        Ok(row)
    }

    async fn insert_if_absent(&self, analysis: NewPalmAnalysis) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO palm_analyses
                (session_id, user_id, preview_text, full_text, hand_score, seed_data, ip_hash)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (session_id) DO NOTHING
            "#,
        )
        .bind(analysis.session_id)
        .bind(analysis.user_id)
        .bind(analysis.preview_text)
        .bind(analysis.full_text)
        .bind(analysis.hand_score)
        .bind(analysis.seed_data)
        .bind(analysis.ip_hash)
        .execute(&self.db)
        .await
        .context("insert palm analysis")?;
        Ok(result.rows_affected() > 0)
    }

    async fn increment_refresh(&self, session_id: &str) -> anyhow::Result<()> {
        sqlx::query("UPDATE palm_analyses SET refresh_count = refresh_count + 1 WHERE session_id = $1")
            .bind(session_id)
            .execute(&self.db)
            .await
            .context("increment refresh_count")?;
        Ok(())
    }

    async fn mark_paid(&self, session_id: &str) -> anyhow::Result<()> {
        sqlx::query(
            "UPDATE palm_analyses SET paid_at = CURRENT_TIMESTAMP WHERE session_id = $1 AND paid_at IS NULL",
        )
        .bind(session_id)
        .execute(&self.db)
        .await
        .context("mark palm analysis paid")?;
        Ok(())
    }
}
