use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tracing::error;

use crate::{
    app::method_fallback,
    db,
    error::{AppError, AppResult},
    state::AppState,
};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub success: bool,
    pub message: &'static str,
    pub timestamp: String,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health).fallback(method_fallback))
}

pub async fn health(State(state): State<AppState>) -> AppResult<Json<HealthResponse>> {
    let now: OffsetDateTime = db::ping(&state.db).await.map_err(|e| {
        error!(error = %e, "health check failed");
        AppError::Unavailable("База данных недоступна".into())
    })?;

    Ok(Json(HealthResponse {
        success: true,
        message: "API работает",
        timestamp: now.format(&Rfc3339).unwrap_or_default(),
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::testing::{body_json, get, TestApp};

    #[tokio::test]
    async fn unreachable_database_is_unavailable() {
        let app = TestApp::new();
        let res = get(app.router(), "/api/health", None).await;
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
        let json = body_json(res).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "База данных недоступна");
    }
}
