use axum::{extract::State, routing::get, Json, Router};
use tracing::{instrument, warn};

use super::dto::{ProfileResponse, ProfileView};
use crate::{
    app::method_fallback,
    auth::extractors::AuthUser,
    error::{AppError, AppResult},
    state::AppState,
};

pub fn user_routes() -> Router<AppState> {
    Router::new().route("/user/profile", get(profile).fallback(method_fallback))
}

#[instrument(skip_all)]
pub async fn profile(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> AppResult<Json<ProfileResponse>> {
    let Some(user) = state.users.find_by_id(claims.user_id).await? else {
        warn!(user_id = %claims.user_id, "token for missing user");
        return Err(AppError::NotFound("Пользователь не найден".into()));
    };

    Ok(Json(ProfileResponse {
        success: true,
        user: ProfileView::from(user),
    }))
}
