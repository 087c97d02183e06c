use axum::{extract::State, routing::post, Json, Router};
use tracing::{info, instrument};

use super::dto::{OnboardingFields, OnboardingResponse};
use crate::{
    app::method_fallback,
    auth::extractors::AuthUser,
    error::{AppError, AppResult},
    extract::ApiJson,
    state::AppState,
    zodiac::zodiac_sign,
};

pub fn onboarding_routes() -> Router<AppState> {
    Router::new().route("/onboarding/complete", post(complete).fallback(method_fallback))
}

/// Writes the wizard's answers onto the caller's row.
///
/// The zodiac sign is taken as sent; when the client omits it, it is derived
/// from the birth date.
#[instrument(skip_all)]
pub async fn complete(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    ApiJson(payload): ApiJson<OnboardingFields>,
) -> AppResult<Json<OnboardingResponse>> {
    let mut profile = payload.into_profile()?;
    if profile.zodiac_sign.is_none() {
        profile.zodiac_sign = profile
            .birth_date
            .map(|d| zodiac_sign(d).name().to_owned());
    }

    if !state.users.update_profile(claims.user_id, &profile).await? {
        return Err(AppError::NotFound("Пользователь не найден".into()));
    }

    info!(user_id = %claims.user_id, "onboarding completed");
    Ok(Json(OnboardingResponse {
        success: true,
        message: "Данные сохранены успешно",
        redirect_url: "../index.html",
    }))
}
