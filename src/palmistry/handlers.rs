use std::time::Duration;

use axum::{extract::State, routing::post, Json, Router};
use serde_json::json;
use sha2::{Digest, Sha256};
use tracing::{error, info, instrument, warn};

use super::{
    dto::{UnlockRequest, UnlockResponse, UploadRequest, UploadResponse},
    generator::{generate_reading, ReadingSeed},
    repo_types::NewPalmAnalysis,
};
use crate::{
    app::method_fallback,
    auth::extractors::MaybeAuthUser,
    error::{AppError, AppResult},
    extract::{ApiJson, ClientIp},
    state::AppState,
    validation::{session_id_charset_ok, truncate_chars, validate_session_id, SessionIdError},
};

pub const UPLOAD_MAX_PER_HOUR: u32 = 5;
pub const UNLOCK_MAX_PER_HOUR: u32 = 10;
const HOUR: Duration = Duration::from_secs(60 * 60);

const NAME_MAX: usize = 100;
const GENDER_MAX: usize = 20;
const FOCUS_AREA_MAX: usize = 50;

const MSG_BAD_SESSION: &str = "Неверный sessionId";

pub fn palmistry_routes() -> Router<AppState> {
    Router::new()
        .route("/palmistry/upload", post(upload).fallback(method_fallback))
        .route("/palmistry/unlock", post(unlock).fallback(method_fallback))
}

fn ip_hash(ip: &str) -> String {
    format!("{:x}", Sha256::digest(ip.as_bytes()))
}

/// Returns the preview for a session, generating and storing it on first use.
#[instrument(skip(state, auth, payload))]
pub async fn upload(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    auth: MaybeAuthUser,
    ApiJson(payload): ApiJson<UploadRequest>,
) -> AppResult<Json<UploadResponse>> {
    if !state
        .limiter
        .check(&format!("palm:{ip}"), UPLOAD_MAX_PER_HOUR, HOUR)
    {
        warn!(%ip, "palmistry upload rate limited");
        return Err(AppError::RateLimited(
            "Слишком много запросов. Попробуйте через час.".into(),
        ));
    }

    let session_id = validate_session_id(payload.session_id())
        .map_err(|e| match e {
            SessionIdError::Length => AppError::BadRequest(MSG_BAD_SESSION.into()),
            SessionIdError::Charset => AppError::BadRequest("Неверный формат sessionId".into()),
        })?
        .to_owned();
    let hand_score = payload.hand_score();

    match state.palms.find(&session_id).await {
        Ok(Some(row)) => {
            if let Err(e) = state.palms.increment_refresh(&session_id).await {
                warn!(error = %e, %session_id, "failed to bump refresh_count");
            }
            return Ok(Json(UploadResponse {
                success: true,
                session_id: row.session_id,
                preview: row.preview_text,
                is_paid: row.paid_at.is_some(),
            }));
        }
        Ok(None) => {}
        Err(e) => error!(error = %e, %session_id, "palm session lookup failed"),
    }

    let name = payload.name().map(|s| truncate_chars(s, NAME_MAX));
    let gender = payload.gender().map(|s| truncate_chars(s, GENDER_MAX));
    let focus_area = payload
        .focus_area()
        .map(|s| truncate_chars(s, FOCUS_AREA_MAX));

    let reading = generate_reading(&ReadingSeed {
        session_id: &session_id,
        name: name.as_deref(),
        gender: gender.as_deref(),
        focus_area: focus_area.as_deref(),
        hand_score,
    });

    let user_id = auth.0.map(|claims| claims.user_id);
    let new_row = NewPalmAnalysis {
        session_id: session_id.clone(),
        user_id,
        preview_text: reading.preview.clone(),
        full_text: reading.full,
        hand_score: hand_score as f32,
        seed_data: json!({ "name": name, "gender": gender, "focusArea": focus_area }),
        ip_hash: ip_hash(&ip),
    };

    match state.palms.insert_if_absent(new_row).await {
        Ok(true) => info!(%session_id, user_id = ?user_id, "palm reading generated"),
        Ok(false) => warn!(%session_id, "palm session inserted concurrently"),
        Err(e) => error!(error = %e, %session_id, "failed to store palm reading"),
    }

    Ok(Json(UploadResponse {
        success: true,
        session_id,
        preview: reading.preview,
        is_paid: false,
    }))
}

/// Returns the full text once the session is paid.
#[instrument(skip(state, payload))]
pub async fn unlock(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    ApiJson(payload): ApiJson<UnlockRequest>,
) -> AppResult<Json<UnlockResponse>> {
    if !state
        .limiter
        .check(&format!("palm-unlock:{ip}"), UNLOCK_MAX_PER_HOUR, HOUR)
    {
        warn!(%ip, "palmistry unlock rate limited");
        return Err(AppError::RateLimited("Слишком много запросов.".into()));
    }

    let session_id = match payload.session_id() {
        Some(id) if session_id_charset_ok(Some(id)) => id,
        _ => return Err(AppError::BadRequest(MSG_BAD_SESSION.into())),
    };

    let row = state
        .palms
        .find(session_id)
        .await
        .map_err(|e| AppError::Internal(format!("palm session lookup: {e:#}")))?
        .ok_or_else(|| AppError::NotFound("Сессия не найдена. Загрузите фото заново.".into()))?;

    if row.paid_at.is_some() {
        return Ok(Json(UnlockResponse {
            success: true,
            full_text: row.full_text,
        }));
    }

    let token = payload.payment_token();
    let paid = state.payments.verify(session_id, token).await.map_err(|e| {
        error!(error = %e, session_id, "payment verification failed");
        AppError::Unavailable("Платёжный сервис недоступен. Попробуйте позже.".into())
    })?;
    if !paid {
        warn!(session_id, "payment not confirmed");
        return Err(AppError::PaymentRequired("Оплата не подтверждена.".into()));
    }

    if let Err(e) = state.palms.mark_paid(session_id).await {
        error!(error = %e, session_id, "failed to mark session paid");
    }

    info!(session_id, "palm reading unlocked");
    Ok(Json(UnlockResponse {
        success: true,
        full_text: row.full_text,
    }))
}
