use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use super::{claims::AuthClaims, cookie::token_from_headers, jwt::JwtKeys};
use crate::error::AppError;

pub const MSG_AUTH_REQUIRED: &str = "Необходима авторизация";
pub const MSG_INVALID_TOKEN: &str = "Недействительный токен";

/// Requires a valid `auth_token` cookie.
pub struct AuthUser(pub AuthClaims);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = token_from_headers(&parts.headers)
            .ok_or_else(|| AppError::Unauthorized(MSG_AUTH_REQUIRED.into()))?;

        let keys = JwtKeys::from_ref(state);
        match keys.verify(&token) {
            Some(claims) => Ok(AuthUser(claims)),
            None => {
                warn!("invalid or expired token");
                Err(AppError::Unauthorized(MSG_INVALID_TOKEN.into()))
            }
        }
    }
}

/// Identifies the caller when a valid cookie is present; anonymous otherwise.
pub struct MaybeAuthUser(pub Option<AuthClaims>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let claims = token_from_headers(&parts.headers)
            .and_then(|token| JwtKeys::from_ref(state).verify(&token));
        Ok(MaybeAuthUser(claims))
    }
}
