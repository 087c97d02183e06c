use axum::{extract::FromRef, http::HeaderValue};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    auth::{
        cookie::auth_cookie,
        jwt::{JwtKeys, TokenTtl},
        password::hash_password_blocking,
        repo_types::{AstroProfile, NewUser, User},
    },
    error::{AppError, AppResult, MSG_EMAIL_TAKEN},
    state::AppState,
    validation::{validate_email, validate_name, validate_password},
};

/// Validated registration input.
#[derive(Debug)]
pub struct Signup {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Checks name, email and password in that order and reports the first
/// failing field.
pub fn validate_signup(
    name: Option<&str>,
    email: Option<&str>,
    password: Option<&str>,
) -> AppResult<Signup> {
    let name = validate_name(name).map_err(|m| AppError::field("name", m))?;
    let email = validate_email(email).map_err(|m| AppError::field("email", m))?;
    validate_password(password).map_err(|m| AppError::field("password", m))?;
    Ok(Signup {
        name,
        email,
        password: password.unwrap_or_default().to_owned(),
    })
}

/// Creates the account; an already registered email is a conflict.
pub async fn create_account(
    state: &AppState,
    signup: Signup,
    profile: AstroProfile,
) -> AppResult<User> {
    if state.users.find_by_email(&signup.email).await?.is_some() {
        warn!(email = %signup.email, "email already registered");
        return Err(AppError::Conflict(MSG_EMAIL_TAKEN.into()));
    }

    let password_hash = hash_password_blocking(signup.password).await?;
    let user = state
        .users
        .create(NewUser {
            name: signup.name,
            email: signup.email,
            password_hash,
            profile,
        })
        .await?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(user)
}

/// Signs a token and wraps it in the `Set-Cookie` value.
pub fn issue_session(
    state: &AppState,
    user_id: Uuid,
    email: &str,
    ttl: TokenTtl,
) -> AppResult<HeaderValue> {
    let token = JwtKeys::from_ref(state).sign(user_id, email, ttl)?;
    Ok(auth_cookie(
        &token,
        ttl.max_age_secs(),
        state.config.secure_cookies(),
    )?)
}
