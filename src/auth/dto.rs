use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{auth::repo_types::User, onboarding::dto::OnboardingFields};

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(default)]
    pub remember: Option<bool>,
}

/// Request body for plain registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Registration at the end of the onboarding wizard; field names follow the
/// wizard's local storage keys.
#[derive(Debug, Deserialize)]
pub struct OnboardingRegisterRequest {
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub user_password: Option<String>,
    #[serde(flatten)]
    pub fields: OnboardingFields,
}

/// Response returned after login or registration.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub success: bool,
    pub message: &'static str,
    pub user: PublicUser,
    pub redirect_url: &'static str,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: &'static str,
}

/// Identity as carried by the token, without a database read.
#[derive(Debug, Serialize)]
pub struct TokenUser {
    pub id: Uuid,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub success: bool,
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<TokenUser>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}
