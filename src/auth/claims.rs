use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT payload carried in the `auth_token` cookie.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthClaims {
    pub user_id: Uuid, // user ID
    pub email: String, // email at signing time
    pub iat: usize,    // issued at (unix timestamp)
    pub exp: usize,    // expires at (unix timestamp)
}
