use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use super::claims::AuthClaims;
use crate::state::AppState;

/// Token lifetime: one day by default, a week with "remember me".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenTtl {
    Day,
    Week,
}

impl TokenTtl {
    pub fn from_remember(remember: bool) -> Self {
        if remember {
            Self::Week
        } else {
            Self::Day
        }
    }

    pub fn duration(self) -> Duration {
        match self {
            Self::Day => Duration::hours(24),
            Self::Week => Duration::days(7),
        }
    }

    /// Cookie `Max-Age` matching the token lifetime.
    pub fn max_age_secs(self) -> i64 {
        self.duration().whole_seconds()
    }
}

#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        Self::new(&state.config.jwt.secret)
    }
}

impl JwtKeys {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn sign(&self, user_id: Uuid, email: &str, ttl: TokenTtl) -> anyhow::Result<String> {
        self.sign_at(user_id, email, ttl, OffsetDateTime::now_utc())
    }

    fn sign_at(
        &self,
        user_id: Uuid,
        email: &str,
        ttl: TokenTtl,
        now: OffsetDateTime,
    ) -> anyhow::Result<String> {
        let exp = now + ttl.duration();
        let claims = AuthClaims {
            user_id,
            email: email.to_owned(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %user_id, ttl = ?ttl, "jwt signed");
        Ok(token)
    }

    /// `None` for expired, malformed or foreign-signed tokens.
    pub fn verify(&self, token: &str) -> Option<AuthClaims> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        match decode::<AuthClaims>(token, &self.decoding, &validation) {
            Ok(data) => {
                debug!(user_id = %data.claims.user_id, "jwt verified");
                Some(data.claims)
            }
            Err(e) => {
                debug!(error = %e, "jwt rejected");
                None
            }
        }
    }
}
