use std::sync::Arc;

use sqlx::PgPool;

use crate::{
    auth::repo::{PgUserStore, UserStore},
    config::AppConfig,
    palmistry::{
        payment::{PaymentVerifier, StubPaymentVerifier},
        repo::{PalmStore, PgPalmStore},
    },
    rate_limit::RateLimiter,
};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserStore>,
    pub palms: Arc<dyn PalmStore>,
    pub payments: Arc<dyn PaymentVerifier>,
    pub limiter: Arc<RateLimiter>,
}

impl AppState {
    /// Postgres-backed stores and the stub payment verifier.
    pub fn new(db: PgPool, config: Arc<AppConfig>) -> Self {
        Self {
            users: Arc::new(PgUserStore::new(db.clone())),
            palms: Arc::new(PgPalmStore::new(db.clone())),
            payments: Arc::new(StubPaymentVerifier),
            limiter: Arc::new(RateLimiter::new()),
            db,
            config,
        }
    }

    pub fn from_parts(
        db: PgPool,
        config: Arc<AppConfig>,
        users: Arc<dyn UserStore>,
        palms: Arc<dyn PalmStore>,
        payments: Arc<dyn PaymentVerifier>,
        limiter: Arc<RateLimiter>,
    ) -> Self {
        Self {
            db,
            config,
            users,
            palms,
            payments,
            limiter,
        }
    }
}
