use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,          // lowercased, unique
    pub password_hash: String,  // bcrypt, never serialized
    pub gender: Option<String>,
    pub birth_date: Option<Date>,
    pub birth_time: Option<String>,
    pub birth_place: Option<String>,
    pub relationship_status: Option<String>,
    pub focus_area: Option<String>,
    pub zodiac_sign: Option<String>, // as written by onboarding; profile reads recompute it
    pub created_at: OffsetDateTime,
    pub last_login_at: Option<OffsetDateTime>,
    pub updated_at: Option<OffsetDateTime>,
}

/// Optional astrology fields collected by the onboarding wizard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AstroProfile {
    pub gender: Option<String>,
    pub birth_date: Option<Date>,
    pub birth_time: Option<String>,
    pub birth_place: Option<String>,
    pub relationship_status: Option<String>,
    pub focus_area: Option<String>,
    pub zodiac_sign: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub profile: AstroProfile,
}
