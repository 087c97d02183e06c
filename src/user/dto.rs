use serde::Serialize;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use uuid::Uuid;

use crate::{
    auth::repo_types::User,
    zodiac::{zodiac_sign, ZodiacSign},
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// `YYYY-MM-DD`
    pub birth_date: Option<String>,
    /// Always derived from `birth_date`.
    pub zodiac_sign: Option<ZodiacSign>,
    pub gender: Option<String>,
    pub birth_time: Option<String>,
    pub birth_place: Option<String>,
    pub relationship_status: Option<String>,
    pub focus_area: Option<String>,
    pub created_at: Option<String>,
    pub last_login_at: Option<String>,
}

fn rfc3339(at: OffsetDateTime) -> Option<String> {
    at.format(&Rfc3339).ok()
}

impl From<User> for ProfileView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            birth_date: user.birth_date.map(|d| d.to_string()),
            zodiac_sign: user.birth_date.map(zodiac_sign),
            gender: user.gender,
            birth_time: user.birth_time,
            birth_place: user.birth_place,
            relationship_status: user.relationship_status,
            focus_area: user.focus_area,
            created_at: rfc3339(user.created_at),
            last_login_at: user.last_login_at.and_then(rfc3339),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub success: bool,
    pub user: ProfileView,
}
