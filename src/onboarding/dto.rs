use serde::{Deserialize, Serialize};

use crate::{
    auth::repo_types::AstroProfile,
    error::{AppError, AppResult},
    validation::parse_birth_date,
};

/// The wizard stores focus areas as a checkbox list; older clients send one
/// string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FocusAreas {
    One(String),
    Many(Vec<String>),
}

impl FocusAreas {
    /// Comma-joined, blanks dropped; `None` when nothing remains.
    pub fn joined(self) -> Option<String> {
        let parts: Vec<String> = match self {
            Self::One(s) => vec![s],
            Self::Many(v) => v,
        };
        let joined = parts
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ");
        (!joined.is_empty()).then_some(joined)
    }
}

/// Astrology fields as posted by the onboarding wizard.
#[derive(Debug, Default, Deserialize)]
pub struct OnboardingFields {
    pub user_gender: Option<String>,
    pub user_birth_date: Option<String>,
    pub user_birth_time: Option<String>,
    pub user_birth_place: Option<String>,
    pub relationship_status: Option<String>,
    pub focus_areas: Option<FocusAreas>,
    pub zodiac_sign: Option<String>,
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
}

impl OnboardingFields {
    pub fn into_profile(self) -> AppResult<AstroProfile> {
        let birth_date = match clean(self.user_birth_date) {
            Some(raw) => Some(
                parse_birth_date(&raw)
                    .ok_or_else(|| AppError::field("birthDate", "Некорректная дата рождения"))?,
            ),
            None => None,
        };

        Ok(AstroProfile {
            gender: clean(self.user_gender),
            birth_date,
            birth_time: clean(self.user_birth_time),
            birth_place: clean(self.user_birth_place),
            relationship_status: clean(self.relationship_status),
            focus_area: self.focus_areas.and_then(FocusAreas::joined),
            zodiac_sign: clean(self.zodiac_sign),
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingResponse {
    pub success: bool,
    pub message: &'static str,
    pub redirect_url: &'static str,
}
