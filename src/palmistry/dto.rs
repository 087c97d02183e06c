use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_HAND_SCORE: f64 = 0.7;

/// Non-string values read as absent.
fn as_str(value: &Option<Value>) -> Option<&str> {
    value.as_ref().and_then(Value::as_str)
}

/// Fields are raw JSON values; a field of the wrong type reads as absent
/// instead of rejecting the body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    pub session_id: Option<Value>,
    /// Detector confidence; a number or a numeric string.
    pub hand_score: Option<Value>,
    pub name: Option<Value>,
    pub gender: Option<Value>,
    pub focus_area: Option<Value>,
}

impl UploadRequest {
    pub fn session_id(&self) -> Option<&str> {
        as_str(&self.session_id)
    }

    pub fn name(&self) -> Option<&str> {
        as_str(&self.name)
    }

    pub fn gender(&self) -> Option<&str> {
        as_str(&self.gender)
    }

    pub fn focus_area(&self) -> Option<&str> {
        as_str(&self.focus_area)
    }

    /// Clamped to `0..=1`. Missing, non-numeric and zero scores fall back to
    /// the default.
    pub fn hand_score(&self) -> f64 {
        let raw = match &self.hand_score {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        let score = raw
            .filter(|s| !s.is_nan() && *s != 0.0)
            .unwrap_or(DEFAULT_HAND_SCORE);
        score.clamp(0.0, 1.0)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub session_id: String,
    pub preview: String,
    pub is_paid: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockRequest {
    pub session_id: Option<Value>,
    pub payment_token: Option<Value>,
}

impl UnlockRequest {
    pub fn session_id(&self) -> Option<&str> {
        as_str(&self.session_id)
    }

    /// Empty when absent or not a string.
    pub fn payment_token(&self) -> &str {
        as_str(&self.payment_token).unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockResponse {
    pub success: bool,
    pub full_text: String,
}
