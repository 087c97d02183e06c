use std::collections::BTreeMap;

use axum::{
    extract::rejection::JsonRejection,
    http::{header::InvalidHeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{debug, error};

use crate::auth::repo::EmailTaken;

pub const MSG_SERVER_ERROR: &str = "Произошла ошибка сервера. Попробуйте позже.";
pub const MSG_EMAIL_TAKEN: &str = "Этот email уже зарегистрирован";
pub const MSG_DB_TIMEOUT: &str = "Сервис временно недоступен. Попробуйте позже.";
pub const MSG_DB_REFUSED: &str = "Не удалось подключиться к базе данных";
pub const MSG_VALIDATION: &str = "Ошибка валидации";

/// Field name → message, serialized as the `errors` object.
pub type FieldErrors = BTreeMap<&'static str, String>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Validation {
        message: String,
        errors: FieldErrors,
    },

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    PaymentRequired(String),

    #[error("{0}")]
    NotFound(String),

    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    RateLimited(String),

    #[error("{0}")]
    Unavailable(String),

    /// Detail is logged; clients only see the generic message.
    #[error("internal error: {0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    success: bool,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<&'a FieldErrors>,
}

impl AppError {
    /// A 400 carrying a single field error.
    pub fn field(field: &'static str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field, message.into());
        Self::Validation {
            message: MSG_VALIDATION.to_string(),
            errors,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::PaymentRequired(_) => StatusCode::PAYMENT_REQUIRED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (message, errors) = match &self {
            Self::Validation { message, errors } => (message.as_str(), Some(errors)),
            Self::BadRequest(m)
            | Self::Unauthorized(m)
            | Self::PaymentRequired(m)
            | Self::NotFound(m)
            | Self::Conflict(m)
            | Self::RateLimited(m)
            | Self::Unavailable(m) => (m.as_str(), None),
            Self::MethodNotAllowed => ("Метод не разрешен", None),
            Self::Internal(detail) => {
                error!(error = %detail, "internal error");
                (MSG_SERVER_ERROR, None)
            }
        };

        let body = ErrorBody {
            success: false,
            message,
            errors,
        };
        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        if err.downcast_ref::<EmailTaken>().is_some() {
            return Self::Conflict(MSG_EMAIL_TAKEN.into());
        }
        match err.downcast_ref::<sqlx::Error>() {
            Some(db_err) => classify_sqlx_error(db_err),
            None => Self::Internal(format!("{err:#}")),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        classify_sqlx_error(&err)
    }
}

impl From<InvalidHeaderValue> for AppError {
    fn from(err: InvalidHeaderValue) -> Self {
        Self::Internal(format!("invalid header value: {err}"))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        debug!(reason = %rejection.body_text(), "rejected request body");
        Self::BadRequest("Некорректный формат запроса".into())
    }
}

/// Maps driver errors onto the shared taxonomy.
///
/// - unique violation on `users_email_key` → 409
/// - pool timeout / I/O timeout → 503
/// - connection refused → 503
/// - anything else → 500
fn classify_sqlx_error(err: &sqlx::Error) -> AppError {
    match err {
        sqlx::Error::Database(db_err)
            if db_err.code().as_deref() == Some("23505")
                && db_err.constraint() == Some("users_email_key") =>
        {
            AppError::Conflict(MSG_EMAIL_TAKEN.into())
        }
        sqlx::Error::PoolTimedOut => {
            error!(error = %err, "database pool timed out");
            AppError::Unavailable(MSG_DB_TIMEOUT.into())
        }
        sqlx::Error::Io(io) => match io.kind() {
            std::io::ErrorKind::TimedOut => {
                error!(error = %err, "database connection timed out");
                AppError::Unavailable(MSG_DB_TIMEOUT.into())
            }
            std::io::ErrorKind::ConnectionRefused => {
                error!(error = %err, "database connection refused");
                AppError::Unavailable(MSG_DB_REFUSED.into())
            }
            _ => AppError::Internal(format!("database io error: {err}")),
        },
        other => AppError::Internal(format!("database error: {other}")),
    }
}
