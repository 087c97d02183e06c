use lazy_static::lazy_static;
use regex::Regex;
use time::{macros::format_description, Date};

pub const EMAIL_MAX_LEN: usize = 255;
pub const PASSWORD_MIN_LEN: usize = 8;
pub const PASSWORD_MAX_LEN: usize = 128;
pub const NAME_MIN_LEN: usize = 2;
pub const NAME_MAX_LEN: usize = 100;
pub const SESSION_ID_MIN_LEN: usize = 8;
pub const SESSION_ID_MAX_LEN: usize = 128;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s.]{2,}$").unwrap();
    static ref SESSION_ID_RE: Regex = Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
}

/// Returns the normalized (trimmed, lowercased) address.
pub fn validate_email(raw: Option<&str>) -> Result<String, &'static str> {
    let raw = raw.unwrap_or_default();
    if raw.is_empty() {
        return Err("Пожалуйста, введите email");
    }
    let normalized = raw.trim().to_lowercase();
    if !EMAIL_RE.is_match(&normalized) {
        return Err("Пожалуйста, введите корректный email адрес");
    }
    if normalized.chars().count() > EMAIL_MAX_LEN {
        return Err("Email слишком длинный");
    }
    Ok(normalized)
}

pub fn validate_password(raw: Option<&str>) -> Result<(), &'static str> {
    let raw = raw.unwrap_or_default();
    if raw.is_empty() {
        return Err("Пожалуйста, введите пароль");
    }
    let len = raw.chars().count();
    if len < PASSWORD_MIN_LEN {
        return Err("Пароль должен содержать минимум 8 символов");
    }
    if len > PASSWORD_MAX_LEN {
        return Err("Пароль слишком длинный");
    }
    Ok(())
}

/// Returns the trimmed name, HTML-escaped for storage.
pub fn validate_name(raw: Option<&str>) -> Result<String, &'static str> {
    let raw = raw.unwrap_or_default();
    if raw.is_empty() {
        return Err("Пожалуйста, введите имя");
    }
    let trimmed = raw.trim();
    let len = trimmed.chars().count();
    if len < NAME_MIN_LEN {
        return Err("Имя должно содержать минимум 2 символа");
    }
    if len > NAME_MAX_LEN {
        return Err("Имя слишком длинное");
    }
    Ok(escape_html(trimmed))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionIdError {
    Length,
    Charset,
}

pub fn validate_session_id(raw: Option<&str>) -> Result<&str, SessionIdError> {
    let raw = raw.ok_or(SessionIdError::Length)?;
    let len = raw.chars().count();
    if !(SESSION_ID_MIN_LEN..=SESSION_ID_MAX_LEN).contains(&len) {
        return Err(SessionIdError::Length);
    }
    if !SESSION_ID_RE.is_match(raw) {
        return Err(SessionIdError::Charset);
    }
    Ok(raw)
}

/// Presence and charset only; length is not checked.
pub fn session_id_charset_ok(raw: Option<&str>) -> bool {
    raw.is_some_and(|s| SESSION_ID_RE.is_match(s))
}

/// Accepts `YYYY-MM-DD`, optionally followed by an ISO time part.
pub fn parse_birth_date(raw: &str) -> Option<Date> {
    let day_part = raw.trim().get(..10)?;
    Date::parse(day_part, format_description!("[year]-[month]-[day]")).ok()
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            '\\' => out.push_str("&#x5C;"),
            '`' => out.push_str("&#96;"),
            _ => out.push(c),
        }
    }
    out
}

/// Keeps at most `max` characters.
pub fn truncate_chars(input: &str, max: usize) -> String {
    input.chars().take(max).collect()
}
