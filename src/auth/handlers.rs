use std::time::Duration;

use axum::{
    extract::{FromRef, State},
    http::{header::SET_COOKIE, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    app::method_fallback,
    auth::{
        cookie::{clear_auth_cookie, token_from_headers},
        dto::{
            AuthResponse, LoginRequest, MessageResponse, OnboardingRegisterRequest, PublicUser,
            RegisterRequest, TokenUser, VerifyResponse,
        },
        extractors::{MSG_AUTH_REQUIRED, MSG_INVALID_TOKEN},
        jwt::{JwtKeys, TokenTtl},
        password::verify_password_blocking,
        repo_types::AstroProfile,
        services::{create_account, issue_session, validate_signup},
    },
    error::{AppError, AppResult},
    extract::{ApiJson, ClientIp},
    state::AppState,
    validation::validate_email,
    zodiac::zodiac_sign,
};

pub const LOGIN_MAX_ATTEMPTS: u32 = 5;
pub const LOGIN_WINDOW: Duration = Duration::from_secs(15 * 60);

const DASHBOARD_URL: &str = "../dashboard.html";
const MSG_INVALID_CREDENTIALS: &str = "Неверный email или пароль";

type CookieResponse<T> = (StatusCode, [(axum::http::HeaderName, HeaderValue); 1], Json<T>);

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login).fallback(method_fallback))
        .route("/auth/register", post(register).fallback(method_fallback))
        .route(
            "/auth/register-from-onboarding",
            post(register_from_onboarding).fallback(method_fallback),
        )
        .route("/auth/logout", post(logout).fallback(method_fallback))
        .route("/auth/verify", get(verify).fallback(method_fallback))
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized(MSG_INVALID_CREDENTIALS.into())
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> AppResult<CookieResponse<AuthResponse>> {
    if !state
        .limiter
        .check(&format!("login:{ip}"), LOGIN_MAX_ATTEMPTS, LOGIN_WINDOW)
    {
        warn!(%ip, "login rate limited");
        return Err(AppError::RateLimited(
            "Слишком много попыток. Попробуйте через 15 минут.".into(),
        ));
    }

    let email = validate_email(payload.email.as_deref())
        .map_err(|m| AppError::BadRequest(m.into()))?;

    let user = match state.users.find_by_email(&email).await? {
        Some(u) => u,
        None => {
            warn!(email = %email, "login unknown email");
            return Err(invalid_credentials());
        }
    };

    let password = payload.password.unwrap_or_default();
    if !verify_password_blocking(password, user.password_hash.clone()).await? {
        warn!(email = %email, user_id = %user.id, "login invalid password");
        return Err(invalid_credentials());
    }

    state.users.touch_last_login(user.id).await?;

    let ttl = TokenTtl::from_remember(payload.remember.unwrap_or(false));
    let cookie = issue_session(&state, user.id, &user.email, ttl)?;

    info!(user_id = %user.id, email = %user.email, ttl = ?ttl, "user logged in");
    Ok((
        StatusCode::OK,
        [(SET_COOKIE, cookie)],
        Json(AuthResponse {
            success: true,
            message: "Вход выполнен успешно",
            user: PublicUser::from(user),
            redirect_url: DASHBOARD_URL,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> AppResult<CookieResponse<AuthResponse>> {
    let signup = validate_signup(
        payload.name.as_deref(),
        payload.email.as_deref(),
        payload.password.as_deref(),
    )?;

    let user = create_account(&state, signup, AstroProfile::default()).await?;
    let cookie = issue_session(&state, user.id, &user.email, TokenTtl::Day)?;

    Ok((
        StatusCode::CREATED,
        [(SET_COOKIE, cookie)],
        Json(AuthResponse {
            success: true,
            message: "Регистрация успешна",
            user: PublicUser::from(user),
            redirect_url: DASHBOARD_URL,
        }),
    ))
}

/// Creates the account with every onboarding answer in one insert and logs
/// the user in.
#[instrument(skip(state, payload))]
pub async fn register_from_onboarding(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<OnboardingRegisterRequest>,
) -> AppResult<CookieResponse<AuthResponse>> {
    let signup = validate_signup(
        payload.user_name.as_deref(),
        payload.user_email.as_deref(),
        payload.user_password.as_deref(),
    )?;

    let mut profile = payload.fields.into_profile()?;
    profile.zodiac_sign = profile
        .birth_date
        .map(|d| zodiac_sign(d).name().to_owned());

    let user = create_account(&state, signup, profile).await?;
    let cookie = issue_session(&state, user.id, &user.email, TokenTtl::Day)?;

    Ok((
        StatusCode::CREATED,
        [(SET_COOKIE, cookie)],
        Json(AuthResponse {
            success: true,
            message: "Регистрация успешна! Добро пожаловать!",
            user: PublicUser::from(user),
            redirect_url: DASHBOARD_URL,
        }),
    ))
}

#[instrument(skip(state))]
pub async fn logout(State(state): State<AppState>) -> AppResult<CookieResponse<MessageResponse>> {
    let cookie = clear_auth_cookie(state.config.secure_cookies())?;
    info!("auth cookie cleared");
    Ok((
        StatusCode::OK,
        [(SET_COOKIE, cookie)],
        Json(MessageResponse {
            success: true,
            message: "Выход выполнен успешно",
        }),
    ))
}

/// Reports the identity in the cookie; the database is not consulted.
#[instrument(skip_all)]
pub async fn verify(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let unauthenticated = |message: &'static str| {
        (
            StatusCode::UNAUTHORIZED,
            Json(VerifyResponse {
                success: false,
                authenticated: false,
                user: None,
                message: Some(message),
            }),
        )
            .into_response()
    };

    let Some(token) = token_from_headers(&headers) else {
        return unauthenticated(MSG_AUTH_REQUIRED);
    };

    match JwtKeys::from_ref(&state).verify(&token) {
        Some(claims) => Json(VerifyResponse {
            success: true,
            authenticated: true,
            user: Some(TokenUser {
                id: claims.user_id,
                email: claims.email,
            }),
            message: None,
        })
        .into_response(),
        None => unauthenticated(MSG_INVALID_TOKEN),
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{header::SET_COOKIE, StatusCode};
    use serde_json::json;

    use crate::testing::{body_json, get, post_json, TestApp};

    async fn register_anna(app: &TestApp) -> String {
        let res = post_json(
            app.router(),
            "/api/auth/register",
            json!({ "name": "Анна", "email": "Anna@Example.com", "password": "password1" }),
            None,
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        TestApp::auth_cookie(&res).expect("auth cookie set")
    }

    #[tokio::test]
    async fn register_sets_cookie_and_normalizes_email() {
        let app = TestApp::new();
        let res = post_json(
            app.router(),
            "/api/auth/register",
            json!({ "name": "Анна", "email": " Anna@Example.com ", "password": "password1" }),
            None,
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);

        let cookie = res.headers()[SET_COOKIE].to_str().unwrap().to_owned();
        assert!(cookie.starts_with("auth_token="));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Strict"));
        assert!(cookie.contains("Max-Age=86400"));
        assert!(!cookie.contains("Secure"));

        let json = body_json(res).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["user"]["email"], "anna@example.com");
        assert_eq!(json["redirectUrl"], "../dashboard.html");
        assert_eq!(app.users.len(), 1);
    }

    #[tokio::test]
    async fn register_rejects_invalid_fields() {
        let app = TestApp::new();
        let res = post_json(
            app.router(),
            "/api/auth/register",
            json!({ "name": "Анна", "email": "nope", "password": "password1" }),
            None,
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let json = body_json(res).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Ошибка валидации");
        assert_eq!(
            json["errors"]["email"],
            "Пожалуйста, введите корректный email адрес"
        );
    }

    #[tokio::test]
    async fn duplicate_email_is_conflict() {
        let app = TestApp::new();
        register_anna(&app).await;
        let res = post_json(
            app.router(),
            "/api/auth/register",
            json!({ "name": "Другая Анна", "email": "anna@example.com", "password": "password2" }),
            None,
        )
        .await;
        assert_eq!(res.status(), StatusCode::CONFLICT);
        assert_eq!(body_json(res).await["message"], "Этот email уже зарегистрирован");
    }

    #[tokio::test]
    async fn login_with_remember_me_gets_week_cookie() {
        let app = TestApp::new();
        register_anna(&app).await;

        let res = post_json(
            app.router(),
            "/api/auth/login",
            json!({ "email": "ANNA@example.com", "password": "password1", "remember": true }),
            None,
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let cookie = res.headers()[SET_COOKIE].to_str().unwrap().to_owned();
        assert!(cookie.contains("Max-Age=604800"));

        let json = body_json(res).await;
        assert_eq!(json["user"]["name"], "Анна");
        assert!(app.users.last_login_recorded("anna@example.com"));
    }

    #[tokio::test]
    async fn login_rejects_wrong_password_and_unknown_email_alike() {
        let app = TestApp::new();
        register_anna(&app).await;

        for body in [
            json!({ "email": "anna@example.com", "password": "wrong-pass" }),
            json!({ "email": "nobody@example.com", "password": "password1" }),
        ] {
            let res = post_json(app.router(), "/api/auth/login", body, None).await;
            assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
            assert_eq!(body_json(res).await["message"], "Неверный email или пароль");
        }
    }

    #[tokio::test]
    async fn login_is_rate_limited_per_ip() {
        let app = TestApp::new();
        for _ in 0..5 {
            let res = post_json(
                app.router(),
                "/api/auth/login",
                json!({ "email": "x@example.com", "password": "password1" }),
                None,
            )
            .await;
            assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        }
        let res = post_json(
            app.router(),
            "/api/auth/login",
            json!({ "email": "x@example.com", "password": "password1" }),
            None,
        )
        .await;
        assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn register_from_onboarding_stores_profile() {
        let app = TestApp::new();
        let res = post_json(
            app.router(),
            "/api/auth/register-from-onboarding",
            json!({
                "user_name": "Мария",
                "user_email": "maria@example.com",
                "user_password": "password1",
                "user_gender": "female",
                "user_birth_date": "1995-11-30",
                "user_birth_place": "Казань",
                "relationship_status": "married",
                "focus_areas": ["love", "career"],
                "zodiac_sign": "Овен"
            }),
            None,
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        assert!(TestApp::auth_cookie(&res).is_some());

        let user = app.users.by_email("maria@example.com").unwrap();
        assert_eq!(user.focus_area.as_deref(), Some("love, career"));
        assert_eq!(user.birth_place.as_deref(), Some("Казань"));
        // Derived from the birth date, not taken from the request.
        assert_eq!(user.zodiac_sign.as_deref(), Some("Стрелец"));
    }

    #[tokio::test]
    async fn verify_reports_cookie_identity() {
        let app = TestApp::new();
        let cookie = register_anna(&app).await;

        let res = get(app.router(), "/api/auth/verify", Some(&cookie)).await;
        assert_eq!(res.status(), StatusCode::OK);
        let json = body_json(res).await;
        assert_eq!(json["authenticated"], true);
        assert_eq!(json["user"]["email"], "anna@example.com");

        let res = get(app.router(), "/api/auth/verify", None).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let json = body_json(res).await;
        assert_eq!(json["authenticated"], false);
        assert_eq!(json["message"], "Необходима авторизация");

        let res = get(app.router(), "/api/auth/verify", Some("auth_token=garbage")).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(res).await["message"], "Недействительный токен");
    }

    #[tokio::test]
    async fn logout_clears_cookie() {
        let app = TestApp::new();
        let res = post_json(app.router(), "/api/auth/logout", json!({}), None).await;
        assert_eq!(res.status(), StatusCode::OK);
        let cookie = res.headers()[SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with("auth_token=;"));
        assert!(cookie.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn wrong_method_is_json_405() {
        let app = TestApp::new();
        let res = get(app.router(), "/api/auth/login", None).await;
        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body_json(res).await["message"], "Метод не разрешен");
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let app = TestApp::new();
        let res = crate::testing::post_raw(app.router(), "/api/auth/login", "{not json").await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(res).await["success"], false);
    }
}
