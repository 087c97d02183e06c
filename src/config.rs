use std::{fmt, path::PathBuf, str::FromStr, time::Duration};

use serde::Deserialize;

const MIN_JWT_SECRET_LEN: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppEnv {
    Development,
    Production,
    Test,
}

impl AppEnv {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "development" => Some(Self::Development),
            "production" => Some(Self::Production),
            "test" => Some(Self::Test),
            _ => None,
        }
    }

    pub fn is_production(self) -> bool {
        self == Self::Production
    }
}

impl fmt::Display for AppEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Test => "test",
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
    pub idle_timeout: Duration,
    pub connect_timeout: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub env: AppEnv,
    pub host: String,
    pub port: u16,
    pub db: DbConfig,
    pub jwt: JwtConfig,
    pub static_dir: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source. Every problem is
    /// reported in one error.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut problems = Vec::new();

        let database_url = lookup("POSTGRES_URL")
            .or_else(|| lookup("DATABASE_URL"))
            .filter(|v| !v.trim().is_empty());
        if database_url.is_none() {
            problems.push("POSTGRES_URL is not defined in environment".to_string());
        }

        let secret = lookup("JWT_SECRET").filter(|v| !v.is_empty());
        match &secret {
            None => problems.push("JWT_SECRET is not defined in environment".to_string()),
            Some(s) if s.chars().count() < MIN_JWT_SECRET_LEN => problems.push(format!(
                "JWT_SECRET must be at least {MIN_JWT_SECRET_LEN} characters, got {}",
                s.chars().count()
            )),
            Some(_) => {}
        }

        let raw_env = lookup("NODE_ENV").unwrap_or_else(|| "development".into());
        let env = AppEnv::parse(&raw_env);
        if env.is_none() {
            problems.push(format!(
                "NODE_ENV should be \"development\", \"production\", or \"test\", got \"{raw_env}\""
            ));
        }

        let port = match lookup("APP_PORT") {
            Some(v) => v.parse::<u16>().unwrap_or_else(|_| {
                problems.push(format!("APP_PORT must be a port number, got \"{v}\""));
                0
            }),
            None => 3001,
        };

        let max_connections: u32 = number_var(&lookup, "DB_MAX_CONNECTIONS", 20, &mut problems);
        let idle_timeout: u64 = number_var(&lookup, "DB_IDLE_TIMEOUT_SECS", 30, &mut problems);
        let connect_timeout: u64 =
            number_var(&lookup, "DB_CONNECT_TIMEOUT_SECS", 5, &mut problems);

        if !problems.is_empty() {
            anyhow::bail!("environment validation failed: {}", problems.join("; "));
        }

        Ok(Self {
            env: env.unwrap_or(AppEnv::Development),
            host: lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            db: DbConfig {
                url: database_url.unwrap_or_default(),
                max_connections,
                idle_timeout: Duration::from_secs(idle_timeout),
                connect_timeout: Duration::from_secs(connect_timeout),
            },
            jwt: JwtConfig {
                secret: secret.unwrap_or_default(),
            },
            static_dir: lookup("STATIC_DIR")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
        })
    }

    /// The `Secure` cookie attribute is only sent in production.
    pub fn secure_cookies(&self) -> bool {
        self.env.is_production()
    }
}

/// Unset means `default`; anything unparseable is recorded as a problem.
fn number_var<T, F>(lookup: &F, key: &str, default: T, problems: &mut Vec<String>) -> T
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(v) => v.trim().parse().unwrap_or_else(|_| {
            problems.push(format!("{key} must be a non-negative integer, got \"{v}\""));
            default
        }),
        None => default,
    }
}
