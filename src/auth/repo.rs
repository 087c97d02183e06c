use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::repo_types::{AstroProfile, NewUser, User};

const USER_COLUMNS: &str = "id, name, email, password_hash, gender, birth_date, birth_time, \
     birth_place, relationship_status, focus_area, zodiac_sign, created_at, last_login_at, updated_at";

/// Registration hit the unique email constraint.
#[derive(Debug, thiserror::Error)]
#[error("email already registered")]
pub struct EmailTaken;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    /// Fails with [`EmailTaken`] when the address is already registered.
    async fn create(&self, new_user: NewUser) -> anyhow::Result<User>;
    async fn touch_last_login(&self, id: Uuid) -> anyhow::Result<()>;
    /// Returns `false` if no row matched `id`.
    async fn update_profile(&self, id: Uuid, profile: &AstroProfile) -> anyhow::Result<bool>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .context("find user by email")?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find user by id")?;
        Ok(user)
    }

    async fn create(&self, new_user: NewUser) -> anyhow::Result<User> {
        let NewUser {
            name,
            email,
            password_hash,
            profile,
        } = new_user;

        let inserted = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (
                name, email, password_hash,
                gender, birth_date, birth_time, birth_place,
                relationship_status, focus_area, zodiac_sign
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(profile.gender)
        .bind(profile.birth_date)
        .bind(profile.birth_time)
        .bind(profile.birth_place)
        .bind(profile.relationship_status)
        .bind(profile.focus_area)
        .bind(profile.zodiac_sign)
        .fetch_one(&self.db)
        .await;

        match inserted {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(e))
                if e.code().as_deref() == Some("23505")
                    && e.constraint() == Some("users_email_key") =>
            {
                Err(EmailTaken.into())
            }
            Err(e) => Err(anyhow::Error::new(e).context("insert user")),
        }
    }

    async fn touch_last_login(&self, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET last_login_at = CURRENT_TIMESTAMP WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .context("update last_login_at")?;
        Ok(())
    }

    async fn update_profile(&self, id: Uuid, profile: &AstroProfile) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
               SET gender = $1,
                   birth_date = $2,
                   birth_time = $3,
                   birth_place = $4,
                   relationship_status = $5,
                   focus_area = $6,
                   zodiac_sign = $7,
                   updated_at = CURRENT_TIMESTAMP
             WHERE id = $8
            "#,
        )
        .bind(&profile.gender)
        .bind(profile.birth_date)
        .bind(&profile.birth_time)
        .bind(&profile.birth_place)
        .bind(&profile.relationship_status)
        .bind(&profile.focus_area)
        .bind(&profile.zodiac_sign)
        .bind(id)
        .execute(&self.db)
        .await
        .context("update onboarding profile")?;
        Ok(result.rows_affected() > 0)
    }
}
