//! User repository for database operations

use crate::error::{ApiError, ApiResult};
use chrono::NaiveDateTime;
use menu_planner_shared::validation;
use sqlx::PgPool;

/// User record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub organization: Option<String>,
    pub phone: Option<String>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub last_login_at: Option<NaiveDateTime>,
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub organization: Option<String>,
    pub phone: Option<String>,
}

const USER_COLUMNS: &str = "id, email, password_hash, name, organization, phone, is_active, \
                            created_at, updated_at, last_login_at";

/// User repository
pub struct UserRepository;

impl UserRepository {
    /// Create a new user account (email is the natural key)
    pub async fn create(db: &PgPool, input: CreateUser) -> ApiResult<UserRecord> {
        validation::validate_email(&input.email).map_err(ApiError::Validation)?;

        let user = sqlx::query_as::<_, UserRecord>(&format!(
            r#"
            INSERT INTO users (email, password_hash, name, organization, phone)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(&input.email)
        .bind(&input.password_hash)
        .bind(&input.name)
        .bind(&input.organization)
        .bind(&input.phone)
        .fetch_one(db)
        .await?;

        Ok(user)
    }

    /// Find user by ID
    pub async fn find_by_id(db: &PgPool, id: i64) -> ApiResult<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;

        Ok(user)
    }

    /// Find user by email
    pub async fn find_by_email(db: &PgPool, email: &str) -> ApiResult<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1",
        ))
        .bind(email)
        .fetch_optional(db)
        .await?;

        Ok(user)
    }

    /// Stamp a successful login
    pub async fn record_login(db: &PgPool, id: i64) -> ApiResult<bool> {
        let result = sqlx::query(
            "UPDATE users SET last_login_at = now(), updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .execute(db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deactivate an account without deleting its data
    pub async fn deactivate(db: &PgPool, id: i64) -> ApiResult<bool> {
        let result =
            sqlx::query("UPDATE users SET is_active = FALSE, updated_at = now() WHERE id = $1")
                .bind(id)
                .execute(db)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a user
    ///
    /// Cascades through meal plans, daily meals, items, joins, telemetry
    /// and history per the schema's ownership edges.
    pub async fn delete(db: &PgPool, id: i64) -> ApiResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
