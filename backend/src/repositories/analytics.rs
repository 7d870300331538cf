//! Telemetry and KPI repositories - activity log, favorites, monthly
//! actives, and meal-plan time/reuse tracking
//!
//! Insert-mostly tables used for analytics, not operational state.

use crate::error::ApiResult;
use chrono::{NaiveDate, NaiveDateTime};
use ipnetwork::IpNetwork;
use menu_planner_shared::models::{ActivityType, ReuseType};
use rust_decimal::Decimal;
use sqlx::PgPool;

/// Activity log row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ActivityLogRecord {
    pub id: i64,
    pub user_id: i64,
    pub activity_type: String,
    pub activity_at: NaiveDateTime,
    pub ip_address: Option<IpNetwork>,
    pub user_agent: Option<String>,
}

/// Favorite row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserFavoriteRecord {
    pub id: i64,
    pub user_id: i64,
    pub item_type: String,
    pub item_id: i64,
    pub added_at: NaiveDateTime,
    pub usage_count: i32,
}

/// Monthly active user snapshot
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MonthlyActiveUsersRecord {
    pub id: i64,
    pub year_month: NaiveDate,
    pub total_active_users: i32,
    pub new_users: i32,
    pub returning_users: i32,
    pub churned_users: i32,
    pub created_at: NaiveDateTime,
}

/// Time spent building a plan (one row per plan)
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TimeTrackingRecord {
    pub id: i64,
    pub meal_plan_id: i64,
    pub user_id: i64,
    pub started_at: NaiveDateTime,
    pub generated_at: Option<NaiveDateTime>,
    pub confirmed_at: Option<NaiveDateTime>,
    pub total_edit_time_seconds: Option<i32>,
    pub baseline_time_hours: Option<Decimal>,
}

/// Reuse event: a plan built from earlier work
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReuseTrackingRecord {
    pub id: i64,
    pub meal_plan_id: i64,
    pub user_id: i64,
    pub reuse_type: String,
    pub source_meal_plan_id: Option<i64>,
    pub source_item_id: Option<i64>,
    pub reused_at: NaiveDateTime,
}

/// Activity log repository
pub struct ActivityLogRepository;

impl ActivityLogRepository {
    /// Append one activity entry
    pub async fn log(
        db: &PgPool,
        user_id: i64,
        activity: ActivityType,
        ip_address: Option<IpNetwork>,
        user_agent: Option<String>,
    ) -> ApiResult<ActivityLogRecord> {
        let entry = sqlx::query_as::<_, ActivityLogRecord>(
            r#"
            INSERT INTO user_activity_log (user_id, activity_type, ip_address, user_agent)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, activity_type, activity_at, ip_address, user_agent
            "#,
        )
        .bind(user_id)
        .bind(activity.as_str())
        .bind(ip_address)
        .bind(&user_agent)
        .fetch_one(db)
        .await?;

        Ok(entry)
    }

    /// A user's most recent activity, newest first
    pub async fn list_recent(
        db: &PgPool,
        user_id: i64,
        limit: i64,
    ) -> ApiResult<Vec<ActivityLogRecord>> {
        let entries = sqlx::query_as::<_, ActivityLogRecord>(
            r#"
            SELECT id, user_id, activity_type, activity_at, ip_address, user_agent
            FROM user_activity_log
            WHERE user_id = $1
            ORDER BY activity_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(db)
        .await?;

        Ok(entries)
    }
}

/// Favorites repository
pub struct FavoriteRepository;

impl FavoriteRepository {
    /// Add a favorite, or bump its usage count if it already exists
    pub async fn add_or_touch(
        db: &PgPool,
        user_id: i64,
        item_type: &str,
        item_id: i64,
    ) -> ApiResult<UserFavoriteRecord> {
        let favorite = sqlx::query_as::<_, UserFavoriteRecord>(
            r#"
            INSERT INTO user_favorites (user_id, item_type, item_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, item_type, item_id)
            DO UPDATE SET usage_count = user_favorites.usage_count + 1
            RETURNING id, user_id, item_type, item_id, added_at, usage_count
            "#,
        )
        .bind(user_id)
        .bind(item_type)
        .bind(item_id)
        .fetch_one(db)
        .await?;

        Ok(favorite)
    }

    /// A user's favorites
    pub async fn list(db: &PgPool, user_id: i64) -> ApiResult<Vec<UserFavoriteRecord>> {
        let favorites = sqlx::query_as::<_, UserFavoriteRecord>(
            r#"
            SELECT id, user_id, item_type, item_id, added_at, usage_count
            FROM user_favorites
            WHERE user_id = $1
            ORDER BY added_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;

        Ok(favorites)
    }

    /// Remove a favorite
    pub async fn remove(
        db: &PgPool,
        user_id: i64,
        item_type: &str,
        item_id: i64,
    ) -> ApiResult<bool> {
        let result = sqlx::query(
            "DELETE FROM user_favorites WHERE user_id = $1 AND item_type = $2 AND item_id = $3",
        )
        .bind(user_id)
        .bind(item_type)
        .bind(item_id)
        .execute(db)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// KPI repository - monthly actives, time tracking, reuse tracking
pub struct KpiRepository;

impl KpiRepository {
    /// Write the snapshot for a month; a repeated write replaces the
    /// counters (unique per year_month)
    pub async fn record_monthly_active_users(
        db: &PgPool,
        year_month: NaiveDate,
        total: i32,
        new_users: i32,
        returning: i32,
        churned: i32,
    ) -> ApiResult<MonthlyActiveUsersRecord> {
        let snapshot = sqlx::query_as::<_, MonthlyActiveUsersRecord>(
            r#"
            INSERT INTO monthly_active_users
                (year_month, total_active_users, new_users, returning_users, churned_users)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (year_month) DO UPDATE SET
                total_active_users = EXCLUDED.total_active_users,
                new_users = EXCLUDED.new_users,
                returning_users = EXCLUDED.returning_users,
                churned_users = EXCLUDED.churned_users
            RETURNING id, year_month, total_active_users, new_users, returning_users,
                      churned_users, created_at
            "#,
        )
        .bind(year_month)
        .bind(total)
        .bind(new_users)
        .bind(returning)
        .bind(churned)
        .fetch_one(db)
        .await?;

        Ok(snapshot)
    }

    /// Start the editing clock for a plan (one row per plan)
    pub async fn start_time_tracking(
        db: &PgPool,
        meal_plan_id: i64,
        user_id: i64,
        started_at: NaiveDateTime,
        baseline_time_hours: Option<Decimal>,
    ) -> ApiResult<TimeTrackingRecord> {
        let record = sqlx::query_as::<_, TimeTrackingRecord>(
            r#"
            INSERT INTO meal_plan_time_tracking
                (meal_plan_id, user_id, started_at, baseline_time_hours)
            VALUES ($1, $2, $3, $4)
            RETURNING id, meal_plan_id, user_id, started_at, generated_at, confirmed_at,
                      total_edit_time_seconds, baseline_time_hours
            "#,
        )
        .bind(meal_plan_id)
        .bind(user_id)
        .bind(started_at)
        .bind(baseline_time_hours)
        .fetch_one(db)
        .await?;

        Ok(record)
    }

    /// Stamp plan confirmation and the accumulated edit time
    pub async fn mark_confirmed(
        db: &PgPool,
        meal_plan_id: i64,
        total_edit_time_seconds: i32,
    ) -> ApiResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE meal_plan_time_tracking
            SET confirmed_at = now(), total_edit_time_seconds = $2
            WHERE meal_plan_id = $1
            "#,
        )
        .bind(meal_plan_id)
        .bind(total_edit_time_seconds)
        .execute(db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Record that a plan was built from earlier work
    ///
    /// `source_meal_plan_id` is a weak back-reference: deleting the
    /// source plan nulls it without dropping the event.
    pub async fn record_reuse(
        db: &PgPool,
        meal_plan_id: i64,
        user_id: i64,
        reuse_type: ReuseType,
        source_meal_plan_id: Option<i64>,
        source_item_id: Option<i64>,
    ) -> ApiResult<ReuseTrackingRecord> {
        let record = sqlx::query_as::<_, ReuseTrackingRecord>(
            r#"
            INSERT INTO meal_plan_reuse_tracking
                (meal_plan_id, user_id, reuse_type, source_meal_plan_id, source_item_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, meal_plan_id, user_id, reuse_type, source_meal_plan_id, source_item_id,
                      reused_at
            "#,
        )
        .bind(meal_plan_id)
        .bind(user_id)
        .bind(reuse_type.as_str())
        .bind(source_meal_plan_id)
        .bind(source_item_id)
        .fetch_one(db)
        .await?;

        Ok(record)
    }

    /// Time-tracking row for a plan
    pub async fn get_time_tracking(
        db: &PgPool,
        meal_plan_id: i64,
    ) -> ApiResult<Option<TimeTrackingRecord>> {
        let record = sqlx::query_as::<_, TimeTrackingRecord>(
            r#"
            SELECT id, meal_plan_id, user_id, started_at, generated_at, confirmed_at,
                   total_edit_time_seconds, baseline_time_hours
            FROM meal_plan_time_tracking
            WHERE meal_plan_id = $1
            "#,
        )
        .bind(meal_plan_id)
        .fetch_optional(db)
        .await?;

        Ok(record)
    }
}
