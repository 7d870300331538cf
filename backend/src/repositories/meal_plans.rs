//! Meal plan repositories - plans, daily meals, items, and the audit trail
//!
//! Ownership chain: meal_plans -> daily_meals -> meal_items ->
//! meal_item_ingredients, all cascade-deleted with their owner. The
//! history table references plans and items but is append-only; an item
//! delete nulls the back-reference instead of removing the audit row.

use crate::error::{ApiError, ApiResult};
use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use menu_planner_shared::models::{HistoryAction, MealCategory, PlanStatus};
use menu_planner_shared::validation;
use rust_decimal::Decimal;
use sqlx::PgPool;

/// Meal plan record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MealPlanRecord {
    pub id: i64,
    pub user_id: i64,
    pub year: i32,
    pub month: i32,
    pub name: String,
    pub target_count: i32,
    pub budget_per_person: Option<Decimal>,
    pub total_budget: Option<Decimal>,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub confirmed_at: Option<NaiveDateTime>,
    pub published_at: Option<NaiveDateTime>,
}

impl MealPlanRecord {
    /// Lifecycle status as its closed domain type
    pub fn plan_status(&self) -> ApiResult<PlanStatus> {
        self.status
            .parse()
            .map_err(|e: menu_planner_shared::models::ParseDomainError| {
                ApiError::Internal(anyhow::Error::new(e))
            })
    }
}

/// Input for creating a meal plan
#[derive(Debug, Clone)]
pub struct CreateMealPlan {
    pub user_id: i64,
    pub year: i32,
    pub month: i32,
    pub name: String,
    pub target_count: i32,
    pub budget_per_person: Option<Decimal>,
    pub total_budget: Option<Decimal>,
    pub notes: Option<String>,
}

/// Daily meal record from database
///
/// `total_calories` and `total_price_per_person` are writer-maintained
/// aggregates; the store does not recompute them from the item tree.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DailyMealRecord {
    pub id: i64,
    pub meal_plan_id: i64,
    pub date: NaiveDate,
    pub day_of_week: String,
    pub is_holiday: bool,
    pub holiday_name: Option<String>,
    pub total_calories: Option<Decimal>,
    pub total_price_per_person: Option<Decimal>,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input for creating a daily meal
#[derive(Debug, Clone)]
pub struct CreateDailyMeal {
    pub meal_plan_id: i64,
    pub date: NaiveDate,
    pub is_holiday: bool,
    pub holiday_name: Option<String>,
    pub notes: Option<String>,
}

/// Meal item record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MealItemRecord {
    pub id: i64,
    pub daily_meal_id: i64,
    pub category: String,
    pub name: String,
    pub serving_size_g: Decimal,
    pub price_per_person: Option<Decimal>,
    pub calories: Option<Decimal>,
    pub cooking_method: Option<String>,
    pub display_order: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input for creating a meal item
#[derive(Debug, Clone)]
pub struct CreateMealItem {
    pub daily_meal_id: i64,
    pub category: MealCategory,
    pub name: String,
    pub serving_size_g: Decimal,
    pub price_per_person: Option<Decimal>,
    pub calories: Option<Decimal>,
    pub cooking_method: Option<String>,
    pub display_order: i32,
}

/// One ingredient line attached to a meal item
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MealItemIngredientRecord {
    pub id: i64,
    pub meal_item_id: i64,
    pub ingredient_id: i64,
    pub quantity_g: Decimal,
    pub created_at: NaiveDateTime,
}

/// Ingredient line input for item creation
#[derive(Debug, Clone)]
pub struct ItemIngredientInput {
    pub ingredient_id: i64,
    pub quantity_g: Decimal,
}

/// Audit trail row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct HistoryRecord {
    pub id: i64,
    pub meal_plan_id: i64,
    pub meal_item_id: Option<i64>,
    pub user_id: i64,
    pub action_type: String,
    pub changed_at: NaiveDateTime,
    pub before_value: Option<serde_json::Value>,
    pub after_value: Option<serde_json::Value>,
    pub reason: Option<String>,
}

/// Input for an audit trail entry
#[derive(Debug, Clone)]
pub struct RecordHistory {
    pub meal_plan_id: i64,
    pub meal_item_id: Option<i64>,
    pub user_id: i64,
    pub action: HistoryAction,
    pub before_value: Option<serde_json::Value>,
    pub after_value: Option<serde_json::Value>,
    pub reason: Option<String>,
}

const PLAN_COLUMNS: &str = "id, user_id, year, month, name, target_count, budget_per_person, \
                            total_budget, status, notes, created_at, updated_at, confirmed_at, \
                            published_at";

const DAILY_COLUMNS: &str = "id, meal_plan_id, date, day_of_week, is_holiday, holiday_name, \
                             total_calories, total_price_per_person, notes, created_at, updated_at";

const ITEM_COLUMNS: &str = "id, daily_meal_id, category, name, serving_size_g, price_per_person, \
                            calories, cooking_method, display_order, created_at, updated_at";

const HISTORY_COLUMNS: &str = "id, meal_plan_id, meal_item_id, user_id, action_type, changed_at, \
                               before_value, after_value, reason";

/// Meal plan repository
pub struct MealPlanRepository;

impl MealPlanRepository {
    /// Create a monthly plan; at most one per (user, year, month)
    pub async fn create(db: &PgPool, input: CreateMealPlan) -> ApiResult<MealPlanRecord> {
        validation::validate_year(input.year).map_err(ApiError::Validation)?;
        validation::validate_month(input.month).map_err(ApiError::Validation)?;
        validation::validate_target_count(input.target_count).map_err(ApiError::Validation)?;
        if let Some(budget) = input.budget_per_person {
            validation::validate_non_negative_amount(budget).map_err(ApiError::Validation)?;
        }

        let plan = sqlx::query_as::<_, MealPlanRecord>(&format!(
            r#"
            INSERT INTO meal_plans
                (user_id, year, month, name, target_count, budget_per_person, total_budget, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {PLAN_COLUMNS}
            "#,
        ))
        .bind(input.user_id)
        .bind(input.year)
        .bind(input.month)
        .bind(&input.name)
        .bind(input.target_count)
        .bind(input.budget_per_person)
        .bind(input.total_budget)
        .bind(&input.notes)
        .fetch_one(db)
        .await?;

        Ok(plan)
    }

    /// Find plan by ID
    pub async fn find_by_id(db: &PgPool, id: i64) -> ApiResult<Option<MealPlanRecord>> {
        let plan = sqlx::query_as::<_, MealPlanRecord>(&format!(
            "SELECT {PLAN_COLUMNS} FROM meal_plans WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;

        Ok(plan)
    }

    /// Find a user's plan for a calendar month (the natural key)
    pub async fn find_by_user_month(
        db: &PgPool,
        user_id: i64,
        year: i32,
        month: i32,
    ) -> ApiResult<Option<MealPlanRecord>> {
        let plan = sqlx::query_as::<_, MealPlanRecord>(&format!(
            "SELECT {PLAN_COLUMNS} FROM meal_plans WHERE user_id = $1 AND year = $2 AND month = $3",
        ))
        .bind(user_id)
        .bind(year)
        .bind(month)
        .fetch_optional(db)
        .await?;

        Ok(plan)
    }

    /// List a user's plans, newest first
    pub async fn list_by_user(db: &PgPool, user_id: i64) -> ApiResult<Vec<MealPlanRecord>> {
        let plans = sqlx::query_as::<_, MealPlanRecord>(&format!(
            "SELECT {PLAN_COLUMNS} FROM meal_plans WHERE user_id = $1 ORDER BY year DESC, month DESC",
        ))
        .bind(user_id)
        .fetch_all(db)
        .await?;

        Ok(plans)
    }

    /// Confirm a plan
    ///
    /// Status change and its audit row commit in one transaction; the
    /// caller never observes a confirmed plan without its history entry.
    pub async fn confirm(
        db: &PgPool,
        plan_id: i64,
        user_id: i64,
        reason: Option<String>,
    ) -> ApiResult<MealPlanRecord> {
        Self::transition(db, plan_id, user_id, PlanStatus::Confirmed, reason).await
    }

    /// Publish a plan
    pub async fn publish(
        db: &PgPool,
        plan_id: i64,
        user_id: i64,
        reason: Option<String>,
    ) -> ApiResult<MealPlanRecord> {
        Self::transition(db, plan_id, user_id, PlanStatus::Published, reason).await
    }

    async fn transition(
        db: &PgPool,
        plan_id: i64,
        user_id: i64,
        target: PlanStatus,
        reason: Option<String>,
    ) -> ApiResult<MealPlanRecord> {
        let (timestamp_column, action) = match target {
            PlanStatus::Confirmed => ("confirmed_at", HistoryAction::Confirm),
            PlanStatus::Published => ("published_at", HistoryAction::Publish),
            PlanStatus::Draft => {
                return Err(ApiError::Validation(
                    "A plan cannot transition back to draft".to_string(),
                ))
            }
        };

        let mut tx = db.begin().await?;

        let before = sqlx::query_as::<_, MealPlanRecord>(&format!(
            "SELECT {PLAN_COLUMNS} FROM meal_plans WHERE id = $1 FOR UPDATE",
        ))
        .bind(plan_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Meal plan {plan_id} not found")))?;

        let after = sqlx::query_as::<_, MealPlanRecord>(&format!(
            r#"
            UPDATE meal_plans
            SET status = $2, {timestamp_column} = now(), updated_at = now()
            WHERE id = $1
            RETURNING {PLAN_COLUMNS}
            "#,
        ))
        .bind(plan_id)
        .bind(target.as_str())
        .fetch_one(&mut *tx)
        .await?;

        HistoryRepository::record(
            &mut *tx,
            RecordHistory {
                meal_plan_id: plan_id,
                meal_item_id: None,
                user_id,
                action,
                before_value: Some(serde_json::json!({ "status": before.status })),
                after_value: Some(serde_json::json!({ "status": after.status })),
                reason,
            },
        )
        .await?;

        tx.commit().await?;
        Ok(after)
    }

    /// Delete a plan and its whole daily-meal/item tree
    pub async fn delete(db: &PgPool, id: i64) -> ApiResult<bool> {
        let result = sqlx::query("DELETE FROM meal_plans WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Daily meal repository
pub struct DailyMealRepository;

impl DailyMealRepository {
    /// Create one calendar day within a plan; unique per (plan, date)
    pub async fn create(db: &PgPool, input: CreateDailyMeal) -> ApiResult<DailyMealRecord> {
        let meal = sqlx::query_as::<_, DailyMealRecord>(&format!(
            r#"
            INSERT INTO daily_meals (meal_plan_id, date, day_of_week, is_holiday, holiday_name, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {DAILY_COLUMNS}
            "#,
        ))
        .bind(input.meal_plan_id)
        .bind(input.date)
        .bind(day_of_week(input.date))
        .bind(input.is_holiday)
        .bind(&input.holiday_name)
        .bind(&input.notes)
        .fetch_one(db)
        .await?;

        Ok(meal)
    }

    /// Find the day of a plan by date (the natural key)
    pub async fn find_by_plan_date(
        db: &PgPool,
        meal_plan_id: i64,
        date: NaiveDate,
    ) -> ApiResult<Option<DailyMealRecord>> {
        let meal = sqlx::query_as::<_, DailyMealRecord>(&format!(
            "SELECT {DAILY_COLUMNS} FROM daily_meals WHERE meal_plan_id = $1 AND date = $2",
        ))
        .bind(meal_plan_id)
        .bind(date)
        .fetch_optional(db)
        .await?;

        Ok(meal)
    }

    /// List all days of a plan in calendar order
    pub async fn list_by_plan(db: &PgPool, meal_plan_id: i64) -> ApiResult<Vec<DailyMealRecord>> {
        let meals = sqlx::query_as::<_, DailyMealRecord>(&format!(
            "SELECT {DAILY_COLUMNS} FROM daily_meals WHERE meal_plan_id = $1 ORDER BY date ASC",
        ))
        .bind(meal_plan_id)
        .fetch_all(db)
        .await?;

        Ok(meals)
    }

    /// Update the writer-maintained aggregate columns
    pub async fn set_totals(
        db: &PgPool,
        id: i64,
        total_calories: Option<Decimal>,
        total_price_per_person: Option<Decimal>,
    ) -> ApiResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE daily_meals
            SET total_calories = $2, total_price_per_person = $3, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(total_calories)
        .bind(total_price_per_person)
        .execute(db)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Meal item repository
pub struct MealItemRepository;

impl MealItemRepository {
    /// Create a single dish within a daily meal
    pub async fn create(db: &PgPool, input: CreateMealItem) -> ApiResult<MealItemRecord> {
        validation::validate_positive_quantity(input.serving_size_g)
            .map_err(ApiError::Validation)?;

        let item = Self::insert(db, &input).await?;
        Ok(item)
    }

    /// Create a dish together with its ingredient lines
    ///
    /// One transaction: the item and every join row commit together or
    /// not at all, so a half-written item tree is never observable.
    pub async fn create_with_ingredients(
        db: &PgPool,
        input: CreateMealItem,
        ingredients: Vec<ItemIngredientInput>,
    ) -> ApiResult<(MealItemRecord, Vec<MealItemIngredientRecord>)> {
        validation::validate_positive_quantity(input.serving_size_g)
            .map_err(ApiError::Validation)?;
        for line in &ingredients {
            validation::validate_positive_quantity(line.quantity_g)
                .map_err(ApiError::Validation)?;
        }

        let mut tx = db.begin().await?;

        let item = Self::insert(&mut *tx, &input).await?;

        let mut lines = Vec::with_capacity(ingredients.len());
        for line in &ingredients {
            let record = sqlx::query_as::<_, MealItemIngredientRecord>(
                r#"
                INSERT INTO meal_item_ingredients (meal_item_id, ingredient_id, quantity_g)
                VALUES ($1, $2, $3)
                RETURNING id, meal_item_id, ingredient_id, quantity_g, created_at
                "#,
            )
            .bind(item.id)
            .bind(line.ingredient_id)
            .bind(line.quantity_g)
            .fetch_one(&mut *tx)
            .await?;
            lines.push(record);
        }

        tx.commit().await?;
        Ok((item, lines))
    }

    async fn insert<'e, E>(executor: E, input: &CreateMealItem) -> ApiResult<MealItemRecord>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let item = sqlx::query_as::<_, MealItemRecord>(&format!(
            r#"
            INSERT INTO meal_items
                (daily_meal_id, category, name, serving_size_g, price_per_person, calories,
                 cooking_method, display_order)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {ITEM_COLUMNS}
            "#,
        ))
        .bind(input.daily_meal_id)
        .bind(input.category.as_str())
        .bind(&input.name)
        .bind(input.serving_size_g)
        .bind(input.price_per_person)
        .bind(input.calories)
        .bind(&input.cooking_method)
        .bind(input.display_order)
        .fetch_one(executor)
        .await?;

        Ok(item)
    }

    /// List the dishes of a day in display order within each category
    pub async fn list_for_daily_meal(
        db: &PgPool,
        daily_meal_id: i64,
    ) -> ApiResult<Vec<MealItemRecord>> {
        let items = sqlx::query_as::<_, MealItemRecord>(&format!(
            r#"
            SELECT {ITEM_COLUMNS} FROM meal_items
            WHERE daily_meal_id = $1
            ORDER BY category ASC, display_order ASC
            "#,
        ))
        .bind(daily_meal_id)
        .fetch_all(db)
        .await?;

        Ok(items)
    }

    /// Find item by ID
    pub async fn find_by_id(db: &PgPool, id: i64) -> ApiResult<Option<MealItemRecord>> {
        let item = sqlx::query_as::<_, MealItemRecord>(&format!(
            "SELECT {ITEM_COLUMNS} FROM meal_items WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;

        Ok(item)
    }

    /// Attach one ingredient line; unique per (item, ingredient)
    pub async fn add_ingredient(
        db: &PgPool,
        meal_item_id: i64,
        line: ItemIngredientInput,
    ) -> ApiResult<MealItemIngredientRecord> {
        validation::validate_positive_quantity(line.quantity_g).map_err(ApiError::Validation)?;

        let record = sqlx::query_as::<_, MealItemIngredientRecord>(
            r#"
            INSERT INTO meal_item_ingredients (meal_item_id, ingredient_id, quantity_g)
            VALUES ($1, $2, $3)
            RETURNING id, meal_item_id, ingredient_id, quantity_g, created_at
            "#,
        )
        .bind(meal_item_id)
        .bind(line.ingredient_id)
        .bind(line.quantity_g)
        .fetch_one(db)
        .await?;

        Ok(record)
    }

    /// List an item's ingredient lines
    pub async fn list_ingredients(
        db: &PgPool,
        meal_item_id: i64,
    ) -> ApiResult<Vec<MealItemIngredientRecord>> {
        let lines = sqlx::query_as::<_, MealItemIngredientRecord>(
            r#"
            SELECT id, meal_item_id, ingredient_id, quantity_g, created_at
            FROM meal_item_ingredients
            WHERE meal_item_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(meal_item_id)
        .fetch_all(db)
        .await?;

        Ok(lines)
    }

    /// Delete an item (history rows keep their other columns, the
    /// meal_item_id back-reference becomes NULL)
    pub async fn delete(db: &PgPool, id: i64) -> ApiResult<bool> {
        let result = sqlx::query("DELETE FROM meal_items WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Audit trail repository
///
/// Append-only: rows are inserted and scanned, never updated.
pub struct HistoryRepository;

impl HistoryRepository {
    /// Append one audit entry
    ///
    /// Takes any executor so callers can write the entry inside their
    /// own transaction.
    pub async fn record<'e, E>(executor: E, input: RecordHistory) -> ApiResult<HistoryRecord>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let row = sqlx::query_as::<_, HistoryRecord>(&format!(
            r#"
            INSERT INTO meal_plan_history
                (meal_plan_id, meal_item_id, user_id, action_type, before_value, after_value, reason)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {HISTORY_COLUMNS}
            "#,
        ))
        .bind(input.meal_plan_id)
        .bind(input.meal_item_id)
        .bind(input.user_id)
        .bind(input.action.as_str())
        .bind(input.before_value)
        .bind(input.after_value)
        .bind(&input.reason)
        .fetch_one(executor)
        .await?;

        Ok(row)
    }

    /// Chronological history scan for a plan (uses the
    /// (meal_plan_id, changed_at) composite index)
    pub async fn list_for_plan(db: &PgPool, meal_plan_id: i64) -> ApiResult<Vec<HistoryRecord>> {
        let rows = sqlx::query_as::<_, HistoryRecord>(&format!(
            r#"
            SELECT {HISTORY_COLUMNS} FROM meal_plan_history
            WHERE meal_plan_id = $1
            ORDER BY changed_at ASC, id ASC
            "#,
        ))
        .bind(meal_plan_id)
        .fetch_all(db)
        .await?;

        Ok(rows)
    }
}

/// English weekday name for the daily_meals.day_of_week column
fn day_of_week(date: NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(2026, 3, 2, "monday")]
    #[case(2026, 3, 1, "sunday")]
    #[case(2026, 3, 7, "saturday")]
    #[case(2026, 2, 28, "saturday")]
    fn test_day_of_week_derivation(
        #[case] year: i32,
        #[case] month: u32,
        #[case] day: u32,
        #[case] expected: &str,
    ) {
        let date = NaiveDate::from_ymd_opt(year, month, day).unwrap();
        assert_eq!(day_of_week(date), expected);
    }

    #[test]
    fn test_plan_status_accessor() {
        let record = MealPlanRecord {
            id: 1,
            user_id: 1,
            year: 2026,
            month: 3,
            name: "March".to_string(),
            target_count: 50,
            budget_per_person: None,
            total_budget: None,
            status: "confirmed".to_string(),
            notes: None,
            created_at: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap().into(),
            updated_at: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap().into(),
            confirmed_at: None,
            published_at: None,
        };
        assert_eq!(record.plan_status().unwrap(), PlanStatus::Confirmed);
    }
}
