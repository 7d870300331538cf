//! Ingredient repositories - canonical materials, substitutions,
//! nutrition profiles, and allergen tagging

use crate::error::{ApiError, ApiResult};
use chrono::NaiveDateTime;
use menu_planner_shared::models::{
    ContaminationLevel, IngredientCategory, IngredientUnit, SupplyStability,
};
use menu_planner_shared::validation;
use rust_decimal::Decimal;
use sqlx::PgPool;

/// Ingredient record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct IngredientRecord {
    pub id: i64,
    pub name: String,
    pub name_normalized: String,
    pub category: String,
    pub unit: String,
    pub is_seasonal: bool,
    pub seasonal_months: Option<String>,
    pub supply_stability: String,
    pub origin: Option<String>,
    pub storage_method: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input for creating an ingredient
#[derive(Debug, Clone)]
pub struct CreateIngredient {
    pub name: String,
    pub category: IngredientCategory,
    pub unit: IngredientUnit,
    pub is_seasonal: bool,
    pub seasonal_months: Option<String>,
    pub supply_stability: SupplyStability,
    pub origin: Option<String>,
    pub storage_method: Option<String>,
}

/// Directed substitution edge between two ingredients
///
/// Asymmetric by design: a bidirectional substitution is two rows.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SubstituteRecord {
    pub id: i64,
    pub ingredient_id: i64,
    pub substitute_ingredient_id: i64,
    pub substitution_ratio: Decimal,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Nutrition profile record (exactly one per ingredient)
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct NutritionInfoRecord {
    pub id: i64,
    pub ingredient_id: i64,
    pub serving_size_g: Decimal,
    pub calories_kcal: Decimal,
    pub carbohydrate_g: Decimal,
    pub protein_g: Decimal,
    pub fat_g: Decimal,
    pub sodium_mg: Decimal,
    pub sugar_g: Option<Decimal>,
    pub saturated_fat_g: Option<Decimal>,
    pub cholesterol_mg: Option<Decimal>,
    pub dietary_fiber_g: Option<Decimal>,
    pub calcium_mg: Option<Decimal>,
    pub iron_mg: Option<Decimal>,
    pub vitamin_a_ug: Option<Decimal>,
    pub vitamin_c_mg: Option<Decimal>,
    pub data_source: Option<String>,
    pub updated_at: NaiveDateTime,
}

/// Input for writing a nutrition profile
#[derive(Debug, Clone)]
pub struct UpsertNutritionInfo {
    pub serving_size_g: Decimal,
    pub calories_kcal: Decimal,
    pub carbohydrate_g: Decimal,
    pub protein_g: Decimal,
    pub fat_g: Decimal,
    pub sodium_mg: Decimal,
    pub sugar_g: Option<Decimal>,
    pub saturated_fat_g: Option<Decimal>,
    pub cholesterol_mg: Option<Decimal>,
    pub dietary_fiber_g: Option<Decimal>,
    pub calcium_mg: Option<Decimal>,
    pub iron_mg: Option<Decimal>,
    pub vitamin_a_ug: Option<Decimal>,
    pub vitamin_c_mg: Option<Decimal>,
    pub data_source: Option<String>,
}

/// An allergen tag on an ingredient, joined with the allergen row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct IngredientAllergenView {
    pub allergen_id: i64,
    pub allergen_name: String,
    pub severity: String,
    pub contamination_level: String,
    pub notes: Option<String>,
}

const INGREDIENT_COLUMNS: &str = "id, name, name_normalized, category, unit, is_seasonal, \
                                  seasonal_months, supply_stability, origin, storage_method, \
                                  created_at, updated_at";

const NUTRITION_COLUMNS: &str = "id, ingredient_id, serving_size_g, calories_kcal, carbohydrate_g, \
                                 protein_g, fat_g, sodium_mg, sugar_g, saturated_fat_g, \
                                 cholesterol_mg, dietary_fiber_g, calcium_mg, iron_mg, \
                                 vitamin_a_ug, vitamin_c_mg, data_source, updated_at";

/// Ingredient repository
pub struct IngredientRepository;

impl IngredientRepository {
    /// Create an ingredient; the name is globally unique and a
    /// normalized form is derived for fuzzy lookup
    pub async fn create(db: &PgPool, input: CreateIngredient) -> ApiResult<IngredientRecord> {
        let normalized = validation::normalize_ingredient_name(&input.name);

        let ingredient = sqlx::query_as::<_, IngredientRecord>(&format!(
            r#"
            INSERT INTO ingredients
                (name, name_normalized, category, unit, is_seasonal, seasonal_months,
                 supply_stability, origin, storage_method)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {INGREDIENT_COLUMNS}
            "#,
        ))
        .bind(&input.name)
        .bind(&normalized)
        .bind(input.category.as_str())
        .bind(input.unit.as_str())
        .bind(input.is_seasonal)
        .bind(&input.seasonal_months)
        .bind(input.supply_stability.as_str())
        .bind(&input.origin)
        .bind(&input.storage_method)
        .fetch_one(db)
        .await?;

        Ok(ingredient)
    }

    /// Find ingredient by ID
    pub async fn find_by_id(db: &PgPool, id: i64) -> ApiResult<Option<IngredientRecord>> {
        let ingredient = sqlx::query_as::<_, IngredientRecord>(&format!(
            "SELECT {INGREDIENT_COLUMNS} FROM ingredients WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;

        Ok(ingredient)
    }

    /// Find ingredient by its exact (unique) name
    pub async fn find_by_name(db: &PgPool, name: &str) -> ApiResult<Option<IngredientRecord>> {
        let ingredient = sqlx::query_as::<_, IngredientRecord>(&format!(
            "SELECT {INGREDIENT_COLUMNS} FROM ingredients WHERE name = $1",
        ))
        .bind(name)
        .fetch_optional(db)
        .await?;

        Ok(ingredient)
    }

    /// Fuzzy lookup over the normalized-name index
    pub async fn search_normalized(
        db: &PgPool,
        query: &str,
        limit: i64,
    ) -> ApiResult<Vec<IngredientRecord>> {
        let normalized = validation::normalize_ingredient_name(query);

        let ingredients = sqlx::query_as::<_, IngredientRecord>(&format!(
            r#"
            SELECT {INGREDIENT_COLUMNS} FROM ingredients
            WHERE name_normalized LIKE $1
            ORDER BY name ASC
            LIMIT $2
            "#,
        ))
        .bind(format!("%{normalized}%"))
        .bind(limit)
        .fetch_all(db)
        .await?;

        Ok(ingredients)
    }

    /// Add a directed substitution edge; unique per ordered pair
    pub async fn add_substitute(
        db: &PgPool,
        ingredient_id: i64,
        substitute_ingredient_id: i64,
        ratio: Decimal,
        notes: Option<String>,
    ) -> ApiResult<SubstituteRecord> {
        validation::validate_positive_quantity(ratio).map_err(ApiError::Validation)?;

        let record = sqlx::query_as::<_, SubstituteRecord>(
            r#"
            INSERT INTO ingredient_substitutes
                (ingredient_id, substitute_ingredient_id, substitution_ratio, notes)
            VALUES ($1, $2, $3, $4)
            RETURNING id, ingredient_id, substitute_ingredient_id, substitution_ratio, notes,
                      created_at
            "#,
        )
        .bind(ingredient_id)
        .bind(substitute_ingredient_id)
        .bind(ratio)
        .bind(&notes)
        .fetch_one(db)
        .await?;

        Ok(record)
    }

    /// Outgoing substitution edges for an ingredient
    pub async fn list_substitutes(
        db: &PgPool,
        ingredient_id: i64,
    ) -> ApiResult<Vec<SubstituteRecord>> {
        let records = sqlx::query_as::<_, SubstituteRecord>(
            r#"
            SELECT id, ingredient_id, substitute_ingredient_id, substitution_ratio, notes,
                   created_at
            FROM ingredient_substitutes
            WHERE ingredient_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(ingredient_id)
        .fetch_all(db)
        .await?;

        Ok(records)
    }

    /// Write the nutrition profile for an ingredient
    ///
    /// The unique FK makes this 1:1; a repeated write replaces the
    /// existing profile instead of violating uniqueness.
    pub async fn upsert_nutrition(
        db: &PgPool,
        ingredient_id: i64,
        input: UpsertNutritionInfo,
    ) -> ApiResult<NutritionInfoRecord> {
        validation::validate_positive_quantity(input.serving_size_g)
            .map_err(ApiError::Validation)?;

        let record = sqlx::query_as::<_, NutritionInfoRecord>(&format!(
            r#"
            INSERT INTO nutrition_info
                (ingredient_id, serving_size_g, calories_kcal, carbohydrate_g, protein_g, fat_g,
                 sodium_mg, sugar_g, saturated_fat_g, cholesterol_mg, dietary_fiber_g, calcium_mg,
                 iron_mg, vitamin_a_ug, vitamin_c_mg, data_source)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            ON CONFLICT (ingredient_id) DO UPDATE SET
                serving_size_g = EXCLUDED.serving_size_g,
                calories_kcal = EXCLUDED.calories_kcal,
                carbohydrate_g = EXCLUDED.carbohydrate_g,
                protein_g = EXCLUDED.protein_g,
                fat_g = EXCLUDED.fat_g,
                sodium_mg = EXCLUDED.sodium_mg,
                sugar_g = EXCLUDED.sugar_g,
                saturated_fat_g = EXCLUDED.saturated_fat_g,
                cholesterol_mg = EXCLUDED.cholesterol_mg,
                dietary_fiber_g = EXCLUDED.dietary_fiber_g,
                calcium_mg = EXCLUDED.calcium_mg,
                iron_mg = EXCLUDED.iron_mg,
                vitamin_a_ug = EXCLUDED.vitamin_a_ug,
                vitamin_c_mg = EXCLUDED.vitamin_c_mg,
                data_source = EXCLUDED.data_source,
                updated_at = now()
            RETURNING {NUTRITION_COLUMNS}
            "#,
        ))
        .bind(ingredient_id)
        .bind(input.serving_size_g)
        .bind(input.calories_kcal)
        .bind(input.carbohydrate_g)
        .bind(input.protein_g)
        .bind(input.fat_g)
        .bind(input.sodium_mg)
        .bind(input.sugar_g)
        .bind(input.saturated_fat_g)
        .bind(input.cholesterol_mg)
        .bind(input.dietary_fiber_g)
        .bind(input.calcium_mg)
        .bind(input.iron_mg)
        .bind(input.vitamin_a_ug)
        .bind(input.vitamin_c_mg)
        .bind(&input.data_source)
        .fetch_one(db)
        .await?;

        Ok(record)
    }

    /// Insert a nutrition profile, failing if one already exists
    ///
    /// Exposes the 1:1 uniqueness law directly: a second insert surfaces
    /// a unique violation instead of replacing the row.
    pub async fn insert_nutrition(
        db: &PgPool,
        ingredient_id: i64,
        input: UpsertNutritionInfo,
    ) -> ApiResult<NutritionInfoRecord> {
        validation::validate_positive_quantity(input.serving_size_g)
            .map_err(ApiError::Validation)?;

        let record = sqlx::query_as::<_, NutritionInfoRecord>(&format!(
            r#"
            INSERT INTO nutrition_info
                (ingredient_id, serving_size_g, calories_kcal, carbohydrate_g, protein_g, fat_g,
                 sodium_mg, sugar_g, saturated_fat_g, cholesterol_mg, dietary_fiber_g, calcium_mg,
                 iron_mg, vitamin_a_ug, vitamin_c_mg, data_source)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING {NUTRITION_COLUMNS}
            "#,
        ))
        .bind(ingredient_id)
        .bind(input.serving_size_g)
        .bind(input.calories_kcal)
        .bind(input.carbohydrate_g)
        .bind(input.protein_g)
        .bind(input.fat_g)
        .bind(input.sodium_mg)
        .bind(input.sugar_g)
        .bind(input.saturated_fat_g)
        .bind(input.cholesterol_mg)
        .bind(input.dietary_fiber_g)
        .bind(input.calcium_mg)
        .bind(input.iron_mg)
        .bind(input.vitamin_a_ug)
        .bind(input.vitamin_c_mg)
        .bind(&input.data_source)
        .fetch_one(db)
        .await?;

        Ok(record)
    }

    /// Fetch the nutrition profile for an ingredient
    pub async fn get_nutrition(
        db: &PgPool,
        ingredient_id: i64,
    ) -> ApiResult<Option<NutritionInfoRecord>> {
        let record = sqlx::query_as::<_, NutritionInfoRecord>(&format!(
            "SELECT {NUTRITION_COLUMNS} FROM nutrition_info WHERE ingredient_id = $1",
        ))
        .bind(ingredient_id)
        .fetch_optional(db)
        .await?;

        Ok(record)
    }

    /// Tag an ingredient with an allergen; unique per (ingredient, allergen)
    pub async fn tag_allergen(
        db: &PgPool,
        ingredient_id: i64,
        allergen_id: i64,
        level: ContaminationLevel,
        notes: Option<String>,
    ) -> ApiResult<i64> {
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO ingredient_allergens (ingredient_id, allergen_id, contamination_level, notes)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(ingredient_id)
        .bind(allergen_id)
        .bind(level.as_str())
        .bind(&notes)
        .fetch_one(db)
        .await?;

        Ok(id)
    }

    /// Allergens tagged on an ingredient, joined with severity
    pub async fn list_allergens(
        db: &PgPool,
        ingredient_id: i64,
    ) -> ApiResult<Vec<IngredientAllergenView>> {
        let tags = sqlx::query_as::<_, IngredientAllergenView>(
            r#"
            SELECT a.id AS allergen_id, a.name AS allergen_name, a.severity,
                   ia.contamination_level, ia.notes
            FROM ingredient_allergens ia
            JOIN allergens a ON a.id = ia.allergen_id
            WHERE ia.ingredient_id = $1
            ORDER BY a.severity ASC, a.name ASC
            "#,
        )
        .bind(ingredient_id)
        .fetch_all(db)
        .await?;

        Ok(tags)
    }

    /// Delete an ingredient (substitutes, allergen tags, supplier items
    /// and the nutrition profile go with it)
    pub async fn delete(db: &PgPool, id: i64) -> ApiResult<bool> {
        let result = sqlx::query("DELETE FROM ingredients WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
