//! Allergen reference-set repository
//!
//! The 21-entry MFDS mandatory-label list is seeded by migration; this
//! repository only reads it.

use crate::error::ApiResult;
use chrono::NaiveDateTime;
use menu_planner_shared::models::AllergenCategory;
use sqlx::PgPool;

/// Allergen record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AllergenRecord {
    pub id: i64,
    pub name: String,
    pub name_en: Option<String>,
    pub category: String,
    pub severity: String,
    pub description: Option<String>,
    pub is_mandatory_label: bool,
    pub created_at: NaiveDateTime,
}

const ALLERGEN_COLUMNS: &str =
    "id, name, name_en, category, severity, description, is_mandatory_label, created_at";

/// Allergen repository
pub struct AllergenRepository;

impl AllergenRepository {
    /// List the full reference set
    pub async fn list(db: &PgPool) -> ApiResult<Vec<AllergenRecord>> {
        let allergens = sqlx::query_as::<_, AllergenRecord>(&format!(
            "SELECT {ALLERGEN_COLUMNS} FROM allergens ORDER BY severity ASC, name ASC",
        ))
        .fetch_all(db)
        .await?;

        Ok(allergens)
    }

    /// List by classification
    pub async fn list_by_category(
        db: &PgPool,
        category: AllergenCategory,
    ) -> ApiResult<Vec<AllergenRecord>> {
        let allergens = sqlx::query_as::<_, AllergenRecord>(&format!(
            "SELECT {ALLERGEN_COLUMNS} FROM allergens WHERE category = $1 ORDER BY name ASC",
        ))
        .bind(category.as_str())
        .fetch_all(db)
        .await?;

        Ok(allergens)
    }

    /// Find by the unique Korean name
    pub async fn find_by_name(db: &PgPool, name: &str) -> ApiResult<Option<AllergenRecord>> {
        let allergen = sqlx::query_as::<_, AllergenRecord>(&format!(
            "SELECT {ALLERGEN_COLUMNS} FROM allergens WHERE name = $1",
        ))
        .bind(name)
        .fetch_optional(db)
        .await?;

        Ok(allergen)
    }

    /// Count of seeded mandatory-label entries (seed contract: 21)
    pub async fn count_mandatory(db: &PgPool) -> ApiResult<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM allergens WHERE is_mandatory_label = TRUE")
                .fetch_one(db)
                .await?;

        Ok(count)
    }
}
