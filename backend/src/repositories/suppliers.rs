//! Supplier repository - vendors and their priced ingredient catalogs

use crate::error::{ApiError, ApiResult};
use chrono::NaiveDateTime;
use menu_planner_shared::models::AvailabilityStatus;
use menu_planner_shared::validation;
use rust_decimal::Decimal;
use sqlx::PgPool;

/// Supplier record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SupplierRecord {
    pub id: i64,
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub business_number: Option<String>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input for creating a supplier
#[derive(Debug, Clone, Default)]
pub struct CreateSupplier {
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub business_number: Option<String>,
}

/// Catalog entry: one ingredient priced by one supplier
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SupplierItemRecord {
    pub id: i64,
    pub supplier_id: i64,
    pub ingredient_id: i64,
    pub price_per_unit: Decimal,
    pub unit_size: Decimal,
    pub availability_status: String,
    pub min_order_quantity: Option<Decimal>,
    pub delivery_days: Option<i32>,
    pub updated_at: NaiveDateTime,
}

/// Input for writing a catalog entry
#[derive(Debug, Clone)]
pub struct UpsertSupplierItem {
    pub ingredient_id: i64,
    pub price_per_unit: Decimal,
    pub unit_size: Decimal,
    pub availability_status: AvailabilityStatus,
    pub min_order_quantity: Option<Decimal>,
    pub delivery_days: Option<i32>,
}

const SUPPLIER_COLUMNS: &str = "id, name, contact_person, phone, email, address, business_number, \
                                is_active, created_at, updated_at";

const ITEM_COLUMNS: &str = "id, supplier_id, ingredient_id, price_per_unit, unit_size, \
                            availability_status, min_order_quantity, delivery_days, updated_at";

/// Supplier repository
pub struct SupplierRepository;

impl SupplierRepository {
    /// Create a supplier
    pub async fn create(db: &PgPool, input: CreateSupplier) -> ApiResult<SupplierRecord> {
        let supplier = sqlx::query_as::<_, SupplierRecord>(&format!(
            r#"
            INSERT INTO suppliers (name, contact_person, phone, email, address, business_number)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {SUPPLIER_COLUMNS}
            "#,
        ))
        .bind(&input.name)
        .bind(&input.contact_person)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.address)
        .bind(&input.business_number)
        .fetch_one(db)
        .await?;

        Ok(supplier)
    }

    /// Find supplier by ID
    pub async fn find_by_id(db: &PgPool, id: i64) -> ApiResult<Option<SupplierRecord>> {
        let supplier = sqlx::query_as::<_, SupplierRecord>(&format!(
            "SELECT {SUPPLIER_COLUMNS} FROM suppliers WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;

        Ok(supplier)
    }

    /// List active suppliers
    pub async fn list_active(db: &PgPool) -> ApiResult<Vec<SupplierRecord>> {
        let suppliers = sqlx::query_as::<_, SupplierRecord>(&format!(
            "SELECT {SUPPLIER_COLUMNS} FROM suppliers WHERE is_active = TRUE ORDER BY name ASC",
        ))
        .fetch_all(db)
        .await?;

        Ok(suppliers)
    }

    /// Deactivate a supplier without touching its catalog
    pub async fn deactivate(db: &PgPool, id: i64) -> ApiResult<bool> {
        let result =
            sqlx::query("UPDATE suppliers SET is_active = FALSE, updated_at = now() WHERE id = $1")
                .bind(id)
                .execute(db)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Write a catalog entry; unique per (supplier, ingredient), so a
    /// repeated write refreshes price and availability
    pub async fn upsert_catalog_item(
        db: &PgPool,
        supplier_id: i64,
        input: UpsertSupplierItem,
    ) -> ApiResult<SupplierItemRecord> {
        validation::validate_non_negative_amount(input.price_per_unit)
            .map_err(ApiError::Validation)?;
        validation::validate_positive_quantity(input.unit_size).map_err(ApiError::Validation)?;

        let item = sqlx::query_as::<_, SupplierItemRecord>(&format!(
            r#"
            INSERT INTO supplier_items
                (supplier_id, ingredient_id, price_per_unit, unit_size, availability_status,
                 min_order_quantity, delivery_days)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (supplier_id, ingredient_id) DO UPDATE SET
                price_per_unit = EXCLUDED.price_per_unit,
                unit_size = EXCLUDED.unit_size,
                availability_status = EXCLUDED.availability_status,
                min_order_quantity = EXCLUDED.min_order_quantity,
                delivery_days = EXCLUDED.delivery_days,
                updated_at = now()
            RETURNING {ITEM_COLUMNS}
            "#,
        ))
        .bind(supplier_id)
        .bind(input.ingredient_id)
        .bind(input.price_per_unit)
        .bind(input.unit_size)
        .bind(input.availability_status.as_str())
        .bind(input.min_order_quantity)
        .bind(input.delivery_days)
        .fetch_one(db)
        .await?;

        Ok(item)
    }

    /// A supplier's catalog
    pub async fn list_catalog(db: &PgPool, supplier_id: i64) -> ApiResult<Vec<SupplierItemRecord>> {
        let items = sqlx::query_as::<_, SupplierItemRecord>(&format!(
            "SELECT {ITEM_COLUMNS} FROM supplier_items WHERE supplier_id = $1 ORDER BY id ASC",
        ))
        .bind(supplier_id)
        .fetch_all(db)
        .await?;

        Ok(items)
    }

    /// All available offers for an ingredient across suppliers
    pub async fn list_offers_for_ingredient(
        db: &PgPool,
        ingredient_id: i64,
    ) -> ApiResult<Vec<SupplierItemRecord>> {
        let items = sqlx::query_as::<_, SupplierItemRecord>(&format!(
            r#"
            SELECT {ITEM_COLUMNS} FROM supplier_items
            WHERE ingredient_id = $1 AND availability_status = 'available'
            ORDER BY price_per_unit ASC
            "#,
        ))
        .bind(ingredient_id)
        .fetch_all(db)
        .await?;

        Ok(items)
    }
}
