//! Data access layer
//!
//! Each repository owns the SQL for one cluster of tables. Functions take
//! the pool (or any executor where a caller needs to compose writes into
//! its own transaction) and surface constraint failures through
//! [`crate::error::ApiError`].

pub mod allergens;
pub mod analytics;
pub mod ingredients;
pub mod meal_plans;
pub mod suppliers;
pub mod users;

pub use allergens::AllergenRepository;
pub use analytics::{ActivityLogRepository, FavoriteRepository, KpiRepository};
pub use ingredients::IngredientRepository;
pub use meal_plans::{
    DailyMealRepository, HistoryRepository, MealItemRepository, MealPlanRepository,
};
pub use suppliers::SupplierRepository;
pub use users::UserRepository;
