//! Closed domain enumerations for the menu planner data layer
//!
//! Every string-valued CHECK domain in the schema has a matching tagged
//! enum here. Serialization preserves the exact store strings, so a value
//! written through these types always passes the corresponding constraint.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a store string does not belong to its closed domain.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("'{value}' is not a valid {domain}")]
pub struct ParseDomainError {
    pub domain: &'static str,
    pub value: String,
}

impl ParseDomainError {
    fn new(domain: &'static str, value: &str) -> Self {
        Self {
            domain,
            value: value.to_string(),
        }
    }
}

/// Meal plan lifecycle status
///
/// Monotonic in practice (draft → confirmed → published); the store only
/// enforces the allowed-value check, not the transition order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlanStatus {
    #[default]
    Draft,
    Confirmed,
    Published,
}

impl PlanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanStatus::Draft => "draft",
            PlanStatus::Confirmed => "confirmed",
            PlanStatus::Published => "published",
        }
    }
}

impl FromStr for PlanStatus {
    type Err = ParseDomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(PlanStatus::Draft),
            "confirmed" => Ok(PlanStatus::Confirmed),
            "published" => Ok(PlanStatus::Published),
            other => Err(ParseDomainError::new("plan status", other)),
        }
    }
}

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dish category within a daily meal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealCategory {
    Rice,
    Soup,
    SideDish,
    Dessert,
}

impl MealCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            MealCategory::Rice => "rice",
            MealCategory::Soup => "soup",
            MealCategory::SideDish => "side_dish",
            MealCategory::Dessert => "dessert",
        }
    }
}

impl FromStr for MealCategory {
    type Err = ParseDomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rice" => Ok(MealCategory::Rice),
            "soup" => Ok(MealCategory::Soup),
            "side_dish" => Ok(MealCategory::SideDish),
            "dessert" => Ok(MealCategory::Dessert),
            other => Err(ParseDomainError::new("meal category", other)),
        }
    }
}

impl fmt::Display for MealCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ingredient category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngredientCategory {
    Vegetable,
    Meat,
    Seafood,
    Grain,
    Dairy,
    Seasoning,
    Processed,
    Other,
}

impl IngredientCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            IngredientCategory::Vegetable => "vegetable",
            IngredientCategory::Meat => "meat",
            IngredientCategory::Seafood => "seafood",
            IngredientCategory::Grain => "grain",
            IngredientCategory::Dairy => "dairy",
            IngredientCategory::Seasoning => "seasoning",
            IngredientCategory::Processed => "processed",
            IngredientCategory::Other => "other",
        }
    }
}

impl FromStr for IngredientCategory {
    type Err = ParseDomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vegetable" => Ok(IngredientCategory::Vegetable),
            "meat" => Ok(IngredientCategory::Meat),
            "seafood" => Ok(IngredientCategory::Seafood),
            "grain" => Ok(IngredientCategory::Grain),
            "dairy" => Ok(IngredientCategory::Dairy),
            "seasoning" => Ok(IngredientCategory::Seasoning),
            "processed" => Ok(IngredientCategory::Processed),
            "other" => Ok(IngredientCategory::Other),
            other => Err(ParseDomainError::new("ingredient category", other)),
        }
    }
}

impl fmt::Display for IngredientCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Measurement unit for ingredient quantities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngredientUnit {
    G,
    Kg,
    Ml,
    L,
    Ea,
}

impl IngredientUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            IngredientUnit::G => "g",
            IngredientUnit::Kg => "kg",
            IngredientUnit::Ml => "ml",
            IngredientUnit::L => "l",
            IngredientUnit::Ea => "ea",
        }
    }
}

impl FromStr for IngredientUnit {
    type Err = ParseDomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "g" => Ok(IngredientUnit::G),
            "kg" => Ok(IngredientUnit::Kg),
            "ml" => Ok(IngredientUnit::Ml),
            "l" => Ok(IngredientUnit::L),
            "ea" => Ok(IngredientUnit::Ea),
            other => Err(ParseDomainError::new("ingredient unit", other)),
        }
    }
}

impl fmt::Display for IngredientUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Supply stability of an ingredient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SupplyStability {
    #[default]
    Stable,
    Unstable,
    Seasonal,
}

impl SupplyStability {
    pub fn as_str(&self) -> &'static str {
        match self {
            SupplyStability::Stable => "stable",
            SupplyStability::Unstable => "unstable",
            SupplyStability::Seasonal => "seasonal",
        }
    }
}

impl FromStr for SupplyStability {
    type Err = ParseDomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stable" => Ok(SupplyStability::Stable),
            "unstable" => Ok(SupplyStability::Unstable),
            "seasonal" => Ok(SupplyStability::Seasonal),
            other => Err(ParseDomainError::new("supply stability", other)),
        }
    }
}

impl fmt::Display for SupplyStability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Availability of a supplier catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityStatus {
    #[default]
    Available,
    OutOfStock,
    Discontinued,
}

impl AvailabilityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AvailabilityStatus::Available => "available",
            AvailabilityStatus::OutOfStock => "out_of_stock",
            AvailabilityStatus::Discontinued => "discontinued",
        }
    }
}

impl FromStr for AvailabilityStatus {
    type Err = ParseDomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(AvailabilityStatus::Available),
            "out_of_stock" => Ok(AvailabilityStatus::OutOfStock),
            "discontinued" => Ok(AvailabilityStatus::Discontinued),
            other => Err(ParseDomainError::new("availability status", other)),
        }
    }
}

impl fmt::Display for AvailabilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Allergen classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllergenCategory {
    FoodAllergy,
    Religious,
    Cultural,
}

impl AllergenCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            AllergenCategory::FoodAllergy => "food_allergy",
            AllergenCategory::Religious => "religious",
            AllergenCategory::Cultural => "cultural",
        }
    }
}

impl FromStr for AllergenCategory {
    type Err = ParseDomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "food_allergy" => Ok(AllergenCategory::FoodAllergy),
            "religious" => Ok(AllergenCategory::Religious),
            "cultural" => Ok(AllergenCategory::Cultural),
            other => Err(ParseDomainError::new("allergen category", other)),
        }
    }
}

impl fmt::Display for AllergenCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Allergen severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllergenSeverity {
    High,
    Medium,
    Low,
}

impl AllergenSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AllergenSeverity::High => "high",
            AllergenSeverity::Medium => "medium",
            AllergenSeverity::Low => "low",
        }
    }
}

impl FromStr for AllergenSeverity {
    type Err = ParseDomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" => Ok(AllergenSeverity::High),
            "medium" => Ok(AllergenSeverity::Medium),
            "low" => Ok(AllergenSeverity::Low),
            other => Err(ParseDomainError::new("allergen severity", other)),
        }
    }
}

impl fmt::Display for AllergenSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How strongly an ingredient carries an allergen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContaminationLevel {
    Contains,
    MayContain,
    Traces,
}

impl ContaminationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContaminationLevel::Contains => "contains",
            ContaminationLevel::MayContain => "may_contain",
            ContaminationLevel::Traces => "traces",
        }
    }
}

impl FromStr for ContaminationLevel {
    type Err = ParseDomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "contains" => Ok(ContaminationLevel::Contains),
            "may_contain" => Ok(ContaminationLevel::MayContain),
            "traces" => Ok(ContaminationLevel::Traces),
            other => Err(ParseDomainError::new("contamination level", other)),
        }
    }
}

impl fmt::Display for ContaminationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audit trail action recorded in meal_plan_history
///
/// Stored as free text (the history table carries no CHECK on action_type);
/// writers going through the repository layer use this closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    Create,
    Update,
    Delete,
    Confirm,
    Publish,
}

impl HistoryAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryAction::Create => "create",
            HistoryAction::Update => "update",
            HistoryAction::Delete => "delete",
            HistoryAction::Confirm => "confirm",
            HistoryAction::Publish => "publish",
        }
    }
}

impl fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User activity kinds for the telemetry log (free text in the store)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    Login,
    Logout,
    PlanCreated,
    PlanEdited,
    PlanConfirmed,
    PlanPublished,
}

impl ActivityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::Login => "login",
            ActivityType::Logout => "logout",
            ActivityType::PlanCreated => "plan_created",
            ActivityType::PlanEdited => "plan_edited",
            ActivityType::PlanConfirmed => "plan_confirmed",
            ActivityType::PlanPublished => "plan_published",
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a meal plan was built from earlier work (free text in the store)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReuseType {
    FullPlan,
    SingleDay,
    SingleItem,
}

impl ReuseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReuseType::FullPlan => "full_plan",
            ReuseType::SingleDay => "single_day",
            ReuseType::SingleItem => "single_item",
        }
    }
}

impl fmt::Display for ReuseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
