//! Integration tests for the relational schema's integrity rules
//!
//! These tests exercise the referential-integrity contract end to end
//! against a real PostgreSQL database: unique natural keys, check
//! constraints, cascade and set-null edges, the 1:1 nutrition profile,
//! and the seeded allergen reference set.

mod common;

use chrono::NaiveDate;
use menu_planner_backend::error::{ApiError, ViolationKind};
use menu_planner_backend::repositories::allergens::AllergenRepository;
use menu_planner_backend::repositories::ingredients::{
    CreateIngredient, IngredientRepository, UpsertNutritionInfo,
};
use menu_planner_backend::repositories::meal_plans::{
    CreateDailyMeal, CreateMealItem, CreateMealPlan, DailyMealRepository, HistoryRepository,
    ItemIngredientInput, MealItemRepository, MealPlanRepository, RecordHistory,
};
use menu_planner_shared::models::{
    HistoryAction, IngredientCategory, IngredientUnit, MealCategory, PlanStatus, SupplyStability,
};
use rust_decimal::Decimal;

fn plan_input(user_id: i64, year: i32, month: i32) -> CreateMealPlan {
    CreateMealPlan {
        user_id,
        year,
        month,
        name: format!("{year}-{month:02} plan"),
        target_count: 50,
        budget_per_person: Some(Decimal::new(4500, 0)),
        total_budget: None,
        notes: None,
    }
}

fn ingredient_input(name: &str) -> CreateIngredient {
    CreateIngredient {
        name: name.to_string(),
        category: IngredientCategory::Vegetable,
        unit: IngredientUnit::G,
        is_seasonal: false,
        seasonal_months: None,
        supply_stability: SupplyStability::Stable,
        origin: Some("국내산".to_string()),
        storage_method: None,
    }
}

fn nutrition_input() -> UpsertNutritionInfo {
    UpsertNutritionInfo {
        serving_size_g: Decimal::new(100, 0),
        calories_kcal: Decimal::new(77, 0),
        carbohydrate_g: Decimal::new(175, 1),
        protein_g: Decimal::new(20, 1),
        fat_g: Decimal::new(1, 1),
        sodium_mg: Decimal::new(6, 0),
        sugar_g: None,
        saturated_fat_g: None,
        cholesterol_mg: None,
        dietary_fiber_g: None,
        calcium_mg: None,
        iron_mg: None,
        vitamin_a_ug: None,
        vitamin_c_mg: None,
        data_source: Some("MFDS".to_string()),
    }
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_duplicate_plan_for_month_is_unique_violation() {
    let app = common::TestApp::new().await;
    let user = app.create_test_user().await;

    MealPlanRepository::create(&app.pool, plan_input(user.id, 2026, 3))
        .await
        .expect("first plan for the month must succeed");

    let err = MealPlanRepository::create(&app.pool, plan_input(user.id, 2026, 3))
        .await
        .expect_err("second plan for the same (user, year, month) must fail");

    match err {
        ApiError::Integrity { kind, constraint } => {
            assert_eq!(kind, ViolationKind::Unique);
            assert_eq!(constraint.as_deref(), Some("uq_meal_plans_user_year_month"));
        }
        other => panic!("expected unique violation, got {other:?}"),
    }
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_month_out_of_range_rejected_before_write() {
    let app = common::TestApp::new().await;
    let user = app.create_test_user().await;

    let err = MealPlanRepository::create(&app.pool, plan_input(user.id, 2026, 13))
        .await
        .expect_err("month 13 must be rejected");
    assert!(matches!(err, ApiError::Validation(_)));

    let err = MealPlanRepository::create(&app.pool, plan_input(user.id, 1999, 3))
        .await
        .expect_err("year outside the planning range must be rejected");
    assert!(matches!(err, ApiError::Validation(_)));

    // Boundary value passes validation and the check constraint
    let plan = MealPlanRepository::create(&app.pool, plan_input(user.id, 2026, 12))
        .await
        .expect("month 12 is valid");
    assert_eq!(plan.month, 12);
    assert_eq!(plan.plan_status().unwrap(), PlanStatus::Draft);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_malformed_email_rejected_before_write() {
    let app = common::TestApp::new().await;

    let err = menu_planner_backend::repositories::users::UserRepository::create(
        &app.pool,
        menu_planner_backend::repositories::users::CreateUser {
            email: "planner school.kr".to_string(),
            password_hash: "$argon2id$test-hash".to_string(),
            name: "Test Nutritionist".to_string(),
            organization: None,
            phone: None,
        },
    )
    .await
    .expect_err("malformed email must be rejected");
    assert!(matches!(err, ApiError::Validation(_)));
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_daily_meal_requires_existing_plan() {
    let app = common::TestApp::new().await;

    let err = DailyMealRepository::create(
        &app.pool,
        CreateDailyMeal {
            meal_plan_id: i64::MAX,
            date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            is_holiday: false,
            holiday_name: None,
            notes: None,
        },
    )
    .await
    .expect_err("orphan daily meal must be rejected");

    match err {
        ApiError::Integrity { kind, .. } => assert_eq!(kind, ViolationKind::ForeignKey),
        other => panic!("expected foreign key violation, got {other:?}"),
    }
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_meal_item_category_check_enforced_in_store() {
    let app = common::TestApp::new().await;
    let user = app.create_test_user().await;
    let plan = MealPlanRepository::create(&app.pool, plan_input(user.id, 2026, 4))
        .await
        .unwrap();
    let day = DailyMealRepository::create(
        &app.pool,
        CreateDailyMeal {
            meal_plan_id: plan.id,
            date: NaiveDate::from_ymd_opt(2026, 4, 6).unwrap(),
            is_holiday: false,
            holiday_name: None,
            notes: None,
        },
    )
    .await
    .unwrap();

    // The closed enum makes this unrepresentable through the repository;
    // a raw write with a value outside the check list still fails in the store.
    let err: ApiError = sqlx::query(
        "INSERT INTO meal_items (daily_meal_id, category, name, serving_size_g)
         VALUES ($1, 'entree', '스테이크', 250)",
    )
    .bind(day.id)
    .execute(&app.pool)
    .await
    .expect_err("category outside the closed set must fail")
    .into();

    match err {
        ApiError::Integrity { kind, constraint } => {
            assert_eq!(kind, ViolationKind::Check);
            assert_eq!(constraint.as_deref(), Some("ck_meal_items_category"));
        }
        other => panic!("expected check violation, got {other:?}"),
    }

    // The same write through the repository with a valid category succeeds
    let item = MealItemRepository::create(
        &app.pool,
        CreateMealItem {
            daily_meal_id: day.id,
            category: MealCategory::Soup,
            name: "된장국".to_string(),
            serving_size_g: Decimal::new(250, 0),
            price_per_person: None,
            calories: None,
            cooking_method: None,
            display_order: 0,
        },
    )
    .await
    .expect("valid category must succeed");
    assert_eq!(item.category, "soup");
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_nutrition_profile_is_one_to_one() {
    let app = common::TestApp::new().await;
    let seq = std::process::id();
    let ingredient =
        IngredientRepository::create(&app.pool, ingredient_input(&format!("양파-{seq}")))
            .await
            .unwrap();

    IngredientRepository::insert_nutrition(&app.pool, ingredient.id, nutrition_input())
        .await
        .expect("first profile must succeed");

    let err = IngredientRepository::insert_nutrition(&app.pool, ingredient.id, nutrition_input())
        .await
        .expect_err("second profile for the same ingredient must fail");

    match err {
        ApiError::Integrity { kind, constraint } => {
            assert_eq!(kind, ViolationKind::Unique);
            assert_eq!(constraint.as_deref(), Some("uq_nutrition_info_ingredient"));
        }
        other => panic!("expected unique violation, got {other:?}"),
    }

    // The upsert form replaces instead of failing
    let mut replacement = nutrition_input();
    replacement.calories_kcal = Decimal::new(80, 0);
    let updated = IngredientRepository::upsert_nutrition(&app.pool, ingredient.id, replacement)
        .await
        .expect("upsert must replace the existing profile");
    assert_eq!(updated.calories_kcal, Decimal::new(80, 0));

    IngredientRepository::delete(&app.pool, ingredient.id)
        .await
        .unwrap();
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_user_delete_cascades_through_plan_tree() {
    let app = common::TestApp::new().await;
    let user = app.create_test_user().await;
    let plan = MealPlanRepository::create(&app.pool, plan_input(user.id, 2026, 5))
        .await
        .unwrap();
    let day = DailyMealRepository::create(
        &app.pool,
        CreateDailyMeal {
            meal_plan_id: plan.id,
            date: NaiveDate::from_ymd_opt(2026, 5, 4).unwrap(),
            is_holiday: false,
            holiday_name: None,
            notes: None,
        },
    )
    .await
    .unwrap();
    let item = MealItemRepository::create(
        &app.pool,
        CreateMealItem {
            daily_meal_id: day.id,
            category: MealCategory::Rice,
            name: "현미밥".to_string(),
            serving_size_g: Decimal::new(210, 0),
            price_per_person: None,
            calories: None,
            cooking_method: None,
            display_order: 0,
        },
    )
    .await
    .unwrap();

    let deleted = menu_planner_backend::repositories::users::UserRepository::delete(
        &app.pool, user.id,
    )
    .await
    .unwrap();
    assert!(deleted);

    // The whole tree is gone with its owner
    assert!(MealPlanRepository::find_by_id(&app.pool, plan.id)
        .await
        .unwrap()
        .is_none());
    assert!(DailyMealRepository::find_by_plan_date(
        &app.pool,
        plan.id,
        NaiveDate::from_ymd_opt(2026, 5, 4).unwrap()
    )
    .await
    .unwrap()
    .is_none());
    assert!(MealItemRepository::find_by_id(&app.pool, item.id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_item_delete_keeps_history_with_null_back_reference() {
    let app = common::TestApp::new().await;
    let user = app.create_test_user().await;
    let plan = MealPlanRepository::create(&app.pool, plan_input(user.id, 2026, 6))
        .await
        .unwrap();
    let day = DailyMealRepository::create(
        &app.pool,
        CreateDailyMeal {
            meal_plan_id: plan.id,
            date: NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
            is_holiday: false,
            holiday_name: None,
            notes: None,
        },
    )
    .await
    .unwrap();
    let item = MealItemRepository::create(
        &app.pool,
        CreateMealItem {
            daily_meal_id: day.id,
            category: MealCategory::SideDish,
            name: "시금치나물".to_string(),
            serving_size_g: Decimal::new(70, 0),
            price_per_person: None,
            calories: None,
            cooking_method: None,
            display_order: 1,
        },
    )
    .await
    .unwrap();

    HistoryRepository::record(
        &app.pool,
        RecordHistory {
            meal_plan_id: plan.id,
            meal_item_id: Some(item.id),
            user_id: user.id,
            action: HistoryAction::Create,
            before_value: None,
            after_value: Some(serde_json::json!({ "name": item.name })),
            reason: None,
        },
    )
    .await
    .unwrap();

    MealItemRepository::delete(&app.pool, item.id).await.unwrap();

    // The audit row survives the item; only the back-reference is nulled
    let history = HistoryRepository::list_for_plan(&app.pool, plan.id)
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].meal_item_id, None);
    assert_eq!(history[0].action_type, "create");
    assert!(history[0].after_value.is_some());
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_confirm_writes_status_and_history_atomically() {
    let app = common::TestApp::new().await;
    let user = app.create_test_user().await;
    let plan = MealPlanRepository::create(&app.pool, plan_input(user.id, 2026, 7))
        .await
        .unwrap();
    assert_eq!(plan.plan_status().unwrap(), PlanStatus::Draft);
    assert!(plan.confirmed_at.is_none());

    let confirmed =
        MealPlanRepository::confirm(&app.pool, plan.id, user.id, Some("검토 완료".to_string()))
            .await
            .unwrap();
    assert_eq!(confirmed.plan_status().unwrap(), PlanStatus::Confirmed);
    assert!(confirmed.confirmed_at.is_some());

    let published = MealPlanRepository::publish(&app.pool, plan.id, user.id, None)
        .await
        .unwrap();
    assert_eq!(published.plan_status().unwrap(), PlanStatus::Published);
    assert!(published.published_at.is_some());

    let history = HistoryRepository::list_for_plan(&app.pool, plan.id)
        .await
        .unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].action_type, "confirm");
    assert_eq!(history[1].action_type, "publish");
    assert_eq!(
        history[0].after_value,
        Some(serde_json::json!({ "status": "confirmed" }))
    );

    let err = MealPlanRepository::confirm(&app.pool, i64::MAX, user.id, None)
        .await
        .expect_err("confirming a missing plan must fail");
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_allergen_seed_is_idempotent() {
    let app = common::TestApp::new().await;

    let count = AllergenRepository::count_mandatory(&app.pool).await.unwrap();
    assert_eq!(count, 21);

    // Re-running the seed statement is a no-op, not a duplicate set
    sqlx::query(include_str!("../migrations/0002_seed_allergens.up.sql"))
        .execute(&app.pool)
        .await
        .expect("seed must be idempotent");

    let count = AllergenRepository::count_mandatory(&app.pool).await.unwrap();
    assert_eq!(count, 21);

    let peanut = AllergenRepository::find_by_name(&app.pool, "땅콩")
        .await
        .unwrap()
        .expect("seeded allergen must be present");
    assert_eq!(peanut.severity, "high");
    assert!(peanut.is_mandatory_label);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_full_month_planning_scenario() {
    let app = common::TestApp::new().await;
    let user = app.create_test_user().await;
    let seq = std::process::id();

    let plan = MealPlanRepository::create(&app.pool, plan_input(user.id, 2026, 9))
        .await
        .unwrap();

    let day = DailyMealRepository::create(
        &app.pool,
        CreateDailyMeal {
            meal_plan_id: plan.id,
            date: NaiveDate::from_ymd_opt(2026, 9, 7).unwrap(),
            is_holiday: false,
            holiday_name: None,
            notes: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(day.day_of_week, "monday");

    let ingredient =
        IngredientRepository::create(&app.pool, ingredient_input(&format!("감자-{seq}")))
            .await
            .unwrap();

    let (item, lines) = MealItemRepository::create_with_ingredients(
        &app.pool,
        CreateMealItem {
            daily_meal_id: day.id,
            category: MealCategory::Soup,
            name: "감자국".to_string(),
            serving_size_g: Decimal::new(250, 0),
            price_per_person: Some(Decimal::new(800, 0)),
            calories: None,
            cooking_method: Some("끓이기".to_string()),
            display_order: 0,
        },
        vec![ItemIngredientInput {
            ingredient_id: ingredient.id,
            quantity_g: Decimal::new(100, 0),
        }],
    )
    .await
    .unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].meal_item_id, item.id);

    // A second line for the same ingredient on the same item is a duplicate
    let err = MealItemRepository::add_ingredient(
        &app.pool,
        item.id,
        ItemIngredientInput {
            ingredient_id: ingredient.id,
            quantity_g: Decimal::new(50, 0),
        },
    )
    .await
    .expect_err("(item, ingredient) pairs are unique");
    match err {
        ApiError::Integrity { kind, constraint } => {
            assert_eq!(kind, ViolationKind::Unique);
            assert_eq!(constraint.as_deref(), Some("uq_meal_item_ingredients"));
        }
        other => panic!("expected unique violation, got {other:?}"),
    }

    let items = MealItemRepository::list_for_daily_meal(&app.pool, day.id)
        .await
        .unwrap();
    assert_eq!(items.len(), 1);

    let plans = MealPlanRepository::list_by_user(&app.pool, user.id)
        .await
        .unwrap();
    assert_eq!(plans.len(), 1);
    assert_eq!(plans[0].id, plan.id);

    IngredientRepository::delete(&app.pool, ingredient.id)
        .await
        .unwrap();
    // The join row went with the ingredient
    let lines = MealItemRepository::list_ingredients(&app.pool, item.id)
        .await
        .unwrap();
    assert!(lines.is_empty());
}
