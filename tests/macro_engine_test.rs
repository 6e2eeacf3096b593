use assert_float_eq::*;

use food_swap_rs::SwapError;
use food_swap_rs::models::{MacroProfile, MealItemInput, Portion};
use food_swap_rs::nutrition::{
    compute_day_macros, compute_item_macros, compute_meal_macros, compute_meal_report,
    try_compute_item_macros,
};
use food_swap_rs::resolver::FoodResolver;
use food_swap_rs::units::{Unit, VolumeUnit};

fn assert_macros_eq(a: &MacroProfile, b: &MacroProfile) {
    assert_float_absolute_eq!(a.calories_kcal, b.calories_kcal, 1e-9);
    assert_float_absolute_eq!(a.protein_g, b.protein_g, 1e-9);
    assert_float_absolute_eq!(a.carbs_g, b.carbs_g, 1e-9);
    assert_float_absolute_eq!(a.fat_g, b.fat_g, 1e-9);
}

fn item(id: &str, portion: Portion) -> MealItemInput {
    MealItemInput::new(id, portion)
}

#[tokio::test]
async fn test_chicken_breast_150g() {
    let resolver = FoodResolver::local_only();
    let macros =
        compute_item_macros(&resolver, "chicken_breast_cooked", &Portion::grams(150.0)).await;

    assert_macros_eq(&macros, &MacroProfile::new(247.5, 46.5, 0.0, 5.4));
}

#[tokio::test]
async fn test_two_eggs_equal_100g() {
    let resolver = FoodResolver::local_only();
    let by_piece = compute_item_macros(&resolver, "egg_whole", &Portion::pieces(2.0)).await;
    let by_mass = compute_item_macros(&resolver, "egg_whole", &Portion::grams(100.0)).await;

    assert_macros_eq(&by_piece, &by_mass);
    assert_float_absolute_eq!(by_piece.calories_kcal, 143.0, 1e-9);
}

#[tokio::test]
async fn test_item_macros_are_linear() {
    let resolver = FoodResolver::local_only();
    let base = Portion::grams(80.0);
    let single = compute_item_macros(&resolver, "salmon_cooked", &base).await;

    for k in [0.0, 0.5, 2.0, 3.75] {
        let portion = base.scaled(k);
        let scaled = compute_item_macros(&resolver, "salmon_cooked", &portion).await;
        assert_macros_eq(&scaled, &single.scale(k));
    }
}

#[tokio::test]
async fn test_same_dimension_volume_needs_no_density() {
    let resolver = FoodResolver::local_only();
    let cup = Portion::new(1.0, Unit::Volume(VolumeUnit::Cup)).unwrap();
    let macros = compute_item_macros(&resolver, "milk_whole", &cup).await;

    // 236.588 ml of a per-100 ml food
    assert_float_absolute_eq!(macros.calories_kcal, 61.0 * 2.365882365, 1e-9);
}

#[tokio::test]
async fn test_volume_of_solid_uses_density() {
    let resolver = FoodResolver::local_only();
    let tbsp = Portion::parse(1.0, "tbsp").unwrap();
    let macros = compute_item_macros(&resolver, "olive_oil", &tbsp).await;

    let grams = 14.78676478125 * 0.91;
    assert_float_absolute_eq!(macros.fat_g, grams, 1e-9);
}

#[tokio::test]
async fn test_unknown_food_degrades_to_zero() {
    let resolver = FoodResolver::local_only();
    let macros = compute_item_macros(&resolver, "unknown_id", &Portion::grams(100.0)).await;
    assert!(macros.is_zero());

    let err = try_compute_item_macros(&resolver, "unknown_id", &Portion::grams(100.0))
        .await
        .unwrap_err();
    assert!(matches!(err, SwapError::NotFound(_)));
}

#[tokio::test]
async fn test_missing_piece_mapping_degrades() {
    let resolver = FoodResolver::local_only();
    let items = vec![
        item("chicken_breast_cooked", Portion::grams(100.0)),
        item("olive_oil", Portion::pieces(1.0)),
        item("unknown_id", Portion::grams(50.0)),
    ];

    let report = compute_meal_report(&resolver, &items).await;

    assert!(!report.is_complete());
    assert_eq!(report.unresolved.len(), 2);
    assert_eq!(report.unresolved[0].food_id, "olive_oil");
    assert_eq!(report.unresolved[1].food_id, "unknown_id");
    assert_float_absolute_eq!(report.total.calories_kcal, 165.0, 1e-9);
}

#[tokio::test]
async fn test_day_total_equals_flattened_meal_total() {
    let resolver = FoodResolver::local_only();
    let meals = vec![
        vec![
            item("oats_rolled", Portion::grams(60.0)),
            item("milk_whole", Portion::parse(1.0, "cup").unwrap()),
            item("banana", Portion::pieces(1.0)),
        ],
        vec![
            item("chicken_breast_cooked", Portion::grams(150.0)),
            item("white_rice_cooked", Portion::grams(200.0)),
            item("olive_oil", Portion::parse(1.0, "tbsp").unwrap()),
        ],
        vec![
            item("egg_whole", Portion::pieces(2.0)),
            item("unknown_id", Portion::grams(10.0)),
        ],
    ];

    let day = compute_day_macros(&resolver, &meals).await;
    let flattened: Vec<MealItemInput> = meals.iter().flatten().cloned().collect();
    let flat_total = compute_meal_macros(&resolver, &flattened).await;
    let per_meal_sum: MacroProfile = day.per_meal.iter().sum();

    assert_eq!(day.per_meal.len(), 3);
    assert_macros_eq(&day.total, &flat_total);
    assert_macros_eq(&day.total, &per_meal_sum);
    assert_eq!(day.unresolved.len(), 1);
}

#[tokio::test]
async fn test_meal_sum_is_order_independent() {
    let resolver = FoodResolver::local_only();
    let mut items = vec![
        item("tofu_firm", Portion::grams(120.0)),
        item("broccoli_steamed", Portion::grams(90.0)),
        item("brown_rice_cooked", Portion::grams(180.0)),
    ];

    let forward = compute_meal_macros(&resolver, &items).await;
    items.reverse();
    let backward = compute_meal_macros(&resolver, &items).await;

    assert_macros_eq(&forward, &backward);
}

#[tokio::test]
async fn test_empty_meal_is_zero() {
    let resolver = FoodResolver::local_only();
    assert!(compute_meal_macros(&resolver, &[]).await.is_zero());
    let day = compute_day_macros(&resolver, &[]).await;
    assert!(day.total.is_zero());
    assert!(day.per_meal.is_empty());
}
