use futures_util::future::join_all;
use tracing::{debug, warn};

use crate::error::{Result, SwapError};
use crate::models::{
    DayMacros, Degradation, FoodItem, MacroProfile, MealItemInput, MealReport, Portion,
};
use crate::resolver::FoodResolver;
use crate::units::{Unit, UnitError, portion_to_grams, to_grams, to_milliliters};

/// Grams in `portion` of `food`, using the food's piece map and density.
pub fn grams_for_portion(
    food: &FoodItem,
    portion: &Portion,
) -> std::result::Result<f64, UnitError> {
    match portion.unit {
        Unit::Piece => {
            if !portion.quantity.is_finite() || portion.quantity < 0.0 {
                return Err(UnitError::InvalidQuantity(portion.quantity));
            }
            let grams_per_piece = food
                .grams_per_piece
                .ok_or(UnitError::PieceRequiresMapping)?;
            Ok(portion.quantity * grams_per_piece)
        }
        unit => portion_to_grams(portion.quantity, unit, food.density_g_per_ml),
    }
}

/// How many base portions `portion` amounts to.
///
/// Portions in the same dimension as the base portion scale directly, so a
/// liquid defined per 100 ml needs no density for ml/cup portions.
pub fn portion_ratio(
    food: &FoodItem,
    portion: &Portion,
) -> std::result::Result<f64, UnitError> {
    let base = &food.base_portion;
    if !portion.quantity.is_finite() || portion.quantity < 0.0 {
        return Err(UnitError::InvalidQuantity(portion.quantity));
    }

    let (amount, base_amount) = match (portion.unit, base.unit) {
        (Unit::Mass(p), Unit::Mass(b)) => {
            (to_grams(portion.quantity, p), to_grams(base.quantity, b))
        }
        (Unit::Volume(p), Unit::Volume(b)) => (
            to_milliliters(portion.quantity, p),
            to_milliliters(base.quantity, b),
        ),
        (Unit::Piece, Unit::Piece) => (portion.quantity, base.quantity),
        _ => (
            grams_for_portion(food, portion)?,
            grams_for_portion(food, base)?,
        ),
    };

    if !base_amount.is_finite() || base_amount <= 0.0 {
        return Err(UnitError::InvalidQuantity(base.quantity));
    }
    Ok(amount / base_amount)
}

/// Macros for `portion` of an already resolved food.
pub fn macros_for_portion(food: &FoodItem, portion: &Portion) -> Result<MacroProfile> {
    let ratio = portion_ratio(food, portion)?;
    Ok(food.macros_per_base.scale(ratio))
}

/// Resolve `food_id` and compute macros, surfacing every failure.
pub async fn try_compute_item_macros(
    resolver: &FoodResolver,
    food_id: &str,
    portion: &Portion,
) -> Result<MacroProfile> {
    portion.validate()?;
    let food = resolver
        .get_by_id(food_id)
        .await?
        .ok_or_else(|| SwapError::NotFound(food_id.to_string()))?;
    macros_for_portion(&food, portion)
}

/// Resolve `food_id` and compute macros, degrading to zero on any failure.
pub async fn compute_item_macros(
    resolver: &FoodResolver,
    food_id: &str,
    portion: &Portion,
) -> MacroProfile {
    match try_compute_item_macros(resolver, food_id, portion).await {
        Ok(macros) => macros,
        Err(e) => {
            warn!(food_id, error = %e, "unresolved food contributes zero macros");
            MacroProfile::zero()
        }
    }
}

/// Meal total plus the entries that degraded to zero.
///
/// Items are resolved concurrently and summed in input order.
pub async fn compute_meal_report(
    resolver: &FoodResolver,
    items: &[MealItemInput],
) -> MealReport {
    let lookups = items
        .iter()
        .map(|item| try_compute_item_macros(resolver, &item.food_id, &item.portion));
    let results = join_all(lookups).await;

    let mut report = MealReport::default();
    for (item, result) in items.iter().zip(results) {
        match result {
            Ok(macros) => report.total = report.total + macros,
            Err(e) => {
                warn!(
                    food_id = %item.food_id,
                    error = %e,
                    "unresolved food contributes zero macros"
                );
                report.unresolved.push(Degradation {
                    food_id: item.food_id.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    debug!(
        items = items.len(),
        unresolved = report.unresolved.len(),
        total = %report.total.debug_string(),
        "computed meal macros"
    );
    report
}

/// Field-wise sum of item macros over a meal.
pub async fn compute_meal_macros(
    resolver: &FoodResolver,
    items: &[MealItemInput],
) -> MacroProfile {
    compute_meal_report(resolver, items).await.total
}

/// Per-meal totals and the day total.
pub async fn compute_day_macros(
    resolver: &FoodResolver,
    meals: &[Vec<MealItemInput>],
) -> DayMacros {
    let lookups = meals.iter().map(|meal| compute_meal_report(resolver, meal));
    let reports = join_all(lookups).await;

    let mut day = DayMacros::default();
    for report in reports {
        day.total = day.total + report.total;
        day.per_meal.push(report.total);
        day.unresolved.extend(report.unresolved);
    }
    day
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::{MassUnit, VolumeUnit};

    fn chicken() -> FoodItem {
        FoodItem::per_100g(
            "chicken_breast_cooked",
            "Chicken breast, cooked",
            MacroProfile::new(165.0, 31.0, 0.0, 3.6),
        )
    }

    fn milk() -> FoodItem {
        FoodItem::per_100ml("milk", "Milk", MacroProfile::new(61.0, 3.2, 4.8, 3.3))
            .with_density(1.03)
    }

    #[test]
    fn test_chicken_150g() {
        let m = macros_for_portion(&chicken(), &Portion::grams(150.0)).unwrap();
        assert!((m.calories_kcal - 247.5).abs() < 1e-9);
        assert!((m.protein_g - 46.5).abs() < 1e-9);
        assert_eq!(m.carbs_g, 0.0);
        assert!((m.fat_g - 5.4).abs() < 1e-9);
    }

    #[test]
    fn test_other_mass_units() {
        let oz = Portion {
            quantity: 4.0,
            unit: Unit::Mass(MassUnit::Oz),
        };
        let m = macros_for_portion(&chicken(), &oz).unwrap();
        let expected = 165.0 * to_grams(4.0, MassUnit::Oz) / 100.0;
        assert!((m.calories_kcal - expected).abs() < 1e-9);
    }

    #[test]
    fn test_volume_base_same_dimension() {
        let no_density =
            FoodItem::per_100ml("broth", "Broth", MacroProfile::new(10.0, 1.0, 1.0, 0.2));
        let cup = Portion {
            quantity: 1.0,
            unit: Unit::Volume(VolumeUnit::Cup),
        };
        let m = macros_for_portion(&no_density, &cup).unwrap();
        assert!((m.calories_kcal - 10.0 * 2.365882365).abs() < 1e-9);

        // grams against a ml base needs the density
        assert!(macros_for_portion(&no_density, &Portion::grams(100.0)).is_err());
        let m = macros_for_portion(&milk(), &Portion::grams(103.0)).unwrap();
        assert!((m.calories_kcal - 61.0).abs() < 1e-9);
    }

    #[test]
    fn test_piece_without_mapping_fails() {
        let err = macros_for_portion(&chicken(), &Portion::pieces(1.0)).unwrap_err();
        assert!(matches!(
            err,
            SwapError::UnitConversion(UnitError::PieceRequiresMapping)
        ));
    }

    #[test]
    fn test_piece_mapping() {
        let egg = FoodItem::per_100g("egg_whole", "Egg", MacroProfile::new(143.0, 12.6, 0.7, 9.5))
            .with_piece_grams(50.0);
        let two = macros_for_portion(&egg, &Portion::pieces(2.0)).unwrap();
        let hundred = macros_for_portion(&egg, &Portion::grams(100.0)).unwrap();
        assert!((two.calories_kcal - hundred.calories_kcal).abs() < 1e-9);
        assert!((two.protein_g - hundred.protein_g).abs() < 1e-9);
    }

    #[test]
    fn test_linearity() {
        let food = milk();
        for unit in [Unit::GRAM, Unit::MILLILITER, Unit::Volume(VolumeUnit::Tbsp)] {
            let portion = |quantity| Portion { quantity, unit };
            let single = macros_for_portion(&food, &portion(37.0)).unwrap();
            let double = macros_for_portion(&food, &portion(74.0)).unwrap();
            let expected = single.scale(2.0);
            assert!((double.calories_kcal - expected.calories_kcal).abs() < 1e-9);
            assert!((double.fat_g - expected.fat_g).abs() < 1e-9);
        }
    }
}
