use crate::models::{DayMacros, Degradation, FoodItem, MacroProfile, SubstitutionResult};

fn optional_grams(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.1} g"))
}

/// One-line macro summary.
pub fn format_macros(macros: &MacroProfile) -> String {
    format!(
        "{:>6.1} kcal | P {:>5.1} g | C {:>5.1} g | F {:>5.1} g | fiber {} | sugar {}",
        macros.calories_kcal,
        macros.protein_g,
        macros.carbs_g,
        macros.fat_g,
        optional_grams(macros.fiber_g),
        optional_grams(macros.sugar_g),
    )
}

pub fn display_macros(label: &str, macros: &MacroProfile) {
    println!("{label}: {}", format_macros(macros));
}

fn display_unresolved(unresolved: &[Degradation]) {
    if unresolved.is_empty() {
        return;
    }
    println!();
    println!("Unresolved items (counted as zero):");
    for d in unresolved {
        println!("  - {}: {}", d.food_id, d.reason);
    }
}

/// Display per-meal totals and the day total.
pub fn display_day(day: &DayMacros) {
    println!();
    println!("=== Day ===");
    println!();

    for (i, meal) in day.per_meal.iter().enumerate() {
        display_macros(&format!("Meal {:>2}", i + 1), meal);
    }

    println!();
    display_macros("Total  ", &day.total);
    display_unresolved(&day.unresolved);
    println!();
}

/// Display ranked substitutions in a formatted table.
pub fn display_substitutions(result: &SubstitutionResult) {
    println!();
    println!(
        "=== Substitutions for {} {} ===",
        result.original_portion, result.original_food.name
    );
    display_macros("Original", &result.original_macros);
    println!();

    if !result.has_viable_substitutions {
        println!(
            "No substitution within {:.1}% macro deviation.",
            result.metadata.constraints_applied.macro_tolerance_percent
        );
        println!();
        return;
    }

    let max_name_len = result
        .candidates
        .iter()
        .map(|c| c.food.name.len())
        .max()
        .unwrap_or(10);

    for (i, c) in result.candidates.iter().enumerate() {
        println!(
            "{:>3}. {:<width$} {:>8} | score {:>5.1} | dev {:>4.1}% | {}",
            i + 1,
            c.food.name,
            c.suggested_portion.to_string(),
            c.score,
            c.comparison.overall,
            c.reason,
            width = max_name_len
        );
    }

    println!();
    println!("--- Summary ---");
    let evaluated = result.metadata.total_candidates_evaluated;
    println!("Candidates evaluated: {evaluated}");
    println!("Suggestions: {}", result.candidates.len());
    if result.metadata.reranked {
        println!("Re-ranked: yes");
    }
    if let Some(insights) = &result.metadata.rerank_insights {
        println!("Insights: {insights}");
    }
    println!("Time: {} ms", result.metadata.processing_time_ms);
    println!();
}

pub fn display_food(food: &FoodItem) {
    println!("{} [{}]", food.name, food.id);
    let per_base = format_macros(&food.macros_per_base);
    println!("  per {}: {per_base}", food.base_portion);
    println!(
        "  source: {}, confidence {:.2}",
        food.source(),
        food.confidence()
    );
    if !food.category_tags.is_empty() {
        println!("  tags: {}", food.category_tags.join(", "));
    }
    if !food.allergen_tags.is_empty() {
        let allergens: Vec<&str> = food.allergen_tags.iter().map(String::as_str).collect();
        println!("  allergens: {}", allergens.join(", "));
    }
}

/// Display a simple list of foods with their details.
pub fn display_food_list(foods: &[FoodItem], title: &str) {
    if foods.is_empty() {
        println!("{}: (none)", title);
        return;
    }

    println!();
    println!("=== {} ({} items) ===", title, foods.len());
    println!();

    for food in foods {
        println!(
            "  {:<32} {:<24} {} per {}",
            food.name,
            food.id,
            food.macros_per_base.debug_string(),
            food.base_portion
        );
    }

    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_macros() {
        let line = format_macros(&MacroProfile::new(247.5, 46.5, 0.0, 5.4).with_fiber(0.0));
        assert!(line.starts_with(" 247.5 kcal"));
        assert!(line.contains("P  46.5 g"));
        assert!(line.contains("fiber 0.0 g"));
        assert!(line.ends_with("sugar -"));
    }
}
