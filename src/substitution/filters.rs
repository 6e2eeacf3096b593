//! Hard filters applied to discovered candidates before any scoring.
//!
//! Allergies are matched against the allergen tags classified at ingestion
//! first and fall back to a case-insensitive substring match on the name.
//! Both rely on what the food name and tags say: an ingredient that appears in
//! neither (a sauce hidden inside a dish) is a false negative. Treat the
//! result as a convenience filter, not an allergen guarantee.

use crate::models::allergens::{
    DAIRY, EGG, FISH, GLUTEN, PEANUT, SESAME, SHELLFISH, SOY, TREE_NUT, categories_for_term,
};
use crate::models::{FoodItem, UserPreferences};

/// Tag or name fragments marking meat and poultry.
const MEAT_KEYWORDS: &[&str] = &[
    "meat", "poultry", "beef", "pork", "chicken", "turkey", "lamb", "veal", "bacon", "ham",
    "sausage", "duck", "venison",
];

/// Animal products that are neither meat nor a classified allergen.
const NON_VEGAN_KEYWORDS: &[&str] = &["honey", "gelatin", "lard"];

fn normalize(term: &str) -> String {
    term.trim().to_lowercase()
}

/// Whole-word match of any keyword, or its plural, so "ham" does not hit
/// "graham".
fn has_keyword_word(text: &str, keywords: &[&str]) -> bool {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .any(|word| {
            keywords.iter().any(|k| {
                word == *k
                    || word
                        .strip_prefix(*k)
                        .is_some_and(|rest| rest == "s" || rest == "es")
            })
        })
}

fn mentions_any(food: &FoodItem, keywords: &[&str]) -> bool {
    has_keyword_word(&food.name, keywords)
        || food
            .category_tags
            .iter()
            .any(|t| has_keyword_word(t, keywords))
}

fn has_allergen(food: &FoodItem, category: &str) -> bool {
    food.allergen_tags.contains(category)
}

/// Does `food` match a declared allergy term?
pub fn matches_allergy(food: &FoodItem, term: &str) -> bool {
    let term = normalize(term);
    if term.is_empty() {
        return false;
    }

    let by_category = categories_for_term(&term)
        .into_iter()
        .any(|c| has_allergen(food, c));
    if by_category || food.allergen_tags.contains(&term) {
        return true;
    }
    food.name.to_lowercase().contains(&term)
}

pub fn is_disliked(food: &FoodItem, dislike: &str) -> bool {
    let dislike = normalize(dislike);
    !dislike.is_empty() && food.name.to_lowercase().contains(&dislike)
}

fn is_meat(food: &FoodItem) -> bool {
    mentions_any(food, MEAT_KEYWORDS)
}

fn is_seafood(food: &FoodItem) -> bool {
    has_allergen(food, FISH) || has_allergen(food, SHELLFISH)
}

/// Does `food` satisfy a dietary restriction?
///
/// Restriction names are matched loosely ("gluten-free", "Gluten Free" and
/// "gluten_free" are the same). Unknown restrictions behave like allergies.
pub fn satisfies_restriction(food: &FoodItem, restriction: &str) -> bool {
    let key = normalize(restriction).replace(['-', ' '], "_");
    match key.as_str() {
        "" => true,
        "vegetarian" => !is_meat(food) && !is_seafood(food),
        "vegan" => {
            !is_meat(food)
                && !is_seafood(food)
                && !has_allergen(food, DAIRY)
                && !has_allergen(food, EGG)
                && !mentions_any(food, NON_VEGAN_KEYWORDS)
        }
        "pescatarian" | "pescetarian" => !is_meat(food),
        "gluten_free" => !has_allergen(food, GLUTEN),
        "dairy_free" | "lactose_free" => !has_allergen(food, DAIRY),
        "nut_free" => !has_allergen(food, TREE_NUT) && !has_allergen(food, PEANUT),
        "peanut_free" => !has_allergen(food, PEANUT),
        "egg_free" => !has_allergen(food, EGG),
        "soy_free" => !has_allergen(food, SOY),
        "sesame_free" => !has_allergen(food, SESAME),
        _ => !matches_allergy(food, restriction),
    }
}

/// Why `food` is excluded, or `None` when it passes every hard filter.
pub fn rejection_reason(
    food: &FoodItem,
    min_confidence: f64,
    prefs: &UserPreferences,
) -> Option<String> {
    if food.confidence() < min_confidence {
        return Some(format!(
            "confidence {:.2} below {:.2}",
            food.confidence(),
            min_confidence
        ));
    }
    if let Some(term) = prefs.allergies.iter().find(|a| matches_allergy(food, a)) {
        return Some(format!("allergy: {term}"));
    }
    if let Some(term) = prefs.dislikes.iter().find(|d| is_disliked(food, d)) {
        return Some(format!("disliked: {term}"));
    }
    if let Some(r) = prefs
        .dietary_restrictions
        .iter()
        .find(|r| !satisfies_restriction(food, r))
    {
        return Some(format!("restriction: {r}"));
    }
    None
}

pub fn passes_filters(food: &FoodItem, min_confidence: f64, prefs: &UserPreferences) -> bool {
    rejection_reason(food, min_confidence, prefs).is_none()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::LocalCatalog;
    use crate::models::{FoodMetadata, FoodSource, MacroProfile};

    fn food(id: &str) -> FoodItem {
        LocalCatalog::curated()
            .get(id)
            .cloned()
            .unwrap_or_else(|| panic!("missing curated food {id}"))
    }

    #[test]
    fn test_allergy_by_tag_and_substring() {
        assert!(matches_allergy(&food("peanut_butter"), "peanuts"));
        assert!(matches_allergy(&food("almonds"), "nuts"));
        assert!(matches_allergy(&food("butter"), "Dairy"));
        assert!(!matches_allergy(&food("soy_milk"), "dairy"));
        // no category for "avocado"; the name fallback catches it
        assert!(matches_allergy(&food("avocado_oil"), "avocado"));
        assert!(!matches_allergy(&food("olive_oil"), "   "));
    }

    #[test]
    fn test_dietary_restrictions() {
        assert!(!satisfies_restriction(&food("chicken_breast_cooked"), "vegetarian"));
        assert!(!satisfies_restriction(&food("salmon_cooked"), "vegetarian"));
        assert!(satisfies_restriction(&food("salmon_cooked"), "pescatarian"));
        assert!(!satisfies_restriction(&food("greek_yogurt_nonfat"), "vegan"));
        assert!(satisfies_restriction(&food("tofu_firm"), "vegan"));
        assert!(!satisfies_restriction(&food("pasta_cooked"), "Gluten-Free"));
        assert!(!satisfies_restriction(&food("tofu_firm"), "soy_free"));
        assert!(!satisfies_restriction(&food("peanut_butter"), "nut free"));
    }

    #[test]
    fn test_meat_keywords_match_whole_words() {
        let graham = FoodItem::per_100g(
            "graham_crackers",
            "Graham crackers",
            MacroProfile::new(430.0, 7.0, 77.0, 10.0),
        );
        let champignons = FoodItem::per_100g(
            "champignons",
            "Champignons, sliced",
            MacroProfile::new(22.0, 3.1, 3.3, 0.3),
        );
        assert!(satisfies_restriction(&graham, "vegetarian"));
        assert!(satisfies_restriction(&champignons, "vegetarian"));

        let ham = FoodItem::per_100g(
            "ham",
            "Sliced ham",
            MacroProfile::new(145.0, 21.0, 1.5, 6.0),
        );
        assert!(!satisfies_restriction(&ham, "vegetarian"));

        let sausage = FoodItem::per_100g(
            "off:1",
            "Breakfast links",
            MacroProfile::new(300.0, 12.0, 2.0, 27.0),
        )
        .with_tags(["en:pork-sausages"]);
        assert!(!satisfies_restriction(&sausage, "vegetarian"));
    }

    #[test]
    fn test_unknown_restriction_acts_as_allergy() {
        assert!(!satisfies_restriction(&food("banana"), "banana"));
        assert!(satisfies_restriction(&food("apple"), "banana"));
    }

    #[test]
    fn test_rejection_reasons() {
        let prefs = UserPreferences {
            allergies: vec!["peanut".to_string()],
            dislikes: vec!["tofu".to_string()],
            ..Default::default()
        };
        let allergy = rejection_reason(&food("peanut_butter"), 0.7, &prefs);
        assert!(allergy.is_some_and(|r| r.starts_with("allergy")));
        let disliked = rejection_reason(&food("tofu_firm"), 0.7, &prefs);
        assert!(disliked.is_some_and(|r| r.starts_with("disliked")));
        assert!(passes_filters(&food("tempeh"), 0.7, &prefs));

        let macros = MacroProfile::new(190.0, 20.0, 8.0, 11.0);
        let shaky = FoodItem::per_100g("off:9", "Tempeh bar", macros)
            .with_metadata(FoodMetadata::new(FoodSource::ExternalCatalog, 0.5));
        let low = rejection_reason(&shaky, 0.7, &prefs);
        assert!(low.is_some_and(|r| r.starts_with("confidence")));
    }
}
