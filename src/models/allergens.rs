//! Keyword-based allergen classification applied when a food is ingested.
//!
//! Matching is on the food name and its category tags. A dish whose name and
//! tags never mention an ingredient (e.g. "pad thai" containing peanuts) is a
//! false negative here; the substitution filters fall back to name substring
//! matching but cannot see hidden ingredients either.

use std::collections::BTreeSet;

pub const DAIRY: &str = "dairy";
pub const EGG: &str = "egg";
pub const GLUTEN: &str = "gluten";
pub const PEANUT: &str = "peanut";
pub const TREE_NUT: &str = "tree_nut";
pub const SOY: &str = "soy";
pub const FISH: &str = "fish";
pub const SHELLFISH: &str = "shellfish";
pub const SESAME: &str = "sesame";

/// Allergen category -> keywords that imply it.
static ALLERGEN_KEYWORDS: &[(&str, &[&str])] = &[
    (
        DAIRY,
        &[
            "milk", "cheese", "yogurt", "yoghurt", "butter", "cream", "whey", "casein", "kefir",
            "ghee", "dairy", "lactose",
        ],
    ),
    (EGG, &["egg"]),
    (
        GLUTEN,
        &[
            "wheat", "bread", "pasta", "barley", "rye", "flour", "couscous", "seitan", "bulgur",
            "spelt", "gluten", "noodle",
        ],
    ),
    (PEANUT, &["peanut"]),
    (
        TREE_NUT,
        &[
            "almond",
            "cashew",
            "walnut",
            "pecan",
            "pistachio",
            "hazelnut",
            "macadamia",
            "tree_nut",
            "tree nut",
        ],
    ),
    (SOY, &["soy", "tofu", "tempeh", "edamame"]),
    (
        FISH,
        &[
            "fish", "salmon", "tuna", "cod", "sardine", "trout", "mackerel", "tilapia", "anchov",
        ],
    ),
    (
        SHELLFISH,
        &[
            "shellfish",
            "shrimp",
            "prawn",
            "crab",
            "lobster",
            "mussel",
            "oyster",
            "clam",
            "scallop",
        ],
    ),
    (SESAME, &["sesame", "tahini"]),
];

/// Phrases that contain a category keyword without implying the allergen.
static FALSE_FRIENDS: &[(&str, &[&str])] = &[
    (
        DAIRY,
        &[
            "soy milk",
            "almond milk",
            "oat milk",
            "rice milk",
            "coconut milk",
            "cashew milk",
            "peanut butter",
            "almond butter",
            "cashew butter",
            "cocoa butter",
            "coconut cream",
        ],
    ),
    (EGG, &["eggplant"]),
    (GLUTEN, &["buckwheat", "rice noodle"]),
];

/// Derive allergen categories from a food name and its category tags.
pub fn classify_allergens(name: &str, category_tags: &[String]) -> BTreeSet<String> {
    let mut haystack = name.to_lowercase();
    for tag in category_tags {
        haystack.push(' ');
        haystack.push_str(&tag.to_lowercase());
    }

    ALLERGEN_KEYWORDS
        .iter()
        .filter(|(category, keywords)| {
            let text = without_false_friends(&haystack, category);
            keywords.iter().any(|k| text.contains(*k))
        })
        .map(|(category, _)| category.to_string())
        .collect()
}

fn without_false_friends(haystack: &str, category: &str) -> String {
    let mut text = haystack.to_string();
    for (_, phrases) in FALSE_FRIENDS.iter().filter(|(c, _)| *c == category) {
        for phrase in phrases.iter() {
            text = text.replace(*phrase, " ");
        }
    }
    text
}

/// Map a user-declared allergy term onto allergen categories.
///
/// Unknown terms map to nothing; callers still apply substring matching.
pub fn categories_for_term(term: &str) -> Vec<&'static str> {
    let term = term.trim().to_lowercase().replace(['-', ' '], "_");
    match term.as_str() {
        "dairy" | "milk" | "lactose" | "cheese" | "whey" | "casein" => vec![DAIRY],
        "egg" | "eggs" => vec![EGG],
        "gluten" | "wheat" | "celiac" | "coeliac" => vec![GLUTEN],
        "peanut" | "peanuts" => vec![PEANUT],
        "tree_nut" | "tree_nuts" => vec![TREE_NUT],
        "nut" | "nuts" => vec![TREE_NUT, PEANUT],
        "soy" | "soya" | "soybean" | "soybeans" => vec![SOY],
        "fish" => vec![FISH],
        "shellfish" | "crustacean" | "crustaceans" => vec![SHELLFISH],
        "seafood" => vec![FISH, SHELLFISH],
        "sesame" => vec![SESAME],
        _ => Vec::new(),
    }
}
