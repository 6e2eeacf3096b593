use std::collections::HashMap;

use strsim::jaro_winkler;

use crate::catalog::seed::curated_foods;
use crate::models::FoodItem;

/// Minimum Jaro-Winkler similarity for a query word to match a name word.
pub const FUZZY_MATCH_THRESHOLD: f64 = 0.88;

/// The curated in-memory catalog, static after construction.
///
/// Foods keep their insertion order so search results and substitution
/// discovery are deterministic.
#[derive(Debug, Clone, Default)]
pub struct LocalCatalog {
    foods: Vec<FoodItem>,
    /// Food id -> index in `foods`.
    by_id: HashMap<String, usize>,
}

impl LocalCatalog {
    /// Build a catalog from a list of foods.
    ///
    /// A repeated id replaces the earlier entry in place (last occurrence wins).
    pub fn new(foods: Vec<FoodItem>) -> Self {
        let mut catalog = Self::default();
        for food in foods {
            catalog.insert(food);
        }
        catalog
    }

    /// The built-in curated catalog.
    pub fn curated() -> Self {
        Self::new(curated_foods())
    }

    pub fn insert(&mut self, food: FoodItem) {
        match self.by_id.get(&food.id) {
            Some(&idx) => self.foods[idx] = food,
            None => {
                self.by_id.insert(food.id.clone(), self.foods.len());
                self.foods.push(food);
            }
        }
    }

    /// Get a food by id.
    pub fn get(&self, id: &str) -> Option<&FoodItem> {
        self.by_id.get(id).map(|&idx| &self.foods[idx])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn get_by_barcode(&self, barcode: &str) -> Option<&FoodItem> {
        self.foods.iter().find(|f| f.barcode() == Some(barcode))
    }

    /// Foods whose name or id matches every word of `query`, in catalog order.
    pub fn search(&self, query: &str) -> Vec<&FoodItem> {
        let words: Vec<String> = query
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(str::to_lowercase)
            .collect();
        if words.is_empty() {
            return Vec::new();
        }

        self.foods
            .iter()
            .filter(|food| matches_all_words(food, &words))
            .collect()
    }

    /// All foods in catalog order.
    pub fn all(&self) -> &[FoodItem] {
        &self.foods
    }

    pub fn len(&self) -> usize {
        self.foods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.foods.is_empty()
    }
}

fn matches_all_words(food: &FoodItem, words: &[String]) -> bool {
    let name = food.name.to_lowercase();
    let name_words: Vec<&str> = name
        .split(|c: char| !c.is_alphanumeric())
        .chain(food.id.split('_'))
        .filter(|w| !w.is_empty())
        .collect();

    words.iter().all(|word| {
        name.contains(word.as_str())
            || name_words
                .iter()
                .any(|candidate| jaro_winkler(word, candidate) >= FUZZY_MATCH_THRESHOLD)
    })
}
