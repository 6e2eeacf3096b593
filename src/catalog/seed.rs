//! Curated local catalog shipped with the binary.
//!
//! Values are per 100 g (or per 100 ml for drinks), rounded from USDA SR Legacy.
//! The rows live in `data/curated_foods.csv` and are embedded at compile time.

use crate::catalog::persistence::read_csv;
use crate::models::FoodItem;

const CURATED_CSV: &str = include_str!("../../data/curated_foods.csv");

/// Build the curated food list in catalog order.
pub fn curated_foods() -> Vec<FoodItem> {
    read_csv(CURATED_CSV.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FoodSource, Portion};

    #[test]
    fn test_every_curated_row_parses() {
        let foods = curated_foods();
        let rows = CURATED_CSV.lines().skip(1).filter(|l| !l.is_empty()).count();
        assert_eq!(foods.len(), rows);
        assert!(foods.iter().all(|f| f.is_valid()));
        assert!(foods.iter().all(|f| f.source() == FoodSource::Local));
        assert!(foods.iter().all(|f| f.confidence() == 0.95));
    }

    #[test]
    fn test_curated_row_details() {
        let foods = curated_foods();
        assert_eq!(foods[0].id, "white_rice_cooked");
        assert_eq!(foods[0].name, "White rice, cooked");

        let milk = foods.iter().find(|f| f.id == "milk_whole").unwrap();
        assert_eq!(milk.base_portion, Portion::milliliters(100.0));
        assert_eq!(milk.density_g_per_ml, Some(1.03));
        assert!(milk.has_tag("drink"));

        let egg = foods.iter().find(|f| f.id == "egg_whole").unwrap();
        assert_eq!(egg.grams_per_piece, Some(50.0));
        assert_eq!(egg.macros_per_base.fiber_g, None);
    }
}
