use std::fs;
use std::io;
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{Result, SwapError};
use crate::models::{FoodItem, FoodMetadata, FoodSource, MacroProfile, Portion};
use crate::units::Unit;

/// One row of a CSV catalog. List columns are `;`-separated.
#[derive(Debug, Deserialize)]
struct CsvFoodRecord {
    id: String,
    name: String,
    base_quantity: f64,
    base_unit: String,
    calories: f64,
    protein: f64,
    carbs: f64,
    fat: f64,
    fiber: Option<f64>,
    sugar: Option<f64>,
    density_g_per_ml: Option<f64>,
    grams_per_piece: Option<f64>,
    tags: Option<String>,
    allergens: Option<String>,
    source: Option<FoodSource>,
    confidence: Option<f64>,
    barcode: Option<String>,
}

impl CsvFoodRecord {
    fn into_food(self) -> Result<FoodItem> {
        let unit: Unit = self.base_unit.parse()?;
        let mut macros = MacroProfile::new(self.calories, self.protein, self.carbs, self.fat);
        macros.fiber_g = self.fiber;
        macros.sugar_g = self.sugar;

        let mut metadata = FoodMetadata::new(
            self.source.unwrap_or(FoodSource::UserContributed),
            self.confidence.unwrap_or(1.0),
        );
        metadata.barcode = self.barcode.filter(|b| !b.is_empty());

        let base_portion = Portion::new(self.base_quantity, unit)?;
        let mut food = FoodItem::new(self.id, self.name, base_portion, macros)
            .with_tags(split_list(self.tags.as_deref()))
            .with_allergens(split_list(self.allergens.as_deref()))
            .with_metadata(metadata);
        food.density_g_per_ml = self.density_g_per_ml;
        food.grams_per_piece = self.grams_per_piece;
        Ok(food)
    }
}

fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Load foods from a `.csv` or JSON file.
///
/// Invalid records are skipped with a warning. Allergen tags are classified
/// on load.
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<Vec<FoodItem>> {
    let path = path.as_ref();
    let is_csv = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

    let foods = if is_csv {
        load_csv(path)?
    } else {
        let content = fs::read_to_string(path)?;
        let foods: Vec<FoodItem> = serde_json::from_str(&content)?;
        foods.into_iter().map(FoodItem::classified).collect()
    };

    let total = foods.len();
    let valid: Vec<FoodItem> = foods
        .into_iter()
        .filter(|food| {
            let ok = food.is_valid();
            if !ok {
                warn!(food_id = %food.id, "skipping invalid catalog record");
            }
            ok
        })
        .collect();

    info!(
        path = %path.display(),
        loaded = valid.len(),
        skipped = total - valid.len(),
        "loaded food catalog"
    );
    Ok(valid)
}

fn load_csv(path: &Path) -> Result<Vec<FoodItem>> {
    Ok(read_csv(fs::File::open(path)?))
}

/// Parse CSV catalog rows, skipping malformed ones with a warning.
pub(crate) fn read_csv<R: io::Read>(input: R) -> Vec<FoodItem> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input);
    let mut foods = Vec::new();
    for (line, record) in reader.deserialize::<CsvFoodRecord>().enumerate() {
        match record
            .map_err(SwapError::from)
            .and_then(CsvFoodRecord::into_food)
        {
            Ok(food) => foods.push(food),
            Err(e) => warn!(row = line + 1, error = %e, "skipping malformed CSV row"),
        }
    }
    foods
}

/// Save foods to a JSON file.
pub fn save_catalog<P: AsRef<Path>>(path: P, foods: &[FoodItem]) -> Result<()> {
    let json = serde_json::to_string_pretty(foods)?;
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::allergens::DAIRY;
    use std::io::Write;
    use tempfile::{Builder, NamedTempFile};

    #[test]
    fn test_load_and_save_json() {
        let json = r#"[
            {"id": "apple", "name": "Apple", "base_portion": {"quantity": 100, "unit": "g"},
             "macros_per_base": {"calories_kcal": 52, "protein_g": 0.3, "carbs_g": 13.8,
                                 "fat_g": 0.2}}
        ]"#;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let foods = load_catalog(file.path()).unwrap();
        assert_eq!(foods.len(), 1);
        assert_eq!(foods[0].name, "Apple");

        let out_file = NamedTempFile::new().unwrap();
        save_catalog(out_file.path(), &foods).unwrap();

        let reloaded = load_catalog(out_file.path()).unwrap();
        assert_eq!(reloaded, foods);
    }

    #[test]
    fn test_load_csv() {
        let csv = concat!(
            "id,name,base_quantity,base_unit,calories,protein,carbs,fat,fiber,sugar,",
            "density_g_per_ml,grams_per_piece,tags,allergens,source,confidence,barcode\n",
            "kefir,Kefir plain,100,ml,41,3.4,4.5,1.0,,,1.03,,drink;dairy,,local,0.9,\n",
            "bagel,Bagel,1,piece,245,10,48,1.5,2,,,95,bakery,sesame,,,\n",
            "broken,Broken,100,handful,1,1,1,1,,,,,,,,,\n",
        );
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(csv.as_bytes()).unwrap();

        let foods = load_catalog(file.path()).unwrap();
        assert_eq!(foods.len(), 2);

        let kefir = &foods[0];
        assert_eq!(kefir.base_portion, Portion::milliliters(100.0));
        assert_eq!(kefir.density_g_per_ml, Some(1.03));
        assert!(kefir.allergen_tags.contains(DAIRY));
        assert_eq!(kefir.source(), FoodSource::Local);

        let bagel = &foods[1];
        assert_eq!(bagel.grams_per_piece, Some(95.0));
        assert!(bagel.allergen_tags.contains("sesame"));
        assert_eq!(bagel.source(), FoodSource::UserContributed);
        assert_eq!(bagel.macros_per_base.fiber_g, Some(2.0));
    }
}
