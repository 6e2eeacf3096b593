//! Unit conversion to a canonical gram / milliliter basis.
//!
//! Mass and volume conversions are exact linear scalings. A piece has no
//! universal gram equivalent, so `portion_to_grams` refuses it; callers resolve
//! pieces with a food-specific grams-per-piece mapping.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Grams per unit.
const GRAMS_PER_KG: f64 = 1000.0;
const GRAMS_PER_MG: f64 = 0.001;
const GRAMS_PER_OZ: f64 = 28.349_523_125;
const GRAMS_PER_LB: f64 = 453.592_37;

/// Milliliters per unit (US customary).
const ML_PER_L: f64 = 1000.0;
const ML_PER_TSP: f64 = 4.928_921_593_75;
const ML_PER_TBSP: f64 = 14.786_764_781_25;
const ML_PER_CUP: f64 = 236.588_236_5;
const ML_PER_FL_OZ: f64 = 29.573_529_562_5;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum UnitError {
    #[error("volume unit {0} needs a density (g/ml) to convert to grams")]
    MissingDensity(VolumeUnit),

    #[error("piece portions need a food-specific grams-per-piece mapping")]
    PieceRequiresMapping,

    #[error("unsupported unit: {0}")]
    UnsupportedUnit(String),

    #[error("invalid quantity: {0}")]
    InvalidQuantity(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MassUnit {
    G,
    Kg,
    Mg,
    Oz,
    Lb,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeUnit {
    Ml,
    L,
    Tsp,
    Tbsp,
    Cup,
    FlOz,
}

/// Any unit a portion can be expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    Mass(MassUnit),
    Volume(VolumeUnit),
    Piece,
}

impl MassUnit {
    pub fn symbol(self) -> &'static str {
        match self {
            MassUnit::G => "g",
            MassUnit::Kg => "kg",
            MassUnit::Mg => "mg",
            MassUnit::Oz => "oz",
            MassUnit::Lb => "lb",
        }
    }

    fn grams_per_unit(self) -> f64 {
        match self {
            MassUnit::G => 1.0,
            MassUnit::Kg => GRAMS_PER_KG,
            MassUnit::Mg => GRAMS_PER_MG,
            MassUnit::Oz => GRAMS_PER_OZ,
            MassUnit::Lb => GRAMS_PER_LB,
        }
    }
}

impl VolumeUnit {
    pub fn symbol(self) -> &'static str {
        match self {
            VolumeUnit::Ml => "ml",
            VolumeUnit::L => "l",
            VolumeUnit::Tsp => "tsp",
            VolumeUnit::Tbsp => "tbsp",
            VolumeUnit::Cup => "cup",
            VolumeUnit::FlOz => "fl oz",
        }
    }

    fn ml_per_unit(self) -> f64 {
        match self {
            VolumeUnit::Ml => 1.0,
            VolumeUnit::L => ML_PER_L,
            VolumeUnit::Tsp => ML_PER_TSP,
            VolumeUnit::Tbsp => ML_PER_TBSP,
            VolumeUnit::Cup => ML_PER_CUP,
            VolumeUnit::FlOz => ML_PER_FL_OZ,
        }
    }
}

impl Unit {
    pub const GRAM: Unit = Unit::Mass(MassUnit::G);
    pub const MILLILITER: Unit = Unit::Volume(VolumeUnit::Ml);

    pub fn symbol(self) -> &'static str {
        match self {
            Unit::Mass(m) => m.symbol(),
            Unit::Volume(v) => v.symbol(),
            Unit::Piece => "piece",
        }
    }
}

impl fmt::Display for MassUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for VolumeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Unit {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        let unit = match normalized.as_str() {
            "g" | "gram" | "grams" | "gr" => Unit::Mass(MassUnit::G),
            "kg" | "kilogram" | "kilograms" => Unit::Mass(MassUnit::Kg),
            "mg" | "milligram" | "milligrams" => Unit::Mass(MassUnit::Mg),
            "oz" | "ounce" | "ounces" => Unit::Mass(MassUnit::Oz),
            "lb" | "lbs" | "pound" | "pounds" => Unit::Mass(MassUnit::Lb),
            "ml" | "milliliter" | "milliliters" | "millilitre" | "millilitres" => {
                Unit::Volume(VolumeUnit::Ml)
            }
            "l" | "liter" | "liters" | "litre" | "litres" => Unit::Volume(VolumeUnit::L),
            "tsp" | "teaspoon" | "teaspoons" => Unit::Volume(VolumeUnit::Tsp),
            "tbsp" | "tablespoon" | "tablespoons" => Unit::Volume(VolumeUnit::Tbsp),
            "cup" | "cups" => Unit::Volume(VolumeUnit::Cup),
            "fl oz" | "floz" | "fl_oz" | "fluid ounce" | "fluid ounces" => {
                Unit::Volume(VolumeUnit::FlOz)
            }
            "piece" | "pieces" | "pc" | "pcs" | "unit" | "units" | "item" | "items" => {
                Unit::Piece
            }
            _ => return Err(UnitError::UnsupportedUnit(s.to_string())),
        };
        Ok(unit)
    }
}

impl Serialize for Unit {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.symbol())
    }
}

impl<'de> Deserialize<'de> for Unit {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Convert a mass quantity to grams.
pub fn to_grams(quantity: f64, unit: MassUnit) -> f64 {
    quantity * unit.grams_per_unit()
}

/// Convert a volume quantity to milliliters.
pub fn to_milliliters(quantity: f64, unit: VolumeUnit) -> f64 {
    quantity * unit.ml_per_unit()
}

/// Convert a quantity to grams.
///
/// Volume units need `density_g_per_ml`. Piece units always fail here.
pub fn portion_to_grams(
    quantity: f64,
    unit: Unit,
    density_g_per_ml: Option<f64>,
) -> Result<f64, UnitError> {
    if !quantity.is_finite() || quantity < 0.0 {
        return Err(UnitError::InvalidQuantity(quantity));
    }

    match unit {
        Unit::Mass(m) => Ok(to_grams(quantity, m)),
        Unit::Volume(v) => {
            let density = density_g_per_ml
                .filter(|d| d.is_finite() && *d > 0.0)
                .ok_or(UnitError::MissingDensity(v))?;
            Ok(to_milliliters(quantity, v) * density)
        }
        Unit::Piece => Err(UnitError::PieceRequiresMapping),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mass_conversions() {
        assert_eq!(to_grams(150.0, MassUnit::G), 150.0);
        assert_eq!(to_grams(1.5, MassUnit::Kg), 1500.0);
        assert!((to_grams(250.0, MassUnit::Mg) - 0.25).abs() < 1e-12);
        let lb = to_grams(1.0, MassUnit::Lb);
        assert!((lb - 16.0 * to_grams(1.0, MassUnit::Oz)).abs() < 1e-9);
    }

    #[test]
    fn test_volume_conversions() {
        assert_eq!(to_milliliters(2.0, VolumeUnit::L), 2000.0);
        let tsp = to_milliliters(1.0, VolumeUnit::Tsp);
        let tbsp = to_milliliters(1.0, VolumeUnit::Tbsp);
        assert!((3.0 * tsp - tbsp).abs() < 1e-9);

        let cup = to_milliliters(1.0, VolumeUnit::Cup);
        let fl_oz = to_milliliters(1.0, VolumeUnit::FlOz);
        assert!((cup - 8.0 * fl_oz).abs() < 1e-9);
    }

    #[test]
    fn test_volume_needs_density() {
        let err = portion_to_grams(100.0, Unit::MILLILITER, None).unwrap_err();
        assert_eq!(err, UnitError::MissingDensity(VolumeUnit::Ml));

        let grams = portion_to_grams(100.0, Unit::MILLILITER, Some(1.03)).unwrap();
        assert!((grams - 103.0).abs() < 1e-9);
    }

    #[test]
    fn test_piece_always_fails() {
        assert_eq!(
            portion_to_grams(2.0, Unit::Piece, Some(1.0)),
            Err(UnitError::PieceRequiresMapping)
        );
    }

    #[test]
    fn test_negative_quantity_rejected() {
        assert!(matches!(
            portion_to_grams(-1.0, Unit::GRAM, None),
            Err(UnitError::InvalidQuantity(_))
        ));
    }

    #[test]
    fn test_parse_units() {
        assert_eq!("Grams".parse::<Unit>().unwrap(), Unit::GRAM);
        assert_eq!(
            "tbsp".parse::<Unit>().unwrap(),
            Unit::Volume(VolumeUnit::Tbsp)
        );
        assert_eq!("pcs".parse::<Unit>().unwrap(), Unit::Piece);
        assert!(matches!(
            "handful".parse::<Unit>(),
            Err(UnitError::UnsupportedUnit(_))
        ));
    }

    #[test]
    fn test_conversion_is_linear() {
        let one = portion_to_grams(1.0, Unit::Volume(VolumeUnit::Cup), Some(0.72)).unwrap();
        let three = portion_to_grams(3.0, Unit::Volume(VolumeUnit::Cup), Some(0.72)).unwrap();
        assert!((three - 3.0 * one).abs() < 1e-9);
    }
}
