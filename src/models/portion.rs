use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SwapError};
use crate::units::Unit;

/// A quantity of food in some unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Portion {
    pub quantity: f64,
    pub unit: Unit,
}

impl Portion {
    /// Validated constructor: quantity must be finite and non-negative.
    pub fn new(quantity: f64, unit: Unit) -> Result<Self> {
        let portion = Self { quantity, unit };
        portion.validate()?;
        Ok(portion)
    }

    pub fn grams(quantity: f64) -> Self {
        Self {
            quantity,
            unit: Unit::GRAM,
        }
    }

    pub fn milliliters(quantity: f64) -> Self {
        Self {
            quantity,
            unit: Unit::MILLILITER,
        }
    }

    pub fn pieces(quantity: f64) -> Self {
        Self {
            quantity,
            unit: Unit::Piece,
        }
    }

    /// Parse a quantity and a unit string, as typed on a command line.
    pub fn parse(quantity: f64, unit: &str) -> Result<Self> {
        let unit: Unit = unit.parse()?;
        Self::new(quantity, unit)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.quantity.is_finite() || self.quantity < 0.0 {
            return Err(SwapError::Validation(format!(
                "portion quantity must be a non-negative number, got {}",
                self.quantity
            )));
        }
        Ok(())
    }

    /// Same unit, quantity multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            quantity: self.quantity * factor,
            unit: self.unit,
        }
    }
}

impl fmt::Display for Portion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} {}", self.quantity, self.unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_negative() {
        assert!(Portion::new(-5.0, Unit::GRAM).is_err());
        assert!(Portion::new(f64::INFINITY, Unit::GRAM).is_err());
        assert!(Portion::new(0.0, Unit::GRAM).is_ok());
    }

    #[test]
    fn test_parse_unknown_unit_is_conversion_error() {
        let err = Portion::parse(1.0, "handful").unwrap_err();
        assert!(matches!(err, SwapError::UnitConversion(_)));
    }

    #[test]
    fn test_serde_uses_unit_symbol() {
        let json = serde_json::to_string(&Portion::pieces(2.0)).unwrap();
        assert_eq!(json, r#"{"quantity":2.0,"unit":"piece"}"#);

        let parsed: Portion = serde_json::from_str(r#"{"quantity":1,"unit":"cups"}"#).unwrap();
        assert_eq!(parsed.unit.symbol(), "cup");
    }
}
