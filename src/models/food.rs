use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::allergens::classify_allergens;
use crate::models::{MacroProfile, Portion};

/// Where a food record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoodSource {
    Local,
    ExternalCatalog,
    ExternalBarcode,
    UserContributed,
}

impl FoodSource {
    pub fn label(self) -> &'static str {
        match self {
            FoodSource::Local => "local catalog",
            FoodSource::ExternalCatalog => "external catalog",
            FoodSource::ExternalBarcode => "barcode lookup",
            FoodSource::UserContributed => "user contributed",
        }
    }
}

impl fmt::Display for FoodSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodMetadata {
    pub source: FoodSource,
    /// Data-quality score in [0, 1].
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl FoodMetadata {
    pub fn new(source: FoodSource, confidence: f64) -> Self {
        Self {
            source,
            confidence: confidence.clamp(0.0, 1.0),
            barcode: None,
            last_updated: None,
        }
    }
}

/// A food record with macros defined for a base portion.
///
/// Immutable once built: the builder methods consume `self`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodItem {
    pub id: String,
    pub name: String,
    pub base_portion: Portion,
    pub macros_per_base: MacroProfile,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub density_g_per_ml: Option<f64>,
    /// Food-specific piece mapping.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grams_per_piece: Option<f64>,
    #[serde(default)]
    pub category_tags: Vec<String>,
    #[serde(default)]
    pub allergen_tags: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<FoodMetadata>,
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

impl FoodItem {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        base_portion: Portion,
        macros_per_base: MacroProfile,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            base_portion,
            macros_per_base,
            density_g_per_ml: None,
            grams_per_piece: None,
            category_tags: Vec::new(),
            allergen_tags: BTreeSet::new(),
            metadata: None,
        }
        .classified()
    }

    /// Macros defined per 100 g.
    pub fn per_100g(
        id: impl Into<String>,
        name: impl Into<String>,
        macros_per_base: MacroProfile,
    ) -> Self {
        Self::new(id, name, Portion::grams(100.0), macros_per_base)
    }

    /// Macros defined per 100 ml.
    pub fn per_100ml(
        id: impl Into<String>,
        name: impl Into<String>,
        macros_per_base: MacroProfile,
    ) -> Self {
        Self::new(id, name, Portion::milliliters(100.0), macros_per_base)
    }

    pub fn with_density(mut self, density_g_per_ml: f64) -> Self {
        self.density_g_per_ml = Some(density_g_per_ml);
        self
    }

    pub fn with_piece_grams(mut self, grams_per_piece: f64) -> Self {
        self.grams_per_piece = Some(grams_per_piece);
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.category_tags
            .extend(tags.into_iter().map(|t| t.into().to_lowercase()));
        self.classified()
    }

    /// Merge allergen tags reported by the source.
    pub fn with_allergens<I, S>(mut self, allergens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allergen_tags
            .extend(allergens.into_iter().map(|a| a.into().to_lowercase()));
        self
    }

    pub fn with_metadata(mut self, metadata: FoodMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Add allergen categories derived from the name and category tags.
    pub fn classified(mut self) -> Self {
        let derived = classify_allergens(&self.name, &self.category_tags);
        self.allergen_tags.extend(derived);
        self
    }

    /// Source of the record; records without metadata are local.
    pub fn source(&self) -> FoodSource {
        self.metadata
            .as_ref()
            .map(|m| m.source)
            .unwrap_or(FoodSource::Local)
    }

    /// Confidence of the record; records without metadata are trusted.
    pub fn confidence(&self) -> f64 {
        self.metadata.as_ref().map(|m| m.confidence).unwrap_or(1.0)
    }

    pub fn barcode(&self) -> Option<&str> {
        self.metadata.as_ref().and_then(|m| m.barcode.as_deref())
    }

    /// Canonical key for deduplication (see [`name_key`]).
    pub fn key(&self) -> String {
        name_key(&self.name)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.category_tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    /// Basic validation: finite non-negative macros and a usable base portion.
    pub fn is_valid(&self) -> bool {
        !self.id.is_empty()
            && self.macros_per_base.is_valid()
            && self.base_portion.quantity.is_finite()
            && self.base_portion.quantity > 0.0
            && self.density_g_per_ml.is_none_or(is_positive)
            && self.grams_per_piece.is_none_or(is_positive)
            && (0.0..=1.0).contains(&self.confidence())
    }

    /// Debug string for logging.
    pub fn debug_string(&self) -> String {
        format!(
            "{} ({}): {} per {}, source: {}",
            self.name,
            self.id,
            self.macros_per_base.debug_string(),
            self.base_portion,
            self.source()
        )
    }
}

/// Lower-cased name with every non-alphanumeric character removed.
pub fn name_key(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect()
}
