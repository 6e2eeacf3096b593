//! Open Food Facts compatible HTTP catalog.
//!
//! Search goes through `/cgi/search.pl`, single products through
//! `/api/v2/product/{code}.json`. Products without a name or an energy value
//! are dropped; everything else is mapped per 100 g.

use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use reqwest::StatusCode;
use serde::{Deserialize, Deserializer};
use tracing::debug;

use crate::error::{Result, SwapError};
use crate::models::allergens::categories_for_term;
use crate::models::{FoodItem, FoodMetadata, FoodSource, MacroProfile};
use crate::resolver::source::{EXTERNAL_ID_PREFIX, ExternalCatalog};

const SOURCE_NAME: &str = "openfoodfacts";
const SEARCH_FIELDS: &str =
    "code,product_name,nutriments,categories_tags,allergens_tags,last_modified_t";

/// Confidence for a product that only has a name and energy.
const BASE_CONFIDENCE: f64 = 0.5;
const CONFIDENCE_PER_MACRO: f64 = 0.1;
const CONFIDENCE_PER_EXTRA: f64 = 0.05;

#[derive(Debug, Clone)]
pub struct OpenFoodFactsConfig {
    pub base_url: String,
    pub page_size: u32,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for OpenFoodFactsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://world.openfoodfacts.org".to_string(),
            page_size: 20,
            request_timeout: Duration::from_secs(5),
            user_agent: concat!("food_swap_rs/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    products: Vec<Product>,
}

#[derive(Debug, Deserialize)]
struct ProductResponse {
    #[serde(default)]
    status: i64,
    product: Option<Product>,
}

#[derive(Debug, Deserialize)]
struct Product {
    #[serde(default)]
    code: String,
    product_name: Option<String>,
    #[serde(default)]
    nutriments: Nutriments,
    #[serde(default)]
    categories_tags: Vec<String>,
    #[serde(default)]
    allergens_tags: Vec<String>,
    last_modified_t: Option<i64>,
}

/// Nutriment values; upstream sends numbers or numeric strings.
#[derive(Debug, Default, Deserialize)]
struct Nutriments {
    #[serde(rename = "energy-kcal_100g", default, deserialize_with = "lenient_f64")]
    energy_kcal_100g: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    proteins_100g: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    carbohydrates_100g: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    fat_100g: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    fiber_100g: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    sugars_100g: Option<f64>,
}

fn lenient_f64<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<f64>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Strip the `en:` style language prefix from a taxonomy tag.
fn strip_language(tag: &str) -> &str {
    tag.split_once(':').map_or(tag, |(_, rest)| rest)
}

impl Product {
    fn into_food(self, source: FoodSource) -> Option<FoodItem> {
        let name = self.product_name.filter(|n| !n.trim().is_empty())?;
        let kcal = self.nutriments.energy_kcal_100g?;
        if self.code.is_empty() {
            return None;
        }

        let n = &self.nutriments;
        let present_macros = [n.proteins_100g, n.carbohydrates_100g, n.fat_100g]
            .iter()
            .filter(|v| v.is_some())
            .count();
        let present_extras = [n.fiber_100g, n.sugars_100g]
            .iter()
            .filter(|v| v.is_some())
            .count();
        let confidence = BASE_CONFIDENCE
            + CONFIDENCE_PER_MACRO * present_macros as f64
            + CONFIDENCE_PER_EXTRA * present_extras as f64;

        let macros = MacroProfile {
            calories_kcal: kcal,
            protein_g: n.proteins_100g.unwrap_or(0.0),
            carbs_g: n.carbohydrates_100g.unwrap_or(0.0),
            fat_g: n.fat_100g.unwrap_or(0.0),
            fiber_g: n.fiber_100g,
            sugar_g: n.sugars_100g,
        };

        let allergens: Vec<String> = self
            .allergens_tags
            .iter()
            .map(|tag| strip_language(tag))
            .flat_map(|term| {
                let mapped = categories_for_term(term);
                if mapped.is_empty() {
                    vec![term.to_string()]
                } else {
                    mapped.into_iter().map(str::to_string).collect()
                }
            })
            .collect();

        let mut metadata = FoodMetadata::new(source, confidence);
        metadata.barcode = Some(self.code.clone());
        metadata.last_updated = self
            .last_modified_t
            .and_then(|t| DateTime::from_timestamp(t, 0));

        Some(
            FoodItem::per_100g(format!("{EXTERNAL_ID_PREFIX}{}", self.code), name, macros)
                .with_tags(self.categories_tags.iter().map(|t| strip_language(t)))
                .with_allergens(allergens)
                .with_metadata(metadata),
        )
    }
}

/// HTTP client for an Open Food Facts compatible API.
pub struct OpenFoodFactsClient {
    config: OpenFoodFactsConfig,
    http_client: reqwest::Client,
}

impl OpenFoodFactsClient {
    pub fn new(config: OpenFoodFactsConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| SwapError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            config,
            http_client,
        })
    }

    fn unavailable(message: impl Into<String>) -> SwapError {
        SwapError::unavailable(SOURCE_NAME, message)
    }

    async fn fetch_product(&self, code: &str, source: FoodSource) -> Result<Option<FoodItem>> {
        let code = code.trim();
        if code.is_empty() || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Ok(None);
        }

        let url = format!("{}/api/v2/product/{code}.json", self.config.base_url);
        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| Self::unavailable(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::unavailable(format!("HTTP {}", response.status())));
        }

        let body: ProductResponse = response
            .json()
            .await
            .map_err(|e| Self::unavailable(format!("JSON parse error: {e}")))?;

        Ok(parse_product_response(body, source))
    }
}

fn parse_product_response(body: ProductResponse, source: FoodSource) -> Option<FoodItem> {
    if body.status != 1 {
        return None;
    }
    body.product.and_then(|p| p.into_food(source))
}

fn parse_search_response(body: SearchResponse) -> Vec<FoodItem> {
    let total = body.products.len();
    let foods: Vec<FoodItem> = body
        .products
        .into_iter()
        .filter_map(|p| p.into_food(FoodSource::ExternalCatalog))
        .collect();
    if foods.len() < total {
        debug!(dropped = total - foods.len(), "dropped incomplete products");
    }
    foods
}

#[async_trait]
impl ExternalCatalog for OpenFoodFactsClient {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn search(&self, query: &str, page: u32) -> Result<Vec<FoodItem>> {
        let url = format!("{}/cgi/search.pl", self.config.base_url);
        let page = page.max(1).to_string();
        let page_size = self.config.page_size.to_string();
        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("search_terms", query),
                ("page", page.as_str()),
                ("page_size", page_size.as_str()),
                ("fields", SEARCH_FIELDS),
                ("json", "1"),
            ])
            .send()
            .await
            .map_err(|e| Self::unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::unavailable(format!("HTTP {}", response.status())));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| Self::unavailable(format!("JSON parse error: {e}")))?;

        Ok(parse_search_response(body))
    }

    async fn get_by_id(&self, code: &str) -> Result<Option<FoodItem>> {
        self.fetch_product(code, FoodSource::ExternalCatalog).await
    }

    async fn get_by_barcode(&self, code: &str) -> Result<Option<FoodItem>> {
        self.fetch_product(code, FoodSource::ExternalBarcode).await
    }

    async fn test_connectivity(&self) -> bool {
        let url = format!("{}/api/v2/search", self.config.base_url);
        match self
            .http_client
            .get(&url)
            .query(&[("page_size", "1"), ("fields", "code")])
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!(error = %e, "connectivity check failed");
                false
            }
        }
    }
}
