use async_trait::async_trait;

use crate::error::Result;
use crate::models::FoodItem;

/// Id prefix for foods resolved through the external catalog.
pub const EXTERNAL_ID_PREFIX: &str = "off:";
/// Id prefix that routes a lookup to the barcode endpoint.
pub const BARCODE_ID_PREFIX: &str = "barcode:";

/// An external food database reachable over the network.
///
/// Every returned `FoodItem` must carry `metadata` with its source and a
/// confidence. Implementations report transport or upstream failures as
/// `SwapError::DataSourceUnavailable`; "not found" is `Ok(None)`.
#[async_trait]
pub trait ExternalCatalog: Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &str;

    /// Free-text search, 1-based pages.
    async fn search(&self, query: &str, page: u32) -> Result<Vec<FoodItem>>;

    /// Lookup by the catalog's own id (without the `off:` prefix).
    async fn get_by_id(&self, code: &str) -> Result<Option<FoodItem>>;

    async fn get_by_barcode(&self, code: &str) -> Result<Option<FoodItem>>;

    async fn test_connectivity(&self) -> bool;
}
