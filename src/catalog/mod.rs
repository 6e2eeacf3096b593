mod local;
mod persistence;
pub mod seed;

pub use local::{FUZZY_MATCH_THRESHOLD, LocalCatalog};
pub use persistence::{load_catalog, save_catalog};
