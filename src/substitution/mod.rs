pub mod constants;
mod engine;
pub mod filters;
pub mod rerank;
pub mod scoring;

pub use engine::{EngineConfig, SubstitutionEngine};
pub use rerank::{RerankEntry, RerankItem, RerankRequest, RerankResponse, Reranker};
