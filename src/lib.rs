pub mod catalog;
pub mod cli;
pub mod error;
pub mod interface;
pub mod models;
pub mod nutrition;
pub mod resolver;
pub mod substitution;
pub mod units;

pub use error::{Result, SwapError};
pub use models::{FoodItem, MacroProfile, Portion, SubstitutionConstraints, SubstitutionResult};
pub use resolver::{FoodResolver, ResolverConfig};
pub use substitution::{EngineConfig, SubstitutionEngine};
