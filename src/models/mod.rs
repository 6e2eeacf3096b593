pub mod allergens;
mod food;
mod macros;
mod plan;
mod portion;
mod substitution;

pub use food::{FoodItem, FoodMetadata, FoodSource, name_key};
pub use macros::MacroProfile;
pub use plan::{DayMacros, Degradation, MealItemInput, MealReport};
pub use portion::Portion;
pub use substitution::{
    Budget, MacroComparison, ScoreBreakdown, SubstitutionCandidate, SubstitutionConstraints,
    SubstitutionMetadata, SubstitutionResult, UserPreferences,
};
