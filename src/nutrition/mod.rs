pub mod calculations;

pub use calculations::{
    compute_day_macros, compute_item_macros, compute_meal_macros, compute_meal_report,
    grams_for_portion, macros_for_portion, portion_ratio, try_compute_item_macros,
};
