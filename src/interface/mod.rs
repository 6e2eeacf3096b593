pub mod render;

pub use render::{
    display_day, display_food, display_food_list, display_macros, display_substitutions,
    format_macros,
};
