use clap::{Args, Parser, Subcommand};

use crate::models::Budget;

/// food_swap: macro totals and macro-equivalent food substitutions.
#[derive(Parser, Debug)]
#[command(name = "food_swap")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Extra local catalog (JSON or CSV) merged over the curated one.
    #[arg(long, global = true, env = "FOOD_SWAP_CATALOG")]
    pub catalog: Option<String>,

    /// Base URL of an Open Food Facts compatible API; enables the external catalog.
    #[arg(long, global = true, env = "FOOD_SWAP_EXTERNAL_URL")]
    pub external_url: Option<String>,

    /// Disable the local catalog.
    #[arg(long, global = true)]
    pub no_local: bool,

    /// Per-source timeout for external calls, in milliseconds.
    #[arg(long, global = true, default_value_t = 3000)]
    pub timeout_ms: u64,

    /// Lifetime of cached lookups, in seconds.
    #[arg(long, global = true, default_value_t = 300)]
    pub cache_ttl_secs: u64,

    /// Print results as JSON.
    #[arg(long, global = true)]
    pub json: bool,

    /// Debug logging (RUST_LOG overrides).
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// A food and an amount of it.
#[derive(Args, Debug, Clone)]
pub struct PortionArgs {
    /// Food id, e.g. `chicken_breast_cooked` or `off:3017620422003`.
    pub food_id: String,

    pub quantity: f64,

    /// Unit: g, kg, mg, oz, lb, ml, l, tsp, tbsp, cup, fl oz, piece.
    #[arg(default_value = "g")]
    pub unit: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Macros for one portion of a food.
    Macros(PortionArgs),

    /// Per-meal and day totals for a JSON meal plan (a list of meals, each a
    /// list of `{"food_id", "portion": {"quantity", "unit"}}`).
    Plan {
        file: String,
    },

    /// Suggest substitutions for a portion of a food.
    Swap {
        #[command(flatten)]
        portion: PortionArgs,

        /// Maximum mean macro deviation, in percent.
        #[arg(short, long, default_value_t = 5.0)]
        tolerance: f64,

        #[arg(short, long, default_value_t = 10)]
        max: usize,

        #[arg(long, default_value_t = 0.7)]
        min_confidence: f64,

        /// Allergy to exclude (repeatable).
        #[arg(long = "allergy")]
        allergies: Vec<String>,

        /// Disliked food name fragment (repeatable).
        #[arg(long = "dislike")]
        dislikes: Vec<String>,

        /// Preferred cuisine (repeatable).
        #[arg(long)]
        cuisine: Vec<String>,

        /// Dietary restriction, e.g. vegan, gluten_free (repeatable).
        #[arg(long = "diet")]
        dietary_restrictions: Vec<String>,

        /// low, medium or high.
        #[arg(long)]
        budget: Option<Budget>,

        /// Also consider external catalog matches.
        #[arg(long)]
        include_external: bool,
    },

    /// Search every enabled source.
    Search {
        query: String,

        #[arg(long, default_value_t = 1)]
        page: u32,
    },

    /// Look up a packaged food by barcode.
    Barcode {
        code: String,
    },

    /// Check that the external catalog answers.
    Ping,
}
