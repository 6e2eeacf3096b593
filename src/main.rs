use std::fs;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use food_swap_rs::catalog::{LocalCatalog, load_catalog};
use food_swap_rs::cli::{Cli, Command, PortionArgs};
use food_swap_rs::error::{Result, SwapError};
use food_swap_rs::interface::{
    display_day, display_food, display_food_list, display_macros, display_substitutions,
};
use food_swap_rs::models::{MealItemInput, Portion, SubstitutionConstraints, UserPreferences};
use food_swap_rs::nutrition::{compute_day_macros, try_compute_item_macros};
use food_swap_rs::resolver::{
    FoodResolver, OpenFoodFactsClient, OpenFoodFactsConfig, ResolverConfig,
};
use food_swap_rs::substitution::SubstitutionEngine;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let resolver = Arc::new(build_resolver(&cli)?);
    let json = cli.json;

    match cli.command {
        Command::Macros(args) => cmd_macros(&resolver, &args, json).await,
        Command::Plan { file } => cmd_plan(&resolver, &file, json).await,
        Command::Swap {
            portion,
            tolerance,
            max,
            min_confidence,
            allergies,
            dislikes,
            cuisine,
            dietary_restrictions,
            budget,
            include_external,
        } => {
            let constraints = SubstitutionConstraints {
                macro_tolerance_percent: tolerance,
                max_suggestions: max,
                min_confidence,
                preferences: Some(UserPreferences {
                    allergies,
                    dislikes,
                    cuisine,
                    budget,
                    dietary_restrictions,
                }),
                include_external_sources: include_external,
            };
            cmd_swap(resolver, &portion, constraints, json).await
        }
        Command::Search { query, page } => cmd_search(&resolver, &query, page, json).await,
        Command::Barcode { code } => cmd_barcode(&resolver, &code, json).await,
        Command::Ping => cmd_ping(&resolver).await,
    }
}

/// Wire the resolver from command-line and environment configuration.
fn build_resolver(cli: &Cli) -> Result<FoodResolver> {
    let config = ResolverConfig {
        enable_local: !cli.no_local,
        source_timeout: Duration::from_millis(cli.timeout_ms),
        cache_ttl: Duration::from_secs(cli.cache_ttl_secs),
        ..ResolverConfig::default()
    };
    let source_timeout = config.source_timeout;
    let mut resolver = FoodResolver::new(config);

    if !cli.no_local {
        let mut catalog = LocalCatalog::curated();
        if let Some(path) = &cli.catalog {
            let extra = load_catalog(path)?;
            info!(path = %path, foods = extra.len(), "merged extra catalog");
            for food in extra {
                catalog.insert(food);
            }
        }
        resolver = resolver.with_local(catalog);
    }

    if let Some(url) = &cli.external_url {
        let client = OpenFoodFactsClient::new(OpenFoodFactsConfig {
            base_url: url.trim_end_matches('/').to_string(),
            request_timeout: source_timeout,
            ..OpenFoodFactsConfig::default()
        })?;
        resolver = resolver.with_external(Arc::new(client));
    }

    Ok(resolver)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_portion(args: &PortionArgs) -> Result<Portion> {
    Portion::parse(args.quantity, &args.unit)
}

/// Macros for a single portion.
async fn cmd_macros(resolver: &FoodResolver, args: &PortionArgs, json: bool) -> Result<()> {
    let portion = parse_portion(args)?;
    let macros = try_compute_item_macros(resolver, &args.food_id, &portion).await?;

    if json {
        return print_json(&macros);
    }
    display_macros(&format!("{} {}", portion, args.food_id), &macros);
    Ok(())
}

/// Day totals for a JSON meal plan file.
async fn cmd_plan(resolver: &FoodResolver, file: &str, json: bool) -> Result<()> {
    let content = fs::read_to_string(file)?;
    let meals: Vec<Vec<MealItemInput>> = serde_json::from_str(&content)?;
    if meals.is_empty() {
        return Err(SwapError::Validation(format!("{file} contains no meals")));
    }

    let day = compute_day_macros(resolver, &meals).await;

    if json {
        return print_json(&day);
    }
    display_day(&day);
    Ok(())
}

/// Substitutions for a portion of a food.
async fn cmd_swap(
    resolver: Arc<FoodResolver>,
    args: &PortionArgs,
    constraints: SubstitutionConstraints,
    json: bool,
) -> Result<()> {
    let portion = parse_portion(args)?;
    let engine = SubstitutionEngine::new(resolver);
    let result = engine
        .find_substitutions(&args.food_id, portion, Some(constraints))
        .await?;

    if json {
        return print_json(&result);
    }
    display_substitutions(&result);
    Ok(())
}

async fn cmd_search(resolver: &FoodResolver, query: &str, page: u32, json: bool) -> Result<()> {
    let foods = resolver.search(query, page).await?;

    if json {
        return print_json(&foods);
    }
    display_food_list(&foods, &format!("Results for \"{query}\" (page {page})"));
    Ok(())
}

async fn cmd_barcode(resolver: &FoodResolver, code: &str, json: bool) -> Result<()> {
    let food = resolver
        .get_by_barcode(code)
        .await?
        .ok_or_else(|| SwapError::NotFound(format!("barcode {code}")))?;

    if json {
        return print_json(&food);
    }
    display_food(&food);
    Ok(())
}

async fn cmd_ping(resolver: &FoodResolver) -> Result<()> {
    if !resolver.has_external() {
        return Err(SwapError::Config(
            "no external catalog configured (set --external-url or FOOD_SWAP_EXTERNAL_URL)"
                .to_string(),
        ));
    }

    let sources = resolver.enabled_sources().join(", ");
    if resolver.test_connectivity().await {
        println!("External catalog reachable. Enabled sources: {sources}");
        Ok(())
    } else {
        Err(SwapError::unavailable("external", "connectivity check failed"))
    }
}
