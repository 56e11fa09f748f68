//! tg-store catalog check.
//!
//! Loads configuration from the environment, then fetches the category list
//! and the first catalog page through the same stores the Mini-App uses.
//! Useful for checking gateway credentials and connectivity.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use tg_store_storefront::config::StorefrontConfig;
use tg_store_storefront::state::AppState;
use tg_store_storefront::telemetry;

#[tokio::main]
#[allow(clippy::print_stdout, clippy::print_stderr)]
async fn main() -> ExitCode {
    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let _sentry_guard = telemetry::init(&config);
    let state = AppState::new(config);

    let categories = match state.catalog().fetch_categories().await {
        Ok(categories) => categories,
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch categories");
            return ExitCode::FAILURE;
        }
    };
    let products = match state.catalog().fetch_all().await {
        Ok(products) => products,
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch products");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(
        categories = categories.len(),
        products = products.len(),
        has_more = state.catalog().has_more(),
        "Catalog reachable"
    );
    for product in &products {
        println!(
            "{:<40} {:>14}  stock {}",
            product.name,
            product.price.to_string(),
            product.quantity
        );
    }

    ExitCode::SUCCESS
}
