use std::sync::Arc;

use anyhow::{Context, Result};
use catalog_core::{CatalogSession, DatasetLoader, HttpCatalogSource};
use clap::Parser;
use shared::domain::{FilterCriteria, ItemId, KNOWN_CATEGORIES};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod render;

use config::load_settings;

#[derive(Parser, Debug)]
#[command(name = "pokedex", about = "Search, filter and inspect the catalog")]
struct Args {
    /// Case-insensitive name substring.
    #[arg(long)]
    name: Option<String>,
    /// Minimum weight in tenths (hectograms). Non-numeric values are ignored.
    #[arg(long)]
    min_weight: Option<String>,
    /// Minimum height in tenths (decimetres). Non-numeric values are ignored.
    #[arg(long)]
    min_height: Option<String>,
    #[arg(long = "type")]
    category: Option<String>,
    /// One of name, id, weight, height.
    #[arg(long, default_value = "name")]
    sort: String,
    /// Id or name of an item to show in detail.
    #[arg(long)]
    show: Option<String>,
    #[arg(long)]
    base_url: Option<String>,
    #[arg(long)]
    limit: Option<u32>,
    /// Print the derived view as JSON.
    #[arg(long)]
    json: bool,
    #[arg(long)]
    list_types: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(base_url) = &args.base_url {
        settings.api_base_url = base_url.clone();
    }
    if let Some(limit) = args.limit {
        settings.listing_limit = limit;
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&settings.log_filter))
        .with_writer(std::io::stderr)
        .init();

    if args.list_types {
        println!("{}", KNOWN_CATEGORIES.join("\n"));
        return Ok(());
    }

    let source = match settings.request_timeout() {
        Some(timeout) => HttpCatalogSource::with_timeout(&settings.api_base_url, timeout)?,
        None => HttpCatalogSource::new(&settings.api_base_url)?,
    };
    let base_url = source.base_url().to_string();
    let loader = DatasetLoader::new(Arc::new(source)).with_limit(settings.listing_limit);
    info!(base_url = %base_url, limit = loader.limit(), "loading catalog");
    let session = CatalogSession::new(loader);

    session
        .reload()
        .await
        .context("failed to load the catalog")?;

    let criteria = FilterCriteria::from_inputs(
        args.name.as_deref().unwrap_or_default(),
        args.min_weight.as_deref().unwrap_or_default(),
        args.min_height.as_deref().unwrap_or_default(),
        args.category.as_deref().unwrap_or_default(),
        &args.sort,
    );
    let view = session.set_criteria(criteria.clone()).await;

    if let Some(target) = args.show.as_deref() {
        let found = match target.trim().parse::<i64>() {
            Ok(id) => session.select(ItemId(id)).await,
            Err(_) => session.select_by_name(target).await,
        };
        found.with_context(|| format!("no item matches '{target}'"))?;
        if let Some(item) = session.selected().await {
            print!("{}", render::detail(&item));
        }
        return Ok(());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        let total = session.dataset().await.len();
        print!("{}", render::listing(&view, &criteria, total));
    }

    Ok(())
}
