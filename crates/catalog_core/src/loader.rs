use std::{collections::HashSet, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::future::join_all;
use reqwest::Client;
use shared::{
    domain::{Item, ItemId, Reference, LISTING_CAP},
    error::LoadError,
    protocol::{DetailPayload, ListingResponse},
};
use tracing::{debug, info, warn};
use url::Url;

pub const DEFAULT_API_BASE_URL: &str = "https://pokeapi.co/api/v2";

/// Network seam of the loader: one listing call plus one detail call per reference.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_listing(&self, limit: u32) -> Result<Vec<Reference>>;
    async fn fetch_detail(&self, reference: &Reference) -> Result<DetailPayload>;
}

pub struct HttpCatalogSource {
    http: Client,
    base_url: String,
}

impl HttpCatalogSource {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build catalog HTTP client")?;
        Self::with_client(http, base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Result<Self> {
        Ok(Self {
            http,
            base_url: normalize_base_url(base_url)?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn listing_url(&self, limit: u32) -> String {
        format!("{}/pokemon?limit={limit}", self.base_url)
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    async fn fetch_listing(&self, limit: u32) -> Result<Vec<Reference>> {
        let url = self.listing_url(limit);
        let res = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("failed to reach listing endpoint '{url}'"))?
            .error_for_status()
            .with_context(|| format!("listing endpoint '{url}' rejected the request"))?;
        let body: ListingResponse = res
            .json()
            .await
            .with_context(|| format!("malformed listing body from '{url}'"))?;
        Ok(body.results)
    }

    async fn fetch_detail(&self, reference: &Reference) -> Result<DetailPayload> {
        let res = self
            .http
            .get(&reference.url)
            .send()
            .await
            .with_context(|| format!("failed to reach detail endpoint '{}'", reference.url))?
            .error_for_status()?;
        res.json()
            .await
            .with_context(|| format!("malformed detail body for '{}'", reference.name))
    }
}

/// Trims whitespace and trailing slashes, then checks the result is an absolute URL.
pub fn normalize_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    Url::parse(trimmed).with_context(|| format!("invalid catalog base url '{raw}'"))?;
    Ok(trimmed.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    pub requested: usize,
    pub loaded: usize,
}

impl LoadReport {
    pub fn dropped(&self) -> usize {
        self.requested.saturating_sub(self.loaded)
    }
}

#[derive(Clone)]
pub struct DatasetLoader {
    source: Arc<dyn CatalogSource>,
    limit: u32,
}

impl DatasetLoader {
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        Self {
            source,
            limit: LISTING_CAP,
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub async fn load(&self) -> std::result::Result<Vec<Item>, LoadError> {
        self.load_with_report().await.map(|(items, _)| items)
    }

    /// Runs one listing fetch, then every detail fetch at once, and keeps the
    /// records that came back well formed.
    pub async fn load_with_report(
        &self,
    ) -> std::result::Result<(Vec<Item>, LoadReport), LoadError> {
        let mut references = self.source.fetch_listing(self.limit).await.map_err(|error| {
            let message = format!("{error:#}");
            warn!(error = %message, "catalog listing failed");
            LoadError::listing_unavailable(message)
        })?;
        // The cap holds even when the endpoint ignores `limit`.
        references.truncate(self.limit as usize);

        let requested = references.len();
        debug!(requested, "fetching item details");

        let settled = join_all(
            references
                .iter()
                .map(|reference| self.fetch_item(reference)),
        )
        .await;
        let items = dedup_by_id(settled.into_iter().flatten());

        let report = LoadReport {
            requested,
            loaded: items.len(),
        };
        info!(
            requested,
            loaded = report.loaded,
            dropped = report.dropped(),
            "catalog load finished"
        );
        Ok((items, report))
    }

    async fn fetch_item(&self, reference: &Reference) -> Option<Item> {
        match self.source.fetch_detail(reference).await {
            Ok(payload) => Some(normalize_detail(payload)),
            Err(error) => {
                let message = format!("{error:#}");
                warn!(
                    name = %reference.name,
                    url = %reference.url,
                    error = %message,
                    "dropping item whose detail fetch failed"
                );
                None
            }
        }
    }
}

fn dedup_by_id(items: impl Iterator<Item = Item>) -> Vec<Item> {
    let mut seen = HashSet::new();
    items
        .filter(|item| {
            let fresh = seen.insert(item.id);
            if !fresh {
                warn!(id = item.id.0, name = %item.name, "dropping duplicate item id");
            }
            fresh
        })
        .collect()
}

pub fn normalize_detail(payload: DetailPayload) -> Item {
    let image = payload.sprites.preferred_image().map(str::to_string);
    Item {
        id: ItemId(payload.id),
        name: payload.name,
        weight: payload.weight,
        height: payload.height,
        categories: unique_labels(payload.types.into_iter().map(|slot| slot.kind.name)),
        abilities: unique_labels(payload.abilities.into_iter().map(|slot| slot.ability.name)),
        stats: payload
            .stats
            .into_iter()
            .map(|slot| (slot.stat.name, slot.base_stat))
            .collect(),
        image,
    }
}

fn unique_labels(labels: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    labels.filter(|label| seen.insert(label.clone())).collect()
}

#[cfg(test)]
#[path = "tests/loader_tests.rs"]
mod tests;
