use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use shared::{
    domain::{FilterCriteria, Item, ItemId},
    error::LoadError,
};
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info};

use crate::{
    loader::{DatasetLoader, LoadReport},
    projector::project,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Idle,
    Loading,
    Ready,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Published(LoadReport),
    /// A newer load cycle started before this one settled; its result was discarded.
    Superseded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogEvent {
    Loading,
    Loaded(LoadReport),
    LoadFailed(String),
    ViewChanged { shown: usize, total: usize },
    SelectionChanged(Option<ItemId>),
}

struct SessionState {
    dataset: Arc<Vec<Item>>,
    criteria: FilterCriteria,
    selected: Option<ItemId>,
    status: LoadStatus,
}

/// Owns the published dataset together with the criteria and selection applied to it.
pub struct CatalogSession {
    loader: DatasetLoader,
    generation: AtomicU64,
    inner: RwLock<SessionState>,
    events: broadcast::Sender<CatalogEvent>,
}

impl CatalogSession {
    pub fn new(loader: DatasetLoader) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            loader,
            generation: AtomicU64::new(0),
            inner: RwLock::new(SessionState {
                dataset: Arc::new(Vec::new()),
                criteria: FilterCriteria::default(),
                selected: None,
                status: LoadStatus::Idle,
            }),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<CatalogEvent> {
        self.events.subscribe()
    }

    /// Runs a load cycle and publishes its dataset unless a newer cycle has started
    /// meanwhile. A listing failure leaves the published dataset as it was.
    pub async fn reload(&self) -> Result<LoadOutcome, LoadError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.write().await.status = LoadStatus::Loading;
        let _ = self.events.send(CatalogEvent::Loading);

        let result = self.loader.load_with_report().await;

        let mut inner = self.inner.write().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(generation, "discarding superseded load cycle");
            return Ok(LoadOutcome::Superseded);
        }

        match result {
            Ok((items, report)) => {
                inner.dataset = Arc::new(items);
                inner.status = LoadStatus::Ready;
                let lost_selection = inner
                    .selected
                    .is_some_and(|id| !inner.dataset.iter().any(|item| item.id == id));
                if lost_selection {
                    inner.selected = None;
                }
                let total = inner.dataset.len();
                let shown = project(&inner.dataset, &inner.criteria).len();
                drop(inner);

                info!(generation, total, shown, "published catalog dataset");
                let _ = self.events.send(CatalogEvent::Loaded(report));
                if lost_selection {
                    let _ = self.events.send(CatalogEvent::SelectionChanged(None));
                }
                let _ = self.events.send(CatalogEvent::ViewChanged { shown, total });
                Ok(LoadOutcome::Published(report))
            }
            Err(error) => {
                inner.status = LoadStatus::Failed(error.to_string());
                drop(inner);
                let _ = self.events.send(CatalogEvent::LoadFailed(error.to_string()));
                Err(error)
            }
        }
    }

    pub async fn dataset(&self) -> Arc<Vec<Item>> {
        Arc::clone(&self.inner.read().await.dataset)
    }

    pub async fn status(&self) -> LoadStatus {
        self.inner.read().await.status.clone()
    }

    pub async fn criteria(&self) -> FilterCriteria {
        self.inner.read().await.criteria.clone()
    }

    pub async fn view(&self) -> Vec<Item> {
        let inner = self.inner.read().await;
        project(&inner.dataset, &inner.criteria)
    }

    pub async fn set_criteria(&self, criteria: FilterCriteria) -> Vec<Item> {
        let (view, total) = {
            let mut inner = self.inner.write().await;
            inner.criteria = criteria;
            (project(&inner.dataset, &inner.criteria), inner.dataset.len())
        };
        let _ = self.events.send(CatalogEvent::ViewChanged {
            shown: view.len(),
            total,
        });
        view
    }

    pub async fn clear_filters(&self) -> Vec<Item> {
        self.set_criteria(FilterCriteria::cleared()).await
    }

    /// Opens the detail view for `id`. Unknown ids leave the selection unchanged.
    pub async fn select(&self, id: ItemId) -> Option<Item> {
        let item = {
            let mut inner = self.inner.write().await;
            let item = inner.dataset.iter().find(|item| item.id == id).cloned()?;
            inner.selected = Some(id);
            item
        };
        let _ = self.events.send(CatalogEvent::SelectionChanged(Some(id)));
        Some(item)
    }

    pub async fn select_by_name(&self, name: &str) -> Option<Item> {
        let wanted = name.trim().to_lowercase();
        let id = self
            .inner
            .read()
            .await
            .dataset
            .iter()
            .find(|item| item.name.to_lowercase() == wanted)
            .map(|item| item.id)?;
        self.select(id).await
    }

    pub async fn selected(&self) -> Option<Item> {
        let inner = self.inner.read().await;
        let id = inner.selected?;
        inner.dataset.iter().find(|item| item.id == id).cloned()
    }

    pub async fn close_detail(&self) {
        let previous = self.inner.write().await.selected.take();
        if previous.is_some() {
            let _ = self.events.send(CatalogEvent::SelectionChanged(None));
        }
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
