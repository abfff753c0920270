use super::*;
use std::{
    collections::VecDeque,
    sync::atomic::AtomicUsize,
};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde_json::json;
use shared::{domain::Reference, protocol::DetailPayload};
use tokio::sync::{Mutex, Notify};

use crate::loader::CatalogSource;

type ListingStep = std::result::Result<Vec<(i64, &'static str)>, String>;

struct ScriptedSource {
    steps: Mutex<VecDeque<ListingStep>>,
    calls: AtomicUsize,
    first_call_gate: Option<(Arc<Notify>, Arc<Notify>)>,
}

impl ScriptedSource {
    fn new(steps: Vec<ListingStep>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            calls: AtomicUsize::new(0),
            first_call_gate: None,
        }
    }

    /// Parks the first listing call: `started` fires once it is in flight and it
    /// resumes on `release`.
    fn gated(steps: Vec<ListingStep>, started: Arc<Notify>, release: Arc<Notify>) -> Self {
        let mut source = Self::new(steps);
        source.first_call_gate = Some((started, release));
        source
    }
}

#[async_trait]
impl CatalogSource for ScriptedSource {
    async fn fetch_listing(&self, _limit: u32) -> Result<Vec<Reference>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let step = self
            .steps
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()));
        if call == 0 {
            if let Some((started, release)) = &self.first_call_gate {
                started.notify_one();
                release.notified().await;
            }
        }
        let entries = step.map_err(|err| anyhow!(err))?;
        Ok(entries
            .into_iter()
            .map(|(id, name)| Reference {
                name: name.to_string(),
                url: format!("https://catalog.test/pokemon/{id}"),
            })
            .collect())
    }

    async fn fetch_detail(&self, reference: &Reference) -> Result<DetailPayload> {
        let id: i64 = reference
            .url
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .parse()
            .context("reference url without id")?;
        let category = if id == 4 { "fire" } else { "grass" };
        serde_json::from_value(json!({
            "id": id,
            "name": reference.name,
            "weight": id * 10,
            "height": id,
            "types": [{ "type": { "name": category } }],
            "abilities": [],
            "stats": [],
            "sprites": {}
        }))
        .context("detail payload")
    }
}

fn session_with(steps: Vec<ListingStep>) -> Arc<CatalogSession> {
    CatalogSession::new(DatasetLoader::new(Arc::new(ScriptedSource::new(steps))))
}

fn drain(rx: &mut broadcast::Receiver<CatalogEvent>) -> Vec<CatalogEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn dataset_ids(dataset: &[Item]) -> Vec<i64> {
    dataset.iter().map(|item| item.id.0).collect()
}

#[tokio::test]
async fn starts_idle_with_empty_view() {
    let session = session_with(Vec::new());
    assert_eq!(session.status().await, LoadStatus::Idle);
    assert!(session.view().await.is_empty());
    assert!(session.selected().await.is_none());
}

#[tokio::test]
async fn reload_publishes_dataset_and_announces_view() {
    let session = session_with(vec![Ok(vec![(4, "charmander"), (1, "bulbasaur")])]);
    let mut rx = session.subscribe_events();

    let outcome = session.reload().await.expect("reload");

    let report = LoadReport {
        requested: 2,
        loaded: 2,
    };
    assert_eq!(outcome, LoadOutcome::Published(report));
    assert_eq!(session.status().await, LoadStatus::Ready);
    assert_eq!(dataset_ids(&session.dataset().await), vec![4, 1]);
    assert_eq!(dataset_ids(&session.view().await), vec![1, 4]);
    assert_eq!(
        drain(&mut rx),
        vec![
            CatalogEvent::Loading,
            CatalogEvent::Loaded(report),
            CatalogEvent::ViewChanged { shown: 2, total: 2 },
        ]
    );
}

#[tokio::test]
async fn failed_reload_keeps_previous_dataset() {
    let session = session_with(vec![
        Ok(vec![(1, "bulbasaur"), (4, "charmander")]),
        Err("connection reset by peer".to_string()),
    ]);
    session.reload().await.expect("first reload");
    let mut rx = session.subscribe_events();

    let err = session.reload().await.expect_err("listing failure");

    assert!(matches!(err, LoadError::ListingUnavailable(_)));
    assert_eq!(dataset_ids(&session.dataset().await), vec![1, 4]);
    match session.status().await {
        LoadStatus::Failed(message) => assert!(message.contains("connection reset")),
        other => panic!("unexpected status: {other:?}"),
    }
    let events = drain(&mut rx);
    assert!(matches!(events.last(), Some(CatalogEvent::LoadFailed(_))));
}

#[tokio::test]
async fn superseded_load_does_not_overwrite_newer_dataset() {
    let started = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let source = ScriptedSource::gated(
        vec![
            Ok(vec![(1, "bulbasaur")]),
            Ok(vec![(4, "charmander"), (7, "squirtle")]),
        ],
        started.clone(),
        release.clone(),
    );
    let session = CatalogSession::new(DatasetLoader::new(Arc::new(source)));

    let stale = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.reload().await })
    };
    started.notified().await;

    let fresh = session.reload().await.expect("fresh reload");
    assert!(matches!(fresh, LoadOutcome::Published(_)));

    release.notify_one();
    let stale = stale.await.expect("join").expect("stale reload");

    assert_eq!(stale, LoadOutcome::Superseded);
    assert_eq!(dataset_ids(&session.dataset().await), vec![4, 7]);
    assert_eq!(session.status().await, LoadStatus::Ready);
}

#[tokio::test]
async fn criteria_changes_recompute_view() {
    let session = session_with(vec![Ok(vec![(1, "bulbasaur"), (4, "charmander")])]);
    session.reload().await.expect("reload");
    let mut rx = session.subscribe_events();

    let view = session
        .set_criteria(FilterCriteria::from_inputs("", "", "", "fire", ""))
        .await;
    assert_eq!(dataset_ids(&view), vec![4]);
    assert_eq!(session.criteria().await.category.as_deref(), Some("fire"));

    let view = session.clear_filters().await;
    assert_eq!(dataset_ids(&view), vec![1, 4]);
    assert_eq!(session.criteria().await, FilterCriteria::cleared());

    assert_eq!(
        drain(&mut rx),
        vec![
            CatalogEvent::ViewChanged { shown: 1, total: 2 },
            CatalogEvent::ViewChanged { shown: 2, total: 2 },
        ]
    );
}

#[tokio::test]
async fn criteria_set_before_load_apply_to_published_dataset() {
    let session = session_with(vec![Ok(vec![(1, "bulbasaur"), (4, "charmander")])]);
    session
        .set_criteria(FilterCriteria::from_inputs("", "", "", "", "weight"))
        .await;

    session.reload().await.expect("reload");

    assert_eq!(dataset_ids(&session.view().await), vec![4, 1]);
}

#[tokio::test]
async fn selection_tracks_detail_view() {
    let session = session_with(vec![Ok(vec![(1, "bulbasaur"), (4, "charmander")])]);
    session.reload().await.expect("reload");

    let item = session.select(ItemId(4)).await.expect("known item");
    assert_eq!(item.name, "charmander");
    assert_eq!(session.selected().await.map(|item| item.id), Some(ItemId(4)));

    assert!(session.select(ItemId(999)).await.is_none());
    assert_eq!(session.selected().await.map(|item| item.id), Some(ItemId(4)));

    let item = session.select_by_name(" Bulbasaur ").await.expect("by name");
    assert_eq!(item.id, ItemId(1));

    session.close_detail().await;
    assert!(session.selected().await.is_none());
}

#[tokio::test]
async fn reload_clears_selection_of_vanished_item() {
    let session = session_with(vec![
        Ok(vec![(1, "bulbasaur"), (4, "charmander")]),
        Ok(vec![(1, "bulbasaur")]),
    ]);
    session.reload().await.expect("first reload");
    session.select(ItemId(4)).await.expect("select");
    let mut rx = session.subscribe_events();

    session.reload().await.expect("second reload");

    assert!(session.selected().await.is_none());
    assert!(drain(&mut rx).contains(&CatalogEvent::SelectionChanged(None)));
}
