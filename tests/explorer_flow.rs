//! End-to-end flows over a scripted data source: list modes, lookups,
//! request sharing, retries and persisted stores.

use async_trait::async_trait;
use pokedex::api::DataSource;
use pokedex::app::url_state::{Detached, UrlQuery};
use pokedex::app::{ListMode, ListViewState, SortKey};
use pokedex::domain::{Entity, EntityDetails, ErrorKind, Page, RemoteError, Stat};
use pokedex::query::RetryPolicy;
use pokedex::storage::{
    shared, FavoritesSet, JsonFileStore, KeyValueStore, MemoryStore, ThemeMode, FAVORITES_KEY, THEME_KEY,
};
use pokedex::{handle_event, Action, Event, Explorer, ExplorerSettings};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

const NAMES: [&str; 6] = ["bulbasaur", "ivysaur", "venusaur", "charmander", "charmeleon", "charizard"];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    ListPage(u32, u32),
    NameIndex(u32),
    Category(String),
    ById(String),
    ByName(String),
}

/// Data source answering from a small fixed catalog and recording calls.
#[derive(Default)]
struct ScriptedSource {
    calls: Mutex<Vec<Call>>,
    /// Number of leading calls that fail with a network error.
    failures: AtomicU32,
    delay: Option<Duration>,
}

impl ScriptedSource {
    fn failing_first(n: u32) -> Self {
        Self {
            failures: AtomicU32::new(n),
            ..Self::default()
        }
    }

    fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    async fn record(&self, call: Call) -> Result<(), RemoteError> {
        self.calls.lock().unwrap().push(call);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return Err(RemoteError::new(
                ErrorKind::Network,
                "Network error. Please check your connection and try again.",
            ));
        }
        Ok(())
    }

    fn entity(id: u32) -> Entity {
        let name = NAMES[(id as usize - 1) % NAMES.len()];
        Entity::from_resource(name, &format!("https://pokeapi.co/api/v2/pokemon/{id}/")).unwrap()
    }

    fn details(id: u32) -> EntityDetails {
        EntityDetails {
            id,
            name: Self::entity(id).name,
            sprite_url: None,
            artwork_url: None,
            categories: vec!["grass".into()],
            height: 7,
            weight: 69,
            abilities: vec![],
            stats: vec![Stat {
                name: "hp".into(),
                base: 45,
                effort: 0,
            }],
        }
    }
}

#[async_trait]
impl DataSource for ScriptedSource {
    async fn list_page(&self, offset: u32, limit: u32) -> Result<Page<Entity>, RemoteError> {
        self.record(Call::ListPage(offset, limit)).await?;
        Ok(Page {
            count: 1302,
            next: None,
            previous: None,
            results: (offset + 1..=offset + limit).map(Self::entity).collect(),
        })
    }

    async fn name_index(&self, limit: u32) -> Result<Vec<Entity>, RemoteError> {
        self.record(Call::NameIndex(limit)).await?;
        Ok((1..=6).map(Self::entity).collect())
    }

    async fn category_index(&self, category: &str) -> Result<Vec<Entity>, RemoteError> {
        self.record(Call::Category(category.to_string())).await?;
        Ok([4, 5, 6]
            .into_iter()
            .map(|id| Self::entity(id).with_category(category))
            .collect())
    }

    async fn entity_by_id(&self, id: &str) -> Result<EntityDetails, RemoteError> {
        self.record(Call::ById(id.to_string())).await?;
        id.parse()
            .map(Self::details)
            .map_err(|_| RemoteError::new(ErrorKind::NotFound, "Pokémon not found"))
    }

    async fn entity_by_name(&self, name: &str) -> Result<EntityDetails, RemoteError> {
        self.record(Call::ByName(name.to_string())).await?;
        match NAMES.iter().position(|n| *n == name) {
            Some(index) => Ok(Self::details(index as u32 + 1)),
            None => Err(RemoteError::new(
                ErrorKind::NotFound,
                format!("Pokémon \"{name}\" not found"),
            )),
        }
    }

    async fn ping(&self) -> bool {
        true
    }
}

fn explorer(source: &Arc<ScriptedSource>) -> Explorer {
    let source: Arc<dyn DataSource> = Arc::clone(source) as Arc<dyn DataSource>;
    Explorer::new(
        source,
        ExplorerSettings::default().with_retry_base_delay(Duration::from_millis(1)),
    )
}

#[tokio::test]
async fn default_view_reads_the_remote_page() {
    let source = Arc::new(ScriptedSource::default());
    let explorer = explorer(&source);

    let output = explorer.load_list(&ListViewState::default(), &FavoritesSet::default()).await;

    assert_eq!(output.mode, ListMode::Server);
    assert_eq!(output.items.len(), 20);
    assert_eq!(output.items[0].id, 1);
    assert_eq!(output.total_pages, 66);
    assert_eq!(source.calls(), vec![Call::ListPage(0, 20)]);
}

#[tokio::test]
async fn third_page_requests_offset_forty() {
    let source = Arc::new(ScriptedSource::default());
    let explorer = explorer(&source);
    let view = ListViewState {
        page: 3,
        ..ListViewState::default()
    };

    let output = explorer.load_list(&view, &FavoritesSet::default()).await;

    assert_eq!(output.items[0].id, 41);
    assert_eq!(source.calls(), vec![Call::ListPage(40, 20)]);
}

#[tokio::test]
async fn search_filters_the_name_index() {
    let source = Arc::new(ScriptedSource::default());
    let explorer = explorer(&source);
    let view = ListViewState {
        search_text: "char".into(),
        sort: SortKey::NameAsc,
        ..ListViewState::default()
    };

    let output = explorer.load_list(&view, &FavoritesSet::default()).await;

    assert_eq!(output.mode, ListMode::Client);
    let names: Vec<_> = output.items.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["charizard", "charmander", "charmeleon"]);
    assert_eq!(source.calls(), vec![Call::NameIndex(1000)]);
}

#[tokio::test]
async fn category_filter_uses_the_category_index() {
    let source = Arc::new(ScriptedSource::default());
    let explorer = explorer(&source);
    let view = ListViewState {
        category: "fire".into(),
        ..ListViewState::default()
    };

    let output = explorer.load_list(&view, &FavoritesSet::default()).await;

    assert_eq!(output.items.len(), 3);
    assert!(output.items.iter().all(|e| e.categories == ["fire"]));
    assert_eq!(source.calls(), vec![Call::Category("fire".into())]);
}

#[tokio::test]
async fn missing_name_fails_after_one_request() {
    let source = Arc::new(ScriptedSource::failing_first(0));
    let explorer = explorer(&source);

    let err = explorer.lookup("  MissingNo ").await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::NotFound);
    assert!(err.message.contains("missingno"));
    assert_eq!(source.calls(), vec![Call::ByName("missingno".into())]);
}

#[tokio::test]
async fn lookup_does_not_retry_network_errors() {
    let source = Arc::new(ScriptedSource::failing_first(1));
    let explorer = explorer(&source);

    let err = explorer.lookup("pikachu").await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Network);
    assert_eq!(source.calls().len(), 1);
}

#[tokio::test]
async fn details_retry_until_success() {
    let source = Arc::new(ScriptedSource::failing_first(2));
    let explorer = explorer(&source);

    let details = explorer.details("4").await.unwrap();

    assert_eq!(details.name, "charmander");
    assert_eq!(source.calls().len(), 3);
    assert_eq!(explorer.detail_state().data, Some(details));
}

#[tokio::test]
async fn details_give_up_after_the_retry_budget() {
    let source = Arc::new(ScriptedSource::failing_first(10));
    let explorer = explorer(&source);

    let err = explorer.details("4").await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Network);
    let RetryPolicy::Backoff { retries, .. } = explorer.settings().retry else {
        panic!("default policy retries");
    };
    assert_eq!(source.calls().len(), retries as usize + 1);
    assert!(explorer.detail_state().error.is_some());
}

#[tokio::test]
async fn concurrent_loads_share_one_request() {
    let source = Arc::new(ScriptedSource::slow(Duration::from_millis(20)));
    let explorer = explorer(&source);
    let view = ListViewState::default();
    let favorites = FavoritesSet::default();

    let (a, b) = tokio::join!(
        explorer.load_list(&view, &favorites),
        explorer.load_list(&view, &favorites)
    );

    assert_eq!(a.items, b.items);
    assert_eq!(source.calls(), vec![Call::ListPage(0, 20)]);
}

#[tokio::test]
async fn cached_list_is_not_refetched_until_retry() {
    let source = Arc::new(ScriptedSource::default());
    let explorer = explorer(&source);
    let view = ListViewState::default();
    let favorites = FavoritesSet::default();

    explorer.load_list(&view, &favorites).await;
    explorer.load_list(&view, &favorites).await;
    assert_eq!(source.calls().len(), 1);

    explorer.retry(&view, &favorites).await;
    assert_eq!(source.calls().len(), 2);
}

#[tokio::test]
async fn failed_list_reports_error_and_recovers_on_retry() {
    let source = Arc::new(ScriptedSource::failing_first(4));
    let explorer = explorer(&source);
    let view = ListViewState::default();
    let favorites = FavoritesSet::default();

    let failed = explorer.load_list(&view, &favorites).await;
    assert!(failed.items.is_empty());
    assert_eq!(failed.error.as_ref().map(|e| e.kind), Some(ErrorKind::Network));

    let recovered = explorer.retry(&view, &favorites).await;
    assert!(recovered.error.is_none());
    assert_eq!(recovered.items.len(), 20);
}

#[tokio::test]
async fn favorites_only_view_shows_starred_entities() {
    let source = Arc::new(ScriptedSource::default());
    let explorer = explorer(&source);
    let favorites: FavoritesSet = ["6", "4"].into_iter().collect();
    let view = ListViewState {
        favorites_only: true,
        ..ListViewState::default()
    };

    let output = explorer.load_list(&view, &favorites).await;

    let ids: Vec<_> = output.items.iter().map(|e| e.id).collect();
    assert_eq!(ids, [4, 6]);
}

#[tokio::test]
async fn browse_flow_drives_reloads_through_the_address() {
    let source = Arc::new(ScriptedSource::default());
    let explorer = explorer(&source);
    let backend = shared(MemoryStore::default());
    let mut state = pokedex::initialize(UrlQuery::new("page=2"), &backend).unwrap();

    let output = explorer.load_list(&state.view(), state.favorites.set()).await;
    handle_event(&mut state, &Event::ListLoaded(output)).unwrap();
    assert_eq!(state.total_pages(), 66);

    let (redraw, actions) = handle_event(&mut state, &Event::Search("char".into())).unwrap();
    assert!(redraw);
    assert_eq!(actions, vec![Action::ReloadList]);
    assert_eq!(state.view().page, 1);
    assert_eq!(state.url.params().to_string(), "q=char");

    let output = explorer.load_list(&state.view(), state.favorites.set()).await;
    handle_event(&mut state, &Event::ListLoaded(output)).unwrap();
    assert_eq!(state.row_id(0), Some(4));

    let (_, actions) = handle_event(&mut state, &Event::OpenDetail(4)).unwrap();
    assert_eq!(actions, vec![Action::ShowDetail(4)]);
    assert_eq!(
        source.calls(),
        vec![Call::ListPage(20, 20), Call::NameIndex(1000)]
    );
}

#[tokio::test]
async fn detached_address_ignores_view_changes() {
    let backend = shared(MemoryStore::default());
    let mut state = pokedex::initialize(Detached, &backend).unwrap();

    let (redraw, actions) = handle_event(&mut state, &Event::SelectSort(SortKey::NameDesc)).unwrap();

    assert!(!redraw);
    assert!(actions.is_empty());
    assert_eq!(state.view(), ListViewState::default());
}

#[test]
fn favorites_and_theme_survive_reopening_the_store() {
    let dir = TempDir::new().unwrap();

    {
        let backend = shared(JsonFileStore::in_dir(dir.path()).unwrap());
        let mut state = pokedex::initialize(UrlQuery::default(), &backend).unwrap();
        state.favorites.toggle("25").unwrap();
        state.favorites.toggle("1").unwrap();
        state.favorites.toggle("25").unwrap();
        assert_eq!(state.theme.toggle().unwrap(), ThemeMode::Dark);
    }

    let backend = shared(JsonFileStore::in_dir(dir.path()).unwrap());
    let state = pokedex::initialize(UrlQuery::default(), &backend).unwrap();
    assert!(state.favorites.is_favorite("1"));
    assert!(!state.favorites.is_favorite("25"));
    assert_eq!(state.theme.get(), ThemeMode::Dark);

    let store = pokedex::storage::lock(&backend).unwrap();
    assert_eq!(
        store.get(FAVORITES_KEY).unwrap().as_deref(),
        Some(r#"{"1":true,"25":false}"#)
    );
    assert_eq!(store.get(THEME_KEY).unwrap().as_deref(), Some("dark"));
}

#[test]
fn malformed_stored_values_fall_back_to_defaults() {
    let backend = shared(MemoryStore::with_entries([
        (FAVORITES_KEY.to_string(), "not json".to_string()),
        (THEME_KEY.to_string(), "sepia".to_string()),
    ]));

    let state = pokedex::initialize(UrlQuery::default(), &backend).unwrap();

    assert!(state.favorites.set().is_empty());
    assert_eq!(state.theme.get(), ThemeMode::Light);
}

#[tokio::test]
async fn detail_retry_refetches_after_invalidation() {
    let source = Arc::new(ScriptedSource::failing_first(4));
    let explorer = explorer(&source);
    let backend = shared(MemoryStore::default());
    let mut state = pokedex::initialize(UrlQuery::default(), &backend).unwrap();

    assert!(explorer.details("4").await.is_err());
    handle_event(&mut state, &Event::DetailFailed(4)).unwrap();

    let (_, actions) = handle_event(&mut state, &Event::Retry).unwrap();
    assert_eq!(actions, vec![Action::RetryDetail(4)]);

    explorer.invalidate_details("4");
    let details = explorer.details("4").await.unwrap();
    assert_eq!(details.name, "charmander");
    assert_eq!(source.calls().len(), 5);

    explorer.details("4").await.unwrap();
    assert_eq!(source.calls().len(), 5);
    explorer.invalidate_details("4");
    explorer.details("4").await.unwrap();
    assert_eq!(source.calls().len(), 6);
}
