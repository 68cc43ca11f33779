//! Data-fetching glue between the view state and the remote API.
//!
//! The [`Explorer`] decides which queries the current view needs, runs them
//! through the query caches (so concurrent callers share one request) and
//! records each result in the matching [`QuerySlot`] (so a result for a key
//! the user has already moved away from is dropped). The list itself is
//! always produced by the pure [`assemble`] function.

use crate::api::DataSource;
use crate::app::engine::{assemble, ListOutput, ListSources};
use crate::app::view::{ListMode, ListViewState, PAGE_SIZE};
use crate::domain::{Entity, EntityDetails, Page, RemoteError};
use crate::query::{QueryCache, QueryKey, QuerySlot, QueryState, RetryPolicy};
use crate::storage::FavoritesSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::Instrument;

/// Default bound on the client-side search corpus.
pub const DEFAULT_NAME_INDEX_LIMIT: u32 = 1000;

/// Tunables for an [`Explorer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExplorerSettings {
    /// Number of entries requested for the full name index.
    pub name_index_limit: u32,
    /// Policy for list, category, name index and detail queries. By-name
    /// lookups never retry.
    pub retry: RetryPolicy,
}

impl Default for ExplorerSettings {
    fn default() -> Self {
        Self {
            name_index_limit: DEFAULT_NAME_INDEX_LIMIT,
            retry: RetryPolicy::default(),
        }
    }
}

impl ExplorerSettings {
    #[must_use]
    pub fn with_retry_base_delay(mut self, base_delay: Duration) -> Self {
        self.retry = RetryPolicy::with_base_delay(base_delay);
        self
    }
}

#[derive(Debug, Default)]
struct Slots {
    name_index: QuerySlot<Vec<Entity>>,
    category_index: QuerySlot<Vec<Entity>>,
    page_index: QuerySlot<Page<Entity>>,
    detail: QuerySlot<EntityDetails>,
}

/// Which slot a list query lands in.
#[derive(Debug, Clone, Copy)]
enum ListSlot {
    NameIndex,
    Category,
}

/// Runs the remote queries behind the list and detail views.
pub struct Explorer {
    source: Arc<dyn DataSource>,
    settings: ExplorerSettings,
    entity_lists: QueryCache<Vec<Entity>>,
    pages: QueryCache<Page<Entity>>,
    details: QueryCache<EntityDetails>,
    slots: Mutex<Slots>,
}

impl std::fmt::Debug for Explorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Explorer")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl Explorer {
    pub fn new(source: Arc<dyn DataSource>, settings: ExplorerSettings) -> Self {
        Self {
            source,
            settings,
            entity_lists: QueryCache::default(),
            pages: QueryCache::default(),
            details: QueryCache::default(),
            slots: Mutex::new(Slots::default()),
        }
    }

    #[must_use]
    pub fn settings(&self) -> ExplorerSettings {
        self.settings
    }

    fn slots(&self) -> MutexGuard<'_, Slots> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cache keys the list view needs for `view`.
    #[must_use]
    pub fn list_key(&self, view: &ListViewState) -> QueryKey {
        match ListMode::select(view) {
            ListMode::Client if view.category.is_empty() => QueryKey::NameIndex {
                limit: self.settings.name_index_limit,
            },
            ListMode::Client => QueryKey::Category(view.category.trim().to_lowercase()),
            ListMode::Server => QueryKey::Page(view.page.max(1)),
        }
    }

    /// Fetches what `view` needs and assembles the page.
    ///
    /// Failures never escape: they are reported in
    /// [`ListOutput::error`].
    pub async fn load_list(&self, view: &ListViewState, favorites: &FavoritesSet) -> ListOutput {
        let key = self.list_key(view);
        let span = tracing::debug_span!("load_list", key = %key, page = view.page);

        async move {
            match &key {
                QueryKey::Page(_) => self.load_page(key.clone(), view.offset()).await,
                QueryKey::Category(category) => {
                    let source = Arc::clone(&self.source);
                    let category = category.clone();
                    self.load_entities(ListSlot::Category, key.clone(), move || {
                        let source = Arc::clone(&source);
                        let category = category.clone();
                        async move { source.category_index(&category).await }
                    })
                    .await;
                }
                _ => {
                    let source = Arc::clone(&self.source);
                    let limit = self.settings.name_index_limit;
                    self.load_entities(ListSlot::NameIndex, key.clone(), move || {
                        let source = Arc::clone(&source);
                        async move { source.name_index(limit).await }
                    })
                    .await;
                }
            }
            self.assemble_current(view, favorites)
        }
        .instrument(span)
        .await
    }

    /// Assembles `view` from whatever the slots currently hold.
    #[must_use]
    pub fn assemble_current(&self, view: &ListViewState, favorites: &FavoritesSet) -> ListOutput {
        let slots = self.slots();
        let name_index = slots.name_index.state();
        let category_index = slots.category_index.state();
        let page_index = slots.page_index.state();
        drop(slots);

        assemble(
            view,
            ListSources {
                name_index: &name_index,
                category_index: &category_index,
                page_index: &page_index,
            },
            favorites,
        )
    }

    async fn load_entities<F, Fut>(&self, slot: ListSlot, key: QueryKey, make: F)
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: std::future::Future<Output = Result<Vec<Entity>, RemoteError>> + Send + 'static,
    {
        let ticket = {
            let mut slots = self.slots();
            match slot {
                ListSlot::NameIndex => slots.name_index.begin(key.clone()),
                ListSlot::Category => slots.category_index.begin(key.clone()),
            }
        };

        let result = self.entity_lists.fetch(&key, self.settings.retry, make).await;

        let mut slots = self.slots();
        match slot {
            ListSlot::NameIndex => slots.name_index.complete(&ticket, result),
            ListSlot::Category => slots.category_index.complete(&ticket, result),
        };
    }

    async fn load_page(&self, key: QueryKey, offset: u32) {
        let ticket = self.slots().page_index.begin(key.clone());

        let source = Arc::clone(&self.source);
        let result = self
            .pages
            .fetch(&key, self.settings.retry, move || {
                let source = Arc::clone(&source);
                async move { source.list_page(offset, PAGE_SIZE).await }
            })
            .await;

        self.slots().page_index.complete(&ticket, result);
    }

    /// Loads details for an id taken from a link, with the default retry
    /// policy.
    ///
    /// # Errors
    ///
    /// Returns the classified [`RemoteError`] once retries are exhausted.
    pub async fn details(&self, id: &str) -> Result<EntityDetails, RemoteError> {
        let id = id.trim().to_string();
        let key = QueryKey::Detail(id.clone());
        let span = tracing::debug_span!("details", id = %id);

        async move {
            let ticket = self.slots().detail.begin(key.clone());
            let source = Arc::clone(&self.source);
            let result = self
                .details
                .fetch(&key, self.settings.retry, move || {
                    let source = Arc::clone(&source);
                    let id = id.clone();
                    async move { source.entity_by_id(&id).await }
                })
                .await;
            self.slots().detail.complete(&ticket, result.clone());
            result
        }
        .instrument(span)
        .await
    }

    /// Looks an entity up by name. Never retries: a miss is reported after
    /// exactly one request.
    ///
    /// # Errors
    ///
    /// Returns a not-found error naming `name` if the API has no such entity.
    pub async fn lookup(&self, name: &str) -> Result<EntityDetails, RemoteError> {
        let normalized = name.trim().to_lowercase();
        let key = QueryKey::Search(normalized.clone());
        let span = tracing::debug_span!("lookup", name = %normalized);

        async move {
            let source = Arc::clone(&self.source);
            self.details
                .fetch(&key, RetryPolicy::Never, move || {
                    let source = Arc::clone(&source);
                    let normalized = normalized.clone();
                    async move { source.entity_by_name(&normalized).await }
                })
                .await
        }
        .instrument(span)
        .await
    }

    /// Drops cached data for the queries `view` depends on and reloads.
    pub async fn retry(&self, view: &ListViewState, favorites: &FavoritesSet) -> ListOutput {
        let key = self.list_key(view);
        tracing::info!(key = %key, "retrying list");
        match key {
            QueryKey::Page(_) => self.pages.invalidate(&key),
            _ => self.entity_lists.invalidate(&key),
        }
        self.load_list(view, favorites).await
    }

    /// Drops a cached detail record so the next [`details`](Self::details)
    /// call refetches it.
    pub fn invalidate_details(&self, id: &str) {
        self.details.invalidate(&QueryKey::Detail(id.trim().to_string()));
    }

    /// Current state of the detail query.
    #[must_use]
    pub fn detail_state(&self) -> QueryState<EntityDetails> {
        self.slots().detail.state()
    }

    /// Whether the API answers at all.
    pub async fn ping(&self) -> bool {
        self.source.ping().await
    }
}
