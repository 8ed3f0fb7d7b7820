//! Search and pagination state for the browse page.
//!
//! Filters and page are mirrored into the location query. Changes made here
//! come back as `Effect::ReplaceLocation`; changes that arrive from the
//! location (`on_url_changed`) are adopted without writing the location
//! back, so the two sides cannot ping-pong.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::debounce::Debouncer;
use super::filters::SearchFilters;
use super::location::BrowseState;
use super::query::{ListQuery, QuerySettings};
use super::{CatalogMessage, Effect, RequestStatus};
use crate::jikan::{Anime, AnimePage, CatalogApi};

pub struct SearchController {
    api: Arc<dyn CatalogApi>,
    tx: mpsc::UnboundedSender<CatalogMessage>,
    settings: QuerySettings,
    debouncer: Debouncer,

    filters: SearchFilters,
    page: u32,
    total_pages: u32,
    /// `total_pages` only means something after a successful fetch
    total_known: bool,
    results: Vec<Anime>,
    status: RequestStatus,

    /// Browse state last written to or adopted from the location
    applied: BrowseState,
}

impl SearchController {
    pub fn new(
        api: Arc<dyn CatalogApi>,
        tx: mpsc::UnboundedSender<CatalogMessage>,
        settings: QuerySettings,
        debounce: Duration,
    ) -> Self {
        Self {
            api,
            tx,
            settings,
            debouncer: Debouncer::new(debounce),
            filters: SearchFilters::default(),
            page: 1,
            total_pages: 1,
            total_known: false,
            results: Vec::new(),
            status: RequestStatus::Idle,
            applied: BrowseState::default(),
        }
    }

    pub fn filters(&self) -> &SearchFilters {
        &self.filters
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn results(&self) -> &[Anime] {
        &self.results
    }

    pub fn status(&self) -> &RequestStatus {
        &self.status
    }

    pub fn browse_state(&self) -> BrowseState {
        BrowseState {
            filters: self.filters.clone(),
            page: self.page,
        }
    }

    /// Mount on a location query: seed state from it and fetch
    pub fn initialize(&mut self, location_query: &str) {
        let state = BrowseState::from_query(location_query);
        debug!(query = %state.filters.query, category = ?state.filters.category, page = state.page, "Initializing search");

        self.filters = state.filters.clone();
        self.page = state.page;
        self.total_pages = 1;
        self.total_known = false;
        self.results.clear();
        self.applied = state;
        self.schedule_fetch();
    }

    pub fn on_filters_changed(&mut self, filters: SearchFilters) -> Vec<Effect> {
        self.filters = filters;
        self.page = 1;
        // the last total belongs to the old filters
        self.total_known = false;
        self.schedule_fetch();
        vec![self.write_location()]
    }

    /// Returns no effects when the page does not actually change
    pub fn on_page_changed(&mut self, page: u32) -> Vec<Effect> {
        let target = if self.total_known {
            page.clamp(1, self.total_pages)
        } else {
            page.max(1)
        };

        if target == self.page {
            return Vec::new();
        }

        self.page = target;
        self.schedule_fetch();
        vec![self.write_location(), Effect::ScrollToTop]
    }

    pub fn next_page(&mut self) -> Vec<Effect> {
        self.on_page_changed(self.page.saturating_add(1))
    }

    pub fn previous_page(&mut self) -> Vec<Effect> {
        self.on_page_changed(self.page.saturating_sub(1))
    }

    pub fn first_page(&mut self) -> Vec<Effect> {
        self.on_page_changed(1)
    }

    pub fn last_page(&mut self) -> Vec<Effect> {
        if !self.total_known {
            return Vec::new();
        }
        self.on_page_changed(self.total_pages)
    }

    /// External navigation landed on a browse location. Adopts it if it
    /// differs from what was last applied; never writes the location back.
    pub fn on_url_changed(&mut self, location_query: &str) -> bool {
        let state = BrowseState::from_query(location_query);
        if state == self.applied {
            return false;
        }

        debug!(query = %state.filters.query, page = state.page, "Adopting browse state from location");
        if state.filters != self.filters {
            self.total_known = false;
        }
        self.filters = state.filters.clone();
        self.page = state.page;
        self.applied = state;
        self.schedule_fetch();
        true
    }

    /// Commit a finished fetch. Anything but the latest generation is dropped.
    pub fn apply(&mut self, generation: u64, outcome: Result<AnimePage, String>) -> Vec<Effect> {
        if !self.debouncer.is_current(generation) {
            debug!(
                generation,
                current = self.debouncer.generation(),
                "Dropping stale search result"
            );
            return Vec::new();
        }

        match outcome {
            Ok(page) => {
                self.results = dedup_by_id(page.items);
                self.total_pages = page.total_pages.max(1);
                self.total_known = true;
                self.status = RequestStatus::Success;
                debug!(
                    count = self.results.len(),
                    total_pages = self.total_pages,
                    "Search results committed"
                );

                if self.page > self.total_pages {
                    debug!(page = self.page, total_pages = self.total_pages, "Page past the end, clamping");
                    self.page = self.total_pages;
                    self.schedule_fetch();
                    return vec![self.write_location()];
                }
            }
            Err(message) => {
                warn!(error = %message, "Search failed");
                self.results.clear();
                self.status = RequestStatus::Error(message);
            }
        }

        Vec::new()
    }

    /// Stop any pending fetch; nothing already issued will commit
    pub fn teardown(&mut self) {
        self.debouncer.cancel();
        if self.status.is_loading() {
            self.status = RequestStatus::Idle;
        }
    }

    fn write_location(&mut self) -> Effect {
        self.applied = self.browse_state();
        Effect::ReplaceLocation(self.applied.to_location())
    }

    fn schedule_fetch(&mut self) {
        let query = ListQuery::build(&self.filters, self.page, &self.settings);
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();

        self.status = RequestStatus::Loading;
        let generation = self.debouncer.schedule(move |generation| async move {
            let outcome = api.list_anime(&query).await.map_err(|e| e.to_string());
            // receiver is gone once the app shuts down
            let _ = tx.send(CatalogMessage::SearchFinished {
                generation,
                outcome,
            });
        });
        debug!(generation, page = self.page, "Scheduled search fetch");
    }
}

/// Keep the first entry per `mal_id`, preserving order
fn dedup_by_id(items: Vec<Anime>) -> Vec<Anime> {
    let mut seen = HashSet::with_capacity(items.len());
    items
        .into_iter()
        .filter(|anime| seen.insert(anime.mal_id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::filters::Category;
    use crate::catalog::location::Location;
    use crate::catalog::testing::{FakeCatalog, TEST_DEBOUNCE, anime, settle};

    fn setup(
        total_pages: u32,
    ) -> (
        Arc<FakeCatalog>,
        SearchController,
        mpsc::UnboundedReceiver<CatalogMessage>,
    ) {
        let api = Arc::new(FakeCatalog::new(total_pages, 24));
        let (tx, rx) = mpsc::unbounded_channel();
        let controller =
            SearchController::new(api.clone(), tx, QuerySettings::default(), TEST_DEBOUNCE);
        (api, controller, rx)
    }

    fn apply_all(controller: &mut SearchController, messages: Vec<CatalogMessage>) -> Vec<Effect> {
        let mut effects = Vec::new();
        for msg in messages {
            if let CatalogMessage::SearchFinished {
                generation,
                outcome,
            } = msg
            {
                effects.extend(controller.apply(generation, outcome));
            }
        }
        effects
    }

    fn location(raw: &str) -> Location {
        Location::parse(raw).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_load_then_page_change() {
        let (api, mut controller, mut rx) = setup(5);

        controller.initialize("");
        assert!(controller.status().is_loading());
        let messages = settle(&mut rx).await;
        assert_eq!(messages.len(), 1);
        apply_all(&mut controller, messages);

        assert_eq!(controller.results().len(), 24);
        assert_eq!(controller.total_pages(), 5);
        assert_eq!(controller.status(), &RequestStatus::Success);

        let effects = controller.on_page_changed(2);
        assert_eq!(controller.page(), 2);
        assert!(effects.contains(&Effect::ScrollToTop));
        assert!(effects.contains(&Effect::ReplaceLocation(location("/?page=2"))));

        let messages = settle(&mut rx).await;
        assert_eq!(messages.len(), 1);
        apply_all(&mut controller, messages);

        let calls = api.list_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].get("page"), Some("2"));
        assert_eq!(controller.results()[0].mal_id, 2000);
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_query_parameters() {
        let (api, mut controller, mut rx) = setup(5);

        controller.initialize("");
        settle(&mut rx).await;

        let calls = api.list_calls();
        let query = &calls[0];
        assert_eq!(query.get("q"), None);
        assert_eq!(query.get("status"), None);
        assert_eq!(query.get("page"), Some("1"));
        assert_eq!(query.get("limit"), Some("24"));
        assert_eq!(query.get("sfw"), Some("true"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_initialize_seeds_from_location() {
        let (api, mut controller, mut rx) = setup(5);

        controller.initialize("q=naruto&category=Airing&page=3");
        assert_eq!(
            controller.filters(),
            &SearchFilters::new("naruto", Category::Airing)
        );
        assert_eq!(controller.page(), 3);

        settle(&mut rx).await;
        let calls = api.list_calls();
        assert_eq!(calls[0].get("q"), Some("naruto"));
        assert_eq!(calls[0].get("status"), Some("airing"));
        assert_eq!(calls[0].get("page"), Some("3"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_filter_changes_fetch_once() {
        let (api, mut controller, mut rx) = setup(5);
        controller.initialize("");
        let initial = settle(&mut rx).await;
        apply_all(&mut controller, initial);

        controller.on_filters_changed(SearchFilters::new("n", Category::All));
        tokio::time::sleep(Duration::from_millis(50)).await;
        controller.on_filters_changed(SearchFilters::new("na", Category::All));
        tokio::time::sleep(Duration::from_millis(50)).await;
        controller.on_filters_changed(SearchFilters::new("nar", Category::Airing));

        let messages = settle(&mut rx).await;
        assert_eq!(messages.len(), 1);

        let calls = api.list_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].get("q"), Some("nar"));
        assert_eq!(calls[1].get("status"), Some("airing"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_filter_change_resets_page() {
        let (_api, mut controller, mut rx) = setup(5);
        controller.initialize("page=3");
        let messages = settle(&mut rx).await;
        apply_all(&mut controller, messages);

        let effects =
            controller.on_filters_changed(SearchFilters::new("naruto", Category::Upcoming));
        assert_eq!(controller.page(), 1);
        assert_eq!(
            effects,
            vec![Effect::ReplaceLocation(location(
                "/?q=naruto&category=Upcoming"
            ))]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_location_round_trip() {
        let (_api, mut controller, mut rx) = setup(5);
        controller.initialize("");
        let messages = settle(&mut rx).await;
        apply_all(&mut controller, messages);

        controller.on_filters_changed(SearchFilters::new("naruto", Category::Upcoming));
        let effects = controller.on_page_changed(3);
        let Some(Effect::ReplaceLocation(written)) = effects.first().cloned() else {
            panic!("expected a location write, got {:?}", effects);
        };

        let (_api, mut fresh, _rx) = setup(5);
        fresh.initialize(written.query());
        assert_eq!(
            fresh.filters(),
            &SearchFilters::new("naruto", Category::Upcoming)
        );
        assert_eq!(fresh.page(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_page_is_noop() {
        let (api, mut controller, mut rx) = setup(5);
        controller.initialize("");
        let messages = settle(&mut rx).await;
        apply_all(&mut controller, messages);

        assert!(controller.on_page_changed(1).is_empty());
        assert!(controller.previous_page().is_empty());
        settle(&mut rx).await;
        assert_eq!(api.list_calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_page_clamped_to_known_total() {
        let (_api, mut controller, mut rx) = setup(5);
        controller.initialize("");
        let messages = settle(&mut rx).await;
        apply_all(&mut controller, messages);

        controller.on_page_changed(9);
        assert_eq!(controller.page(), 5);
        assert!(controller.next_page().is_empty());

        controller.first_page();
        assert_eq!(controller.page(), 1);
        controller.last_page();
        assert_eq!(controller.page(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_filter_change_forgets_old_total() {
        let (api, mut controller, mut rx) = setup(1);
        controller.initialize("q=zzz");
        let messages = settle(&mut rx).await;
        apply_all(&mut controller, messages);
        assert!(controller.next_page().is_empty());

        controller.on_filters_changed(SearchFilters::new("naruto", Category::All));
        let effects = controller.on_page_changed(2);
        assert_eq!(controller.page(), 2);
        assert!(effects.contains(&Effect::ReplaceLocation(location("/?q=naruto&page=2"))));

        settle(&mut rx).await;
        let calls = api.list_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].get("q"), Some("naruto"));
        assert_eq!(calls[1].get("page"), Some("2"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_url_change_to_new_filters_forgets_old_total() {
        let (_api, mut controller, mut rx) = setup(1);
        controller.initialize("q=zzz");
        let messages = settle(&mut rx).await;
        apply_all(&mut controller, messages);

        assert!(controller.on_url_changed("q=bleach"));
        let effects = controller.on_page_changed(3);
        assert_eq!(controller.page(), 3);
        assert!(effects.contains(&Effect::ScrollToTop));
    }

    #[tokio::test(start_paused = true)]
    async fn test_page_past_reported_end_is_clamped_after_fetch() {
        let (api, mut controller, mut rx) = setup(5);
        controller.initialize("page=9");
        let messages = settle(&mut rx).await;
        let effects = apply_all(&mut controller, messages);

        assert_eq!(controller.page(), 5);
        assert_eq!(effects, vec![Effect::ReplaceLocation(location("/?page=5"))]);

        let messages = settle(&mut rx).await;
        apply_all(&mut controller, messages);
        assert_eq!(api.list_calls().len(), 2);
        assert_eq!(controller.results().len(), 24);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_response_is_dropped() {
        let (_api, mut controller, mut rx) = setup(5);

        controller.initialize("");
        let page_one = settle(&mut rx).await;
        assert_eq!(page_one.len(), 1);

        // page 1 is "in flight" (received but not committed) when the user moves on
        controller.on_page_changed(2);
        let page_two = settle(&mut rx).await;

        apply_all(&mut controller, page_two);
        assert_eq!(controller.results()[0].mal_id, 2000);

        apply_all(&mut controller, page_one);
        assert_eq!(controller.page(), 2);
        assert_eq!(controller.results()[0].mal_id, 2000);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_response_dropped_even_if_first() {
        let (_api, mut controller, mut rx) = setup(5);

        controller.initialize("");
        let page_one = settle(&mut rx).await;
        controller.on_page_changed(2);

        apply_all(&mut controller, page_one);
        assert!(controller.results().is_empty());
        assert!(controller.status().is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn test_results_are_deduplicated() {
        let (api, mut controller, mut rx) = setup(1);
        api.set_items(vec![
            anime(1, "first"),
            anime(2, "second"),
            anime(1, "duplicate"),
            anime(3, "third"),
        ]);

        controller.initialize("");
        let messages = settle(&mut rx).await;
        apply_all(&mut controller, messages);

        let ids: Vec<_> = controller.results().iter().map(|a| a.mal_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(controller.results()[0].title, "first");
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_clears_results() {
        let (api, mut controller, mut rx) = setup(5);
        controller.initialize("");
        let messages = settle(&mut rx).await;
        apply_all(&mut controller, messages);
        assert_eq!(controller.results().len(), 24);

        api.set_failing(true);
        controller.on_page_changed(2);
        let messages = settle(&mut rx).await;
        apply_all(&mut controller, messages);

        assert!(controller.results().is_empty());
        assert!(controller.status().error().is_some());
        assert_eq!(controller.total_pages(), 5);

        settle(&mut rx).await;
        assert_eq!(api.list_calls().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_url_change_adopts_without_writing_back() {
        let (api, mut controller, mut rx) = setup(5);
        controller.initialize("q=bleach");
        let messages = settle(&mut rx).await;
        apply_all(&mut controller, messages);

        assert!(!controller.on_url_changed("q=bleach"));
        settle(&mut rx).await;
        assert_eq!(api.list_calls().len(), 1);

        assert!(controller.on_url_changed("q=naruto&category=Finished&page=2"));
        assert_eq!(
            controller.filters(),
            &SearchFilters::new("naruto", Category::Finished)
        );
        assert_eq!(controller.page(), 2);

        let messages = settle(&mut rx).await;
        apply_all(&mut controller, messages);
        let calls = api.list_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].get("status"), Some("complete"));

        // reapplying the location this controller just adopted does nothing
        assert!(!controller.on_url_changed("q=naruto&category=Finished&page=2"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_own_write_is_not_readopted() {
        let (api, mut controller, mut rx) = setup(5);
        controller.initialize("");
        let messages = settle(&mut rx).await;
        apply_all(&mut controller, messages);

        let effects = controller.on_filters_changed(SearchFilters::new("one piece", Category::All));
        let Some(Effect::ReplaceLocation(written)) = effects.first().cloned() else {
            panic!("expected a location write");
        };
        settle(&mut rx).await;

        assert!(!controller.on_url_changed(written.query()));
        settle(&mut rx).await;
        assert_eq!(api.list_calls().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_cancels_pending_fetch() {
        let (api, mut controller, mut rx) = setup(5);
        controller.initialize("");
        controller.teardown();

        let messages = settle(&mut rx).await;
        assert!(messages.is_empty());
        assert!(api.list_calls().is_empty());
        assert_eq!(controller.status(), &RequestStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_discards_late_result() {
        let (api, mut controller, mut rx) = setup(5);
        controller.initialize("");
        let messages = settle(&mut rx).await;
        assert_eq!(messages.len(), 1);
        assert_eq!(api.list_calls().len(), 1);

        controller.teardown();
        let effects = apply_all(&mut controller, messages);

        assert!(effects.is_empty());
        assert!(controller.results().is_empty());
        assert_eq!(controller.status(), &RequestStatus::Idle);
    }
}
