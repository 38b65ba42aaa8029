//! Entry list view state

use super::{FetchTicket, Generations, LoadPhase, Outcome, ScopeHandle, ViewScope};
use crate::api::ScrapbookApi;
use crate::error::{Error, Result};
use crate::models::{Entry, EntryFields, EntryId, ImageUpload};
use crate::query::EntryQuery;

/// Why the list is being re-fetched. Selects the message shown on failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshReason {
    Load,
    Search,
    Sort,
    Favorites,
}

impl RefreshReason {
    #[must_use]
    pub const fn failure_message(self) -> &'static str {
        match self {
            Self::Load => "Failed to fetch stories",
            Self::Search => "Failed to search entries",
            Self::Sort => "Failed to sort entries",
            Self::Favorites => "Failed to filter favorites",
        }
    }
}

const CREATE_FAILED: &str = "Failed to create new entry";
const FAVORITE_FAILED: &str = "Failed to update favorite status";
const DELETE_FAILED: &str = "Failed to delete entry";
const UPDATE_FAILED: &str = "Failed to update entry";

/// The list of entries currently shown, plus its load phase and last error.
///
/// Server state is authoritative: every mutation waits for the backend and
/// then applies exactly what it returned.
#[derive(Debug)]
pub struct EntryCollection<A> {
    api: A,
    entries: Vec<Entry>,
    settled: LoadPhase,
    error: Option<String>,
    generations: Generations,
    scope: ViewScope,
}

impl<A: ScrapbookApi> EntryCollection<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            entries: Vec::new(),
            settled: LoadPhase::Loading,
            error: None,
            generations: Generations::default(),
            scope: ViewScope::new(),
        }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn get(&self, id: EntryId) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub const fn phase(&self) -> LoadPhase {
        if self.generations.in_flight() {
            LoadPhase::Loading
        } else {
            self.settled
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub const fn api(&self) -> &A {
        &self.api
    }

    pub fn scope_handle(&self) -> ScopeHandle {
        self.scope.handle()
    }

    /// Close the view scope; requests still in flight resolve as cancelled.
    pub fn close(&self) {
        self.scope.close();
    }

    /// Initial load with no filters.
    pub async fn load(&mut self) -> Outcome {
        self.refresh(&EntryQuery::default(), RefreshReason::Load)
            .await
    }

    /// Replace the list with the results of `query`.
    pub async fn refresh(&mut self, query: &EntryQuery, reason: RefreshReason) -> Outcome {
        self.fetch(query, reason.failure_message()).await
    }

    async fn fetch(&mut self, query: &EntryQuery, failure_message: &'static str) -> Outcome {
        let ticket = self.begin_fetch();
        let result = self.scope.run(self.api.list_entries(query)).await;
        match result {
            Some(result) => self.apply_fetch(ticket, result, failure_message),
            None => self.cancel_fetch(ticket),
        }
    }

    /// Issue a ticket for a list fetch the caller runs itself.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.generations.issue()
    }

    /// Apply a list response unless a newer one already was.
    pub fn finish_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<Entry>>,
        reason: RefreshReason,
    ) -> Outcome {
        self.apply_fetch(ticket, result, reason.failure_message())
    }

    fn apply_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<Entry>>,
        failure_message: &'static str,
    ) -> Outcome {
        if self.scope.is_closed() {
            return self.cancel_fetch(ticket);
        }
        if !self.generations.resolve(ticket) {
            tracing::warn!(?ticket, "Discarding stale entry list response");
            return Outcome::Stale;
        }
        match result {
            Ok(entries) => {
                tracing::debug!(count = entries.len(), "Entry list applied");
                self.entries = entries;
                self.settled = LoadPhase::Ready;
                self.error = None;
                Outcome::Applied
            }
            Err(error) => {
                tracing::warn!("{failure_message}: {error}");
                self.settled = LoadPhase::Failed;
                self.error = Some(failure_message.to_string());
                Outcome::Failed
            }
        }
    }

    fn cancel_fetch(&mut self, ticket: FetchTicket) -> Outcome {
        tracing::warn!(?ticket, "Entry list request cancelled with its view");
        self.generations.resolve(ticket);
        Outcome::Cancelled
    }

    /// Create on the server, then reload the unfiltered list. A failed
    /// reload reports the create message.
    pub async fn create(&mut self, fields: &EntryFields, image: ImageUpload) -> Outcome {
        let Some(result) = self.scope.run(self.api.create_entry(fields, image)).await else {
            return Outcome::Cancelled;
        };
        match result {
            Ok(entry) => {
                tracing::info!("Created entry {}", entry.id);
                self.fetch(&EntryQuery::default(), CREATE_FAILED).await
            }
            Err(error) => self.fail(CREATE_FAILED, &error),
        }
    }

    /// Soft delete on the server, then drop the entry locally.
    pub async fn delete(&mut self, id: EntryId) -> Outcome {
        let Some(result) = self.scope.run(self.api.delete_entry(id)).await else {
            return Outcome::Cancelled;
        };
        match result {
            Ok(()) => {
                self.entries.retain(|entry| entry.id != id);
                self.error = None;
                Outcome::Applied
            }
            Err(error) => self.fail(DELETE_FAILED, &error),
        }
    }

    /// Flip the favorite flag on the server and adopt its returned entry.
    pub async fn toggle_favorite(&mut self, id: EntryId) -> Outcome {
        let Some(result) = self.scope.run(self.api.toggle_favorite(id)).await else {
            return Outcome::Cancelled;
        };
        match result {
            Ok(entry) => {
                self.replace(entry);
                Outcome::Applied
            }
            Err(error) => self.fail(FAVORITE_FAILED, &error),
        }
    }

    pub async fn update(
        &mut self,
        id: EntryId,
        fields: &EntryFields,
        image: Option<ImageUpload>,
    ) -> Outcome {
        let Some(result) = self
            .scope
            .run(self.api.update_entry(id, fields, image))
            .await
        else {
            return Outcome::Cancelled;
        };
        match result {
            Ok(entry) => {
                self.replace(entry);
                Outcome::Applied
            }
            Err(error) => self.fail(UPDATE_FAILED, &error),
        }
    }

    /// Add an entry the trash view restored. An entry with the same id is
    /// replaced instead of duplicated.
    pub fn push_restored(&mut self, entry: Entry) {
        if self.scope.is_closed() {
            return;
        }
        match self.entries.iter_mut().find(|existing| existing.id == entry.id) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    fn replace(&mut self, entry: Entry) {
        if let Some(existing) = self.entries.iter_mut().find(|existing| existing.id == entry.id) {
            *existing = entry;
        }
        self.error = None;
    }

    fn fail(&mut self, message: &str, error: &Error) -> Outcome {
        tracing::warn!("{message}: {error}");
        self.error = Some(message.to_string());
        Outcome::Failed
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::api::fake::{sample_entry, FakeScrapbook};
    use crate::error::ApiOperation;
    use crate::query::{QueryController, SortKey};

    fn ids(collection: &EntryCollection<FakeScrapbook>) -> Vec<i64> {
        collection.entries().iter().map(|entry| entry.id.get()).collect()
    }

    fn two_entries() -> FakeScrapbook {
        FakeScrapbook::with_entries(vec![
            sample_entry(1, "B", "2024-01-02"),
            sample_entry(2, "A", "2024-01-01"),
        ])
    }

    #[tokio::test(flavor = "current_thread")]
    async fn starts_loading_then_ready() {
        let mut collection = EntryCollection::new(two_entries());
        assert_eq!(collection.phase(), LoadPhase::Loading);

        assert_eq!(collection.load().await, Outcome::Applied);
        assert_eq!(collection.phase(), LoadPhase::Ready);
        assert_eq!(ids(&collection), vec![1, 2]);
        assert_eq!(collection.error(), None);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn sorting_by_title_or_date_ascending_orders_both_the_same() {
        let mut collection = EntryCollection::new(two_entries());
        let mut controller = QueryController::new();

        let query = controller.click_sort(SortKey::Title);
        collection.refresh(&query, RefreshReason::Sort).await;
        assert_eq!(ids(&collection), vec![2, 1]);

        let query = controller.click_sort(SortKey::Date);
        collection.refresh(&query, RefreshReason::Sort).await;
        assert_eq!(ids(&collection), vec![2, 1]);

        let query = controller.click_sort(SortKey::Date);
        collection.refresh(&query, RefreshReason::Sort).await;
        assert_eq!(ids(&collection), vec![1, 2]);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn favorites_filter_with_no_favorites_is_empty_then_restores() {
        let mut collection = EntryCollection::new(two_entries());
        let mut controller = QueryController::new();
        collection.load().await;

        let query = controller.toggle_favorites_only();
        collection.refresh(&query, RefreshReason::Favorites).await;
        assert!(collection.is_empty());
        assert_eq!(collection.phase(), LoadPhase::Ready);

        let query = controller.toggle_favorites_only();
        collection.refresh(&query, RefreshReason::Favorites).await;
        assert_eq!(collection.len(), 2);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn clearing_search_fetches_unfiltered_list() {
        let api = FakeScrapbook::with_entries(vec![
            sample_entry(1, "Sunset pier", "2024-03-01"),
            sample_entry(2, "Snow", "2023-12-24"),
        ]);
        let mut collection = EntryCollection::new(api.clone());
        let mut controller = QueryController::new();

        let query = controller.apply_search(
            Some("sunset".to_string()),
            Some("2024-01-01".to_string()),
            Some("2024-12-31".to_string()),
        );
        collection.refresh(&query, RefreshReason::Search).await;
        assert_eq!(ids(&collection), vec![1]);

        let query = controller.clear_search();
        collection.refresh(&query, RefreshReason::Search).await;
        assert_eq!(ids(&collection), vec![1, 2]);
        assert_eq!(api.list_calls().last(), Some(&EntryQuery::default()));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn failed_fetch_keeps_list_and_sets_message() {
        let api = two_entries();
        let mut collection = EntryCollection::new(api.clone());
        collection.load().await;

        api.fail(ApiOperation::ListEntries);
        let mut controller = QueryController::new();
        let query = controller.click_sort(SortKey::Title);
        assert_eq!(
            collection.refresh(&query, RefreshReason::Sort).await,
            Outcome::Failed
        );
        assert_eq!(ids(&collection), vec![1, 2]);
        assert_eq!(collection.error(), Some("Failed to sort entries"));
        assert_eq!(collection.phase(), LoadPhase::Failed);

        api.recover(ApiOperation::ListEntries);
        collection.refresh(&query, RefreshReason::Sort).await;
        assert_eq!(collection.error(), None);
        assert_eq!(collection.phase(), LoadPhase::Ready);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn failed_initial_load_is_failed_phase() {
        let api = two_entries();
        api.fail(ApiOperation::ListEntries);
        let mut collection = EntryCollection::new(api);

        assert_eq!(collection.load().await, Outcome::Failed);
        assert_eq!(collection.phase(), LoadPhase::Failed);
        assert_eq!(collection.error(), Some("Failed to fetch stories"));
        assert!(collection.is_empty());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn stale_response_never_overwrites_newer_one() {
        let mut collection = EntryCollection::new(FakeScrapbook::default());
        let older = collection.begin_fetch();
        let newer = collection.begin_fetch();

        let fresh = vec![sample_entry(2, "A", "2024-01-01")];
        let outdated = vec![sample_entry(1, "B", "2024-01-02")];

        assert_eq!(
            collection.finish_fetch(newer, Ok(fresh), RefreshReason::Search),
            Outcome::Applied
        );
        assert_eq!(
            collection.finish_fetch(older, Ok(outdated), RefreshReason::Search),
            Outcome::Stale
        );
        assert_eq!(ids(&collection), vec![2]);
        assert_eq!(collection.phase(), LoadPhase::Ready);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn older_response_first_stays_loading_until_newest_arrives() {
        let mut collection = EntryCollection::new(FakeScrapbook::default());
        let older = collection.begin_fetch();
        let newer = collection.begin_fetch();

        collection.finish_fetch(
            older,
            Ok(vec![sample_entry(1, "B", "2024-01-02")]),
            RefreshReason::Search,
        );
        assert_eq!(collection.phase(), LoadPhase::Loading);

        collection.finish_fetch(
            newer,
            Ok(vec![sample_entry(2, "A", "2024-01-01")]),
            RefreshReason::Search,
        );
        assert_eq!(collection.phase(), LoadPhase::Ready);
        assert_eq!(ids(&collection), vec![2]);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn response_after_scope_closed_leaves_state_unchanged() {
        let api = two_entries();
        let mut collection = EntryCollection::new(api.clone());
        collection.load().await;

        let ticket = collection.begin_fetch();
        collection.close();
        let outcome = collection.finish_fetch(ticket, Ok(Vec::new()), RefreshReason::Load);
        assert_eq!(outcome, Outcome::Cancelled);
        assert_eq!(ids(&collection), vec![1, 2]);
        assert_eq!(collection.phase(), LoadPhase::Ready);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn closing_scope_cancels_in_flight_request() {
        let api = two_entries();
        let mut collection = EntryCollection::new(api.clone());
        collection.load().await;

        api.hold_requests();
        let handle = collection.scope_handle();
        let query = EntryQuery::default();
        let (outcome, ()) = tokio::join!(
            collection.refresh(&query, RefreshReason::Load),
            async { handle.close() }
        );
        assert_eq!(outcome, Outcome::Cancelled);
        assert_eq!(ids(&collection), vec![1, 2]);
        assert_eq!(collection.error(), None);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn create_refetches_unfiltered_list() {
        let api = two_entries();
        let mut collection = EntryCollection::new(api.clone());
        let mut controller = QueryController::new();
        let query = controller.toggle_favorites_only();
        collection.refresh(&query, RefreshReason::Favorites).await;
        assert!(collection.is_empty());

        let outcome = collection
            .create(
                &EntryFields::new("Lake", "2024-07-04", "Swim"),
                ImageUpload::new("lake.jpg", b"jpeg".to_vec()),
            )
            .await;
        assert_eq!(outcome, Outcome::Applied);
        assert_eq!(ids(&collection), vec![1, 2, 3]);
        assert_eq!(api.list_calls().last(), Some(&EntryQuery::default()));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn create_failure_sets_message() {
        let api = two_entries();
        api.fail(ApiOperation::CreateEntry);
        let mut collection = EntryCollection::new(api);
        collection.load().await;

        let outcome = collection
            .create(
                &EntryFields::new("Lake", "2024-07-04", ""),
                ImageUpload::new("lake.jpg", b"jpeg".to_vec()),
            )
            .await;
        assert_eq!(outcome, Outcome::Failed);
        assert_eq!(collection.error(), Some("Failed to create new entry"));
        assert_eq!(collection.len(), 2);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn failed_reload_after_create_reports_create_message() {
        let api = two_entries();
        let mut collection = EntryCollection::new(api.clone());
        collection.load().await;

        api.fail(ApiOperation::ListEntries);
        let outcome = collection
            .create(
                &EntryFields::new("Lake", "2024-07-04", ""),
                ImageUpload::new("lake.jpg", b"jpeg".to_vec()),
            )
            .await;
        assert_eq!(outcome, Outcome::Failed);
        assert_eq!(collection.error(), Some("Failed to create new entry"));
        assert_eq!(collection.phase(), LoadPhase::Failed);
        assert_eq!(ids(&collection), vec![1, 2]);
        assert!(api.stored(EntryId::new(3)).is_some());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn delete_removes_locally_only_after_server_success() {
        let api = two_entries();
        let mut collection = EntryCollection::new(api.clone());
        collection.load().await;

        api.fail(ApiOperation::DeleteEntry);
        assert_eq!(collection.delete(EntryId::new(1)).await, Outcome::Failed);
        assert_eq!(ids(&collection), vec![1, 2]);
        assert_eq!(collection.error(), Some("Failed to delete entry"));

        api.recover(ApiOperation::DeleteEntry);
        assert_eq!(collection.delete(EntryId::new(1)).await, Outcome::Applied);
        assert_eq!(ids(&collection), vec![2]);
        assert_eq!(collection.error(), None);
        assert_eq!(api.list_calls().len(), 1);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn toggle_favorite_adopts_server_object() {
        let api = two_entries();
        let mut collection = EntryCollection::new(api.clone());
        collection.load().await;

        assert_eq!(
            collection.toggle_favorite(EntryId::new(2)).await,
            Outcome::Applied
        );
        let local = collection.get(EntryId::new(2)).unwrap();
        assert!(local.is_favorite);
        assert_eq!(Some(local.clone()), api.stored(EntryId::new(2)));

        api.fail(ApiOperation::ToggleFavorite);
        assert_eq!(
            collection.toggle_favorite(EntryId::new(2)).await,
            Outcome::Failed
        );
        assert!(collection.get(EntryId::new(2)).unwrap().is_favorite);
        assert_eq!(collection.error(), Some("Failed to update favorite status"));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn update_replaces_entry_in_place() {
        let api = two_entries();
        let mut collection = EntryCollection::new(api);
        collection.load().await;

        let outcome = collection
            .update(
                EntryId::new(1),
                &EntryFields::new("Beach", "2024-01-02", "Waves"),
                None,
            )
            .await;
        assert_eq!(outcome, Outcome::Applied);
        assert_eq!(ids(&collection), vec![1, 2]);
        let updated = collection.get(EntryId::new(1)).unwrap();
        assert_eq!(updated.title, "Beach");
        assert_eq!(updated.story, "Waves");
        assert_eq!(updated.image_url.as_deref(), Some("1.png"));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn push_restored_replaces_same_id() {
        let mut collection = EntryCollection::new(two_entries());
        collection.load().await;

        let mut restored = sample_entry(2, "A again", "2024-01-01");
        restored.is_favorite = true;
        collection.push_restored(restored.clone());
        collection.push_restored(sample_entry(9, "New", "2024-05-05"));

        assert_eq!(ids(&collection), vec![1, 2, 9]);
        assert_eq!(collection.get(EntryId::new(2)), Some(&restored));
    }
}
