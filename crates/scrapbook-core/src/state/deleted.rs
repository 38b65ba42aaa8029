//! Trash view state

use super::{FetchTicket, Generations, LoadPhase, Outcome, ScopeHandle, ViewScope};
use crate::api::ScrapbookApi;
use crate::error::{Error, Result};
use crate::models::{DeletedEntry, Entry, EntryId};

const LOAD_FAILED: &str = "Failed to fetch deleted entries";
const RESTORE_FAILED: &str = "Failed to restore entry";
const PURGE_FAILED: &str = "Failed to permanently delete entry";

/// Soft-deleted entries, fetched when the trash view is first visited.
#[derive(Debug)]
pub struct DeletedCollection<A> {
    api: A,
    entries: Vec<DeletedEntry>,
    settled: LoadPhase,
    error: Option<String>,
    generations: Generations,
    scope: ViewScope,
}

impl<A: ScrapbookApi> DeletedCollection<A> {
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

    pub fn entries(&self) -> &[DeletedEntry] {
        &self.entries
    }

    /// Looks up a trash record by its own id.
    pub fn get(&self, id: EntryId) -> Option<&DeletedEntry> {
        self.entries.iter().find(|deleted| deleted.id() == id)
    }

    /// Whether an entry deleted under `original_id` is in the trash.
    pub fn contains_original(&self, original_id: EntryId) -> bool {
        self.entries
            .iter()
            .any(|deleted| deleted.original_id == original_id)
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

    pub fn scope_handle(&self) -> ScopeHandle {
        self.scope.handle()
    }

    pub fn close(&self) {
        self.scope.close();
    }

    pub async fn load(&mut self) -> Outcome {
        let ticket = self.begin_fetch();
        let result = self.scope.run(self.api.list_deleted()).await;
        match result {
            Some(result) => self.finish_fetch(ticket, result),
            None => {
                self.generations.resolve(ticket);
                Outcome::Cancelled
            }
        }
    }

    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.generations.issue()
    }

    pub fn finish_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<DeletedEntry>>,
    ) -> Outcome {
        if self.scope.is_closed() {
            self.generations.resolve(ticket);
            return Outcome::Cancelled;
        }
        if !self.generations.resolve(ticket) {
            tracing::warn!(?ticket, "Discarding stale trash response");
            return Outcome::Stale;
        }
        match result {
            Ok(entries) => {
                tracing::debug!(count = entries.len(), "Trash list applied");
                self.entries = entries;
                self.settled = LoadPhase::Ready;
                self.error = None;
                Outcome::Applied
            }
            Err(error) => {
                self.settled = LoadPhase::Failed;
                self.fail(LOAD_FAILED, &error)
            }
        }
    }

    /// Restore a trash record. The server's recreated entry is passed to
    /// `on_restored` before the record leaves the trash.
    pub async fn restore<F>(&mut self, id: EntryId, on_restored: F) -> Outcome
    where
        F: FnOnce(Entry),
    {
        let Some(result) = self.scope.run(self.api.restore_entry(id)).await else {
            return Outcome::Cancelled;
        };
        match result {
            Ok(entry) => {
                tracing::info!("Restored trash record {} as entry {}", id, entry.id);
                self.entries.retain(|deleted| deleted.id() != id);
                self.error = None;
                on_restored(entry);
                Outcome::Applied
            }
            Err(error) => self.fail(RESTORE_FAILED, &error),
        }
    }

    /// Permanently delete a trash record.
    pub async fn purge(&mut self, id: EntryId) -> Outcome {
        let Some(result) = self.scope.run(self.api.purge_entry(id)).await else {
            return Outcome::Cancelled;
        };
        match result {
            Ok(()) => {
                self.entries.retain(|deleted| deleted.id() != id);
                self.error = None;
                Outcome::Applied
            }
            Err(error) => self.fail(PURGE_FAILED, &error),
        }
    }

    fn fail(&mut self, message: &str, error: &Error) -> Outcome {
        tracing::warn!("{message}: {error}");
        self.error = Some(message.to_string());
        Outcome::Failed
    }
}
