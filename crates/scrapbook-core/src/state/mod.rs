//! View state containers for the entry list and the trash.
//!
//! Both containers are single-writer. Every request they issue runs inside
//! their [`ViewScope`]; list fetches additionally carry a [`FetchTicket`] so
//! an older response can never overwrite a newer one.

mod deleted;
mod entries;

pub use deleted::DeletedCollection;
pub use entries::{EntryCollection, RefreshReason};

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;

/// Load status of a collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadPhase {
    Loading,
    Ready,
    Failed,
}

/// What happened to one request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The response was applied to the collection.
    Applied,
    /// A newer list response was already applied; this one was dropped.
    Stale,
    /// The request failed; the collection's error message is set.
    Failed,
    /// The view scope closed before the response arrived.
    Cancelled,
}

impl Outcome {
    #[must_use]
    pub const fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Generation number of one list fetch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

/// Issued and resolved fetch generations.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Generations {
    issued: u64,
    resolved: u64,
}

impl Generations {
    pub(crate) fn issue(&mut self) -> FetchTicket {
        self.issued += 1;
        FetchTicket(self.issued)
    }

    /// Marks `ticket` resolved if nothing newer already was.
    /// Returns false for a stale ticket.
    pub(crate) fn resolve(&mut self, ticket: FetchTicket) -> bool {
        if ticket.0 <= self.resolved {
            return false;
        }
        self.resolved = ticket.0;
        true
    }

    /// True while the newest issued fetch has not resolved.
    pub(crate) const fn in_flight(&self) -> bool {
        self.issued > self.resolved
    }
}

/// Cancellation handle of a view scope. Clones observe the same scope and
/// can be moved into spawned tasks.
#[derive(Clone, Debug)]
pub struct ScopeHandle {
    closed: Arc<watch::Sender<bool>>,
}

impl ScopeHandle {
    fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            closed: Arc::new(sender),
        }
    }

    pub fn close(&self) {
        self.closed.send_replace(true);
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    /// Resolves once the scope is closed.
    pub async fn closed(&self) {
        let mut receiver = self.closed.subscribe();
        // Err means every sender is gone, which only happens once the scope is.
        let _ = receiver.wait_for(|closed| *closed).await;
    }

    /// Run `future` unless the scope closes first. `None` means cancelled.
    pub async fn run<F: Future>(&self, future: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            () = self.closed() => None,
            output = future => Some(output),
        }
    }
}

/// Lifetime of one view. Dropping it cancels everything still running in it.
#[derive(Debug)]
pub struct ViewScope {
    handle: ScopeHandle,
}

impl ViewScope {
    #[must_use]
    pub fn new() -> Self {
        Self {
            handle: ScopeHandle::new(),
        }
    }

    #[must_use]
    pub fn handle(&self) -> ScopeHandle {
        self.handle.clone()
    }

    pub fn close(&self) {
        self.handle.close();
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.handle.is_closed()
    }

    pub(crate) async fn run<F: Future>(&self, future: F) -> Option<F::Output> {
        self.handle.run(future).await
    }
}

impl Default for ViewScope {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        self.handle.close();
    }
}
