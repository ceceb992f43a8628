//! Change tracking between document events and UI pushes.
//!
//! Document callbacks only flip a flag; the idle tick decides what to push.
//! Many selection events between two ticks therefore cost one push.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::document::{DocumentAdapter, SubscriptionId};

/// The two staleness flags shared by producers and the tick.
#[derive(Debug, Default)]
pub struct DirtyFlags {
    selection_expired: AtomicBool,
    schema_log_expired: AtomicBool,
}

impl DirtyFlags {
    /// Mark the selection view stale.
    pub fn expire_selection(&self) {
        self.selection_expired.store(true, Ordering::SeqCst);
    }

    /// Mark the schema log view stale.
    pub fn expire_schema_log(&self) {
        self.schema_log_expired.store(true, Ordering::SeqCst);
    }

    /// Whether a selection push is pending.
    #[must_use]
    pub fn selection_expired(&self) -> bool {
        self.selection_expired.load(Ordering::SeqCst)
    }

    /// Whether a schema log push is pending.
    #[must_use]
    pub fn schema_log_expired(&self) -> bool {
        self.schema_log_expired.load(Ordering::SeqCst)
    }

    fn take_selection(&self) -> bool {
        self.selection_expired.swap(false, Ordering::SeqCst)
    }

    fn take_schema_log(&self) -> bool {
        self.schema_log_expired.swap(false, Ordering::SeqCst)
    }
}

/// What the current tick has to push.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingPush {
    /// Send `object-selection`.
    Selection,
    /// Send `object-schemas`.
    SchemaLog,
}

/// Owns the dirty flags and the document subscription feeding them.
#[derive(Debug, Default)]
pub struct ChangeTracker {
    flags: Arc<DirtyFlags>,
    subscription: Option<SubscriptionId>,
}

impl ChangeTracker {
    /// Create a detached tracker with both flags clear.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to `doc` so selection events expire the selection view.
    ///
    /// Attaching again first drops the previous subscription from `doc`.
    pub fn attach<D: DocumentAdapter + ?Sized>(&mut self, doc: &mut D) {
        self.detach(doc);
        let flags = Arc::clone(&self.flags);
        let id = doc.subscribe(Box::new(move |event| {
            tracing::trace!("Document event: {event:?}");
            flags.expire_selection();
        }));
        self.subscription = Some(id);
    }

    /// Remove the subscription from `doc`, if any.
    pub fn detach<D: DocumentAdapter + ?Sized>(&mut self, doc: &mut D) {
        if let Some(id) = self.subscription.take() {
            doc.unsubscribe(id);
        }
    }

    /// Whether the tracker is subscribed to a document.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.subscription.is_some()
    }

    /// Shared flags, for producers outside the document.
    #[must_use]
    pub fn flags(&self) -> &Arc<DirtyFlags> {
        &self.flags
    }

    /// Mark the selection view stale.
    pub fn mark_selection_expired(&self) {
        self.flags.expire_selection();
    }

    /// Mark the schema log stale after an assignment changed.
    pub fn mark_schema_log_expired(&self) {
        self.flags.expire_schema_log();
    }

    /// Consume the flags for one tick.
    ///
    /// Selection wins over the schema log. Servicing the selection re-expires
    /// the schema log, which is then pushed on the following tick.
    #[must_use]
    pub fn poll(&self) -> Option<PendingPush> {
        if self.flags.take_selection() {
            self.flags.expire_schema_log();
            return Some(PendingPush::Selection);
        }
        if self.flags.take_schema_log() {
            return Some(PendingPush::SchemaLog);
        }
        None
    }
}
