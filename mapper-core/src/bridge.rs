//! Message bridge between the document and the UI surface.
//!
//! The bridge owns the document adapter, the outbound transport, the change
//! tracker and the hover overlay. Inbound envelopes go through
//! [`Bridge::dispatch`]; the host's idle heartbeat calls [`Bridge::tick`],
//! which pushes at most one event.
//!
//! Nothing here escalates: malformed envelopes are dropped, per-object
//! failures are logged and skipped, and failed sends are discarded. The next
//! state change re-dirties the flags and the UI catches up.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::classify::classify_selection;
use crate::document::{DocumentAdapter, ObjectId};
use crate::overlay::HighlightOverlay;
use crate::protocol::{ExistingSchema, InboundAction, OutboundEvent, SelectionSnapshot};
use crate::tracker::{ChangeTracker, PendingPush};
use crate::{MapperResult, SchemaAssignment, SchemaRegistry, SCHEMA_ATTRIBUTE};

/// Errors an outbound transport can report.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The UI surface has not finished loading.
    #[error("UI surface not ready")]
    NotReady,
    /// The receiving side is gone.
    #[error("transport closed")]
    Closed,
}

/// Outbound channel to the UI surface.
///
/// Implementations must not block on delivery.
pub trait Transport {
    /// Hand `payload` to the UI under `event`.
    ///
    /// # Errors
    ///
    /// Returns an error if the message could not be handed over.
    fn send(&self, event: &str, payload: &str) -> Result<(), TransportError>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(&self, event: &str, payload: &str) -> Result<(), TransportError> {
        (**self).send(event, payload)
    }
}

/// Transport that keeps every message in memory.
#[derive(Debug)]
pub struct MemoryTransport {
    sent: Mutex<Vec<(String, String)>>,
    ready: AtomicBool,
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            ready: AtomicBool::new(true),
        }
    }
}

impl MemoryTransport {
    /// Create a ready transport.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the UI surface (un)loading.
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    /// Drain the messages sent so far.
    pub fn take(&self) -> Vec<(String, String)> {
        let mut sent = self
            .sent
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        std::mem::take(&mut *sent)
    }
}

impl Transport for MemoryTransport {
    fn send(&self, event: &str, payload: &str) -> Result<(), TransportError> {
        if !self.ready.load(Ordering::SeqCst) {
            return Err(TransportError::NotReady);
        }
        self.sent
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push((event.to_string(), payload.to_string()));
        Ok(())
    }
}

/// Routes UI actions to the document and document state to the UI.
pub struct Bridge<D, T> {
    document: D,
    transport: T,
    registry: Arc<SchemaRegistry>,
    tracker: ChangeTracker,
    overlay: HighlightOverlay,
}

impl<D, T> Bridge<D, T>
where
    D: DocumentAdapter,
    T: Transport,
{
    /// Create a bridge and start tracking `document`.
    pub fn new(mut document: D, transport: T, registry: Arc<SchemaRegistry>) -> Self {
        let mut tracker = ChangeTracker::new();
        tracker.attach(&mut document);
        Self {
            document,
            transport,
            registry,
            tracker,
            overlay: HighlightOverlay::default(),
        }
    }

    /// Use a preconfigured overlay.
    #[must_use]
    pub fn with_overlay(mut self, overlay: HighlightOverlay) -> Self {
        self.overlay = overlay;
        self
    }

    /// Stop tracking and hand back the document and transport.
    pub fn into_parts(mut self) -> (D, T) {
        self.tracker.detach(&mut self.document);
        (self.document, self.transport)
    }

    /// The tracked document.
    #[must_use]
    pub fn document(&self) -> &D {
        &self.document
    }

    /// Mutable access to the tracked document, for host-side edits.
    pub fn document_mut(&mut self) -> &mut D {
        &mut self.document
    }

    /// The outbound transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The schema catalog in use.
    #[must_use]
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Swap in a reloaded catalog; the selection view is refreshed next tick.
    pub fn set_registry(&mut self, registry: Arc<SchemaRegistry>) {
        self.registry = registry;
        self.tracker.mark_selection_expired();
    }

    /// The change tracker.
    #[must_use]
    pub fn tracker(&self) -> &ChangeTracker {
        &self.tracker
    }

    /// The hover overlay.
    #[must_use]
    pub fn overlay(&self) -> &HighlightOverlay {
        &self.overlay
    }

    /// Mutable access to the hover overlay.
    pub fn overlay_mut(&mut self) -> &mut HighlightOverlay {
        &mut self.overlay
    }

    /// Handle one raw envelope from the UI.
    ///
    /// Envelopes that fail to parse are dropped without a reply.
    pub fn dispatch(&mut self, raw: &str) {
        match InboundAction::parse(raw) {
            Ok(action) => self.handle(action),
            Err(e) => tracing::debug!("Dropping inbound message: {e}"),
        }
    }

    /// Handle one decoded action.
    pub fn handle(&mut self, action: InboundAction) {
        tracing::debug!("Handling action {}", action.name());
        match action {
            InboundAction::SetSchema { object_ids, schema } => {
                let written = object_ids
                    .iter()
                    .filter(|raw| match self.assign(raw, &schema) {
                        Ok(()) => true,
                        Err(e) => {
                            tracing::warn!("set-schema skipped object {raw}: {e}");
                            false
                        }
                    })
                    .count();
                tracing::debug!(
                    "Assigned {:?} to {written}/{} objects",
                    schema.name(),
                    object_ids.len()
                );
                self.tracker.mark_schema_log_expired();
            }
            InboundAction::ClearSchemaAll => {
                for id in self.document.find_all_by_attribute(SCHEMA_ATTRIBUTE, "*") {
                    if let Err(e) = self.document.delete_attribute(id, SCHEMA_ATTRIBUTE) {
                        tracing::warn!("clear-schema-all skipped object {id}: {e}");
                    }
                }
                self.tracker.mark_schema_log_expired();
            }
            InboundAction::SetHover { object_ids } => {
                self.overlay.set_object_ids(object_ids);
                self.document.redraw();
            }
            InboundAction::SetSelect { object_ids } => {
                if let Err(e) = self.select(&object_ids) {
                    tracing::warn!("set-select failed: {e}");
                }
            }
            InboundAction::Unknown => tracing::debug!("Ignoring unknown action"),
        }
    }

    fn assign(&mut self, raw: &str, schema: &SchemaAssignment) -> MapperResult<()> {
        let id = ObjectId::parse(raw)?;
        let value = schema.for_object(id).to_attribute()?;
        self.document.set_attribute(id, SCHEMA_ATTRIBUTE, &value)?;
        Ok(())
    }

    fn select(&mut self, raw_ids: &[String]) -> MapperResult<()> {
        let ids = raw_ids
            .iter()
            .map(|raw| ObjectId::parse(raw))
            .collect::<Result<Vec<_>, _>>()?;
        self.document.select_only(&ids)?;
        self.document.zoom_to_selection();
        Ok(())
    }

    fn stored_assignment(&self, id: ObjectId) -> Option<SchemaAssignment> {
        let raw = self.document.attribute(id, SCHEMA_ATTRIBUTE)?;
        match SchemaAssignment::from_attribute(&raw) {
            Ok(assignment) => Some(assignment),
            Err(e) => {
                tracing::warn!("Ignoring unreadable schema on object {id}: {e}");
                None
            }
        }
    }

    /// Compute the selection payload from the current document state.
    #[must_use]
    pub fn selection_snapshot(&self) -> SelectionSnapshot {
        let selected = self.document.selected_objects();
        let viable_schemas = classify_selection(selected.iter().map(|o| &o.shape))
            .map(|kinds| self.registry.resolve(&kinds))
            .unwrap_or_default();
        let existing_schemas = selected
            .iter()
            .filter_map(|o| {
                self.stored_assignment(o.id).map(|schema| ExistingSchema {
                    id: o.id,
                    schema,
                })
            })
            .collect();
        SelectionSnapshot {
            viable_schemas,
            object_ids: selected.iter().map(|o| o.id).collect(),
            existing_schemas,
        }
    }

    /// Every assignment stored in the document.
    #[must_use]
    pub fn schema_log(&self) -> Vec<SchemaAssignment> {
        self.document
            .find_all_by_attribute(SCHEMA_ATTRIBUTE, "*")
            .into_iter()
            .filter_map(|id| self.stored_assignment(id))
            .collect()
    }

    /// Service the dirty flags; pushes at most one event.
    ///
    /// Returns what was pushed, if anything.
    pub fn tick(&self) -> Option<PendingPush> {
        let pending = self.tracker.poll()?;
        let event = match pending {
            PendingPush::Selection => OutboundEvent::ObjectSelection(self.selection_snapshot()),
            PendingPush::SchemaLog => OutboundEvent::ObjectSchemas(self.schema_log()),
        };
        self.push(&event);
        Some(pending)
    }

    /// Serialize and send an event.
    pub fn push(&self, event: &OutboundEvent) {
        match event.payload() {
            Ok(payload) => self.send(event.name(), &payload),
            Err(e) => tracing::warn!("Failed to encode {}: {e}", event.name()),
        }
    }

    /// Fire-and-forget send; failures are logged and discarded.
    pub fn send(&self, event: &str, payload: &str) {
        if let Err(e) = self.transport.send(event, payload) {
            tracing::debug!("Dropped {event} push: {e}");
        }
    }
}
