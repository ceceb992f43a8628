//! # Schema Mapper Core
//!
//! Keeps an embedded UI in step with a CAD document and decides which export
//! schemas the selected objects can take.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 mapper-core                 │
//! ├─────────────────────────────────────────────┤
//! │  Schema Registry  │  Classifier             │
//! │  - Built-ins      │  - Shape rules          │
//! │  - JSON reload    │  - Selection intersect  │
//! ├─────────────────────────────────────────────┤
//! │  Change Tracker   │  Message Bridge         │
//! │  - Dirty flags    │  - Action dispatch      │
//! │  - Idle tick      │  - Outbound pushes      │
//! ├─────────────────────────────────────────────┤
//! │  DocumentAdapter (host document, events)    │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Document events only mark state stale. The host's idle heartbeat calls
//! [`Bridge::tick`], which pushes at most one event to the UI.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod bridge;
pub mod classify;
pub mod document;
pub mod error;
pub mod geometry;
pub mod overlay;
pub mod protocol;
pub mod registry;
pub mod schema;
pub mod store;
pub mod tracker;

pub use bridge::{Bridge, MemoryTransport, Transport, TransportError};
pub use classify::{classify_one, classify_selection, KindSet};
pub use document::{
    DocumentAdapter, DocumentError, DocumentEvent, DocumentListener, DocumentResult,
    ObjectHandle, ObjectId, SubscriptionId,
};
pub use error::{MapperError, MapperResult};
pub use geometry::{Curve, Point3, Shape};
pub use overlay::{Color, ColorParseError, HighlightOverlay, HighlightPrimitive};
pub use protocol::{
    ExistingSchema, InboundAction, OutboundEvent, SelectionSnapshot, OBJECT_SCHEMAS_EVENT,
    OBJECT_SELECTION_EVENT,
};
pub use registry::{RegistryError, SchemaRegistry};
pub use schema::{
    Schema, SchemaAssignment, SchemaKind, SchemaParam, INCOMPATIBLE_SELECTION, OBJECT_ID_FIELD,
    SCHEMA_ATTRIBUTE,
};
pub use store::{DocumentFile, DocumentObject, MemoryDocument};
pub use tracker::{ChangeTracker, DirtyFlags, PendingPush};

/// Mapper core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
