//! The document as seen by the mapper.
//!
//! [`DocumentAdapter`] is the only way the core touches the host document:
//! object lookup, selection, string attributes, view requests and event
//! subscription. The document stays the source of truth for every
//! assignment the mapper makes.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::geometry::Shape;

/// Unique identifier of a document object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectId(Uuid);

impl ObjectId {
    /// Create a new random object ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse the wire form of an ID.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::InvalidId`] if `s` is not a UUID.
    pub fn parse(s: &str) -> Result<Self, DocumentError> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| DocumentError::InvalidId(s.to_string()))
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A resolved document object.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectHandle {
    /// Object identifier.
    pub id: ObjectId,
    /// Object geometry.
    pub shape: Shape,
}

/// Errors reported by a document adapter.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// No object with this ID exists.
    #[error("Object not found: {0}")]
    ObjectNotFound(ObjectId),
    /// The ID string is not a valid object ID.
    #[error("Invalid object id: {0}")]
    InvalidId(String),
    /// Reading or writing the backing file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The backing file is not a valid document.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for document operations.
pub type DocumentResult<T> = Result<T, DocumentError>;

/// Notifications a document raises after it changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentEvent {
    /// Objects were added to the selection.
    SelectionChanged,
    /// Objects were removed from the selection.
    Deselection,
    /// The whole selection was cleared.
    DeselectAll,
    /// Another document became active.
    ActiveDocumentChanged,
}

/// Handle returned by [`DocumentAdapter::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Callback invoked for every [`DocumentEvent`].
pub type DocumentListener = Box<dyn FnMut(DocumentEvent) + Send>;

/// Document operations the mapper consumes.
pub trait DocumentAdapter {
    /// Resolve an object.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::ObjectNotFound`] if the object does not exist.
    fn find_by_id(&self, id: ObjectId) -> DocumentResult<ObjectHandle>;

    /// Currently selected objects, in selection order.
    fn selected_objects(&self) -> Vec<ObjectHandle>;

    /// Replace the selection with exactly `ids`.
    ///
    /// # Errors
    ///
    /// Returns an error if any object does not exist.
    fn select_only(&mut self, ids: &[ObjectId]) -> DocumentResult<()>;

    /// Fit the view to the current selection.
    fn zoom_to_selection(&mut self);

    /// Read a string attribute.
    fn attribute(&self, id: ObjectId, key: &str) -> Option<String>;

    /// Write a string attribute.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::ObjectNotFound`] if the object does not exist.
    fn set_attribute(&mut self, id: ObjectId, key: &str, value: &str) -> DocumentResult<()>;

    /// Remove a string attribute. Removing a missing attribute is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::ObjectNotFound`] if the object does not exist.
    fn delete_attribute(&mut self, id: ObjectId, key: &str) -> DocumentResult<()>;

    /// Objects whose `key` attribute matches `pattern` (`*` and `?` wildcards).
    fn find_all_by_attribute(&self, key: &str, pattern: &str) -> Vec<ObjectId>;

    /// Ask the host to repaint its views.
    fn redraw(&mut self);

    /// Register a listener for document events.
    fn subscribe(&mut self, listener: DocumentListener) -> SubscriptionId;

    /// Remove a listener. Unknown handles are ignored.
    fn unsubscribe(&mut self, id: SubscriptionId);
}

/// Match `text` against a pattern where `*` matches any run and `?` one char.
#[must_use]
pub fn wildcard_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();
    let (mut p, mut t) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        match pattern.get(p) {
            Some('*') => {
                backtrack = Some((p, t));
                p += 1;
            }
            Some(&c) if c == '?' || c == text[t] => {
                p += 1;
                t += 1;
            }
            _ => match backtrack {
                Some((star, matched)) => {
                    p = star + 1;
                    t = matched + 1;
                    backtrack = Some((star, matched + 1));
                }
                None => return false,
            },
        }
    }
    pattern[p..].iter().all(|&c| c == '*')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_id_parse() {
        let id = ObjectId::new();
        assert_eq!(ObjectId::parse(&id.to_string()).expect("valid"), id);
        assert!(matches!(
            ObjectId::parse("not-a-guid"),
            Err(DocumentError::InvalidId(s)) if s == "not-a-guid"
        ));
    }

    #[test]
    fn test_wildcard_match() {
        assert!(wildcard_match("*", ""));
        assert!(wildcard_match("*", "{\"name\":\"Wall\"}"));
        assert!(wildcard_match("*Wall*", "{\"name\":\"Wall\"}"));
        assert!(wildcard_match("W?ll", "Wall"));
        assert!(wildcard_match("a*b*c", "aXXbYYc"));
        assert!(!wildcard_match("a*b*c", "aXXbYY"));
        assert!(!wildcard_match("Wall", "Walls"));
        assert!(!wildcard_match("?", ""));
    }
}
