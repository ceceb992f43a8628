//! In-memory document.
//!
//! [`MemoryDocument`] implements [`DocumentAdapter`] over a plain object list.
//! Hosts without a native document use it directly; it is also the test
//! double for the bridge. It can be loaded from and saved to a JSON file so
//! the `schema` attributes written by the bridge survive a restart.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::document::{
    wildcard_match, DocumentAdapter, DocumentError, DocumentEvent, DocumentListener,
    DocumentResult, ObjectHandle, ObjectId, SubscriptionId,
};
use crate::geometry::Shape;

/// One object as stored in a [`MemoryDocument`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentObject {
    /// Object identifier.
    pub id: ObjectId,
    /// Object geometry.
    pub shape: Shape,
    /// User string attributes.
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

/// On-disk form of a [`MemoryDocument`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentFile {
    /// Objects in creation order.
    #[serde(default)]
    pub objects: Vec<DocumentObject>,
    /// Selected object IDs in selection order.
    #[serde(default)]
    pub selection: Vec<ObjectId>,
}

/// Document held entirely in memory.
#[derive(Default)]
pub struct MemoryDocument {
    objects: Vec<DocumentObject>,
    index: HashMap<ObjectId, usize>,
    selection: Vec<ObjectId>,
    listeners: Vec<(SubscriptionId, DocumentListener)>,
    next_subscription: u64,
    redraws: usize,
    zooms: usize,
}

impl std::fmt::Debug for MemoryDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryDocument")
            .field("objects", &self.objects.len())
            .field("selection", &self.selection)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl MemoryDocument {
    /// Create an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a document from its file form.
    ///
    /// Later objects with a duplicate ID replace earlier ones; selected IDs
    /// that no longer exist are dropped.
    #[must_use]
    pub fn from_file(file: DocumentFile) -> Self {
        let mut doc = Self::new();
        for object in file.objects {
            doc.insert(object);
        }
        doc.selection = file
            .selection
            .into_iter()
            .filter(|id| doc.index.contains_key(id))
            .collect();
        doc
    }

    /// Snapshot the document in its file form.
    #[must_use]
    pub fn to_file(&self) -> DocumentFile {
        DocumentFile {
            objects: self.objects.clone(),
            selection: self.selection.clone(),
        }
    }

    /// Parse a document from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is not a valid document.
    pub fn from_json(json: &str) -> DocumentResult<Self> {
        let file: DocumentFile = serde_json::from_str(json)?;
        Ok(Self::from_file(file))
    }

    /// Serialize the document to pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> DocumentResult<String> {
        Ok(serde_json::to_string_pretty(&self.to_file())?)
    }

    /// Load a document file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> DocumentResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Write the document to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: impl AsRef<Path>) -> DocumentResult<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Add an object with a fresh ID.
    pub fn add_object(&mut self, shape: Shape) -> ObjectId {
        let id = ObjectId::new();
        self.insert(DocumentObject {
            id,
            shape,
            attributes: BTreeMap::new(),
        });
        id
    }

    fn insert(&mut self, object: DocumentObject) {
        if let Some(&slot) = self.index.get(&object.id) {
            self.objects[slot] = object;
        } else {
            self.index.insert(object.id, self.objects.len());
            self.objects.push(object);
        }
    }

    /// Get an object by ID.
    #[must_use]
    pub fn object(&self, id: ObjectId) -> Option<&DocumentObject> {
        self.index.get(&id).map(|&slot| &self.objects[slot])
    }

    fn object_mut(&mut self, id: ObjectId) -> DocumentResult<&mut DocumentObject> {
        let slot = *self.index.get(&id).ok_or(DocumentError::ObjectNotFound(id))?;
        Ok(&mut self.objects[slot])
    }

    /// All objects in creation order.
    pub fn objects(&self) -> impl Iterator<Item = &DocumentObject> {
        self.objects.iter()
    }

    /// Number of objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the document has no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Selected IDs in selection order.
    #[must_use]
    pub fn selection(&self) -> &[ObjectId] {
        &self.selection
    }

    /// Add objects to the selection, as a user pick would.
    ///
    /// # Errors
    ///
    /// Returns an error if any object does not exist; nothing is selected then.
    pub fn select(&mut self, ids: &[ObjectId]) -> DocumentResult<()> {
        self.check_exist(ids)?;
        for id in ids {
            if !self.selection.contains(id) {
                self.selection.push(*id);
            }
        }
        if !ids.is_empty() {
            self.notify(DocumentEvent::SelectionChanged);
        }
        Ok(())
    }

    /// Remove objects from the selection.
    pub fn deselect(&mut self, ids: &[ObjectId]) {
        let before = self.selection.len();
        self.selection.retain(|id| !ids.contains(id));
        if self.selection.len() != before {
            self.notify(DocumentEvent::Deselection);
        }
    }

    /// Clear the selection.
    pub fn deselect_all(&mut self) {
        self.selection.clear();
        self.notify(DocumentEvent::DeselectAll);
    }

    /// Tell listeners this document became the active one.
    pub fn activate(&mut self) {
        self.notify(DocumentEvent::ActiveDocumentChanged);
    }

    /// Number of redraw requests received.
    #[must_use]
    pub fn redraw_count(&self) -> usize {
        self.redraws
    }

    /// Number of zoom requests received.
    #[must_use]
    pub fn zoom_count(&self) -> usize {
        self.zooms
    }

    fn check_exist(&self, ids: &[ObjectId]) -> DocumentResult<()> {
        match ids.iter().find(|id| !self.index.contains_key(id)) {
            Some(missing) => Err(DocumentError::ObjectNotFound(*missing)),
            None => Ok(()),
        }
    }

    fn notify(&mut self, event: DocumentEvent) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }
}

impl DocumentAdapter for MemoryDocument {
    fn find_by_id(&self, id: ObjectId) -> DocumentResult<ObjectHandle> {
        self.object(id)
            .map(|o| ObjectHandle {
                id: o.id,
                shape: o.shape.clone(),
            })
            .ok_or(DocumentError::ObjectNotFound(id))
    }

    fn selected_objects(&self) -> Vec<ObjectHandle> {
        self.selection
            .iter()
            .filter_map(|id| self.find_by_id(*id).ok())
            .collect()
    }

    fn select_only(&mut self, ids: &[ObjectId]) -> DocumentResult<()> {
        self.check_exist(ids)?;
        if !self.selection.is_empty() {
            self.deselect_all();
        }
        self.select(ids)
    }

    fn zoom_to_selection(&mut self) {
        self.zooms += 1;
    }

    fn attribute(&self, id: ObjectId, key: &str) -> Option<String> {
        self.object(id).and_then(|o| o.attributes.get(key).cloned())
    }

    fn set_attribute(&mut self, id: ObjectId, key: &str, value: &str) -> DocumentResult<()> {
        self.object_mut(id)?
            .attributes
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete_attribute(&mut self, id: ObjectId, key: &str) -> DocumentResult<()> {
        self.object_mut(id)?.attributes.remove(key);
        Ok(())
    }

    fn find_all_by_attribute(&self, key: &str, pattern: &str) -> Vec<ObjectId> {
        self.objects
            .iter()
            .filter(|o| {
                o.attributes
                    .get(key)
                    .is_some_and(|value| wildcard_match(pattern, value))
            })
            .map(|o| o.id)
            .collect()
    }

    fn redraw(&mut self) {
        self.redraws += 1;
    }

    fn subscribe(&mut self, listener: DocumentListener) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, listener));
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        self.listeners.retain(|(sid, _)| *sid != id);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::geometry::Point3;

    fn recorder(doc: &mut MemoryDocument) -> (SubscriptionId, Arc<Mutex<Vec<DocumentEvent>>>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let id = doc.subscribe(Box::new(move |event| {
            sink.lock().expect("lock").push(event);
        }));
        (id, events)
    }

    #[test]
    fn test_attributes() {
        let mut doc = MemoryDocument::new();
        let id = doc.add_object(Shape::Mesh);
        assert_eq!(doc.attribute(id, "schema"), None);

        doc.set_attribute(id, "schema", "{}").expect("set");
        assert_eq!(doc.attribute(id, "schema").as_deref(), Some("{}"));
        assert_eq!(doc.find_all_by_attribute("schema", "*"), vec![id]);

        doc.delete_attribute(id, "schema").expect("delete");
        doc.delete_attribute(id, "schema").expect("delete twice");
        assert!(doc.find_all_by_attribute("schema", "*").is_empty());

        let missing = ObjectId::new();
        assert!(matches!(
            doc.set_attribute(missing, "schema", "{}"),
            Err(DocumentError::ObjectNotFound(m)) if m == missing
        ));
    }

    #[test]
    fn test_select_only_fires_events() {
        let mut doc = MemoryDocument::new();
        let a = doc.add_object(Shape::Mesh);
        let b = doc.add_object(Shape::Point(Point3::default()));
        let (_, events) = recorder(&mut doc);

        doc.select_only(&[a]).expect("select a");
        doc.select_only(&[b]).expect("select b");
        assert_eq!(doc.selection(), &[b]);
        assert_eq!(
            *events.lock().expect("lock"),
            vec![
                DocumentEvent::SelectionChanged,
                DocumentEvent::DeselectAll,
                DocumentEvent::SelectionChanged,
            ]
        );
    }

    #[test]
    fn test_select_only_unknown_id_leaves_selection() {
        let mut doc = MemoryDocument::new();
        let a = doc.add_object(Shape::Mesh);
        doc.select(&[a]).expect("select");
        assert!(doc.select_only(&[ObjectId::new()]).is_err());
        assert_eq!(doc.selection(), &[a]);
    }

    #[test]
    fn test_unsubscribe_stops_events() {
        let mut doc = MemoryDocument::new();
        let a = doc.add_object(Shape::Mesh);
        let (sub, events) = recorder(&mut doc);
        doc.unsubscribe(sub);
        doc.select(&[a]).expect("select");
        doc.activate();
        assert!(events.lock().expect("lock").is_empty());
    }

    #[test]
    fn test_file_roundtrip_keeps_attributes() {
        let mut doc = MemoryDocument::new();
        let id = doc.add_object(Shape::Mesh);
        doc.set_attribute(id, "schema", r#"{"name":"DirectShape"}"#)
            .expect("set");
        doc.select(&[id]).expect("select");

        let json = doc.to_json().expect("serialize");
        let loaded = MemoryDocument::from_json(&json).expect("deserialize");
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.selection(), &[id]);
        assert_eq!(
            loaded.attribute(id, "schema").as_deref(),
            Some(r#"{"name":"DirectShape"}"#)
        );
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("doc.json");
        let mut doc = MemoryDocument::new();
        doc.add_object(Shape::Mesh);
        doc.save(&path).expect("save");
        let loaded = MemoryDocument::load(&path).expect("load");
        assert_eq!(loaded.len(), 1);
    }
}
