//! Schema data model shared between the registry, the classifier and the UI.
//!
//! A [`Schema`] is identified by its name alone: two schemas with the same
//! name compare equal whatever their parameters, which is what makes
//! intersecting the candidate sets of a multi-object selection meaningful.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::{MapperError, MapperResult, ObjectId};

/// Document attribute key holding a serialized [`SchemaAssignment`].
pub const SCHEMA_ATTRIBUTE: &str = "schema";

/// Field injected into every stored assignment.
pub const OBJECT_ID_FIELD: &str = "objectId";

/// Name of the sentinel schema returned for incompatible selections.
pub const INCOMPATIBLE_SELECTION: &str = "Incompatible Selection";

/// Classification targets known to the engine.
///
/// Declaration order is registry order; sets of kinds iterate in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SchemaKind {
    /// Planar horizontal surfaces.
    Floor,
    /// Single-profile planar extrusions.
    Wall,
    /// Anything exported as raw geometry.
    DirectShape,
    /// Vertical linear curves.
    Column,
    /// Linear curves.
    Beam,
    /// Level lines and arcs.
    Gridline,
    /// Sentinel for selections with no common schema. Never a classification target.
    IncompatibleSelection,
}

impl SchemaKind {
    /// Every kind a shape can classify to, in registry order.
    pub const TARGETS: [Self; 6] = [
        Self::Floor,
        Self::Wall,
        Self::DirectShape,
        Self::Column,
        Self::Beam,
        Self::Gridline,
    ];

    /// Registry name of this kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Floor => "Floor",
            Self::Wall => "Wall",
            Self::DirectShape => "DirectShape",
            Self::Column => "Column",
            Self::Beam => "Beam",
            Self::Gridline => "Gridline",
            Self::IncompatibleSelection => INCOMPATIBLE_SELECTION,
        }
    }

    /// Look a kind up by its registry name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::TARGETS
            .into_iter()
            .chain(std::iter::once(Self::IncompatibleSelection))
            .find(|kind| kind.name() == name)
    }
}

impl std::fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A typed schema parameter.
///
/// The `type` field is the wire discriminant, so a decoder can rebuild the
/// right variant from an untyped payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SchemaParam {
    /// Free text.
    #[serde(rename = "StringParam")]
    String {
        /// Parameter name.
        name: String,
        /// Help text.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        /// Current value.
        #[serde(default)]
        value: Option<String>,
    },
    /// Floating point number.
    #[serde(rename = "DoubleParam")]
    Double {
        /// Parameter name.
        name: String,
        /// Help text.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        /// Current value.
        #[serde(default)]
        value: f64,
    },
    /// Boolean toggle.
    #[serde(rename = "CheckboxParam")]
    Checkbox {
        /// Parameter name.
        name: String,
        /// Help text.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        /// Current value.
        #[serde(default = "default_checked")]
        value: bool,
    },
    /// One choice out of an ordered set of values.
    #[serde(rename = "MultiselectParam")]
    Multiselect {
        /// Parameter name.
        name: String,
        /// Help text.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        /// Available values, unique, in display order.
        #[serde(default, deserialize_with = "deserialize_value_set")]
        values: Vec<String>,
        /// Chosen value, if any.
        #[serde(default)]
        selected: Option<String>,
    },
}

const fn default_checked() -> bool {
    true
}

fn dedup_values(values: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::new();
    for value in values {
        if !unique.contains(&value) {
            unique.push(value);
        }
    }
    unique
}

fn deserialize_value_set<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Vec::<String>::deserialize(deserializer).map(dedup_values)
}

impl SchemaParam {
    /// Text parameter with no value.
    #[must_use]
    pub fn string(name: impl Into<String>) -> Self {
        Self::String {
            name: name.into(),
            description: None,
            value: None,
        }
    }

    /// Numeric parameter.
    #[must_use]
    pub fn double(name: impl Into<String>, value: f64) -> Self {
        Self::Double {
            name: name.into(),
            description: None,
            value,
        }
    }

    /// Checkbox parameter.
    #[must_use]
    pub fn checkbox(name: impl Into<String>, value: bool) -> Self {
        Self::Checkbox {
            name: name.into(),
            description: None,
            value,
        }
    }

    /// Multiselect parameter; duplicate values are dropped, first one wins.
    #[must_use]
    pub fn multiselect<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Multiselect {
            name: name.into(),
            description: None,
            values: dedup_values(values.into_iter().map(Into::into)),
            selected: None,
        }
    }

    /// Attach help text.
    #[must_use]
    pub fn with_description(mut self, text: impl Into<String>) -> Self {
        match &mut self {
            Self::String { description, .. }
            | Self::Double { description, .. }
            | Self::Checkbox { description, .. }
            | Self::Multiselect { description, .. } => *description = Some(text.into()),
        }
        self
    }

    /// Parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::String { name, .. }
            | Self::Double { name, .. }
            | Self::Checkbox { name, .. }
            | Self::Multiselect { name, .. } => name,
        }
    }

    /// Help text, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        match self {
            Self::String { description, .. }
            | Self::Double { description, .. }
            | Self::Checkbox { description, .. }
            | Self::Multiselect { description, .. } => description.as_deref(),
        }
    }
}

/// A named export-target template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schema {
    /// Unique name; the identity key.
    pub name: String,
    /// What the schema creates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Parameters in display order.
    #[serde(default)]
    pub params: Vec<SchemaParam>,
}

impl Schema {
    /// Create an empty schema.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            params: Vec::new(),
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Append a parameter.
    #[must_use]
    pub fn with_param(mut self, param: SchemaParam) -> Self {
        self.params.push(param);
        self
    }

    /// Find a parameter by name.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&SchemaParam> {
        self.params.iter().find(|p| p.name() == name)
    }

    /// Serialize to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> MapperResult<String> {
        serde_json::to_string(self).map_err(MapperError::Serialization)
    }

    /// Deserialize from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is not a valid schema.
    pub fn from_json(json: &str) -> MapperResult<Self> {
        serde_json::from_str(json).map_err(MapperError::Serialization)
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Schema {}

impl Hash for Schema {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl PartialOrd for Schema {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Schema {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}

/// A schema choice as sent by the UI and stored on an object.
///
/// The UI flattens the chosen schema into `{name, <param>: <value>, ...}`;
/// the map is kept as-is so UI-side parameter additions round-trip.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaAssignment(Map<String, Value>);

impl SchemaAssignment {
    /// Wrap a raw JSON object.
    #[must_use]
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Borrow the raw JSON object.
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Schema name, if the map carries one.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.0.get("name").and_then(Value::as_str)
    }

    /// Object the assignment was written for.
    #[must_use]
    pub fn object_id(&self) -> Option<&str> {
        self.0.get(OBJECT_ID_FIELD).and_then(Value::as_str)
    }

    /// Copy of this assignment stamped with `id`.
    #[must_use]
    pub fn for_object(&self, id: ObjectId) -> Self {
        let mut map = self.0.clone();
        map.insert(OBJECT_ID_FIELD.to_string(), Value::String(id.to_string()));
        Self(map)
    }

    /// Encode for the [`SCHEMA_ATTRIBUTE`] document attribute.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_attribute(&self) -> MapperResult<String> {
        serde_json::to_string(&self.0).map_err(MapperError::Serialization)
    }

    /// Decode a [`SCHEMA_ATTRIBUTE`] value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a JSON object.
    pub fn from_attribute(value: &str) -> MapperResult<Self> {
        serde_json::from_str(value).map(Self).map_err(MapperError::Serialization)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_schema_identity_is_name() {
        let a = Schema::new("Wall").with_param(SchemaParam::double("top offset", 1.0));
        let b = Schema::new("Wall").with_description("other");
        let c = Schema::new("Beam");
        assert_eq!(a, b);
        assert_ne!(a, c);

        let set: HashSet<Schema> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_multiselect_roundtrip_keeps_tag() {
        let schema = Schema::new("Column").with_param(SchemaParam::Multiselect {
            name: "Family Instance".to_string(),
            description: None,
            values: vec!["C 123".to_string(), "C 10x10".to_string()],
            selected: Some("C 10x10".to_string()),
        });
        let json = schema.to_json().expect("serialize");
        assert!(json.contains(r#""type":"MultiselectParam""#));

        let decoded = Schema::from_json(&json).expect("deserialize");
        assert_eq!(decoded.name, "Column");
        match decoded.param("Family Instance") {
            Some(SchemaParam::Multiselect {
                values, selected, ..
            }) => {
                assert_eq!(values, &["C 123", "C 10x10"]);
                assert_eq!(selected.as_deref(), Some("C 10x10"));
            }
            other => panic!("Expected Multiselect, got {other:?}"),
        }
    }

    #[test]
    fn test_param_defaults_on_decode() {
        let json = r#"{"name":"X","params":[
            {"type":"CheckboxParam","name":"Structural"},
            {"type":"DoubleParam","name":"offset"},
            {"type":"MultiselectParam","name":"Type","values":["A","B","A"]}
        ]}"#;
        let schema = Schema::from_json(json).expect("deserialize");
        assert!(matches!(
            schema.param("Structural"),
            Some(SchemaParam::Checkbox { value: true, .. })
        ));
        assert!(matches!(
            schema.param("offset"),
            Some(SchemaParam::Double { value, .. }) if *value == 0.0
        ));
        match schema.param("Type") {
            Some(SchemaParam::Multiselect { values, .. }) => assert_eq!(values, &["A", "B"]),
            other => panic!("Expected Multiselect, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_param_tag_is_rejected() {
        let json = r#"{"name":"X","params":[{"type":"ColorParam","name":"c"}]}"#;
        assert!(Schema::from_json(json).is_err());
    }

    #[test]
    fn test_kind_names_resolve() {
        for kind in SchemaKind::TARGETS {
            assert_eq!(SchemaKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(
            SchemaKind::from_name(INCOMPATIBLE_SELECTION),
            Some(SchemaKind::IncompatibleSelection)
        );
        assert_eq!(SchemaKind::from_name("Roof"), None);
    }

    #[test]
    fn test_assignment_stamps_object_id() {
        let mut map = Map::new();
        map.insert("name".to_string(), Value::String("Beam".to_string()));
        let id = ObjectId::new();
        let stamped = SchemaAssignment::from_map(map).for_object(id);
        assert_eq!(stamped.name(), Some("Beam"));
        assert_eq!(stamped.object_id(), Some(id.to_string().as_str()));

        let attr = stamped.to_attribute().expect("encode");
        let back = SchemaAssignment::from_attribute(&attr).expect("decode");
        assert_eq!(back, stamped);
    }

    #[test]
    fn test_assignment_rejects_non_object() {
        assert!(SchemaAssignment::from_attribute("[1,2]").is_err());
        assert!(SchemaAssignment::from_attribute("not json").is_err());
    }
}
