//! Catalog of the schemas the UI can assign.
//!
//! The registry is built once and shared read-only. A new catalog can be
//! loaded from JSON and swapped in with [`SchemaRegistry::reload`]; nothing
//! rebuilds it behind the caller's back.

use std::collections::HashSet;
use std::path::Path;

use thiserror::Error;

use crate::classify::KindSet;
use crate::{Schema, SchemaKind, SchemaParam, INCOMPATIBLE_SELECTION};

/// Errors raised while building a registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Two schemas share a name.
    #[error("duplicate schema name: {0}")]
    DuplicateName(String),
    /// Catalog file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Catalog is not a JSON array of schemas.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Ordered, immutable schema catalog.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    schemas: Vec<Schema>,
    incompatible: Schema,
}

impl SchemaRegistry {
    /// The built-in catalog.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            schemas: vec![
                floor(),
                wall(),
                direct_shape(),
                column(),
                beam(),
                Schema::new(SchemaKind::Gridline.name()),
            ],
            incompatible: incompatible_selection(),
        }
    }

    /// Build a catalog from schemas in display order.
    ///
    /// A schema named like the sentinel replaces the built-in sentinel
    /// instead of becoming an assignable entry.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateName`] if two schemas share a name.
    pub fn from_schemas(schemas: Vec<Schema>) -> Result<Self, RegistryError> {
        let mut seen = HashSet::new();
        let mut incompatible = incompatible_selection();
        let mut catalog = Vec::with_capacity(schemas.len());
        for schema in schemas {
            if !seen.insert(schema.name.clone()) {
                return Err(RegistryError::DuplicateName(schema.name));
            }
            if schema.name == INCOMPATIBLE_SELECTION {
                incompatible = schema;
            } else {
                catalog.push(schema);
            }
        }
        Ok(Self {
            schemas: catalog,
            incompatible,
        })
    }

    /// Parse a catalog from a JSON array of schemas.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is invalid or names collide.
    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        let schemas: Vec<Schema> = serde_json::from_str(json)?;
        Self::from_schemas(schemas)
    }

    /// Load a catalog file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Replace this catalog with `other`.
    pub fn reload(&mut self, other: Self) {
        tracing::info!(
            "Schema registry reloaded: {} -> {} schemas",
            self.schemas.len(),
            other.schemas.len()
        );
        *self = other;
    }

    /// Assignable schemas in display order.
    #[must_use]
    pub fn schemas(&self) -> &[Schema] {
        &self.schemas
    }

    /// Look a schema up by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Schema> {
        if name == self.incompatible.name {
            return Some(&self.incompatible);
        }
        self.schemas.iter().find(|s| s.name == name)
    }

    /// The sentinel returned when a selection shares no schema.
    #[must_use]
    pub fn incompatible_selection(&self) -> &Schema {
        &self.incompatible
    }

    /// Turn classification kinds into catalog schemas, in catalog order.
    ///
    /// Kinds the catalog does not define are skipped. A non-empty `kinds`
    /// never resolves to nothing: if none of them is in the catalog the
    /// sentinel is returned instead.
    #[must_use]
    pub fn resolve(&self, kinds: &KindSet) -> Vec<Schema> {
        let mut resolved: Vec<Schema> = self
            .schemas
            .iter()
            .filter(|s| SchemaKind::from_name(&s.name).is_some_and(|k| kinds.contains(&k)))
            .cloned()
            .collect();
        if kinds.contains(&SchemaKind::IncompatibleSelection)
            || (resolved.is_empty() && !kinds.is_empty())
        {
            resolved.push(self.incompatible.clone());
        }
        resolved
    }

    /// Number of assignable schemas.
    #[must_use]
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Whether the catalog has no assignable schemas.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

fn family_and_type() -> [SchemaParam; 2] {
    [
        SchemaParam::multiselect("Family", ["Foo", "Bar", "Baz"]),
        SchemaParam::multiselect("Type", ["A", "B", "C", "D"]),
    ]
}

fn floor() -> Schema {
    let [family, kind] = family_and_type();
    Schema::new(SchemaKind::Floor.name())
        .with_description("Creates Revit floors from planar horizontal surfaces")
        .with_param(family)
        .with_param(kind)
        .with_param(
            SchemaParam::checkbox("Structural", true)
                .with_description("Defines this element as load bearing."),
        )
        .with_param(SchemaParam::string("Comments"))
}

fn wall() -> Schema {
    let [family, kind] = family_and_type();
    Schema::new(SchemaKind::Wall.name())
        .with_description("Creates Revit walls from planar extrusions.")
        .with_param(family)
        .with_param(kind)
        .with_param(SchemaParam::double("bottom offset", 0.0))
        .with_param(SchemaParam::double("top offset", 0.0))
        .with_param(
            SchemaParam::checkbox("Structural", true)
                .with_description("Does this wall make the building stand up? In Revit, ofc."),
        )
        .with_param(SchemaParam::string("Comments"))
}

fn direct_shape() -> Schema {
    Schema::new(SchemaKind::DirectShape.name())
        .with_param(SchemaParam::multiselect(
            "Type",
            ["Floor", "Wall", "Roof", "Column"],
        ))
        .with_param(
            SchemaParam::checkbox("Smooth Import", true)
                .with_description("Elements will look better, but will take longer to create."),
        )
        .with_param(SchemaParam::string("Comments"))
}

fn column() -> Schema {
    Schema::new(SchemaKind::Column.name())
        .with_param(SchemaParam::multiselect(
            "Family Instance",
            ["C 123", "C 10x10", "C 20x20", "L 20x40"],
        ))
        .with_param(
            SchemaParam::checkbox("Structural", true)
                .with_description("Defines this element as load bearing."),
        )
        .with_param(SchemaParam::string("Comments"))
}

fn beam() -> Schema {
    Schema::new(SchemaKind::Beam.name())
        .with_param(SchemaParam::multiselect(
            "Type",
            ["W 123", "W 10x10", "FOO 20x20", "STEEL 20x40"],
        ))
        .with_param(SchemaParam::double("bottom offset", 0.0))
        .with_param(SchemaParam::double("top offset", 0.0))
        .with_param(SchemaParam::string("Comments"))
}

fn incompatible_selection() -> Schema {
    Schema::new(INCOMPATIBLE_SELECTION)
        .with_description("Current selection objects cannot be assigned one single schema.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_order() {
        let registry = SchemaRegistry::builtin();
        let names: Vec<_> = registry.schemas().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            ["Floor", "Wall", "DirectShape", "Column", "Beam", "Gridline"]
        );
        assert!(registry.get("Incompatible Selection").is_some());
        let structural = registry
            .get("Wall")
            .and_then(|wall| wall.param("Structural"))
            .and_then(SchemaParam::description);
        assert_eq!(
            structural,
            Some("Does this wall make the building stand up? In Revit, ofc.")
        );
        assert!(registry
            .schemas()
            .iter()
            .all(|s| s.name != INCOMPATIBLE_SELECTION));
    }

    #[test]
    fn test_resolve_uses_catalog_order() {
        let registry = SchemaRegistry::builtin();
        let kinds: KindSet = [SchemaKind::Gridline, SchemaKind::Beam, SchemaKind::Column]
            .into_iter()
            .collect();
        let names: Vec<_> = registry
            .resolve(&kinds)
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, ["Column", "Beam", "Gridline"]);
    }

    #[test]
    fn test_resolve_sentinel() {
        let registry = SchemaRegistry::builtin();
        let kinds: KindSet = std::iter::once(SchemaKind::IncompatibleSelection).collect();
        let resolved = registry.resolve(&kinds);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].name, INCOMPATIBLE_SELECTION);
    }

    #[test]
    fn test_resolve_falls_back_to_sentinel_for_missing_kinds() {
        let registry = SchemaRegistry::from_json(r#"[{"name":"Beam"}]"#).expect("catalog");
        let kinds: KindSet = std::iter::once(SchemaKind::DirectShape).collect();
        let resolved = registry.resolve(&kinds);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].name, INCOMPATIBLE_SELECTION);

        assert!(registry.resolve(&KindSet::new()).is_empty());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let err = SchemaRegistry::from_schemas(vec![Schema::new("Wall"), Schema::new("Wall")])
            .expect_err("duplicate");
        assert!(matches!(err, RegistryError::DuplicateName(name) if name == "Wall"));
    }

    #[test]
    fn test_reload_skips_missing_kinds_and_keeps_sentinel() {
        let mut registry = SchemaRegistry::builtin();
        let loaded = SchemaRegistry::from_json(r#"[{"name":"Beam"},{"name":"Roof"}]"#)
            .expect("valid catalog");
        registry.reload(loaded);

        assert_eq!(registry.len(), 2);
        let kinds: KindSet = [SchemaKind::Beam, SchemaKind::Column].into_iter().collect();
        let names: Vec<_> = registry
            .resolve(&kinds)
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, ["Beam"]);
        assert_eq!(registry.incompatible_selection().name, INCOMPATIBLE_SELECTION);
    }

    #[test]
    fn test_catalog_can_override_sentinel_text() {
        let registry = SchemaRegistry::from_json(
            r#"[{"name":"Incompatible Selection","description":"Pick one kind."}]"#,
        )
        .expect("valid catalog");
        assert!(registry.is_empty());
        assert_eq!(
            registry.incompatible_selection().description.as_deref(),
            Some("Pick one kind.")
        );
    }
}
