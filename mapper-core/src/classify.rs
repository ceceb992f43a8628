//! Shape classification.
//!
//! [`classify_one`] applies independent geometric rules to one shape and
//! unions their results. [`classify_selection`] intersects those sets across
//! a selection. Both are pure functions of the shapes they are given.

use std::collections::BTreeSet;

use crate::geometry::{Curve, Shape};
use crate::SchemaKind;

/// Set of schema kinds, iterated in registry order.
pub type KindSet = BTreeSet<SchemaKind>;

/// Candidate schema kinds for a single shape.
#[must_use]
pub fn classify_one(shape: &Shape) -> KindSet {
    let mut kinds = KindSet::new();
    match shape {
        Shape::Mesh | Shape::Brep { .. } => {
            kinds.insert(SchemaKind::DirectShape);
        }
        Shape::Extrusion { profiles } => {
            if let [profile] = profiles.as_slice() {
                if (profile.is_linear() || profile.is_arc()) && profile.is_level() {
                    kinds.insert(SchemaKind::Wall);
                }
            }
        }
        Shape::Curve(curve) => classify_curve(curve, &mut kinds),
        Shape::Point(_) => {}
    }
    kinds
}

fn classify_curve(curve: &Curve, kinds: &mut KindSet) {
    if curve.is_linear() {
        kinds.insert(SchemaKind::Beam);
        if curve.is_level() {
            kinds.insert(SchemaKind::Gridline);
        }
        if curve.is_vertical() {
            kinds.insert(SchemaKind::Column);
        }
    }
    if curve.is_arc() && !curve.is_circle() && curve.is_level() {
        kinds.insert(SchemaKind::Gridline);
    }
}

/// Schema kinds shared by every shape in a selection.
///
/// Returns `None` for an empty selection. An empty intersection becomes
/// `{IncompatibleSelection}` so callers always get at least one option.
#[must_use]
pub fn classify_selection<'a, I>(shapes: I) -> Option<KindSet>
where
    I: IntoIterator<Item = &'a Shape>,
{
    let mut shapes = shapes.into_iter();
    let first = classify_one(shapes.next()?);
    let mut common = shapes.fold(first, |acc, shape| {
        let kinds = classify_one(shape);
        acc.intersection(&kinds).copied().collect()
    });
    if common.is_empty() {
        common.insert(SchemaKind::IncompatibleSelection);
    }
    Some(common)
}
