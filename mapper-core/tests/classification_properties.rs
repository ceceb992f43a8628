//! Property tests for the classifier.
//!
//! Checks that classification depends only on the shapes given:
//! - repeated calls agree
//! - selection order does not matter
//! - a single-object selection matches its own classification
//! - the result is never empty for a non-empty selection

use mapper_core::{classify_one, classify_selection, Curve, KindSet, Point3, SchemaKind, Shape};
use proptest::prelude::*;
use std::f64::consts::{PI, TAU};

/// Coordinates on a coarse grid so level and vertical cases come up often.
fn arb_point() -> impl Strategy<Value = Point3> {
    (0i8..3, 0i8..3, 0i8..3)
        .prop_map(|(x, y, z)| Point3::new(f64::from(x), f64::from(y), f64::from(z)))
}

fn arb_curve() -> impl Strategy<Value = Curve> {
    prop_oneof![
        (arb_point(), arb_point()).prop_map(|(start, end)| Curve::Line { start, end }),
        (arb_point(), arb_point(), prop_oneof![Just(PI), Just(TAU)])
            .prop_map(|(start, end, sweep)| Curve::Arc { start, end, sweep }),
        prop::collection::vec(arb_point(), 2..5).prop_map(|points| Curve::Polyline { points }),
    ]
}

fn arb_shape() -> impl Strategy<Value = Shape> {
    prop_oneof![
        Just(Shape::Mesh),
        (any::<bool>(), any::<bool>())
            .prop_map(|(is_surface, closed)| Shape::Brep { is_surface, closed }),
        prop::collection::vec(arb_curve(), 1..3).prop_map(|profiles| Shape::Extrusion { profiles }),
        arb_curve().prop_map(Shape::Curve),
        arb_point().prop_map(Shape::Point),
    ]
}

proptest! {
    #[test]
    fn prop_classify_one_is_deterministic(shape in arb_shape()) {
        let first = classify_one(&shape);
        prop_assert_eq!(classify_one(&shape), first.clone());
        prop_assert!(!first.contains(&SchemaKind::IncompatibleSelection));
    }

    #[test]
    fn prop_selection_order_is_irrelevant(
        (original, shuffled) in prop::collection::vec(arb_shape(), 1..6)
            .prop_flat_map(|shapes| (Just(shapes.clone()), Just(shapes).prop_shuffle()))
    ) {
        prop_assert_eq!(
            classify_selection(&original),
            classify_selection(&shuffled)
        );
    }

    #[test]
    fn prop_selection_is_never_empty(shapes in prop::collection::vec(arb_shape(), 1..6)) {
        let kinds = classify_selection(&shapes).expect("non-empty selection");
        prop_assert!(!kinds.is_empty());
        if kinds.contains(&SchemaKind::IncompatibleSelection) {
            prop_assert_eq!(kinds.len(), 1);
        }
    }

    #[test]
    fn prop_single_selection_matches_classify_one(shape in arb_shape()) {
        let one = classify_one(&shape);
        let selection = classify_selection([&shape]).expect("non-empty selection");
        if one.is_empty() {
            let incompatible: KindSet = std::iter::once(SchemaKind::IncompatibleSelection).collect();
            prop_assert_eq!(selection, incompatible);
        } else {
            prop_assert_eq!(selection, one);
        }
    }

    #[test]
    fn prop_selection_is_subset_of_each_member(shapes in prop::collection::vec(arb_shape(), 1..6)) {
        let kinds = classify_selection(&shapes).expect("non-empty selection");
        if !kinds.contains(&SchemaKind::IncompatibleSelection) {
            for shape in &shapes {
                prop_assert!(kinds.is_subset(&classify_one(shape)));
            }
        }
    }
}
