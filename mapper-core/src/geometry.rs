//! Minimal shape model for classification.
//!
//! Only the predicates the classifier needs are modelled here. The host's
//! geometry kernel stays outside this crate; adapters translate their native
//! objects into a [`Shape`].

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

/// Absolute tolerance for coordinate comparisons.
pub const COORD_TOLERANCE: f64 = 1e-9;

/// Compare two coordinates within [`COORD_TOLERANCE`].
#[must_use]
pub fn coords_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= COORD_TOLERANCE
}

/// A point in model space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
    /// Z coordinate (elevation).
    pub z: f64,
}

impl Point3 {
    /// Create a point.
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Both points sit at the same elevation.
    #[must_use]
    pub fn same_elevation(&self, other: &Self) -> bool {
        coords_eq(self.z, other.z)
    }

    /// Both points share X and Y, i.e. they lie on one vertical.
    #[must_use]
    pub fn same_plan_position(&self, other: &Self) -> bool {
        coords_eq(self.x, other.x) && coords_eq(self.y, other.y)
    }

    fn sub(&self, other: &Self) -> [f64; 3] {
        [self.x - other.x, self.y - other.y, self.z - other.z]
    }
}

/// A curve as far as classification is concerned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Curve {
    /// Straight segment.
    Line {
        /// Start point.
        start: Point3,
        /// End point.
        end: Point3,
    },
    /// Circular arc; a sweep of a full turn is a circle.
    Arc {
        /// Start point.
        start: Point3,
        /// End point.
        end: Point3,
        /// Swept angle in radians.
        sweep: f64,
    },
    /// Polyline through the given vertices.
    Polyline {
        /// Vertices in order.
        points: Vec<Point3>,
    },
    /// Free-form curve described by its control points.
    Nurbs {
        /// Control points in order.
        points: Vec<Point3>,
    },
}

impl Curve {
    /// Point at the start of the curve.
    #[must_use]
    pub fn point_at_start(&self) -> Option<Point3> {
        match self {
            Self::Line { start, .. } | Self::Arc { start, .. } => Some(*start),
            Self::Polyline { points } | Self::Nurbs { points } => points.first().copied(),
        }
    }

    /// Point at the end of the curve.
    #[must_use]
    pub fn point_at_end(&self) -> Option<Point3> {
        match self {
            Self::Line { end, .. } | Self::Arc { end, .. } => Some(*end),
            Self::Polyline { points } | Self::Nurbs { points } => points.last().copied(),
        }
    }

    /// The curve is a straight segment.
    ///
    /// Polylines and NURBS curves qualify when every vertex lies on the
    /// segment's supporting line.
    #[must_use]
    pub fn is_linear(&self) -> bool {
        match self {
            Self::Line { start, end } => start != end,
            Self::Arc { .. } => false,
            Self::Polyline { points } | Self::Nurbs { points } => collinear(points),
        }
    }

    /// The curve is a circular arc (circles included).
    #[must_use]
    pub fn is_arc(&self) -> bool {
        matches!(self, Self::Arc { sweep, .. } if sweep.abs() > COORD_TOLERANCE)
    }

    /// The curve is a closed full circle.
    #[must_use]
    pub fn is_circle(&self) -> bool {
        matches!(self, Self::Arc { sweep, .. } if sweep.abs() >= TAU - COORD_TOLERANCE)
    }

    /// Start and end sit at the same elevation.
    #[must_use]
    pub fn is_level(&self) -> bool {
        match (self.point_at_start(), self.point_at_end()) {
            (Some(start), Some(end)) => start.same_elevation(&end),
            _ => false,
        }
    }

    /// Start and end share X and Y.
    #[must_use]
    pub fn is_vertical(&self) -> bool {
        match (self.point_at_start(), self.point_at_end()) {
            (Some(start), Some(end)) => start.same_plan_position(&end),
            _ => false,
        }
    }
}

fn collinear(points: &[Point3]) -> bool {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return false;
    };
    let axis = last.sub(first);
    let axis_len = (axis[0] * axis[0] + axis[1] * axis[1] + axis[2] * axis[2]).sqrt();
    if axis_len <= COORD_TOLERANCE {
        return false;
    }
    points.iter().all(|p| {
        let v = p.sub(first);
        let cross = [
            v[1] * axis[2] - v[2] * axis[1],
            v[2] * axis[0] - v[0] * axis[2],
            v[0] * axis[1] - v[1] * axis[0],
        ];
        let dist = (cross[0] * cross[0] + cross[1] * cross[1] + cross[2] * cross[2]).sqrt()
            / axis_len;
        dist <= COORD_TOLERANCE
    })
}

/// Geometry of a document object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Shape {
    /// Polygon mesh.
    Mesh,
    /// Boundary representation: a surface or polysurface.
    Brep {
        /// Single-face surface rather than a polysurface.
        is_surface: bool,
        /// Closed (solid) brep.
        closed: bool,
    },
    /// Planar profiles swept along a straight path.
    Extrusion {
        /// Profile curves placed at the start of the path.
        profiles: Vec<Curve>,
    },
    /// Stand-alone curve.
    Curve(Curve),
    /// Point object.
    Point(Point3),
}
