//! Conversion of a stroke's samples into a fillable shape.
//!
//! Two builders exist and each has one consumer:
//! * [`ribbon`] produces a closed polygon. The compositor and raster export use it.
//! * [`bezier`] produces cubic segments with per-segment width. Vector export uses it.
//!
//! Outlines are never stored; they are rebuilt from the points whenever needed.

pub mod bezier;
pub mod ribbon;

use egui::Pos2;

use crate::stroke::{CapStyle, Stroke, StrokePoint};

pub use bezier::{BezierOptions, CurveSegment};

/// Smallest half width a ribbon may have, in px.
pub const MIN_HALF_WIDTH: f32 = 0.5;

/// Smallest width a curve segment may have, in px.
pub const MIN_CURVE_WIDTH: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutlineAlgorithm {
    #[default]
    Ribbon,
    SmoothedCurve,
}

/// The inked shape of a stroke.
#[derive(Debug, Clone, PartialEq)]
pub enum Outline {
    /// Closed polygon; the last vertex connects back to the first.
    Polygon(Vec<Pos2>),
    Curves(Vec<CurveSegment>),
}

impl Outline {
    pub fn is_empty(&self) -> bool {
        match self {
            Outline::Polygon(points) => points.is_empty(),
            Outline::Curves(segments) => segments.is_empty(),
        }
    }

    pub fn as_polygon(&self) -> Option<&[Pos2]> {
        match self {
            Outline::Polygon(points) => Some(points),
            Outline::Curves(_) => None,
        }
    }

    pub fn as_curves(&self) -> Option<&[CurveSegment]> {
        match self {
            Outline::Curves(segments) => Some(segments),
            Outline::Polygon(_) => None,
        }
    }
}

pub fn build_outline(
    points: &[StrokePoint],
    width_scale: f32,
    style: CapStyle,
    algorithm: OutlineAlgorithm,
) -> Outline {
    match algorithm {
        OutlineAlgorithm::Ribbon => Outline::Polygon(ribbon::ribbon(points, width_scale, style)),
        OutlineAlgorithm::SmoothedCurve => Outline::Curves(bezier::curve_segments(
            points,
            width_scale,
            &BezierOptions::default(),
        )),
    }
}

impl Stroke {
    pub fn outline(&self, algorithm: OutlineAlgorithm) -> Outline {
        build_outline(self.points(), self.width_scale(), self.style(), algorithm)
    }
}
