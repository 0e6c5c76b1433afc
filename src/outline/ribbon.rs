use egui::{Pos2, Vec2};

use super::MIN_HALF_WIDTH;
use crate::stroke::{CapStyle, StrokePoint};

/// Vertices used to approximate each semicircular cap.
const CAP_SEGMENTS: usize = 8;

/// Build the closed ribbon polygon around `points`.
///
/// Each point is offset to both sides along the normal of its tangent by
/// `width_scale * pressure / 2`. The left side is walked forward, the right
/// side backward, and the two are joined (with arcs for [`CapStyle::RoundCap`]).
/// Fewer than two points give an empty polygon.
///
/// Offsets are not checked for self-intersection at sharp turns; the fill
/// rule hides most of the resulting artifacts.
pub fn ribbon(points: &[StrokePoint], width_scale: f32, style: CapStyle) -> Vec<Pos2> {
    if points.len() < 2 {
        return Vec::new();
    }

    let tangents = tangents(points);
    let half_widths: Vec<f32> = points
        .iter()
        .map(|p| (width_scale * p.pressure / 2.0).max(MIN_HALF_WIDTH))
        .collect();

    let cap_points = match style {
        CapStyle::RoundCap => 2 * (CAP_SEGMENTS - 1),
        CapStyle::FlatCap => 0,
    };
    let mut outline = Vec::with_capacity(points.len() * 2 + cap_points);

    // Left side, forward.
    for ((p, t), hw) in points.iter().zip(&tangents).zip(&half_widths) {
        outline.push(p.pos() + left_normal(*t) * *hw);
    }

    let last = points.len() - 1;
    if style == CapStyle::RoundCap {
        push_arc(&mut outline, points[last].pos(), tangents[last], half_widths[last]);
    }

    // Right side, backward.
    for ((p, t), hw) in points.iter().zip(&tangents).zip(&half_widths).rev() {
        outline.push(p.pos() - left_normal(*t) * *hw);
    }

    if style == CapStyle::RoundCap {
        push_arc(&mut outline, points[0].pos(), -tangents[0], half_widths[0]);
    }

    outline
}

/// Unit tangent at every point. Interior points average the directions of
/// their two segments; the first and last point reuse their only segment.
fn tangents(points: &[StrokePoint]) -> Vec<Vec2> {
    let mut directions = Vec::with_capacity(points.len() - 1);
    let mut previous = None;
    for pair in points.windows(2) {
        let delta = pair[1].pos() - pair[0].pos();
        let dir = if delta.length_sq() > f32::EPSILON {
            delta.normalized()
        } else {
            // Coincident samples: keep heading the same way.
            previous.unwrap_or(Vec2::ZERO)
        };
        directions.push(dir);
        previous = Some(dir);
    }

    // A stroke that starts with coincident samples has no heading yet;
    // borrow the first real one.
    let first_real = directions
        .iter()
        .copied()
        .find(|d| *d != Vec2::ZERO)
        .unwrap_or(Vec2::X);
    for dir in directions.iter_mut() {
        if *dir == Vec2::ZERO {
            *dir = first_real;
        }
    }

    let last = directions.len() - 1;
    (0..points.len())
        .map(|i| {
            if i == 0 {
                directions[0]
            } else if i > last {
                directions[last]
            } else {
                let sum = directions[i - 1] + directions[i];
                if sum.length_sq() > f32::EPSILON {
                    sum.normalized()
                } else {
                    // Full reversal; the incoming segment decides.
                    directions[i]
                }
            }
        })
        .collect()
}

/// Perpendicular pointing to the left of travel (screen coordinates, y down).
fn left_normal(tangent: Vec2) -> Vec2 {
    Vec2::new(tangent.y, -tangent.x)
}

/// Half circle around `center` from the left side, through `forward`, to the right side.
fn push_arc(outline: &mut Vec<Pos2>, center: Pos2, forward: Vec2, radius: f32) {
    let normal = left_normal(forward);
    for i in 1..CAP_SEGMENTS {
        let theta = std::f32::consts::PI * i as f32 / CAP_SEGMENTS as f32;
        let dir = normal * theta.cos() + forward * theta.sin();
        outline.push(center + dir * radius);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(n: usize) -> Vec<StrokePoint> {
        (0..n)
            .map(|i| StrokePoint::new(10.0 + i as f32 * 4.0, 20.0, Some(1.0), i as u64 * 16))
            .collect()
    }

    #[test]
    fn flat_ribbon_has_two_vertices_per_point() {
        let outline = ribbon(&line(5), 10.0, CapStyle::FlatCap);
        assert_eq!(outline.len(), 10);
        // Horizontal stroke: left side is above (smaller y), right side below.
        assert!((outline[0].y - 15.0).abs() < 1e-4);
        assert!((outline[9].y - 25.0).abs() < 1e-4);
        assert!((outline[0].x - 10.0).abs() < 1e-4);
    }

    #[test]
    fn round_caps_add_arc_vertices() {
        let outline = ribbon(&line(5), 10.0, CapStyle::RoundCap);
        assert_eq!(outline.len(), 10 + 2 * (CAP_SEGMENTS - 1));
        // The tip of the end cap sits half a width beyond the last point.
        let max_x = outline.iter().map(|p| p.x).fold(f32::MIN, f32::max);
        assert!((max_x - (26.0 + 5.0)).abs() < 1e-3);
    }

    #[test]
    fn coincident_points_do_not_produce_nan() {
        let p = StrokePoint::new(5.0, 5.0, None, 0);
        let outline = ribbon(&[p, p, p], 4.0, CapStyle::RoundCap);
        assert!(!outline.is_empty());
        assert!(outline.iter().all(|v| v.x.is_finite() && v.y.is_finite()));
    }

    #[test]
    fn width_never_collapses() {
        let points = vec![
            StrokePoint::new(0.0, 0.0, Some(0.01), 0),
            StrokePoint::new(10.0, 0.0, Some(0.01), 16),
        ];
        let outline = ribbon(&points, 1.0, CapStyle::FlatCap);
        let thickness = outline[3].y - outline[0].y;
        assert!(thickness >= 2.0 * MIN_HALF_WIDTH - 1e-5);
    }
}
