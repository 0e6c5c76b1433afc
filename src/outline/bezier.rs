use egui::{Pos2, Vec2};

use super::MIN_CURVE_WIDTH;
use crate::stroke::StrokePoint;

/// One cubic piece of a smoothed stroke, drawn with a constant width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveSegment {
    pub start: Pos2,
    pub control1: Pos2,
    pub control2: Pos2,
    pub end: Pos2,
    pub width: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BezierOptions {
    /// Scales how far control points sit from their anchors.
    pub smoothing: f32,
    /// Scales the pressure curve.
    pub pressure_weight: f32,
    /// Neighbours on each side included in the moving average.
    pub window: usize,
    /// Curve segments emitted per spline span.
    pub steps: usize,
}

impl Default for BezierOptions {
    fn default() -> Self {
        Self {
            smoothing: 1.0,
            pressure_weight: 1.0,
            window: 2,
            steps: 20,
        }
    }
}

const CATMULL_ROM_ALPHA: f32 = 0.5;
const TENSION: f32 = 0.2;
const PRESSURE_FLOOR: f32 = 0.2;
const PRESSURE_EXPONENT: f32 = 1.5;

/// Fit smooth cubic segments through `points`.
///
/// Strokes that have fewer than four points produce nothing: a spline span
/// needs four control points. Very short taps are therefore invisible in
/// vector output.
pub fn curve_segments(
    points: &[StrokePoint],
    width_scale: f32,
    options: &BezierOptions,
) -> Vec<CurveSegment> {
    if points.len() < 4 {
        return Vec::new();
    }

    let smoothed = smooth(points, options.window);
    let steps = options.steps.max(1);
    let tension = options.smoothing * TENSION;
    let mut segments = Vec::with_capacity((smoothed.len() - 3) * steps);

    for group in smoothed.windows(4) {
        let span = Span::new(group);
        for step in 0..steps {
            let t = step as f32 / steps as f32;
            let next_t = (step + 1) as f32 / steps as f32;

            let current = span.at(t);
            let next = span.at(next_t);
            let delta = next - current;

            let pressure = group[1].pressure + (group[2].pressure - group[1].pressure) * t;
            let width = (pressure_curve(pressure, options.pressure_weight) * width_scale)
                .max(MIN_CURVE_WIDTH);

            segments.push(CurveSegment {
                start: current,
                control1: current + delta * tension,
                control2: next - delta * tension,
                end: next,
                width,
            });
        }
    }

    segments
}

/// Weighted moving average over position and pressure. Samples nearer the
/// window center weigh more. Inputs shorter than the full window pass through.
fn smooth(points: &[StrokePoint], half: usize) -> Vec<StrokePoint> {
    if half == 0 || points.len() < 2 * half + 1 {
        return points.to_vec();
    }

    (0..points.len())
        .map(|i| {
            let start = i.saturating_sub(half);
            let end = (i + half + 1).min(points.len());

            let (mut x, mut y, mut pressure, mut total) = (0.0, 0.0, 0.0, 0.0);
            for (j, p) in points.iter().enumerate().take(end).skip(start) {
                let weight = 1.0 - i.abs_diff(j) as f32 / (half + 1) as f32;
                x += p.x * weight;
                y += p.y * weight;
                pressure += p.pressure * weight;
                total += weight;
            }

            StrokePoint {
                x: x / total,
                y: y / total,
                pressure: pressure / total,
                timestamp: points[i].timestamp,
            }
        })
        .collect()
}

/// Clamp, curve and weight a pressure value so strokes are never too thin
/// or too thick.
fn pressure_curve(pressure: f32, weight: f32) -> f32 {
    weight * pressure.clamp(PRESSURE_FLOOR, 1.0).powf(PRESSURE_EXPONENT)
}

/// Centripetal Catmull-Rom span between the middle two of four points.
struct Span {
    p: [Pos2; 4],
    knots: [f32; 4],
}

impl Span {
    fn new(group: &[StrokePoint]) -> Self {
        let p = [group[0].pos(), group[1].pos(), group[2].pos(), group[3].pos()];
        let mut knots = [0.0; 4];
        for i in 1..4 {
            // Coincident points would collapse the knot interval.
            let d = p[i - 1].distance(p[i]).powf(CATMULL_ROM_ALPHA).max(1e-4);
            knots[i] = knots[i - 1] + d;
        }
        Self { p, knots }
    }

    /// Position at `s` in `[0, 1]`; 0 is the second point, 1 the third.
    fn at(&self, s: f32) -> Pos2 {
        let [p0, p1, p2, p3] = self.p.map(|p| p.to_vec2());
        let [t0, t1, t2, t3] = self.knots;
        let t = t1 + (t2 - t1) * s;

        let a1 = p0 * ((t1 - t) / (t1 - t0)) + p1 * ((t - t0) / (t1 - t0));
        let a2 = p1 * ((t2 - t) / (t2 - t1)) + p2 * ((t - t1) / (t2 - t1));
        let a3 = p2 * ((t3 - t) / (t3 - t2)) + p3 * ((t - t2) / (t3 - t2));

        let b1 = a1 * ((t2 - t) / (t2 - t0)) + a2 * ((t - t0) / (t2 - t0));
        let b2 = a2 * ((t3 - t) / (t3 - t1)) + a3 * ((t - t1) / (t3 - t1));

        let c: Vec2 = b1 * ((t2 - t) / (t2 - t1)) + b2 * ((t - t1) / (t2 - t1));
        c.to_pos2()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arc(n: usize) -> Vec<StrokePoint> {
        (0..n)
            .map(|i| {
                let a = i as f32 * 0.3;
                let (x, y) = (100.0 + 40.0 * a.cos(), 100.0 + 40.0 * a.sin());
                StrokePoint::new(x, y, Some(0.8), i as u64)
            })
            .collect()
    }

    #[test]
    fn too_few_points_give_nothing() {
        for n in 0..4 {
            assert!(curve_segments(&arc(n), 10.0, &BezierOptions::default()).is_empty());
        }
    }

    #[test]
    fn segment_count_follows_spans() {
        let options = BezierOptions::default();
        let segments = curve_segments(&arc(8), 10.0, &options);
        assert_eq!(segments.len(), 5 * options.steps);
    }

    #[test]
    fn segments_are_continuous() {
        let segments = curve_segments(&arc(8), 10.0, &BezierOptions::default());
        for pair in segments.windows(2) {
            assert!(pair[0].end.distance(pair[1].start) < 1e-3);
        }
    }

    #[test]
    fn span_interpolates_its_middle_points() {
        let points = arc(4);
        let span = Span::new(&points);
        assert!(span.at(0.0).distance(points[1].pos()) < 1e-3);
        assert!(span.at(1.0).distance(points[2].pos()) < 1e-3);
    }

    #[test]
    fn width_is_clamped_and_curved() {
        let mut points = arc(6);
        for p in &mut points {
            p.pressure = 0.01;
        }
        let segments = curve_segments(&points, 20.0, &BezierOptions::default());
        let expected = 0.2f32.powf(1.5) * 20.0;
        assert!(segments.iter().all(|s| (s.width - expected).abs() < 1e-4));

        let thin = curve_segments(&points, 0.1, &BezierOptions::default());
        assert!(thin.iter().all(|s| s.width >= MIN_CURVE_WIDTH));
    }

    #[test]
    fn smoothing_keeps_short_input() {
        let points = arc(3);
        assert_eq!(smooth(&points, 2), points);
    }
}
