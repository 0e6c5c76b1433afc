use serde::{Deserialize, Serialize};

use crate::stroke::StrokePoint;

/// Smallest usable `max_gap`, in px. Smaller non-zero values are raised to it.
pub const MIN_GAP: f32 = 0.5;

/// Most points inserted to bridge a single jump. Longer jumps get coarser
/// spacing instead of more points.
pub const MAX_DENSIFY_STEPS: usize = 1024;

/// Thresholds controlling which raw samples are kept and how gaps are filled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Samples closer than this (in px) to the last accepted one...
    pub min_distance: f32,
    /// ...and sooner than this (in ms) are dropped as jitter.
    pub min_interval_ms: u64,
    /// No two consecutive output points are farther apart than this, for
    /// jumps of up to `MAX_DENSIFY_STEPS * max_gap`. Zero disables
    /// densification; other values below [`MIN_GAP`] act as [`MIN_GAP`].
    pub max_gap: f32,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            min_distance: 2.0,
            min_interval_ms: 16,
            max_gap: 5.0,
        }
    }
}

/// Cleans and densifies the raw samples of one in-progress stroke.
#[derive(Debug, Clone)]
pub struct Sampler {
    config: SamplerConfig,
    last_accepted: Option<StrokePoint>,
}

impl Sampler {
    pub fn new(config: SamplerConfig) -> Self {
        Self {
            config,
            last_accepted: None,
        }
    }

    /// Offer a raw sample. Accepted samples (plus any interpolated points
    /// needed to bridge a large gap) are appended to `out`.
    ///
    /// Returns the number of points appended.
    pub fn add_raw_point(&mut self, point: StrokePoint, out: &mut Vec<StrokePoint>) -> usize {
        if !point.is_valid() {
            log::trace!("Dropping malformed sample {:?}", point);
            return 0;
        }

        let Some(last) = self.last_accepted else {
            out.push(point);
            self.last_accepted = Some(point);
            return 1;
        };

        if point.timestamp < last.timestamp {
            log::trace!("Dropping out-of-order sample at t={}", point.timestamp);
            return 0;
        }

        let distance = last.distance(&point);
        let elapsed = point.timestamp - last.timestamp;
        if distance < self.config.min_distance && elapsed < self.config.min_interval_ms {
            return 0;
        }

        let before = out.len();
        let gap = self.config.max_gap.max(MIN_GAP);
        if self.config.max_gap > 0.0 && gap.is_finite() && distance > gap {
            let steps = (distance / gap).ceil().min(MAX_DENSIFY_STEPS as f32) as usize;
            for i in 1..steps {
                out.push(last.lerp(&point, i as f32 / steps as f32));
            }
        }
        out.push(point);
        self.last_accepted = Some(point);

        out.len() - before
    }
}
