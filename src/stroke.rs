use egui::{Color32, Pos2};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::sampler::{Sampler, SamplerConfig};

/// Pressure used when the device reports none.
pub const DEFAULT_PRESSURE: f32 = 1.0;

/// Width used when a brush is configured with a non-positive width.
pub const DEFAULT_WIDTH_SCALE: f32 = 10.0;

/// A single recorded sample of a stroke.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokePoint {
    pub x: f32,
    pub y: f32,
    /// Always in `(0, 1]`.
    pub pressure: f32,
    /// Milliseconds, monotonic within a stroke.
    pub timestamp: u64,
}

impl StrokePoint {
    /// Create a sample, normalizing missing or out-of-range pressure.
    pub fn new(x: f32, y: f32, pressure: Option<f32>, timestamp: u64) -> Self {
        Self {
            x,
            y,
            pressure: normalize_pressure(pressure),
            timestamp,
        }
    }

    pub fn pos(&self) -> Pos2 {
        Pos2::new(self.x, self.y)
    }

    pub fn distance(&self, other: &StrokePoint) -> f32 {
        self.pos().distance(other.pos())
    }

    /// NaN, infinite and negative coordinates are not drawable.
    pub fn is_valid(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.x >= 0.0 && self.y >= 0.0
    }

    /// Linear interpolation of position, pressure and time.
    pub fn lerp(&self, other: &StrokePoint, t: f32) -> StrokePoint {
        let dt = other.timestamp.saturating_sub(self.timestamp) as f64 * t as f64;
        StrokePoint {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
            pressure: self.pressure + (other.pressure - self.pressure) * t,
            timestamp: self.timestamp + dt.round() as u64,
        }
    }
}

fn normalize_pressure(pressure: Option<f32>) -> f32 {
    match pressure {
        Some(p) if p.is_finite() && p > 0.0 => p.min(1.0),
        _ => DEFAULT_PRESSURE,
    }
}

/// Opaque, unique identifier of a committed stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StrokeId(uuid::Uuid);

impl StrokeId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for StrokeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for StrokeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Tool {
    /// Paints color over what is below.
    #[default]
    Draw,
    /// Removes what is below.
    Erase,
}

impl Tool {
    pub fn label(&self) -> &'static str {
        match self {
            Tool::Draw => "🖌 Brush",
            Tool::Erase => "⌫ Eraser",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CapStyle {
    #[default]
    RoundCap,
    FlatCap,
}

impl CapStyle {
    pub fn label(&self) -> &'static str {
        match self {
            CapStyle::RoundCap => "Round",
            CapStyle::FlatCap => "Flat",
        }
    }
}

/// Paint parameters captured once per stroke.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrushSettings {
    pub tool: Tool,
    pub color: Color32,
    pub width_scale: f32,
    pub style: CapStyle,
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self {
            tool: Tool::Draw,
            color: Color32::BLACK,
            width_scale: DEFAULT_WIDTH_SCALE,
            style: CapStyle::RoundCap,
        }
    }
}

impl BrushSettings {
    pub fn new(tool: Tool, color: Color32, width_scale: f32, style: CapStyle) -> Self {
        Self {
            tool,
            color,
            width_scale,
            style,
        }
        .sanitized()
    }

    /// Replace a non-positive or non-finite width with the default.
    pub fn sanitized(mut self) -> Self {
        if !(self.width_scale.is_finite() && self.width_scale > 0.0) {
            self.width_scale = DEFAULT_WIDTH_SCALE;
        }
        self
    }
}

// Immutable stroke for sharing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    id: StrokeId,
    points: Vec<StrokePoint>,
    settings: BrushSettings,
}

// Define a reference-counted type alias for Stroke
pub type StrokeRef = Arc<Stroke>;

impl Stroke {
    /// Create a new immutable stroke. Returns `None` for an empty point list.
    pub fn new(settings: BrushSettings, points: Vec<StrokePoint>) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        Some(Self {
            id: StrokeId::new(),
            points,
            settings: settings.sanitized(),
        })
    }

    // Create a new reference-counted Stroke
    pub fn new_ref(settings: BrushSettings, points: Vec<StrokePoint>) -> Option<StrokeRef> {
        Self::new(settings, points).map(Arc::new)
    }

    pub fn id(&self) -> StrokeId {
        self.id
    }

    pub fn points(&self) -> &[StrokePoint] {
        &self.points
    }

    pub fn settings(&self) -> &BrushSettings {
        &self.settings
    }

    pub fn tool(&self) -> Tool {
        self.settings.tool
    }

    pub fn color(&self) -> Color32 {
        self.settings.color
    }

    pub fn width_scale(&self) -> f32 {
        self.settings.width_scale
    }

    pub fn style(&self) -> CapStyle {
        self.settings.style
    }
}

/// The stroke currently under the pointer. Grows one sample at a time.
#[derive(Debug, Clone)]
pub struct MutableStroke {
    points: Vec<StrokePoint>,
    settings: BrushSettings,
    sampler: Sampler,
}

impl MutableStroke {
    pub fn new(settings: BrushSettings, sampler_config: SamplerConfig) -> Self {
        Self {
            points: Vec::new(),
            settings: settings.sanitized(),
            sampler: Sampler::new(sampler_config),
        }
    }

    /// Feed a raw pointer sample through the sampler.
    pub fn add_raw_point(&mut self, point: StrokePoint) {
        self.sampler.add_raw_point(point, &mut self.points);
    }

    // Get a reference to the points for preview
    pub fn points(&self) -> &[StrokePoint] {
        &self.points
    }

    pub fn settings(&self) -> &BrushSettings {
        &self.settings
    }

    /// Freeze into a committed stroke; `None` if no sample was accepted.
    pub fn finish(self) -> Option<Stroke> {
        Stroke::new(self.settings, self.points)
    }
}
