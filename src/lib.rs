#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod compositor;
pub mod config;
pub mod document;
pub mod error;
pub mod export;
pub mod history;
pub mod input;
pub mod outline;
pub mod panels;
pub mod renderer;
pub mod sampler;
pub mod state;
pub mod stroke;

pub use app::PaintApp;
pub use compositor::{CompositeMode, Compositor, RasterSurface, Surface};
pub use config::AppConfig;
pub use document::StrokeStore;
pub use error::{ConfigError, ExportError};
pub use history::HistoryManager;
pub use renderer::Renderer;
pub use sampler::{Sampler, SamplerConfig};
pub use state::DrawingState;
pub use stroke::{BrushSettings, CapStyle, Stroke, StrokeId, StrokePoint, StrokeRef, Tool};
