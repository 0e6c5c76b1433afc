//! Writing the scene out as PNG or SVG.
//!
//! Exports work on a snapshot (`Vec<StrokeRef>`) and never touch the live
//! scene, so they can run on a worker while drawing continues.

mod jobs;
mod naming;
pub mod raster;
pub mod svg;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use egui::Color32;
use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::config::{AppConfig, TierPolicy};
use crate::error::ExportError;
use crate::stroke::StrokeRef;

pub use jobs::{ExportOutcome, ExportQueue};
pub use naming::{export_file_name, random_suffix};
pub use raster::RasterOptions;
pub use svg::SvgOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExportFormat {
    Png,
    Svg,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Svg => "svg",
        }
    }
}

/// Corner a watermark is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    #[default]
    BottomRight,
}

/// How erase strokes appear in vector output.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum EraseRendering {
    /// Each erase stroke masks everything painted before it.
    #[default]
    Mask,
    /// Erase strokes are painted in this color, for targets without masks.
    BackgroundFill(Color32),
}

/// Everything needed to produce one export, detached from the live app.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub format: ExportFormat,
    pub scene: Vec<StrokeRef>,
    pub canvas_size: [u32; 2],
    pub file_name: String,
    pub raster: RasterOptions,
    pub svg: SvgOptions,
}

impl ExportRequest {
    /// Build a request from the app configuration, naming the file now.
    pub fn from_config(
        format: ExportFormat,
        scene: Vec<StrokeRef>,
        config: &AppConfig,
        watermark: Option<Arc<RgbaImage>>,
    ) -> Self {
        let export = &config.export;
        let policy: TierPolicy = export.policy();
        let watermark = if policy.add_watermark {
            if watermark.is_none() {
                log::warn!("Tier {:?} asks for a watermark but none is loaded", export.tier);
            }
            watermark
        } else {
            None
        };

        Self {
            format,
            scene,
            canvas_size: config.canvas_size,
            file_name: export_file_name(
                &config.app_name,
                chrono::Local::now().date_naive(),
                &random_suffix(),
                format.extension(),
            ),
            raster: RasterOptions {
                pixel_ratio: policy.pixel_ratio,
                max_dimension: policy.max_dimension,
                background: export.background,
                watermark,
                watermark_corner: export.watermark_corner,
            },
            svg: SvgOptions {
                erase: export.erase_rendering,
                background: export.background,
            },
        }
    }

    /// Render and encode. Pure with respect to the app: touches nothing but
    /// the snapshot it owns.
    pub fn run(&self) -> Result<ExportedFile, ExportError> {
        log::info!(
            "Exporting {} strokes as {}",
            self.scene.len(),
            self.file_name
        );
        let bytes = match self.format {
            ExportFormat::Png => raster::export_png(&self.scene, self.canvas_size, &self.raster)?,
            ExportFormat::Svg => {
                svg::export_svg(&self.scene, self.canvas_size, &self.svg)?.into_bytes()
            }
        };

        Ok(ExportedFile {
            file_name: self.file_name.clone(),
            format: self.format,
            bytes,
        })
    }
}

/// An encoded export, ready to be written somewhere.
#[derive(Debug, Clone)]
pub struct ExportedFile {
    pub file_name: String,
    pub format: ExportFormat,
    pub bytes: Vec<u8>,
}

impl ExportedFile {
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        let path = dir.join(&self.file_name);
        std::fs::create_dir_all(dir)
            .and_then(|()| std::fs::write(&path, &self.bytes))
            .map_err(|source| ExportError::Io {
                path: path.clone(),
                source,
            })?;
        log::info!("Wrote {} ({} bytes)", path.display(), self.bytes.len());
        Ok(path)
    }

    #[cfg(target_arch = "wasm32")]
    pub fn save_to(&self, _dir: &Path) -> Result<PathBuf, ExportError> {
        Err(ExportError::Unsupported)
    }
}

/// Load the watermark image named in the config, if any.
pub fn load_watermark(config: &AppConfig) -> Option<Arc<RgbaImage>> {
    let path = config.export.watermark_path.as_ref()?;
    match image::open(path) {
        Ok(img) => Some(Arc::new(img.to_rgba8())),
        Err(err) => {
            log::warn!("Failed to load watermark {}: {err}", path.display());
            None
        }
    }
}
