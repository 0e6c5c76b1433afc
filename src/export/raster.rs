use std::io::Cursor;
use std::sync::Arc;

use egui::Color32;
use image::{ImageFormat, Rgba, RgbaImage, imageops};

use super::Corner;
use crate::compositor::{Compositor, RasterSurface};
use crate::error::ExportError;
use crate::stroke::StrokeRef;

/// Watermark distance from the canvas edge, in canvas points.
const WATERMARK_PADDING: f32 = 20.0;

#[derive(Debug, Clone)]
pub struct RasterOptions {
    pub pixel_ratio: f32,
    pub max_dimension: Option<u32>,
    /// Flatten onto this color; `None` keeps transparency.
    pub background: Option<Color32>,
    pub watermark: Option<Arc<RgbaImage>>,
    pub watermark_corner: Corner,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            pixel_ratio: 1.0,
            max_dimension: None,
            background: Some(Color32::WHITE),
            watermark: None,
            watermark_corner: Corner::BottomRight,
        }
    }
}

impl RasterOptions {
    /// The multiplier actually used: `pixel_ratio`, reduced if needed so the
    /// larger output side stays within `max_dimension`.
    pub fn effective_scale(&self, canvas_size: [u32; 2]) -> f32 {
        let mut scale = self.pixel_ratio;
        if let Some(max) = self.max_dimension {
            let largest = canvas_size[0].max(canvas_size[1]) as f32;
            if largest * scale > max as f32 {
                scale = max as f32 / largest;
            }
        }
        scale
    }
}

/// Render the scene into an image at the configured resolution.
pub fn render_image(
    scene: &[StrokeRef],
    canvas_size: [u32; 2],
    options: &RasterOptions,
) -> Result<RgbaImage, ExportError> {
    let scale = options.effective_scale(canvas_size);
    let width = (canvas_size[0] as f32 * scale).floor() as u32;
    let height = (canvas_size[1] as f32 * scale).floor() as u32;

    let mut surface = RasterSurface::with_scale(width, height, scale)
        .ok_or(ExportError::SurfaceUnavailable { width, height })?;
    Compositor::new().render(scene, &mut surface);

    let strokes = RgbaImage::from_raw(width, height, surface.to_rgba8())
        .ok_or(ExportError::SurfaceUnavailable { width, height })?;

    let mut image = match options.background {
        Some(color) => {
            let fill = Rgba(color.to_srgba_unmultiplied());
            let mut base = RgbaImage::from_pixel(width, height, fill);
            imageops::overlay(&mut base, &strokes, 0, 0);
            base
        }
        None => strokes,
    };

    if let Some(watermark) = &options.watermark {
        let (x, y) = watermark_origin(
            (width, height),
            watermark.dimensions(),
            options.watermark_corner,
            WATERMARK_PADDING * scale,
        );
        imageops::overlay(&mut image, &**watermark, x, y);
    }

    Ok(image)
}

/// Render and encode as PNG.
pub fn export_png(
    scene: &[StrokeRef],
    canvas_size: [u32; 2],
    options: &RasterOptions,
) -> Result<Vec<u8>, ExportError> {
    let image = render_image(scene, canvas_size, options)?;
    let mut bytes = Cursor::new(Vec::new());
    image.write_to(&mut bytes, ImageFormat::Png)?;
    Ok(bytes.into_inner())
}

fn watermark_origin(
    (width, height): (u32, u32),
    (mark_w, mark_h): (u32, u32),
    corner: Corner,
    padding: f32,
) -> (i64, i64) {
    let padding = padding.round() as i64;
    let right = width as i64 - mark_w as i64 - padding;
    let bottom = height as i64 - mark_h as i64 - padding;
    match corner {
        Corner::TopLeft => (padding, padding),
        Corner::TopRight => (right, padding),
        Corner::BottomLeft => (padding, bottom),
        Corner::BottomRight => (right, bottom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_dimension_caps_scale() {
        let options = RasterOptions {
            pixel_ratio: 4.0,
            max_dimension: Some(2048),
            ..Default::default()
        };
        assert_eq!(options.effective_scale([1024, 512]), 2.0);
        assert_eq!(options.effective_scale([256, 256]), 4.0);
    }

    #[test]
    fn watermark_sits_in_corner() {
        assert_eq!(
            watermark_origin((100, 80), (10, 5), Corner::BottomRight, 20.0),
            (70, 55)
        );
        assert_eq!(
            watermark_origin((100, 80), (10, 5), Corner::TopLeft, 20.0),
            (20, 20)
        );
    }
}
