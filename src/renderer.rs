// src/renderer.rs
use eframe::egui::{self, Color32, ColorImage, Rect, TextureHandle, TextureOptions};

use crate::compositor::{Compositor, RasterSurface};
use crate::history::HistoryManager;

/// What the uploaded texture currently shows.
#[derive(Debug, Clone, Copy, PartialEq)]
struct FrameKey {
    version: u64,
    size: [u32; 2],
    scale: f32,
    live_points: usize,
}

/// Draws the canvas: committed strokes from a cached raster plus the stroke
/// still being drawn.
pub struct Renderer {
    compositor: Compositor,
    /// Committed scene with the version and scale it was drawn at.
    scene_cache: Option<(u64, f32, RasterSurface)>,
    texture: Option<TextureHandle>,
    shown: Option<FrameKey>,
    ctx: egui::Context,
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("scene_cache", &self.scene_cache.as_ref().map(|(v, s, _)| (v, s)))
            .field("shown", &self.shown)
            .finish()
    }
}

impl Renderer {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        Self::from_context(cc.egui_ctx.clone())
    }

    pub fn from_context(ctx: egui::Context) -> Self {
        Self {
            compositor: Compositor::new(),
            scene_cache: None,
            texture: None,
            shown: None,
            ctx,
        }
    }

    /// Paints the canvas background and strokes into `rect`.
    pub fn render(&mut self, painter: &egui::Painter, rect: Rect, history: &HistoryManager) {
        let scale = self.ctx.pixels_per_point();
        let size = [
            (rect.width() * scale).round().max(0.0) as u32,
            (rect.height() * scale).round().max(0.0) as u32,
        ];

        painter.rect_filled(rect, 0.0, Color32::WHITE);

        if let Some(image) = self.frame_image(history, size, scale) {
            match &mut self.texture {
                Some(texture) => texture.set(image, TextureOptions::LINEAR),
                None => {
                    let texture = self.ctx.load_texture("canvas", image, TextureOptions::LINEAR);
                    self.texture = Some(texture);
                }
            }
        }

        if let Some(texture) = &self.texture {
            let uv = Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
            painter.image(texture.id(), rect, uv, Color32::WHITE);
        }
    }

    /// The image to upload this frame, or `None` if the texture is current.
    pub fn frame_image(
        &mut self,
        history: &HistoryManager,
        size: [u32; 2],
        scale: f32,
    ) -> Option<ColorImage> {
        let live = history.in_progress();
        let key = FrameKey {
            version: history.version(),
            size,
            scale,
            live_points: live.map_or(0, |stroke| stroke.points().len()),
        };
        if self.shown == Some(key) {
            return None;
        }

        let cache_is_stale = self.scene_cache.as_ref().is_none_or(|(version, cached, surface)| {
            *version != key.version
                || *cached != scale
                || [surface.width(), surface.height()] != size
        });
        if cache_is_stale {
            let Some(mut surface) = RasterSurface::with_scale(size[0], size[1], scale) else {
                log::debug!("Skipping render of empty canvas {size:?}");
                return None;
            };
            self.compositor.render(history.scene(), &mut surface);
            self.scene_cache = Some((key.version, scale, surface));
        }

        let (_, _, scene) = self.scene_cache.as_ref()?;
        let image = match live {
            Some(stroke) if !stroke.points().is_empty() => {
                let mut frame = scene.clone();
                self.compositor
                    .render_points(stroke.points(), stroke.settings(), &mut frame);
                frame.to_color_image()
            }
            _ => scene.to_color_image(),
        };

        self.shown = Some(key);
        Some(image)
    }
}
