use egui::{Color32, Pos2};
use tiny_skia::{BlendMode, FillRule, Paint, PathBuilder, Pixmap, Transform};

use crate::outline::{OutlineAlgorithm, build_outline};
use crate::stroke::{BrushSettings, Stroke, StrokePoint, StrokeRef, Tool};

/// How a filled shape combines with what is already on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeMode {
    /// Alpha-over.
    Paint,
    /// Removes existing content under the shape.
    Erase,
}

impl From<Tool> for CompositeMode {
    fn from(tool: Tool) -> Self {
        match tool {
            Tool::Draw => CompositeMode::Paint,
            Tool::Erase => CompositeMode::Erase,
        }
    }
}

/// Something outlines can be filled onto.
pub trait Surface {
    /// Reset to fully transparent.
    fn clear(&mut self);

    /// Fill a closed polygon given in canvas coordinates.
    fn fill_polygon(&mut self, polygon: &[Pos2], color: Color32, mode: CompositeMode);
}

/// Paints strokes in scene order, each with the compositing mode of its tool.
#[derive(Debug, Default, Clone, Copy)]
pub struct Compositor;

impl Compositor {
    pub fn new() -> Self {
        Self
    }

    /// Redraw the whole scene from scratch. Rendering the same scene twice
    /// gives identical output.
    pub fn render(&self, scene: &[StrokeRef], surface: &mut impl Surface) {
        surface.clear();
        for stroke in scene {
            self.render_stroke(stroke, surface);
        }
    }

    /// Composite a single stroke on top of whatever the surface holds.
    pub fn render_stroke(&self, stroke: &Stroke, surface: &mut impl Surface) {
        self.render_points(stroke.points(), stroke.settings(), surface);
    }

    /// Composite loose points, e.g. a stroke still being drawn.
    pub fn render_points(
        &self,
        points: &[StrokePoint],
        settings: &BrushSettings,
        surface: &mut impl Surface,
    ) {
        let outline = build_outline(
            points,
            settings.width_scale,
            settings.style,
            OutlineAlgorithm::Ribbon,
        );
        let Some(polygon) = outline.as_polygon().filter(|polygon| polygon.len() >= 3) else {
            return;
        };

        let color = match settings.tool {
            Tool::Draw => settings.color,
            // Only coverage matters when erasing.
            Tool::Erase => Color32::WHITE,
        };
        surface.fill_polygon(polygon, color, settings.tool.into());
    }
}

/// A premultiplied RGBA pixel buffer, optionally drawn at a scale.
#[derive(Clone)]
pub struct RasterSurface {
    pixmap: Pixmap,
    transform: Transform,
}

impl std::fmt::Debug for RasterSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterSurface")
            .field("width", &self.pixmap.width())
            .field("height", &self.pixmap.height())
            .field("transform", &self.transform)
            .finish()
    }
}

impl RasterSurface {
    /// `None` if either dimension is zero or too large to allocate.
    pub fn new(width: u32, height: u32) -> Option<Self> {
        Self::with_scale(width, height, 1.0)
    }

    /// A surface whose canvas coordinates are multiplied by `scale`.
    pub fn with_scale(width: u32, height: u32, scale: f32) -> Option<Self> {
        Some(Self {
            pixmap: Pixmap::new(width, height)?,
            transform: Transform::from_scale(scale, scale),
        })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Premultiplied RGBA8 bytes, row-major.
    pub fn data(&self) -> &[u8] {
        self.pixmap.data()
    }

    /// Straight (non-premultiplied) RGBA of one pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let color = self.pixmap.pixel(x, y)?.demultiply();
        Some([color.red(), color.green(), color.blue(), color.alpha()])
    }

    /// Straight RGBA8 bytes, row-major.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixmap
            .pixels()
            .iter()
            .flat_map(|p| {
                let c = p.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect()
    }

    pub fn to_color_image(&self) -> egui::ColorImage {
        egui::ColorImage::from_rgba_premultiplied(
            [self.width() as usize, self.height() as usize],
            self.data(),
        )
    }
}

impl Surface for RasterSurface {
    fn clear(&mut self) {
        self.pixmap.fill(tiny_skia::Color::TRANSPARENT);
    }

    fn fill_polygon(&mut self, polygon: &[Pos2], color: Color32, mode: CompositeMode) {
        let mut builder = PathBuilder::new();
        let mut vertices = polygon.iter();
        let Some(first) = vertices.next() else {
            return;
        };
        builder.move_to(first.x, first.y);
        for v in vertices {
            builder.line_to(v.x, v.y);
        }
        builder.close();
        let Some(path) = builder.finish() else {
            return;
        };

        let [r, g, b, a] = color.to_srgba_unmultiplied();
        let mut paint = Paint::default();
        paint.set_color_rgba8(r, g, b, a);
        paint.anti_alias = true;
        paint.blend_mode = match mode {
            CompositeMode::Paint => BlendMode::SourceOver,
            CompositeMode::Erase => BlendMode::DestinationOut,
        };

        self.pixmap
            .fill_path(&path, &paint, FillRule::Winding, self.transform, None);
    }
}
