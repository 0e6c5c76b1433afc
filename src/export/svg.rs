use std::fmt::Write as _;

use egui::Color32;

use super::EraseRendering;
use crate::error::ExportError;
use crate::outline::{CurveSegment, OutlineAlgorithm};
use crate::stroke::{Stroke, StrokeRef, Tool};

/// Eraser mask paths are widened a little so anti-aliased edges don't survive.
const ERASE_MASK_WIDEN: f32 = 1.2;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SvgOptions {
    pub erase: EraseRendering,
    /// Painted beneath every stroke and never erased.
    pub background: Option<Color32>,
}

/// Serialize the scene as an SVG document of smoothed curve segments.
///
/// Paint order is preserved: with [`EraseRendering::Mask`] every erase
/// stroke becomes a mask wrapped around everything painted before it.
/// Strokes too short to fit a curve (fewer than four points) are omitted.
pub fn export_svg(
    scene: &[StrokeRef],
    [width, height]: [u32; 2],
    options: &SvgOptions,
) -> Result<String, ExportError> {
    let mut defs = String::new();
    let mut body = String::new();
    let mut mask_count = 0;

    for stroke in scene {
        let outline = stroke.outline(OutlineAlgorithm::SmoothedCurve);
        let segments = outline.as_curves().unwrap_or_default();
        if segments.is_empty() {
            continue;
        }

        match (stroke.tool(), options.erase) {
            (Tool::Draw, _) => {
                write_stroke_group(&mut body, stroke, segments, stroke.color(), 1.0)?
            }
            (Tool::Erase, EraseRendering::BackgroundFill(color)) => {
                write_stroke_group(&mut body, stroke, segments, color, 1.0)?
            }
            (Tool::Erase, EraseRendering::Mask) => {
                mask_count += 1;
                let id = format!("erase-{mask_count}");
                writeln!(
                    defs,
                    r#"<mask id="{id}" maskUnits="userSpaceOnUse" x="0" y="0" {}>"#,
                    size_attrs(width, height),
                )?;
                writeln!(defs, r#"<rect {} fill="white"/>"#, size_attrs(width, height))?;
                let black = Color32::BLACK;
                write_stroke_group(&mut defs, stroke, segments, black, ERASE_MASK_WIDEN)?;
                writeln!(defs, "</mask>")?;

                body = format!("<g mask=\"url(#{id})\">\n{body}</g>\n");
            }
        }
    }

    let mut svg = String::with_capacity(defs.len() + body.len() + 256);
    writeln!(svg, r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>"#)?;
    writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" {} viewBox="0 0 {width} {height}">"#,
        size_attrs(width, height),
    )?;
    if !defs.is_empty() {
        write!(svg, "<defs>\n{defs}</defs>\n")?;
    }
    if let Some(background) = options.background {
        writeln!(
            svg,
            r#"<rect {} fill="{}"/>"#,
            size_attrs(width, height),
            hex(background)
        )?;
    }
    svg.push_str(&body);
    svg.push_str("</svg>\n");

    Ok(svg)
}

fn write_stroke_group(
    out: &mut String,
    stroke: &Stroke,
    segments: &[CurveSegment],
    color: Color32,
    widen: f32,
) -> Result<(), ExportError> {
    let [.., alpha] = color.to_srgba_unmultiplied();
    write!(out, r#"<g data-stroke="{}" stroke="{}""#, stroke.id(), hex(color))?;
    if alpha < 255 {
        write!(out, r#" stroke-opacity="{:.3}""#, alpha as f32 / 255.0)?;
    }
    writeln!(out, r#" fill="none" stroke-linecap="round" stroke-linejoin="round">"#)?;

    for s in segments {
        write!(out, r#"<path d="M {:.2} {:.2} "#, s.start.x, s.start.y)?;
        write!(
            out,
            "C {:.2} {:.2}, {:.2} {:.2}, {:.2} {:.2}",
            s.control1.x, s.control1.y, s.control2.x, s.control2.y, s.end.x, s.end.y,
        )?;
        writeln!(out, r#"" stroke-width="{:.2}"/>"#, s.width * widen)?;
    }

    writeln!(out, "</g>")?;
    Ok(())
}

fn size_attrs(width: u32, height: u32) -> String {
    format!(r#"width="{width}" height="{height}""#)
}

fn hex(color: Color32) -> String {
    let [r, g, b, _] = color.to_srgba_unmultiplied();
    format!("#{r:02x}{g:02x}{b:02x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colors_are_hex() {
        assert_eq!(hex(Color32::from_rgb(255, 16, 0)), "#ff1000");
    }
}
