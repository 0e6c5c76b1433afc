use std::sync::Arc;

use eframe_ink::export::{
    EraseRendering, ExportFormat, ExportRequest, RasterOptions, SvgOptions, raster, svg,
};
use eframe_ink::{AppConfig, BrushSettings, CapStyle, Stroke, StrokePoint, StrokeRef, Tool};
use egui::Color32;
use image::{Rgba, RgbaImage};

fn line(tool: Tool, color: Color32, y: f32, width: f32) -> StrokeRef {
    let settings = BrushSettings::new(tool, color, width, CapStyle::RoundCap);
    let points = (0..8)
        .map(|i| StrokePoint::new(10.0 + i as f32 * 10.0, y, None, i * 16))
        .collect();
    Stroke::new_ref(settings, points).unwrap()
}

fn decode(bytes: &[u8]) -> RgbaImage {
    image::load_from_memory(bytes).unwrap().to_rgba8()
}

#[test]
fn test_png_has_white_background_and_ink() {
    let scene = vec![line(Tool::Draw, Color32::RED, 50.0, 10.0)];
    let bytes = raster::export_png(&scene, [100, 100], &RasterOptions::default()).unwrap();
    let image = decode(&bytes);

    assert_eq!(image.dimensions(), (100, 100));
    assert_eq!(*image.get_pixel(5, 5), Rgba([255, 255, 255, 255]));
    assert_eq!(*image.get_pixel(40, 50), Rgba([255, 0, 0, 255]));
}

#[test]
fn test_erase_reveals_background() {
    let scene = vec![
        line(Tool::Draw, Color32::BLACK, 50.0, 20.0),
        line(Tool::Erase, Color32::BLACK, 50.0, 30.0),
    ];
    let image = raster::render_image(&scene, [100, 100], &RasterOptions::default()).unwrap();
    assert_eq!(*image.get_pixel(40, 50), Rgba([255, 255, 255, 255]));

    let transparent = RasterOptions {
        background: None,
        ..Default::default()
    };
    let image = raster::render_image(&scene, [100, 100], &transparent).unwrap();
    assert_eq!(image.get_pixel(40, 50)[3], 0);
}

#[test]
fn test_pixel_ratio_and_max_dimension() {
    let scene = vec![line(Tool::Draw, Color32::BLACK, 50.0, 10.0)];

    let doubled = RasterOptions {
        pixel_ratio: 2.0,
        ..Default::default()
    };
    let image = raster::render_image(&scene, [100, 60], &doubled).unwrap();
    assert_eq!(image.dimensions(), (200, 120));

    let capped = RasterOptions {
        pixel_ratio: 4.0,
        max_dimension: Some(150),
        ..Default::default()
    };
    let image = raster::render_image(&scene, [100, 60], &capped).unwrap();
    assert_eq!(image.dimensions(), (150, 90));
}

#[test]
fn test_watermark_is_stamped_in_corner() {
    let mark = Arc::new(RgbaImage::from_pixel(10, 10, Rgba([0, 0, 255, 255])));
    let options = RasterOptions {
        watermark: Some(mark),
        ..Default::default()
    };
    let image = raster::render_image(&[], [100, 100], &options).unwrap();

    // Bottom right, 20px from the edges.
    assert_eq!(*image.get_pixel(75, 75), Rgba([0, 0, 255, 255]));
    assert_eq!(*image.get_pixel(85, 85), Rgba([255, 255, 255, 255]));
    assert_eq!(*image.get_pixel(5, 5), Rgba([255, 255, 255, 255]));
}

#[test]
fn test_svg_masks_keep_paint_order() {
    let scene = vec![
        line(Tool::Draw, Color32::RED, 30.0, 10.0),
        line(Tool::Erase, Color32::BLACK, 30.0, 20.0),
        line(Tool::Draw, Color32::BLUE, 60.0, 10.0),
    ];
    let doc = svg::export_svg(&scene, [100, 100], &SvgOptions::default()).unwrap();

    assert!(doc.starts_with("<?xml"));
    assert!(doc.contains(r#"viewBox="0 0 100 100""#));
    assert!(doc.contains(r#"<mask id="erase-1""#));

    // The red stroke sits inside the masked group; the blue one comes after it.
    let mask_use = doc.find(r##"mask="url(#erase-1)""##).unwrap();
    let red = doc.find("#ff0000").unwrap();
    let blue = doc.find("#0000ff").unwrap();
    let group_end = doc[mask_use..].find("</g>\n<g data-stroke").map(|i| i + mask_use);
    assert!(mask_use < red);
    assert!(red < blue);
    assert!(group_end.is_some_and(|end| end < blue));
}

#[test]
fn test_svg_background_fill_for_erase() {
    let scene = vec![
        line(Tool::Draw, Color32::RED, 30.0, 10.0),
        line(Tool::Erase, Color32::BLACK, 30.0, 20.0),
    ];
    let options = SvgOptions {
        erase: EraseRendering::BackgroundFill(Color32::WHITE),
        background: Some(Color32::WHITE),
    };
    let doc = svg::export_svg(&scene, [100, 100], &options).unwrap();

    assert!(!doc.contains("<mask"));
    assert_eq!(doc.matches("<g data-stroke").count(), 2);
    assert!(doc.contains(r##"<rect width="100" height="100" fill="#ffffff"/>"##));
}

#[test]
fn test_svg_skips_short_strokes() {
    let settings = BrushSettings::default();
    let short = Stroke::new_ref(
        settings,
        vec![
            StrokePoint::new(1.0, 1.0, None, 0),
            StrokePoint::new(9.0, 9.0, None, 16),
        ],
    )
    .unwrap();
    let doc = svg::export_svg(&[short], [20, 20], &SvgOptions::default()).unwrap();
    assert!(!doc.contains("<path"));
}

#[test]
fn test_request_names_file_and_follows_tier() {
    let mut config = AppConfig::default();
    config.app_name = "sketch".to_owned();
    config.canvas_size = [64, 32];

    let request = ExportRequest::from_config(ExportFormat::Png, Vec::new(), &config, None);
    let name = &request.file_name;
    // sketch-YYYY-MM-DD-xxxxxx.png
    assert!(name.starts_with("sketch-"));
    assert!(name.ends_with(".png"));
    assert_eq!(name.len(), "sketch-".len() + 10 + 1 + 6 + ".png".len());
    assert_eq!(request.raster.pixel_ratio, 1.0);
    assert_eq!(request.raster.max_dimension, Some(2048));

    let file = request.run().unwrap();
    assert_eq!(decode(&file.bytes).dimensions(), (64, 32));
}

#[test]
fn test_export_does_not_touch_scene() {
    let scene = vec![line(Tool::Draw, Color32::RED, 30.0, 10.0)];
    let request =
        ExportRequest::from_config(ExportFormat::Svg, scene.clone(), &AppConfig::default(), None);
    let file = request.run().unwrap();
    assert_eq!(file.format, ExportFormat::Svg);
    assert_eq!(request.scene, scene);
    assert!(Arc::strong_count(&scene[0]) >= 2);
}
