use egui::Slider;

use crate::PaintApp;
use crate::export::ExportFormat;
use crate::history::RedoEntry;
use crate::stroke::{CapStyle, Tool};

pub fn tools_panel(app: &mut PaintApp, ctx: &egui::Context) {
    egui::SidePanel::left("tools_panel")
        .resizable(true)
        .default_width(200.0)
        .show(ctx, |ui| {
            ui.heading("Tools");

            ui.horizontal(|ui| {
                for tool in [Tool::Draw, Tool::Erase] {
                    if ui.selectable_label(app.brush().tool == tool, tool.label()).clicked() {
                        log::info!("Tool selected from UI: {:?}", tool);
                        app.brush_mut().tool = tool;
                    }
                }
            });

            ui.separator();

            let brush = app.brush_mut();
            ui.horizontal(|ui| {
                ui.label("Color:");
                egui::color_picker::color_edit_button_srgba(
                    ui,
                    &mut brush.color,
                    egui::color_picker::Alpha::OnlyBlend,
                );
            });
            ui.horizontal(|ui| {
                ui.label("Width:");
                ui.add(Slider::new(&mut brush.width_scale, 1.0..=50.0));
            });
            ui.horizontal(|ui| {
                ui.label("Caps:");
                for style in [CapStyle::RoundCap, CapStyle::FlatCap] {
                    ui.selectable_value(&mut brush.style, style, style.label());
                }
            });

            ui.separator();

            ui.horizontal(|ui| {
                let can_undo = app.history().can_undo();
                let can_redo = app.history().can_redo();

                if ui.add_enabled(can_undo, egui::Button::new("Undo")).clicked() {
                    app.undo();
                }
                if ui.add_enabled(can_redo, egui::Button::new("Redo")).clicked() {
                    app.redo();
                }
                let can_clear = !app.history().scene().is_empty();
                if ui.add_enabled(can_clear, egui::Button::new("Clear")).clicked() {
                    app.clear();
                }
            });

            let history = app.history();
            ui.horizontal(|ui| {
                ui.label(format!("Strokes: {}", history.scene().len()));
                ui.label(format!("Undo depth: {}", history.undo_depth()));
            });
            if let Some(entry) = history.redo_stack().last() {
                ui.label(match entry {
                    RedoEntry::Strokes(strokes) => format!("Redo: {} stroke(s)", strokes.len()),
                    RedoEntry::Clear => "Redo: clear".to_owned(),
                });
            }

            ui.separator();
            ui.heading("Export");

            ui.horizontal(|ui| {
                for format in [ExportFormat::Png, ExportFormat::Svg] {
                    let label = format.extension().to_uppercase();
                    if ui.button(label).clicked() {
                        app.export(format);
                    }
                }
                if app.exports_pending() > 0 {
                    ui.spinner();
                }
            });
        });
}
