use std::sync::Arc;

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::export::{self, ExportFormat, ExportOutcome, ExportQueue, ExportRequest};
use crate::history::HistoryManager;
use crate::input::{InputEvent, InputHandler, ShortcutAction};
use crate::panels::{central_panel, tools_panel};
use crate::renderer::Renderer;
use crate::stroke::{BrushSettings, StrokeRef};

/// How long a notification stays on screen, in seconds.
const NOTIFICATION_SECS: f64 = 3.0;

/// What survives a restart. Undo history does not.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
struct PersistedState {
    scene: Vec<StrokeRef>,
    brush: BrushSettings,
}

#[derive(Debug, Clone)]
struct Notification {
    message: String,
    is_error: bool,
    expires_at: f64,
}

#[derive(Debug)]
pub struct PaintApp {
    config: AppConfig,
    history: HistoryManager,
    brush: BrushSettings,
    renderer: Option<Renderer>,
    input: InputHandler,
    exports: ExportQueue,
    watermark: Option<Arc<RgbaImage>>,
    notifications: Vec<Notification>,
}

impl PaintApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        let persisted: PersistedState = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();

        let mut app = Self::with_config(config);
        app.restore(persisted);
        app.renderer = Some(Renderer::new(cc));
        app
    }

    /// An app without a window, for driving the canvas programmatically.
    pub fn with_config(config: AppConfig) -> Self {
        let watermark = export::load_watermark(&config);
        Self {
            history: HistoryManager::new(config.sampler),
            brush: BrushSettings::default(),
            renderer: None,
            input: InputHandler::new(egui::Rect::NOTHING),
            exports: ExportQueue::new(),
            watermark,
            notifications: Vec::new(),
            config,
        }
    }

    fn restore(&mut self, persisted: PersistedState) {
        let scene: Vec<StrokeRef> = persisted
            .scene
            .into_iter()
            .filter(|stroke| !stroke.points().is_empty())
            .collect();
        log::info!("Restored {} strokes", scene.len());
        self.history = HistoryManager::with_scene(self.config.sampler, scene);
        self.brush = persisted.brush.sanitized();
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn brush(&self) -> &BrushSettings {
        &self.brush
    }

    /// Changes apply from the next stroke on.
    pub fn brush_mut(&mut self) -> &mut BrushSettings {
        &mut self.brush
    }

    // Edits finish the stroke in progress first so it is part of what they act on.

    pub fn undo(&mut self) {
        self.history.end_stroke();
        self.history.undo();
    }

    pub fn redo(&mut self) {
        self.history.end_stroke();
        self.history.redo();
    }

    pub fn clear(&mut self) {
        self.history.end_stroke();
        self.history.clear();
    }

    /// Apply one input event to the canvas.
    pub fn apply(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerDown(point) => {
                self.history.begin_stroke(point, self.brush.sanitized())
            }
            InputEvent::PointerMove(point) => self.history.extend_stroke(point),
            InputEvent::PointerUp => {
                self.history.end_stroke();
            }
            InputEvent::Cancel => {
                self.history.cancel_stroke();
            }
            InputEvent::Shortcut(ShortcutAction::Undo) => self.undo(),
            InputEvent::Shortcut(ShortcutAction::Redo) => self.redo(),
            InputEvent::Shortcut(ShortcutAction::SelectTool(tool)) => self.brush.tool = tool,
            InputEvent::Shortcut(ShortcutAction::SetWidth(width)) => self.brush.width_scale = width,
        }
    }

    /// Feed this frame's input to the canvas. Only presses that hit the
    /// canvas widget itself start a stroke.
    pub fn handle_input(&mut self, ctx: &egui::Context, canvas: &egui::Response) {
        self.input.set_canvas_rect(canvas.rect);
        let press_on_canvas = canvas.is_pointer_button_down_on();
        for event in self.input.process_input(ctx, press_on_canvas) {
            self.apply(event);
        }
    }

    pub fn render_canvas(&mut self, painter: &egui::Painter, rect: egui::Rect) {
        if let Some(renderer) = &mut self.renderer {
            renderer.render(painter, rect, &self.history);
        }
    }

    /// Start a background export of the current scene.
    pub fn export(&mut self, format: ExportFormat) {
        self.history.end_stroke();
        let request = ExportRequest::from_config(
            format,
            self.history.snapshot(),
            &self.config,
            self.watermark.clone(),
        );
        self.exports.submit(request, &self.config.export.output_dir);
    }

    pub fn exports_pending(&self) -> usize {
        self.exports.pending()
    }

    fn collect_exports(&mut self, now: f64) {
        for ExportOutcome { file_name, result } in self.exports.poll() {
            let (message, is_error) = match result {
                Ok(path) => (format!("Saved {}", path.display()), false),
                Err(err) => {
                    log::error!("Export of {file_name} failed: {err}");
                    (format!("Export failed: {err}"), true)
                }
            };
            self.notifications.push(Notification {
                message,
                is_error,
                expires_at: now + NOTIFICATION_SECS,
            });
        }
        self.notifications.retain(|n| n.expires_at > now);
    }

    /// Click a notification to dismiss it early.
    fn show_notifications(&mut self, ctx: &egui::Context) {
        if self.notifications.is_empty() {
            return;
        }

        let mut dismissed = None;
        egui::Area::new(egui::Id::new("notifications"))
            .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-12.0, -12.0))
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    for (index, notification) in self.notifications.iter().enumerate() {
                        let color = if notification.is_error {
                            ui.visuals().error_fg_color
                        } else {
                            ui.visuals().text_color()
                        };
                        let text = egui::RichText::new(&notification.message).color(color);
                        if ui.add(egui::Label::new(text).sense(egui::Sense::click())).clicked() {
                            dismissed = Some(index);
                        }
                    }
                });
            });

        if let Some(index) = dismissed {
            self.notifications.remove(index);
        }
    }
}

impl eframe::App for PaintApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        let state = PersistedState {
            scene: self.history.snapshot(),
            brush: self.brush,
        };
        eframe::set_value(storage, eframe::APP_KEY, &state);
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = ctx.input(|i| i.time);
        self.collect_exports(now);

        tools_panel(self, ctx);
        central_panel(self, ctx);
        self.show_notifications(ctx);

        if self.exports.is_busy() || !self.notifications.is_empty() {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stroke::{StrokePoint, Tool};

    fn point(x: f32, t: u64) -> StrokePoint {
        StrokePoint::new(x, 10.0, None, t)
    }

    #[test]
    fn brush_is_captured_at_pointer_down() {
        let mut app = PaintApp::with_config(AppConfig::default());
        app.apply(InputEvent::PointerDown(point(0.0, 0)));
        app.apply(InputEvent::Shortcut(ShortcutAction::SelectTool(Tool::Erase)));
        app.apply(InputEvent::PointerMove(point(30.0, 100)));
        app.apply(InputEvent::PointerUp);

        assert_eq!(app.history().scene()[0].tool(), Tool::Draw);
        assert_eq!(app.brush().tool, Tool::Erase);
    }

    #[test]
    fn undo_mid_stroke_removes_that_stroke() {
        let mut app = PaintApp::with_config(AppConfig::default());
        app.apply(InputEvent::PointerDown(point(0.0, 0)));
        app.apply(InputEvent::PointerMove(point(30.0, 100)));
        app.apply(InputEvent::Shortcut(ShortcutAction::Undo));

        assert!(!app.history().is_drawing());
        assert!(app.history().scene().is_empty());
        assert!(app.history().can_redo());
    }

    #[test]
    fn persisted_state_round_trips_through_json() {
        let mut app = PaintApp::with_config(AppConfig::default());
        app.apply(InputEvent::PointerDown(point(0.0, 0)));
        app.apply(InputEvent::PointerMove(point(30.0, 100)));
        app.apply(InputEvent::PointerUp);

        let state = PersistedState {
            scene: app.history().snapshot(),
            brush: *app.brush(),
        };
        let json = serde_json::to_string(&state).unwrap();
        let restored: PersistedState = serde_json::from_str(&json).unwrap();

        let mut reopened = PaintApp::with_config(AppConfig::default());
        reopened.restore(restored);
        assert_eq!(reopened.history().scene(), app.history().scene());
        assert!(!reopened.history().can_redo());
    }
}
