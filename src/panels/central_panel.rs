use crate::PaintApp;

pub fn central_panel(app: &mut PaintApp, ctx: &egui::Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        let [width, height] = app.config().canvas_size;
        let size = egui::vec2(width as f32, height as f32);

        egui::ScrollArea::both().drag_to_scroll(false).show(ui, |ui| {
            let (response, painter) = ui.allocate_painter(size, egui::Sense::drag());
            let canvas_rect = response.rect;

            app.handle_input(ctx, &response);
            app.render_canvas(&painter, canvas_rect);
        });
    });
}
