use eframe::egui::{self, Color32, Pos2, Rect, Sense, Shape, Stroke, TextureHandle, TextureOptions};

use crate::canvas::model::{Color, DrawObject, Geometry};
use crate::canvas::{render_canvas, CanvasInputState, InputCommand, PixelBuffer, CANVAS_SIZE};
use crate::options::GenerationParams;

/// The drawing surface: pointer handling, toolbar and the rasterised snapshot.
pub struct CanvasPanel {
    input: CanvasInputState,
    snapshot: PixelBuffer,
    rendered_revision: Option<u64>,
    texture: Option<TextureHandle>,
}

impl CanvasPanel {
    pub fn new(params: &GenerationParams) -> Self {
        Self {
            input: CanvasInputState::new(params.tool, params.stroke_width),
            snapshot: PixelBuffer::blank(CANVAS_SIZE, CANVAS_SIZE),
            rendered_revision: None,
            texture: None,
        }
    }

    pub fn apply_params(&mut self, params: &GenerationParams) {
        self.input.set_tool(params.tool);
        self.input.set_stroke_width(params.stroke_width);
    }

    /// Current pixel buffer, re-rasterised only when the history changed.
    pub fn snapshot(&mut self) -> &PixelBuffer {
        let revision = self.input.history().revision();
        if self.rendered_revision != Some(revision) {
            self.snapshot = render_canvas(&self.input.history().canvas());
            self.rendered_revision = Some(revision);
            self.texture = None;
        }
        &self.snapshot
    }

    pub fn ui(&mut self, ui: &mut egui::Ui) {
        self.toolbar(ui);

        let size = CANVAS_SIZE as f32;
        let (response, painter) =
            ui.allocate_painter(egui::vec2(size, size), Sense::click_and_drag());
        let rect = response.rect;
        self.handle_pointer(ui, &response);

        if ui.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.input.cancel();
        }

        self.snapshot();
        let texture = self.texture.get_or_insert_with(|| {
            let (w, h) = self.snapshot.size();
            ui.ctx().load_texture(
                "canvas",
                egui::ColorImage::from_rgba_unmultiplied(
                    [w as usize, h as usize],
                    self.snapshot.as_rgba(),
                ),
                TextureOptions::LINEAR,
            )
        });
        painter.image(
            texture.id(),
            rect,
            Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            Color32::WHITE,
        );
        painter.rect_stroke(rect, 0.0, Stroke::new(1.0, Color32::GRAY));

        if let Some(active) = self.input.active_object() {
            let scale = rect.width() / CANVAS_SIZE as f32;
            let to_screen =
                |p: (i32, i32)| rect.min + egui::vec2(p.0 as f32 * scale, p.1 as f32 * scale);
            let hover = response.hover_pos();
            painter.add(preview_shape(&active, scale, to_screen, hover));
        }
    }

    fn handle_pointer(&mut self, ui: &egui::Ui, response: &egui::Response) {
        let rect = response.rect;
        let to_canvas = |pos: Pos2| -> (i32, i32) {
            let scale = CANVAS_SIZE as f32 / rect.width().max(1.0);
            (
                ((pos.x - rect.min.x) * scale).round() as i32,
                ((pos.y - rect.min.y) * scale).round() as i32,
            )
        };
        let (press_origin, latest) = ui.input(|i| (i.pointer.press_origin(), i.pointer.latest_pos()));

        // A drag is only reported once the pointer passes the drag threshold,
        // so the stroke starts where the button went down.
        if response.drag_started() {
            if let Some(pos) = press_origin.or(response.interact_pointer_pos()) {
                self.input.handle_press(to_canvas(pos));
            }
        }
        if response.dragged() {
            if let Some(pos) = response.interact_pointer_pos() {
                self.input.handle_move(to_canvas(pos));
            }
        }
        if response.drag_stopped() {
            if let Some(pos) = response.interact_pointer_pos().or(latest) {
                self.input.handle_release(to_canvas(pos));
            }
        }
        if response.double_clicked() || response.secondary_clicked() {
            self.input.handle_close();
        } else if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                self.input.handle_press(to_canvas(pos));
                self.input.handle_release(to_canvas(pos));
            }
        }
    }

    fn toolbar(&mut self, ui: &mut egui::Ui) {
        let history = self.input.history();
        let (can_undo, can_redo, has_content) = (
            history.undo_len() > 0,
            history.redo_len() > 0,
            history.undo_len() > 0 || history.redo_len() > 0,
        );
        let (undo_key, redo_key) = ui.input(|i| {
            (
                i.modifiers.command && !i.modifiers.shift && i.key_pressed(egui::Key::Z),
                i.modifiers.command && i.modifiers.shift && i.key_pressed(egui::Key::Z),
            )
        });
        ui.horizontal(|ui| {
            if ui.add_enabled(can_undo, egui::Button::new("Undo")).clicked() || undo_key {
                self.input.apply(InputCommand::Undo);
            }
            if ui.add_enabled(can_redo, egui::Button::new("Redo")).clicked() || redo_key {
                self.input.apply(InputCommand::Redo);
            }
            if ui
                .add_enabled(has_content, egui::Button::new("Clear"))
                .clicked()
            {
                self.input.apply(InputCommand::Clear);
            }
        });
    }
}

fn color32(color: Color) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a)
}

fn preview_shape(
    object: &DrawObject,
    scale: f32,
    to_screen: impl Fn((i32, i32)) -> Pos2,
    hover: Option<Pos2>,
) -> Shape {
    let stroke = Stroke::new(
        object.style.stroke.width as f32 * scale,
        color32(object.style.stroke.color),
    );
    let fill = object
        .style
        .fill
        .map(|f| color32(f.color))
        .unwrap_or(Color32::TRANSPARENT);

    match &object.geometry {
        Geometry::Freehand { points } => {
            Shape::line(points.iter().copied().map(&to_screen).collect(), stroke)
        }
        Geometry::Line { start, end } => {
            Shape::line_segment([to_screen(*start), to_screen(*end)], stroke)
        }
        Geometry::Rect { start, end } => {
            let rect = Rect::from_two_pos(to_screen(*start), to_screen(*end));
            Shape::Vec(vec![
                Shape::rect_filled(rect, 0.0, fill),
                Shape::rect_stroke(rect, 0.0, stroke),
            ])
        }
        Geometry::Circle { center, radius } => {
            let (center, radius) = (to_screen(*center), *radius as f32 * scale);
            Shape::Vec(vec![
                Shape::circle_filled(center, radius, fill),
                Shape::circle_stroke(center, radius, stroke),
            ])
        }
        // Open outline plus a rubber band to the pointer until the user closes it.
        Geometry::Polygon { vertices } => {
            let mut points: Vec<Pos2> = vertices.iter().copied().map(&to_screen).collect();
            points.extend(hover);
            Shape::line(points, stroke)
        }
    }
}
