use crate::canvas::history::CanvasHistory;
use crate::canvas::model::{DrawObject, Geometry, ObjectStyle};
use crate::options::DrawingTool;

const MIN_POINT_DIST_SQ: i64 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputCommand {
    Undo,
    Redo,
    Clear,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CanvasInputState {
    tool: DrawingTool,
    stroke_width: u32,
    active_geometry: Option<Geometry>,
    history: CanvasHistory,
}

impl CanvasInputState {
    pub fn new(tool: DrawingTool, stroke_width: u32) -> Self {
        Self {
            tool,
            stroke_width,
            active_geometry: None,
            history: CanvasHistory::default(),
        }
    }

    pub fn history(&self) -> &CanvasHistory {
        &self.history
    }

    pub fn tool(&self) -> DrawingTool {
        self.tool
    }

    /// Switching tools abandons any shape still being drawn.
    pub fn set_tool(&mut self, tool: DrawingTool) {
        if self.tool != tool {
            self.tool = tool;
            self.active_geometry = None;
        }
    }

    pub fn set_stroke_width(&mut self, width: u32) {
        self.stroke_width = crate::options::clamp_stroke_width(width);
    }

    /// The uncommitted shape, used for the live preview.
    pub fn active_object(&self) -> Option<DrawObject> {
        self.active_geometry.clone().map(|geometry| self.object(geometry))
    }

    pub fn handle_press(&mut self, point: (i32, i32)) {
        if let (DrawingTool::Polygon, Some(Geometry::Polygon { vertices })) =
            (self.tool, self.active_geometry.as_mut())
        {
            if vertices.last() != Some(&point) {
                vertices.push(point);
            }
            return;
        }

        self.active_geometry = Some(match self.tool {
            DrawingTool::Freedraw => Geometry::Freehand {
                points: vec![point],
            },
            DrawingTool::Line => Geometry::Line {
                start: point,
                end: point,
            },
            DrawingTool::Rectangle => Geometry::Rect {
                start: point,
                end: point,
            },
            DrawingTool::Circle => Geometry::Circle {
                center: point,
                radius: 0,
            },
            DrawingTool::Polygon => Geometry::Polygon {
                vertices: vec![point],
            },
        });
    }

    pub fn handle_move(&mut self, point: (i32, i32)) {
        match self.active_geometry.as_mut() {
            Some(Geometry::Freehand { points }) => {
                if should_append_point(points.last().copied(), point) {
                    points.push(point);
                }
            }
            Some(Geometry::Line { end, .. }) | Some(Geometry::Rect { end, .. }) => {
                *end = point;
            }
            Some(Geometry::Circle { center, radius }) => {
                *radius = distance(*center, point);
            }
            Some(Geometry::Polygon { .. }) | None => {}
        }
    }

    pub fn handle_release(&mut self, point: (i32, i32)) {
        if self.tool == DrawingTool::Polygon {
            return;
        }
        self.handle_move(point);
        if let Some(geometry) = self.active_geometry.take() {
            self.commit(geometry);
        }
    }

    /// Closes an open polygon. Returns `true` when a polygon was committed.
    pub fn handle_close(&mut self) -> bool {
        match self.active_geometry.take() {
            Some(geometry @ Geometry::Polygon { .. }) => self.commit(geometry),
            other => {
                self.active_geometry = other;
                false
            }
        }
    }

    pub fn cancel(&mut self) {
        self.active_geometry = None;
    }

    pub fn apply(&mut self, command: InputCommand) {
        self.active_geometry = None;
        match command {
            InputCommand::Undo => {
                let _ = self.history.undo();
            }
            InputCommand::Redo => {
                let _ = self.history.redo();
            }
            InputCommand::Clear => self.history.clear(),
        }
    }

    fn object(&self, geometry: Geometry) -> DrawObject {
        DrawObject {
            tool: self.tool,
            style: ObjectStyle::for_tool(self.tool, self.stroke_width),
            geometry,
        }
    }

    fn commit(&mut self, geometry: Geometry) -> bool {
        if geometry.is_degenerate() {
            tracing::debug!(tool = self.tool.mode_id(), "dropping degenerate shape");
            return false;
        }
        let object = self.object(geometry);
        self.history.commit(object);
        true
    }
}

fn should_append_point(last: Option<(i32, i32)>, point: (i32, i32)) -> bool {
    let Some((last_x, last_y)) = last else {
        return true;
    };

    let dx = point.0 as i64 - last_x as i64;
    let dy = point.1 as i64 - last_y as i64;
    dx * dx + dy * dy >= MIN_POINT_DIST_SQ
}

fn distance(a: (i32, i32), b: (i32, i32)) -> i32 {
    let dx = (b.0 - a.0) as f32;
    let dy = (b.1 - a.1) as f32;
    (dx * dx + dy * dy).sqrt().round() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(tool: DrawingTool) -> CanvasInputState {
        CanvasInputState::new(tool, 3)
    }

    #[test]
    fn freedraw_commit_creates_single_history_object() {
        let mut state = input(DrawingTool::Freedraw);

        state.handle_press((10, 10));
        state.handle_move((10, 11));
        state.handle_move((14, 14));
        state.handle_release((18, 18));

        assert_eq!(state.history().undo_len(), 1);
        match &state.history().canvas().objects[0].geometry {
            Geometry::Freehand { points } => assert_eq!(points, &[(10, 10), (14, 14), (18, 18)]),
            other => panic!("unexpected geometry {other:?}"),
        }
    }

    #[test]
    fn circle_radius_follows_pointer() {
        let mut state = input(DrawingTool::Circle);
        state.handle_press((100, 100));
        state.handle_release((103, 104));

        let canvas = state.history().canvas();
        assert_eq!(
            canvas.objects[0].geometry,
            Geometry::Circle {
                center: (100, 100),
                radius: 5
            }
        );
        assert!(canvas.objects[0].style.fill.is_some());
    }

    #[test]
    fn click_without_drag_drops_line() {
        let mut state = input(DrawingTool::Line);
        state.handle_press((5, 5));
        state.handle_release((5, 5));
        assert_eq!(state.history().undo_len(), 0);
        assert!(state.active_object().is_none());
    }

    #[test]
    fn polygon_collects_vertices_until_closed() {
        let mut state = input(DrawingTool::Polygon);
        state.handle_press((0, 0));
        state.handle_release((0, 0));
        state.handle_press((40, 0));
        state.handle_press((40, 0));
        state.handle_press((20, 30));
        assert_eq!(state.history().undo_len(), 0);

        assert!(state.handle_close());
        assert_eq!(
            state.history().canvas().objects[0].geometry,
            Geometry::Polygon {
                vertices: vec![(0, 0), (40, 0), (20, 30)]
            }
        );
        assert!(!state.handle_close());
    }

    #[test]
    fn polygon_with_two_vertices_is_discarded() {
        let mut state = input(DrawingTool::Polygon);
        state.handle_press((0, 0));
        state.handle_press((10, 10));
        assert!(!state.handle_close());
        assert_eq!(state.history().undo_len(), 0);
    }

    #[test]
    fn switching_tool_abandons_active_shape() {
        let mut state = input(DrawingTool::Rectangle);
        state.handle_press((0, 0));
        state.handle_move((20, 20));
        assert!(state.active_object().is_some());

        state.set_tool(DrawingTool::Line);
        assert!(state.active_object().is_none());
    }

    #[test]
    fn toolbar_commands_drive_history() {
        let mut state = input(DrawingTool::Line);
        state.handle_press((0, 0));
        state.handle_release((10, 10));
        assert_eq!(state.history().undo_len(), 1);

        state.apply(InputCommand::Undo);
        assert_eq!(state.history().undo_len(), 0);
        assert_eq!(state.history().redo_len(), 1);

        state.apply(InputCommand::Redo);
        assert_eq!(state.history().undo_len(), 1);

        state.apply(InputCommand::Clear);
        assert!(state.history().canvas().is_empty());
    }
}
