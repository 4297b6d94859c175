use drawing2ai::canvas::{
    render_canvas, CanvasInputState, CanvasStateTracker, InputCommand, PixelBuffer, CANVAS_SIZE,
};
use drawing2ai::options::DrawingTool;

fn stroke(input: &mut CanvasInputState, from: (i32, i32), to: (i32, i32)) {
    input.handle_press(from);
    input.handle_move(((from.0 + to.0) / 2, (from.1 + to.1) / 2));
    input.handle_release(to);
}

#[test]
fn first_observation_is_a_change() {
    let mut tracker = CanvasStateTracker::new();
    let blank = PixelBuffer::blank(CANVAS_SIZE, CANVAS_SIZE);
    assert!(tracker.check_for_change(Some(&blank)));
    assert!(tracker.is_dirty());
}

#[test]
fn identical_buffer_is_not_a_change() {
    let mut tracker = CanvasStateTracker::new();
    let blank = PixelBuffer::blank(CANVAS_SIZE, CANVAS_SIZE);
    tracker.check_for_change(Some(&blank));
    assert!(!tracker.check_for_change(Some(&blank.clone())));
    assert!(!tracker.is_dirty());
}

#[test]
fn missing_surface_reports_no_change_and_keeps_snapshot() {
    let mut tracker = CanvasStateTracker::new();
    assert!(!tracker.check_for_change(None));
    assert!(tracker.previous().is_none());

    let blank = PixelBuffer::blank(CANVAS_SIZE, CANVAS_SIZE);
    tracker.check_for_change(Some(&blank));
    assert!(!tracker.check_for_change(None));
    assert_eq!(tracker.previous(), Some(&blank));
}

#[test]
fn drawing_then_undo_is_detected_each_time() {
    let mut input = CanvasInputState::new(DrawingTool::Line, 3);
    let mut tracker = CanvasStateTracker::new();

    assert!(tracker.check_for_change(Some(&render_canvas(&input.history().canvas()))));

    stroke(&mut input, (40, 40), (400, 400));
    let drawn = render_canvas(&input.history().canvas());
    assert!(tracker.check_for_change(Some(&drawn)));
    assert!(!tracker.check_for_change(Some(&drawn)));

    input.apply(InputCommand::Undo);
    let undone = render_canvas(&input.history().canvas());
    assert_eq!(undone, PixelBuffer::blank(CANVAS_SIZE, CANVAS_SIZE));
    assert!(tracker.check_for_change(Some(&undone)));

    input.apply(InputCommand::Redo);
    assert!(tracker.check_for_change(Some(&render_canvas(&input.history().canvas()))));
}

#[test]
fn rendered_shapes_use_black_stroke_on_white() {
    let mut input = CanvasInputState::new(DrawingTool::Rectangle, 5);
    stroke(&mut input, (100, 100), (300, 200));
    let buffer = render_canvas(&input.history().canvas());

    assert_eq!(buffer.pixel(100, 150), Some([0, 0, 0, 255]));
    assert_eq!(buffer.pixel(10, 10), Some([255, 255, 255, 255]));
    let inside = buffer.pixel(200, 150).unwrap();
    assert_ne!(inside, [255, 255, 255, 255], "rectangle interior is tinted");
}

#[test]
fn polygon_commits_only_when_closed() {
    let mut input = CanvasInputState::new(DrawingTool::Polygon, 3);
    input.handle_press((50, 50));
    input.handle_release((50, 50));
    input.handle_press((250, 60));
    input.handle_press((150, 250));
    assert_eq!(input.history().undo_len(), 0);
    assert!(input.active_object().is_some());

    assert!(input.handle_close());
    assert_eq!(input.history().undo_len(), 1);
    assert!(input.active_object().is_none());
    assert!(!input.handle_close());
}
