use crate::canvas::buffer::PixelBuffer;
use crate::canvas::model::{CanvasModel, Color, DrawObject, Geometry, CANVAS_SIZE};

/// Rasterises the committed objects onto a fresh white canvas.
pub fn render_canvas(canvas: &CanvasModel) -> PixelBuffer {
    render_canvas_sized(canvas, CANVAS_SIZE, CANVAS_SIZE)
}

pub fn render_canvas_sized(canvas: &CanvasModel, width: u32, height: u32) -> PixelBuffer {
    let mut buffer = PixelBuffer::blank(width, height);
    for object in &canvas.objects {
        render_object(object, &mut buffer);
    }
    buffer
}

pub fn render_object(object: &DrawObject, buffer: &mut PixelBuffer) {
    let (width, height) = buffer.size();
    let pixels = buffer.as_rgba_mut();
    let mut target = Target {
        pixels,
        width,
        height,
    };

    // Fill first so the outline stays crisp on top of it.
    if let Some(fill) = object.style.fill {
        match &object.geometry {
            Geometry::Rect { start, end } => fill_rect(&mut target, *start, *end, fill.color),
            Geometry::Circle { center, radius } => {
                fill_circle(&mut target, *center, *radius, fill.color)
            }
            Geometry::Polygon { vertices } => fill_polygon(&mut target, vertices, fill.color),
            Geometry::Freehand { .. } | Geometry::Line { .. } => {}
        }
    }

    let color = object.style.stroke.color;
    let stroke_width = object.style.stroke.width.max(1);
    match &object.geometry {
        Geometry::Freehand { points } => draw_polyline(&mut target, points, color, stroke_width),
        Geometry::Line { start, end } => draw_segment(&mut target, *start, *end, color, stroke_width),
        Geometry::Rect { start, end } => {
            let (x0, x1) = (start.0.min(end.0), start.0.max(end.0));
            let (y0, y1) = (start.1.min(end.1), start.1.max(end.1));
            let corners = [(x0, y0), (x1, y0), (x1, y1), (x0, y1), (x0, y0)];
            draw_polyline(&mut target, &corners, color, stroke_width);
        }
        Geometry::Circle { center, radius } => {
            draw_circle(&mut target, *center, *radius, color, stroke_width)
        }
        Geometry::Polygon { vertices } => {
            let mut closed = vertices.clone();
            if let Some(first) = vertices.first() {
                closed.push(*first);
            }
            draw_polyline(&mut target, &closed, color, stroke_width);
        }
    }
}

struct Target<'a> {
    pixels: &'a mut [u8],
    width: u32,
    height: u32,
}

impl Target<'_> {
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        let idx = ((y as u32 * self.width + x as u32) * 4) as usize;
        (idx + 3 < self.pixels.len()).then_some(idx)
    }

    fn set(&mut self, x: i32, y: i32, color: Color) {
        if let Some(idx) = self.index(x, y) {
            self.pixels[idx..idx + 4].copy_from_slice(&color.to_array());
        }
    }

    /// Source-over blend; the canvas itself stays opaque.
    fn blend(&mut self, x: i32, y: i32, color: Color) {
        let Some(idx) = self.index(x, y) else {
            return;
        };
        let a = color.a as u32;
        for (offset, src) in [color.r, color.g, color.b].into_iter().enumerate() {
            let dst = self.pixels[idx + offset] as u32;
            self.pixels[idx + offset] = ((src as u32 * a + dst * (255 - a) + 127) / 255) as u8;
        }
        let dst_a = self.pixels[idx + 3] as u32;
        self.pixels[idx + 3] = (a + dst_a * (255 - a) / 255).min(255) as u8;
    }
}

fn draw_polyline(target: &mut Target, points: &[(i32, i32)], color: Color, stroke_width: u32) {
    match points {
        [] => {}
        [single] => draw_brush(target, *single, color, stroke_width),
        _ => {
            for segment in points.windows(2) {
                draw_segment(target, segment[0], segment[1], color, stroke_width);
            }
        }
    }
}

fn draw_segment(
    target: &mut Target,
    start: (i32, i32),
    end: (i32, i32),
    color: Color,
    stroke_width: u32,
) {
    let dx = (end.0 - start.0) as f32;
    let dy = (end.1 - start.1) as f32;
    let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as i32;
    for step in 0..=steps {
        let t = step as f32 / steps as f32;
        let x = (start.0 as f32 + dx * t).round() as i32;
        let y = (start.1 as f32 + dy * t).round() as i32;
        draw_brush(target, (x, y), color, stroke_width);
    }
}

fn draw_circle(
    target: &mut Target,
    center: (i32, i32),
    radius: i32,
    color: Color,
    stroke_width: u32,
) {
    let r = radius.max(1) as f32;
    let circumference = std::f32::consts::TAU * r;
    let steps = circumference.max(12.0) as usize;
    for step in 0..=steps {
        let t = (step as f32 / steps as f32) * std::f32::consts::TAU;
        let x = (center.0 as f32 + r * t.cos()).round() as i32;
        let y = (center.1 as f32 + r * t.sin()).round() as i32;
        draw_brush(target, (x, y), color, stroke_width);
    }
}

/// Stamps a disc exactly `stroke_width` pixels across. Even widths are
/// centred half a pixel up and left of `center`.
fn draw_brush(target: &mut Target, center: (i32, i32), color: Color, stroke_width: u32) {
    let radius = stroke_width.max(1) as f32 / 2.0;
    let offset = if stroke_width % 2 == 0 { 0.5 } else { 0.0 };
    let (cx, cy) = (center.0 as f32 - offset, center.1 as f32 - offset);
    let reach = radius.ceil() as i32;
    for y in (center.1 - reach)..=(center.1 + reach) {
        for x in (center.0 - reach)..=(center.0 + reach) {
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            if dx * dx + dy * dy <= radius * radius {
                target.set(x, y, color);
            }
        }
    }
}

fn fill_rect(target: &mut Target, start: (i32, i32), end: (i32, i32), color: Color) {
    let (x0, x1) = (start.0.min(end.0), start.0.max(end.0));
    let (y0, y1) = (start.1.min(end.1), start.1.max(end.1));
    for y in y0.max(0)..=y1.min(target.height as i32 - 1) {
        for x in x0.max(0)..=x1.min(target.width as i32 - 1) {
            target.blend(x, y, color);
        }
    }
}

fn fill_circle(target: &mut Target, center: (i32, i32), radius: i32, color: Color) {
    let r2 = radius * radius;
    for y in (center.1 - radius).max(0)..=(center.1 + radius).min(target.height as i32 - 1) {
        for x in (center.0 - radius).max(0)..=(center.0 + radius).min(target.width as i32 - 1) {
            let dx = x - center.0;
            let dy = y - center.1;
            if dx * dx + dy * dy <= r2 {
                target.blend(x, y, color);
            }
        }
    }
}

/// Even-odd scan over the polygon's bounding box, sampling pixel centres.
fn fill_polygon(target: &mut Target, vertices: &[(i32, i32)], color: Color) {
    if vertices.len() < 3 {
        return;
    }
    let min_x = vertices.iter().map(|v| v.0).min().unwrap_or(0).max(0);
    let max_x = vertices
        .iter()
        .map(|v| v.0)
        .max()
        .unwrap_or(0)
        .min(target.width as i32 - 1);
    let min_y = vertices.iter().map(|v| v.1).min().unwrap_or(0).max(0);
    let max_y = vertices
        .iter()
        .map(|v| v.1)
        .max()
        .unwrap_or(0)
        .min(target.height as i32 - 1);

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            if point_in_polygon((x as f32 + 0.5, y as f32 + 0.5), vertices) {
                target.blend(x, y, color);
            }
        }
    }
}

fn point_in_polygon(point: (f32, f32), vertices: &[(i32, i32)]) -> bool {
    let (px, py) = point;
    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let (xi, yi) = (vertices[i].0 as f32, vertices[i].1 as f32);
        let (xj, yj) = (vertices[j].0 as f32, vertices[j].1 as f32);
        if (yi > py) != (yj > py) && px < (xj - xi) * (py - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::model::ObjectStyle;
    use crate::options::DrawingTool;

    fn object(tool: DrawingTool, geometry: Geometry) -> DrawObject {
        DrawObject {
            tool,
            style: ObjectStyle::for_tool(tool, 3),
            geometry,
        }
    }

    fn render_one(object: DrawObject) -> PixelBuffer {
        render_canvas_sized(
            &CanvasModel {
                objects: vec![object],
            },
            64,
            64,
        )
    }

    #[test]
    fn each_stroke_width_paints_its_own_thickness() {
        for width in 1..=6u32 {
            let buffer = render_one(DrawObject {
                tool: DrawingTool::Line,
                style: ObjectStyle::for_tool(DrawingTool::Line, width),
                geometry: Geometry::Line {
                    start: (8, 32),
                    end: (56, 32),
                },
            });
            let painted = (0..64)
                .filter(|y| buffer.pixel(32, *y) == Some([0, 0, 0, 255]))
                .count();
            assert_eq!(painted, width as usize, "stroke width {width}");
        }
    }

    #[test]
    fn empty_canvas_renders_white() {
        let buffer = render_canvas(&CanvasModel::default());
        assert_eq!(buffer.size(), (CANVAS_SIZE, CANVAS_SIZE));
        assert!(buffer.as_rgba().iter().all(|b| *b == 255));
    }

    #[test]
    fn line_paints_black_along_its_path() {
        let buffer = render_one(object(
            DrawingTool::Line,
            Geometry::Line {
                start: (4, 10),
                end: (40, 10),
            },
        ));
        assert_eq!(buffer.pixel(20, 10), Some([0, 0, 0, 255]));
        assert_eq!(buffer.pixel(20, 30), Some([255, 255, 255, 255]));
    }

    #[test]
    fn rectangle_fill_is_translucent_orange() {
        let buffer = render_one(object(
            DrawingTool::Rectangle,
            Geometry::Rect {
                start: (10, 10),
                end: (50, 50),
            },
        ));
        let inside = buffer.pixel(30, 30).expect("inside");
        assert_eq!(inside[0], 255);
        assert!(inside[1] > 165 && inside[1] < 255);
        assert!(inside[2] < 255);
        assert_eq!(inside[3], 255);
        assert_eq!(buffer.pixel(10, 30), Some([0, 0, 0, 255]));
    }

    #[test]
    fn polygon_fill_uses_even_odd_interior() {
        let buffer = render_one(object(
            DrawingTool::Polygon,
            Geometry::Polygon {
                vertices: vec![(5, 5), (60, 5), (5, 60)],
            },
        ));
        assert_ne!(buffer.pixel(15, 15), Some([255, 255, 255, 255]));
        assert_eq!(buffer.pixel(55, 55), Some([255, 255, 255, 255]));
    }

    #[test]
    fn shapes_outside_canvas_are_clipped() {
        let buffer = render_one(object(
            DrawingTool::Circle,
            Geometry::Circle {
                center: (-10, -10),
                radius: 30,
            },
        ));
        assert_eq!(buffer.as_rgba().len(), 64 * 64 * 4);
        assert_ne!(buffer.pixel(0, 0), Some([255, 255, 255, 255]));
    }
}
