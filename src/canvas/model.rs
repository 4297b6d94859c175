use crate::options::DrawingTool;

pub const CANVAS_SIZE: u32 = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgba(0, 0, 0, 255);
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);
    /// rgba(255, 165, 0, 0.3)
    pub const FILL_ORANGE: Color = Color::rgba(255, 165, 0, 77);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

pub const STROKE_COLOR: Color = Color::BLACK;
pub const BACKGROUND_COLOR: Color = Color::WHITE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrokeStyle {
    pub width: u32,
    pub color: Color,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            width: crate::options::DEFAULT_STROKE_WIDTH,
            color: STROKE_COLOR,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillStyle {
    pub color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ObjectStyle {
    pub stroke: StrokeStyle,
    pub fill: Option<FillStyle>,
}

impl ObjectStyle {
    /// Style the drawing surface applies to a new object of `tool`.
    pub fn for_tool(tool: DrawingTool, width: u32) -> Self {
        Self {
            stroke: StrokeStyle {
                width: crate::options::clamp_stroke_width(width),
                color: STROKE_COLOR,
            },
            fill: tool.is_filled().then_some(FillStyle {
                color: Color::FILL_ORANGE,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Geometry {
    Freehand { points: Vec<(i32, i32)> },
    Line { start: (i32, i32), end: (i32, i32) },
    Rect { start: (i32, i32), end: (i32, i32) },
    Circle { center: (i32, i32), radius: i32 },
    Polygon { vertices: Vec<(i32, i32)> },
}

impl Geometry {
    /// Zero-size shapes are never committed.
    pub fn is_degenerate(&self) -> bool {
        match self {
            Geometry::Freehand { points } => points.is_empty(),
            Geometry::Line { start, end } => start == end,
            Geometry::Rect { start, end } => start.0 == end.0 || start.1 == end.1,
            Geometry::Circle { radius, .. } => *radius <= 0,
            Geometry::Polygon { vertices } => vertices.len() < 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawObject {
    pub tool: DrawingTool,
    pub style: ObjectStyle,
    pub geometry: Geometry,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CanvasModel {
    pub objects: Vec<DrawObject>,
}

impl CanvasModel {
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filled_tools_get_translucent_orange() {
        let rect = ObjectStyle::for_tool(DrawingTool::Rectangle, 4);
        assert_eq!(rect.fill.map(|f| f.color), Some(Color::FILL_ORANGE));
        assert_eq!(rect.stroke.color, Color::BLACK);

        let line = ObjectStyle::for_tool(DrawingTool::Line, 4);
        assert!(line.fill.is_none());
    }

    #[test]
    fn degenerate_shapes_are_detected() {
        assert!(Geometry::Line {
            start: (3, 3),
            end: (3, 3)
        }
        .is_degenerate());
        assert!(Geometry::Circle {
            center: (10, 10),
            radius: 0
        }
        .is_degenerate());
        assert!(Geometry::Polygon {
            vertices: vec![(0, 0), (4, 4)]
        }
        .is_degenerate());
        assert!(!Geometry::Rect {
            start: (0, 0),
            end: (4, 9)
        }
        .is_degenerate());
    }
}
