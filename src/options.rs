use serde::{Deserialize, Serialize};

pub const MIN_STROKE_WIDTH: u32 = 1;
pub const MAX_STROKE_WIDTH: u32 = 25;
pub const DEFAULT_STROKE_WIDTH: u32 = 3;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum DrawingTool {
    #[default]
    Freedraw,
    Line,
    Rectangle,
    Circle,
    Polygon,
}

impl DrawingTool {
    pub const ALL: [DrawingTool; 5] = [
        DrawingTool::Freedraw,
        DrawingTool::Line,
        DrawingTool::Rectangle,
        DrawingTool::Circle,
        DrawingTool::Polygon,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DrawingTool::Freedraw => "Freedraw",
            DrawingTool::Line => "Line",
            DrawingTool::Rectangle => "Rectangle",
            DrawingTool::Circle => "Circle",
            DrawingTool::Polygon => "Polygon",
        }
    }

    /// Drawing-mode identifier understood by the canvas.
    pub fn mode_id(self) -> &'static str {
        match self {
            DrawingTool::Freedraw => "freedraw",
            DrawingTool::Line => "line",
            DrawingTool::Rectangle => "rect",
            DrawingTool::Circle => "circle",
            DrawingTool::Polygon => "polygon",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.label() == label)
    }

    /// Shapes that receive the translucent fill when committed.
    pub fn is_filled(self) -> bool {
        matches!(
            self,
            DrawingTool::Rectangle | DrawingTool::Circle | DrawingTool::Polygon
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Quality {
    Low,
    #[default]
    Medium,
    High,
    Ultra,
}

impl Quality {
    pub const ALL: [Quality; 4] = [Quality::Low, Quality::Medium, Quality::High, Quality::Ultra];

    pub fn label(self) -> &'static str {
        match self {
            Quality::Low => "Low (Fastest)",
            Quality::Medium => "Medium (Fast)",
            Quality::High => "High (Slow)",
            Quality::Ultra => "Ultra (Slowest)",
        }
    }

    /// Number of diffusion steps requested from the synthesis model.
    pub fn steps(self) -> u32 {
        match self {
            Quality::Low => 5,
            Quality::Medium => 7,
            Quality::High => 12,
            Quality::Ultra => 20,
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|q| q.label() == label)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum ArtStyle {
    #[default]
    Painting,
    Photo,
    Cartoon,
}

impl ArtStyle {
    pub const ALL: [ArtStyle; 3] = [ArtStyle::Painting, ArtStyle::Photo, ArtStyle::Cartoon];

    pub fn label(self) -> &'static str {
        match self {
            ArtStyle::Painting => "Painting",
            ArtStyle::Photo => "Photo",
            ArtStyle::Cartoon => "Cartoon",
        }
    }

    pub fn prompt_prefix(self) -> &'static str {
        match self {
            ArtStyle::Painting => "a detailed oil painting of a",
            ArtStyle::Photo => "a photo of a",
            ArtStyle::Cartoon => "a cartoon drawing of a",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.label() == label)
    }
}

/// Options selected in the sidebar, snapshotted when a generation starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationParams {
    pub tool: DrawingTool,
    pub stroke_width: u32,
    pub quality: Quality,
    pub style: ArtStyle,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            tool: DrawingTool::default(),
            stroke_width: DEFAULT_STROKE_WIDTH,
            quality: Quality::default(),
            style: ArtStyle::default(),
        }
    }
}

impl GenerationParams {
    pub fn new(tool: DrawingTool, stroke_width: u32, quality: Quality, style: ArtStyle) -> Self {
        Self {
            tool,
            stroke_width: clamp_stroke_width(stroke_width),
            quality,
            style,
        }
    }

    pub fn steps(&self) -> u32 {
        self.quality.steps()
    }

    pub fn style_prefix(&self) -> &'static str {
        self.style.prompt_prefix()
    }
}

pub fn clamp_stroke_width(width: u32) -> u32 {
    width.clamp(MIN_STROKE_WIDTH, MAX_STROKE_WIDTH)
}
