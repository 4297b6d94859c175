pub mod buffer;
pub mod history;
pub mod input;
pub mod model;
pub mod render;
pub mod tracker;

pub use buffer::PixelBuffer;
pub use input::{CanvasInputState, InputCommand};
pub use model::{CanvasModel, CANVAS_SIZE};
pub use render::render_canvas;
pub use tracker::CanvasStateTracker;
