use crate::canvas::buffer::PixelBuffer;

/// Remembers the last canvas snapshot a generation was triggered for.
#[derive(Debug, Clone, Default)]
pub struct CanvasStateTracker {
    previous: Option<PixelBuffer>,
    dirty: bool,
}

impl CanvasStateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compares `current` against the stored snapshot sample by sample.
    ///
    /// Any difference (or no stored snapshot yet) stores a copy of `current`
    /// and marks the tracker dirty. `None` means the surface has not reported
    /// a buffer yet and leaves the tracker untouched.
    pub fn check_for_change(&mut self, current: Option<&PixelBuffer>) -> bool {
        let Some(current) = current else {
            self.dirty = false;
            return false;
        };
        let changed = self.previous.as_ref() != Some(current);
        if changed {
            self.previous = Some(current.clone());
        }
        self.dirty = changed;
        changed
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Consumes the dirty flag so a change triggers at most once.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn previous(&self) -> Option<&PixelBuffer> {
        self.previous.as_ref()
    }
}
