use crate::canvas::model::{CanvasModel, DrawObject};

/// Committed shapes plus a cursor; everything past the cursor is redoable.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CanvasHistory {
    objects: Vec<DrawObject>,
    visible: usize,
    revision: u64,
}

impl CanvasHistory {
    /// Adds a shape and forgets anything that was undone.
    pub fn commit(&mut self, object: DrawObject) {
        self.objects.truncate(self.visible);
        self.objects.push(object);
        self.visible = self.objects.len();
        self.bump();
    }

    pub fn undo(&mut self) -> Option<DrawObject> {
        self.visible = self.visible.checked_sub(1)?;
        self.bump();
        self.objects.get(self.visible).cloned()
    }

    pub fn redo(&mut self) -> Option<DrawObject> {
        let object = self.objects.get(self.visible).cloned()?;
        self.visible += 1;
        self.bump();
        Some(object)
    }

    /// Drops every object; not undoable.
    pub fn clear(&mut self) {
        if self.objects.is_empty() {
            return;
        }
        self.objects.clear();
        self.visible = 0;
        self.bump();
    }

    pub fn undo_len(&self) -> usize {
        self.visible
    }

    pub fn redo_len(&self) -> usize {
        self.objects.len() - self.visible
    }

    /// Changes whenever the visible canvas changes.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn canvas(&self) -> CanvasModel {
        CanvasModel {
            objects: self.objects[..self.visible].to_vec(),
        }
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}
