//! Undo/redo for the session store.

use maskkit_core::{AnnotationObject, AppEvent, EditEvent};

use super::SessionStore;

impl SessionStore {
    /// Restores the previous snapshot. Returns false when there is none.
    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(objects) => {
                self.restore(objects, true);
                true
            }
            None => false,
        }
    }

    /// Restores the next snapshot. Returns false when there is none.
    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(objects) => {
                self.restore(objects, false);
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn restore(&mut self, objects: Vec<AnnotationObject>, undo: bool) {
        self.objects = objects;
        self.revision += 1;
        self.unsaved = true;

        let selection_lost = self
            .selected
            .as_ref()
            .is_some_and(|id| !self.objects.iter().any(|o| &o.id == id));
        if selection_lost {
            self.selected = None;
            self.publish(AppEvent::Edit(EditEvent::SelectionChanged { id: None }));
        }

        tracing::debug!(
            "{} to history index {:?}",
            if undo { "Undo" } else { "Redo" },
            self.history.index()
        );
        self.publish(AppEvent::Edit(EditEvent::Restored {
            undo,
            count: self.objects.len(),
        }));
    }
}
