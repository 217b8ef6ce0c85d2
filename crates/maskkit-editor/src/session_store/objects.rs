//! Object operations (add, update, delete, select) for the session store.

use maskkit_core::{AnnotationObject, AppEvent, EditEvent, ObjectId, SessionError};

use super::SessionStore;

impl SessionStore {
    /// Adds one object.
    pub fn add_object(&mut self, object: AnnotationObject) -> Result<ObjectId, SessionError> {
        let mut ids = self.add_objects(vec![object])?;
        ids.pop().ok_or(SessionError::NoActiveImage)
    }

    /// Adds several objects as a single mutation. An empty batch changes nothing.
    pub fn add_objects(
        &mut self,
        objects: Vec<AnnotationObject>,
    ) -> Result<Vec<ObjectId>, SessionError> {
        self.active_image()?;
        if objects.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<ObjectId> = objects.iter().map(|o| o.id.clone()).collect();
        self.checkpoint();
        self.objects.extend(objects);
        tracing::debug!("Added {} objects", ids.len());
        self.publish(AppEvent::Edit(EditEvent::Added {
            ids: ids.iter().map(ToString::to_string).collect(),
        }));
        Ok(ids)
    }

    /// Replaces the object with the same id. The normalized polygon and the
    /// bbox are recomputed from `polygon`.
    pub fn update_object(&mut self, mut updated: AnnotationObject) -> Result<(), SessionError> {
        let size = self.active_image()?.size();
        let index = self.index_of(&updated.id)?;
        let polygon = std::mem::take(&mut updated.polygon);
        updated.set_polygon(polygon, size);
        self.checkpoint();
        let id = updated.id.to_string();
        self.objects[index] = updated;
        self.publish(AppEvent::Edit(EditEvent::Updated { id }));
        Ok(())
    }

    /// Removes an object, clearing the selection if it pointed at it.
    pub fn delete_object(&mut self, id: &ObjectId) -> Result<AnnotationObject, SessionError> {
        let index = self.index_of(id)?;
        self.checkpoint();
        let removed = self.objects.remove(index);
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
            self.publish(AppEvent::Edit(EditEvent::SelectionChanged { id: None }));
        }
        tracing::debug!("Deleted object {}", id);
        self.publish(AppEvent::Edit(EditEvent::Deleted { id: id.to_string() }));
        Ok(removed)
    }

    /// Removes the selected object, if any.
    pub fn delete_selected(&mut self) -> Option<AnnotationObject> {
        let id = self.selected.clone()?;
        self.delete_object(&id).ok()
    }

    /// Reassigns an object to another class of the session.
    pub fn set_object_class(
        &mut self,
        id: &ObjectId,
        class_id: usize,
    ) -> Result<(), SessionError> {
        if class_id >= self.classes().len() {
            return Err(SessionError::UnknownClass { class_id });
        }
        let index = self.index_of(id)?;
        if self.objects[index].class_id == class_id {
            return Ok(());
        }

        let class_name = self.class_name(class_id);
        self.checkpoint();
        let object = &mut self.objects[index];
        object.class_id = class_id;
        object.class_name = class_name;
        self.publish(AppEvent::Edit(EditEvent::Updated { id: id.to_string() }));
        Ok(())
    }

    /// Changes the selection. Selecting is not an undoable mutation.
    pub fn select_object(&mut self, id: Option<ObjectId>) -> Result<(), SessionError> {
        if let Some(id) = &id {
            self.index_of(id)?;
        }
        if self.selected == id {
            return Ok(());
        }
        self.publish(AppEvent::Edit(EditEvent::SelectionChanged {
            id: id.as_ref().map(ToString::to_string),
        }));
        self.selected = id;
        Ok(())
    }

    pub(crate) fn index_of(&self, id: &ObjectId) -> Result<usize, SessionError> {
        self.objects
            .iter()
            .position(|o| &o.id == id)
            .ok_or_else(|| SessionError::ObjectNotFound {
                object_id: id.to_string(),
            })
    }
}
