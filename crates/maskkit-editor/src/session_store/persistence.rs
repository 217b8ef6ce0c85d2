//! Save and load bookkeeping for the session store.
//!
//! The store never talks to a label store itself. The caller takes a ticket,
//! performs the I/O without holding the store, then hands the result back.

use maskkit_communication::{LoadOutcome, SaveOutcome};
use maskkit_core::{
    AnnotationObject, AppEvent, EditEvent, ImageInfo, LabelError, NoticeEvent,
    PersistenceEvent, SessionError,
};

use super::SessionStore;

/// Snapshot of what is being saved.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveTicket {
    pub image: ImageInfo,
    pub objects: Vec<AnnotationObject>,
    pub revision: u64,
    pub generation: u64,
}

/// Image whose labels are being loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadTicket {
    pub image: ImageInfo,
    pub classes: Vec<String>,
    pub generation: u64,
}

impl SessionStore {
    /// Snapshots the active image's objects for saving.
    pub fn begin_save(&mut self) -> Result<SaveTicket, SessionError> {
        let image = self.active_image()?.clone();
        self.saving = true;
        Ok(SaveTicket {
            image,
            objects: self.objects.clone(),
            revision: self.revision,
            generation: self.generation,
        })
    }

    /// Settles a save.
    ///
    /// The unsaved flag is cleared only on success and only when nothing was
    /// edited after the snapshot was taken. Failures leave it set and publish
    /// a notice.
    pub fn finish_save(
        &mut self,
        ticket: &SaveTicket,
        result: &Result<SaveOutcome, LabelError>,
    ) -> bool {
        let same_image = ticket.generation == self.generation;
        if same_image {
            self.saving = false;
        }

        match result {
            Ok(outcome) => {
                if let Some(image) = self
                    .session
                    .as_mut()
                    .and_then(|s| s.image_mut(&ticket.image.id))
                {
                    image.has_labels = true;
                }
                if same_image && ticket.revision == self.revision {
                    self.unsaved = false;
                }
                tracing::info!(
                    "Saved {} objects for {} to {}",
                    outcome.objects_saved,
                    ticket.image.id,
                    outcome.filepath
                );
                self.publish(AppEvent::Persistence(PersistenceEvent::Saved {
                    image_id: ticket.image.id.clone(),
                    filepath: outcome.filepath.clone(),
                    objects: outcome.objects_saved,
                }));
                true
            }
            Err(err) => {
                tracing::error!("Save for {} failed: {}", ticket.image.id, err);
                self.events.notify(NoticeEvent::PersistenceFailure {
                    message: err.to_string(),
                });
                false
            }
        }
    }

    pub fn begin_load(&self) -> Result<LoadTicket, SessionError> {
        Ok(LoadTicket {
            image: self.active_image()?.clone(),
            classes: self.classes().to_vec(),
            generation: self.generation,
        })
    }

    /// Replaces the objects with loaded labels.
    ///
    /// Loading is not an edit. The loaded collection becomes the new
    /// baseline: history and per-object sequences are cleared and the unsaved
    /// flag is reset. Results for an image that is no longer active are
    /// ignored.
    pub fn finish_load(
        &mut self,
        ticket: &LoadTicket,
        result: Result<LoadOutcome, LabelError>,
    ) -> bool {
        if ticket.generation != self.generation {
            tracing::debug!("Ignoring labels for inactive image {}", ticket.image.id);
            return false;
        }

        match result {
            Ok(outcome) => {
                let size = ticket.image.size();
                let count = outcome.objects.len();
                self.objects = outcome
                    .objects
                    .into_iter()
                    .map(|mut object| {
                        if object.polygon_normalized.len() != object.polygon.len() {
                            let polygon = std::mem::take(&mut object.polygon);
                            object.set_polygon(polygon, size);
                        }
                        object
                    })
                    .collect();
                self.history.clear();
                self.sequences.clear();
                if self.selected.take().is_some() {
                    self.publish(AppEvent::Edit(EditEvent::SelectionChanged { id: None }));
                }
                self.unsaved = false;
                tracing::info!("Loaded {} objects for {}", count, ticket.image.id);
                self.publish(AppEvent::Persistence(PersistenceEvent::Loaded {
                    image_id: ticket.image.id.clone(),
                    exists: outcome.exists,
                    objects: count,
                }));
                true
            }
            Err(err) => {
                tracing::error!("Load for {} failed: {}", ticket.image.id, err);
                self.events.notify(NoticeEvent::PersistenceFailure {
                    message: err.to_string(),
                });
                false
            }
        }
    }
}
