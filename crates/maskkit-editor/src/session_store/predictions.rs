//! Issuing and reconciling oracle requests for the session store.

use maskkit_communication::PredictResponse;
use maskkit_core::constants::clamp_epsilon;
use maskkit_core::{
    AnnotationObject, AppEvent, EditEvent, NoticeEvent, ObjectId, OracleError, PredictionEvent,
    SessionError,
};

use super::SessionStore;
use crate::orchestrator::{ApplyOutcome, BatchItem, PredictionRequest, PredictionTicket};

impl SessionStore {
    /// Validates a request against the active image and issues its ticket.
    pub fn begin_prediction(
        &mut self,
        request: PredictionRequest,
        epsilon: f64,
    ) -> Result<PredictionTicket, SessionError> {
        let image = self.active_image()?;
        if image.id != request.image_id() {
            return Err(SessionError::ImageNotActive {
                image_id: request.image_id().to_string(),
            });
        }

        let sequence = match &request {
            PredictionRequest::Points { object_id, .. } => {
                self.index_of(object_id)?;
                Some(self.sequences.next(object_id))
            }
            PredictionRequest::Text { class_index, .. } => {
                if *class_index >= self.classes().len() {
                    return Err(SessionError::UnknownClass {
                        class_id: *class_index,
                    });
                }
                None
            }
            PredictionRequest::Box { .. } | PredictionRequest::Auto { .. } => None,
        };

        self.pending_predictions += 1;
        let ticket = PredictionTicket {
            generation: self.generation,
            sequence,
            epsilon: clamp_epsilon(epsilon),
            request,
        };
        self.publish(AppEvent::Prediction(PredictionEvent::Requested {
            image_id: ticket.request.image_id().to_string(),
            object_id: ticket.request.object_id().map(ToString::to_string),
            sequence,
        }));
        Ok(ticket)
    }

    /// Applies a single-object answer.
    ///
    /// A box answer creates and selects a new object of the current class. A
    /// points answer replaces the target's clicks, polygon and score, unless a
    /// newer request for that object was issued meanwhile.
    pub fn complete_prediction(
        &mut self,
        ticket: &PredictionTicket,
        response: &PredictResponse,
    ) -> ApplyOutcome {
        if let Some(outcome) = self.settle(ticket) {
            return outcome;
        }
        let Some(size) = self.image_size() else {
            return ApplyOutcome::ImageChanged;
        };
        let polygon = response.polygon.points.clone();
        let score = Some(response.score);

        match &ticket.request {
            PredictionRequest::Box { .. } => {
                let class_id = self.current_class;
                let object = AnnotationObject::from_polygon(
                    ObjectId::generate(),
                    class_id,
                    self.class_name(class_id),
                    polygon,
                    size,
                    score,
                );
                let id = object.id.clone();
                self.checkpoint();
                self.objects.push(object);
                self.selected = Some(id.clone());
                tracing::info!(
                    "Created {} in {:.0} ms (score {:.3})",
                    id,
                    response.inference_time_ms,
                    response.score
                );
                self.publish(AppEvent::Edit(EditEvent::Added {
                    ids: vec![id.to_string()],
                }));
                self.publish(AppEvent::Edit(EditEvent::SelectionChanged {
                    id: Some(id.to_string()),
                }));
                self.applied(ticket, vec![id])
            }
            PredictionRequest::Points {
                object_id,
                positives,
                negatives,
                ..
            } => {
                let current = ticket
                    .sequence
                    .is_some_and(|seq| self.sequences.is_current(object_id, seq));
                if !current {
                    return self.discarded(ticket, "newer request in flight");
                }
                let Ok(index) = self.index_of(object_id) else {
                    return self.discarded(ticket, "object removed");
                };

                self.checkpoint();
                let object = &mut self.objects[index];
                object.points_pos = positives.clone();
                object.points_neg = negatives.clone();
                object.set_polygon(polygon, size);
                object.score = score;
                self.publish(AppEvent::Edit(EditEvent::Updated {
                    id: object_id.to_string(),
                }));
                self.applied(ticket, vec![object_id.clone()])
            }
            PredictionRequest::Text { .. } | PredictionRequest::Auto { .. } => {
                self.discarded(ticket, "batch answer on single path")
            }
        }
    }

    /// Applies a text or auto-annotation batch as one mutation.
    pub fn complete_batch(
        &mut self,
        ticket: &PredictionTicket,
        items: Vec<BatchItem>,
    ) -> ApplyOutcome {
        if let Some(outcome) = self.settle(ticket) {
            return outcome;
        }
        let Some(size) = self.image_size() else {
            return ApplyOutcome::ImageChanged;
        };
        if items.is_empty() {
            tracing::info!("Batch on {} found nothing", ticket.request.image_id());
            return self.applied(ticket, Vec::new());
        }

        let objects: Vec<AnnotationObject> = items
            .into_iter()
            .map(|item| {
                AnnotationObject::from_polygon(
                    ObjectId::generate(),
                    item.class_index,
                    self.class_name(item.class_index),
                    item.polygon,
                    size,
                    Some(item.score),
                )
            })
            .collect();
        let ids: Vec<ObjectId> = objects.iter().map(|o| o.id.clone()).collect();

        self.checkpoint();
        self.objects.extend(objects);
        tracing::info!(
            "Batch on {} created {} objects",
            ticket.request.image_id(),
            ids.len()
        );
        self.publish(AppEvent::Edit(EditEvent::Added {
            ids: ids.iter().map(ToString::to_string).collect(),
        }));
        self.applied(ticket, ids)
    }

    /// Records a failed request. Objects, history and selection are untouched.
    /// Failures of a superseded refinement are dropped without a notice.
    pub fn fail_prediction(&mut self, ticket: &PredictionTicket, error: &OracleError) {
        tracing::error!(
            "Prediction on {} failed: {}",
            ticket.request.image_id(),
            error
        );
        if ticket.generation == self.generation {
            self.pending_predictions = self.pending_predictions.saturating_sub(1);
            if let (Some(object_id), Some(seq)) = (ticket.request.object_id(), ticket.sequence) {
                if !self.sequences.is_current(object_id, seq) {
                    tracing::debug!("Ignoring failure of superseded request #{}", seq);
                    return;
                }
            }
        }
        self.events.notify(NoticeEvent::OracleFailure {
            message: error.to_string(),
        });
    }

    /// Clears the ticket from the pending count; returns an outcome when the
    /// image changed since it was issued.
    fn settle(&mut self, ticket: &PredictionTicket) -> Option<ApplyOutcome> {
        if ticket.generation != self.generation {
            tracing::debug!(
                "Dropping answer for {}: image changed",
                ticket.request.image_id()
            );
            self.publish(AppEvent::Prediction(PredictionEvent::Discarded {
                image_id: ticket.request.image_id().to_string(),
                reason: "image changed".to_string(),
            }));
            return Some(ApplyOutcome::ImageChanged);
        }
        self.pending_predictions = self.pending_predictions.saturating_sub(1);
        None
    }

    fn applied(&self, ticket: &PredictionTicket, ids: Vec<ObjectId>) -> ApplyOutcome {
        self.publish(AppEvent::Prediction(PredictionEvent::Applied {
            image_id: ticket.request.image_id().to_string(),
            objects: ids.len(),
        }));
        ApplyOutcome::Applied { ids }
    }

    fn discarded(&self, ticket: &PredictionTicket, reason: &str) -> ApplyOutcome {
        tracing::debug!(
            "Discarding answer #{:?} for {}: {}",
            ticket.sequence,
            ticket.request.image_id(),
            reason
        );
        self.publish(AppEvent::Prediction(PredictionEvent::Discarded {
            image_id: ticket.request.image_id().to_string(),
            reason: reason.to_string(),
        }));
        ApplyOutcome::StaleDiscarded
    }
}
