//! Gesture effects and lasso edits for the session store.

use maskkit_core::{
    AppEvent, EditEvent, Error, LassoMode, NoticeEvent, ObjectId, Point, SessionError,
};

use super::SessionStore;
use crate::gesture::{Effect, GestureContext};
use crate::lasso;
use crate::orchestrator::PredictionRequest;

impl SessionStore {
    /// Everything the gesture machine needs to interpret the next event.
    pub fn gesture_context(&self) -> GestureContext<'_> {
        GestureContext {
            viewport: &self.viewport,
            tool: self.tool_mode,
            lasso: self.lasso_mode,
            selected: self.selected.as_ref(),
            image_size: self.image_size(),
            objects: &self.objects,
        }
    }

    /// Applies a gesture effect.
    ///
    /// Synchronous effects are applied in place. Effects that need the oracle
    /// come back as a request for the prediction orchestrator.
    pub fn apply_effect(&mut self, effect: Effect) -> Option<PredictionRequest> {
        match effect {
            Effect::None => None,
            Effect::Pan { dx, dy } => {
                self.viewport.pan_by(dx, dy);
                None
            }
            Effect::Select(id) => {
                if let Err(e) = self.select_object(id) {
                    tracing::warn!("Selection rejected: {}", e);
                }
                None
            }
            Effect::CreateObject(bbox) => {
                let image_id = self.current_image_id()?.to_string();
                Some(PredictionRequest::Box { image_id, bbox })
            }
            Effect::AddPoint {
                id,
                point,
                positive,
            } => match self.points_request(&id, point, positive) {
                Ok(request) => Some(request),
                Err(e) => {
                    tracing::warn!("Point refinement rejected: {}", e);
                    None
                }
            },
            Effect::EditObject { id, stroke, mode } => {
                // Failures are already logged and published.
                let _ = self.apply_lasso(&id, &stroke, mode);
                None
            }
        }
    }

    /// Builds a refinement request with the object's clicks plus one more.
    pub fn points_request(
        &self,
        id: &ObjectId,
        point: Point,
        positive: bool,
    ) -> Result<PredictionRequest, SessionError> {
        let image_id = self.active_image()?.id.clone();
        let object = self.object(id).ok_or_else(|| SessionError::ObjectNotFound {
            object_id: id.to_string(),
        })?;

        let mut positives = object.points_pos.clone();
        let mut negatives = object.points_neg.clone();
        if positive {
            positives.push(point);
        } else {
            negatives.push(point);
        }

        Ok(PredictionRequest::Points {
            image_id,
            object_id: id.clone(),
            bbox: object.bbox,
            positives,
            negatives,
        })
    }

    /// Unions a stroke into, or cuts it out of, an object's polygon.
    ///
    /// On failure the object keeps its polygon, nothing is pushed to the
    /// history and a geometry notice is published.
    pub fn apply_lasso(
        &mut self,
        id: &ObjectId,
        stroke: &[Point],
        mode: LassoMode,
    ) -> Result<(), Error> {
        let size = self.active_image()?.size();
        let index = self.index_of(id)?;

        let mut edited = self.objects[index].clone();
        match lasso::apply_lasso(self.combiner.as_ref(), &mut edited, stroke, mode, size) {
            Ok(()) => {
                self.checkpoint();
                self.objects[index] = edited;
                tracing::info!("Lasso {} applied to {}", mode, id);
                self.publish(AppEvent::Edit(EditEvent::Updated { id: id.to_string() }));
                Ok(())
            }
            Err(err) => {
                tracing::warn!("Lasso {} on {} failed: {}", mode, id, err);
                self.events.notify(NoticeEvent::GeometryFailure {
                    object_id: id.to_string(),
                    message: err.to_string(),
                });
                Err(err.into())
            }
        }
    }
}
