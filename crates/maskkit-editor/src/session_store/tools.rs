//! Tool, class and tolerance settings for the session store.

use maskkit_core::constants::{clamp_epsilon, clamp_opacity};
use maskkit_core::{AppEvent, LassoMode, SessionEvent, ToolMode};

use super::SessionStore;

impl SessionStore {
    pub fn set_tool_mode(&mut self, tool: ToolMode) {
        if self.tool_mode != tool {
            self.tool_mode = tool;
            self.publish_tool();
        }
    }

    /// Sets the lasso mode. It only matters while the lasso tool is active.
    pub fn set_lasso_mode(&mut self, lasso: LassoMode) {
        if self.lasso_mode != lasso {
            self.lasso_mode = lasso;
            self.publish_tool();
        }
    }

    /// Sets the class given to new objects. Out-of-range indices are ignored.
    pub fn set_current_class(&mut self, class_id: usize) -> bool {
        if class_id >= self.classes().len() {
            tracing::warn!("Ignoring unknown class index {}", class_id);
            return false;
        }
        self.current_class = class_id;
        true
    }

    /// Sets the simplification tolerance, clamped to `[0, 10]`.
    pub fn set_simplification_epsilon(&mut self, epsilon: f64) {
        self.epsilon = clamp_epsilon(epsilon);
    }

    /// Sets the mask opacity, clamped to `[0, 1]`.
    pub fn set_mask_opacity(&mut self, opacity: f64) {
        self.opacity = clamp_opacity(opacity);
    }

    fn publish_tool(&self) {
        tracing::debug!("Tool {} / lasso {}", self.tool_mode, self.lasso_mode);
        self.publish(AppEvent::Session(SessionEvent::ToolChanged {
            tool: self.tool_mode,
            lasso: self.lasso_mode,
        }));
    }
}
