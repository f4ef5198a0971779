//! Per-model transform state: position and scale with gesture handling.
//!
//! Drag moves are computed from a snapshot plus the cumulative delta rather
//! than incrementally from the last move, so floating-point drift cannot
//! accumulate across many small pointer events.

use std::collections::HashMap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::ViewerError;

/// Smallest allowed scale
pub const MIN_SCALE: f64 = 0.1;
/// Largest allowed scale
pub const MAX_SCALE: f64 = 5.0;
/// Scale change per discrete wheel tick
pub const WHEEL_SCALE_STEP: f64 = 0.1;

/// Position and scale of one model on the surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale: 1.0,
        }
    }
}

/// Snapshot taken at drag start plus the running pointer delta
#[derive(Debug, Clone)]
struct DragState {
    model_id: String,
    origin: Transform,
    dx: f64,
    dy: f64,
}

/// Owns per-model transforms and applies gesture deltas with clamping
#[derive(Debug, Default)]
pub struct TransformController {
    transforms: HashMap<String, Transform>,
    drag: Option<DragState>,
}

impl TransformController {
    /// Create an empty controller
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Initialize (or reset) a model's transform to the identity
    pub fn reset(&mut self, id: impl Into<String>) {
        self.transforms.insert(id.into(), Transform::default());
    }

    /// Drop a model's transform state; ends any drag it owned
    pub fn remove(&mut self, id: &str) {
        self.transforms.remove(id);
        if self
            .drag
            .as_ref()
            .is_some_and(|drag| drag.model_id == id)
        {
            self.drag = None;
        }
    }

    /// Current transform for a model
    #[inline]
    pub fn get(&self, id: &str) -> Option<Transform> {
        self.transforms.get(id).copied()
    }

    /// Set a model's position
    pub fn set_position(&mut self, id: &str, x: f64, y: f64) -> Result<(), ViewerError> {
        let transform = self.entry_mut(id)?;
        transform.x = x;
        transform.y = y;
        Ok(())
    }

    /// Set a model's scale. Out-of-range values are silently clamped into
    /// [`MIN_SCALE`, `MAX_SCALE`], never rejected.
    pub fn set_scale(&mut self, id: &str, scale: f64) -> Result<(), ViewerError> {
        let transform = self.entry_mut(id)?;
        transform.scale = clamp_scale(scale);
        Ok(())
    }

    /// Snapshot the current transform and begin a drag gesture
    pub fn drag_start(&mut self, id: &str) -> Result<(), ViewerError> {
        let origin = self.get(id).ok_or_else(|| ViewerError::ModelNotFound {
            id: id.to_string(),
        })?;
        self.drag = Some(DragState {
            model_id: id.to_string(),
            origin,
            dx: 0.0,
            dy: 0.0,
        });
        Ok(())
    }

    /// Apply a pointer move. Position is recomputed as snapshot plus the
    /// cumulative delta. No-op when no drag is active.
    pub fn drag_move(&mut self, dx: f64, dy: f64) {
        let Some(drag) = self.drag.as_mut() else {
            return;
        };
        drag.dx += dx;
        drag.dy += dy;

        let x = drag.origin.x + drag.dx;
        let y = drag.origin.y + drag.dy;
        let model_id = drag.model_id.clone();
        if let Some(transform) = self.transforms.get_mut(&model_id) {
            transform.x = x;
            transform.y = y;
        }
    }

    /// Finish the active drag; returns the dragged model id, if any
    pub fn drag_end(&mut self) -> Option<String> {
        let drag = self.drag.take()?;
        debug!(
            "drag end: {} moved by ({:.1}, {:.1})",
            drag.model_id, drag.dx, drag.dy
        );
        Some(drag.model_id)
    }

    /// Whether a drag gesture is in progress
    #[inline]
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Apply one discrete wheel tick. Scale moves by a fixed step per tick
    /// for predictable zoom increments; `delta` follows the platform's
    /// native wheel sign convention (negative means toward the screen,
    /// i.e. zoom in).
    pub fn wheel_zoom(&mut self, id: &str, delta: f64) -> Result<(), ViewerError> {
        if delta == 0.0 {
            return Ok(());
        }
        let step = if delta < 0.0 {
            WHEEL_SCALE_STEP
        } else {
            -WHEEL_SCALE_STEP
        };
        let transform = self.entry_mut(id)?;
        transform.scale = clamp_scale(transform.scale + step);
        Ok(())
    }

    fn entry_mut(&mut self, id: &str) -> Result<&mut Transform, ViewerError> {
        self.transforms
            .get_mut(id)
            .ok_or_else(|| ViewerError::ModelNotFound {
                id: id.to_string(),
            })
    }
}

#[inline]
fn clamp_scale(scale: f64) -> f64 {
    scale.clamp(MIN_SCALE, MAX_SCALE)
}
