//! Priority-preemption scheduler for animation and expression requests.
//!
//! One playback is active at a time. A new request replaces it only when its
//! priority is at least as high; lower-priority requests are dropped without
//! error. Expressions sit outside the priority scheme entirely and may
//! coexist with any playing animation.

use log::debug;

use crate::animation::playback::{ActivePlayback, PlaybackSnapshot, PlaybackStatus};
use crate::animation::request::{AnimationRequest, AnimationType, Priority};
use crate::error::ViewerError;
use crate::model::bundle::{AnimationCatalog, ExpressionCatalog};
use crate::time::Timestamp;

/// Catalog group the auto-idle trigger draws from
pub const IDLE_GROUP: &str = "idle";

/// Outcome of a play request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayDecision {
    /// The request became the active playback
    Started,
    /// A higher-priority playback stays active; the request was dropped
    Dropped,
}

/// State changes surfaced by a scheduler tick
#[derive(Debug, Clone, PartialEq)]
pub enum SchedulerEvent {
    /// A playback began (external request or auto-idle)
    Started {
        kind: AnimationType,
        group: String,
        index: usize,
    },
    /// The active playback ran to completion
    Completed { group: String, index: usize },
}

/// Accepts animation/expression requests for the bound model and tracks the
/// active playback
#[derive(Debug)]
pub struct AnimationScheduler {
    model_id: Option<String>,
    animations: AnimationCatalog,
    expressions: ExpressionCatalog,
    active: Option<ActivePlayback>,
    current_expression: Option<usize>,
    auto_idle_enabled: bool,
    idle_interval: Timestamp,
    last_idle_kick: Timestamp,
    next_idle_index: usize,
    ready: bool,
}

impl AnimationScheduler {
    /// Create a scheduler with no model bound
    pub fn new(auto_idle_enabled: bool, idle_interval: impl Into<Timestamp>) -> Self {
        Self {
            model_id: None,
            animations: AnimationCatalog::new(),
            expressions: ExpressionCatalog::new(),
            active: None,
            current_expression: None,
            auto_idle_enabled,
            idle_interval: idle_interval.into(),
            last_idle_kick: Timestamp::zero(),
            next_idle_index: 0,
            ready: false,
        }
    }

    /// Bind a freshly loaded model's catalogs. This is the readiness signal:
    /// auto-idle may begin from here, and only from here.
    pub fn bind_model(
        &mut self,
        model_id: impl Into<String>,
        animations: AnimationCatalog,
        expressions: ExpressionCatalog,
        auto_idle: Option<bool>,
        now: Timestamp,
    ) {
        self.model_id = Some(model_id.into());
        self.animations = animations;
        self.expressions = expressions;
        self.active = None;
        self.current_expression = None;
        if let Some(auto_idle) = auto_idle {
            self.auto_idle_enabled = auto_idle;
        }
        self.next_idle_index = 0;
        // First auto-idle fires one interval after readiness
        self.last_idle_kick = now;
        self.ready = true;
    }

    /// Drop the bound model and all playback state
    pub fn unbind(&mut self) {
        self.model_id = None;
        self.animations = AnimationCatalog::new();
        self.expressions = ExpressionCatalog::new();
        self.active = None;
        self.current_expression = None;
        self.ready = false;
    }

    /// Model currently bound to the scheduler
    #[inline]
    pub fn model_id(&self) -> Option<&str> {
        self.model_id.as_deref()
    }

    /// Submit an animation request.
    ///
    /// Fails with `AnimationNotFound` when `(group, index)` is not in the
    /// bound catalog, leaving all state unchanged. A request outranked by the
    /// active playback is dropped silently.
    pub fn play(
        &mut self,
        request: AnimationRequest,
        now: Timestamp,
    ) -> Result<PlayDecision, ViewerError> {
        let clip = self
            .animations
            .clip(&request.group, request.index)
            .ok_or_else(|| ViewerError::AnimationNotFound {
                group: request.group.clone(),
                index: request.index,
            })?;
        let clip_duration = clip.duration;

        if let Some(active) = &self.active {
            let occupied = matches!(
                active.status,
                PlaybackStatus::Playing | PlaybackStatus::Paused
            );
            if occupied && active.request.priority > request.priority {
                debug!(
                    "scheduler: dropped {}[{}] (prio {}) behind {}[{}] (prio {})",
                    request.group,
                    request.index,
                    request.priority.level(),
                    active.request.group,
                    active.request.index,
                    active.request.priority.level(),
                );
                return Ok(PlayDecision::Dropped);
            }
            if occupied {
                debug!(
                    "scheduler: preempting {}[{}], fading out over {}ms",
                    active.request.group,
                    active.request.index,
                    active.request.fade_out.as_millis(),
                );
            }
        }

        debug!(
            "scheduler: starting {}[{}] ({})",
            request.group,
            request.index,
            request.kind.label()
        );
        self.active = Some(ActivePlayback::new(request, clip_duration, now));
        Ok(PlayDecision::Started)
    }

    /// Stop the active playback. Always succeeds; a no-op when nothing is
    /// playing. Auto-idle resumes one interval from `now`.
    pub fn stop(&mut self, now: Timestamp) {
        if let Some(mut active) = self.active.take() {
            active.status = PlaybackStatus::Stopped;
            debug!(
                "scheduler: stopped {}[{}]",
                active.request.group, active.request.index
            );
        }
        self.last_idle_kick = now;
    }

    /// Freeze the active playback; returns `false` when nothing was playing
    pub fn pause(&mut self, now: Timestamp) -> bool {
        match self.active.as_mut() {
            Some(active) if active.status.can_pause() => {
                active.pause(now);
                true
            }
            _ => false,
        }
    }

    /// Resume a paused playback; returns `false` when nothing was paused
    pub fn resume(&mut self, now: Timestamp) -> bool {
        match self.active.as_mut() {
            Some(active) if active.status.can_resume() => {
                active.resume(now);
                true
            }
            _ => false,
        }
    }

    /// Replace the active expression immediately. Expressions do not
    /// participate in the priority scheme.
    pub fn set_expression(&mut self, index: usize) -> Result<(), ViewerError> {
        if self.expressions.get(index).is_none() {
            return Err(ViewerError::ExpressionNotFound {
                index,
                catalog_size: self.expressions.len(),
            });
        }
        self.current_expression = Some(index);
        Ok(())
    }

    /// Clear the active expression
    pub fn clear_expression(&mut self) {
        self.current_expression = None;
    }

    /// Index of the active expression
    #[inline]
    pub fn current_expression(&self) -> Option<usize> {
        self.current_expression
    }

    /// Snapshot of the active playback for dashboards
    pub fn current_playback(&self, now: Timestamp) -> Option<PlaybackSnapshot> {
        self.active.as_ref().map(|active| PlaybackSnapshot {
            id: active.id,
            request: active.request.clone(),
            status: active.status,
            started_at: active.started_at,
            played_count: active.played_count,
            progress: active.progress(now),
        })
    }

    /// Advance playback to `now`: handle iteration completion, repeats, and
    /// the auto-idle trigger. Returns the state changes of this tick.
    pub fn update(&mut self, now: Timestamp) -> Vec<SchedulerEvent> {
        let mut events = Vec::new();

        let mut finished = false;
        if let Some(active) = self.active.as_mut() {
            if active.status.is_playing() && active.iteration_finished(now) {
                active.played_count += 1;
                let more = active.request.looped
                    || active.played_count < active.request.repeat_count.max(1);
                if more {
                    active.restart_iteration(now);
                } else {
                    finished = true;
                }
            }
        }

        if finished {
            if let Some(done) = self.active.take() {
                debug!(
                    "scheduler: completed {}[{}] after {} plays",
                    done.request.group, done.request.index, done.played_count
                );
                events.push(SchedulerEvent::Completed {
                    group: done.request.group.clone(),
                    index: done.request.index,
                });
                // A completed clip may be replaced by idle immediately
                if let Some(started) = self.try_start_idle(now) {
                    events.push(started);
                }
            }
        } else if self.active.is_none() && now.since(self.last_idle_kick) >= self.idle_interval {
            if let Some(started) = self.try_start_idle(now) {
                events.push(started);
            } else {
                self.last_idle_kick = now;
            }
        }

        events
    }

    /// Self-trigger an idle animation at the lowest priority, cycling through
    /// the idle group so repeated kicks vary the clip.
    fn try_start_idle(&mut self, now: Timestamp) -> Option<SchedulerEvent> {
        if !(self.auto_idle_enabled && self.ready && self.active.is_none()) {
            return None;
        }
        let group_len = self.animations.group_len(IDLE_GROUP);
        if group_len == 0 {
            return None;
        }

        let index = self.next_idle_index % group_len;
        self.next_idle_index = self.next_idle_index.wrapping_add(1);
        self.last_idle_kick = now;

        let request = AnimationRequest::new(AnimationType::Idle, IDLE_GROUP, index)
            .with_priority(Priority::IDLE);
        match self.play(request, now) {
            Ok(PlayDecision::Started) => Some(SchedulerEvent::Started {
                kind: AnimationType::Idle,
                group: IDLE_GROUP.to_string(),
                index,
            }),
            _ => None,
        }
    }
}
