//! Viewer facade: wires the coordinator, scheduler, pool, cache and
//! transforms behind one surface-session API and owns the maintenance
//! timers (idle sweep, surface recovery).

use std::sync::Arc;

use log::info;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::animation::{AnimationRequest, PlayDecision, PlaybackSnapshot, SchedulerEvent};
use crate::config::ViewerConfig;
use crate::context::ViewerContext;
use crate::error::ViewerError;
use crate::event::ViewerEvent;
use crate::loader::{LoadCoordinator, LoadState, ModelEngine};
use crate::memory::{ModelPoolStats, TextureCacheStats};
use crate::model::ModelConfig;
use crate::recovery::{RenderSurface, SurfaceRecoveryMonitor};
use crate::time::{Clock, SystemClock};
use crate::transform::Transform;

/// One interactive viewer surface session
pub struct Viewer<E: ModelEngine> {
    context: Arc<ViewerContext>,
    coordinator: LoadCoordinator<E>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl<E: ModelEngine> Viewer<E> {
    /// Create a viewer on the system clock
    pub fn new(config: ViewerConfig, engine: Arc<E>) -> Result<Self, ViewerError> {
        Self::with_clock(config, engine, Arc::new(SystemClock::new()))
    }

    /// Create a viewer with an injected clock
    pub fn with_clock(
        config: ViewerConfig,
        engine: Arc<E>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ViewerError> {
        config.validate()?;
        let context = ViewerContext::new(config, clock);
        let coordinator = LoadCoordinator::new(Arc::clone(&context), engine);
        Ok(Self {
            context,
            coordinator,
            tasks: Mutex::new(Vec::new()),
        })
    }

    /// Shared session context
    #[inline]
    pub fn context(&self) -> &Arc<ViewerContext> {
        &self.context
    }

    /// Load coordinator for this surface; cloneable for external wiring
    /// such as a standalone recovery monitor
    #[inline]
    pub fn coordinator(&self) -> &LoadCoordinator<E> {
        &self.coordinator
    }

    // --- Loading ---

    /// Load a model and bind it to the surface; see
    /// [`LoadCoordinator::load_model`]
    pub async fn load_model(&self, config: ModelConfig) -> Result<(), ViewerError> {
        self.coordinator.load_model(config).await
    }

    /// Explicitly unload a session. Unloading the bound model clears the
    /// surface binding. Returns `false` if the id was not resident.
    pub fn unload_model(&self, id: &str) -> bool {
        let existed = {
            let mut surface = self.context.surface.lock();
            let mut pool = self.context.pool.lock();
            let mut textures = self.context.textures.lock();
            let mut transforms = self.context.transforms.lock();
            let mut scheduler = self.context.scheduler.lock();

            let was_active = surface.active_id.as_deref() == Some(id);
            let existed = pool.unload(id, &mut textures);
            if existed {
                transforms.remove(id);
                if was_active {
                    surface.active_id = None;
                    surface.active_config = None;
                    surface.load_state = LoadState::Idle;
                    surface.initial_loaded = false;
                    scheduler.unbind();
                }
            }
            existed
        };

        if existed {
            self.context.dispatch(ViewerEvent::ModelUnloaded {
                model_id: id.to_string(),
            });
        }
        existed
    }

    /// Refresh a session's recency (explicit focus)
    pub fn touch_model(&self, id: &str) -> bool {
        self.context.pool.lock().touch(id, self.context.now())
    }

    // --- Animation ---

    /// Submit an animation request against the bound model
    pub fn play_animation(&self, request: AnimationRequest) -> Result<PlayDecision, ViewerError> {
        let now = self.context.now();
        let (decision, model_id) = {
            let mut scheduler = self.context.scheduler.lock();
            let decision = scheduler.play(request.clone(), now)?;
            (decision, scheduler.model_id().map(str::to_string))
        };

        if decision == PlayDecision::Started {
            if let Some(model_id) = model_id {
                self.context.pool.lock().touch(&model_id, now);
                self.context.dispatch(ViewerEvent::AnimationStarted {
                    model_id,
                    kind: request.kind,
                    group: request.group,
                    index: request.index,
                });
            }
        }
        Ok(decision)
    }

    /// Stop the active playback; a no-op when nothing is playing
    pub fn stop_animation(&self) {
        self.context.scheduler.lock().stop(self.context.now());
    }

    /// Freeze the active playback
    pub fn pause_animation(&self) -> bool {
        self.context.scheduler.lock().pause(self.context.now())
    }

    /// Resume a paused playback
    pub fn resume_animation(&self) -> bool {
        self.context.scheduler.lock().resume(self.context.now())
    }

    /// Replace the active expression
    pub fn set_expression(&self, index: usize) -> Result<(), ViewerError> {
        let model_id = {
            let mut scheduler = self.context.scheduler.lock();
            scheduler.set_expression(index)?;
            scheduler.model_id().map(str::to_string)
        };
        if let Some(model_id) = model_id {
            self.context.dispatch(ViewerEvent::ExpressionChanged {
                model_id,
                index: Some(index),
            });
        }
        Ok(())
    }

    /// Clear the active expression
    pub fn clear_expression(&self) {
        let model_id = {
            let mut scheduler = self.context.scheduler.lock();
            scheduler.clear_expression();
            scheduler.model_id().map(str::to_string)
        };
        if let Some(model_id) = model_id {
            self.context.dispatch(ViewerEvent::ExpressionChanged {
                model_id,
                index: None,
            });
        }
    }

    /// Index of the active expression
    pub fn current_expression(&self) -> Option<usize> {
        self.context.scheduler.lock().current_expression()
    }

    /// Advance playback bookkeeping. Called once per animation-frame tick by
    /// the render loop collaborator.
    pub fn update(&self) {
        let now = self.context.now();
        let (model_id, events) = {
            let mut scheduler = self.context.scheduler.lock();
            (
                scheduler.model_id().map(str::to_string),
                scheduler.update(now),
            )
        };

        for event in events {
            match event {
                SchedulerEvent::Started { kind, group, index } => {
                    if let Some(model_id) = &model_id {
                        self.context.pool.lock().touch(model_id, now);
                        self.context.dispatch(ViewerEvent::AnimationStarted {
                            model_id: model_id.clone(),
                            kind,
                            group,
                            index,
                        });
                    }
                }
                SchedulerEvent::Completed { group, index } => {
                    if let Some(model_id) = &model_id {
                        self.context.dispatch(ViewerEvent::AnimationCompleted {
                            model_id: model_id.clone(),
                            group,
                            index,
                        });
                    }
                }
            }
        }
    }

    // --- Transforms ---

    /// Current transform of a session
    pub fn transform(&self, id: &str) -> Option<Transform> {
        self.context.transforms.lock().get(id)
    }

    /// Set a session's position
    pub fn set_position(&self, id: &str, x: f64, y: f64) -> Result<(), ViewerError> {
        self.context.transforms.lock().set_position(id, x, y)
    }

    /// Set a session's scale (silently clamped)
    pub fn set_scale(&self, id: &str, scale: f64) -> Result<(), ViewerError> {
        self.context.transforms.lock().set_scale(id, scale)
    }

    /// Reset a session's transform to the identity
    pub fn reset_transform(&self, id: &str) {
        self.context.transforms.lock().reset(id);
    }

    /// Begin a drag gesture; refreshes the session's recency
    pub fn drag_start(&self, id: &str) -> Result<(), ViewerError> {
        self.context.transforms.lock().drag_start(id)?;
        self.context.pool.lock().touch(id, self.context.now());
        Ok(())
    }

    /// Apply a pointer move to the active drag
    pub fn drag_move(&self, dx: f64, dy: f64) {
        self.context.transforms.lock().drag_move(dx, dy);
    }

    /// Finish the active drag
    pub fn drag_end(&self) -> Option<String> {
        self.context.transforms.lock().drag_end()
    }

    /// Apply one wheel tick to a session's scale
    pub fn wheel_zoom(&self, id: &str, delta: f64) -> Result<(), ViewerError> {
        self.context.transforms.lock().wheel_zoom(id, delta)
    }

    // --- Observability (read-only) ---

    /// Load state of the surface
    pub fn load_state(&self) -> LoadState {
        self.context.load_state()
    }

    /// Failure description of the last failed load
    pub fn last_error(&self) -> Option<String> {
        self.context.last_error()
    }

    /// Model bound to the surface
    pub fn active_model_id(&self) -> Option<String> {
        self.context.active_model_id()
    }

    /// Model pool statistics
    pub fn pool_stats(&self) -> ModelPoolStats {
        self.context.pool_stats()
    }

    /// Texture cache statistics
    pub fn texture_stats(&self) -> TextureCacheStats {
        self.context.texture_stats()
    }

    /// Snapshot of the active playback
    pub fn current_playback(&self) -> Option<PlaybackSnapshot> {
        self.context.current_playback()
    }

    // --- Events ---

    /// Subscribe to viewer events
    pub fn subscribe(&self, subscriber: impl Fn(&ViewerEvent) + Send + Sync + 'static) -> Uuid {
        self.context.events.lock().subscribe(subscriber)
    }

    /// Remove an event subscription
    pub fn unsubscribe(&self, token: Uuid) -> bool {
        self.context.events.lock().unsubscribe(token)
    }

    // --- Maintenance ---

    /// Run one idle sweep now, reclaiming stale non-active sessions
    pub fn run_idle_sweep(&self) {
        sweep_once(&self.context);
    }

    /// Spawn the recurring idle sweep. Must be called within a Tokio
    /// runtime; the timer is cleared on [`Viewer::shutdown`] or drop.
    pub fn spawn_maintenance(&self) {
        let context = Arc::clone(&self.context);
        let interval = self.context.config.idle_sweep_interval();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                sweep_once(&context);
            }
        });
        self.tasks.lock().push(handle);
    }

    /// Spawn the surface recovery monitor over the given surface. Must be
    /// called within a Tokio runtime; the timer is cleared on
    /// [`Viewer::shutdown`] or drop.
    pub fn spawn_recovery_monitor<S: RenderSurface>(&self, surface: Arc<S>) {
        let monitor = SurfaceRecoveryMonitor::new(
            surface,
            self.coordinator.clone(),
            self.context.config.recovery_check_interval(),
        );
        let handle = tokio::spawn(monitor.run());
        self.tasks.lock().push(handle);
    }

    /// Cancel all maintenance timers
    pub fn shutdown(&self) {
        let mut tasks = self.tasks.lock();
        if tasks.is_empty() {
            return;
        }
        info!("viewer: cancelling {} maintenance tasks", tasks.len());
        for task in tasks.drain(..) {
            task.abort();
        }
    }
}

impl<E: ModelEngine> Drop for Viewer<E> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// One idle sweep pass over the pool
fn sweep_once(context: &ViewerContext) {
    let now = context.now();
    let swept = {
        let mut pool = context.pool.lock();
        let mut textures = context.textures.lock();
        pool.sweep_idle(now, context.config.idle_unload_after(), &mut textures)
    };
    if swept.is_empty() {
        return;
    }

    {
        let mut transforms = context.transforms.lock();
        for id in &swept {
            transforms.remove(id);
        }
    }
    for model_id in swept {
        context.dispatch(ViewerEvent::ModelUnloaded { model_id });
    }
}

/// Internal helper for integration with embedders that drive their own
/// render loop: produces the arguments for the opaque `render` call.
pub fn render_args(context: &ViewerContext) -> Option<(String, Transform)> {
    let id = context.active_model_id()?;
    let transform = context.transforms.lock().get(&id)?;
    Some((id, transform))
}
