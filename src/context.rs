//! Shared surface-session context.
//!
//! The pool, cache, transforms and scheduler are explicitly constructed here
//! and handed by reference to the coordinator and facade rather than living
//! as process-wide globals. Locks follow a fixed order (surface, pool,
//! textures, transforms, scheduler, events) and are never held across a
//! suspension point, which keeps multi-step mutations atomic with respect to
//! the other cooperative tasks.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::animation::{AnimationScheduler, PlaybackSnapshot};
use crate::config::ViewerConfig;
use crate::event::{EventDispatcher, ViewerEvent};
use crate::loader::LoadState;
use crate::memory::{ModelPool, ModelPoolStats, TextureCache, TextureCacheStats};
use crate::model::ModelConfig;
use crate::time::{Clock, Timestamp};
use crate::transform::TransformController;

/// Surface binding and load state machine bookkeeping
#[derive(Debug)]
pub(crate) struct SurfaceBinding {
    pub load_state: LoadState,
    pub active_id: Option<String>,
    pub active_config: Option<ModelConfig>,
    /// Monotonic load generation; stale tasks compare against it at every
    /// suspension point and abort without mutating shared state
    pub generation: u64,
    /// Whether the first model paint happened for this binding
    pub initial_loaded: bool,
    pub last_error: Option<String>,
}

impl Default for SurfaceBinding {
    fn default() -> Self {
        Self {
            load_state: LoadState::Idle,
            active_id: None,
            active_config: None,
            generation: 0,
            initial_loaded: false,
            last_error: None,
        }
    }
}

/// Owns every mutable piece of one viewer surface session
pub struct ViewerContext {
    pub(crate) config: ViewerConfig,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) surface: Mutex<SurfaceBinding>,
    pub(crate) pool: Mutex<ModelPool>,
    pub(crate) textures: Mutex<TextureCache>,
    pub(crate) transforms: Mutex<TransformController>,
    pub(crate) scheduler: Mutex<AnimationScheduler>,
    pub(crate) events: Mutex<EventDispatcher>,
}

impl ViewerContext {
    /// Build a context from a validated configuration and an injected clock
    pub fn new(config: ViewerConfig, clock: Arc<dyn Clock>) -> Arc<Self> {
        Arc::new(Self {
            pool: Mutex::new(ModelPool::new(config.max_loaded_models)),
            textures: Mutex::new(TextureCache::new(config.texture_cache_bytes)),
            transforms: Mutex::new(TransformController::new()),
            scheduler: Mutex::new(AnimationScheduler::new(
                config.enable_auto_idle_animation,
                config.idle_animation_interval(),
            )),
            surface: Mutex::new(SurfaceBinding::default()),
            events: Mutex::new(EventDispatcher::new()),
            clock,
            config,
        })
    }

    /// Current time on the session timeline
    #[inline]
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Deliver an event to subscribers. Takes only the events lock; callers
    /// must release every other context lock first.
    pub(crate) fn dispatch(&self, event: ViewerEvent) {
        self.events.lock().dispatch(&event);
    }

    // --- Observability surface (read-only to consumers) ---

    /// Load state of the surface
    pub fn load_state(&self) -> LoadState {
        self.surface.lock().load_state
    }

    /// Failure description captured by the last failed load
    pub fn last_error(&self) -> Option<String> {
        self.surface.lock().last_error.clone()
    }

    /// Model currently bound to the surface
    pub fn active_model_id(&self) -> Option<String> {
        self.surface.lock().active_id.clone()
    }

    /// Model pool statistics
    pub fn pool_stats(&self) -> ModelPoolStats {
        self.pool.lock().stats()
    }

    /// Texture cache statistics
    pub fn texture_stats(&self) -> TextureCacheStats {
        self.textures.lock().stats()
    }

    /// Snapshot of the active playback
    pub fn current_playback(&self) -> Option<PlaybackSnapshot> {
        self.scheduler.lock().current_playback(self.now())
    }
}

impl std::fmt::Debug for ViewerContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewerContext")
            .field("config", &self.config)
            .field("load_state", &self.load_state())
            .finish()
    }
}
