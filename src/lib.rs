//! Avatar Runtime
//!
//! Runtime core for interactive viewers of rigged 2D character models:
//! asynchronous bundle loading with generation-based cancellation, a
//! priority-preemption animation scheduler, per-model transform state, and a
//! two-tier resource pool (model sessions + texture cache) with LRU eviction
//! and idle-timeout reclamation. Rendering, rigging math and bundle parsing
//! stay behind the [`ModelEngine`] and [`RenderSurface`] seams.

pub mod animation;
pub mod config;
pub mod context;
pub mod error;
pub mod event;
pub mod loader;
pub mod memory;
pub mod model;
pub mod recovery;
pub mod time;
pub mod transform;
pub mod viewer;

// Re-export common types for convenience
pub use animation::{
    ActivePlayback, AnimationRequest, AnimationScheduler, AnimationType, PlayDecision,
    PlaybackSnapshot, PlaybackStatus, Priority, SchedulerEvent, IDLE_GROUP,
};
pub use config::ViewerConfig;
pub use context::ViewerContext;
pub use error::ViewerError;
pub use event::{EventDispatcher, ViewerEvent};
pub use loader::{LoadCoordinator, LoadState, ModelEngine};
pub use memory::{ModelPool, ModelPoolStats, TextureCache, TextureCacheStats};
pub use model::{
    AnimationCatalog, AnimationClip, ExpressionCatalog, ExpressionDef, ModelBundle, ModelConfig,
    ModelSession, ResourceRef, TextureResource,
};
pub use recovery::{check_surface, RenderSurface, SurfaceRecoveryMonitor};
pub use time::{Clock, ManualClock, SystemClock, Timestamp};
pub use transform::{Transform, TransformController, MAX_SCALE, MIN_SCALE, WHEEL_SCALE_STEP};
pub use viewer::Viewer;

/// Viewer runtime result type
pub type Result<T> = core::result::Result<T, ViewerError>;
