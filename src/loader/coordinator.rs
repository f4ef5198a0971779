//! Load coordinator: drives the load/switch/error state machine for one
//! viewer surface.
//!
//! Cancellation is generation-based. Every `load_model` call bumps the
//! surface generation and carries its own copy; after each suspension point
//! (fetch, decode) the task compares its generation against the current one
//! and backs out without touching the pool or cache if a newer load has
//! taken over. Commits happen in one critical section with no suspension
//! inside, so interleaved tasks never observe a half-registered model.

use std::sync::Arc;

use log::{debug, info, warn};

use crate::context::ViewerContext;
use crate::error::ViewerError;
use crate::event::ViewerEvent;
use crate::loader::engine::ModelEngine;
use crate::loader::load_state::LoadState;
use crate::memory::texture_cache::scoped_key;
use crate::model::{ModelBundle, ModelConfig, ModelSession};

/// Drives model loads for a surface session
pub struct LoadCoordinator<E: ModelEngine> {
    context: Arc<ViewerContext>,
    engine: Arc<E>,
}

impl<E: ModelEngine> Clone for LoadCoordinator<E> {
    fn clone(&self) -> Self {
        Self {
            context: Arc::clone(&self.context),
            engine: Arc::clone(&self.engine),
        }
    }
}

impl<E: ModelEngine> LoadCoordinator<E> {
    /// Create a coordinator over a shared context and engine
    pub fn new(context: Arc<ViewerContext>, engine: Arc<E>) -> Self {
        Self { context, engine }
    }

    /// Load a model bundle and bind it to the surface.
    ///
    /// A second call while a load is in flight supersedes the first; the
    /// superseded task resolves quietly without mutating shared state.
    /// Requesting a different model while one is bound goes through
    /// `Switching` rather than `Loading` so consumers can tell first paint
    /// from hot swap. A failed load sets `Error` but is never sticky.
    pub async fn load_model(&self, config: ModelConfig) -> Result<(), ViewerError> {
        config.validate()?;
        let my_generation = self.begin(&config);

        let bytes = match self.engine.fetch_bytes(&config.model_path).await {
            Ok(bytes) => bytes,
            Err(err) => return self.fail(my_generation, &config, err),
        };
        if self.is_stale(my_generation) {
            debug!("load of {} superseded after fetch", config.id);
            return Ok(());
        }

        let bundle = match self.engine.decode_bundle(bytes).await {
            Ok(bundle) => bundle,
            Err(err) => return self.fail(my_generation, &config, err),
        };
        if self.is_stale(my_generation) {
            debug!("load of {} superseded after decode", config.id);
            return Ok(());
        }

        self.commit(my_generation, config, bundle)
    }

    /// Re-enter `Loading` for the bound model after the render surface was
    /// recreated. Residency in the pool and cache is untouched; the decoded
    /// data is still valid and only the drawing target changed.
    pub fn recover(&self) {
        let model_id = {
            let mut surface = self.context.surface.lock();
            if !surface.load_state.is_loaded() {
                // Nothing bound, or an in-flight load already owns the
                // state machine and will re-bind on commit.
                return;
            }
            let Some(id) = surface.active_id.clone() else {
                return;
            };
            surface.initial_loaded = false;
            surface.load_state = LoadState::Loading;
            id
        };

        warn!("surface recovery: re-binding model {}", model_id);

        {
            let mut surface = self.context.surface.lock();
            // A load that started in the meantime owns the state machine
            if surface.load_state == LoadState::Loading
                && surface.active_id.as_deref() == Some(model_id.as_str())
            {
                surface.load_state = LoadState::Loaded;
                surface.initial_loaded = true;
            }
        }
        self.context
            .dispatch(ViewerEvent::SurfaceRecovered { at: self.context.now() });
    }

    /// Shared context backing this coordinator
    #[inline]
    pub fn context(&self) -> &Arc<ViewerContext> {
        &self.context
    }

    /// Claim the state machine for a new load and return its generation
    fn begin(&self, config: &ModelConfig) -> u64 {
        let mut surface = self.context.surface.lock();
        surface.generation += 1;
        surface.last_error = None;

        let hot_swap = surface.load_state.is_loaded()
            && surface.active_id.as_deref() != Some(config.id.as_str());
        surface.load_state = if hot_swap {
            LoadState::Switching
        } else {
            LoadState::Loading
        };
        info!(
            "load {} for model {} (generation {})",
            surface.load_state.name(),
            config.id,
            surface.generation
        );
        surface.generation
    }

    fn is_stale(&self, my_generation: u64) -> bool {
        self.context.surface.lock().generation != my_generation
    }

    /// Record a load failure, unless a newer load has taken over
    fn fail(
        &self,
        my_generation: u64,
        config: &ModelConfig,
        err: ViewerError,
    ) -> Result<(), ViewerError> {
        let reason = err.to_string();
        {
            let mut surface = self.context.surface.lock();
            if surface.generation != my_generation {
                debug!("failed load of {} was already superseded", config.id);
                return Ok(());
            }
            surface.load_state = LoadState::Error;
            surface.last_error = Some(reason.clone());
        }
        warn!("load of model {} failed: {}", config.id, reason);
        self.context.dispatch(ViewerEvent::LoadFailed {
            model_id: config.id.clone(),
            reason: reason.clone(),
        });
        Err(ViewerError::load_failure(&config.id, reason))
    }

    /// Bind the decoded bundle: register the session, warm the texture
    /// cache, initialize the transform and hand the catalogs to the
    /// scheduler. No suspension point from here on.
    fn commit(
        &self,
        my_generation: u64,
        config: ModelConfig,
        bundle: ModelBundle,
    ) -> Result<(), ViewerError> {
        let now = self.context.now();
        let evicted;
        {
            let mut surface = self.context.surface.lock();
            if surface.generation != my_generation {
                debug!("decoded load of {} superseded before commit", config.id);
                return Ok(());
            }

            let mut pool = self.context.pool.lock();
            let mut textures = self.context.textures.lock();
            let mut transforms = self.context.transforms.lock();
            let mut scheduler = self.context.scheduler.lock();

            let session = ModelSession::new(config.id.as_str(), bundle, now);
            // The outgoing active session stays pinned through registration,
            // so capacity pressure can never evict the model on screen.
            evicted = pool.register(session, &mut textures);
            for id in &evicted {
                transforms.remove(id);
            }
            pool.set_active(Some(config.id.clone()));

            if let Some(session) = pool.get(&config.id) {
                for texture in &session.bundle.textures {
                    textures.put(
                        scoped_key(&config.id, &texture.name),
                        Arc::clone(&texture.payload),
                        texture.bytes,
                        now,
                    );
                }
            }

            transforms.reset(config.id.as_str());
            scheduler.bind_model(
                config.id.as_str(),
                pool.get(&config.id)
                    .map(|s| s.bundle.animations.clone())
                    .unwrap_or_default(),
                pool.get(&config.id)
                    .map(|s| s.bundle.expressions.clone())
                    .unwrap_or_default(),
                config.auto_idle,
                now,
            );

            surface.active_id = Some(config.id.clone());
            surface.active_config = Some(config.clone());
            surface.load_state = LoadState::Loaded;
            surface.initial_loaded = true;
        }

        info!("model {} loaded and bound", config.id);
        for model_id in evicted {
            self.context.dispatch(ViewerEvent::ModelUnloaded { model_id });
        }
        self.context.dispatch(ViewerEvent::ModelLoaded {
            model_id: config.id,
        });
        Ok(())
    }
}
