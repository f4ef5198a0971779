//! Shared fixtures for integration tests
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Notify;

use avatar_runtime::{
    AnimationCatalog, AnimationClip, ExpressionCatalog, ExpressionDef, ModelBundle, ModelConfig,
    ModelEngine, ResourceRef, TextureResource, ViewerError, IDLE_GROUP,
};

/// Initialize test logging once; later calls are no-ops
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Build a decoded bundle with two idle clips (3 s each), one tap clip (1 s),
/// two expressions and a single 64-byte texture.
pub fn test_bundle(memory_bytes: usize) -> ModelBundle {
    let mut animations = AnimationCatalog::new();
    animations.add_clip(IDLE_GROUP, AnimationClip::new("idle_01", 3000u64));
    animations.add_clip(IDLE_GROUP, AnimationClip::new("idle_02", 3000u64));
    animations.add_clip("tap", AnimationClip::new("tap_body", 1000u64));

    let mut expressions = ExpressionCatalog::new();
    expressions.add(ExpressionDef::new("smile"));
    expressions.add(ExpressionDef::new("frown"));

    ModelBundle {
        geometry: ResourceRef::new(),
        rig: ResourceRef::new(),
        textures: vec![TextureResource::new("body", vec![0u8; 64])],
        animations,
        expressions,
        memory_bytes,
    }
}

/// Model config whose path round-trips through the fake engine
pub fn model_config(id: &str) -> ModelConfig {
    ModelConfig::new(id, format!("models/{}.bundle", id))
}

/// Engine double: every path decodes to [`test_bundle`] unless marked as
/// failing, and fetches can be gated so tests control task interleaving at
/// the suspension points.
#[derive(Default)]
pub struct FakeEngine {
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    failing_fetches: Mutex<HashSet<String>>,
    failing_decodes: Mutex<HashSet<String>>,
}

impl FakeEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make fetches for `path` block until the returned gate is notified
    pub fn gate_fetch(&self, path: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates.lock().insert(path.to_string(), Arc::clone(&gate));
        gate
    }

    /// Make fetches for `path` fail
    pub fn fail_fetch(&self, path: &str) {
        self.failing_fetches.lock().insert(path.to_string());
    }

    /// Make decodes for `path` fail
    pub fn fail_decode(&self, path: &str) {
        self.failing_decodes.lock().insert(path.to_string());
    }
}

/// Render surface double with switchable health predicates
#[derive(Default)]
pub struct FakeSurface {
    pub detached: std::sync::atomic::AtomicBool,
    pub zero_extent: std::sync::atomic::AtomicBool,
    pub context_lost: std::sync::atomic::AtomicBool,
    pub recreated: std::sync::atomic::AtomicU32,
}

impl avatar_runtime::RenderSurface for FakeSurface {
    fn is_attached(&self) -> bool {
        !self.detached.load(std::sync::atomic::Ordering::SeqCst)
    }

    fn extent(&self) -> (u32, u32) {
        if self.zero_extent.load(std::sync::atomic::Ordering::SeqCst) {
            (0, 0)
        } else {
            (1280, 720)
        }
    }

    fn context_valid(&self) -> bool {
        !self.context_lost.load(std::sync::atomic::Ordering::SeqCst)
    }

    fn recreate(&self) {
        self.recreated
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.detached
            .store(false, std::sync::atomic::Ordering::SeqCst);
        self.zero_extent
            .store(false, std::sync::atomic::Ordering::SeqCst);
        self.context_lost
            .store(false, std::sync::atomic::Ordering::SeqCst);
    }
}

/// Record every event the viewer emits
pub fn collect_events<E: ModelEngine>(
    viewer: &avatar_runtime::Viewer<E>,
) -> Arc<Mutex<Vec<avatar_runtime::ViewerEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    viewer.subscribe(move |event| sink.lock().push(event.clone()));
    events
}

impl ModelEngine for FakeEngine {
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, ViewerError> {
        let gate = self.gates.lock().get(url).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.failing_fetches.lock().contains(url) {
            return Err(ViewerError::IoError {
                reason: format!("fetch refused for {}", url),
            });
        }
        Ok(url.as_bytes().to_vec())
    }

    async fn decode_bundle(&self, bytes: Vec<u8>) -> Result<ModelBundle, ViewerError> {
        let url = String::from_utf8(bytes).map_err(|_| ViewerError::SerializationError {
            reason: "bundle bytes were not a fake url".to_string(),
        })?;
        if self.failing_decodes.lock().contains(&url) {
            return Err(ViewerError::SerializationError {
                reason: format!("undecodable bundle at {}", url),
            });
        }
        Ok(test_bundle(4096))
    }
}
