//! Integration tests for the model pool and texture cache working together

mod common;

use std::time::Duration;

use avatar_runtime::{ModelPool, ModelSession, TextureCache, Timestamp};
use common::test_bundle;

fn session(id: &str, at_millis: u64) -> ModelSession {
    ModelSession::new(id, test_bundle(4096), Timestamp::from_millis(at_millis))
}

#[test]
fn test_capacity_two_eviction_scenario() {
    let mut pool = ModelPool::new(2);
    let mut textures = TextureCache::new(1 << 20);

    pool.register(session("x", 1000), &mut textures);
    pool.register(session("y", 2000), &mut textures);
    pool.set_active(Some("y".to_string()));
    assert_eq!(pool.stats().loaded_count, 2);

    // x has the older stamp and is not surface-active, so it goes
    let evicted = pool.register(session("z", 3000), &mut textures);
    assert_eq!(evicted, vec!["x".to_string()]);
    assert!(!pool.contains("x"));
    assert!(pool.contains("y"));
    assert!(pool.contains("z"));
    assert_eq!(pool.stats().loaded_count, 2);
}

#[test]
fn test_idle_unload_scenario() {
    let mut pool = ModelPool::new(3);
    let mut textures = TextureCache::new(1 << 20);

    pool.register(session("x", 0), &mut textures);

    // 301 s later with no touch, the sweep reclaims the session
    let swept = pool.sweep_idle(
        Timestamp::from_millis(301_000),
        Duration::from_secs(300),
        &mut textures,
    );
    assert_eq!(swept, vec!["x".to_string()]);
    assert_eq!(pool.stats().loaded_count, 0);
}

#[test]
fn test_unload_drops_texture_scope() {
    let mut pool = ModelPool::new(3);
    let mut textures = TextureCache::new(1 << 20);

    pool.register(session("haru", 0), &mut textures);
    textures.put("haru_body", vec![0u8; 64].into(), 64, Timestamp::zero());
    textures.put("haru_face", vec![0u8; 64].into(), 64, Timestamp::zero());
    textures.put("rin_body", vec![0u8; 64].into(), 64, Timestamp::zero());

    assert!(pool.unload("haru", &mut textures));

    // No key scoped to the unloaded model survives
    assert!(!textures.contains("haru_body"));
    assert!(!textures.contains("haru_face"));
    assert!(textures.contains("rin_body"));
    assert_eq!(textures.stats().entry_count, 1);
}

#[test]
fn test_pool_accounts_memory_and_texture_bytes() {
    let mut pool = ModelPool::new(3);
    let mut textures = TextureCache::new(1 << 20);

    pool.register(session("x", 0), &mut textures);
    pool.register(session("y", 1), &mut textures);

    let stats = pool.stats();
    assert_eq!(stats.loaded_count, 2);
    assert_eq!(stats.total_memory_bytes, 2 * 4096);
    // Each test bundle carries one 64-byte texture
    assert_eq!(stats.total_texture_bytes, 2 * 64);
}
