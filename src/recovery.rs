//! Surface health monitoring and recovery.
//!
//! The hosting environment can reload the page or window that owns the
//! drawing surface without killing the process, leaving a detached or
//! zero-sized surface behind. The monitor polls the surface on a fixed
//! interval (and once right after mount), disposes and recreates it when a
//! predicate fails, and asks the coordinator to re-bind the active model.
//! Corruption never surfaces to callers as an error.

use std::sync::Arc;
use std::time::Duration;

use log::warn;

use crate::error::ViewerError;
use crate::loader::{LoadCoordinator, ModelEngine};

/// The drawing target owned by the embedding layer
pub trait RenderSurface: Send + Sync + 'static {
    /// Whether the surface element is still attached to its parent
    fn is_attached(&self) -> bool;

    /// Rendered extent in physical pixels
    fn extent(&self) -> (u32, u32);

    /// Whether a drawable context can still be obtained
    fn context_valid(&self) -> bool;

    /// Dispose the corrupted surface (releasing any lost-context handles)
    /// and attach a fresh one in its place
    fn recreate(&self);
}

/// Evaluate the health predicates against a surface
pub fn check_surface<S: RenderSurface>(surface: &S) -> Result<(), ViewerError> {
    if !surface.is_attached() {
        return Err(ViewerError::SurfaceCorrupted {
            reason: "surface detached from parent".to_string(),
        });
    }
    let (width, height) = surface.extent();
    if width == 0 || height == 0 {
        return Err(ViewerError::SurfaceCorrupted {
            reason: format!("surface has zero extent ({}x{})", width, height),
        });
    }
    if !surface.context_valid() {
        return Err(ViewerError::SurfaceCorrupted {
            reason: "drawing context lost".to_string(),
        });
    }
    Ok(())
}

/// Periodically inspects the render surface and repairs it in place
pub struct SurfaceRecoveryMonitor<S: RenderSurface, E: ModelEngine> {
    surface: Arc<S>,
    coordinator: LoadCoordinator<E>,
    interval: Duration,
}

impl<S: RenderSurface, E: ModelEngine> SurfaceRecoveryMonitor<S, E> {
    /// Create a monitor for a surface and its coordinator
    pub fn new(surface: Arc<S>, coordinator: LoadCoordinator<E>, interval: Duration) -> Self {
        Self {
            surface,
            coordinator,
            interval,
        }
    }

    /// Run one health check; returns the detected corruption if recovery was
    /// performed. The error never propagates past the monitor.
    pub fn check_once(&self) -> Option<ViewerError> {
        let Err(fault) = check_surface(self.surface.as_ref()) else {
            return None;
        };
        warn!("surface health check failed: {}", fault);
        self.surface.recreate();
        self.coordinator.recover();
        Some(fault)
    }

    /// Check immediately, then keep checking on the configured interval.
    /// Runs until the owning task is aborted on teardown.
    pub async fn run(self) {
        self.check_once();
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first interval tick fires immediately; the mount check above
        // already covered it.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            self.check_once();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Default)]
    struct FakeSurface {
        detached: AtomicBool,
        zero_extent: AtomicBool,
        context_lost: AtomicBool,
    }

    impl RenderSurface for FakeSurface {
        fn is_attached(&self) -> bool {
            !self.detached.load(Ordering::SeqCst)
        }
        fn extent(&self) -> (u32, u32) {
            if self.zero_extent.load(Ordering::SeqCst) {
                (0, 720)
            } else {
                (1280, 720)
            }
        }
        fn context_valid(&self) -> bool {
            !self.context_lost.load(Ordering::SeqCst)
        }
        fn recreate(&self) {}
    }

    fn reason(result: Result<(), ViewerError>) -> String {
        match result {
            Err(ViewerError::SurfaceCorrupted { reason }) => reason,
            other => panic!("expected surface corruption, got {:?}", other),
        }
    }

    #[test]
    fn test_healthy_surface_passes() {
        let surface = FakeSurface::default();
        assert!(check_surface(&surface).is_ok());
    }

    #[test]
    fn test_fault_precedence() {
        let surface = FakeSurface::default();
        surface.detached.store(true, Ordering::SeqCst);
        surface.context_lost.store(true, Ordering::SeqCst);
        assert!(reason(check_surface(&surface)).contains("detached"));

        surface.detached.store(false, Ordering::SeqCst);
        assert!(reason(check_surface(&surface)).contains("context lost"));

        surface.context_lost.store(false, Ordering::SeqCst);
        surface.zero_extent.store(true, Ordering::SeqCst);
        assert!(reason(check_surface(&surface)).contains("zero extent"));
    }
}
