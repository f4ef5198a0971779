//! The model engine seam.
//!
//! Byte fetching and bundle decoding are black boxes to this crate; the
//! runtime only needs the two capabilities below. Rigging math, physics and
//! file-format parsing all live behind this trait.

use crate::error::ViewerError;
use crate::model::ModelBundle;

/// Fetches and decodes model bundles on behalf of the runtime
pub trait ModelEngine: Send + Sync + 'static {
    /// Fetch the raw bundle bytes for a model path.
    ///
    /// The engine may impose its own timeout; the runtime does not add one.
    fn fetch_bytes(
        &self,
        url: &str,
    ) -> impl std::future::Future<Output = Result<Vec<u8>, ViewerError>> + Send;

    /// Decode fetched bytes into geometry, rig, textures and catalogs
    fn decode_bundle(
        &self,
        bytes: Vec<u8>,
    ) -> impl std::future::Future<Output = Result<ModelBundle, ViewerError>> + Send;
}
