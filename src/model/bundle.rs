//! Decoded model bundles and their animation/expression catalogs.
//!
//! Decoding itself is the model engine's job; this module only describes the
//! shape of what comes back so the pool, cache and scheduler can account for
//! it. Geometry and rig data stay behind opaque handles.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::time::Timestamp;

/// Opaque handle to decoded geometry/rig data owned by the model engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceRef(Uuid);

impl ResourceRef {
    /// Mint a fresh handle
    #[inline]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ResourceRef {
    fn default() -> Self {
        Self::new()
    }
}

/// One decoded texture ready to be warmed into the cache
#[derive(Debug, Clone)]
pub struct TextureResource {
    /// Texture name, unique within the bundle
    pub name: String,
    /// Decoded payload size in bytes
    pub bytes: usize,
    /// Decoded texel data
    pub payload: Arc<[u8]>,
}

impl TextureResource {
    /// Create a texture resource from decoded texel data
    pub fn new(name: impl Into<String>, payload: impl Into<Arc<[u8]>>) -> Self {
        let payload = payload.into();
        Self {
            name: name.into(),
            bytes: payload.len(),
            payload,
        }
    }
}

/// One animation clip in a group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationClip {
    /// Clip name
    pub name: String,
    /// Resolved clip duration
    pub duration: Timestamp,
}

impl AnimationClip {
    /// Create a clip with the given name and duration
    pub fn new(name: impl Into<String>, duration: impl Into<Timestamp>) -> Self {
        Self {
            name: name.into(),
            duration: duration.into(),
        }
    }
}

/// Catalog of animations available on a model, keyed by group
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimationCatalog {
    groups: HashMap<String, Vec<AnimationClip>>,
}

impl AnimationCatalog {
    /// Create an empty catalog
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a clip to a group, creating the group if needed
    pub fn add_clip(&mut self, group: impl Into<String>, clip: AnimationClip) {
        self.groups.entry(group.into()).or_default().push(clip);
    }

    /// Look up a clip by group and index
    #[inline]
    pub fn clip(&self, group: &str, index: usize) -> Option<&AnimationClip> {
        self.groups.get(group).and_then(|clips| clips.get(index))
    }

    /// Number of clips in a group (zero for unknown groups)
    #[inline]
    pub fn group_len(&self, group: &str) -> usize {
        self.groups.get(group).map(|clips| clips.len()).unwrap_or(0)
    }

    /// Iterate group names
    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(|s| s.as_str())
    }

    /// Total number of clips across all groups
    pub fn clip_count(&self) -> usize {
        self.groups.values().map(|clips| clips.len()).sum()
    }
}

/// One expression definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionDef {
    /// Expression name
    pub name: String,
}

impl ExpressionDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Ordered catalog of expressions available on a model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpressionCatalog {
    expressions: Vec<ExpressionDef>,
}

impl ExpressionCatalog {
    /// Create an empty catalog
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an expression
    pub fn add(&mut self, expression: ExpressionDef) {
        self.expressions.push(expression);
    }

    /// Look up an expression by index
    #[inline]
    pub fn get(&self, index: usize) -> Option<&ExpressionDef> {
        self.expressions.get(index)
    }

    /// Number of expressions
    #[inline]
    pub fn len(&self) -> usize {
        self.expressions.len()
    }

    /// Whether the catalog is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.expressions.is_empty()
    }
}

/// Everything the model engine hands back for one decoded bundle
#[derive(Debug, Clone)]
pub struct ModelBundle {
    /// Opaque handle to decoded geometry
    pub geometry: ResourceRef,
    /// Opaque handle to the decoded rig
    pub rig: ResourceRef,
    /// Decoded textures, warmed into the cache on load
    pub textures: Vec<TextureResource>,
    /// Animations available on this model
    pub animations: AnimationCatalog,
    /// Expressions available on this model
    pub expressions: ExpressionCatalog,
    /// Resident size of geometry + rig data, in bytes
    pub memory_bytes: usize,
}

impl ModelBundle {
    /// Total decoded texture bytes in this bundle
    pub fn texture_bytes(&self) -> usize {
        self.textures.iter().map(|t| t.bytes).sum()
    }
}
