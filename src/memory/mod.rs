//! Memory budgets: the model pool and the texture cache

pub mod model_pool;
pub mod texture_cache;

pub use model_pool::*;
pub use texture_cache::*;
