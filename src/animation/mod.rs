//! Animation requests, playback state and the priority-preemption scheduler

pub mod playback;
pub mod request;
pub mod scheduler;

pub use playback::*;
pub use request::*;
pub use scheduler::*;
