//! Shared primitives between the pipeline tasks.
//!
//! These are the only pieces of state two tasks ever touch, and each one is
//! reachable only through its operations:
//!
//! - [`Channel`]: single-slot ownership handoff, non-blocking send, timed receive
//! - [`LivenessSignal`]: two progress flags, set by workers, read-and-cleared by the observer
//! - [`ItemPool`]: bounded arena standing in for the device heap; source of allocation failures

mod channel;
mod liveness;
mod pool;

pub use channel::Channel;
pub use liveness::{Liveness, LivenessSignal};
pub use pool::{ItemPool, Pooled};
