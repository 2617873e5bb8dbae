//! # Task abstraction and specification.
//!
//! - [`Task`] - trait for an async, cancelable loop
//! - [`TaskRef`] - shared handle (`Arc<dyn Task>`)
//! - [`TaskSpec`] - task bundled with its restart and backoff policies

mod spec;
mod task;

pub use spec::TaskSpec;
pub use task::{Task, TaskRef};
