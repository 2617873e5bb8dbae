//! Device runtime: configuration, task actors, watchdog and orchestration.
//!
//! - [`config`]: periods, thresholds and policies, derived from one time unit;
//! - [`watchdog`]: per-task liveness deadlines;
//! - [`runner`]: executes one run of a task loop with panic isolation;
//! - [`actor`]: keeps one task running per restart policy and backoff;
//! - [`device`]: starts the actors, watches them, shuts them down;
//! - [`shutdown`]: cross-platform termination signal handling.

mod actor;
mod builder;
mod config;
mod device;
mod runner;
mod shutdown;
mod watchdog;

pub use builder::DeviceBuilder;
pub use config::Config;
pub use device::Device;
pub use watchdog::{Watchdog, WatchdogHandle};
