use std::sync::Arc;

use crate::{
    error::RuntimeError,
    events::Bus,
    pipeline::{Generator, Receiver, Shared, Supervisor},
    runtime::{Config, Device, Watchdog},
    subscribers::Subscribe,
    tasks::{TaskRef, TaskSpec},
};

/// Builder for a [`Device`].
pub struct DeviceBuilder {
    cfg: Config,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl DeviceBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
        }
    }

    /// Sets event subscribers.
    ///
    /// Subscribers receive every device event through dedicated workers with
    /// bounded queues. Without subscribers the device runs silently.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Creates the shared primitives, registers the three pipeline tasks with
    /// the watchdog and returns the device, ready to run.
    ///
    /// A configuration the pipeline cannot be built from is reported as
    /// [`RuntimeError::ResourceCreation`].
    pub fn build(self) -> Result<Device, RuntimeError> {
        let cfg = self.cfg;
        cfg.validate()?;

        let bus = Bus::new(cfg.bus_capacity_clamped());
        let shared = Shared::new(cfg.pool_capacity, bus.clone());
        let watchdog = Arc::new(Watchdog::with_check_interval(
            cfg.watchdog_timeout,
            cfg.watchdog_check_interval(),
        ));

        let generator: TaskRef = Arc::new(Generator::new(
            shared.clone(),
            watchdog.register(Generator::NAME),
            cfg.produce_interval,
        ));
        let receiver: TaskRef = Arc::new(Receiver::new(
            shared.clone(),
            watchdog.register(Receiver::NAME),
            cfg.receive_timeout,
            cfg.escalate_after,
            cfg.recover_after,
        ));
        let supervisor: TaskRef = Arc::new(Supervisor::new(
            shared.clone(),
            watchdog.register(Supervisor::NAME),
            cfg.observe_window,
            cfg.supervise_interval,
        ));

        let specs = [generator, receiver, supervisor]
            .into_iter()
            .map(|task| TaskSpec::with_defaults(task, &cfg))
            .collect();

        Ok(Device::new_internal(
            cfg,
            bus,
            shared,
            watchdog,
            specs,
            self.subscribers,
        ))
    }
}
