//! # Device: starts the pipeline, supervises it and stops it.
//!
//! The [`Device`] owns the event bus, the shared pipeline primitives, the
//! watchdog and one [`TaskSpec`] per pipeline loop.
//!
//! ```text
//! run_until(shutdown):
//!   listener: Bus.subscribe() ─► SubscriberSet::emit(&Event)
//!   watchdog.rearm()
//!   TaskSpec[generator, receiver, supervisor]
//!       └──► TaskActor ─► set.spawn(actor.run(child_token))
//!
//!   select:
//!     shutdown resolves      ─► ShutdownRequested                 ─► Ok
//!     watchdog.monitor() Err ─► WatchdogExpired{task}             ─► Err(WatchdogExpired)
//!
//!   then: runtime_token.cancel() ─► wait_all_with_grace(cfg.grace)
//!          ├─ all joined      ─► AllStoppedWithin
//!          └─ grace exceeded  ─► GraceExceeded, abort the rest ─► Err(GraceExceeded)
//!   finally: stop listener, drain bus, flush subscribers
//! ```
//!
//! ## Rules
//! - An actor that gives up does not end the run; its task stops reporting
//!   liveness and the watchdog ends the run instead.
//! - A watchdog expiry takes precedence over a grace timeout in the returned error.
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use handoff::{Config, Device, LogWriter, Subscribe};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = Config::default();
//!     let log: Arc<dyn Subscribe> = Arc::new(LogWriter::new(cfg.log_prefix.clone()));
//!
//!     let device = Device::builder(cfg).with_subscribers(vec![log]).build()?;
//!     device.run().await?;
//!     Ok(())
//! }
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::{
    sync::broadcast::error::{RecvError, TryRecvError},
    task::{Id, JoinHandle, JoinSet},
};
use tokio_util::sync::CancellationToken;

use crate::{
    error::RuntimeError,
    events::{Bus, Event, EventKind},
    pipeline::Shared,
    runtime::{Config, DeviceBuilder, Watchdog, actor::TaskActor, shutdown},
    subscribers::{Subscribe, SubscriberSet},
    tasks::TaskSpec,
};

/// The running pipeline and everything that supervises it.
pub struct Device {
    cfg: Config,
    bus: Bus,
    shared: Shared,
    watchdog: Arc<Watchdog>,
    specs: Vec<TaskSpec>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl Device {
    /// Starts building a device from `cfg`.
    pub fn builder(cfg: Config) -> DeviceBuilder {
        DeviceBuilder::new(cfg)
    }

    pub(crate) fn new_internal(
        cfg: Config,
        bus: Bus,
        shared: Shared,
        watchdog: Arc<Watchdog>,
        specs: Vec<TaskSpec>,
        subscribers: Vec<Arc<dyn Subscribe>>,
    ) -> Self {
        Self {
            cfg,
            bus,
            shared,
            watchdog,
            specs,
            subscribers,
        }
    }

    /// Configuration the device was built from.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Event bus; subscribe before `run` to see every event.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Shared pipeline primitives.
    pub fn shared(&self) -> &Shared {
        &self.shared
    }

    /// Names of the tasks registered with the watchdog.
    pub fn tasks(&self) -> Vec<String> {
        self.watchdog.registered()
    }

    /// Runs until an OS termination signal or a watchdog expiry.
    ///
    /// If signal handlers cannot be installed the device runs until the
    /// watchdog expires.
    pub async fn run(self) -> Result<(), RuntimeError> {
        self.run_until(async {
            if shutdown::wait_for_shutdown_signal().await.is_err() {
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Runs until `shutdown` resolves or the watchdog expires.
    pub async fn run_until<F>(self, shutdown: F) -> Result<(), RuntimeError>
    where
        F: Future<Output = ()>,
    {
        let listener_stop = CancellationToken::new();
        let listener = self.spawn_listener(listener_stop.clone());

        let runtime_token = CancellationToken::new();
        let mut set = JoinSet::new();
        let mut names = HashMap::new();
        self.watchdog.rearm();
        self.spawn_actors(&mut set, &mut names, &runtime_token);

        let monitor_token = runtime_token.child_token();
        let expired = tokio::select! {
            _ = shutdown => {
                self.bus.publish(Event::new(EventKind::ShutdownRequested));
                None
            }
            res = self.watchdog.monitor(monitor_token) => res.err(),
        };
        if let Some(RuntimeError::WatchdogExpired { task, .. }) = &expired {
            self.bus.publish(
                Event::new(EventKind::WatchdogExpired)
                    .with_task(task.as_str())
                    .with_reason(format!("no liveness report within {:?}", self.watchdog.timeout())),
            );
        }

        runtime_token.cancel();
        let stopped = self.wait_all_with_grace(&mut set, &mut names).await;

        listener_stop.cancel();
        let _ = listener.await;

        match expired {
            Some(err) => Err(err),
            None => stopped,
        }
    }

    /// Forwards bus events to the subscribers until `stop`, then drains what is left.
    fn spawn_listener(&self, stop: CancellationToken) -> JoinHandle<()> {
        let mut rx = self.bus.subscribe();
        let subs = SubscriberSet::new(self.subscribers.clone(), self.bus.clone());

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    ev = rx.recv() => match ev {
                        Ok(ev) => subs.emit(&ev),
                        Err(RecvError::Lagged(_)) => continue,
                        Err(RecvError::Closed) => break,
                    },
                    _ = stop.cancelled() => break,
                }
            }
            loop {
                match rx.try_recv() {
                    Ok(ev) => subs.emit(&ev),
                    Err(TryRecvError::Lagged(_)) => continue,
                    Err(_) => break,
                }
            }
            subs.shutdown().await;
        })
    }

    fn spawn_actors(
        &self,
        set: &mut JoinSet<()>,
        names: &mut HashMap<Id, Arc<str>>,
        runtime_token: &CancellationToken,
    ) {
        for spec in &self.specs {
            let actor = TaskActor::new(spec, self.bus.clone());
            let handle = set.spawn(actor.run(runtime_token.child_token()));
            names.insert(handle.id(), Arc::from(spec.name()));
        }
    }

    /// Waits for all actors to finish within the configured grace period.
    async fn wait_all_with_grace(
        &self,
        set: &mut JoinSet<()>,
        names: &mut HashMap<Id, Arc<str>>,
    ) -> Result<(), RuntimeError> {
        let Some(grace) = self.cfg.grace_period() else {
            set.abort_all();
            while set.join_next().await.is_some() {}
            return Ok(());
        };

        let done = async {
            while let Some(res) = set.join_next_with_id().await {
                let id = match res {
                    Ok((id, ())) => id,
                    Err(e) => e.id(),
                };
                names.remove(&id);
            }
        };

        if tokio::time::timeout(grace, done).await.is_ok() {
            self.bus.publish(Event::new(EventKind::AllStoppedWithin));
            return Ok(());
        }

        let mut stuck: Vec<String> = names.values().map(|n| n.to_string()).collect();
        stuck.sort_unstable();
        self.bus.publish(
            Event::new(EventKind::GraceExceeded).with_reason(format!("stuck: {}", stuck.join(", "))),
        );
        set.abort_all();
        while set.join_next().await.is_some() {}
        Err(RuntimeError::GraceExceeded { grace, stuck })
    }
}
