use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use handoff::{Config, Device, Event, EventKind, LogWriter, RuntimeError, Subscribe};

/// Single-slot producer/consumer/supervisor pipeline.
#[derive(Parser, Debug)]
#[command(name = "handoff", version, about)]
struct Args {
    /// Length of one time unit in milliseconds; every period is derived from it
    #[arg(long, default_value_t = 1000)]
    tick_ms: u64,

    /// Number of item slots in the pool
    #[arg(long, default_value_t = 4)]
    pool_capacity: usize,

    /// Prefix written in front of every log line
    #[arg(long, default_value = "[handoff]")]
    prefix: String,

    /// Maximum wait for tasks on shutdown, in milliseconds (0 = do not wait)
    #[arg(long, default_value_t = 5000)]
    grace_ms: u64,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let cfg = Config {
        pool_capacity: args.pool_capacity,
        grace: Duration::from_millis(args.grace_ms),
        log_prefix: args.prefix,
        ..Config::default()
    }
    .with_tick(Duration::from_millis(args.tick_ms));

    let log = LogWriter::new(cfg.log_prefix.clone());
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new(cfg.log_prefix.clone()))];

    let device = match Device::builder(cfg).with_subscribers(subs).build() {
        Ok(device) => device,
        Err(e) => {
            report(&log, &e);
            return ExitCode::FAILURE;
        }
    };

    match device.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&log, &e);
            ExitCode::FAILURE
        }
    }
}

/// Startup and runtime failures end the process with a non-zero status; the
/// host supervisor restarts it.
fn report(log: &LogWriter, err: &RuntimeError) {
    let kind = match err {
        RuntimeError::ResourceCreation { .. } => EventKind::ResourceCreationFailed,
        RuntimeError::WatchdogExpired { .. } => EventKind::WatchdogExpired,
        _ => EventKind::GraceExceeded,
    };
    eprintln!("{}", log.render(&Event::new(kind).with_reason(err.as_message())));
}
