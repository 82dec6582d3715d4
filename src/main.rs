//! PumpSim host binary.
//!
//! Wires the adapters to the [`AppService`] and runs the control loop on
//! the main thread.  The RPC I/O task runs on its own thread and hands
//! frames over through the static channels.
//!
//! ```text
//!  main thread                         rpc-io thread
//!  ┌──────────────────────────┐        ┌─────────────────────┐
//!  │ control loop             │◀─ cmd ─│ accept / read       │
//!  │  tick ▸ refresh points   │        │                     │
//!  │  dispatch ▸ respond      │─ resp ▶│ write               │
//!  └──────────────────────────┘        └─────────────────────┘
//! ```

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use log::info;
use tracing_subscriber::EnvFilter;

use pumpsim::adapters::env_config::EnvConfigAdapter;
use pumpsim::adapters::log_sink::LogEventSink;
use pumpsim::adapters::rng::SimRng;
use pumpsim::adapters::tcp_transport::TcpTransport;
use pumpsim::adapters::time::MonotonicClock;
use pumpsim::app::ports::TimePort;
use pumpsim::app::service::AppService;
use pumpsim::error::Error;
use pumpsim::rpc::channels::{CMD_CHANNEL, CommandMsg, send_response};
use pumpsim::rpc::engine::RpcEngine;
use pumpsim::rpc::io_task;

/// Set to `1` for JSON log lines.
const LOG_JSON_VAR: &str = "PUMP_LOG_JSON";

fn setup_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var(LOG_JSON_VAR).is_ok_and(|v| v == "1");

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}

fn main() -> Result<()> {
    setup_tracing();
    info!("pumpsim v{} starting", env!("CARGO_PKG_VERSION"));

    let config = EnvConfigAdapter::new().load_or_default();
    let clock = MonotonicClock::new();
    let mut rng = SimRng::new(config.rng_seed);
    let mut log = LogEventSink::new();

    let mut service = AppService::new(&config, clock.now_secs());
    let mut rpc = RpcEngine::new(&service.build_telemetry());

    let transport = TcpTransport::bind(config.listen_port)
        .map_err(Error::from)
        .with_context(|| format!("binding RPC listener on port {}", config.listen_port))?;
    let _io = io_task::spawn(transport).context("spawning RPC I/O thread")?;

    service.start(&mut log);

    futures_lite::future::block_on(control_loop(
        &mut service,
        &mut rpc,
        &mut rng,
        &clock,
        &mut log,
    ));
    Ok(())
}

/// Alternate between RPC requests and ticks.  A request arriving before
/// the deadline is answered immediately; the tick cadence is unaffected.
async fn control_loop(
    service: &mut AppService,
    rpc: &mut RpcEngine,
    rng: &mut SimRng,
    clock: &MonotonicClock,
    log: &mut LogEventSink,
) {
    let mut next_tick = Instant::now() + interval(service);
    loop {
        let remaining = next_tick.saturating_duration_since(Instant::now());
        let request = futures_lite::future::or(
            async { Some(CMD_CHANNEL.receive().await) },
            async {
                async_io_mini::Timer::after(remaining).await;
                None::<CommandMsg>
            },
        )
        .await;

        match request {
            Some(msg) => {
                if let Some(frame) = rpc.dispatch(msg.client_id, &msg.frame, service, log) {
                    send_response(frame);
                }
            }
            None => {
                service.tick(rng, clock, log);
                rpc.refresh(&service.build_telemetry());
                // An interval change takes effect from the next wait.
                next_tick = Instant::now() + interval(service);
            }
        }
    }
}

fn interval(service: &AppService) -> Duration {
    Duration::from_secs_f64(service.update_interval_secs())
}
