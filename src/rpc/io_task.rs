//! Async RPC I/O task: reactor-driven multi-client transport bridge.
//!
//! Runs in a dedicated thread using `edge-executor` for cooperative
//! scheduling and `async-io-mini` for reactor-driven timers (no
//! busy-spinning).  Three concurrent futures:
//!
//! 1. **Accept** polls `try_accept()` every 50 ms
//! 2. **Read** polls every connected client every 1 ms and forwards
//!    complete frames to `CMD_CHANNEL`
//! 3. **Write** awaits `RESP_CHANNEL.receive()` and wakes as soon as the
//!    control loop queues a response.  A client whose socket stays
//!    full is dropped by the transport, so one stalled reader cannot
//!    hold up the other two futures for long
//!
//! ```text
//!  ┌──────────────────────────────────────────────────────┐
//!  │  I/O Thread                                          │
//!  │  ┌────────────────────────────────────────────────┐  │
//!  │  │  edge_executor::LocalExecutor                  │  │
//!  │  │  ┌─────────┐  ┌──────────┐  ┌───────────────┐  │  │
//!  │  │  │ Accept  │  │ Read All │  │ Write (async) │  │  │
//!  │  │  │ 50ms ⏱  │  │ 1ms ⏱    │  │ wake-on-send  │  │  │
//!  │  │  └─────────┘  └──────────┘  └───────────────┘  │  │
//!  │  └────────────────────────────────────────────────┘  │
//!  └──────────────────────────────────────────────────────┘
//! ```

use core::cell::RefCell;
use core::time::Duration;
use std::rc::Rc;

use heapless::Vec;
use log::{info, warn};

use super::channels::{CMD_CHANNEL, CommandMsg, RESP_CHANNEL};
use super::codec::FrameDecoder;
use super::engine::ClientId;
use super::transport::{Transport, TransportError};

const READ_BUF_SIZE: usize = 1024;
const ACCEPT_PERIOD: Duration = Duration::from_millis(50);
const READ_PERIOD: Duration = Duration::from_millis(1);

// ── Frame feeding + channel dispatch ─────────────────────────

/// Decode `data` and forward every complete frame to the control loop.
fn feed_client_bytes(decoder: &mut FrameDecoder, client_id: ClientId, data: &[u8]) {
    decoder.feed_all(data, |payload| {
        let mut frame = Vec::new();
        if frame.extend_from_slice(payload).is_err() {
            warn!("IO[{}]: frame too large for channel buffer", client_id);
            return;
        }
        if CMD_CHANNEL.try_send(CommandMsg { client_id, frame }).is_err() {
            warn!("IO[{}]: command channel full, dropping frame", client_id);
        }
    });
}

// ── Async I/O loop ───────────────────────────────────────────

type Shared<T> = Rc<RefCell<T>>;
type SharedDecoders = Shared<std::vec::Vec<FrameDecoder>>;

async fn accept_loop<T: Transport>(transport: Shared<T>, decoders: SharedDecoders) {
    loop {
        if let Some(cid) = transport.borrow_mut().try_accept() {
            if let Some(d) = decoders.borrow_mut().get_mut(usize::from(cid)) {
                d.reset();
            }
        }
        async_io_mini::Timer::after(ACCEPT_PERIOD).await;
    }
}

async fn read_loop<T: Transport>(transport: Shared<T>, decoders: SharedDecoders) {
    let mut read_buf = [0u8; READ_BUF_SIZE];
    loop {
        {
            let mut t = transport.borrow_mut();
            let mut decoders = decoders.borrow_mut();
            for (idx, decoder) in decoders.iter_mut().enumerate() {
                let Ok(cid) = ClientId::try_from(idx) else {
                    break;
                };
                if !t.is_connected(cid) {
                    continue;
                }
                match t.read_client(cid, &mut read_buf) {
                    Ok(0) => {}
                    Ok(n) => feed_client_bytes(decoder, cid, &read_buf[..n]),
                    Err(TransportError::NotConnected) => {
                        info!("IO: client {} disconnected (read)", cid);
                        decoder.reset();
                    }
                    Err(e) => {
                        warn!("IO: client {} read error ({}), disconnecting", cid, e);
                        t.disconnect(cid);
                        decoder.reset();
                    }
                }
            }
        }
        async_io_mini::Timer::after(READ_PERIOD).await;
    }
}

async fn write_loop<T: Transport>(transport: Shared<T>, decoders: SharedDecoders) {
    loop {
        let resp = RESP_CHANNEL.receive().await;
        let cid = resp.client_id;

        let mut t = transport.borrow_mut();
        if !t.is_connected(cid) {
            continue;
        }
        let sent = t
            .write_client(cid, &resp.data)
            .and_then(|()| t.flush_client(cid));
        if let Err(e) = sent {
            warn!("IO: write to client {} failed: {}", cid, e);
            t.disconnect(cid);
            if let Some(d) = decoders.borrow_mut().get_mut(usize::from(cid)) {
                d.reset();
            }
        }
    }
}

/// Drive the three I/O futures until the process exits.
pub fn run_io_loop<T: Transport>(transport: T) {
    let executor: edge_executor::LocalExecutor<'_, 8> = edge_executor::LocalExecutor::new();

    let slots = transport.capacity();
    let transport: Shared<T> = Rc::new(RefCell::new(transport));
    let decoders: SharedDecoders =
        Rc::new(RefCell::new((0..slots).map(|_| FrameDecoder::new()).collect()));

    executor
        .spawn(accept_loop(transport.clone(), decoders.clone()))
        .detach();
    executor
        .spawn(read_loop(transport.clone(), decoders.clone()))
        .detach();
    executor.spawn(write_loop(transport, decoders)).detach();

    info!("IO task started ({} client slots)", slots);

    futures_lite::future::block_on(executor.run(core::future::pending::<()>()));
}

// ── Thread spawn ─────────────────────────────────────────────

/// Spawn the I/O task on a dedicated thread that owns `transport`.
pub fn spawn<T>(transport: T) -> std::io::Result<std::thread::JoinHandle<()>>
where
    T: Transport + Send + 'static,
{
    std::thread::Builder::new()
        .name("rpc-io".into())
        .spawn(move || run_io_loop(transport))
}
