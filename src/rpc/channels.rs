//! RPC inter-thread communication channels.
//!
//! `embassy-sync` bounded channels bridge the async I/O thread and the
//! control loop.  Both sides share these statics without locking the
//! simulation state.
//!
//! ```text
//! ┌──────────────┐  CommandMsg   ┌──────────────┐
//! │   I/O Task   │─────────────▶│ Control Loop │
//! │  (async)     │◀─────────────│ (ticks)      │
//! └──────────────┘  ResponseMsg  └──────────────┘
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use heapless::Vec;
use log::warn;

use super::codec::MAX_FRAME_SIZE;
use super::engine::{ClientId, MAX_RESPONSE_SIZE, ResponseFrame};

/// Inbound request from a client, delivered to the control loop.
pub struct CommandMsg {
    /// Which client sent this frame.
    pub client_id: ClientId,
    /// Frame payload (length prefix already stripped).
    pub frame: Vec<u8, MAX_FRAME_SIZE>,
}

/// Outbound response from the control loop, delivered to the I/O task.
pub struct ResponseMsg {
    /// Which client this response is destined for.
    pub client_id: ClientId,
    /// Length-prefix-encoded response bytes (ready to write).
    pub data: Vec<u8, MAX_RESPONSE_SIZE>,
}

/// Channel depth for inbound requests.
const CMD_DEPTH: usize = 8;

/// Channel depth for outbound responses.
const RESP_DEPTH: usize = 8;

/// Inbound command channel: I/O task → control loop.
pub static CMD_CHANNEL: Channel<CriticalSectionRawMutex, CommandMsg, CMD_DEPTH> = Channel::new();

/// Outbound response channel: control loop → I/O task.
pub static RESP_CHANNEL: Channel<CriticalSectionRawMutex, ResponseMsg, RESP_DEPTH> =
    Channel::new();

/// Queue a response for transmission.  The I/O task's write future wakes
/// as soon as it lands.
pub fn send_response(frame: ResponseFrame) {
    let client_id = frame.client_id;
    let msg = ResponseMsg {
        client_id,
        data: frame.data,
    };
    if RESP_CHANNEL.try_send(msg).is_err() {
        warn!("RPC: response channel full for client {}", client_id);
    }
}

/// Try to receive an inbound request without waiting.
pub fn try_recv_command() -> Option<CommandMsg> {
    CMD_CHANNEL.try_receive().ok()
}
