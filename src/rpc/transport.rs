//! Transport abstraction: a byte-oriented, multi-client server.
//!
//! The I/O task is generic over [`Transport`], so the RPC logic never
//! sees sockets.  [`TcpTransport`](crate::adapters::tcp_transport::TcpTransport)
//! is the production implementation.

use core::fmt;

use crate::error::Error;

use super::engine::ClientId;

/// Errors originating from a transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// Socket I/O failure.
    Io,
    /// The client slot holds no connection (peer closed or never opened).
    NotConnected,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io => write!(f, "socket I/O error"),
            Self::NotConnected => write!(f, "no client connected"),
        }
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::Io => Self::Transport("socket I/O error"),
            TransportError::NotConnected => Self::Transport("no client connected"),
        }
    }
}

/// Non-blocking multi-client byte transport.
pub trait Transport {
    /// Accept one pending client if a slot is free.
    fn try_accept(&mut self) -> Option<ClientId>;

    fn is_connected(&self, client: ClientId) -> bool;

    /// Read up to `buf.len()` bytes.  Returns `Ok(0)` when no data is
    /// waiting and `Err(NotConnected)` once the peer has gone.
    fn read_client(&mut self, client: ClientId, buf: &mut [u8]) -> Result<usize, TransportError>;

    /// Write all of `data`.
    fn write_client(&mut self, client: ClientId, data: &[u8]) -> Result<(), TransportError>;

    fn flush_client(&mut self, client: ClientId) -> Result<(), TransportError>;

    /// Drop the client's connection and free its slot.
    fn disconnect(&mut self, client: ClientId);

    /// Number of client slots.
    fn capacity(&self) -> usize;
}
