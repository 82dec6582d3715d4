//! TCP transport adapter.
//!
//! Implements [`Transport`] as a non-blocking TCP server with a fixed
//! number of client slots.
//!
//! ## Connection model
//!
//! 1. `bind()` opens a listener on `0.0.0.0:<port>` in non-blocking mode.
//! 2. `try_accept()` polls for a connection and parks it in the first
//!    free slot.  When every slot is taken the connection is refused
//!    by dropping it.
//! 3. Reads are non-blocking: `read_client()` returns `Ok(0)` when no
//!    data is waiting.  EOF frees the slot and reports `NotConnected`.
//! 4. Writes retry while the socket is full, but only for
//!    [`WRITE_STALL_LIMIT`].  A client that stops reading is then
//!    dropped and the write reports `Io`.
//! 5. `disconnect()` closes the socket and frees the slot.

use std::io::{ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::time::{Duration, Instant};

use log::{info, warn};

use crate::rpc::engine::ClientId;
use crate::rpc::transport::{Transport, TransportError};

/// Maximum simultaneous clients.
pub const MAX_CLIENTS: usize = 3;

/// Longest a single write may wait on a full socket buffer.
pub const WRITE_STALL_LIMIT: Duration = Duration::from_millis(250);

const WRITE_RETRY_PAUSE: Duration = Duration::from_millis(1);

/// Multi-client non-blocking TCP server.
pub struct TcpTransport {
    listener: TcpListener,
    clients: [Option<TcpStream>; MAX_CLIENTS],
}

impl TcpTransport {
    /// Bind to `0.0.0.0:<port>`.  Port `0` lets the OS choose (see
    /// [`local_addr`](Self::local_addr)).
    pub fn bind(port: u16) -> Result<Self, TransportError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = TcpListener::bind(addr).map_err(|e| {
            warn!("TCP: bind to {} failed: {}", addr, e);
            TransportError::Io
        })?;
        listener
            .set_nonblocking(true)
            .map_err(|_| TransportError::Io)?;
        info!("TCP: listening on port {} ({} slots)", port, MAX_CLIENTS);
        Ok(Self {
            listener,
            clients: Default::default(),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        self.listener.local_addr().map_err(|_| TransportError::Io)
    }

    /// Connected client count.
    pub fn connected(&self) -> usize {
        self.clients.iter().flatten().count()
    }

    fn stream(&mut self, client: ClientId) -> Result<&mut TcpStream, TransportError> {
        self.clients
            .get_mut(usize::from(client))
            .and_then(Option::as_mut)
            .ok_or(TransportError::NotConnected)
    }

    fn drop_client(&mut self, client: ClientId) {
        if let Some(slot) = self.clients.get_mut(usize::from(client)) {
            slot.take();
        }
    }
}

impl Transport for TcpTransport {
    fn try_accept(&mut self) -> Option<ClientId> {
        let (stream, addr) = match self.listener.accept() {
            Ok(conn) => conn,
            Err(ref e) if e.kind() == ErrorKind::WouldBlock => return None,
            Err(e) => {
                warn!("TCP: accept error: {}", e);
                return None;
            }
        };
        let Some(idx) = self.clients.iter().position(Option::is_none) else {
            warn!("TCP: refusing {}, all {} slots busy", addr, MAX_CLIENTS);
            return None;
        };
        if stream.set_nonblocking(true).is_err() {
            warn!("TCP: failed to set non-blocking on client socket");
            return None;
        }
        let _ = stream.set_nodelay(true);
        info!("TCP: client {} connected from {}", idx, addr);
        self.clients[idx] = Some(stream);
        ClientId::try_from(idx).ok()
    }

    fn is_connected(&self, client: ClientId) -> bool {
        self.clients
            .get(usize::from(client))
            .is_some_and(Option::is_some)
    }

    fn read_client(&mut self, client: ClientId, buf: &mut [u8]) -> Result<usize, TransportError> {
        let result = self.stream(client)?.read(buf);
        match result {
            Ok(0) => {
                info!("TCP: client {} disconnected (EOF)", client);
                self.drop_client(client);
                Err(TransportError::NotConnected)
            }
            Ok(n) => Ok(n),
            Err(ref e) if e.kind() == ErrorKind::WouldBlock => Ok(0),
            Err(_) => {
                self.drop_client(client);
                Err(TransportError::Io)
            }
        }
    }

    fn write_client(&mut self, client: ClientId, mut data: &[u8]) -> Result<(), TransportError> {
        let mut stalled_since: Option<Instant> = None;
        while !data.is_empty() {
            let result = self.stream(client)?.write(data);
            match result {
                Ok(0) => {
                    self.drop_client(client);
                    return Err(TransportError::NotConnected);
                }
                Ok(n) => {
                    data = &data[n..];
                    stalled_since = None;
                }
                Err(ref e) if e.kind() == ErrorKind::WouldBlock => {
                    let since = *stalled_since.get_or_insert_with(Instant::now);
                    if since.elapsed() >= WRITE_STALL_LIMIT {
                        warn!(
                            "TCP: client {} stopped reading, dropping with {} bytes unsent",
                            client,
                            data.len()
                        );
                        self.drop_client(client);
                        return Err(TransportError::Io);
                    }
                    std::thread::sleep(WRITE_RETRY_PAUSE);
                }
                Err(_) => {
                    self.drop_client(client);
                    return Err(TransportError::Io);
                }
            }
        }
        Ok(())
    }

    fn flush_client(&mut self, client: ClientId) -> Result<(), TransportError> {
        self.stream(client)?.flush().map_err(|_| TransportError::Io)
    }

    fn disconnect(&mut self, client: ClientId) {
        if self.clients.get(usize::from(client)).is_some_and(Option::is_some) {
            info!("TCP: client {} disconnected", client);
        }
        self.drop_client(client);
    }

    fn capacity(&self) -> usize {
        MAX_CLIENTS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_transport() -> TcpTransport {
        TcpTransport::bind(0).unwrap()
    }

    fn accept_within(t: &mut TcpTransport) -> Option<ClientId> {
        for _ in 0..100 {
            if let Some(cid) = t.try_accept() {
                return Some(cid);
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        None
    }

    #[test]
    fn accept_when_no_client_returns_none() {
        let mut t = make_transport();
        assert_eq!(t.try_accept(), None);
        assert_eq!(t.connected(), 0);
    }

    #[test]
    fn clients_fill_slots_in_order() {
        let mut t = make_transport();
        let addr = t.local_addr().unwrap();
        let _a = TcpStream::connect(addr).unwrap();
        assert_eq!(accept_within(&mut t), Some(0));
        let _b = TcpStream::connect(addr).unwrap();
        assert_eq!(accept_within(&mut t), Some(1));
        assert!(t.is_connected(1));

        t.disconnect(0);
        assert!(!t.is_connected(0));
        let _c = TcpStream::connect(addr).unwrap();
        assert_eq!(accept_within(&mut t), Some(0));
        assert_eq!(t.connected(), 2);
    }

    #[test]
    fn read_and_write_while_connected() {
        let mut t = make_transport();
        let mut client = TcpStream::connect(t.local_addr().unwrap()).unwrap();
        let cid = accept_within(&mut t).unwrap();

        client.write_all(b"ping").unwrap();
        let mut buf = [0u8; 32];
        let mut n = 0;
        for _ in 0..100 {
            n = t.read_client(cid, &mut buf).unwrap();
            if n > 0 {
                break;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(&buf[..n], b"ping");

        t.write_client(cid, b"pong").unwrap();
        t.flush_client(cid).unwrap();
        let mut reply = [0u8; 4];
        client.read_exact(&mut reply).unwrap();
        assert_eq!(&reply, b"pong");
    }

    #[test]
    fn peer_close_frees_slot() {
        let mut t = make_transport();
        let client = TcpStream::connect(t.local_addr().unwrap()).unwrap();
        let cid = accept_within(&mut t).unwrap();
        drop(client);

        let mut buf = [0u8; 8];
        let mut result = Ok(0);
        for _ in 0..100 {
            result = t.read_client(cid, &mut buf);
            if result != Ok(0) {
                break;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(result, Err(TransportError::NotConnected));
        assert!(!t.is_connected(cid));
    }

    #[test]
    fn stalled_reader_is_dropped_instead_of_blocking_writes() {
        let mut t = make_transport();
        // Connected but never read from.
        let _client = TcpStream::connect(t.local_addr().unwrap()).unwrap();
        let cid = accept_within(&mut t).unwrap();

        let chunk = [0u8; 64 * 1024];
        let started = Instant::now();
        let mut result = Ok(());
        // Far more than any loopback socket buffer holds.
        for _ in 0..4096 {
            result = t.write_client(cid, &chunk);
            if result.is_err() {
                break;
            }
        }
        assert_eq!(result, Err(TransportError::Io));
        assert!(!t.is_connected(cid));
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(t.write_client(cid, b"x"), Err(TransportError::NotConnected));
    }

    #[test]
    fn io_without_connection_returns_not_connected() {
        let mut t = make_transport();
        let mut buf = [0u8; 8];
        assert_eq!(t.read_client(0, &mut buf), Err(TransportError::NotConnected));
        assert_eq!(t.write_client(2, b"x"), Err(TransportError::NotConnected));
        assert_eq!(t.read_client(9, &mut buf), Err(TransportError::NotConnected));
    }
}
