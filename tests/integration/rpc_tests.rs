//! RPC surface: requests against a live AppService, and one loopback
//! round trip through the TCP transport and I/O thread.

use std::io::{Read, Write};
use std::net::TcpStream;
use std::time::{Duration, Instant};

use serde_json::{Value, json};

use pumpsim::adapters::tcp_transport::TcpTransport;
use pumpsim::app::service::AppService;
use pumpsim::config::PumpConfig;
use pumpsim::rpc::channels::{send_response, try_recv_command};
use pumpsim::rpc::codec::{HEADER_SIZE, encode_frame};
use pumpsim::rpc::engine::{Response, RpcEngine};
use pumpsim::rpc::io_task;
use pumpsim::rpc::points::PointValue;

use super::mock_ports::{ManualClock, RecordingSink, ScriptedRng};

struct Server {
    app: AppService,
    rpc: RpcEngine,
    rng: ScriptedRng,
    clock: ManualClock,
    sink: RecordingSink,
}

impl Server {
    fn new() -> Self {
        let app = AppService::new(&PumpConfig::default(), 0.0);
        let rpc = RpcEngine::new(&app.build_telemetry());
        Self {
            app,
            rpc,
            rng: ScriptedRng::new(),
            clock: ManualClock::at(0.0),
            sink: RecordingSink::new(),
        }
    }

    fn request(&mut self, req: Value) -> Response {
        let payload = serde_json::to_vec(&req).unwrap();
        self.rpc.handle(&payload, &mut self.app, &mut self.sink)
    }

    fn tick(&mut self) {
        self.clock.advance(self.app.update_interval_secs());
        self.app.tick(&mut self.rng, &self.clock, &mut self.sink);
        self.rpc.refresh(&self.app.build_telemetry());
    }

    fn read(&mut self, path: &str) -> Value {
        let r = self.request(json!({"op": "read", "id": 1, "path": path}));
        assert!(r.ok, "read {path}: {:?}", r.error);
        r.value.unwrap()
    }
}

#[test]
fn points_follow_ticks() {
    let mut srv = Server::new();
    assert_eq!(srv.read("Pump01.operatingLevel"), json!(0));
    assert_eq!(srv.read("Pump01.status"), json!("Idle"));

    srv.tick();
    assert_eq!(srv.read("Pump01.operatingLevel"), json!(5));
    assert_eq!(srv.read("Pump01.status"), json!("Running"));
    assert_eq!(srv.read("Pump01.runHours"), json!(0));
    assert_eq!(srv.read("Pump01.defaultOperatingLevel"), json!(75));
}

#[test]
fn call_then_tick_publishes_the_command() {
    let mut srv = Server::new();
    let r = srv.request(json!({
        "op": "call", "id": 4, "object": "Pump01",
        "method": "setOperatingLevel", "args": [40]
    }));
    assert_eq!(r.id, Some(4));
    assert_eq!(r.value, Some(json!(40)));

    srv.tick();
    assert_eq!(srv.read("Pump01.lastCommand"), json!("setOperatingLevel(40)"));
    assert_eq!(srv.read("Pump01.commandSuccess"), json!(true));
}

#[test]
fn reset_filter_audit_clears_after_tick() {
    let mut srv = Server::new();
    let r = srv.request(json!({
        "op": "call", "id": 1, "object": "Pump01", "method": "resetFilter"
    }));
    assert_eq!(r.value, Some(json!(true)));
    srv.tick();
    assert_eq!(srv.read("Pump01.lastCommand"), json!("None"));
}

#[test]
fn update_interval_round_trips_through_points() {
    let mut srv = Server::new();
    let r = srv.request(json!({
        "op": "call", "id": 1, "object": "ServerConfig",
        "method": "setUpdateInterval", "args": [0.5]
    }));
    assert_eq!(r.value, Some(json!(true)));
    srv.tick();
    assert_eq!(srv.read("ServerConfig.updateInterval"), json!(0.5));

    let r = srv.request(json!({
        "op": "call", "id": 2, "object": "ServerConfig",
        "method": "setUpdateInterval", "args": [90]
    }));
    assert_eq!(r.value, Some(json!(false)));
    assert_eq!(srv.app.update_interval_secs(), 0.5);
}

#[test]
fn client_writes_do_not_survive_refresh() {
    let mut srv = Server::new();
    let r = srv.request(json!({
        "op": "write", "id": 1, "path": "Pump01.filterState", "value": 3
    }));
    assert!(r.ok);
    assert_eq!(
        srv.rpc.points().read("Pump01.filterState"),
        Some(&PointValue::Int(3))
    );
    // The simulation itself is untouched.
    assert_eq!(srv.app.snapshot().filter_state, 100.0);

    srv.tick();
    assert_eq!(srv.read("Pump01.filterState"), json!(99));
}

#[test]
fn malformed_json_is_rejected_without_id() {
    let mut srv = Server::new();
    let r = srv.rpc.handle(b"not json", &mut srv.app, &mut srv.sink);
    assert!(!r.ok);
    assert_eq!(r.id, None);
    assert_eq!(r.error.as_deref(), Some("protocol: malformed request"));
}

// ── Loopback over TCP ────────────────────────────────────────

fn read_frame(stream: &mut TcpStream) -> Vec<u8> {
    let mut header = [0u8; HEADER_SIZE];
    stream.read_exact(&mut header).unwrap();
    let mut body = vec![0u8; u32::from_le_bytes(header) as usize];
    stream.read_exact(&mut body).unwrap();
    body
}

#[test]
fn tcp_round_trip_through_io_thread() {
    let transport = TcpTransport::bind(0).unwrap();
    let addr = transport.local_addr().unwrap();
    io_task::spawn(transport).unwrap();

    let mut client = TcpStream::connect(addr).unwrap();
    client
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();

    let payload = br#"{"op":"call","id":11,"object":"Pump01","method":"stopPump"}"#;
    let mut wire = [0u8; 128];
    let n = encode_frame(payload, &mut wire).unwrap();
    client.write_all(&wire[..n]).unwrap();

    let mut srv = Server::new();
    let deadline = Instant::now() + Duration::from_secs(5);
    let msg = loop {
        if let Some(msg) = try_recv_command() {
            break msg;
        }
        assert!(Instant::now() < deadline, "frame never reached the control loop");
        std::thread::sleep(Duration::from_millis(5));
    };
    assert_eq!(&msg.frame[..], &payload[..]);

    let frame = srv
        .rpc
        .dispatch(msg.client_id, &msg.frame, &mut srv.app, &mut srv.sink)
        .unwrap();
    send_response(frame);

    let body: Value = serde_json::from_slice(&read_frame(&mut client)).unwrap();
    assert_eq!(body, json!({"id": 11, "ok": true, "value": true}));
    assert_eq!(srv.app.controller().target_level(), 0);
}
