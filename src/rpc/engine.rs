//! RPC engine: dispatches JSON requests to the AppService and point table.
//!
//! **Transport-decoupled**: the engine does not own a transport.  The
//! control loop feeds it `(client_id, frame_bytes)` pulled off the
//! command channel and gets back an encoded response frame for the I/O
//! thread.
//!
//! Request shapes:
//!
//! ```text
//! {"id":1,"op":"call","object":"Pump01","method":"setOperatingLevel","args":[50]}
//! {"id":2,"op":"read","path":"Pump01.flow"}
//! {"id":3,"op":"write","path":"Pump01.status","value":"Idle"}
//! {"id":4,"op":"browse"}
//! ```
//!
//! Every response carries the request `id`, `ok`, and a `value` or an
//! `error`.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::app::commands::{CommandOutcome, PumpCommand};
use crate::app::events::TelemetryData;
use crate::app::ports::EventSink;
use crate::app::service::AppService;
use crate::error::{CommandError, Error};

use super::codec::{HEADER_SIZE, MAX_FRAME_SIZE, encode_frame};
use super::points::{PUMP01, PointTable, PointValue, SERVER_CONFIG};

/// Identifies a connected client slot.
pub type ClientId = u8;

/// Encoded response capacity: one full frame plus its header.
pub const MAX_RESPONSE_SIZE: usize = HEADER_SIZE + MAX_FRAME_SIZE;

/// Response frame produced by the engine, tagged with destination client.
pub struct ResponseFrame {
    pub client_id: ClientId,
    pub data: heapless::Vec<u8, MAX_RESPONSE_SIZE>,
}

// ───────────────────────────────────────────────────────────────
// Wire types
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Request {
    Call {
        id: u64,
        object: String,
        method: String,
        #[serde(default)]
        args: Vec<Value>,
    },
    Read {
        id: u64,
        path: String,
    },
    Write {
        id: u64,
        path: String,
        value: PointValue,
    },
    Browse {
        id: u64,
    },
}

impl Request {
    pub fn id(&self) -> u64 {
        match self {
            Self::Call { id, .. }
            | Self::Read { id, .. }
            | Self::Write { id, .. }
            | Self::Browse { id } => *id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    /// `None` when the request was too malformed to carry one.
    pub id: Option<u64>,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    fn value(id: u64, value: Value) -> Self {
        Self {
            id: Some(id),
            ok: true,
            value: Some(value),
            error: None,
        }
    }

    fn error(id: Option<u64>, err: Error) -> Self {
        Self {
            id,
            ok: false,
            value: None,
            error: Some(err.to_string()),
        }
    }
}

/// Parse a request payload.
pub fn parse_request(payload: &[u8]) -> Result<Request, Error> {
    serde_json::from_slice(payload).map_err(|_| Error::Protocol("malformed request"))
}

// ───────────────────────────────────────────────────────────────
// Method table
// ───────────────────────────────────────────────────────────────

/// Invocable methods, as `(object, method)`.
pub const METHODS: [(&str, &str); 8] = [
    (PUMP01, "stopPump"),
    (PUMP01, "startPump"),
    (PUMP01, "setOperatingLevel"),
    (PUMP01, "setFilterDegradationRate"),
    (PUMP01, "setAutoResetMinutes"),
    (PUMP01, "resetFilter"),
    (PUMP01, "changeOil"),
    (SERVER_CONFIG, "setUpdateInterval"),
];

fn no_args(args: &[Value]) -> Result<(), Error> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(Error::Protocol("method takes no arguments"))
    }
}

fn int_arg(args: &[Value]) -> Result<i64, Error> {
    match args {
        [v] => v.as_i64().ok_or(Error::Protocol("expected integer argument")),
        _ => Err(Error::Protocol("expected one argument")),
    }
}

fn float_arg(args: &[Value]) -> Result<f64, Error> {
    match args {
        [v] => v.as_f64().ok_or(Error::Protocol("expected numeric argument")),
        _ => Err(Error::Protocol("expected one argument")),
    }
}

/// Map an invocation onto a [`PumpCommand`].
pub fn parse_call(object: &str, method: &str, args: &[Value]) -> Result<PumpCommand, Error> {
    let cmd = match (object, method) {
        (PUMP01, "stopPump") => no_args(args).map(|()| PumpCommand::Stop)?,
        (PUMP01, "startPump") => no_args(args).map(|()| PumpCommand::Start)?,
        (PUMP01, "setOperatingLevel") => PumpCommand::SetOperatingLevel(int_arg(args)?),
        (PUMP01, "setFilterDegradationRate") => {
            PumpCommand::SetFilterDegradationRate(float_arg(args)?)
        }
        (PUMP01, "setAutoResetMinutes") => PumpCommand::SetAutoResetMinutes(float_arg(args)?),
        (PUMP01, "resetFilter") => no_args(args).map(|()| PumpCommand::ResetFilter)?,
        (PUMP01, "changeOil") => no_args(args).map(|()| PumpCommand::ChangeOil)?,
        (SERVER_CONFIG, "setUpdateInterval") => PumpCommand::SetUpdateInterval(float_arg(args)?),
        _ => return Err(Error::Protocol("unknown method")),
    };
    Ok(cmd)
}

/// Method return value: the applied level (or -1) for
/// `setOperatingLevel`, success as a boolean for everything else.
fn call_result(cmd: PumpCommand, result: Result<CommandOutcome, CommandError>) -> Value {
    match (cmd, result) {
        (_, Ok(CommandOutcome::Level(l))) => Value::from(l),
        (PumpCommand::SetOperatingLevel(_), Err(_)) => Value::from(-1),
        (_, Ok(CommandOutcome::Applied)) => Value::Bool(true),
        (_, Err(_)) => Value::Bool(false),
    }
}

// ───────────────────────────────────────────────────────────────
// Engine
// ───────────────────────────────────────────────────────────────

/// Transport-decoupled RPC engine owning the point table.
pub struct RpcEngine {
    points: PointTable,
    requests: u64,
    rejected: u64,
}

impl RpcEngine {
    pub fn new(initial: &TelemetryData) -> Self {
        Self {
            points: PointTable::new(initial),
            requests: 0,
            rejected: 0,
        }
    }

    /// Publish fresh telemetry into the point table.
    pub fn refresh(&mut self, telemetry: &TelemetryData) {
        self.points.refresh(telemetry);
    }

    pub fn points(&self) -> &PointTable {
        &self.points
    }

    /// Requests handled / rejected with a protocol error.
    pub fn stats(&self) -> (u64, u64) {
        (self.requests, self.rejected)
    }

    /// Dispatch a complete frame from `client_id`.  Returns the encoded
    /// response frame.
    pub fn dispatch(
        &mut self,
        client_id: ClientId,
        frame: &[u8],
        app: &mut AppService,
        sink: &mut impl EventSink,
    ) -> Option<ResponseFrame> {
        let response = self.handle(frame, app, sink);
        let payload = match serde_json::to_vec(&response) {
            Ok(p) => p,
            Err(e) => {
                warn!("RPC[{}]: response serialisation failed: {}", client_id, e);
                return None;
            }
        };
        let mut data = heapless::Vec::new();
        if data.resize(HEADER_SIZE + payload.len(), 0).is_err() {
            warn!("RPC[{}]: response too large ({} bytes)", client_id, payload.len());
            return None;
        }
        let n = encode_frame(&payload, &mut data)?;
        data.truncate(n);
        Some(ResponseFrame { client_id, data })
    }

    /// Handle a request payload and build the response.
    pub fn handle(
        &mut self,
        payload: &[u8],
        app: &mut AppService,
        sink: &mut impl EventSink,
    ) -> Response {
        self.requests += 1;
        let request = match parse_request(payload) {
            Ok(r) => r,
            Err(e) => {
                self.rejected += 1;
                let id = serde_json::from_slice::<Value>(payload)
                    .ok()
                    .and_then(|v| v.get("id").and_then(Value::as_u64));
                warn!("RPC: {}", e);
                return Response::error(id, e);
            }
        };
        let id = request.id();
        debug!("RPC: request {:?}", request);

        let result = match request {
            Request::Call {
                object,
                method,
                args,
                ..
            } => parse_call(&object, &method, &args).map(|cmd| {
                info!("RPC: {}.{} called", object, method);
                let result = app.handle_command(cmd, sink);
                call_result(cmd, result)
            }),
            Request::Read { path, .. } => self
                .points
                .read(&path)
                .ok_or(Error::Protocol("unknown point"))
                .and_then(|v| {
                    serde_json::to_value(v).map_err(|_| Error::Protocol("unencodable value"))
                }),
            Request::Write { path, value, .. } => {
                self.points.write(&path, value).map(|()| Value::Bool(true))
            }
            Request::Browse { .. } => Ok(serde_json::json!({
                "points": self.points.browse(),
                "methods": METHODS
                    .iter()
                    .map(|(o, m)| format!("{o}.{m}"))
                    .collect::<Vec<_>>(),
            })),
        };

        match result {
            Ok(value) => Response::value(id, value),
            Err(e) => {
                self.rejected += 1;
                warn!("RPC: request {} rejected: {}", id, e);
                Response::error(Some(id), e)
            }
        }
    }
}
