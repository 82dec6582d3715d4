//! Transport-agnostic RPC subsystem.
//!
//! Length-prefixed JSON requests expose the pump's operator methods and
//! a browsable point table to remote clients.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                       RPC Stack                          │
//! │                                                          │
//! │  ┌───────────┐   ┌──────────┐   ┌─────────────────────┐  │
//! │  │ Transport │──▶│  Codec   │──▶│ Engine (dispatcher) │  │
//! │  │ (trait)   │   │ (framing)│   │  → AppService       │  │
//! │  └───────────┘   └──────────┘   │  → PointTable       │  │
//! │       ▲                         └─────────────────────┘  │
//! │       │        ResponseMsg                 │             │
//! │       └────────────────────────────────────┘             │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The I/O task owns the transport on its own thread; the control loop
//! owns the engine.  [`channels`] carries frames between the two.

pub mod channels;
pub mod codec;
pub mod engine;
pub mod io_task;
pub mod points;
pub mod transport;
