//! PumpSim library.
//!
//! Exposes the simulation core, the operator controller and the RPC
//! presentation layer for the binary, integration tests and fuzzing.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod control;
pub mod error;
pub mod rpc;
pub mod safety;
pub mod sim;
