//! Application core: pure domain logic, zero I/O.
//!
//! This module wires the pump controller and simulation engine into a
//! tick-driven service.  All interaction with the outside world happens
//! through **port traits** defined in [`ports`], keeping this layer fully
//! testable with scripted randomness and a manual clock.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
