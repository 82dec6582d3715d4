//! Integration test driver for the `tests/integration/` submodules.
//!
//! Each `mod` below maps to a file that exercises a subsystem against
//! scripted adapters.  No sockets or wall-clock waits are involved.

mod mock_ports;
mod rpc_tests;
mod scenario_tests;
