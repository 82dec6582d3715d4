//! Fuzz target: `parse_request` and `parse_call`
//!
//! Arbitrary payloads must be rejected with a protocol error, never a
//! panic.  Requests that parse as calls are mapped onto the method table.
//!
//! cargo fuzz run fuzz_request_parser

#![no_main]

use libfuzzer_sys::fuzz_target;
use pumpsim::rpc::engine::{Request, parse_call, parse_request};

fuzz_target!(|data: &[u8]| {
    if let Ok(Request::Call {
        object,
        method,
        args,
        ..
    }) = parse_request(data)
    {
        let _ = parse_call(&object, &method, &args);
    }
});
