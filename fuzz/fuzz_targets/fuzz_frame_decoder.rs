//! Fuzz target: `FrameDecoder::feed_all`
//!
//! Drives arbitrary byte sequences into the streaming frame decoder and
//! asserts that it never panics and only yields non-empty payloads no
//! larger than `MAX_FRAME_SIZE`.  The input is fed twice, split at its
//! first byte, to exercise partial headers.
//!
//! cargo fuzz run fuzz_frame_decoder

#![no_main]

use libfuzzer_sys::fuzz_target;
use pumpsim::rpc::codec::{FrameDecoder, MAX_FRAME_SIZE};

fuzz_target!(|data: &[u8]| {
    let check = |payload: &[u8]| {
        assert!(payload.len() <= MAX_FRAME_SIZE, "payload exceeds MAX_FRAME_SIZE");
        assert!(!payload.is_empty(), "decoder must not yield empty payload");
    };

    let mut decoder = FrameDecoder::new();
    decoder.feed_all(data, check);

    // Same bytes in two reads must yield the same frames.
    decoder.reset();
    let split = data.first().map_or(0, |b| usize::from(*b)).min(data.len());
    let mut whole = Vec::new();
    let mut parts = Vec::new();
    FrameDecoder::new().feed_all(data, |p| whole.push(p.to_vec()));
    decoder.feed_all(&data[..split], |p| parts.push(p.to_vec()));
    decoder.feed_all(&data[split..], |p| parts.push(p.to_vec()));
    assert_eq!(whole, parts);
});
