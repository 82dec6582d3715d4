//! Length-prefix frame codec.
//!
//! Wire format:
//! ```text
//! ┌────────────┬──────────────────────────┐
//! │ Length (4B)│ JSON payload (N B)       │
//! │ LE u32     │                          │
//! └────────────┴──────────────────────────┘
//! ```
//!
//! The decoder accumulates incoming bytes and yields complete frames.
//! A single read may carry part of a header, part of a payload, or
//! several frames back to back; [`FrameDecoder::feed`] reports how many
//! bytes it consumed so the caller can keep feeding the remainder.

use log::warn;

/// Maximum frame payload size (protects against memory exhaustion).
pub const MAX_FRAME_SIZE: usize = 4096;

/// Frame header size (4-byte little-endian length).
pub const HEADER_SIZE: usize = 4;

/// Decoder state machine.
enum DecoderState {
    /// Waiting for header bytes.
    ReadingHeader { collected: usize },
    /// Header received, reading payload.
    ReadingPayload { expected: usize, collected: usize },
    /// Oversize frame announced; dropping its payload.
    Skipping { remaining: usize },
}

/// Streaming frame decoder.
pub struct FrameDecoder {
    state: DecoderState,
    header_buf: [u8; HEADER_SIZE],
    payload_buf: Box<[u8; MAX_FRAME_SIZE]>,
    dropped: u32,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self {
            state: DecoderState::ReadingHeader { collected: 0 },
            header_buf: [0; HEADER_SIZE],
            payload_buf: Box::new([0; MAX_FRAME_SIZE]),
            dropped: 0,
        }
    }

    /// Feed bytes into the decoder.
    ///
    /// Returns the number of bytes consumed and, when a frame completed,
    /// its payload.  Consumption stops right after a completed frame; the
    /// payload slice is valid until the next call.
    pub fn feed(&mut self, data: &[u8]) -> (usize, Option<&[u8]>) {
        let mut offset = 0;

        while offset < data.len() {
            let available = data.len() - offset;
            match &mut self.state {
                DecoderState::ReadingHeader { collected } => {
                    let to_copy = (HEADER_SIZE - *collected).min(available);
                    self.header_buf[*collected..*collected + to_copy]
                        .copy_from_slice(&data[offset..offset + to_copy]);
                    *collected += to_copy;
                    offset += to_copy;

                    if *collected == HEADER_SIZE {
                        let expected = u32::from_le_bytes(self.header_buf) as usize;
                        self.state = if expected == 0 {
                            DecoderState::ReadingHeader { collected: 0 }
                        } else if expected > MAX_FRAME_SIZE {
                            warn!("codec: dropping oversize frame ({} bytes)", expected);
                            self.dropped = self.dropped.saturating_add(1);
                            DecoderState::Skipping {
                                remaining: expected,
                            }
                        } else {
                            DecoderState::ReadingPayload {
                                expected,
                                collected: 0,
                            }
                        };
                    }
                }

                DecoderState::ReadingPayload { expected, collected } => {
                    let to_copy = (*expected - *collected).min(available);
                    self.payload_buf[*collected..*collected + to_copy]
                        .copy_from_slice(&data[offset..offset + to_copy]);
                    *collected += to_copy;
                    offset += to_copy;

                    if *collected == *expected {
                        let len = *expected;
                        self.state = DecoderState::ReadingHeader { collected: 0 };
                        return (offset, Some(&self.payload_buf[..len]));
                    }
                }

                DecoderState::Skipping { remaining } => {
                    let to_skip = (*remaining).min(available);
                    *remaining -= to_skip;
                    offset += to_skip;
                    if *remaining == 0 {
                        self.state = DecoderState::ReadingHeader { collected: 0 };
                    }
                }
            }
        }

        (offset, None)
    }

    /// Feed a whole buffer, handing every completed frame to `on_frame`.
    pub fn feed_all(&mut self, mut data: &[u8], mut on_frame: impl FnMut(&[u8])) {
        while !data.is_empty() {
            let (used, frame) = self.feed(data);
            if let Some(frame) = frame {
                on_frame(frame);
            }
            data = &data[used..];
        }
    }

    /// Frames discarded for exceeding [`MAX_FRAME_SIZE`].
    pub fn dropped_frames(&self) -> u32 {
        self.dropped
    }

    /// Reset decoder state (e.g. after a client reconnects).
    pub fn reset(&mut self) {
        self.state = DecoderState::ReadingHeader { collected: 0 };
    }
}

/// Encode a payload into a length-prefixed frame.
///
/// Writes `[LE-u32 length][payload]` into `out_buf`.
/// Returns the total number of bytes written.
pub fn encode_frame(payload: &[u8], out_buf: &mut [u8]) -> Option<usize> {
    let total = HEADER_SIZE + payload.len();
    if total > out_buf.len() || payload.len() > MAX_FRAME_SIZE {
        return None;
    }

    let len_bytes = u32::try_from(payload.len()).ok()?.to_le_bytes();
    out_buf[..HEADER_SIZE].copy_from_slice(&len_bytes);
    out_buf[HEADER_SIZE..total].copy_from_slice(payload);

    Some(total)
}
