//! The audio sink boundary.
//!
//! DMR audio payloads leave the engine here, byte for byte, in the order
//! their frames arrived. No framing is added, so the sink sees a plain
//! concatenation of payloads. Decoding them is someone else's problem.

use std::io::{self, Write};

/// Consumer of raw DMR audio frame payloads.
pub trait AudioSink: Send {
    /// Writes one frame's payload.
    fn write_frame(&mut self, payload: &[u8]) -> io::Result<()>;
}

/// Any byte writer is a sink. Each frame is flushed right away so a
/// downstream decoder doesn't wait on a buffer.
impl<W: Write + Send> AudioSink for W {
    fn write_frame(&mut self, payload: &[u8]) -> io::Result<()> {
        self.write_all(payload)?;
        self.flush()
    }
}
