//! Streaming message and frame writers.
//!
//! Two shapes cover the write side:
//!
//! - [`FrameWriter`] emits a single frame with a declared payload length,
//!   streamed in as many chunks as the caller likes. Control frames and
//!   any message whose size is known up front use it.
//! - [`MessageWriter`] emits a fragmented message with no length known in
//!   advance: every `write` call becomes one FIN=0 frame on the wire and
//!   [`close`](MessageWriter::close) emits the terminal FIN=1 frame.
//!   Callers should buffer small writes themselves; the one-call-one-frame
//!   mapping is deliberate.
//!
//! When a mask policy is in effect, payload bytes are masked in a scratch
//! buffer before they reach the transport, so the transport never observes
//! unmasked payload.

use std::io::Write;

use crate::config::MaskPolicy;
use crate::error::{Error, Result};
use crate::message::{CloseFrame, MessageKind};
use crate::protocol::{apply_mask, FrameHeader, OpCode, MAX_CONTROL_PAYLOAD};

const SCRATCH_LEN: usize = 4096;

/// Mask `data` through a scratch buffer and write it, with `offset` giving
/// the number of payload bytes of this frame already emitted.
fn write_masked<W: Write>(sink: &mut W, key: [u8; 4], data: &[u8], mut offset: usize) -> Result<()> {
    let mut scratch = [0u8; SCRATCH_LEN];
    for chunk in data.chunks(SCRATCH_LEN) {
        let masked = &mut scratch[..chunk.len()];
        masked.copy_from_slice(chunk);
        apply_mask(masked, key, offset);
        sink.write_all(masked)?;
        offset += chunk.len();
    }
    Ok(())
}

/// Emit one complete frame: header, then the payload masked per policy.
pub(crate) fn write_frame<W: Write>(
    sink: &mut W,
    fin: bool,
    opcode: OpCode,
    payload: &[u8],
    mask: MaskPolicy,
) -> Result<()> {
    let key = mask.key()?;
    FrameHeader::new(fin, opcode, payload.len() as u64, key).write_to(sink)?;
    match key {
        None => sink.write_all(payload)?,
        Some(key) => write_masked(sink, key, payload, 0)?,
    }
    Ok(())
}

/// Write a control frame with the given opcode and payload.
///
/// # Errors
///
/// Returns `Error::ControlFrameTooLarge` when the payload exceeds 125
/// bytes; otherwise propagates transport failures.
pub fn write_control<W: Write>(
    sink: &mut W,
    opcode: OpCode,
    payload: &[u8],
    mask: MaskPolicy,
) -> Result<()> {
    debug_assert!(opcode.is_control());
    if payload.len() > MAX_CONTROL_PAYLOAD {
        return Err(Error::ControlFrameTooLarge(payload.len() as u64));
    }
    write_frame(sink, true, opcode, payload, mask)
}

/// Write a ping frame. Pings are an explicit operation; the codec runs no
/// keepalive timer.
///
/// # Errors
///
/// As [`write_control`].
pub fn write_ping<W: Write>(sink: &mut W, payload: &[u8], mask: MaskPolicy) -> Result<()> {
    write_control(sink, OpCode::Ping, payload, mask)
}

/// Write a pong frame, normally echoing a ping's payload.
///
/// # Errors
///
/// As [`write_control`].
pub fn write_pong<W: Write>(sink: &mut W, payload: &[u8], mask: MaskPolicy) -> Result<()> {
    write_control(sink, OpCode::Pong, payload, mask)
}

/// Write a close frame. `None` sends an empty payload (no status code).
///
/// # Errors
///
/// Returns `Error::InvalidCloseCode` for codes reserved for local
/// reporting and `Error::ControlFrameTooLarge` for reasons over 123 bytes.
pub fn write_close<W: Write>(
    sink: &mut W,
    frame: Option<&CloseFrame>,
    mask: MaskPolicy,
) -> Result<()> {
    let payload = match frame {
        Some(frame) => frame.encode()?,
        None => Vec::new(),
    };
    write_control(sink, OpCode::Close, &payload, mask)
}

/// Writer for a single frame with a declared payload length.
///
/// The FIN=1 header is emitted at construction; `write` then accepts
/// payload bytes up to the declared length. The writer is complete once
/// exactly that many bytes have been written.
pub struct FrameWriter<'a, W: Write> {
    sink: &'a mut W,
    mask: Option<[u8; 4]>,
    payload_len: u64,
    written: u64,
}

impl<'a, W: Write> FrameWriter<'a, W> {
    /// Start an unfragmented data message of `payload_len` bytes. Emits
    /// the header immediately.
    ///
    /// # Errors
    ///
    /// Propagates transport failures and mask-key sourcing failures.
    pub fn new(
        sink: &'a mut W,
        kind: MessageKind,
        payload_len: u64,
        mask: MaskPolicy,
    ) -> Result<Self> {
        Self::with_opcode(sink, kind.opcode(), payload_len, mask)
    }

    /// Start a control frame of `payload_len` bytes for streaming writes.
    ///
    /// # Errors
    ///
    /// Returns `Error::ControlFrameTooLarge` when `payload_len` exceeds
    /// 125; the extended length forms are unrepresentable by construction.
    pub fn control(
        sink: &'a mut W,
        opcode: OpCode,
        payload_len: u64,
        mask: MaskPolicy,
    ) -> Result<Self> {
        debug_assert!(opcode.is_control());
        if payload_len > MAX_CONTROL_PAYLOAD as u64 {
            return Err(Error::ControlFrameTooLarge(payload_len));
        }
        Self::with_opcode(sink, opcode, payload_len, mask)
    }

    fn with_opcode(
        sink: &'a mut W,
        opcode: OpCode,
        payload_len: u64,
        mask: MaskPolicy,
    ) -> Result<Self> {
        let key = mask.key()?;
        FrameHeader::new(true, opcode, payload_len, key).write_to(sink)?;
        Ok(Self {
            sink,
            mask: key,
            payload_len,
            written: 0,
        })
    }

    /// Write up to `declared length - bytes written` bytes from `data`,
    /// returning how many were accepted.
    ///
    /// # Errors
    ///
    /// Returns `Error::EndOfStream` when the declared length has already
    /// been reached and `data` is non-empty; propagates transport failures.
    pub fn write(&mut self, data: &[u8]) -> Result<usize> {
        if data.is_empty() {
            return Ok(0);
        }
        let remaining = self.payload_len - self.written;
        if remaining == 0 {
            return Err(Error::EndOfStream);
        }
        let accept = (data.len() as u64).min(remaining) as usize;
        match self.mask {
            None => self.sink.write_all(&data[..accept])?,
            Some(key) => write_masked(self.sink, key, &data[..accept], self.written as usize)?,
        }
        self.written += accept as u64;
        Ok(accept)
    }

    /// Write all of `data`.
    ///
    /// # Errors
    ///
    /// As [`write`](FrameWriter::write); in particular `Error::EndOfStream`
    /// if `data` overruns the declared length.
    pub fn write_all(&mut self, mut data: &[u8]) -> Result<()> {
        while !data.is_empty() {
            let n = self.write(data)?;
            data = &data[n..];
        }
        Ok(())
    }

    /// Pad the rest of the declared length with zero bytes and finish the
    /// frame. Satisfies the header already on the wire when the caller's
    /// payload source came up short.
    ///
    /// # Errors
    ///
    /// Propagates transport failures.
    pub fn discard(mut self) -> Result<()> {
        const ZEROES: [u8; SCRATCH_LEN] = [0u8; SCRATCH_LEN];
        while self.written < self.payload_len {
            let n = (self.payload_len - self.written).min(SCRATCH_LEN as u64) as usize;
            self.write(&ZEROES[..n])?;
        }
        Ok(())
    }

    /// Bytes still owed against the declared length.
    #[must_use]
    pub fn remaining(&self) -> u64 {
        self.payload_len - self.written
    }

    /// Whether the declared length has been fully written.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.written == self.payload_len
    }
}

/// Writer for a fragmented message of unknown total length.
///
/// Every `write` emits exactly one FIN=0 frame: the first carries the data
/// opcode, the rest `continuation`. The message must be finished with
/// [`close`](MessageWriter::close) or
/// [`close_with`](MessageWriter::close_with), which emit the FIN=1 frame.
pub struct MessageWriter<'a, W: Write> {
    sink: &'a mut W,
    opcode: OpCode,
    mask: MaskPolicy,
}

impl<'a, W: Write> MessageWriter<'a, W> {
    /// Start a fragmented message. Nothing is written until the first
    /// `write` or `close_with`.
    #[must_use]
    pub fn new(sink: &'a mut W, kind: MessageKind, mask: MaskPolicy) -> Self {
        Self {
            sink,
            opcode: kind.opcode(),
            mask,
        }
    }

    /// Emit one non-final fragment carrying `payload`.
    ///
    /// # Errors
    ///
    /// Propagates transport failures.
    pub fn write(&mut self, payload: &[u8]) -> Result<()> {
        let opcode = std::mem::replace(&mut self.opcode, OpCode::Continuation);
        write_frame(self.sink, false, opcode, payload, self.mask)
    }

    /// Emit the terminal FIN=1 frame with an empty payload.
    ///
    /// # Errors
    ///
    /// Propagates transport failures.
    pub fn close(self) -> Result<()> {
        self.close_with(&[])
    }

    /// Emit the terminal FIN=1 frame carrying `payload`. If nothing was
    /// written before, the message goes out as a single unfragmented frame.
    ///
    /// # Errors
    ///
    /// Propagates transport failures.
    pub fn close_with(self, payload: &[u8]) -> Result<()> {
        write_frame(self.sink, true, self.opcode, payload, self.mask)
    }
}
