//! Streaming message reader.
//!
//! [`read_message`] pulls frame headers off the transport, feeding any
//! control frames to the caller's [`ControlHandler`], until a data frame
//! starts a message. The returned [`MessageReader`] then presents the
//! message as a plain byte stream: fragment boundaries are invisible,
//! control frames interleaved between fragments are dispatched on the fly,
//! masked payloads are unmasked in place, and text payloads are validated
//! as UTF-8 incrementally. Payload bytes land directly in the caller's
//! buffer; the reader never assembles a message in memory.

use std::io::{Read, Write};

use crate::codec::control::{ControlFrame, ControlHandler};
use crate::error::{Error, Result};
use crate::message::MessageKind;
use crate::protocol::{apply_mask, FrameHeader, OpCode, Utf8Validator};

/// Reader state. One variant per phase; errors latch in `Failed` so every
/// later `read` reports the same failure.
enum State {
    /// Streaming the current frame's payload.
    InPayload {
        fin: bool,
        mask: Option<[u8; 4]>,
        len: u64,
        idx: u64,
    },
    /// Between fragments, before the next continuation header.
    AwaitingFrame,
    /// The final frame's payload is fully consumed.
    Done,
    /// A failure was observed; replayed on every subsequent read.
    Failed(Error),
}

/// Read frame headers until a data frame arrives, dispatching control
/// frames to `handler` along the way.
fn next_data_header<R, W, H>(
    transport: &mut R,
    handler: &mut H,
    control: &mut W,
) -> Result<FrameHeader>
where
    R: Read,
    W: Write,
    H: ControlHandler<W>,
{
    loop {
        let header = FrameHeader::read_from(transport)?;
        if header.opcode.is_data() {
            return Ok(header);
        }

        if !header.fin {
            return Err(Error::FragmentedControlFrame);
        }
        if header.rsv_set() {
            return Err(Error::ReservedBitsSet);
        }
        // Control payloads fit in the 7-bit field; an extended length form
        // is a violation even when the value it carries is small.
        if !header.length.is_short() {
            return Err(Error::ControlFrameTooLarge(header.payload_len()));
        }

        let mut payload = vec![0u8; header.payload_len() as usize];
        transport.read_exact(&mut payload)?;
        if let Some(key) = header.mask {
            apply_mask(&mut payload, key, 0);
        }

        let frame = ControlFrame::new(header.opcode, payload);
        match handler.handle(&frame, control) {
            Ok(()) => {}
            Err(err @ Error::ReceivedCloseFrame(_)) => return Err(err),
            // Protocol and payload violations keep their identity so the
            // connection layer fails with the right close code.
            Err(err) if err.close_code().is_some() => return Err(err),
            Err(_) => return Err(Error::ControlResponseFailed),
        }
    }
}

/// Begin reading one message from `transport`.
///
/// Control frames arriving before the first data frame are dispatched to
/// `handler`, which receives `control` — the writer end of the same
/// connection — for pong emission. The first data frame fixes the message
/// kind and, via its FIN bit, whether continuation frames will follow.
///
/// # Errors
///
/// - `Error::UnexpectedContinuation` if the first data frame is a
///   continuation
/// - `Error::ReservedBitsSet` if the first data frame has a reserved bit
/// - `Error::ReceivedCloseFrame` if the peer closed before a message began
/// - any error from header decoding or control dispatch
pub fn read_message<'a, R, W, H>(
    transport: &'a mut R,
    mut handler: H,
    control: &'a mut W,
) -> Result<MessageReader<'a, R, W, H>>
where
    R: Read,
    W: Write,
    H: ControlHandler<W>,
{
    let header = next_data_header(transport, &mut handler, control)?;
    if header.rsv_set() {
        return Err(Error::ReservedBitsSet);
    }
    let Some(kind) = MessageKind::from_opcode(header.opcode) else {
        return Err(Error::UnexpectedContinuation);
    };

    Ok(MessageReader {
        transport,
        control,
        handler,
        kind,
        fragmented: !header.fin,
        validator: if kind.is_text() {
            Some(Utf8Validator::new())
        } else {
            None
        },
        state: State::InPayload {
            fin: header.fin,
            mask: header.mask,
            len: header.payload_len(),
            idx: 0,
        },
    })
}

/// A single in-flight message presented as a byte stream.
///
/// The reader exclusively borrows the transport for the message's
/// lifetime. `read` returns 0 only at the true end of the message, never
/// at a fragment boundary; partial reads may return fewer bytes than
/// requested. After a failure the reader is latched: every further call
/// returns the same error.
pub struct MessageReader<'a, R, W, H> {
    transport: &'a mut R,
    control: &'a mut W,
    handler: H,
    kind: MessageKind,
    fragmented: bool,
    validator: Option<Utf8Validator>,
    state: State,
}

impl<'a, R, W, H> MessageReader<'a, R, W, H>
where
    R: Read,
    W: Write,
    H: ControlHandler<W>,
{
    /// The message kind, fixed by the first frame's opcode.
    #[must_use]
    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    /// Whether the first frame had FIN=0, i.e. continuation frames are
    /// part of this message.
    #[must_use]
    pub fn is_fragmented(&self) -> bool {
        self.fragmented
    }

    /// Whether the message has been fully consumed.
    #[must_use]
    pub fn is_done(&self) -> bool {
        matches!(self.state, State::Done)
    }

    /// Read the next payload bytes into `buf`.
    ///
    /// Returns 0 only when the message is complete (or `buf` is empty).
    /// Crossing into a new fragment runs the same control-frame dispatch
    /// as construction, so pings interleaved with the message are answered
    /// without the caller noticing.
    ///
    /// # Errors
    ///
    /// - `Error::EndOfStream` if the transport ends mid-message
    /// - `Error::ExpectedContinuation` / `Error::ReservedBitsSet` on a bad
    ///   follow-up frame
    /// - `Error::InvalidUtf8` on malformed text, including a partial code
    ///   point at message end
    /// - `Error::ReceivedCloseFrame` / `Error::ControlResponseFailed` from
    ///   control dispatch
    ///
    /// All errors latch.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        loop {
            match &mut self.state {
                State::Failed(err) => return Err(err.clone()),
                State::Done => return Ok(0),
                State::AwaitingFrame => {
                    let header =
                        match next_data_header(self.transport, &mut self.handler, self.control) {
                            Ok(header) => header,
                            Err(err) => return self.fail(err),
                        };
                    if header.opcode != OpCode::Continuation {
                        return self.fail(Error::ExpectedContinuation(header.opcode));
                    }
                    if header.rsv_set() {
                        return self.fail(Error::ReservedBitsSet);
                    }
                    self.state = State::InPayload {
                        fin: header.fin,
                        mask: header.mask,
                        len: header.payload_len(),
                        idx: 0,
                    };
                }
                State::InPayload { fin, mask, len, idx } => {
                    if *idx == *len {
                        let fin = *fin;
                        if fin {
                            if let Some(validator) = &self.validator {
                                if let Err(err) = validator.finish() {
                                    return self.fail(err);
                                }
                            }
                            self.state = State::Done;
                        } else {
                            self.state = State::AwaitingFrame;
                        }
                        continue;
                    }
                    if buf.is_empty() {
                        return Ok(0);
                    }

                    let remaining = *len - *idx;
                    let want = if remaining < buf.len() as u64 {
                        remaining as usize
                    } else {
                        buf.len()
                    };
                    let n = match self.transport.read(&mut buf[..want]) {
                        Ok(0) => return self.fail(Error::EndOfStream),
                        Ok(n) => n,
                        Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
                        Err(err) => return self.fail(err.into()),
                    };

                    if let Some(key) = mask {
                        // The offset basis is the payload position, so
                        // chunked reads stay key-aligned.
                        apply_mask(&mut buf[..n], *key, *idx as usize);
                    }
                    *idx += n as u64;

                    if let Some(validator) = &mut self.validator {
                        if let Err(err) = validator.feed(&buf[..n]) {
                            return self.fail(err);
                        }
                    }
                    return Ok(n);
                }
            }
        }
    }

    /// Drain the rest of the message into a `Vec`.
    ///
    /// # Errors
    ///
    /// As [`read`](MessageReader::read).
    pub fn read_to_vec(&mut self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = self.read(&mut chunk)?;
            if n == 0 {
                return Ok(out);
            }
            out.extend_from_slice(&chunk[..n]);
        }
    }

    fn fail(&mut self, err: Error) -> Result<usize> {
        self.state = State::Failed(err.clone());
        Err(err)
    }
}
