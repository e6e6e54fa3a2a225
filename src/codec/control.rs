//! Control frames and the handler capability invoked when one arrives
//! mid-read.

use std::io::Write;

use crate::codec::writer::write_control;
use crate::config::MaskPolicy;
use crate::error::{Error, Result};
use crate::message::CloseFrame;
use crate::protocol::{OpCode, MAX_CONTROL_PAYLOAD};

/// A fully received control frame: close, ping, or pong, with its ≤125
/// payload bytes already unmasked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlFrame {
    opcode: OpCode,
    payload: Vec<u8>,
}

impl ControlFrame {
    pub(crate) fn new(opcode: OpCode, payload: Vec<u8>) -> Self {
        debug_assert!(opcode.is_control());
        debug_assert!(payload.len() <= MAX_CONTROL_PAYLOAD);
        Self { opcode, payload }
    }

    /// The control opcode.
    #[must_use]
    pub fn opcode(&self) -> OpCode {
        self.opcode
    }

    /// The frame payload.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Whether this is a ping frame.
    #[must_use]
    pub fn is_ping(&self) -> bool {
        self.opcode == OpCode::Ping
    }

    /// Whether this is a close frame.
    #[must_use]
    pub fn is_close(&self) -> bool {
        self.opcode == OpCode::Close
    }

    /// Parse this frame's payload as a close status and reason. Only
    /// meaningful for close frames.
    ///
    /// # Errors
    ///
    /// As [`CloseFrame::parse`].
    pub fn close_frame(&self) -> Result<Option<CloseFrame>> {
        CloseFrame::parse(&self.payload)
    }
}

/// Reaction to a control frame discovered while reading a message.
///
/// The handler is a capability, not a connection method: it receives the
/// writer end of the transport so it can answer pings, and it is chosen by
/// whoever starts the read. Any `FnMut(&ControlFrame, &mut W) -> Result<()>`
/// closure qualifies, which lets tests pass capturing mocks or panicking
/// stubs.
pub trait ControlHandler<W: Write> {
    /// React to `frame`, optionally writing a response through `sink`.
    ///
    /// # Errors
    ///
    /// Returning [`Error::ReceivedCloseFrame`] or a protocol violation
    /// propagates with its identity; any other failure is reported to the
    /// reading caller as [`Error::ControlResponseFailed`].
    fn handle(&mut self, frame: &ControlFrame, sink: &mut W) -> Result<()>;
}

impl<W: Write, F> ControlHandler<W> for F
where
    F: FnMut(&ControlFrame, &mut W) -> Result<()>,
{
    fn handle(&mut self, frame: &ControlFrame, sink: &mut W) -> Result<()> {
        self(frame, sink)
    }
}

/// The default control handler: answers pings with pongs, ignores pongs,
/// and surfaces close frames as [`Error::ReceivedCloseFrame`].
#[derive(Debug, Clone)]
pub struct PongResponder {
    mask: MaskPolicy,
}

impl PongResponder {
    /// A responder emitting pongs under the given mask policy.
    #[must_use]
    pub fn new(mask: MaskPolicy) -> Self {
        Self { mask }
    }

    /// A responder for the client side (randomly masked pongs).
    #[must_use]
    pub fn client() -> Self {
        Self::new(MaskPolicy::client())
    }

    /// A responder for the server side (unmasked pongs).
    #[must_use]
    pub fn server() -> Self {
        Self::new(MaskPolicy::server())
    }
}

impl<W: Write> ControlHandler<W> for PongResponder {
    fn handle(&mut self, frame: &ControlFrame, sink: &mut W) -> Result<()> {
        match frame.opcode() {
            OpCode::Ping => write_control(sink, OpCode::Pong, frame.payload(), self.mask),
            OpCode::Pong => Ok(()),
            OpCode::Close => Err(Error::ReceivedCloseFrame(frame.close_frame()?)),
            // Data opcodes never reach the handler.
            _ => Ok(()),
        }
    }
}
