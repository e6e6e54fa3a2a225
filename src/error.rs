//! Error types for the WebSocket codec.
//!
//! The taxonomy distinguishes transport failures from protocol violations,
//! payload violations, and peer-initiated close, because a connection layer
//! reacts differently to each: protocol violations fail the connection with
//! close code 1002, bad text payloads with 1007, oversized frames with 1009.

use thiserror::Error;

use crate::message::{CloseCode, CloseFrame};
use crate::protocol::OpCode;

/// Result type alias for WebSocket codec operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading or writing WebSocket messages.
///
/// The enum is `Clone + PartialEq` so that a reader can latch the first
/// failure and replay it on every subsequent call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// The transport reached end of stream mid-frame, or a short write
    /// occurred. Also returned when writing past a single-frame writer's
    /// declared length.
    #[error("end of stream")]
    EndOfStream,

    /// Transport-level I/O failure other than end of stream. The original
    /// cause is preserved as text rather than collapsed.
    #[error("I/O error: {0}")]
    Io(String),

    /// A reserved header bit was set without a negotiated extension.
    #[error("reserved bits set without negotiated extension")]
    ReservedBitsSet,

    /// The frame carried an opcode outside the RFC 6455 enumeration.
    #[error("reserved opcode: {0:#x}")]
    ReservedOpcode(u8),

    /// A control frame arrived with FIN=0.
    #[error("control frames cannot be fragmented")]
    FragmentedControlFrame,

    /// A control frame declared more than 125 payload bytes, or used an
    /// extended length form (control frames always use the short form).
    #[error("control frame payload of {0} bytes exceeds the 125-byte limit")]
    ControlFrameTooLarge(u64),

    /// A continuation frame arrived with no message in progress.
    #[error("continuation frame without a preceding data frame")]
    UnexpectedContinuation,

    /// A data frame other than continuation arrived mid-message.
    #[error("expected continuation frame, got {0}")]
    ExpectedContinuation(OpCode),

    /// A text payload was not valid UTF-8, or the message ended on a
    /// partial code point.
    #[error("invalid UTF-8 in text message")]
    InvalidUtf8,

    /// A frame declared a payload larger than this host can address.
    #[error("payload length {size} exceeds addressable memory")]
    PayloadTooLong {
        /// The declared payload length.
        size: u64,
    },

    /// A close frame carried a status code that must not appear on the wire.
    #[error("close code {0} must not appear on the wire")]
    InvalidCloseCode(u16),

    /// A close frame carried a 1-byte payload, which cannot hold a status code.
    #[error("close frame payload too short to hold a status code")]
    MalformedClosePayload,

    /// The peer sent a close frame. Carries the parsed status and reason,
    /// if any, so the caller can complete the closing handshake.
    #[error("peer sent a close frame")]
    ReceivedCloseFrame(Option<CloseFrame>),

    /// The control handler failed to write its response (pong emission);
    /// the connection is unsalvageable.
    #[error("failed to write control frame response")]
    ControlResponseFailed,

    /// The HTTP upgrade handshake was malformed or did not verify.
    #[error("invalid handshake: {0}")]
    InvalidHandshake(String),
}

impl Error {
    /// The close code a connection layer should fail with on this error,
    /// or `None` when the error does not call for a connection failure
    /// (transport loss, peer close, handshake problems).
    #[must_use]
    pub const fn close_code(&self) -> Option<CloseCode> {
        match self {
            Error::ReservedBitsSet
            | Error::ReservedOpcode(_)
            | Error::FragmentedControlFrame
            | Error::ControlFrameTooLarge(_)
            | Error::UnexpectedContinuation
            | Error::ExpectedContinuation(_)
            | Error::InvalidCloseCode(_)
            | Error::MalformedClosePayload => Some(CloseCode::ProtocolError),
            Error::InvalidUtf8 => Some(CloseCode::InvalidPayload),
            Error::PayloadTooLong { .. } => Some(CloseCode::MessageTooBig),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::UnexpectedEof | std::io::ErrorKind::WriteZero => Error::EndOfStream,
            _ => Error::Io(err.to_string()),
        }
    }
}

impl From<getrandom::Error> for Error {
    fn from(err: getrandom::Error) -> Self {
        Error::Io(format!("system randomness unavailable: {err}"))
    }
}
