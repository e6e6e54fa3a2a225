//! Message kinds and close status codes (RFC 6455 Sections 5.6 and 7.4).

use crate::error::{Error, Result};
use crate::protocol::OpCode;

/// The kind of a data message, fixed by its first frame's opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// UTF-8 text message.
    Text,
    /// Arbitrary binary message.
    Binary,
}

impl MessageKind {
    /// The opcode carried by the message's first frame.
    #[inline]
    #[must_use]
    pub const fn opcode(self) -> OpCode {
        match self {
            MessageKind::Text => OpCode::Text,
            MessageKind::Binary => OpCode::Binary,
        }
    }

    /// The kind a first-frame opcode maps to, if it starts a message.
    #[must_use]
    pub const fn from_opcode(opcode: OpCode) -> Option<Self> {
        match opcode {
            OpCode::Text => Some(MessageKind::Text),
            OpCode::Binary => Some(MessageKind::Binary),
            _ => None,
        }
    }

    /// Whether payload bytes must be validated as UTF-8.
    #[inline]
    #[must_use]
    pub const fn is_text(self) -> bool {
        matches!(self, MessageKind::Text)
    }
}

/// Close status code per RFC 6455 Section 7.4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum CloseCode {
    /// 1000, normal closure.
    #[default]
    Normal,
    /// 1001, endpoint is going away.
    GoingAway,
    /// 1002, protocol violation.
    ProtocolError,
    /// 1003, received a data type the endpoint cannot accept.
    UnsupportedData,
    /// 1005, no status code was present. Local reporting only.
    NoStatusReceived,
    /// 1006, the connection closed abnormally. Local reporting only.
    Abnormal,
    /// 1007, payload inconsistent with the message type (e.g. bad UTF-8).
    InvalidPayload,
    /// 1008, message violates the endpoint's policy.
    PolicyViolation,
    /// 1009, message too large to process.
    MessageTooBig,
    /// 1010, client expected the server to negotiate an extension.
    MandatoryExtension,
    /// 1015, TLS handshake failure. Local reporting only.
    TlsHandshake,
    /// Any other code, including the 3000–3999 registered and 4000–4999
    /// private ranges.
    Other(u16),
}

impl CloseCode {
    /// Map a wire value to a close code.
    #[must_use]
    pub const fn from_u16(code: u16) -> Self {
        match code {
            1000 => CloseCode::Normal,
            1001 => CloseCode::GoingAway,
            1002 => CloseCode::ProtocolError,
            1003 => CloseCode::UnsupportedData,
            1005 => CloseCode::NoStatusReceived,
            1006 => CloseCode::Abnormal,
            1007 => CloseCode::InvalidPayload,
            1008 => CloseCode::PolicyViolation,
            1009 => CloseCode::MessageTooBig,
            1010 => CloseCode::MandatoryExtension,
            1015 => CloseCode::TlsHandshake,
            other => CloseCode::Other(other),
        }
    }

    /// The wire value of this close code.
    #[must_use]
    pub const fn as_u16(&self) -> u16 {
        match self {
            CloseCode::Normal => 1000,
            CloseCode::GoingAway => 1001,
            CloseCode::ProtocolError => 1002,
            CloseCode::UnsupportedData => 1003,
            CloseCode::NoStatusReceived => 1005,
            CloseCode::Abnormal => 1006,
            CloseCode::InvalidPayload => 1007,
            CloseCode::PolicyViolation => 1008,
            CloseCode::MessageTooBig => 1009,
            CloseCode::MandatoryExtension => 1010,
            CloseCode::TlsHandshake => 1015,
            CloseCode::Other(code) => *code,
        }
    }

    /// Whether this code may appear in a close frame on the wire.
    ///
    /// Sendable: 1000–1003, 1007–1010, and the 3000–4999 application
    /// ranges. Everything else (1005, 1006, 1015 and all unassigned
    /// values) is reserved for local reporting.
    #[must_use]
    pub const fn is_sendable(&self) -> bool {
        matches!(self.as_u16(), 1000..=1003 | 1007..=1010 | 3000..=4999)
    }
}

impl std::fmt::Display for CloseCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_u16())
    }
}

/// Parsed close-frame payload: status code plus optional UTF-8 reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseFrame {
    /// The close status code.
    pub code: CloseCode,
    /// Human-readable reason, at most 123 bytes of UTF-8 on the wire.
    pub reason: String,
}

impl CloseFrame {
    /// Create a close frame with the given code and reason.
    #[must_use]
    pub fn new(code: CloseCode, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
        }
    }

    /// Parse a close-frame payload. An empty payload is valid and means no
    /// status code was supplied.
    ///
    /// # Errors
    ///
    /// - `Error::MalformedClosePayload` for a 1-byte payload
    /// - `Error::InvalidCloseCode` when the code is reserved for local
    ///   reporting and must not appear on the wire
    /// - `Error::InvalidUtf8` when the reason is not valid UTF-8
    pub fn parse(payload: &[u8]) -> Result<Option<Self>> {
        match payload {
            [] => Ok(None),
            [_] => Err(Error::MalformedClosePayload),
            [hi, lo, reason @ ..] => {
                let code = u16::from_be_bytes([*hi, *lo]);
                if !CloseCode::from_u16(code).is_sendable() {
                    return Err(Error::InvalidCloseCode(code));
                }
                let reason = std::str::from_utf8(reason).map_err(|_| Error::InvalidUtf8)?;
                Ok(Some(Self::new(CloseCode::from_u16(code), reason)))
            }
        }
    }

    /// Encode this frame as a close payload: big-endian status code
    /// followed by the reason bytes.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidCloseCode` when the code is not sendable
    /// - `Error::ControlFrameTooLarge` when the reason exceeds 123 bytes
    pub fn encode(&self) -> Result<Vec<u8>> {
        if !self.code.is_sendable() {
            return Err(Error::InvalidCloseCode(self.code.as_u16()));
        }
        let reason = self.reason.as_bytes();
        if reason.len() > 123 {
            return Err(Error::ControlFrameTooLarge(2 + reason.len() as u64));
        }
        let mut payload = Vec::with_capacity(2 + reason.len());
        payload.extend_from_slice(&self.code.as_u16().to_be_bytes());
        payload.extend_from_slice(reason);
        Ok(payload)
    }
}
