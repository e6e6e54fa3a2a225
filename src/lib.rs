//! # wsstream - Streaming WebSocket Frame Codec
//!
//! `wsstream` is the frame codec and message-streamer core of an RFC 6455
//! WebSocket client, built for blocking byte transports.
//!
//! ## Features
//!
//! - **Streaming reader/writer** - messages of any size in bounded memory;
//!   payload bytes move straight between the transport and caller buffers
//! - **Full framing compliance** - bit-exact headers across all three
//!   length forms, masking, fragmentation, and strict validation
//! - **Incremental UTF-8 validation** - text payloads are checked across
//!   arbitrary read and fragment boundaries
//! - **Pluggable control handling** - pings answered mid-message through a
//!   caller-supplied handler capability
//! - **Typed error taxonomy** - protocol violations carry the close code a
//!   connection layer should fail with
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use wsstream::{read_message, FrameWriter, MaskPolicy, MessageKind, PongResponder};
//!
//! // `stream` is any upgraded transport splitting into Read + Write halves.
//! let mut writer = FrameWriter::new(&mut tx, MessageKind::Text, 5, MaskPolicy::client())?;
//! writer.write_all(b"Hello")?;
//!
//! let mut reader = read_message(&mut rx, PongResponder::client(), &mut tx)?;
//! let reply = reader.read_to_vec()?;
//! ```
//!
//! The HTTP upgrade handshake and TLS stay outside the codec; the crate is
//! handed an already-upgraded transport. [`protocol::handshake`] covers the
//! key derivation the upgrade needs.

pub mod codec;
pub mod config;
pub mod error;
pub mod message;
pub mod protocol;

pub use codec::{
    read_message, write_close, write_control, write_ping, write_pong, ControlFrame,
    ControlHandler, FrameWriter, MessageReader, MessageWriter, PongResponder,
};
pub use config::MaskPolicy;
pub use error::{Error, Result};
pub use message::{CloseCode, CloseFrame, MessageKind};
pub use protocol::{FrameHeader, OpCode, PayloadLength, Utf8Validator};

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn test_public_types_are_send() {
        assert_send::<Error>();
        assert_send::<MaskPolicy>();
        assert_send::<MessageKind>();
        assert_send::<CloseCode>();
        assert_send::<CloseFrame>();
        assert_send::<ControlFrame>();
        assert_send::<FrameHeader>();
        assert_send::<OpCode>();
        assert_send::<Utf8Validator>();
        assert_send::<PongResponder>();
    }

    #[test]
    fn test_public_types_are_sync() {
        assert_sync::<Error>();
        assert_sync::<MaskPolicy>();
        assert_sync::<MessageKind>();
        assert_sync::<CloseCode>();
        assert_sync::<CloseFrame>();
        assert_sync::<ControlFrame>();
        assert_sync::<FrameHeader>();
        assert_sync::<OpCode>();
        assert_sync::<Utf8Validator>();
        assert_sync::<PongResponder>();
    }
}
