//! Wire-level protocol leaves (RFC 6455).

pub mod handshake;
pub mod header;
pub mod mask;
pub mod opcode;
pub mod utf8;

pub use handshake::{compute_accept_key, generate_key, ClientHandshake, WS_GUID};
pub use header::{FrameHeader, PayloadLength, MAX_CONTROL_PAYLOAD, MAX_HEADER_LEN};
pub use mask::apply_mask;
pub use opcode::OpCode;
pub use utf8::Utf8Validator;
