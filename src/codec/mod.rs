//! Streaming message I/O over blocking byte transports.

mod control;
mod reader;
mod writer;

pub use control::{ControlFrame, ControlHandler, PongResponder};
pub use reader::{read_message, MessageReader};
pub use writer::{
    write_close, write_control, write_ping, write_pong, FrameWriter, MessageWriter,
};
