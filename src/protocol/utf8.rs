//! Incremental UTF-8 validation for text messages (RFC 6455 Section 8.1).
//!
//! Text payloads arrive in arbitrary chunks: a read may end mid code point,
//! and a code point may straddle two fragments of a message. The validator
//! carries the 0–3 bytes of an incomplete sequence between calls so the
//! split never matters.

use crate::error::{Error, Result};

/// How many bytes the sequence led by `lead` occupies.
///
/// Only called for bytes that already passed a partial scan, so anything
/// unrecognized collapses to 1 and fails full validation immediately after.
const fn sequence_len(lead: u8) -> usize {
    match lead {
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => 1,
    }
}

/// Streaming UTF-8 validator.
///
/// Feed payload chunks in order with [`feed`](Utf8Validator::feed); call
/// [`finish`](Utf8Validator::finish) at message end to reject a trailing
/// partial code point.
#[derive(Debug, Clone, Default)]
pub struct Utf8Validator {
    carry: [u8; 4],
    carry_len: u8,
}

impl Utf8Validator {
    /// Create a validator with an empty carry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the next chunk of the stream.
    ///
    /// A partial multi-byte sequence at the end of `data` is saved as the
    /// carry and completed by the next call.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidUtf8` on any malformed sequence: illegal lead
    /// byte, invalid continuation byte, overlong encoding, surrogate, or a
    /// code point above U+10FFFF.
    pub fn feed(&mut self, mut data: &[u8]) -> Result<()> {
        if self.carry_len > 0 {
            let len = self.carry_len as usize;
            let expected = sequence_len(self.carry[0]);
            let take = (expected - len).min(data.len());
            self.carry[len..len + take].copy_from_slice(&data[..take]);
            self.carry_len += take as u8;
            data = &data[take..];

            if (self.carry_len as usize) < expected {
                // Still partial; the absorbed bytes must at least be
                // continuation bytes or the sequence can never complete.
                if self.carry[1..self.carry_len as usize]
                    .iter()
                    .any(|b| b & 0xC0 != 0x80)
                {
                    return Err(Error::InvalidUtf8);
                }
                return Ok(());
            }

            if std::str::from_utf8(&self.carry[..expected]).is_err() {
                return Err(Error::InvalidUtf8);
            }
            self.carry_len = 0;
        }

        match std::str::from_utf8(data) {
            Ok(_) => Ok(()),
            Err(err) => {
                if err.error_len().is_none() {
                    // Incomplete sequence at the end of the chunk; from_utf8
                    // guarantees it is at most 3 bytes.
                    let tail = &data[err.valid_up_to()..];
                    self.carry[..tail.len()].copy_from_slice(tail);
                    self.carry_len = tail.len() as u8;
                    Ok(())
                } else {
                    Err(Error::InvalidUtf8)
                }
            }
        }
    }

    /// Assert that the stream ended on a code-point boundary.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidUtf8` if a partial code point is pending.
    pub fn finish(&self) -> Result<()> {
        if self.carry_len > 0 {
            Err(Error::InvalidUtf8)
        } else {
            Ok(())
        }
    }

    /// Whether a partial code point is pending.
    #[must_use]
    pub fn has_partial(&self) -> bool {
        self.carry_len > 0
    }

    /// The pending partial code point bytes (0–3 of them).
    #[must_use]
    pub fn partial(&self) -> &[u8] {
        &self.carry[..self.carry_len as usize]
    }
}
