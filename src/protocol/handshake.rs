//! Client-side upgrade-key utilities (RFC 6455 Section 4).
//!
//! The HTTP transport for the opening handshake lives outside this crate;
//! these helpers cover the parts the codec's callers cannot get wrong
//! silently: nonce generation, the accept-key derivation, and verification
//! of the server's `101` response.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use sha1::{Digest, Sha1};
use std::collections::HashMap;

use crate::error::{Error, Result};

/// The GUID appended to the client key in the Sec-WebSocket-Accept
/// derivation (RFC 6455 Section 1.3).
pub const WS_GUID: &str = "258EAFA5-E914-47DA-95CA-C5AB0DC85B11";

/// Compute the `Sec-WebSocket-Accept` value for a client key:
/// `base64(SHA1(key || GUID))`.
///
/// # Example
///
/// ```
/// use wsstream::protocol::handshake::compute_accept_key;
///
/// let accept = compute_accept_key("dGhlIHNhbXBsZSBub25jZQ==");
/// assert_eq!(accept, "s3pPLMBiTxaQ9kYGzzhZRbK+xOo=");
/// ```
#[must_use]
pub fn compute_accept_key(key: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(key.as_bytes());
    hasher.update(WS_GUID.as_bytes());
    BASE64.encode(hasher.finalize())
}

/// Generate a fresh `Sec-WebSocket-Key`: base64 of 16 CSPRNG bytes.
///
/// # Errors
///
/// Returns [`Error::Io`] if the system randomness source fails.
pub fn generate_key() -> Result<String> {
    let mut nonce = [0u8; 16];
    getrandom::getrandom(&mut nonce)?;
    Ok(BASE64.encode(nonce))
}

/// Parse HTTP header lines into a case-insensitive map, rejecting
/// duplicates of security-critical headers.
fn parse_headers<'a, I>(lines: I, security_headers: &[&str]) -> Result<HashMap<String, String>>
where
    I: Iterator<Item = &'a str>,
{
    let mut headers: HashMap<String, String> = HashMap::new();
    for line in lines {
        if line.is_empty() {
            break;
        }
        let Some((name, value)) = line.split_once(':') else {
            return Err(Error::InvalidHandshake(format!(
                "malformed header line: {line:?}"
            )));
        };
        let name = name.trim().to_lowercase();
        if security_headers.contains(&name.as_str()) && headers.contains_key(&name) {
            return Err(Error::InvalidHandshake(format!("duplicate header: {name}")));
        }
        headers.insert(name, value.trim().to_string());
    }
    Ok(headers)
}

/// One client handshake attempt, pinned to a single nonce.
#[derive(Debug, Clone)]
pub struct ClientHandshake {
    key: String,
}

impl ClientHandshake {
    /// Start a handshake with a fresh random key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the system randomness source fails.
    pub fn new() -> Result<Self> {
        Ok(Self {
            key: generate_key()?,
        })
    }

    /// Start a handshake with a caller-supplied key. Intended for tests
    /// and wire captures.
    #[must_use]
    pub fn with_key(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    /// The `Sec-WebSocket-Key` this handshake sends.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Format the upgrade request for `resource` on `host`.
    #[must_use]
    pub fn request(&self, host: &str, resource: &str) -> String {
        format!(
            "GET {resource} HTTP/1.1\r\n\
             Host: {host}\r\n\
             Upgrade: websocket\r\n\
             Connection: Upgrade\r\n\
             Sec-WebSocket-Key: {key}\r\n\
             Sec-WebSocket-Version: 13\r\n\
             \r\n",
            key = self.key,
        )
    }

    /// Verify the server's response: status `101`, the upgrade headers,
    /// and a `Sec-WebSocket-Accept` matching this handshake's key.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidHandshake` naming the first check that failed.
    pub fn verify_response(&self, response: &str) -> Result<()> {
        let mut lines = response.split("\r\n");
        let status_line = lines
            .next()
            .ok_or_else(|| Error::InvalidHandshake("empty response".into()))?;

        let mut parts = status_line.split_whitespace();
        let version = parts.next().unwrap_or_default();
        let status = parts.next().unwrap_or_default();
        if !version.starts_with("HTTP/1.1") {
            return Err(Error::InvalidHandshake(format!(
                "unexpected HTTP version in {status_line:?}"
            )));
        }
        if status != "101" {
            return Err(Error::InvalidHandshake(format!(
                "expected status 101, got {status}"
            )));
        }

        let headers = parse_headers(lines, &["sec-websocket-accept"])?;

        let upgrade = headers
            .get("upgrade")
            .ok_or_else(|| Error::InvalidHandshake("missing Upgrade header".into()))?;
        if !upgrade.eq_ignore_ascii_case("websocket") {
            return Err(Error::InvalidHandshake(format!(
                "Upgrade header is {upgrade:?}, not websocket"
            )));
        }

        let connection = headers
            .get("connection")
            .ok_or_else(|| Error::InvalidHandshake("missing Connection header".into()))?;
        if !connection
            .split(',')
            .any(|token| token.trim().eq_ignore_ascii_case("upgrade"))
        {
            return Err(Error::InvalidHandshake(format!(
                "Connection header is {connection:?}, not upgrade"
            )));
        }

        let accept = headers
            .get("sec-websocket-accept")
            .ok_or_else(|| Error::InvalidHandshake("missing Sec-WebSocket-Accept".into()))?;
        if *accept != compute_accept_key(&self.key) {
            return Err(Error::InvalidHandshake(
                "Sec-WebSocket-Accept does not match key".into(),
            ));
        }

        Ok(())
    }
}
