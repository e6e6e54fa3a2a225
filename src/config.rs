//! Codec configuration.

use crate::error::Result;

/// Masking policy for outgoing frames.
///
/// RFC 6455 requires client-to-server frames to be masked and
/// server-to-client frames to be unmasked. The codec does not enforce a
/// role; callers pick the policy that matches their end of the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskPolicy {
    /// Emit unmasked frames (server side).
    Unmasked,
    /// Draw a fresh 32-bit key per frame from the operating system CSPRNG
    /// (client side).
    Random,
    /// Mask every frame with the given key, serialized big-endian.
    /// Deterministic; intended for tests and wire captures.
    Fixed(u32),
}

impl MaskPolicy {
    /// The policy a client connection should use.
    #[must_use]
    pub const fn client() -> Self {
        MaskPolicy::Random
    }

    /// The policy a server connection should use.
    #[must_use]
    pub const fn server() -> Self {
        MaskPolicy::Unmasked
    }

    /// Produce the masking key for the next frame, or `None` under
    /// [`MaskPolicy::Unmasked`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`](crate::Error::Io) if the system randomness
    /// source fails under [`MaskPolicy::Random`].
    pub fn key(&self) -> Result<Option<[u8; 4]>> {
        match self {
            MaskPolicy::Unmasked => Ok(None),
            MaskPolicy::Fixed(value) => Ok(Some(value.to_be_bytes())),
            MaskPolicy::Random => {
                let mut key = [0u8; 4];
                getrandom::getrandom(&mut key)?;
                Ok(Some(key))
            }
        }
    }

    /// Whether this policy masks frames at all.
    #[must_use]
    pub const fn is_masked(&self) -> bool {
        !matches!(self, MaskPolicy::Unmasked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unmasked_yields_no_key() {
        assert_eq!(MaskPolicy::Unmasked.key().unwrap(), None);
        assert!(!MaskPolicy::Unmasked.is_masked());
    }

    #[test]
    fn test_fixed_key_is_big_endian() {
        let key = MaskPolicy::Fixed(0x37fa_213d).key().unwrap();
        assert_eq!(key, Some([0x37, 0xfa, 0x21, 0x3d]));
    }

    #[test]
    fn test_random_draws_fresh_keys() {
        let policy = MaskPolicy::Random;
        let a = policy.key().unwrap().unwrap();
        let b = policy.key().unwrap().unwrap();
        let c = policy.key().unwrap().unwrap();
        // Three identical 32-bit draws in a row would mean the source is broken.
        assert!(a != b || b != c);
    }

    #[test]
    fn test_role_defaults() {
        assert_eq!(MaskPolicy::client(), MaskPolicy::Random);
        assert_eq!(MaskPolicy::server(), MaskPolicy::Unmasked);
    }
}
