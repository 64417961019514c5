//! Limits for packet encoding and decoding.

use schema::FieldLimits;

/// Codec limits enforced on every encoded and decoded frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecLimits {
    /// Maximum size of one packet, discriminator included.
    pub max_packet_bytes: usize,
    /// Caps for variable-length field values.
    pub fields: FieldLimits,
}

impl Default for CodecLimits {
    fn default() -> Self {
        Self {
            max_packet_bytes: 2 * 1024 * 1024,
            fields: FieldLimits::default(),
        }
    }
}

impl CodecLimits {
    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            max_packet_bytes: 4096,
            fields: FieldLimits::for_testing(),
        }
    }

    /// Creates limits with no restrictions (use with caution).
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_packet_bytes: usize::MAX,
            fields: FieldLimits::unlimited(),
        }
    }

    pub(crate) fn check_packet_len(&self, actual: usize) -> crate::CodecResult<()> {
        if actual > self.max_packet_bytes {
            return Err(crate::CodecError::LimitsExceeded {
                limit: self.max_packet_bytes,
                actual,
            });
        }
        Ok(())
    }
}
