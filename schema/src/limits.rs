//! Decode limits for variable-length fields.

/// Caps applied when reading variable-length field values.
///
/// Limits are enforced before allocation, so a hostile length prefix can
/// never request more memory than configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldLimits {
    /// Maximum encoded length of a text field.
    pub max_string_bytes: usize,
    /// Maximum length of an opaque byte field.
    pub max_blob_bytes: usize,
    /// Maximum nesting depth of a document field; the root counts as 1.
    pub max_document_depth: usize,
}

impl Default for FieldLimits {
    fn default() -> Self {
        Self {
            max_string_bytes: 32 * 1024,
            max_blob_bytes: 1024 * 1024,
            max_document_depth: 512,
        }
    }
}

impl FieldLimits {
    /// Small limits, handy for exercising rejection paths in tests.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            max_string_bytes: 256,
            max_blob_bytes: 256,
            max_document_depth: 8,
        }
    }

    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_string_bytes: usize::MAX,
            max_blob_bytes: usize::MAX,
            max_document_depth: usize::MAX,
        }
    }

    #[must_use]
    pub const fn max_string(mut self, bytes: usize) -> Self {
        self.max_string_bytes = bytes;
        self
    }

    #[must_use]
    pub const fn max_blob(mut self, bytes: usize) -> Self {
        self.max_blob_bytes = bytes;
        self
    }

    #[must_use]
    pub const fn max_depth(mut self, depth: usize) -> Self {
        self.max_document_depth = depth;
        self
    }
}
