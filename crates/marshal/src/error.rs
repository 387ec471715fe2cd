//! Error types for XML marshaling.
//!
//! Every failure is surfaced synchronously to the caller of
//! [`marshal`](crate::marshal) as a single [`MarshalError`]. Nothing is
//! retried and no partially written document is ever returned.

use thiserror::Error;

/// Coarse classification of a [`MarshalError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A value needed an element name but none was available.
    MissingTag,
    /// A nested build step failed.
    Conversion,
    /// The top-level value was absent.
    NilRoot,
    /// The output sink rejected a write.
    EncodingIo,
    /// The compression step failed.
    Compression,
    /// Options could not be loaded.
    Config,
}

/// Error produced while converting a value into markup.
#[derive(Error, Debug)]
pub enum MarshalError {
    /// A sequence or scalar reached the builder with an exhausted tag path.
    #[error("missing XML tag for {what}")]
    MissingTag { what: &'static str },

    /// A nested field or item failed to build.
    #[error("error converting {context}: {source}")]
    Conversion {
        context: String,
        #[source]
        source: Box<MarshalError>,
    },

    /// The root value was `None` (or otherwise null) after dereferencing.
    #[error("root value is nil; a document cannot be empty")]
    NilRoot,

    /// An `attr` field held a record or a sequence.
    #[error("attribute `{name}` requires a scalar value")]
    InvalidAttribute { name: String },

    /// The output sink rejected a write.
    #[error("error encoding node: {0}")]
    EncodingIo(#[from] std::io::Error),

    /// The compressor failed.
    #[error("error compressing data: {0}")]
    Compression(#[source] std::io::Error),

    /// A JSON options document could not be parsed.
    #[error("invalid marshal options: {0}")]
    Config(#[from] serde_json::Error),
}

impl MarshalError {
    /// Wraps `self` as the cause of a failed nested build.
    pub(crate) fn within(self, context: impl Into<String>) -> Self {
        MarshalError::Conversion {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Returns the kind of this error (the outermost one for wrapped chains).
    pub fn kind(&self) -> ErrorKind {
        match self {
            MarshalError::MissingTag { .. } => ErrorKind::MissingTag,
            MarshalError::Conversion { .. } | MarshalError::InvalidAttribute { .. } => {
                ErrorKind::Conversion
            }
            MarshalError::NilRoot => ErrorKind::NilRoot,
            MarshalError::EncodingIo(_) => ErrorKind::EncodingIo,
            MarshalError::Compression(_) => ErrorKind::Compression,
            MarshalError::Config(_) => ErrorKind::Config,
        }
    }

    /// Follows the `Conversion` chain down to the error that started it.
    pub fn root_cause(&self) -> &MarshalError {
        let mut current = self;
        while let MarshalError::Conversion { source, .. } = current {
            current = source;
        }
        current
    }
}

/// Result type alias for marshaling operations.
pub type Result<T> = std::result::Result<T, MarshalError>;
