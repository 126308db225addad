//! Error handling.

use std::fmt::Debug;
use thiserror::Error;

use crate::store::StoreError;

/// Enum with all errors surfaced by the image API.
///
/// Failures raised by the storage engine never cross this boundary as-is; they are folded into
/// [`KeaError::IoFailure`] carrying the engine's message.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum KeaError {
    /// The operation requires an open image.
    #[error("Image was not open.")]
    NotOpen,

    /// Band indices are 1-based.
    #[error("KEA image bands start at 1.")]
    InvalidBandIndex,

    /// The band index is larger than the number of bands in the image.
    #[error("Band {band} is not present within image ({num_bands} bands).")]
    BandNotFound {
        /// Requested band.
        band: u32,
        /// Number of bands in the image.
        num_bands: u32,
    },

    /// The requested pixel rectangle does not fit within the addressed array.
    #[error("{0}")]
    OutOfBounds(String),

    /// The logical data type has no physical counterpart.
    #[error("The specified data type was not recognised: {0}")]
    UnsupportedType(u16),

    /// A required header field could not be read while opening an image.
    #[error("The header field {0} was not specified.")]
    MissingHeaderField(&'static str),

    /// No metadata entry exists for the key.
    #[error("Meta-data variable {0} was not accessible.")]
    MetadataKeyNotFound(String),

    /// A stored array does not have the expected number of dimensions.
    #[error("Expected {expected} dimensions, found {found}.")]
    InvalidDimensionality {
        /// Required rank.
        expected: usize,
        /// Rank found in the container.
        found: usize,
    },

    /// The caller's buffer cannot hold the requested block.
    #[error("Buffer holds {actual} bytes, at least {expected} required.")]
    BufferTooSmall {
        /// Bytes required by the block shape and data type.
        expected: usize,
        /// Bytes provided.
        actual: usize,
    },

    /// Error raised by an attribute table implementation.
    #[error("Attribute table error: {0}")]
    AttributeTable(String),

    /// Failure in the underlying storage engine.
    #[error("{0}")]
    IoFailure(String),
}

impl From<StoreError> for KeaError {
    fn from(err: StoreError) -> Self {
        KeaError::IoFailure(err.to_string())
    }
}

/// Crate-specific result type.
pub type KeaResult<T> = std::result::Result<T, KeaError>;
