//! Error types for glb-loader.
//!
//! Only [`LoadError`] ever reaches the caller of a load. The other errors are
//! fatal to one unit (an accessor read, a primitive, a texture) and are turned
//! into [`glb_scene::LoadWarning`]s by the stage that owns that unit.

use thiserror::Error;

/// Result type for whole-load operations.
pub type Result<T> = std::result::Result<T, LoadError>;

/// Errors that abort an entire load.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The byte stream is not a usable GLB container, or the document has no
    /// scene to build.
    #[error("malformed container: {0}")]
    MalformedContainer(String),

    /// The JSON chunk is not valid UTF-8 JSON matching the document model.
    #[error("undecodable document: {0}")]
    Document(#[from] serde_json::Error),

    /// The byte fetch failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Node recursion went deeper than the configured limit, usually because
    /// of a cyclic `children` reference.
    #[error("node {node} exceeds the maximum node depth of {limit}")]
    NodeDepthExceeded { node: usize, limit: usize },

    /// The async runtime for a blocking load could not be created.
    #[error("runtime error: {0}")]
    Runtime(String),
}

impl LoadError {
    /// Create a malformed container error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedContainer(message.into())
    }

    /// Whether this error came from the container or document structure.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedContainer(_) | Self::Document(_))
    }
}

/// Errors reported by a [`crate::Fetch`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Transport failure (DNS, connection, timeout, file access...).
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-success status.
    #[error("HTTP {0}")]
    Status(u16),
}

/// Errors resolving an accessor into the binary buffer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessorError {
    #[error("accessor {0} does not exist")]
    UnknownAccessor(usize),

    #[error("accessor {accessor} has no buffer view")]
    MissingBufferView { accessor: usize },

    #[error("buffer view {0} does not exist")]
    UnknownBufferView(usize),

    #[error("buffer {buffer} is not the embedded binary chunk")]
    ExternalBuffer { buffer: usize },

    #[error("document references binary data but the container has no BIN chunk")]
    MissingBinaryChunk,

    #[error("byte range {start}..{end} exceeds binary buffer of {len} bytes")]
    OutOfBounds { start: usize, end: usize, len: usize },
}

/// Errors building one primitive's geometry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    #[error("missing required attribute {0}")]
    MissingRequiredAttribute(&'static str),

    #[error(transparent)]
    Accessor(#[from] AccessorError),
}

/// Errors decoding one embedded image.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("invalid data URI: {0}")]
    InvalidDataUri(String),

    #[error("unsupported image type: {0}")]
    UnsupportedMimeType(String),

    #[error("image decode failed: {0}")]
    Image(String),
}

impl From<base64::DecodeError> for DecodeError {
    fn from(err: base64::DecodeError) -> Self {
        Self::InvalidDataUri(err.to_string())
    }
}

impl From<image::ImageError> for DecodeError {
    fn from(err: image::ImageError) -> Self {
        Self::Image(err.to_string())
    }
}
