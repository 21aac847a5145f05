use thiserror::Error;

/// Errors from encoding or decoding a stored value.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The value cannot be represented as JSON (e.g. a map with non-string
    /// keys, or a `Serialize` impl that reports an error).
    #[error("encode error: {0}")]
    Encode(String),

    /// The stored bytes are not valid JSON for the requested type.
    #[error("decode error: {0}")]
    Decode(String),
}

/// Result alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
