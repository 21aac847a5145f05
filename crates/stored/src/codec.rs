use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{CodecError, CodecResult};

/// The compact JSON encoding of an absent value.
const NULL: &[u8] = b"null";

/// JSON codec for stored values.
///
/// Values are encoded as compact UTF-8 JSON. Any `Serialize` type works:
/// top-level primitives, sequences, records, optional fields, and maps with
/// string-like keys.
pub struct JsonCodec;

impl JsonCodec {
    /// Encode a value to JSON bytes.
    pub fn encode<T: Serialize + ?Sized>(value: &T) -> CodecResult<Vec<u8>> {
        serde_json::to_vec(value).map_err(|e| CodecError::Encode(e.to_string()))
    }

    /// Decode JSON bytes into a value.
    pub fn decode<T: DeserializeOwned>(data: &[u8]) -> CodecResult<T> {
        serde_json::from_slice(data).map_err(|e| CodecError::Decode(e.to_string()))
    }

    /// Whether `data` is the encoding of an absent value.
    pub fn is_null(data: &[u8]) -> bool {
        data == NULL
    }
}
