// SPDX-License-Identifier: MIT OR Apache-2.0

//! Encode and decode values in [CBOR] format.
//!
//! Snapshots of processing units and serialized source splits are exchanged with the host in
//! CBOR.
//!
//! [CBOR]: https://cbor.io/
use std::io::Read;

use ciborium::de::Error as DeserializeError;
use ciborium::ser::Error as SerializeError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Serializes a value into CBOR format.
pub fn encode_cbor<T: Serialize>(value: &T) -> Result<Vec<u8>, EncodeError> {
    let mut bytes = Vec::new();
    ciborium::ser::into_writer(value, &mut bytes)?;
    Ok(bytes)
}

/// Deserializes a value which was formatted in CBOR.
pub fn decode_cbor<T: for<'a> Deserialize<'a>, R: Read>(reader: R) -> Result<T, DecodeError> {
    let value = ciborium::from_reader::<T, R>(reader)?;
    Ok(value)
}

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("failed writing cbor bytes: {0}")]
    Io(std::io::Error),

    /// Value can not be represented in CBOR, contains the description given by serde.
    #[error("failed serializing value: {0}")]
    Value(String),
}

impl From<SerializeError<std::io::Error>> for EncodeError {
    fn from(value: SerializeError<std::io::Error>) -> Self {
        match value {
            SerializeError::Io(err) => EncodeError::Io(err),
            SerializeError::Value(err) => EncodeError::Value(err),
        }
    }
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("failed reading cbor bytes: {0}")]
    Io(std::io::Error),

    #[error("invalid cbor syntax at position {0}")]
    Syntax(usize),

    /// Bytes were valid CBOR but did not match the expected shape.
    #[error("unexpected value at position {0:?}: {1}")]
    Semantic(Option<usize>, String),

    #[error("recursion limit exceeded while decoding")]
    RecursionLimitExceeded,
}

impl From<DeserializeError<std::io::Error>> for DecodeError {
    fn from(value: DeserializeError<std::io::Error>) -> Self {
        match value {
            DeserializeError::Io(err) => DecodeError::Io(err),
            DeserializeError::Syntax(offset) => DecodeError::Syntax(offset),
            DeserializeError::Semantic(offset, description) => {
                DecodeError::Semantic(offset, description)
            }
            DeserializeError::RecursionLimitExceeded => DecodeError::RecursionLimitExceeded,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{Window, WindowedValue};

    use super::{DecodeError, decode_cbor, encode_cbor};

    #[test]
    fn windowed_value_survives_encoding() {
        let value = WindowedValue::new(
            String::from("payload"),
            7,
            vec![Window::Global, Window::interval(0, 10)],
        );
        let bytes = encode_cbor(&value).unwrap();
        let value_again: WindowedValue<String> = decode_cbor(&bytes[..]).unwrap();
        assert_eq!(value, value_again);
    }

    #[test]
    fn reject_garbage() {
        let result = decode_cbor::<WindowedValue<String>, _>(&[0xff, 0x00, 0x12][..]);
        assert!(result.is_err());
        assert!(!matches!(result, Err(DecodeError::RecursionLimitExceeded)));
    }
}
