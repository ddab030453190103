//! Key and value codec for the remote store.
//!
//! The remote store forbids several characters in partition and row keys
//! (`/`, `\`, `#`, `?` and control characters). Every string that reaches the
//! store is therefore written as URL-safe, unpadded base64 of its UTF-8 bytes.
//! The alphabet (`A-Z a-z 0-9 - _`) contains none of the forbidden characters,
//! and the empty string encodes to the empty string.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

use crate::errors::{Result, TableError};

/// Encodes a string into its wire representation.
pub fn encode(value: &str) -> String {
    URL_SAFE_NO_PAD.encode(value.as_bytes())
}

/// Decodes a wire representation produced by [`encode`].
///
/// Fails with [`TableError::Decode`] on input that `encode` could never have
/// produced: bad base64 or bytes that are not UTF-8.
pub fn decode(encoded: &str) -> Result<String> {
    let bytes = URL_SAFE_NO_PAD
        .decode(encoded.as_bytes())
        .map_err(|e| TableError::decode(format!("invalid base64 payload '{}': {}", encoded, e)))?;
    String::from_utf8(bytes)
        .map_err(|e| TableError::decode(format!("payload is not valid UTF-8: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        for value in ["", "a", "row/1", "hash#tag?x", "back\\slash", "tab\there", "ünïcödé ✓"] {
            assert_eq!(decode(&encode(value)).unwrap(), value);
        }
    }

    #[test]
    fn test_empty_string_encodes_empty() {
        assert_eq!(encode(""), "");
    }

    #[test]
    fn test_encoded_alphabet_is_key_safe() {
        let encoded = encode("a/b\\c#d?e\u{7f}\u{0}");
        assert!(encoded
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_distinct_inputs_distinct_outputs() {
        assert_ne!(encode("ab"), encode("ab "));
        assert_ne!(encode("r1"), encode("r2"));
    }

    #[test]
    fn test_malformed_payload() {
        assert!(matches!(decode("not base64!"), Err(TableError::Decode(_))));
        // 0xff 0xfe is not UTF-8
        let invalid_utf8 = URL_SAFE_NO_PAD.encode([0xff_u8, 0xfe]);
        assert!(matches!(decode(&invalid_utf8), Err(TableError::Decode(_))));
    }
}
