//! Rollup payload codec: `0x`-prefixed hex of UTF-8 text.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PayloadError {
    #[error("Payload is not valid hex: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error("Payload is not UTF-8")]
    Utf8,
}

pub type Result<T> = std::result::Result<T, PayloadError>;

/// Hex-encode `text` with a `0x` prefix.
pub fn encode(text: &str) -> String {
    format!("0x{}", hex::encode(text.as_bytes()))
}

/// Decode a hex payload (prefix optional) into UTF-8 text.
pub fn decode(payload: &str) -> Result<String> {
    let digits = payload
        .strip_prefix("0x")
        .or_else(|| payload.strip_prefix("0X"))
        .unwrap_or(payload);
    let bytes = hex::decode(digits)?;
    String::from_utf8(bytes).map_err(|_| PayloadError::Utf8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_known() {
        assert_eq!(encode("{}"), "0x7b7d");
        assert_eq!(encode(""), "0x");
    }

    #[test]
    fn test_encode_bytes() {
        use hex_literal::hex;
        let encoded = encode(r#"{"method":"groups"}"#);
        assert_eq!(
            hex::decode(&encoded[2..]).unwrap(),
            hex!("7b226d6574686f64223a2267726f757073227d").to_vec()
        );
    }

    #[test]
    fn test_decode_known() {
        assert_eq!(decode("0x7b7d").unwrap(), "{}");
        assert_eq!(decode("7b7d").unwrap(), "{}");
        assert_eq!(decode("0x").unwrap(), "");
    }

    #[test]
    fn test_decode_roundtrip_json() {
        let json = r#"{"method":"groups"}"#;
        assert_eq!(decode(&encode(json)).unwrap(), json);
    }

    #[test]
    fn test_decode_errors() {
        assert!(matches!(decode("0xzz"), Err(PayloadError::Hex(_))));
        assert!(matches!(decode("0x123"), Err(PayloadError::Hex(_))));
        assert_eq!(decode("0xff"), Err(PayloadError::Utf8));
    }
}
