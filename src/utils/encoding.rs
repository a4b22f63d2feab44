// src/utils/encoding.rs
use crate::utils::error::AppError;

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Decodes little-endian UTF-16 bytes, the encoding the terminal exports reports in.
/// A leading byte order mark is dropped. Odd byte counts and unpaired surrogates are errors.
pub fn decode_utf16le(bytes: &[u8]) -> Result<String, AppError> {
    if bytes.len() % 2 != 0 {
        return Err(AppError::Decode(format!(
            "UTF-16LE input has an odd number of bytes ({})",
            bytes.len()
        )));
    }

    let units = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]));

    let text = char::decode_utf16(units)
        .collect::<Result<String, _>>()
        .map_err(|e| AppError::Decode(e.to_string()))?;

    tracing::debug!("Decoded {} bytes of UTF-16LE into {} chars", bytes.len(), text.chars().count());

    Ok(match text.strip_prefix(BYTE_ORDER_MARK) {
        Some(rest) => rest.to_string(),
        None => text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(text: &str) -> Vec<u8> {
        text.encode_utf16().flat_map(|u| u.to_le_bytes()).collect()
    }

    #[test]
    fn test_decodes_plain_and_bom_prefixed_text() {
        assert_eq!(decode_utf16le(&encode("<b>Deals</b>")).unwrap(), "<b>Deals</b>");
        assert_eq!(decode_utf16le(&encode("\u{feff}Orders")).unwrap(), "Orders");
        assert_eq!(decode_utf16le(&encode("Profit: 1 000,5 €")).unwrap(), "Profit: 1 000,5 €");
    }

    #[test]
    fn test_rejects_odd_length_and_lone_surrogate() {
        assert!(matches!(decode_utf16le(&[0x41, 0x00, 0x42]), Err(AppError::Decode(_))));
        // 0xD800 without a trailing low surrogate
        assert!(matches!(decode_utf16le(&[0x00, 0xD8, 0x41, 0x00]), Err(AppError::Decode(_))));
    }
}
