//! PDF text string decoding
//!
//! Field names and values are "text strings": UTF-16BE with a byte order
//! mark, or PDFDocEncoding. Producers also write plain UTF-8, so that is
//! tried before the single-byte fallback.

const UTF16BE_BOM: [u8; 2] = [0xFE, 0xFF];
const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Decode a PDF text string into a Rust string
pub fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(body) = bytes.strip_prefix(&UTF16BE_BOM) {
        let units: Vec<u16> = body
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }

    let bytes = bytes.strip_prefix(&UTF8_BOM).unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        // PDFDocEncoding agrees with Latin-1 for everything forms use
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_ascii() {
        assert_eq!(decode_text_string(b"TOTAL SCORE"), "TOTAL SCORE");
    }

    #[test]
    fn test_decodes_utf16be_with_bom() {
        let bytes = [0xFE, 0xFF, 0x00, b'J', 0x00, b'o', 0x00, 0xE9];
        assert_eq!(decode_text_string(&bytes), "Joé");
    }

    #[test]
    fn test_strips_utf8_bom() {
        let bytes = [0xEF, 0xBB, 0xBF, b'D', b'a', b't', b'e'];
        assert_eq!(decode_text_string(&bytes), "Date");
    }

    #[test]
    fn test_falls_back_to_latin1() {
        // 0xE9 alone is not valid UTF-8
        assert_eq!(decode_text_string(&[b'J', b'o', 0xE9]), "Joé");
    }

    #[test]
    fn test_ignores_dangling_utf16_byte() {
        let bytes = [0xFE, 0xFF, 0x00, b'A', 0x00];
        assert_eq!(decode_text_string(&bytes), "A");
    }
}
