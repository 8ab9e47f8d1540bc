use chardetng::EncodingDetector;
use encoding_rs::Encoding;

/// Decode a plain-text upload: BOM -> UTF-8 -> chardetng guess.
///
/// Returns `None` when the bytes do not decode cleanly with any of them, in
/// which case the file is shipped as-is for server-side extraction.
pub(crate) fn decode_text(bytes: &[u8]) -> Option<String> {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return decode_with(bytes, encoding);
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        return Some(text.to_string());
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let encoding = detector.guess(None, true);
    decode_with(bytes, encoding)
}

fn decode_with(bytes: &[u8], encoding: &'static Encoding) -> Option<String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        return None;
    }
    Some(text.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_with_bom_is_stripped() {
        let bytes = b"\xEF\xBB\xBFhello";
        assert_eq!(decode_text(bytes).as_deref(), Some("hello"));
    }

    #[test]
    fn utf16_bom_selects_encoding() {
        let bytes = [0xFF, 0xFE, b'h', 0x00, b'i', 0x00];
        assert_eq!(decode_text(&bytes).as_deref(), Some("hi"));
    }
}
