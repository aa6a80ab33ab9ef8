// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 将字节内容解码为UTF-8字符串
///
/// 优先按UTF-8解析；失败时回退到WINDOWS-1252解码。
/// ANBIMA的接口以ISO-8859-1编码返回内容且不带charset头，
/// WINDOWS-1252是其超集，覆盖葡萄牙语的全部重音字符。
pub fn decode_to_utf8(input: &[u8]) -> String {
    if let Ok(s) = std::str::from_utf8(input) {
        return s.to_string();
    }

    let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(input);
    decoded.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_valid_utf8_passthrough() {
        assert_eq!(decode_to_utf8("Índice".as_bytes()), "Índice");
    }

    #[test]
    fn test_decode_latin1_fallback() {
        // "São" in ISO-8859-1
        assert_eq!(decode_to_utf8(b"S\xe3o"), "S\u{e3}o");
    }

    #[test]
    fn test_decode_empty_input() {
        assert_eq!(decode_to_utf8(b""), "");
    }
}
