//! C literal decoding
//!
//! Integer, character and string literal text as it appears in source.

/// Parse an integer literal (`42`, `0x2A`, `052`, `0b101`, `10UL`).
///
/// Floating literals yield `None`.
pub fn parse_int_literal(text: &str) -> Option<i64> {
    let text = text.trim();
    let lower = text.to_ascii_lowercase();
    let is_hex = lower.starts_with("0x");

    if !is_hex && (lower.contains('.') || lower.contains('e')) {
        return None;
    }

    let digits = lower.trim_end_matches(['u', 'l']);
    let parsed = if let Some(hex) = digits.strip_prefix("0x") {
        i64::from_str_radix(hex, 16)
    } else if let Some(bin) = digits.strip_prefix("0b") {
        i64::from_str_radix(bin, 2)
    } else if digits.len() > 1 && digits.starts_with('0') {
        i64::from_str_radix(&digits[1..], 8)
    } else {
        digits.parse::<i64>()
    };
    parsed.ok()
}

/// Value of a character literal (`'X'`, `'\0'`, `'\x41'`)
pub fn parse_char_literal(text: &str) -> Option<i64> {
    let start = text.find('\'')?;
    let end = text.rfind('\'')?;
    if end <= start {
        return None;
    }
    let decoded = decode_escapes(&text[start + 1..end]);
    decoded.chars().next().map(|c| c as i64)
}

/// Resolve escape sequences in the body of a string or character literal
pub fn decode_escapes(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(esc) = chars.next() else {
            out.push('\\');
            break;
        };
        match esc {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'a' => out.push('\u{07}'),
            'b' => out.push('\u{08}'),
            'f' => out.push('\u{0C}'),
            'v' => out.push('\u{0B}'),
            'e' => out.push('\u{1B}'),
            '0'..='7' => {
                let mut value = esc.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek().and_then(|d| d.to_digit(8)) {
                        Some(d) => {
                            value = value * 8 + d;
                            chars.next();
                        }
                        None => break,
                    }
                }
                out.push(char::from((value & 0xFF) as u8));
            }
            'x' => {
                let mut value = 0u32;
                while let Some(d) = chars.peek().and_then(|d| d.to_digit(16)) {
                    value = (value << 4 | d) & 0xFF;
                    chars.next();
                }
                out.push(char::from(value as u8));
            }
            // \\ \' \" \? and unknown escapes stand for themselves
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_literals() {
        assert_eq!(parse_int_literal("42"), Some(42));
        assert_eq!(parse_int_literal("0x2A"), Some(42));
        assert_eq!(parse_int_literal("052"), Some(42));
        assert_eq!(parse_int_literal("0b101"), Some(5));
        assert_eq!(parse_int_literal("1024UL"), Some(1024));
        assert_eq!(parse_int_literal("0"), Some(0));
        assert_eq!(parse_int_literal("1.5"), None);
        assert_eq!(parse_int_literal("1e3"), None);
    }

    #[test]
    fn test_char_literals() {
        assert_eq!(parse_char_literal("'X'"), Some(88));
        assert_eq!(parse_char_literal("'\\0'"), Some(0));
        assert_eq!(parse_char_literal("'\\n'"), Some(10));
        assert_eq!(parse_char_literal("'\\x41'"), Some(65));
    }

    #[test]
    fn test_decode_escapes() {
        assert_eq!(decode_escapes("%s\\n"), "%s\n");
        assert_eq!(decode_escapes("a\\\"b"), "a\"b");
        assert_eq!(decode_escapes("\\101\\0"), "A\0");
        assert_eq!(decode_escapes("plain"), "plain");
    }
}
