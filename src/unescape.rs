//! Escape-sequence decoding for rules marked `unescape`
//!
//! Recognized sequences: `\n`, `\r`, `\t`, `\b`, `\f`, `\0`-`\377` (octal),
//! `\uXXXX`, `\'`, `\"` and `\\`. Anything else after a backslash is kept
//! verbatim, so regex escapes such as `\d` survive unescaping.

use std::borrow::Cow;

/// Decode escape sequences in `input`.
///
/// Borrows the input when it contains no backslash.
pub fn unescape(input: &str) -> Cow<'_, str> {
    if !input.contains('\\') {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        let Some(&next) = chars.peek() else {
            out.push('\\');
            break;
        };

        match next {
            'n' => push_and_skip(&mut out, &mut chars, '\n'),
            'r' => push_and_skip(&mut out, &mut chars, '\r'),
            't' => push_and_skip(&mut out, &mut chars, '\t'),
            'b' => push_and_skip(&mut out, &mut chars, '\u{8}'),
            'f' => push_and_skip(&mut out, &mut chars, '\u{c}'),
            '\'' | '"' | '\\' => push_and_skip(&mut out, &mut chars, next),
            'u' => {
                chars.next();
                let hex: String = chars.clone().take(4).collect();
                match decode_unicode(&hex) {
                    Some(decoded) => {
                        out.push(decoded);
                        for _ in 0..4 {
                            chars.next();
                        }
                    }
                    None => out.push_str("\\u"),
                }
            }
            '0'..='7' => {
                let mut value = 0u32;
                let mut digits = 0;
                // Up to three digits, but only while the value stays within \377
                while let Some(&d) = chars.peek() {
                    let Some(digit) = d.to_digit(8) else { break };
                    if digits == 3 || value * 8 + digit > 0o377 {
                        break;
                    }
                    value = value * 8 + digit;
                    digits += 1;
                    chars.next();
                }
                if let Some(decoded) = char::from_u32(value) {
                    out.push(decoded);
                }
            }
            _ => out.push('\\'),
        }
    }

    Cow::Owned(out)
}

fn push_and_skip(out: &mut String, chars: &mut std::iter::Peekable<std::str::Chars<'_>>, c: char) {
    out.push(c);
    chars.next();
}

fn decode_unicode(hex: &str) -> Option<char> {
    if hex.len() != 4 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
}
