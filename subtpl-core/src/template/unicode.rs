//! Reverse `\uXXXX` / `\UXXXXXXXX` escapes left in emitted YAML
//!
//! Only double-quoted scalars carry escapes. Plain, single-quoted and block
//! scalars are copied through as written, so a literal backslash sequence in
//! a rule or node field is never rewritten.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scalar {
    Outside,
    Plain,
    DoubleQuoted,
    SingleQuoted,
}

/// Replace escaped non-ASCII characters with the literal character
///
/// ASCII, control characters and the BOM stay escaped so the text keeps
/// parsing to the same value. An escaped backslash (`\\`) is copied through
/// untouched, together with the character after it.
pub fn restore_unicode_escapes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut state = Scalar::Outside;
    let mut block_indent: Option<usize> = None;

    for line in text.split_inclusive('\n') {
        if let Some(indent) = block_indent {
            if line.trim().is_empty() || indentation(line) > indent {
                out.push_str(line);
                continue;
            }
            block_indent = None;
        }

        state = restore_line(line, state, &mut out);
        if opens_block_scalar(line, state) {
            block_indent = Some(indentation(line));
        }
    }

    out
}

/// Copy one line, decoding escapes inside double-quoted spans. Quoted
/// scalars may continue on the next line, so the state is carried over.
fn restore_line(line: &str, state: Scalar, out: &mut String) -> Scalar {
    // Plain scalars end at the line break
    let mut state = match state {
        Scalar::Plain => Scalar::Outside,
        other => other,
    };
    let mut rest = line;

    while let Some(ch) = rest.chars().next() {
        let next = rest[ch.len_utf8()..].chars().next();
        let mut consumed = ch.len_utf8();

        match state {
            Scalar::Outside => {
                out.push(ch);
                state = match ch {
                    '"' => Scalar::DoubleQuoted,
                    '\'' => Scalar::SingleQuoted,
                    '-' | '?' | ':' if next.map_or(true, char::is_whitespace) => Scalar::Outside,
                    '[' | ']' | '{' | '}' | ',' => Scalar::Outside,
                    c if c.is_whitespace() => Scalar::Outside,
                    _ => Scalar::Plain,
                };
            }
            Scalar::Plain => {
                out.push(ch);
                if ch == ':' && next.map_or(true, char::is_whitespace) {
                    state = Scalar::Outside;
                }
            }
            Scalar::DoubleQuoted => match ch {
                '\\' => {
                    let (decoded, len) = match decode_escape(rest) {
                        Some((c, len)) => (Some(c), len),
                        None => (None, 1 + next.map_or(0, char::len_utf8)),
                    };
                    match decoded {
                        Some(c) => out.push(c),
                        None => out.push_str(&rest[..len]),
                    }
                    consumed = len;
                }
                '"' => {
                    out.push(ch);
                    state = Scalar::Outside;
                }
                _ => out.push(ch),
            },
            Scalar::SingleQuoted => {
                if ch == '\'' && next == Some('\'') {
                    out.push_str("''");
                    consumed = 2;
                } else {
                    out.push(ch);
                    if ch == '\'' {
                        state = Scalar::Outside;
                    }
                }
            }
        }

        rest = &rest[consumed..];
    }

    state
}

fn indentation(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

/// Whether `line` ends with a `|` or `>` block scalar header
fn opens_block_scalar(line: &str, state: Scalar) -> bool {
    if matches!(state, Scalar::DoubleQuoted | Scalar::SingleQuoted) {
        return false;
    }

    let line = line.trim_end();
    let (prefix, header) = match line.rfind(' ') {
        Some(pos) => (line[..pos].trim_end(), &line[pos + 1..]),
        None => ("", line.trim_start()),
    };

    let mut chars = header.chars();
    if !matches!(chars.next(), Some('|' | '>')) {
        return false;
    }
    if !chars.all(|c| matches!(c, '-' | '+' | '1'..='9')) {
        return false;
    }

    prefix.is_empty() || prefix.ends_with(':') || prefix == "-" || prefix.ends_with(" -")
}

/// Decode an escape at the start of `tail`, returning the character and the
/// number of bytes it spans
fn decode_escape(tail: &str) -> Option<(char, usize)> {
    let width = match tail.as_bytes().get(1)? {
        b'u' => 4,
        b'U' => 8,
        _ => return None,
    };
    let code = parse_hex(tail.get(2..2 + width)?)?;

    // UTF-16 surrogate pair written as two \u escapes
    if (0xD800..0xDC00).contains(&code) {
        let low_tail = tail.get(2 + width..)?;
        if width != 4 || !low_tail.starts_with("\\u") {
            return None;
        }
        let low = parse_hex(low_tail.get(2..6)?)?;
        if !(0xDC00..0xE000).contains(&low) {
            return None;
        }
        let combined = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
        return literal(combined).map(|c| (c, 12));
    }

    literal(code).map(|c| (c, 2 + width))
}

fn parse_hex(digits: &str) -> Option<u32> {
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(digits, 16).ok()
}

fn literal(code: u32) -> Option<char> {
    let c = char::from_u32(code)?;
    (!c.is_ascii() && !c.is_control() && c != '\u{feff}').then_some(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restore_bmp_and_astral() {
        let escaped = r#"name: "\U0001F1ED\U0001F1F0 \u9999\u6E2F 01""#;
        assert_eq!(restore_unicode_escapes(escaped), r#"name: "🇭🇰 香港 01""#);
    }

    #[test]
    fn test_restore_surrogate_pair() {
        assert_eq!(restore_unicode_escapes(r#""\uD83D\uDE80 Proxy""#), r#""🚀 Proxy""#);
    }

    #[test]
    fn test_ascii_and_control_escapes_kept() {
        let text = r#""a\u0022b\u0085c\n""#;
        assert_eq!(restore_unicode_escapes(text), text);
    }

    #[test]
    fn test_escaped_backslash_untouched() {
        let text = r#""C:\\u4e2d""#;
        assert_eq!(restore_unicode_escapes(text), text);
    }

    #[test]
    fn test_malformed_escapes_kept() {
        let text = r#""\u12" "\uZZZZ" "\uD83D" tail\"#;
        assert_eq!(restore_unicode_escapes(text), text);
    }

    #[test]
    fn test_single_quoted_backslash_kept() {
        let text = "rules:\n- 'PROCESS-NAME,C:\\u4e2d.exe,DIRECT'\n- 'it''s \\u4e2d'\n";
        assert_eq!(restore_unicode_escapes(text), text);
    }

    #[test]
    fn test_plain_backslash_kept() {
        let text = "path: C:\\u4e2d\nnote: it's \"\\u4e2d\"\nname: \"\\u9999\"\n";
        assert_eq!(
            restore_unicode_escapes(text),
            "path: C:\\u4e2d\nnote: it's \"\\u4e2d\"\nname: \"香\"\n"
        );
    }

    #[test]
    fn test_block_scalar_kept() {
        let text = "script: |-\n  echo \"\\u4e2d\"\n\n  done\nname: \"\\u9999\"\n";
        assert_eq!(
            restore_unicode_escapes(text),
            "script: |-\n  echo \"\\u4e2d\"\n\n  done\nname: \"香\"\n"
        );
    }

    #[test]
    fn test_double_quoted_scalar_across_lines() {
        let text = "name: \"\\u9999\\\n  \\u6E2F\"\n";
        assert_eq!(restore_unicode_escapes(text), "name: \"香\\\n  港\"\n");
    }

    #[test]
    fn test_plain_text_unchanged() {
        let text = "proxies:\n- name: 🇺🇸 美国 01\n";
        assert_eq!(restore_unicode_escapes(text), text);
    }
}
