//! Byte-class predicates and string helpers shared by the parser and encoder.

use std::borrow::Cow;

/// Byte classes from the IMAP4rev1 formal syntax.
pub mod indicators {
    /// `CHAR = %x01-7F`
    pub fn is_char(byte: u8) -> bool {
        matches!(byte, 0x01..=0x7f)
    }

    /// `CHAR8 = %x01-ff` (any octet except NUL)
    pub fn is_char8(byte: u8) -> bool {
        byte != 0x00
    }

    /// `CTL = %x00-1F / %x7F`
    pub fn is_ctl(byte: u8) -> bool {
        matches!(byte, 0x00..=0x1f | 0x7f)
    }

    /// `quoted-specials = DQUOTE / "\"`
    pub fn is_quoted_specials(byte: u8) -> bool {
        byte == b'"' || byte == b'\\'
    }

    /// `list-wildcards = "%" / "*"`
    pub fn is_list_wildcards(byte: u8) -> bool {
        byte == b'%' || byte == b'*'
    }

    /// `resp-specials = "]"`
    pub fn is_resp_specials(byte: u8) -> bool {
        byte == b']'
    }

    /// `ATOM-CHAR = <any CHAR except atom-specials>`
    ///
    /// `atom-specials = "(" / ")" / "{" / SP / CTL / list-wildcards /
    ///                  quoted-specials / resp-specials`
    pub fn is_atom_char(byte: u8) -> bool {
        is_char(byte)
            && !is_ctl(byte)
            && !is_list_wildcards(byte)
            && !is_quoted_specials(byte)
            && !is_resp_specials(byte)
            && !matches!(byte, b'(' | b')' | b'{' | b' ')
    }

    /// `ASTRING-CHAR = ATOM-CHAR / resp-specials`
    pub fn is_astring_char(byte: u8) -> bool {
        is_atom_char(byte) || is_resp_specials(byte)
    }

    /// `TEXT-CHAR = <any CHAR except CR and LF>`
    pub fn is_text_char(byte: u8) -> bool {
        is_char(byte) && byte != b'\r' && byte != b'\n'
    }

    /// `list-char = ATOM-CHAR / list-wildcards / resp-specials`
    pub fn is_list_char(byte: u8) -> bool {
        is_atom_char(byte) || is_list_wildcards(byte) || is_resp_specials(byte)
    }

    /// `QUOTED-CHAR` without the escaped alternative, i.e. a byte that may
    /// appear in a quoted string without a preceding backslash.
    pub fn is_any_text_char_except_quoted_specials(byte: u8) -> bool {
        is_text_char(byte) && !is_quoted_specials(byte)
    }

    /// A byte a quoted string can carry at all (escaped or not).
    ///
    /// This is the condition under which the encoder may choose the
    /// `"quoted"` rendering for a string.
    pub fn is_quotable(byte: u8) -> bool {
        is_text_char(byte)
    }
}

/// Escape `"` and `\` for emission inside a quoted string.
pub fn escape_quoted(unescaped: &str) -> Cow<str> {
    let mut escaped = Cow::Borrowed(unescaped);

    if escaped.contains('\\') {
        escaped = Cow::Owned(escaped.replace('\\', "\\\\"));
    }

    if escaped.contains('"') {
        escaped = Cow::Owned(escaped.replace('"', "\\\""));
    }

    escaped
}

/// Undo [`escape_quoted`].
pub fn unescape_quoted(escaped: &str) -> Cow<str> {
    let mut unescaped = Cow::Borrowed(escaped);

    if unescaped.contains("\\\\") {
        unescaped = Cow::Owned(unescaped.replace("\\\\", "\\"));
    }

    if unescaped.contains("\\\"") {
        unescaped = Cow::Owned(unescaped.replace("\\\"", "\""));
    }

    unescaped
}

/// Render arbitrary bytes as a printable byte-string literal, e.g. for test
/// failure output.
pub fn escape_byte_string(bytes: impl AsRef<[u8]>) -> String {
    bytes
        .as_ref()
        .iter()
        .map(|byte| match byte {
            0x00..=0x08 | 0x0b | 0x0c | 0x0e..=0x1f | 0x7f..=0xff => {
                format!("\\x{:02x}", byte)
            }
            0x09 => String::from("\\t"),
            0x0a => String::from("\\n"),
            0x0d => String::from("\\r"),
            0x22 => String::from("\\\""),
            0x5c => String::from("\\\\"),
            byte => format!("{}", *byte as char),
        })
        .collect::<Vec<String>>()
        .join("")
}

#[cfg(test)]
mod tests {
    use super::{escape_quoted, indicators::*, unescape_quoted};

    #[test]
    fn test_atom_chars() {
        for byte in [b'a', b'Z', b'0', b'+', b'-', b'.', b'&'] {
            assert!(is_atom_char(byte), "{byte} should be an atom char");
        }

        for byte in [
            b' ', b'(', b')', b'{', b'%', b'*', b'"', b'\\', b']', 0x00, 0x1f, 0x7f, 0x80,
        ] {
            assert!(!is_atom_char(byte), "{byte} should not be an atom char");
        }
    }

    #[test]
    fn test_astring_chars() {
        assert!(is_astring_char(b']'));
        assert!(!is_astring_char(b'%'));
    }

    #[test]
    fn test_escape_unescape_quoted() {
        let tests = [
            ("", ""),
            ("a", "a"),
            ("\"", "\\\""),
            ("\\", "\\\\"),
            ("alice \"bob\"", "alice \\\"bob\\\""),
        ];

        for (unescaped, escaped) in tests {
            assert_eq!(escape_quoted(unescaped), escaped);
            assert_eq!(unescape_quoted(escaped), unescaped);
        }
    }
}
