//! Regex flag compilation
//!
//! Turns named regex modifiers (as written in config files or on the command
//! line) into a single bitmask, and turns that bitmask back into a configured
//! [`Regex`] when a token is compiled.

use regex::{Regex, RegexBuilder};

use crate::error::ReplaceError;

/// Named regex modifiers understood by the engine.
///
/// The bit values are stable so that a bitmask can be stored in config or
/// passed between processes unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegexFlag {
    /// Only `\n` terminates a line for `.`, `^` and `$`
    UnixLines,
    CaseInsensitive,
    /// Whitespace and `#` comments in the pattern are ignored
    Comments,
    Multiline,
    /// The token is matched as a literal string
    Literal,
    /// `.` also matches line terminators
    DotAll,
    /// No effect: `CaseInsensitive` already folds non-ASCII letters, so
    /// unlike ASCII-only engines this flag changes nothing
    UnicodeCase,
    /// Canonical equivalence; accepted but not supported by the engine
    CanonEq,
}

const FLAG_TABLE: &[(&str, RegexFlag)] = &[
    ("UNIX_LINES", RegexFlag::UnixLines),
    ("CASE_INSENSITIVE", RegexFlag::CaseInsensitive),
    ("COMMENTS", RegexFlag::Comments),
    ("MULTILINE", RegexFlag::Multiline),
    ("LITERAL", RegexFlag::Literal),
    ("DOTALL", RegexFlag::DotAll),
    ("UNICODE_CASE", RegexFlag::UnicodeCase),
    ("CANON_EQ", RegexFlag::CanonEq),
];

impl RegexFlag {
    pub const fn bit(self) -> u32 {
        match self {
            RegexFlag::UnixLines => 0x01,
            RegexFlag::CaseInsensitive => 0x02,
            RegexFlag::Comments => 0x04,
            RegexFlag::Multiline => 0x08,
            RegexFlag::Literal => 0x10,
            RegexFlag::DotAll => 0x20,
            RegexFlag::UnicodeCase => 0x40,
            RegexFlag::CanonEq => 0x80,
        }
    }

    pub fn name(self) -> &'static str {
        FLAG_TABLE
            .iter()
            .find(|(_, flag)| *flag == self)
            .map(|(name, _)| *name)
            .unwrap_or("UNKNOWN")
    }

    /// Look up a flag by name, ignoring ASCII case and surrounding whitespace.
    pub fn from_name(name: &str) -> Option<RegexFlag> {
        let name = name.trim();
        FLAG_TABLE
            .iter()
            .find(|(known, _)| known.eq_ignore_ascii_case(name))
            .map(|(_, flag)| *flag)
    }

    fn is_set(self, bits: u32) -> bool {
        bits & self.bit() != 0
    }
}

/// Combine named flags into a bitmask. An empty list yields `0`.
pub fn compile<S: AsRef<str>>(flag_names: &[S]) -> Result<u32, ReplaceError> {
    flag_names.iter().try_fold(0u32, |bits, name| {
        let name = name.as_ref();
        RegexFlag::from_name(name)
            .map(|flag| bits | flag.bit())
            .ok_or_else(|| ReplaceError::UnrecognizedFlag {
                flag: name.to_string(),
            })
    })
}

/// Compile `pattern` with the modifiers encoded in `bits`.
///
/// Unknown bits are ignored.
pub fn build_regex(pattern: &str, bits: u32) -> Result<Regex, regex::Error> {
    let source = if RegexFlag::Literal.is_set(bits) {
        regex::escape(pattern)
    } else {
        pattern.to_string()
    };

    if RegexFlag::CanonEq.is_set(bits) {
        tracing::debug!("CANON_EQ has no effect on pattern `{}`", pattern);
    }

    RegexBuilder::new(&source)
        .case_insensitive(RegexFlag::CaseInsensitive.is_set(bits))
        .multi_line(RegexFlag::Multiline.is_set(bits))
        .dot_matches_new_line(RegexFlag::DotAll.is_set(bits))
        .ignore_whitespace(RegexFlag::Comments.is_set(bits))
        .crlf(!RegexFlag::UnixLines.is_set(bits))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_flags_compile_to_zero() {
        let names: [&str; 0] = [];
        assert_eq!(compile(&names).unwrap(), 0);
    }

    #[test]
    fn test_flags_are_or_combined() {
        let bits = compile(&["CASE_INSENSITIVE", "MULTILINE", "DOTALL"]).unwrap();
        assert_eq!(bits, 0x02 | 0x08 | 0x20);
    }

    #[test]
    fn test_flag_names_ignore_case() {
        assert_eq!(compile(&["case_insensitive"]).unwrap(), RegexFlag::CaseInsensitive.bit());
        assert_eq!(compile(&[" DotAll "]).unwrap(), RegexFlag::DotAll.bit());
    }

    #[test]
    fn test_duplicate_flags_are_harmless() {
        assert_eq!(compile(&["LITERAL", "LITERAL"]).unwrap(), RegexFlag::Literal.bit());
    }

    #[test]
    fn test_unknown_flag_is_named_in_error() {
        let err = compile(&["MULTILINE", "SHOUTY"]).unwrap_err();
        match err {
            ReplaceError::UnrecognizedFlag { flag } => assert_eq!(flag, "SHOUTY"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_every_table_entry_round_trips() {
        for (name, flag) in FLAG_TABLE {
            assert_eq!(RegexFlag::from_name(name), Some(*flag));
            assert_eq!(flag.name(), *name);
        }
    }

    #[test]
    fn test_case_insensitive_pattern() {
        let re = build_regex("hello", RegexFlag::CaseInsensitive.bit()).unwrap();
        assert!(re.is_match("HeLLo"));
        let re = build_regex("hello", 0).unwrap();
        assert!(!re.is_match("HeLLo"));
    }

    #[test]
    fn test_multiline_anchors() {
        let re = build_regex("^b$", RegexFlag::Multiline.bit()).unwrap();
        assert!(re.is_match("a\nb\nc"));
        let re = build_regex("^b$", 0).unwrap();
        assert!(!re.is_match("a\nb\nc"));
    }

    #[test]
    fn test_dotall() {
        let re = build_regex("a.b", RegexFlag::DotAll.bit()).unwrap();
        assert!(re.is_match("a\nb"));
        let re = build_regex("a.b", 0).unwrap();
        assert!(!re.is_match("a\nb"));
    }

    #[test]
    fn test_literal_escapes_metacharacters() {
        let re = build_regex("a.b(", RegexFlag::Literal.bit()).unwrap();
        assert!(re.is_match("xa.b(y"));
        assert!(!re.is_match("axb("));
    }

    #[test]
    fn test_comments_ignore_whitespace() {
        let re = build_regex("a b # trailing", RegexFlag::Comments.bit()).unwrap();
        assert!(re.is_match("ab"));
    }

    #[test]
    fn test_crlf_line_ends_unless_unix_lines() {
        let multiline = RegexFlag::Multiline.bit();
        let re = build_regex("^a$", multiline).unwrap();
        assert!(re.is_match("a\r\nb"));
        let re = build_regex("^a$", multiline | RegexFlag::UnixLines.bit()).unwrap();
        assert!(!re.is_match("a\r\nb"));
    }

    #[test]
    fn test_case_insensitive_folds_non_ascii_without_unicode_case() {
        let re = build_regex("straße", RegexFlag::CaseInsensitive.bit()).unwrap();
        assert!(re.is_match("STRAßE"));

        let re = build_regex("é", RegexFlag::CaseInsensitive.bit()).unwrap();
        assert!(re.is_match("É"));
        let with_unicode = RegexFlag::CaseInsensitive.bit() | RegexFlag::UnicodeCase.bit();
        assert!(build_regex("é", with_unicode).unwrap().is_match("É"));
    }
}
