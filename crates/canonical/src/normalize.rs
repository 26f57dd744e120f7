//! Whitespace collapsing and ASCII case folding.
//!
//! # Algorithm
//!
//! 1. Walk the input characters. A whitespace character is dropped when the
//!    previously emitted character was whitespace too, so every whitespace
//!    run shrinks to its first character.
//! 2. Every kept whitespace character becomes an ASCII space and every other
//!    character is ASCII-lowercased.
//!
//! Leading and trailing whitespace is collapsed but not trimmed. Non-ASCII
//! characters pass through untouched.
//!
//! # Examples
//!
//! ```rust
//! use canonical::normalize_text;
//!
//! assert_eq!(normalize_text("Hello \t\n World"), "hello world");
//! assert_eq!(normalize_text("  Padded  "), " padded ");
//! ```

/// Whitespace as the C locale defines it: space, `\t`, `\n`, `\v`, `\f`, `\r`.
///
/// Unicode spaces such as U+00A0 are ordinary characters here.
#[inline]
pub fn is_space(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\u{0B}' | '\u{0C}' | '\r')
}

#[inline]
pub(crate) fn is_space_byte(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | 0x0B | 0x0C | b'\r')
}

/// Collapse whitespace runs and lowercase ASCII letters.
///
/// Pure and infallible. Normalizing already-normalized text returns it
/// unchanged.
pub fn normalize_text(text: &str) -> String {
    let mut normalized = String::with_capacity(text.len());
    let mut prev_space = false;
    for ch in text.chars() {
        let space = is_space(ch);
        if space && prev_space {
            continue;
        }
        prev_space = space;
        normalized.push(if space { ' ' } else { ch.to_ascii_lowercase() });
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_mixed_whitespace_runs() {
        assert_eq!(normalize_text("a \t\r\n b"), "a b");
        assert_eq!(normalize_text("a\n\nb"), "a b");
    }

    #[test]
    fn single_whitespace_becomes_space() {
        assert_eq!(normalize_text("a\tb\nc"), "a b c");
    }

    #[test]
    fn edges_are_collapsed_not_trimmed() {
        assert_eq!(normalize_text("   x   "), " x ");
    }

    #[test]
    fn lowercases_ascii_only() {
        assert_eq!(normalize_text("ÄBC Déjà VU"), "Äbc déjà vu");
    }

    #[test]
    fn unicode_spaces_are_kept() {
        assert_eq!(normalize_text("a\u{00A0}\u{00A0}b"), "a\u{00A0}\u{00A0}b");
    }

    #[test]
    fn empty_input() {
        assert_eq!(normalize_text(""), "");
    }

    #[test]
    fn idempotent() {
        let inputs = [
            "",
            "  Hello,\t\tWORLD \n\n again ",
            "already normalized text",
            "\u{0B}\u{0C}mixed\r\ncontrol",
        ];
        for input in inputs {
            let once = normalize_text(input);
            assert_eq!(normalize_text(&once), once, "input {input:?}");
        }
    }
}
