//! Case- and accent-insensitive text comparison.

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

/// Normalizes text for comparison.
///
/// The text is decomposed (NFD), combining marks are dropped, and the
/// remainder is lowercased and trimmed. `"  Café "` becomes `"cafe"`.
#[must_use]
pub fn normalize(text: &str) -> String {
    text.trim()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case("Café", "cafe"; "acute accent")]
    #[test_case("  ÁRBOL ", "arbol"; "uppercase with padding")]
    #[test_case("Pingüino", "pinguino"; "diaeresis")]
    #[test_case("Año", "ano"; "tilde")]
    #[test_case("plain", "plain"; "ascii unchanged")]
    fn strips_marks_and_case(input: &str, expected: &str) {
        assert_eq!(normalize(input), expected);
    }

    #[test]
    fn blank_text_normalizes_to_empty() {
        assert_eq!(normalize("   "), "");
    }
}
