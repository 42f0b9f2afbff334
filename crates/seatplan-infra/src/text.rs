//! Text normalisation for roster fields

use unicode_normalization::UnicodeNormalization;

/// Strip diacritics: "Łódź, ul. Żółta" -> "Lodz, ul. Zolta".
///
/// NFD splits most accented letters into base + combining mark; the marks are
/// dropped. Stroked letters have no decomposition and are mapped directly.
pub fn fold_accents(input: &str) -> String {
    input
        .nfd()
        .filter(|c| !unicode_normalization::char::is_combining_mark(*c))
        .map(|c| match c {
            'ł' => 'l',
            'Ł' => 'L',
            'đ' => 'd',
            'Đ' => 'D',
            'ø' => 'o',
            'Ø' => 'O',
            other => other,
        })
        .collect()
}

/// Key used to compare header names: accent-free, lowercase, trimmed
pub fn header_key(input: &str) -> String {
    fold_accents(input.trim()).to_lowercase()
}
