use wana_kana::ConvertJapanese;

/// CJK Unified Ideographs, the main block plus extensions A through G.
pub fn is_kanji(ch: char) -> bool {
    matches!(ch,
        '\u{4E00}'..='\u{9FFF}'      // Main block
        | '\u{3400}'..='\u{4DBF}'    // Extension A
        | '\u{20000}'..='\u{2A6DF}'  // Extension B
        | '\u{2A700}'..='\u{2EBEF}'  // Extensions C-F
        | '\u{30000}'..='\u{3134F}'  // Extension G
    )
}

pub fn is_hiragana(ch: char) -> bool {
    ('\u{3040}'..='\u{309F}').contains(&ch)
}

pub fn is_katakana(ch: char) -> bool {
    matches!(ch,
        '\u{30A0}'..='\u{30FF}'      // Katakana (includes ー and ・)
        | '\u{31F0}'..='\u{31FF}'    // Phonetic extensions
        | '\u{FF66}'..='\u{FF9F}'    // Halfwidth forms
    )
}

pub fn is_japanese_char(ch: char) -> bool {
    is_kanji(ch) || is_hiragana(ch) || is_katakana(ch)
}

/// Anything that is neither kanji nor kana: ASCII, punctuation, symbols.
pub fn is_punctuation(ch: char) -> bool {
    !is_japanese_char(ch)
}

pub fn contains_kanji(word: &str) -> bool {
    word.chars().any(is_kanji)
}

/// True when every character is kanji, hiragana or katakana. Empty strings are not Japanese.
pub fn only_japanese_chars(word: &str) -> bool {
    !word.is_empty() && word.chars().all(is_japanese_char)
}

pub fn to_hiragana(word: &str) -> String {
    word.to_hiragana()
}

pub fn to_katakana(word: &str) -> String {
    word.to_katakana()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_character_classes() {
        assert!(is_kanji('漢'));
        assert!(is_kanji('食'));
        assert!(!is_kanji('た'));
        assert!(!is_kanji('々')); // iteration mark is not a unified ideograph

        assert!(is_hiragana('べ'));
        assert!(!is_hiragana('ベ'));

        assert!(is_katakana('ベ'));
        assert!(is_katakana('ー'));
        assert!(is_katakana('ｶ'));

        assert!(is_punctuation('。'));
        assert!(is_punctuation('a'));
        assert!(is_punctuation('!'));
        assert!(!is_punctuation('あ'));
    }

    #[test]
    fn test_word_checks() {
        assert!(contains_kanji("食べる"));
        assert!(!contains_kanji("たべる"));
        assert!(only_japanese_chars("キャラ作り"));
        assert!(!only_japanese_chars("Tシャツ"));
        assert!(!only_japanese_chars("です。"));
        assert!(!only_japanese_chars(""));
    }

    #[test]
    fn test_kana_conversion() {
        assert_eq!(to_hiragana("タベル"), "たべる");
        assert_eq!(to_katakana("かんじ"), "カンジ");
    }
}
