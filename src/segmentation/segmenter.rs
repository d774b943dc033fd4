//! Splits a morpheme into kanji stem, furigana and okurigana and renders it as ruby markup.

use html_escape::{
    encode_double_quoted_attribute,
    encode_text,
};
use serde::{
    Deserialize,
    Serialize,
};

use crate::core::{
    utils::{
        contains_kanji,
        is_kanji,
        to_hiragana,
    },
    Token,
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentedWord {
    pub kanji: String,
    pub furigana: String,
    pub okurigana: String,
}

impl SegmentedWord {
    pub fn is_empty(&self) -> bool {
        self.kanji.is_empty() && self.furigana.is_empty() && self.okurigana.is_empty()
    }
}

/// Split `surface` using its phonetic `reading`.
///
/// The trailing non-kanji run of the surface is assumed to have the same length in the reading,
/// which holds for analyzer output. The reading is compared in hiragana regardless of the script
/// it arrives in. A surface without kanji yields an empty segmentation.
pub fn segment(surface: &str, reading: &str) -> SegmentedWord {
    if !contains_kanji(surface) {
        return SegmentedWord::default();
    }

    let reading: Vec<char> = to_hiragana(reading).chars().collect();
    let surface: Vec<char> = surface.chars().collect();

    let okurigana_len = surface.iter().rev().take_while(|ch| !is_kanji(**ch)).count();

    if okurigana_len == 0 {
        // Whole word consists of kanji
        return SegmentedWord {
            kanji: surface.iter().collect(),
            furigana: reading.iter().collect(),
            okurigana: String::new(),
        };
    }

    let stem_end = surface.len() - okurigana_len;
    let split_at = reading.len().saturating_sub(okurigana_len);

    SegmentedWord {
        kanji: surface[..stem_end].iter().collect(),
        furigana: reading[..split_at].iter().collect(),
        okurigana: reading[split_at..].iter().collect(),
    }
}

pub fn render_plain(surface: &str) -> String {
    encode_text(surface).into_owned()
}

pub fn render_ruby(token_id: &str, segmented: &SegmentedWord) -> String {
    format!(
        "<ruby data-word-id=\"{}\"><rb>{}</rb><rp>(</rp><rt>{}</rt><rp>)</rp></ruby>{}",
        encode_double_quoted_attribute(token_id),
        encode_text(&segmented.kanji),
        encode_text(&segmented.furigana),
        encode_text(&segmented.okurigana),
    )
}

/// Ruby fragment for tokens carrying kanji and a reading, plain escaped text otherwise.
pub fn render_token(token: &Token) -> String {
    let segmented = token.segmented();
    if segmented.is_empty() {
        render_plain(&token.surface)
    } else {
        render_ruby(&token.token_id, &segmented)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_kanji_is_empty() {
        assert!(segment("たべる", "タベル").is_empty());
        assert!(segment("キャラ", "キャラ").is_empty());
        assert!(segment("hello", "").is_empty());
        assert!(segment("", "").is_empty());
    }

    #[test]
    fn test_all_kanji() {
        let word = segment("漢字", "カンジ");
        assert_eq!(word.kanji, "漢字");
        assert_eq!(word.furigana, "かんじ");
        assert_eq!(word.okurigana, "");

        // Already hiragana readings are left as they are
        let word = segment("漢字", "かんじ");
        assert_eq!(word.furigana, "かんじ");
    }

    #[test]
    fn test_trailing_okurigana() {
        let word = segment("食べる", "たべる");
        assert_eq!(word.kanji, "食");
        assert_eq!(word.furigana, "た");
        assert_eq!(word.okurigana, "べる");

        let word = segment("美しい", "ウツクシイ");
        assert_eq!(word.kanji, "美");
        assert_eq!(word.furigana, "うつく");
        assert_eq!(word.okurigana, "しい");
    }

    #[test]
    fn test_only_trailing_run_is_split() {
        // Kana between kanji stays inside the stem
        let word = segment("取り扱う", "トリアツカウ");
        assert_eq!(word.kanji, "取り扱");
        assert_eq!(word.furigana, "とりあつか");
        assert_eq!(word.okurigana, "う");
    }

    #[test]
    fn test_short_reading_saturates() {
        let word = segment("食べる", "タ");
        assert_eq!(word.kanji, "食");
        assert_eq!(word.furigana, "");
        assert_eq!(word.okurigana, "た");
    }

    #[test]
    fn test_render_ruby() {
        let word = segment("食べる", "タベル");
        assert_eq!(
            render_ruby("vibrato__System_42", &word),
            "<ruby data-word-id=\"vibrato__System_42\"><rb>食</rb><rp>(</rp><rt>た</rt><rp>)</rp></ruby>べる"
        );
    }

    #[test]
    fn test_render_token_without_reading_is_plain() {
        let mut token = Token {
            surface: "薔薇".to_string(),
            token_id: "vibrato__unk_1_薔薇".to_string(),
            reading_form: "バラ".to_string(),
            normalized_form: "薔薇".to_string(),
            lemma: "薔薇".to_string(),
            part_of_speech: "名詞".to_string(),
        };
        assert!(render_token(&token).contains("<rt>ばら</rt>"));

        token.reading_form = String::new();
        assert_eq!(render_token(&token), "薔薇");
    }

    #[test]
    fn test_render_plain_escapes() {
        assert_eq!(render_plain("<b>&"), "&lt;b&gt;&amp;");
        assert_eq!(render_plain("です"), "です");
    }
}
