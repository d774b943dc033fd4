//Feature columns: https://gist.github.com/masayu-a/e3eee0637c07d4019ec9 (unidic)
//and the mecab-ipadic README for ipadic

use vibrato::dictionary::LexType;

use crate::{
    core::{
        utils::{
            contains_kanji,
            to_katakana,
        },
        Token,
    },
    dictionary::token_dictionary::DictType,
};

pub struct VibratoToken {
    pub surface: String,
    pub features: String,
    pub lex_type: LexType,
    pub word_id: u32,
}

impl From<vibrato::token::Token<'_, '_>> for VibratoToken {
    fn from(value: vibrato::token::Token) -> Self {
        let word_idx = value.word_idx();
        Self {
            surface: value.surface().into(),
            features: value.feature().into(),
            lex_type: word_idx.lex_type,
            word_id: word_idx.word_id,
        }
    }
}

/// Where the fields we care about live in a comma separated feature string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureLayout {
    pub pos: usize,
    pub reading: usize,
    pub lemma: usize,
    pub normalized: usize,
}

impl DictType {
    pub fn feature_layout(&self) -> FeatureLayout {
        match self {
            // pos1, kana, orth_base, lemma
            DictType::Unidic => FeatureLayout { pos: 0, reading: 20, lemma: 10, normalized: 7 },
            // 品詞, 読み, 原形, 原形
            DictType::Ipadic => FeatureLayout { pos: 0, reading: 7, lemma: 6, normalized: 6 },
        }
    }
}

impl VibratoToken {
    pub fn token_id(&self) -> String {
        match self.lex_type {
            // Unknown words share entry ids per character class, so the surface keeps them apart
            LexType::Unknown => format!("vibrato__unk_{}_{}", self.word_id, self.surface),
            other => format!("vibrato__{:?}_{}", other, self.word_id),
        }
    }

    pub fn into_token(self, layout: FeatureLayout) -> Token {
        let fields: Vec<&str> = self.features.split(',').collect();

        // Helper to get field, None if missing or unset
        let get_field = |idx: usize| {
            fields.get(idx).map(|f| f.trim()).filter(|f| !f.is_empty() && *f != "*")
        };

        // Kana spell their own reading, kanji without one stay unread
        let reading_form = match get_field(layout.reading) {
            Some(reading) => reading.to_string(),
            None if contains_kanji(&self.surface) => String::new(),
            None => to_katakana(&self.surface),
        };
        let lemma = get_field(layout.lemma).unwrap_or(&self.surface).to_string();
        let normalized_form =
            get_field(layout.normalized).map(strip_lemma_gloss).unwrap_or_else(|| lemma.clone());
        let part_of_speech = get_field(layout.pos).unwrap_or("*").to_string();

        Token {
            token_id: self.token_id(),
            surface: self.surface,
            reading_form,
            normalized_form,
            lemma,
            part_of_speech,
        }
    }
}

/// UniDic lemmas of loanwords carry their origin, e.g. "コンピューター-computer".
fn strip_lemma_gloss(lemma: &str) -> String {
    match lemma.split_once('-') {
        Some((head, gloss))
            if !head.is_empty() && gloss.chars().all(|c| c.is_ascii_alphabetic() || c == '_') =>
        {
            head.to_string()
        }
        _ => lemma.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unidic_features(pos1: &str, lemma: &str, orth_base: &str, kana: &str) -> String {
        let mut fields = vec!["*"; 29];
        fields[0] = pos1;
        fields[7] = lemma;
        fields[10] = orth_base;
        fields[20] = kana;
        fields.join(",")
    }

    #[test]
    fn test_unidic_token_conversion() {
        let vibrato_token = VibratoToken {
            surface: "食べ".to_string(),
            features: unidic_features("動詞", "食べる", "食べる", "タベ"),
            lex_type: LexType::System,
            word_id: 42,
        };

        let token = vibrato_token.into_token(DictType::Unidic.feature_layout());
        assert_eq!(token.surface, "食べ");
        assert_eq!(token.token_id, "vibrato__System_42");
        assert_eq!(token.reading_form, "タベ");
        assert_eq!(token.normalized_form, "食べる");
        assert_eq!(token.lemma, "食べる");
        assert_eq!(token.part_of_speech, "動詞");
    }

    #[test]
    fn test_short_features_fall_back_to_surface() {
        let vibrato_token = VibratoToken {
            surface: "ぴえん".to_string(),
            features: "名詞,普通名詞,一般,*,*,*".to_string(),
            lex_type: LexType::Unknown,
            word_id: 3,
        };

        let token = vibrato_token.into_token(DictType::Unidic.feature_layout());
        assert_eq!(token.token_id, "vibrato__unk_3_ぴえん");
        assert_eq!(token.reading_form, "ピエン");
        assert_eq!(token.normalized_form, "ぴえん");
        assert_eq!(token.part_of_speech, "名詞");
    }

    #[test]
    fn test_unknown_kanji_word_has_no_reading() {
        let vibrato_token = VibratoToken {
            surface: "㷔".to_string(),
            features: "名詞,普通名詞,一般,*,*,*".to_string(),
            lex_type: LexType::Unknown,
            word_id: 7,
        };

        let token = vibrato_token.into_token(DictType::Unidic.feature_layout());
        assert_eq!(token.reading_form, "");
        assert!(token.segmented().is_empty());
        assert_eq!(token.normalized_form, "㷔");
    }

    #[test]
    fn test_loanword_gloss_is_stripped() {
        assert_eq!(strip_lemma_gloss("コンピューター-computer"), "コンピューター");
        assert_eq!(strip_lemma_gloss("食べる"), "食べる");
        assert_eq!(strip_lemma_gloss("-"), "-");
    }
}
