use std::fmt;

use serde::{
    Deserialize,
    Serialize,
};

use super::utils::{
    self,
    contains_kanji,
    only_japanese_chars,
};
use crate::segmentation::segmenter::{
    segment,
    SegmentedWord,
};

/// One morpheme as produced by a tokenizer backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub surface: String,        // How it is found in the text
    pub token_id: String,       // Backend-specific stable id, e.g. "vibrato__System_123"
    pub reading_form: String,   // Phonetic reading in katakana
    pub normalized_form: String, // Form used for dictionary lookup
    pub lemma: String,          // Dictionary form
    pub part_of_speech: String, // Top level POS tag, e.g. 動詞
}

impl Token {
    pub fn contains_kanji(&self) -> bool {
        contains_kanji(&self.surface)
    }

    pub fn only_contains_japanese_chars(&self) -> bool {
        only_japanese_chars(&self.surface)
    }

    pub fn is_punctuation(&self) -> bool {
        let mut chars = self.surface.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => utils::is_punctuation(ch),
            _ => false,
        }
    }

    pub fn hiragana(&self) -> String {
        utils::to_hiragana(&self.reading_form)
    }

    pub fn katakana(&self) -> String {
        utils::to_katakana(&self.reading_form)
    }

    /// Empty when there is no kanji or the analyzer gave no reading.
    pub fn segmented(&self) -> SegmentedWord {
        if self.reading_form.is_empty() {
            return SegmentedWord::default();
        }
        segment(&self.surface, &self.reading_form)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.surface, self.part_of_speech)
    }
}

/// Occurrence count of one token identity inside a page or notebook.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WordFrequencyEntry {
    pub word: String,
    pub token_id: String,
    pub count: u32,
}
