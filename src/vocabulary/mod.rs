pub mod resolver;
pub mod store;

use serde::{
    Deserialize,
    Serialize,
};

pub use resolver::{
    Resolution,
    VocabularyResolver,
};
pub use store::VocabularyStore;

use crate::{
    core::Token,
    segmentation::segmenter::{
        render_plain,
        render_ruby,
        SegmentedWord,
    },
};

/// A dictionary-backed word shared by every learner and notebook. Unique by `dict_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    pub id: u64,
    pub dict_id: u64,
    pub word: String,
    pub reading: String, // Hiragana
    pub kanji: String,
    pub furigana: String,
    pub okurigana: String,
}

impl Vocabulary {
    /// Reading with the okurigana split off by a dot (`た.べる`), or the word itself when it has
    /// no kanji.
    pub fn as_text(&self) -> String {
        if self.kanji.is_empty() {
            self.word.clone()
        } else if self.okurigana.is_empty() {
            self.furigana.clone()
        } else {
            format!("{}.{}", self.furigana, self.okurigana)
        }
    }

    pub fn as_html(&self) -> String {
        if self.kanji.is_empty() {
            render_plain(&self.word)
        } else {
            render_ruby(&self.dict_id.to_string(), &self.segmented())
        }
    }

    pub fn segmented(&self) -> SegmentedWord {
        SegmentedWord {
            kanji: self.kanji.clone(),
            furigana: self.furigana.clone(),
            okurigana: self.okurigana.clone(),
        }
    }
}

/// A vocabulary together with the meanings its dictionary entry lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinedVocabulary {
    #[serde(flatten)]
    pub vocabulary: Vocabulary,
    pub translations: Vec<String>,
}

/// Field values for a vocabulary row that does not exist yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVocabulary {
    pub word: String,
    pub reading: String,
    pub segmented: SegmentedWord,
}

impl From<&Token> for NewVocabulary {
    fn from(token: &Token) -> Self {
        NewVocabulary {
            word: token.surface.clone(),
            reading: token.hiragana(),
            segmented: token.segmented(),
        }
    }
}
