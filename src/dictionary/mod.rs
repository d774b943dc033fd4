pub mod term_dictionary;
pub mod token_dictionary;

use serde::{
    Deserialize,
    Serialize,
};

use crate::core::HikkiError;

/// One dictionary entry (a JMdict sequence) with all of its written forms.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub id: u64,
    pub kanji_forms: Vec<String>,
    pub kana_forms: Vec<String>,
    pub translations: Vec<String>,
}

/// Bilingual dictionary capability. An empty result means the word is unknown; `Err` means the
/// dictionary itself could not answer.
pub trait Dictionary: Send + Sync {
    fn lookup(&self, word: &str) -> Result<Vec<Entry>, HikkiError>;

    /// The entry with dictionary id `id`, as handed out by `lookup`.
    fn entry(&self, id: u64) -> Result<Option<Entry>, HikkiError>;
}

#[derive(Deserialize, Debug)]
pub struct DictionaryIndex {
    pub title: String,
    pub revision: String,

    pub format: Option<u8>, //Must have one
    pub version: Option<u8>,
}

/// A row of a Yomitan `term_bank_N.json` file (format 3).
#[derive(Deserialize, Debug)]
pub struct TermBankV3 {
    pub expression: String,
    pub reading: String,
    pub definition_tags: Option<String>,
    pub rules: String,
    pub score: f64,
    pub glossary: Vec<serde_json::Value>,
    pub sequence: i64,
    pub term_tags: String,
}

impl TermBankV3 {
    /// Plain text of every gloss, flattening structured content.
    pub fn glossary_text(&self) -> Vec<String> {
        self.glossary
            .iter()
            .filter_map(|gloss| {
                let mut buffer = String::new();
                collect_text(gloss, &mut buffer);
                let text = buffer.trim().to_string();
                (!text.is_empty()).then_some(text)
            })
            .collect()
    }
}

fn collect_text(value: &serde_json::Value, buffer: &mut String) {
    match value {
        serde_json::Value::String(text) => buffer.push_str(text),
        serde_json::Value::Array(items) => {
            for item in items {
                collect_text(item, buffer);
            }
        }
        serde_json::Value::Object(map) => {
            if let Some(text) = map.get("text") {
                collect_text(text, buffer);
            } else if let Some(content) = map.get("content") {
                collect_text(content, buffer);
            }
        }
        _ => {}
    }
}
