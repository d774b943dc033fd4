use std::path::PathBuf;

use serde::{
    Deserialize,
    Serialize,
};

use crate::{
    dictionary::token_dictionary::{
        DictType,
        DownloadPolicy,
    },
    persistence::{
        get_data_file_path,
        load_json_or_default,
        save_json,
    },
};

use super::HikkiError;

const SETTINGS_FILE: &str = "settings.json";

/// Which analyzer backs the tokenizer capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", content = "model", rename_all = "lowercase")]
pub enum TokenizerBackend {
    Vibrato(DictType),
}

impl Default for TokenizerBackend {
    fn default() -> Self {
        TokenizerBackend::Vibrato(DictType::Unidic)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub tokenizer: TokenizerBackend,
    /// Yomitan term dictionary zip or extracted folder.
    pub term_dictionary: Option<PathBuf>,
    pub vocabulary_store: String,
    pub flashcard_store: String,
    /// Tokenize lines and resolve words on the rayon pool.
    pub parallel: bool,
    pub model_download: DownloadPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tokenizer: TokenizerBackend::default(),
            term_dictionary: None,
            vocabulary_store: "vocabulary.json".to_string(),
            flashcard_store: "flashcards.json".to_string(),
            parallel: true,
            model_download: DownloadPolicy::default(),
        }
    }
}

impl Settings {
    pub fn load() -> Self {
        load_json_or_default(&get_data_file_path(SETTINGS_FILE))
    }

    pub fn save(&self) -> Result<(), HikkiError> {
        save_json(self, &get_data_file_path(SETTINGS_FILE))
    }

    pub fn vocabulary_store_path(&self) -> PathBuf {
        get_data_file_path(&self.vocabulary_store)
    }

    pub fn flashcard_store_path(&self) -> PathBuf {
        get_data_file_path(&self.flashcard_store)
    }
}
