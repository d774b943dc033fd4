use tracing::debug;

use super::token_models::{
    FeatureLayout,
    VibratoToken,
};
use crate::{
    core::{
        HikkiError,
        Token,
    },
    dictionary::token_dictionary::{
        ensure_dictionary,
        load_dictionary,
        DictType,
        DownloadPolicy,
    },
};

/// Morphological analysis capability the pipeline and resolver depend on.
pub trait Tokenizer: Send + Sync {
    /// Split a line of text into ordered tokens.
    fn tokenize(&self, text: &str) -> Vec<Token>;

    /// Candidate dictionary-form tokens for `token`. May yield several tokens for compounds
    /// and none when the normalized form cannot be analyzed.
    fn normalize(&self, token: &Token) -> Vec<Token> {
        if token.normalized_form.trim().is_empty() {
            return Vec::new();
        }
        self.tokenize(&token.normalized_form)
    }
}

pub struct VibratoTokenizer {
    tokenizer: vibrato::Tokenizer,
    layout: FeatureLayout,
}

impl VibratoTokenizer {
    pub fn new(tokenizer: vibrato::Tokenizer, dict_type: &DictType) -> Self {
        Self { tokenizer, layout: dict_type.feature_layout() }
    }
}

impl Tokenizer for VibratoTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        let mut worker = self.tokenizer.new_worker();
        worker.reset_sentence(text);
        worker.tokenize();

        let tokens: Vec<Token> = worker
            .token_iter()
            .map(|token| VibratoToken::from(token).into_token(self.layout))
            .collect();

        debug!("Tokenized {:?} into {} tokens", text, tokens.len());
        tokens
    }
}

/// Load the vibrato model for `dict_type`, downloading it first when it is not cached yet.
pub fn init_vibrato(
    dict_type: &DictType,
    policy: &DownloadPolicy,
) -> Result<VibratoTokenizer, HikkiError> {
    let dict_path = ensure_dictionary(dict_type, policy)?;
    let dict = load_dictionary(&dict_path)?;
    let tokenizer = vibrato::Tokenizer::new(dict);
    Ok(VibratoTokenizer::new(tokenizer, dict_type))
}
