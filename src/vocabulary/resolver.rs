//! Turns tokens into dictionary-backed vocabulary, memoizing each token id.

use std::sync::Arc;

use rayon::prelude::*;
use tracing::{
    debug,
    error,
    warn,
};

use super::{
    DefinedVocabulary,
    NewVocabulary,
    Vocabulary,
    VocabularyStore,
};
use crate::{
    core::{
        HikkiError,
        Token,
        WordFrequencyEntry,
    },
    dictionary::{
        Dictionary,
        Entry,
    },
    segmentation::tokenizer::Tokenizer,
};

/// Vocabularies found for some input plus the surfaces no dictionary entry could be found for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub vocabularies: Vec<Vocabulary>,
    pub failures: Vec<String>,
}

impl Resolution {
    fn push_vocabulary(&mut self, vocabulary: Vocabulary) {
        if !self.vocabularies.iter().any(|v| v.id == vocabulary.id) {
            self.vocabularies.push(vocabulary);
        }
    }

    fn push_failure(&mut self, surface: &str) {
        if !self.failures.iter().any(|f| f == surface) {
            self.failures.push(surface.to_string());
        }
    }

    /// Union of both resolutions, keeping first-seen order.
    pub fn merge(mut self, other: Resolution) -> Resolution {
        for vocabulary in other.vocabularies {
            self.push_vocabulary(vocabulary);
        }
        for failure in &other.failures {
            self.push_failure(failure);
        }
        self
    }
}

pub struct VocabularyResolver {
    tokenizer: Arc<dyn Tokenizer>,
    dictionary: Arc<dyn Dictionary>,
    store: Arc<VocabularyStore>,
    parallel: bool,
}

impl VocabularyResolver {
    pub fn new(
        tokenizer: Arc<dyn Tokenizer>,
        dictionary: Arc<dyn Dictionary>,
        store: Arc<VocabularyStore>,
    ) -> Self {
        Self { tokenizer, dictionary, store, parallel: true }
    }

    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn store(&self) -> &Arc<VocabularyStore> {
        &self.store
    }

    /// Resolve one token. A cached token id costs no dictionary call; otherwise every candidate
    /// from normalization is looked up and either linked to a vocabulary or recorded as a failure.
    pub fn resolve(&self, token: &Token) -> Result<Resolution, HikkiError> {
        let mut resolution = Resolution::default();

        if let Some(vocabulary) = self.store.get_by_token(&token.token_id)? {
            debug!("Token index hit for {}", token);
            resolution.push_vocabulary(vocabulary);
            return Ok(resolution);
        }

        let candidates = self.tokenizer.normalize(token);
        if candidates.is_empty() {
            warn!("No normalized form for {}", token);
            resolution.push_failure(&token.surface);
            return Ok(resolution);
        }

        for candidate in &candidates {
            match self.resolve_candidate(candidate)? {
                Some(vocabulary) => resolution.push_vocabulary(vocabulary),
                None => resolution.push_failure(&candidate.surface),
            }
        }

        // Compounds are not cached under the original token id
        if let [single] = candidates.as_slice() {
            if let Some(vocabulary) = resolution.vocabularies.first() {
                if single.token_id != token.token_id {
                    self.store.index_token(&token.token_id, vocabulary.id)?;
                }
            }
        }

        Ok(resolution)
    }

    fn resolve_candidate(&self, candidate: &Token) -> Result<Option<Vocabulary>, HikkiError> {
        if let Some(vocabulary) = self.store.get_by_token(&candidate.token_id)? {
            return Ok(Some(vocabulary));
        }

        let Some(entry) = self.lookup(&candidate.normalized_form) else {
            return Ok(None);
        };

        let (vocabulary, created) =
            self.store.get_or_create(entry.id, NewVocabulary::from(candidate))?;
        if created {
            debug!("New vocabulary {} from {}", vocabulary.word, candidate);
        }
        self.store.index_token(&candidate.token_id, vocabulary.id)?;

        Ok(Some(vocabulary))
    }

    /// First dictionary entry for `word`. Lookup errors count as misses.
    fn lookup(&self, word: &str) -> Option<Entry> {
        match self.dictionary.lookup(word) {
            Ok(entries) => {
                let entry = entries.into_iter().next();
                if entry.is_none() {
                    warn!("Couldn't find {} in the dictionary", word);
                }
                entry
            }
            Err(e) => {
                error!("Dictionary lookup for {} failed: {}", word, e);
                None
            }
        }
    }

    /// Attach the meanings of `vocabulary`, found by its dictionary id. An entry that is gone
    /// from the dictionary yields no translations.
    pub fn define(&self, vocabulary: Vocabulary) -> Result<DefinedVocabulary, HikkiError> {
        let translations = match self.dictionary.entry(vocabulary.dict_id)? {
            Some(entry) => entry.translations,
            None => {
                warn!("Dictionary has no entry {} for {}", vocabulary.dict_id, vocabulary.word);
                Vec::new()
            }
        };
        Ok(DefinedVocabulary { vocabulary, translations })
    }

    /// Resolve many tokens, in parallel when enabled.
    pub fn resolve_all(&self, tokens: &[Token]) -> Result<Resolution, HikkiError> {
        let resolutions: Vec<Resolution> = if self.parallel {
            tokens.par_iter().map(|token| self.resolve(token)).collect::<Result<_, _>>()?
        } else {
            tokens.iter().map(|token| self.resolve(token)).collect::<Result<_, _>>()?
        };

        Ok(resolutions.into_iter().fold(Resolution::default(), Resolution::merge))
    }

    /// Resolve a word list entry by re-tokenizing its word. A single resulting vocabulary with no
    /// failures next to it is also cached under the entry's token id.
    pub fn resolve_entry(&self, entry: &WordFrequencyEntry) -> Result<Resolution, HikkiError> {
        if let Some(vocabulary) = self.store.get_by_token(&entry.token_id)? {
            return Ok(Resolution { vocabularies: vec![vocabulary], failures: Vec::new() });
        }

        let tokens = self.tokenizer.tokenize(&entry.word);
        let resolution = tokens
            .iter()
            .map(|token| self.resolve(token))
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .fold(Resolution::default(), Resolution::merge);

        if let ([vocabulary], []) =
            (resolution.vocabularies.as_slice(), resolution.failures.as_slice())
        {
            self.store.index_token(&entry.token_id, vocabulary.id)?;
        }

        Ok(resolution)
    }
}
