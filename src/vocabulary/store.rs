//! Vocabulary rows and the token id cache, behind one lock.

use std::{
    collections::HashMap,
    path::Path,
    sync::Mutex,
};

use serde::{
    Deserialize,
    Serialize,
};
use tracing::{
    debug,
    info,
};

use super::{
    NewVocabulary,
    Vocabulary,
};
use crate::{
    core::HikkiError,
    persistence::{
        load_json,
        save_json,
    },
};

/// Serialized form of the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VocabularySnapshot {
    pub vocabularies: Vec<Vocabulary>,
    pub token_index: HashMap<String, u64>, // token id -> vocabulary id
}

#[derive(Default)]
struct VocabularyState {
    vocabularies: Vec<Vocabulary>, // Sorted by id
    by_dict_id: HashMap<u64, usize>,
    token_index: HashMap<String, u64>,
}

impl VocabularyState {
    fn from_snapshot(snapshot: VocabularySnapshot) -> Self {
        let mut vocabularies = snapshot.vocabularies;
        vocabularies.sort_by_key(|v| v.id);

        let by_dict_id =
            vocabularies.iter().enumerate().map(|(position, v)| (v.dict_id, position)).collect();

        VocabularyState { vocabularies, by_dict_id, token_index: snapshot.token_index }
    }

    fn get(&self, id: u64) -> Option<&Vocabulary> {
        self.vocabularies.binary_search_by_key(&id, |v| v.id).ok().map(|p| &self.vocabularies[p])
    }
}

#[derive(Default)]
pub struct VocabularyStore {
    state: Mutex<VocabularyState>,
}

impl VocabularyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: VocabularySnapshot) -> Self {
        VocabularyStore { state: Mutex::new(VocabularyState::from_snapshot(snapshot)) }
    }

    /// Load from a JSON snapshot; a missing file yields an empty store.
    pub fn load(path: &Path) -> Result<Self, HikkiError> {
        let snapshot: VocabularySnapshot = load_json(path)?;
        info!(
            "Loaded {} vocabularies and {} cached tokens from {:?}",
            snapshot.vocabularies.len(),
            snapshot.token_index.len(),
            path
        );
        Ok(Self::from_snapshot(snapshot))
    }

    pub fn save(&self, path: &Path) -> Result<(), HikkiError> {
        save_json(&self.snapshot()?, path)
    }

    pub fn snapshot(&self) -> Result<VocabularySnapshot, HikkiError> {
        let state = self.state.lock()?;
        Ok(VocabularySnapshot {
            vocabularies: state.vocabularies.clone(),
            token_index: state.token_index.clone(),
        })
    }

    pub fn len(&self) -> Result<usize, HikkiError> {
        Ok(self.state.lock()?.vocabularies.len())
    }

    pub fn is_empty(&self) -> Result<bool, HikkiError> {
        Ok(self.len()? == 0)
    }

    pub fn get(&self, id: u64) -> Result<Option<Vocabulary>, HikkiError> {
        Ok(self.state.lock()?.get(id).cloned())
    }

    pub fn get_by_dict_id(&self, dict_id: u64) -> Result<Option<Vocabulary>, HikkiError> {
        let state = self.state.lock()?;
        Ok(state.by_dict_id.get(&dict_id).map(|&p| state.vocabularies[p].clone()))
    }

    /// Cached vocabulary for a token id.
    pub fn get_by_token(&self, token_id: &str) -> Result<Option<Vocabulary>, HikkiError> {
        let state = self.state.lock()?;
        Ok(state.token_index.get(token_id).and_then(|&id| state.get(id)).cloned())
    }

    /// Return the row for `dict_id`, creating it from `draft` if absent. The boolean is true when
    /// this call created the row. Check and insert happen under the same lock.
    pub fn get_or_create(
        &self,
        dict_id: u64,
        draft: NewVocabulary,
    ) -> Result<(Vocabulary, bool), HikkiError> {
        let mut state = self.state.lock()?;

        if let Some(&position) = state.by_dict_id.get(&dict_id) {
            return Ok((state.vocabularies[position].clone(), false));
        }

        let vocabulary = Vocabulary {
            id: state.vocabularies.last().map_or(1, |last| last.id + 1),
            dict_id,
            word: draft.word,
            reading: draft.reading,
            kanji: draft.segmented.kanji,
            furigana: draft.segmented.furigana,
            okurigana: draft.segmented.okurigana,
        };
        debug!(
            "Created vocabulary {} ({}) for dictionary entry {}",
            vocabulary.id, vocabulary.word, dict_id
        );

        let position = state.vocabularies.len();
        state.vocabularies.push(vocabulary.clone());
        state.by_dict_id.insert(dict_id, position);

        Ok((vocabulary, true))
    }

    /// Link `token_id` to a vocabulary. The first link of a token id wins; repeating it is a no-op.
    pub fn index_token(&self, token_id: &str, vocabulary_id: u64) -> Result<(), HikkiError> {
        let mut state = self.state.lock()?;
        if state.get(vocabulary_id).is_none() {
            return Err(HikkiError::VocabularyNotFound(vocabulary_id));
        }

        let linked = *state.token_index.entry(token_id.to_string()).or_insert(vocabulary_id);
        if linked != vocabulary_id {
            debug!("Token {} already linked to vocabulary {}, keeping it", token_id, linked);
        }
        Ok(())
    }
}
