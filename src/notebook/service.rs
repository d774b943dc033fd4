//! Page writing and word registration: the pipeline, resolver and flash card store working
//! together on a notebook.

use std::sync::Arc;

use chrono::{
    DateTime,
    Utc,
};
use rayon::prelude::*;
use serde::{
    Deserialize,
    Serialize,
};
use tracing::{
    debug,
    info,
};

use super::Notebook;
use crate::{
    core::{
        AnnotationPipeline,
        HikkiError,
        Token,
    },
    review::{
        FlashCard,
        FlashCardStore,
    },
    vocabulary::{
        DefinedVocabulary,
        Resolution,
        VocabularyResolver,
    },
};

/// Changes to apply to a page. `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct PageEdit {
    pub title: Option<String>,
    pub text: Option<String>,
}

/// Result of a dry analysis: nothing is registered for any learner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    pub html: String,
    pub vocabularies: Vec<DefinedVocabulary>,
    pub failures: Vec<String>,
}

/// A flash card with the vocabulary it drills. `vocabulary` is `None` when the card points at a
/// row the vocabulary store no longer has.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardDetails {
    #[serde(flatten)]
    pub card: FlashCard,
    pub vocabulary: Option<DefinedVocabulary>,
}

pub struct NotebookService {
    pipeline: AnnotationPipeline,
    resolver: VocabularyResolver,
    cards: Arc<FlashCardStore>,
}

impl NotebookService {
    pub fn new(
        pipeline: AnnotationPipeline,
        resolver: VocabularyResolver,
        cards: Arc<FlashCardStore>,
    ) -> Self {
        Self { pipeline, resolver, cards }
    }

    pub fn pipeline(&self) -> &AnnotationPipeline {
        &self.pipeline
    }

    pub fn resolver(&self) -> &VocabularyResolver {
        &self.resolver
    }

    pub fn cards(&self) -> &Arc<FlashCardStore> {
        &self.cards
    }

    /// Parse `text` into a new last page and register its words for the notebook owner.
    /// Returns the page id and the words no vocabulary was found for.
    pub fn write_page(
        &self,
        notebook: &mut Notebook,
        title: &str,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<(u32, Vec<String>), HikkiError> {
        let parsed = self.pipeline.parse(text, &[]);
        let id = notebook.push_page(title, text, parsed, now);
        info!("Wrote page {} to notebook '{}'", id, notebook.title);

        let failures = self.register_page_words(notebook, id, now)?;
        Ok((id, failures))
    }

    /// Apply `edit` to a page, re-parsing when the text changed, then register its words again.
    pub fn update_page(
        &self,
        notebook: &mut Notebook,
        id: u32,
        edit: PageEdit,
        now: DateTime<Utc>,
    ) -> Result<Vec<String>, HikkiError> {
        notebook.page(id)?;

        if let Some(title) = &edit.title {
            notebook.rename_page(id, title)?;
        }
        if let Some(text) = &edit.text {
            notebook.set_text(id, text)?;
            let parsed = self.pipeline.parse(text, &[]);
            notebook.set_parsed(id, parsed, now)?;
        }

        self.register_page_words(notebook, id, now)
    }

    /// Re-parse every page from scratch and register all words again.
    pub fn redo_parsing(
        &self,
        notebook: &mut Notebook,
        now: DateTime<Utc>,
    ) -> Result<Vec<String>, HikkiError> {
        let mut failures = Vec::new();

        for id in notebook.page_ids() {
            let text = notebook.page(id)?.text.clone();
            let parsed = self.pipeline.parse(&text, &[]);
            notebook.set_parsed(id, parsed, now)?;

            for failure in self.register_page_words(notebook, id, now)? {
                if !failures.contains(&failure) {
                    failures.push(failure);
                }
            }
        }

        Ok(failures)
    }

    /// Resolve every word of a page and make sure the owner has a flash card for each vocabulary.
    pub fn register_page_words(
        &self,
        notebook: &Notebook,
        id: u32,
        now: DateTime<Utc>,
    ) -> Result<Vec<String>, HikkiError> {
        let page = notebook.page(id)?;

        let resolution = page
            .word_list
            .par_iter()
            .map(|entry| self.resolver.resolve_entry(entry))
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .fold(Resolution::default(), Resolution::merge);

        let mut created = 0;
        for vocabulary in &resolution.vocabularies {
            if self.cards.get_or_create(&notebook.owner, vocabulary.id, now)?.1 {
                created += 1;
            }
        }
        debug!(
            "Registered {} words of page {} for {}: {} new cards, {} failures",
            resolution.vocabularies.len(),
            id,
            notebook.owner,
            created,
            resolution.failures.len()
        );

        Ok(resolution.failures)
    }

    /// Annotate `text` and resolve every kanji-bearing token without creating flash cards.
    pub fn analyze_text(&self, text: &str) -> Result<Analysis, HikkiError> {
        let (html, tokens) = self.pipeline.annotate(text);
        let with_kanji: Vec<Token> = tokens.into_iter().filter(|t| t.contains_kanji()).collect();
        let resolution = self.resolver.resolve_all(&with_kanji)?;

        let vocabularies = resolution
            .vocabularies
            .into_iter()
            .map(|vocabulary| self.resolver.define(vocabulary))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Analysis { html, vocabularies, failures: resolution.failures })
    }

    /// Look up the vocabulary and meanings behind each card.
    pub fn card_details(&self, cards: Vec<FlashCard>) -> Result<Vec<CardDetails>, HikkiError> {
        cards
            .into_iter()
            .map(|card| {
                let vocabulary = match self.resolver.store().get(card.vocabulary_id)? {
                    Some(vocabulary) => Some(self.resolver.define(vocabulary)?),
                    None => None,
                };
                Ok(CardDetails { card, vocabulary })
            })
            .collect()
    }
}
