pub mod service;

use std::path::Path;

use chrono::{
    DateTime,
    Utc,
};
use serde::{
    Deserialize,
    Serialize,
};

pub use service::{
    Analysis,
    CardDetails,
    NotebookService,
    PageEdit,
};

use crate::{
    core::{
        pipeline::merge_word_lists,
        HikkiError,
        ParsedText,
        WordFrequencyEntry,
    },
    persistence::{
        load_json,
        save_json,
    },
};

pub const FIRST_PAGE_ORDERING: i64 = 1;
pub const PAGE_ORDERING_STEP: i64 = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: u32,
    pub title: String,
    pub text: String,
    pub html: String,
    pub word_list: Vec<WordFrequencyEntry>,
    pub ordering: i64,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

/// A learner's notebook. Pages live in one arena and are ordered by `ordering`, not by position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Notebook {
    pub owner: String,
    pub title: String,
    pub description: String,
    pages: Vec<Page>,
    next_page_id: u32,
}

impl Notebook {
    pub fn new(owner: &str, title: &str, description: &str) -> Self {
        Notebook {
            owner: owner.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            pages: Vec::new(),
            next_page_id: 1,
        }
    }

    pub fn load(path: &Path) -> Result<Self, HikkiError> {
        load_json(path)
    }

    pub fn save(&self, path: &Path) -> Result<(), HikkiError> {
        save_json(self, path)
    }

    pub fn page(&self, id: u32) -> Result<&Page, HikkiError> {
        self.pages.iter().find(|page| page.id == id).ok_or(HikkiError::PageNotFound(id))
    }

    fn page_mut(&mut self, id: u32) -> Result<&mut Page, HikkiError> {
        self.pages.iter_mut().find(|page| page.id == id).ok_or(HikkiError::PageNotFound(id))
    }

    pub fn pages(&self) -> Vec<&Page> {
        let mut pages: Vec<&Page> = self.pages.iter().collect();
        pages.sort_by_key(|page| (page.ordering, page.id));
        pages
    }

    pub fn page_ids(&self) -> Vec<u32> {
        self.pages().iter().map(|page| page.id).collect()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    fn next_ordering(&self) -> i64 {
        self.pages
            .iter()
            .map(|page| page.ordering)
            .max()
            .map_or(FIRST_PAGE_ORDERING, |last| last + PAGE_ORDERING_STEP)
    }

    /// Append an already parsed page after the last one.
    pub fn push_page(
        &mut self,
        title: &str,
        text: &str,
        parsed: ParsedText,
        now: DateTime<Utc>,
    ) -> u32 {
        let id = self.next_page_id.max(1);
        self.next_page_id = id + 1;

        let page = Page {
            id,
            title: title.to_string(),
            text: text.to_string(),
            html: parsed.html,
            word_list: parsed.word_list,
            ordering: self.next_ordering(),
            created_at: now,
            modified_at: now,
        };
        self.pages.push(page);
        id
    }

    pub fn set_parsed(
        &mut self,
        id: u32,
        parsed: ParsedText,
        now: DateTime<Utc>,
    ) -> Result<&Page, HikkiError> {
        let page = self.page_mut(id)?;
        page.html = parsed.html;
        page.word_list = parsed.word_list;
        page.modified_at = now;
        Ok(page)
    }

    pub fn rename_page(&mut self, id: u32, title: &str) -> Result<(), HikkiError> {
        self.page_mut(id)?.title = title.to_string();
        Ok(())
    }

    pub fn set_text(&mut self, id: u32, text: &str) -> Result<(), HikkiError> {
        self.page_mut(id)?.text = text.to_string();
        Ok(())
    }

    pub fn remove_page(&mut self, id: u32) -> Result<Page, HikkiError> {
        let position = self
            .pages
            .iter()
            .position(|page| page.id == id)
            .ok_or(HikkiError::PageNotFound(id))?;
        Ok(self.pages.remove(position))
    }

    /// Word counts across every page.
    pub fn word_list(&self) -> Vec<WordFrequencyEntry> {
        self.pages.iter().fold(Vec::new(), |words, page| {
            merge_word_lists(&words, page.word_list.iter().cloned())
        })
    }
}
