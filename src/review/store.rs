use std::{
    cmp::Reverse,
    path::Path,
    sync::Mutex,
};

use chrono::{
    DateTime,
    Utc,
};
use serde::{
    Deserialize,
    Serialize,
};
use tracing::{
    debug,
    info,
};
use uuid::Uuid;

use super::{
    scheduler::record_review,
    FlashCard,
    Mastery,
};
use crate::{
    core::HikkiError,
    persistence::{
        load_json,
        save_json,
    },
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlashCardSnapshot {
    pub cards: Vec<FlashCard>,
}

/// Every learner's flash cards. One card per (owner, vocabulary) pair.
#[derive(Default)]
pub struct FlashCardStore {
    cards: Mutex<Vec<FlashCard>>,
}

impl FlashCardStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self, HikkiError> {
        let snapshot: FlashCardSnapshot = load_json(path)?;
        info!("Loaded {} flash cards from {:?}", snapshot.cards.len(), path);
        Ok(FlashCardStore { cards: Mutex::new(snapshot.cards) })
    }

    pub fn save(&self, path: &Path) -> Result<(), HikkiError> {
        let snapshot = FlashCardSnapshot { cards: self.cards.lock()?.clone() };
        save_json(&snapshot, path)
    }

    pub fn len(&self) -> Result<usize, HikkiError> {
        Ok(self.cards.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, HikkiError> {
        Ok(self.len()? == 0)
    }

    pub fn get(&self, id: Uuid) -> Result<Option<FlashCard>, HikkiError> {
        Ok(self.cards.lock()?.iter().find(|card| card.id == id).cloned())
    }

    pub fn find(&self, owner: &str, vocabulary_id: u64) -> Result<Option<FlashCard>, HikkiError> {
        Ok(self
            .cards
            .lock()?
            .iter()
            .find(|card| card.owner == owner && card.vocabulary_id == vocabulary_id)
            .cloned())
    }

    /// Card for `owner` and `vocabulary_id`, created as new if missing. The boolean is true when
    /// this call created it.
    pub fn get_or_create(
        &self,
        owner: &str,
        vocabulary_id: u64,
        now: DateTime<Utc>,
    ) -> Result<(FlashCard, bool), HikkiError> {
        let mut cards = self.cards.lock()?;

        if let Some(card) =
            cards.iter().find(|card| card.owner == owner && card.vocabulary_id == vocabulary_id)
        {
            return Ok((card.clone(), false));
        }

        let card = FlashCard::new(owner, vocabulary_id, now);
        debug!("Created flash card {} for {} / vocabulary {}", card.id, owner, vocabulary_id);
        cards.push(card.clone());
        Ok((card, true))
    }

    /// Record a review for card `id`. Read, schedule and write happen under one lock.
    pub fn review(
        &self,
        id: Uuid,
        quality: i32,
        now: DateTime<Utc>,
    ) -> Result<FlashCard, HikkiError> {
        let mut cards = self.cards.lock()?;
        let card = cards
            .iter_mut()
            .find(|card| card.id == id)
            .ok_or(HikkiError::FlashCardNotFound(id))?;

        *card = record_review(card, quality, now)?;
        Ok(card.clone())
    }

    pub fn mark_acquired(&self, id: Uuid) -> Result<FlashCard, HikkiError> {
        let mut cards = self.cards.lock()?;
        let card = cards
            .iter_mut()
            .find(|card| card.id == id)
            .ok_or(HikkiError::FlashCardNotFound(id))?;

        card.mastery = Mastery::Acquired;
        Ok(card.clone())
    }

    /// New cards, oldest first.
    pub fn new_cards(
        &self,
        owner: &str,
        limit: Option<usize>,
    ) -> Result<Vec<FlashCard>, HikkiError> {
        let mut cards = self.with_mastery(owner, Mastery::New)?;
        cards.sort_by_key(|card| card.created_at);
        Ok(truncate(cards, limit))
    }

    /// Learning cards, soonest due first.
    pub fn learning_cards(
        &self,
        owner: &str,
        limit: Option<usize>,
    ) -> Result<Vec<FlashCard>, HikkiError> {
        let mut cards = self.with_mastery(owner, Mastery::Learning)?;
        cards.sort_by_key(|card| (card.next_review_time, card.created_at));
        Ok(truncate(cards, limit))
    }

    /// Acquired cards, most recently reviewed first.
    pub fn acquired_cards(
        &self,
        owner: &str,
        limit: Option<usize>,
    ) -> Result<Vec<FlashCard>, HikkiError> {
        let mut cards = self.with_mastery(owner, Mastery::Acquired)?;
        cards.sort_by_key(|card| (Reverse(card.last_review_time), card.created_at));
        Ok(truncate(cards, limit))
    }

    /// Cards not yet acquired whose review time has come, new cards first, then the most
    /// overdue.
    pub fn due_cards(
        &self,
        owner: &str,
        now: DateTime<Utc>,
        limit: Option<usize>,
    ) -> Result<Vec<FlashCard>, HikkiError> {
        let mut cards: Vec<FlashCard> = self
            .cards
            .lock()?
            .iter()
            .filter(|card| {
                card.owner == owner && card.mastery != Mastery::Acquired && card.is_due(now)
            })
            .cloned()
            .collect();
        cards.sort_by_key(|card| (card.next_review_time, card.created_at));
        Ok(truncate(cards, limit))
    }

    fn with_mastery(&self, owner: &str, mastery: Mastery) -> Result<Vec<FlashCard>, HikkiError> {
        Ok(self
            .cards
            .lock()?
            .iter()
            .filter(|card| card.owner == owner && card.mastery == mastery)
            .cloned()
            .collect())
    }
}

fn truncate(mut cards: Vec<FlashCard>, limit: Option<usize>) -> Vec<FlashCard> {
    if let Some(limit) = limit {
        cards.truncate(limit);
    }
    cards
}
