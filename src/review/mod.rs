pub mod scheduler;
pub mod store;

use chrono::{
    DateTime,
    Utc,
};
use serde::{
    Deserialize,
    Serialize,
};
use uuid::Uuid;

pub use scheduler::record_review;
pub use store::FlashCardStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mastery {
    #[default]
    New,
    Learning,
    Acquired,
}

/// Review state of one vocabulary for one learner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlashCard {
    pub id: Uuid,
    pub owner: String,
    pub vocabulary_id: u64,
    pub mastery: Mastery,
    pub review_iteration: u32,
    pub easiness_factor: f64,
    pub created_at: DateTime<Utc>,
    pub last_review_time: Option<DateTime<Utc>>,
    pub next_review_time: Option<DateTime<Utc>>,
}

impl FlashCard {
    pub fn new(owner: &str, vocabulary_id: u64, now: DateTime<Utc>) -> Self {
        FlashCard {
            id: Uuid::new_v4(),
            owner: owner.to_string(),
            vocabulary_id,
            mastery: Mastery::New,
            review_iteration: 1,
            easiness_factor: scheduler::DEFAULT_EASINESS_FACTOR,
            created_at: now,
            last_review_time: None,
            next_review_time: None,
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        match self.next_review_time {
            Some(next) => next <= now,
            None => self.mastery == Mastery::New,
        }
    }
}
