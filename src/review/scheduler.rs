//! SM-2 style scheduling.
//!
//! Answer quality is an integer from 0 to 5:
//! - 0-2: failed recall, the card restarts at iteration 1
//! - 3-5: successful recall, the iteration advances and the easiness factor is updated

use chrono::{
    DateTime,
    TimeDelta,
    Utc,
};
use tracing::debug;

use super::{
    FlashCard,
    Mastery,
};
use crate::core::HikkiError;

pub const DEFAULT_EASINESS_FACTOR: f64 = 2.5;
pub const MIN_EASINESS_FACTOR: f64 = 1.3;
pub const MAX_EASINESS_FACTOR: f64 = 2.5;

/// Upper bound for a single interval, about a century.
pub const MAX_INTERVAL_DAYS: i64 = 36_500;

const MIN_PASSING_QUALITY: i32 = 3;

pub fn calc_new_easiness_factor(old_ef: f64, quality: i32) -> f64 {
    let q = quality as f64;
    (old_ef - 0.8 + 0.28 * q - 0.02 * q).clamp(MIN_EASINESS_FACTOR, MAX_EASINESS_FACTOR)
}

/// Days until the next review: 1, 6, then each interval is the previous one times the easiness
/// factor, rounded up.
pub fn calc_repetition_interval(iteration: u32, easiness_factor: f64) -> i64 {
    match iteration {
        0 | 1 => 1,
        _ => {
            let mut interval: i64 = 6;
            for _ in 2..iteration {
                interval = ((interval as f64) * easiness_factor).ceil() as i64;
                if interval >= MAX_INTERVAL_DAYS {
                    return MAX_INTERVAL_DAYS;
                }
            }
            interval
        }
    }
}

/// Apply one review to `card`, returning the updated copy. Out of range qualities are rejected
/// and the card is left untouched.
pub fn record_review(
    card: &FlashCard,
    quality: i32,
    now: DateTime<Utc>,
) -> Result<FlashCard, HikkiError> {
    if !(0..=5).contains(&quality) {
        return Err(HikkiError::InvalidAnswerQuality(quality));
    }

    let mut updated = card.clone();

    if updated.mastery == Mastery::New {
        updated.mastery = Mastery::Learning;
    }

    if quality < MIN_PASSING_QUALITY {
        updated.review_iteration = 1;
    } else {
        updated.review_iteration = updated.review_iteration.saturating_add(1);
        updated.easiness_factor = calc_new_easiness_factor(updated.easiness_factor, quality);
    }

    let interval = calc_repetition_interval(updated.review_iteration, updated.easiness_factor);
    updated.last_review_time = Some(now);
    updated.next_review_time = Some(now + TimeDelta::days(interval));

    debug!(
        "Reviewed card {} with quality {}: iteration {}, ef {:.2}, next in {} days",
        updated.id, quality, updated.review_iteration, updated.easiness_factor, interval
    );

    Ok(updated)
}
