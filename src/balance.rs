use std::collections::HashSet;

use indexmap::IndexMap;
use rand::Rng;
use rand::seq::index;
use tracing::{debug, warn};

use crate::config::SentimentTargets;
use crate::constants::balance::TRIM_ORDER;
use crate::constants::sentiment::ALL_SENTIMENTS;
use crate::data::{ReviewRecord, Sentiment};
use crate::strata::LeftoverPool;
use crate::types::{RowId, ShortfallNote};

/// Per-sentiment target row counts for a sample of `target_size`.
///
/// Shares are rounded to the nearest integer and the rounding drift (either
/// sign) is applied to the sentiment with the largest target count, first-seen
/// on ties, so the counts always sum to `target_size`.
pub fn target_counts(
    target_size: usize,
    targets: &SentimentTargets,
) -> IndexMap<Sentiment, usize> {
    let mut counts: IndexMap<Sentiment, usize> = ALL_SENTIMENTS
        .iter()
        .map(|sentiment| {
            let share = targets.share(*sentiment);
            (*sentiment, (target_size as f64 * share).round() as usize)
        })
        .collect();

    let assigned: i64 = counts.values().map(|count| *count as i64).sum();
    let drift = target_size as i64 - assigned;
    if drift != 0 {
        let mut largest_idx = 0;
        let mut largest_count = 0;
        for (idx, count) in counts.values().enumerate() {
            if idx == 0 || *count > largest_count {
                largest_idx = idx;
                largest_count = *count;
            }
        }
        if let Some((_, count)) = counts.get_index_mut(largest_idx) {
            *count = (*count as i64 + drift).max(0) as usize;
        }
    }
    counts
}

/// Rebalance the first-pass sample's sentiment mix toward the target.
///
/// Linear sequence: count, fill deficits from the leftover pool (removing
/// drawn rows from every bucket), then trim surpluses in fixed priority order
/// until the sample fits `target_size`. Pool exhaustion leaves the sample
/// short and is recorded in `notes`; it never fails.
pub fn balance<R: Rng>(
    sample: &mut Vec<ReviewRecord>,
    pool: &mut LeftoverPool,
    target_size: usize,
    targets: &SentimentTargets,
    rng: &mut R,
    notes: &mut Vec<ShortfallNote>,
) {
    let target = target_counts(target_size, targets);
    let current = sentiment_counts(sample);

    for sentiment in ALL_SENTIMENTS {
        debug!(
            sentiment = sentiment.as_str(),
            current = current[&sentiment],
            target = target[&sentiment],
            "balance deficit check"
        );
    }

    // FILL: top up each deficient sentiment from the leftover pool.
    for sentiment in ALL_SENTIMENTS {
        let deficit = target[&sentiment].saturating_sub(current[&sentiment]);
        if deficit == 0 {
            continue;
        }
        let drawn = pool.draw_for_sentiment(sentiment, deficit, rng);
        if drawn.len() < deficit {
            let short = deficit - drawn.len();
            warn!(
                sentiment = sentiment.as_str(),
                short, "leftover pool exhausted during fill"
            );
            notes.push(format!(
                "sentiment {}: {short} rows short (leftover pool exhausted)",
                sentiment.as_str()
            ));
        }
        debug!(
            sentiment = sentiment.as_str(),
            added = drawn.len(),
            "fill complete"
        );
        sample.extend(drawn);
    }

    // TRIM: drop surplus rows, positive first, until the sample fits.
    if sample.len() > target_size {
        let mut excess = sample.len() - target_size;
        for sentiment in TRIM_ORDER {
            if excess == 0 {
                break;
            }
            let in_sample: Vec<RowId> = sample
                .iter()
                .filter(|record| record.sentiment() == Some(sentiment))
                .map(|record| record.row_id)
                .collect();
            let removable = in_sample.len().saturating_sub(target[&sentiment]);
            let to_remove = removable.min(excess);
            if to_remove == 0 {
                continue;
            }
            let victims: HashSet<RowId> = index::sample(rng, in_sample.len(), to_remove)
                .into_iter()
                .map(|idx| in_sample[idx])
                .collect();
            sample.retain(|record| !victims.contains(&record.row_id));
            excess -= to_remove;
            debug!(
                sentiment = sentiment.as_str(),
                removed = to_remove,
                "trim complete"
            );
        }
    }

    if sample.len() < target_size {
        let shortage = target_size - sample.len();
        warn!(shortage, "final sample below target size");
        notes.push(format!(
            "final sample {shortage} rows below target (leftover pools exhausted)"
        ));
    }
}

/// Count sample rows per sentiment in canonical order.
pub(crate) fn sentiment_counts(sample: &[ReviewRecord]) -> IndexMap<Sentiment, usize> {
    let mut counts: IndexMap<Sentiment, usize> = ALL_SENTIMENTS
        .iter()
        .map(|sentiment| (*sentiment, 0))
        .collect();
    for record in sample {
        if let Some(sentiment) = record.sentiment() {
            if let Some(count) = counts.get_mut(&sentiment) {
                *count += 1;
            }
        }
    }
    counts
}
