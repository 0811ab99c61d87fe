use std::collections::HashSet;

use indexmap::IndexMap;
use rand::Rng;
use rand::seq::index;
use tracing::{debug, warn};

use crate::data::{ReviewRecord, Sentiment, UnitKey};
use crate::quota::allocate_with_floor;
use crate::types::{CategoryLabel, RowId};

/// One first-pass sampling unit: a `(primary, secondary)` key with the quota
/// it is entitled to draw. Transient; lives only within one `sample()` call.
#[derive(Clone, Debug)]
pub struct SamplingUnit {
    /// Category pairing this unit draws from.
    pub key: UnitKey,
    /// Rows this unit is entitled to.
    pub quota: usize,
}

/// Resolve the sampling-unit key for a record under the skip policy.
pub fn unit_key_for(record: &ReviewRecord, skip_secondary: &[CategoryLabel]) -> UnitKey {
    if skip_secondary.contains(&record.primary_category) {
        UnitKey::primary_only(record.primary_category.clone())
    } else {
        UnitKey::refined(
            record.primary_category.clone(),
            record.secondary_category.clone(),
        )
    }
}

/// Split each primary quota across its secondary categories, producing the
/// finest-grained sampling units.
///
/// Primaries in `skip_secondary` keep a single `(primary, None)` unit carrying
/// the full primary quota. Unit order follows `primary_quotas` map order, then
/// first-seen secondary order within each primary.
pub fn build_units(
    records: &[ReviewRecord],
    primary_quotas: &IndexMap<CategoryLabel, usize>,
    skip_secondary: &[CategoryLabel],
    secondary_floor: usize,
) -> Vec<SamplingUnit> {
    let mut secondary_counts: IndexMap<CategoryLabel, IndexMap<CategoryLabel, usize>> =
        IndexMap::new();
    for record in records {
        *secondary_counts
            .entry(record.primary_category.clone())
            .or_default()
            .entry(record.secondary_category.clone())
            .or_insert(0) += 1;
    }

    let mut units = Vec::new();
    for (primary, primary_quota) in primary_quotas {
        if skip_secondary.contains(primary) {
            debug!(primary = %primary, quota = primary_quota, "secondary split skipped");
            units.push(SamplingUnit {
                key: UnitKey::primary_only(primary.clone()),
                quota: *primary_quota,
            });
            continue;
        }
        let Some(counts) = secondary_counts.get(primary) else {
            warn!(primary = %primary, "primary quota has no matching rows");
            units.push(SamplingUnit {
                key: UnitKey::primary_only(primary.clone()),
                quota: *primary_quota,
            });
            continue;
        };
        for (secondary, quota) in allocate_with_floor(counts, *primary_quota, secondary_floor) {
            units.push(SamplingUnit {
                key: UnitKey::refined(primary.clone(), secondary),
                quota,
            });
        }
    }
    units
}

/// Draw every unit uniformly without replacement, capped at its population.
///
/// Returns the first-pass sample and the leftover pool of undrawn rows.
/// A unit with no population draws zero rows and is logged, not an error.
pub fn extract<R: Rng>(
    records: Vec<ReviewRecord>,
    units: &[SamplingUnit],
    skip_secondary: &[CategoryLabel],
    rng: &mut R,
) -> (Vec<ReviewRecord>, LeftoverPool) {
    let mut populations: IndexMap<UnitKey, Vec<ReviewRecord>> = IndexMap::new();
    for record in records {
        populations
            .entry(unit_key_for(&record, skip_secondary))
            .or_default()
            .push(record);
    }

    let mut sample = Vec::new();
    let mut pool = LeftoverPool::new();

    for unit in units {
        let population = populations.shift_remove(&unit.key).unwrap_or_default();
        if population.is_empty() {
            warn!(unit = %unit.key.label(), quota = unit.quota, "sampling unit has no population");
            continue;
        }

        // Shortfall is carried, never faked: the draw caps at the population.
        let actual_draw = unit.quota.min(population.len());
        let chosen: HashSet<usize> = index::sample(rng, population.len(), actual_draw)
            .into_iter()
            .collect();

        let mut leftover = Vec::with_capacity(population.len() - actual_draw);
        for (idx, record) in population.into_iter().enumerate() {
            if chosen.contains(&idx) {
                sample.push(record);
            } else {
                leftover.push(record);
            }
        }
        debug!(
            unit = %unit.key.label(),
            quota = unit.quota,
            drawn = actual_draw,
            leftover = leftover.len(),
            "unit extracted"
        );
        pool.insert(unit.key.clone(), leftover);
    }

    // Rows whose category pairing never produced a unit stay available for
    // the balancer.
    for (key, orphans) in populations {
        warn!(unit = %key.label(), rows = orphans.len(), "rows matched no sampling unit");
        pool.insert(key, orphans);
    }

    (sample, pool)
}

/// Arena of rows not drawn in the first pass, bucketed by sampling unit.
///
/// The balancer draws from it by sentiment; drawn rows are removed from every
/// bucket so the no-replacement guarantee holds globally.
#[derive(Clone, Debug, Default)]
pub struct LeftoverPool {
    buckets: IndexMap<UnitKey, Vec<ReviewRecord>>,
}

impl LeftoverPool {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a unit's undrawn rows.
    pub fn insert(&mut self, key: UnitKey, rows: Vec<ReviewRecord>) {
        self.buckets.entry(key).or_default().extend(rows);
    }

    /// Total rows remaining across all buckets.
    pub fn total_rows(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// Rows remaining for one sentiment across all buckets.
    pub fn available(&self, sentiment: Sentiment) -> usize {
        self.buckets
            .values()
            .flatten()
            .filter(|record| record.sentiment() == Some(sentiment))
            .count()
    }

    /// Draw up to `want` rows of one sentiment uniformly across all buckets,
    /// removing them from the pool entirely.
    pub fn draw_for_sentiment<R: Rng>(
        &mut self,
        sentiment: Sentiment,
        want: usize,
        rng: &mut R,
    ) -> Vec<ReviewRecord> {
        let candidates: Vec<RowId> = self
            .buckets
            .values()
            .flatten()
            .filter(|record| record.sentiment() == Some(sentiment))
            .map(|record| record.row_id)
            .collect();
        let take = want.min(candidates.len());
        if take == 0 {
            return Vec::new();
        }

        let selected: HashSet<RowId> = index::sample(rng, candidates.len(), take)
            .into_iter()
            .map(|idx| candidates[idx])
            .collect();

        let mut drawn = Vec::with_capacity(take);
        for bucket in self.buckets.values_mut() {
            if bucket.is_empty() {
                continue;
            }
            let (taken, kept): (Vec<_>, Vec<_>) = std::mem::take(bucket)
                .into_iter()
                .partition(|record| selected.contains(&record.row_id));
            drawn.extend(taken);
            *bucket = kept;
        }
        drawn
    }
}
