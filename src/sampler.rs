use indexmap::IndexMap;
use rand::seq::SliceRandom;
use tracing::{debug, info};

use crate::balance;
use crate::config::SamplerConfig;
use crate::data::{ReviewRecord, SampledSet};
use crate::errors::SamplerError;
use crate::filter::{FilterStats, QualityFilter};
use crate::quota::allocate_with_floor;
use crate::report::SampleReport;
use crate::strata::{build_units, extract};
use crate::types::CategoryLabel;

#[derive(Debug, Clone)]
/// Small deterministic RNG (splitmix64) used for reproducible sampling.
///
/// Every stage of one `sample()` call draws from the same instance, so a run
/// is bit-identical for a fixed `(records, config, seed)` triple.
pub struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    /// Create a generator from a seed.
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u64_internal(&mut self) -> u64 {
        let mut z = self.state.wrapping_add(0x9E3779B97F4A7C15);
        self.state = z;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
        z ^ (z >> 31)
    }
}

impl rand::RngCore for DeterministicRng {
    fn next_u32(&mut self) -> u32 {
        self.next_u64_internal() as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.next_u64_internal()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        let mut offset = 0;
        while offset < dest.len() {
            let value = self.next_u64_internal();
            let bytes = value.to_le_bytes();
            let remaining = dest.len() - offset;
            let copy_len = remaining.min(bytes.len());
            dest[offset..offset + copy_len].copy_from_slice(&bytes[..copy_len]);
            offset += copy_len;
        }
    }
}

/// Two-stage stratified sampler with global sentiment rebalancing.
///
/// Draws each sampling unit at its natural sentiment distribution, then
/// rebalances the combined sample toward the configured target using the
/// leftover pool, all without replacement.
#[derive(Debug)]
pub struct NaturalStratifiedSampler {
    config: SamplerConfig,
}

impl NaturalStratifiedSampler {
    /// Validate the configuration and build a sampler.
    pub fn new(config: SamplerConfig) -> Result<Self, SamplerError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Borrow the validated configuration.
    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Run the full pipeline: filter, tag, allocate, extract, balance,
    /// shuffle, report.
    ///
    /// Fails fast on invalid ratings; data-availability shortfalls are
    /// reported, never fatal.
    pub fn sample(&self, records: Vec<ReviewRecord>) -> Result<SampledSet, SamplerError> {
        let config = &self.config;
        let mut rng = DeterministicRng::new(config.seed);
        let input_rows = records.len();
        info!(
            input_rows,
            target_size = config.target_size,
            seed = config.seed,
            "sampling started"
        );

        let (records, filter_stats) = self.apply_filters(records);
        self.check_ratings(&records)?;

        // Stage 1: primary quotas over the full budget.
        let primary_counts = primary_counts(&records);
        let primary_quotas =
            allocate_with_floor(&primary_counts, config.target_size, config.primary_min_floor);
        for (primary, quota) in &primary_quotas {
            debug!(primary = %primary, quota, "primary quota");
        }

        // Stage 2: secondary quotas within each primary.
        let units = build_units(
            &records,
            &primary_quotas,
            &config.skip_secondary,
            config.secondary_min_floor,
        );
        info!(units = units.len(), "sampling units built");

        // Stage 3: natural extraction, sentiment unforced.
        let (mut sample, mut pool) = extract(records, &units, &config.skip_secondary, &mut rng);
        let first_pass_rows = sample.len();
        info!(
            first_pass_rows,
            leftover_rows = pool.total_rows(),
            "first pass extracted"
        );

        // Stage 4: rebalance sentiment at the whole-sample level.
        let mut shortfalls = Vec::new();
        balance::balance(
            &mut sample,
            &mut pool,
            config.target_size,
            &config.target_distribution,
            &mut rng,
            &mut shortfalls,
        );

        sample.shuffle(&mut rng);

        let report = SampleReport::from_sample(
            &sample,
            &config.target_distribution,
            config.target_size,
            input_rows,
            filter_stats,
            first_pass_rows,
            shortfalls,
        );
        info!(final_rows = sample.len(), "sampling finished");

        Ok(SampledSet {
            records: sample,
            report,
        })
    }

    fn apply_filters(&self, records: Vec<ReviewRecord>) -> (Vec<ReviewRecord>, FilterStats) {
        let config = &self.config;
        if !config.filter_duplicates && !config.filter_low_quality {
            return (records, FilterStats::default());
        }
        let filter = QualityFilter {
            dedupe_by_text: config.filter_duplicates,
            reject_low_quality: config.filter_low_quality,
            min_hangul_ratio: config.min_hangul_ratio,
        };
        filter.filter(records)
    }

    /// Every record must land in a defined sentiment bin before any drawing
    /// happens; out-of-range ratings fail the whole run.
    fn check_ratings(&self, records: &[ReviewRecord]) -> Result<(), SamplerError> {
        for record in records {
            if record.sentiment().is_none() {
                return Err(SamplerError::InvalidRating {
                    row: record.row_id,
                    value: record.rating.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Population counts per primary category in first-seen order.
fn primary_counts(records: &[ReviewRecord]) -> IndexMap<CategoryLabel, usize> {
    let mut counts: IndexMap<CategoryLabel, usize> = IndexMap::new();
    for record in records {
        *counts.entry(record.primary_category.clone()).or_insert(0) += 1;
    }
    counts
}
