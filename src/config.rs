use crate::constants::defaults::{
    MIN_HANGUL_RATIO, NEGATIVE_SHARE, NEUTRAL_SHARE, POSITIVE_SHARE, PRIMARY_COLUMN,
    PRIMARY_MIN_FLOOR, RATING_COLUMN, SECONDARY_COLUMN, SECONDARY_MIN_FLOOR, SEED, TARGET_SIZE,
    TEXT_COLUMN,
};
use crate::data::Sentiment;
use crate::errors::SamplerError;
use crate::types::{CategoryLabel, ColumnName};

/// Maps the sampler's required fields onto caller column names.
///
/// Validated once against the table header at ingestion; sampling code never
/// does free-form column lookups.
#[derive(Clone, Debug)]
pub struct ColumnMapping {
    /// Column holding the primary category.
    pub primary: ColumnName,
    /// Column holding the secondary category.
    pub secondary: ColumnName,
    /// Column holding the 1-5 rating.
    pub rating: ColumnName,
    /// Column holding the review text.
    pub text: ColumnName,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            primary: PRIMARY_COLUMN.to_string(),
            secondary: SECONDARY_COLUMN.to_string(),
            rating: RATING_COLUMN.to_string(),
            text: TEXT_COLUMN.to_string(),
        }
    }
}

/// Target sentiment shares for the rebalanced sample.
#[derive(Clone, Copy, Debug)]
pub struct SentimentTargets {
    /// Target share of negative rows (ratings 1-2).
    pub negative: f64,
    /// Target share of neutral rows (rating 3).
    pub neutral: f64,
    /// Target share of positive rows (ratings 4-5).
    pub positive: f64,
}

impl Default for SentimentTargets {
    fn default() -> Self {
        Self {
            negative: NEGATIVE_SHARE,
            neutral: NEUTRAL_SHARE,
            positive: POSITIVE_SHARE,
        }
    }
}

impl SentimentTargets {
    /// Validate that the three shares are non-negative and sum to `1.0`
    /// (within epsilon).
    pub fn normalized(self) -> Result<Self, SamplerError> {
        if self.negative < 0.0 || self.neutral < 0.0 || self.positive < 0.0 {
            return Err(SamplerError::Configuration(
                "sentiment target shares must be non-negative".to_string(),
            ));
        }
        let sum = self.negative + self.neutral + self.positive;
        if (sum - 1.0).abs() > 1e-6 {
            return Err(SamplerError::Configuration(format!(
                "sentiment target shares must sum to 1.0 (got {sum})"
            )));
        }
        Ok(self)
    }

    /// Target share for one sentiment.
    pub fn share(&self, sentiment: Sentiment) -> f64 {
        match sentiment {
            Sentiment::Negative => self.negative,
            Sentiment::Neutral => self.neutral,
            Sentiment::Positive => self.positive,
        }
    }
}

/// Top-level sampler configuration.
#[derive(Clone, Debug)]
pub struct SamplerConfig {
    /// Target number of sampled rows.
    pub target_size: usize,
    /// Column names for ingestion/export.
    pub columns: ColumnMapping,
    /// Guaranteed minimum quota per primary category.
    pub primary_min_floor: usize,
    /// Guaranteed minimum quota per secondary category.
    pub secondary_min_floor: usize,
    /// Primary categories exempted from the secondary split.
    ///
    /// These keep a single `(primary, None)` sampling unit carrying the full
    /// primary quota.
    pub skip_secondary: Vec<CategoryLabel>,
    /// Target sentiment distribution for the rebalanced sample.
    pub target_distribution: SentimentTargets,
    /// RNG seed that controls every draw (extraction, fill, trim, shuffle).
    pub seed: u64,
    /// Drop duplicate texts before sampling (first occurrence wins).
    pub filter_duplicates: bool,
    /// Drop low-quality/foreign-language texts before sampling.
    pub filter_low_quality: bool,
    /// Minimum Hangul share among script characters for a text to be kept.
    pub min_hangul_ratio: f64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            target_size: TARGET_SIZE,
            columns: ColumnMapping::default(),
            primary_min_floor: PRIMARY_MIN_FLOOR,
            secondary_min_floor: SECONDARY_MIN_FLOOR,
            skip_secondary: Vec::new(),
            target_distribution: SentimentTargets::default(),
            seed: SEED,
            filter_duplicates: true,
            filter_low_quality: true,
            min_hangul_ratio: MIN_HANGUL_RATIO,
        }
    }
}

impl SamplerConfig {
    /// Validate structural configuration before any sampling work.
    ///
    /// Unaffordable floors (`floor * n_categories > target_size`) are *not*
    /// rejected here; the allocator degrades to an even split for that case.
    pub fn validate(&self) -> Result<(), SamplerError> {
        self.target_distribution.normalized()?;
        if !(0.0..=1.0).contains(&self.min_hangul_ratio) {
            return Err(SamplerError::Configuration(format!(
                "min_hangul_ratio must be within 0.0..=1.0 (got {})",
                self.min_hangul_ratio
            )));
        }
        if self.target_size == 0 {
            return Err(SamplerError::Configuration(
                "target_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
