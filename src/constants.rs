use crate::data::Sentiment;

/// Default configuration values for the sampler.
pub mod defaults {
    /// Default target sample size.
    pub const TARGET_SIZE: usize = 20_000;
    /// Default guaranteed minimum quota per primary category.
    pub const PRIMARY_MIN_FLOOR: usize = 600;
    /// Default guaranteed minimum quota per secondary category.
    pub const SECONDARY_MIN_FLOOR: usize = 200;
    /// Default target share of negative-sentiment rows.
    pub const NEGATIVE_SHARE: f64 = 0.30;
    /// Default target share of neutral-sentiment rows.
    pub const NEUTRAL_SHARE: f64 = 0.30;
    /// Default target share of positive-sentiment rows.
    pub const POSITIVE_SHARE: f64 = 0.40;
    /// Default deterministic seed.
    pub const SEED: u64 = 42;
    /// Default minimum Hangul ratio for the low-quality filter.
    pub const MIN_HANGUL_RATIO: f64 = 0.5;
    /// Default primary category column name.
    pub const PRIMARY_COLUMN: &str = "category_1";
    /// Default secondary category column name.
    pub const SECONDARY_COLUMN: &str = "category_2";
    /// Default rating column name.
    pub const RATING_COLUMN: &str = "rating";
    /// Default review text column name.
    pub const TEXT_COLUMN: &str = "text";
}

/// Constants used by the rating-to-sentiment mapping.
pub mod sentiment {
    use super::Sentiment;

    /// Lowest valid rating.
    pub const RATING_MIN: u8 = 1;
    /// Highest valid rating.
    pub const RATING_MAX: u8 = 5;
    /// Ratings at or below this value map to `Negative`.
    pub const NEGATIVE_MAX_RATING: u8 = 2;
    /// The single rating that maps to `Neutral`.
    pub const NEUTRAL_RATING: u8 = 3;
    /// Canonical sentiment iteration order used for counting and filling.
    pub const ALL_SENTIMENTS: [Sentiment; 3] =
        [Sentiment::Negative, Sentiment::Neutral, Sentiment::Positive];
}

/// Constants used by the sentiment balancer.
pub mod balance {
    use super::Sentiment;

    /// Fixed priority order for trimming surplus rows: positive first.
    pub const TRIM_ORDER: [Sentiment; 3] =
        [Sentiment::Positive, Sentiment::Neutral, Sentiment::Negative];
}

/// Constants used by the quality filter.
pub mod filter {
    /// Texts whose jamo runs use at most this many distinct jamo, with no full
    /// Hangul syllable present, are rejected as meaningless filler (ㅋㅋㅋ, ㅎㅎ).
    pub const MAX_FILLER_DISTINCT_JAMO: usize = 2;
}

/// Constants used by CSV ingestion and export.
pub mod transport {
    /// UTF-8 byte-order mark prefixed to exported CSV files.
    pub const UTF8_BOM: &str = "\u{feff}";
}
