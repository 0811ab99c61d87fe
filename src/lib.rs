#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Sentiment rebalancing of a first-pass sample against a target mix.
pub mod balance;
/// Sampler configuration types.
pub mod config;
/// Centralized constants used across allocation, balancing, and transport.
pub mod constants;
/// Review record and sampling unit types.
pub mod data;
/// Reusable CSV demo runner shared by downstream binaries.
pub mod example_apps;
/// Duplicate and low-quality review filtering.
pub mod filter;
/// Integer quota allocation with guaranteed minimums.
pub mod quota;
/// Post-run distribution and sanity reporting.
pub mod report;
/// Sampler orchestration and public sampling API.
pub mod sampler;
/// Hierarchical sampling units, first-pass extraction, and leftover pools.
pub mod strata;
/// CSV ingestion and BOM-prefixed CSV export.
pub mod transport;
/// Shared type aliases.
pub mod types;

mod errors;

pub use balance::{balance, target_counts};
pub use config::{ColumnMapping, SamplerConfig, SentimentTargets};
pub use data::{ReviewRecord, SampledSet, Sentiment, UnitKey};
pub use errors::SamplerError;
pub use filter::{FilterStats, QualityFilter};
pub use quota::allocate_with_floor;
pub use report::SampleReport;
pub use sampler::{DeterministicRng, NaturalStratifiedSampler};
pub use strata::{LeftoverPool, SamplingUnit};
pub use types::{CategoryLabel, ColumnName, RowId, ShortfallNote};
