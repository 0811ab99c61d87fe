use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::constants::sentiment::{
    NEGATIVE_MAX_RATING, NEUTRAL_RATING, RATING_MAX, RATING_MIN,
};
use crate::report::SampleReport;

pub use crate::types::{CategoryLabel, ColumnName, RowId};

/// Canonical review row produced by ingestion.
///
/// Identity is `row_id` (the original row index); it is what the
/// no-replacement guarantee is enforced against. Everything else is payload.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReviewRecord {
    /// Original row index at ingestion time (record identity).
    pub row_id: RowId,
    /// Primary category label.
    pub primary_category: CategoryLabel,
    /// Secondary category label within the primary.
    pub secondary_category: CategoryLabel,
    /// Star rating, expected in 1-5.
    pub rating: u8,
    /// Review text.
    pub text: String,
    /// Passthrough columns carried unchanged, in first-seen order.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub extra: IndexMap<ColumnName, String>,
}

impl ReviewRecord {
    /// Derived sentiment for this record, or `None` when the rating is
    /// outside 1-5. Recomputed on demand, never stored.
    pub fn sentiment(&self) -> Option<Sentiment> {
        Sentiment::from_rating(self.rating)
    }
}

/// Three-way sentiment label derived from a 1-5 rating.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Sentiment {
    /// Ratings 1-2.
    Negative,
    /// Rating 3.
    Neutral,
    /// Ratings 4-5.
    Positive,
}

impl Sentiment {
    /// Map a rating to its sentiment bin. Out-of-range ratings return `None`
    /// so callers fail loudly instead of landing in an undefined bin.
    pub fn from_rating(rating: u8) -> Option<Self> {
        match rating {
            r if r < RATING_MIN || r > RATING_MAX => None,
            r if r <= NEGATIVE_MAX_RATING => Some(Self::Negative),
            NEUTRAL_RATING => Some(Self::Neutral),
            _ => Some(Self::Positive),
        }
    }

    /// Lowercase label used in reports and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Negative => "negative",
            Self::Neutral => "neutral",
            Self::Positive => "positive",
        }
    }
}

/// Key identifying one sampling unit: a primary category, optionally refined
/// by a secondary category. `secondary: None` marks a primary exempted from
/// the secondary split.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct UnitKey {
    /// Primary category label.
    pub primary: CategoryLabel,
    /// Secondary category label, or `None` for skip-set primaries.
    pub secondary: Option<CategoryLabel>,
}

impl UnitKey {
    /// Build a key for a primary exempted from the secondary split.
    pub fn primary_only(primary: impl Into<CategoryLabel>) -> Self {
        Self {
            primary: primary.into(),
            secondary: None,
        }
    }

    /// Build a fully refined key.
    pub fn refined(
        primary: impl Into<CategoryLabel>,
        secondary: impl Into<CategoryLabel>,
    ) -> Self {
        Self {
            primary: primary.into(),
            secondary: Some(secondary.into()),
        }
    }

    /// Render `primary/secondary` (or just `primary`) for logs and reports.
    pub fn label(&self) -> String {
        match &self.secondary {
            Some(secondary) => format!("{}/{}", self.primary, secondary),
            None => self.primary.clone(),
        }
    }
}

/// Final sampling output: the drawn rows plus the diagnostic report.
#[derive(Clone, Debug)]
pub struct SampledSet {
    /// Sampled rows in final (shuffled) order.
    pub records: Vec<ReviewRecord>,
    /// Structural self-validation report; diagnostic only.
    pub report: SampleReport,
}
