use std::collections::HashSet;
use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::balance::{sentiment_counts, target_counts};
use crate::config::SentimentTargets;
use crate::constants::sentiment::{ALL_SENTIMENTS, RATING_MIN};
use crate::data::{ReviewRecord, Sentiment};
use crate::filter::FilterStats;
use crate::types::{RowId, ShortfallNote};

/// One category's share of the final sample.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CategoryShare {
    /// Category label (`primary` or `primary/secondary`).
    pub label: String,
    /// Rows in the sample.
    pub count: usize,
    /// Fraction of the sample.
    pub share: f64,
}

/// One sentiment's observed share versus the configured target.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SentimentLine {
    /// Sentiment label.
    pub sentiment: Sentiment,
    /// Rows in the sample.
    pub count: usize,
    /// Observed fraction of the sample.
    pub share: f64,
    /// Configured target fraction.
    pub target_share: f64,
    /// Signed difference `share - target_share`.
    pub delta: f64,
}

/// Structural self-validation report for one sampling run.
///
/// Diagnostic only: it is computed from the final sample without mutating it
/// and never blocks completion.
#[derive(Clone, Debug, Serialize)]
pub struct SampleReport {
    /// Rows ingested before filtering.
    pub input_rows: usize,
    /// Filter-stage removal counts.
    pub filter: FilterStats,
    /// Rows drawn in the first (natural) pass.
    pub first_pass_rows: usize,
    /// Rows in the final sample.
    pub final_rows: usize,
    /// Configured target size.
    pub target_size: usize,
    /// Primary category distribution, largest first.
    pub primary_shares: Vec<CategoryShare>,
    /// Secondary category distribution, largest first.
    pub secondary_shares: Vec<CategoryShare>,
    /// Sentiment distribution with signed deltas against target.
    pub sentiments: Vec<SentimentLine>,
    /// Row counts per rating 1-5.
    pub rating_histogram: [usize; 5],
    /// Duplicate row-id count; nonzero means the no-replacement guarantee
    /// was violated.
    pub duplicate_rows: usize,
    /// Accumulated data-shortfall notes.
    pub shortfalls: Vec<ShortfallNote>,
}

impl SampleReport {
    /// Build the report from the final sample.
    pub fn from_sample(
        sample: &[ReviewRecord],
        targets: &SentimentTargets,
        target_size: usize,
        input_rows: usize,
        filter: FilterStats,
        first_pass_rows: usize,
        shortfalls: Vec<ShortfallNote>,
    ) -> Self {
        let final_rows = sample.len();

        let mut primary_counts: IndexMap<String, usize> = IndexMap::new();
        let mut secondary_counts: IndexMap<String, usize> = IndexMap::new();
        for record in sample {
            *primary_counts
                .entry(record.primary_category.clone())
                .or_insert(0) += 1;
            let pairing = format!(
                "{}/{}",
                record.primary_category, record.secondary_category
            );
            *secondary_counts.entry(pairing).or_insert(0) += 1;
        }

        let counts = sentiment_counts(sample);
        let target = target_counts(target_size, targets);
        let sentiments = ALL_SENTIMENTS
            .iter()
            .map(|sentiment| {
                let count = counts[sentiment];
                let share = fraction(count, final_rows);
                let target_share = fraction(target[sentiment], target_size);
                SentimentLine {
                    sentiment: *sentiment,
                    count,
                    share,
                    target_share,
                    delta: share - target_share,
                }
            })
            .collect();

        let mut rating_histogram = [0usize; 5];
        for record in sample {
            let slot = record.rating.saturating_sub(RATING_MIN) as usize;
            if let Some(bucket) = rating_histogram.get_mut(slot) {
                *bucket += 1;
            }
        }

        let mut seen: HashSet<RowId> = HashSet::new();
        let duplicate_rows = sample
            .iter()
            .filter(|record| !seen.insert(record.row_id))
            .count();

        Self {
            input_rows,
            filter,
            first_pass_rows,
            final_rows,
            target_size,
            primary_shares: shares_sorted(primary_counts, final_rows),
            secondary_shares: shares_sorted(secondary_counts, final_rows),
            sentiments,
            rating_histogram,
            duplicate_rows,
            shortfalls,
        }
    }

    /// Observed share for one sentiment.
    pub fn sentiment_share(&self, sentiment: Sentiment) -> f64 {
        self.sentiments
            .iter()
            .find(|line| line.sentiment == sentiment)
            .map(|line| line.share)
            .unwrap_or(0.0)
    }
}

fn fraction(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

fn shares_sorted(counts: IndexMap<String, usize>, total: usize) -> Vec<CategoryShare> {
    let mut shares: Vec<CategoryShare> = counts
        .into_iter()
        .map(|(label, count)| CategoryShare {
            share: fraction(count, total),
            label,
            count,
        })
        .collect();
    shares.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    shares
}

/// Group digits with commas for report readability.
pub fn format_count_with_commas(value: usize) -> String {
    let raw = value.to_string();
    let mut grouped_reversed = String::with_capacity(raw.len() + (raw.len() / 3));
    for (idx, ch) in raw.chars().rev().enumerate() {
        if idx > 0 && idx % 3 == 0 {
            grouped_reversed.push(',');
        }
        grouped_reversed.push(ch);
    }
    grouped_reversed.chars().rev().collect()
}

impl fmt::Display for SampleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "sampling report")?;
        writeln!(
            f,
            "  input rows: {} (duplicates removed: {}, low quality removed: {})",
            format_count_with_commas(self.input_rows),
            format_count_with_commas(self.filter.duplicates_removed),
            format_count_with_commas(self.filter.low_quality_removed),
        )?;
        writeln!(
            f,
            "  first pass: {}  final: {} / target {}",
            format_count_with_commas(self.first_pass_rows),
            format_count_with_commas(self.final_rows),
            format_count_with_commas(self.target_size),
        )?;

        writeln!(f, "  primary distribution:")?;
        for share in &self.primary_shares {
            writeln!(
                f,
                "    {}: {} ({:.1}%)",
                share.label,
                format_count_with_commas(share.count),
                share.share * 100.0
            )?;
        }

        writeln!(f, "  secondary distribution:")?;
        for share in &self.secondary_shares {
            writeln!(
                f,
                "    {}: {} ({:.1}%)",
                share.label,
                format_count_with_commas(share.count),
                share.share * 100.0
            )?;
        }

        writeln!(f, "  sentiment distribution:")?;
        for line in &self.sentiments {
            writeln!(
                f,
                "    {}: {} ({:.1}%) [target: {:.0}%, delta: {:+.1}%p]",
                line.sentiment.as_str(),
                format_count_with_commas(line.count),
                line.share * 100.0,
                line.target_share * 100.0,
                line.delta * 100.0,
            )?;
        }

        writeln!(f, "  rating histogram:")?;
        for (idx, count) in self.rating_histogram.iter().enumerate() {
            writeln!(
                f,
                "    {} stars: {} ({:.1}%)",
                idx + 1,
                format_count_with_commas(*count),
                fraction(*count, self.final_rows) * 100.0
            )?;
        }

        if self.duplicate_rows > 0 {
            writeln!(f, "  WARNING: {} duplicate rows", self.duplicate_rows)?;
        } else {
            writeln!(f, "  no duplicate rows (sampling without replacement)")?;
        }

        for note in &self.shortfalls {
            writeln!(f, "  shortfall: {note}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(row_id: RowId, primary: &str, secondary: &str, rating: u8) -> ReviewRecord {
        ReviewRecord {
            row_id,
            primary_category: primary.to_string(),
            secondary_category: secondary.to_string(),
            rating,
            text: String::new(),
            extra: IndexMap::new(),
        }
    }

    #[test]
    fn comma_formatting_is_stable() {
        assert_eq!(format_count_with_commas(0), "0");
        assert_eq!(format_count_with_commas(999), "999");
        assert_eq!(format_count_with_commas(1_234_567), "1,234,567");
    }

    #[test]
    fn report_counts_and_deltas() {
        let sample = vec![
            record(0, "skincare", "toner", 1),
            record(1, "skincare", "toner", 3),
            record(2, "skincare", "cream", 5),
            record(3, "hair", "shampoo", 5),
        ];
        let report = SampleReport::from_sample(
            &sample,
            &SentimentTargets::default(),
            4,
            10,
            FilterStats::default(),
            4,
            Vec::new(),
        );
        assert_eq!(report.final_rows, 4);
        assert_eq!(report.duplicate_rows, 0);
        assert_eq!(report.primary_shares[0].label, "skincare");
        assert_eq!(report.primary_shares[0].count, 3);
        assert_eq!(report.rating_histogram, [1, 0, 1, 0, 2]);

        let positive = report.sentiment_share(Sentiment::Positive);
        assert!((positive - 0.5).abs() < 1e-9);
    }

    #[test]
    fn duplicate_rows_are_detected() {
        let sample = vec![
            record(7, "a", "x", 4),
            record(7, "a", "x", 4),
            record(8, "a", "x", 4),
        ];
        let report = SampleReport::from_sample(
            &sample,
            &SentimentTargets::default(),
            3,
            3,
            FilterStats::default(),
            3,
            Vec::new(),
        );
        assert_eq!(report.duplicate_rows, 1);
    }

    #[test]
    fn display_renders_without_panic() {
        let sample = vec![record(0, "a", "x", 2)];
        let report = SampleReport::from_sample(
            &sample,
            &SentimentTargets::default(),
            1,
            1,
            FilterStats::default(),
            1,
            vec!["sentiment neutral: 1 rows short".to_string()],
        );
        let rendered = report.to_string();
        assert!(rendered.contains("sampling report"));
        assert!(rendered.contains("shortfall"));
    }
}
