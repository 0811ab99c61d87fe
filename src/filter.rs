use std::collections::HashSet;

use serde::Serialize;
use tracing::info;

use crate::constants::filter::MAX_FILLER_DISTINCT_JAMO;
use crate::data::ReviewRecord;

/// Rows removed by each filtering stage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FilterStats {
    /// Rows dropped as exact-text duplicates.
    pub duplicates_removed: usize,
    /// Rows dropped as low-quality or foreign-language text.
    pub low_quality_removed: usize,
}

/// Optional preprocessing stage: exact-text deduplication and Hangul-ratio
/// quality rejection. Pure; never fails.
#[derive(Clone, Debug)]
pub struct QualityFilter {
    /// Drop duplicate texts, keeping the first occurrence.
    pub dedupe_by_text: bool,
    /// Drop texts below the Hangul script-ratio threshold.
    pub reject_low_quality: bool,
    /// Minimum Hangul share among script characters.
    pub min_hangul_ratio: f64,
}

impl QualityFilter {
    /// Apply the enabled stages in order: dedupe, then quality rejection.
    pub fn filter(&self, records: Vec<ReviewRecord>) -> (Vec<ReviewRecord>, FilterStats) {
        let input_rows = records.len();
        let mut stats = FilterStats::default();
        let mut kept = records;

        if self.dedupe_by_text {
            let mut seen: HashSet<String> = HashSet::new();
            let before = kept.len();
            kept.retain(|record| seen.insert(record.text.clone()));
            stats.duplicates_removed = before - kept.len();
        }

        if self.reject_low_quality {
            let before = kept.len();
            kept.retain(|record| is_meaningful_hangul(&record.text, self.min_hangul_ratio));
            stats.low_quality_removed = before - kept.len();
        }

        info!(
            input_rows,
            duplicates = stats.duplicates_removed,
            low_quality = stats.low_quality_removed,
            kept = kept.len(),
            "quality filter applied"
        );
        (kept, stats)
    }
}

/// True when the text reads as a meaningful Hangul review.
///
/// Rejected when:
/// - no script characters at all (empty, whitespace, digits/punctuation only),
/// - no Hangul characters at all,
/// - the Hangul share among script characters (Hangul + Latin + Kana + Han)
///   is below `min_ratio`,
/// - there is no full Hangul syllable and the jamo present use at most two
///   distinct symbols (filler like ㅋㅋㅋ or ㅠㅠ).
pub fn is_meaningful_hangul(text: &str, min_ratio: f64) -> bool {
    let mut hangul_chars = 0usize;
    let mut syllable_chars = 0usize;
    let mut other_script_chars = 0usize;
    let mut distinct_jamo: HashSet<char> = HashSet::new();

    for ch in text.chars() {
        if is_hangul_syllable(ch) {
            hangul_chars += 1;
            syllable_chars += 1;
        } else if is_hangul_jamo(ch) {
            hangul_chars += 1;
            distinct_jamo.insert(ch);
        } else if is_latin(ch) || is_kana(ch) || is_han(ch) {
            other_script_chars += 1;
        }
    }

    let total_script_chars = hangul_chars + other_script_chars;
    if total_script_chars == 0 || hangul_chars == 0 {
        return false;
    }

    let hangul_ratio = hangul_chars as f64 / total_script_chars as f64;
    if hangul_ratio < min_ratio {
        return false;
    }

    if syllable_chars == 0 && distinct_jamo.len() <= MAX_FILLER_DISTINCT_JAMO {
        return false;
    }

    true
}

/// Precomposed Hangul syllable block (가-힣).
fn is_hangul_syllable(ch: char) -> bool {
    ('\u{AC00}'..='\u{D7A3}').contains(&ch)
}

/// Hangul compatibility jamo (ㄱ-ㅎ, ㅏ-ㅣ).
fn is_hangul_jamo(ch: char) -> bool {
    ('\u{3131}'..='\u{3163}').contains(&ch)
}

fn is_latin(ch: char) -> bool {
    ch.is_ascii_alphabetic()
}

/// Hiragana and katakana.
fn is_kana(ch: char) -> bool {
    ('\u{3040}'..='\u{309F}').contains(&ch) || ('\u{30A0}'..='\u{30FF}').contains(&ch)
}

/// CJK unified ideographs.
fn is_han(ch: char) -> bool {
    ('\u{4E00}'..='\u{9FFF}').contains(&ch)
}
