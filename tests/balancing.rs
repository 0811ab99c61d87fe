use indexmap::IndexMap;

use stratum::config::{SamplerConfig, SentimentTargets};
use stratum::data::{ReviewRecord, Sentiment};
use stratum::sampler::NaturalStratifiedSampler;

fn build_corpus(cells: &[(&str, &str, u8, usize)]) -> Vec<ReviewRecord> {
    let mut records = Vec::new();
    for (primary, secondary, rating, count) in cells {
        for _ in 0..*count {
            let row_id = records.len();
            records.push(ReviewRecord {
                row_id,
                primary_category: primary.to_string(),
                secondary_category: secondary.to_string(),
                rating: *rating,
                text: format!("리뷰 본문 {row_id}"),
                extra: IndexMap::new(),
            });
        }
    }
    records
}

fn sentiment_count(records: &[ReviewRecord], sentiment: Sentiment) -> usize {
    records
        .iter()
        .filter(|record| record.sentiment() == Some(sentiment))
        .count()
}

fn config(target_size: usize, seed: u64) -> SamplerConfig {
    SamplerConfig {
        target_size,
        primary_min_floor: 5,
        secondary_min_floor: 2,
        seed,
        ..SamplerConfig::default()
    }
}

#[test]
fn sufficient_pools_reach_the_target_distribution_exactly() {
    // One unit with every sentiment over-represented relative to its target
    // count, so FILL and TRIM can land the exact 30/30/40 mix.
    let corpus = build_corpus(&[
        ("skincare", "toner", 1, 200),
        ("skincare", "toner", 3, 200),
        ("skincare", "toner", 5, 200),
    ]);
    let sampler = NaturalStratifiedSampler::new(config(100, 42)).unwrap();
    let sampled = sampler.sample(corpus).unwrap();

    assert_eq!(sampled.records.len(), 100);
    assert_eq!(sentiment_count(&sampled.records, Sentiment::Negative), 30);
    assert_eq!(sentiment_count(&sampled.records, Sentiment::Neutral), 30);
    assert_eq!(sentiment_count(&sampled.records, Sentiment::Positive), 40);
    assert!(sampled.report.shortfalls.is_empty());
}

#[test]
fn missing_sentiment_shrinks_the_sample_without_failing() {
    // No neutral rows anywhere and fewer rows than the target: the neutral
    // target can never be met and nothing can make up the difference.
    let corpus = build_corpus(&[
        ("skincare", "toner", 1, 40),
        ("skincare", "toner", 5, 40),
    ]);
    let sampler = NaturalStratifiedSampler::new(config(100, 8)).unwrap();
    let sampled = sampler.sample(corpus).unwrap();

    assert!(sampled.records.len() < 100);
    assert_eq!(sentiment_count(&sampled.records, Sentiment::Neutral), 0);
    assert!(sampled
        .report
        .shortfalls
        .iter()
        .any(|note| note.contains("neutral")));
}

#[test]
fn fill_and_trim_land_the_exact_mix_mid_sized() {
    // Natural mix roughly matches the target; fill tops up small deficits
    // and trim removes the overshoot, landing the exact 15/15/20 mix.
    let corpus = build_corpus(&[
        ("hair", "shampoo", 1, 40),
        ("hair", "shampoo", 3, 40),
        ("hair", "shampoo", 5, 60),
    ]);
    let sampler = NaturalStratifiedSampler::new(config(50, 13)).unwrap();
    let sampled = sampler.sample(corpus).unwrap();

    assert_eq!(sampled.records.len(), 50);
    assert_eq!(sentiment_count(&sampled.records, Sentiment::Negative), 15);
    assert_eq!(sentiment_count(&sampled.records, Sentiment::Neutral), 15);
    assert_eq!(sentiment_count(&sampled.records, Sentiment::Positive), 20);
}

#[test]
fn single_sentiment_target_keeps_only_that_sentiment() {
    let corpus = build_corpus(&[
        ("makeup", "lip", 1, 100),
        ("makeup", "lip", 5, 100),
    ]);
    let sampler = NaturalStratifiedSampler::new(SamplerConfig {
        target_distribution: SentimentTargets {
            negative: 1.0,
            neutral: 0.0,
            positive: 0.0,
        },
        ..config(60, 17)
    })
    .unwrap();
    let sampled = sampler.sample(corpus).unwrap();

    assert_eq!(sampled.records.len(), 60);
    assert_eq!(sentiment_count(&sampled.records, Sentiment::Negative), 60);
    assert_eq!(sentiment_count(&sampled.records, Sentiment::Positive), 0);
}

#[test]
fn empty_input_yields_an_empty_sample_and_a_report() {
    let sampler = NaturalStratifiedSampler::new(config(100, 4)).unwrap();
    let sampled = sampler.sample(Vec::new()).unwrap();
    assert!(sampled.records.is_empty());
    assert_eq!(sampled.report.final_rows, 0);
    assert!(!sampled.report.shortfalls.is_empty());
}

#[test]
fn sentiment_deltas_in_the_report_match_the_sample() {
    let corpus = build_corpus(&[
        ("skincare", "toner", 1, 100),
        ("skincare", "toner", 3, 100),
        ("skincare", "toner", 5, 100),
    ]);
    let sampler = NaturalStratifiedSampler::new(config(90, 2)).unwrap();
    let sampled = sampler.sample(corpus).unwrap();

    for line in &sampled.report.sentiments {
        let counted = sentiment_count(&sampled.records, line.sentiment);
        assert_eq!(line.count, counted);
        let expected_share = counted as f64 / sampled.records.len() as f64;
        assert!((line.share - expected_share).abs() < 1e-9);
    }
}
