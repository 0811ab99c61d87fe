use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, error::ErrorKind};

use crate::config::{ColumnMapping, SamplerConfig, SentimentTargets};
use crate::sampler::NaturalStratifiedSampler;
use crate::transport;

#[derive(Debug, Parser)]
#[command(
    name = "stratum_sample",
    disable_help_subcommand = true,
    about = "Stratified-sample a review CSV and rebalance sentiment",
    long_about = "Read a categorized review CSV, draw a stratified sample with guaranteed per-category minimums, rebalance its sentiment mix toward the target, and write the result as BOM-prefixed CSV."
)]
/// CLI for `stratum_sample`.
///
/// Common usage:
/// - Defaults match the stock review schema: `stratum_sample in.csv out.csv`
/// - Override the budget and seed: `--target-size 5000 --seed 7`
/// - Exempt a primary from the secondary split: repeat `--skip-secondary NAME`
struct SampleCli {
    #[arg(help = "Input review CSV")]
    input: PathBuf,
    #[arg(help = "Output CSV path (UTF-8 with BOM)")]
    output: PathBuf,
    #[arg(long, help = "Target sample size")]
    target_size: Option<usize>,
    #[arg(long, help = "Deterministic seed override")]
    seed: Option<u64>,
    #[arg(long, help = "Minimum guaranteed quota per primary category")]
    primary_min_floor: Option<usize>,
    #[arg(long, help = "Minimum guaranteed quota per secondary category")]
    secondary_min_floor: Option<usize>,
    #[arg(
        long = "skip-secondary",
        value_name = "PRIMARY",
        help = "Primary category exempted from the secondary split, repeat as needed"
    )]
    skip_secondary: Vec<String>,
    #[arg(
        long = "distribution",
        value_name = "NEG,NEU,POS",
        value_parser = parse_distribution_arg,
        help = "Comma-separated target sentiment shares that must sum to 1.0"
    )]
    distribution: Option<SentimentTargets>,
    #[arg(long, help = "Keep duplicate texts instead of deduplicating")]
    keep_duplicates: bool,
    #[arg(long, help = "Keep low-quality/foreign texts instead of dropping them")]
    keep_low_quality: bool,
    #[arg(long, help = "Primary category column name")]
    primary_column: Option<String>,
    #[arg(long, help = "Secondary category column name")]
    secondary_column: Option<String>,
    #[arg(long, help = "Rating column name")]
    rating_column: Option<String>,
    #[arg(long, help = "Review text column name")]
    text_column: Option<String>,
}

/// Run the CSV sampling demo: read, sample, write, print the report.
pub fn run_sample_demo<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let Some(cli) =
        parse_cli::<SampleCli, _>(std::iter::once("stratum_sample".to_string()).chain(args_iter))?
    else {
        return Ok(());
    };

    let mut config = SamplerConfig::default();
    config.target_size = cli.target_size.unwrap_or(config.target_size);
    config.seed = cli.seed.unwrap_or(config.seed);
    config.primary_min_floor = cli.primary_min_floor.unwrap_or(config.primary_min_floor);
    config.secondary_min_floor = cli.secondary_min_floor.unwrap_or(config.secondary_min_floor);
    config.skip_secondary = cli.skip_secondary;
    if let Some(distribution) = cli.distribution {
        config.target_distribution = distribution;
    }
    config.filter_duplicates = !cli.keep_duplicates;
    config.filter_low_quality = !cli.keep_low_quality;
    config.columns = ColumnMapping {
        primary: cli.primary_column.unwrap_or(config.columns.primary),
        secondary: cli.secondary_column.unwrap_or(config.columns.secondary),
        rating: cli.rating_column.unwrap_or(config.columns.rating),
        text: cli.text_column.unwrap_or(config.columns.text),
    };

    let records = transport::read_records(&cli.input, &config.columns)?;
    println!(
        "Loaded {} rows from {}",
        records.len(),
        cli.input.display()
    );

    let sampler = NaturalStratifiedSampler::new(config.clone())?;
    let sampled = sampler.sample(records)?;
    print!("{}", sampled.report);

    transport::write_records(&cli.output, &sampled.records, &config.columns)?;
    println!(
        "Wrote {} sampled rows to {}",
        sampled.records.len(),
        cli.output.display()
    );
    Ok(())
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}

fn parse_distribution_arg(raw: &str) -> Result<SentimentTargets, String> {
    let parts: Vec<&str> = raw.split(',').collect();
    if parts.len() != 3 {
        return Err("--distribution expects exactly 3 comma-separated values".to_string());
    }
    let negative = parts[0].trim().parse::<f64>().map_err(|_| {
        format!(
            "invalid negative share '{}': must be a float",
            parts[0].trim()
        )
    })?;
    let neutral = parts[1]
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("invalid neutral share '{}': must be a float", parts[1].trim()))?;
    let positive = parts[2].trim().parse::<f64>().map_err(|_| {
        format!(
            "invalid positive share '{}': must be a float",
            parts[2].trim()
        )
    })?;
    let targets = SentimentTargets {
        negative,
        neutral,
        positive,
    };
    targets.normalized().map_err(|err| err.to_string())
}
