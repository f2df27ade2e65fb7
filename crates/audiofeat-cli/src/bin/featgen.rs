//! featgen - Feature vector generator
//!
//! Usage: featgen [--config <settings.toml>] [--label <class>] <audio>...

use anyhow::{Context, Result};
use audiofeat_cli::output::{print_json_results, FileFeatures};
use audiofeat_core::{features::feature_names, FeatureConfig, FeatureExtractor, Settings};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "featgen")]
#[command(about = "Extract audio feature vectors, augmenting target classes", long_about = None)]
struct Args {
    /// Input audio files
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Path to configuration file (TOML). Built-in defaults if omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Class label applied to every input
    #[arg(short, long)]
    label: Option<String>,

    /// Seed for augmentation randomness (file N uses seed + N)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Include column names in the output
    #[arg(long)]
    columns: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Default: no logs (clean JSON output for parsing)
    if args.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    let config = load_config(args.config.as_deref())?;
    run_featgen(&args, config)
}

fn load_config(path: Option<&Path>) -> Result<FeatureConfig> {
    match path {
        Some(path) => {
            log::info!("Loading configuration from {}", path.display());
            let settings = Settings::load(path)?;
            Ok(settings
                .into_feature_config()
                .with_context(|| format!("Invalid configuration in {}", path.display()))?)
        }
        None => {
            log::info!("No configuration given, using defaults");
            let config = FeatureConfig::default();
            config.validate()?;
            Ok(config)
        }
    }
}

fn run_featgen(args: &Args, config: FeatureConfig) -> Result<()> {
    let extractor = FeatureExtractor::new(config)?;
    let config = extractor.config();
    log::info!(
        "Extracting at {}Hz (stretch rate {}, pitch {} semitones), augmenting {:?}",
        config.sample_rate,
        config.stretch_rate,
        config.pitch_factor,
        config.augment_labels
    );

    let label = args.label.as_deref();
    let start = std::time::Instant::now();

    let results = args
        .inputs
        .par_iter()
        .enumerate()
        .map(|(index, input)| {
            let mut rng = match args.seed {
                Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(index as u64)),
                None => StdRng::from_entropy(),
            };
            let matrix = extractor
                .get_features_with_rng(input, label, &mut rng)
                .with_context(|| format!("Failed to extract features from {}", input.display()))?;
            Ok(FileFeatures::new(
                input.display().to_string(),
                args.label.clone(),
                matrix,
            ))
        })
        .collect::<Result<Vec<_>>>()?;

    let elapsed = start.elapsed();
    log::info!(
        "Extracted {} file(s) in {:.2}s",
        results.len(),
        elapsed.as_secs_f64()
    );

    let columns = args.columns.then(feature_names);
    print_json_results(&results, columns, elapsed.as_secs_f64());

    Ok(())
}
