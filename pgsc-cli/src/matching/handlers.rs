use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::ArgMatches;
use indicatif::ProgressBar;
use log::info;

use pgsc_core::models::GenomeBuild;
use pgsc_match::{MatchConfig, ReportPolicy, run_pipeline};

use super::cli::DEFAULT_OUTDIR;

fn parse_fraction(matches: &ArgMatches, name: &str) -> Result<Option<f64>> {
    match matches.get_one::<String>(name) {
        Some(value) => {
            let value = f64::from_str(value)
                .with_context(|| format!("--{} must be a number, got {}", name, value))?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

///
/// Settings come from the config file if given, then command line flags
/// override them.
///
pub fn build_config(matches: &ArgMatches) -> Result<MatchConfig> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => MatchConfig::try_from(Path::new(path))
            .with_context(|| format!("Failed to load config {}", path))?,
        None => MatchConfig::default(),
    };

    if let Some(min_overlap) = parse_fraction(matches, "min-overlap")? {
        config.min_overlap = min_overlap;
    }
    if let Some(min_liftover) = parse_fraction(matches, "min-liftover")? {
        config.min_liftover = min_liftover;
    }
    if matches.get_flag("keep-ambiguous") {
        config.remove_ambiguous = false;
    }
    if matches.get_flag("remove-multiallelic") {
        config.remove_multiallelic = true;
    }
    if matches.get_flag("split") {
        config.split_chromosomes = true;
    }
    if matches.get_flag("compress") {
        config.compress = true;
    }
    if matches.get_flag("skip-failing") {
        config.policy = ReportPolicy::SkipFailing;
    }
    if let Some(dir) = matches.get_one::<String>("chain-dir") {
        config.chain_dir = Some(PathBuf::from(dir));
    }
    if matches.get_flag("liftover") {
        let build = matches
            .get_one::<String>("target-build")
            .expect("--liftover requires --target-build.");
        config.target_build = Some(GenomeBuild::from_str(build)?);
    }

    config.validate()?;

    Ok(config)
}

pub fn run_match(matches: &ArgMatches) -> Result<()> {
    let scorefiles: Vec<PathBuf> = matches
        .get_many::<String>("scorefiles")
        .expect("At least one scorefile is required.")
        .map(PathBuf::from)
        .collect();
    let targets: Vec<PathBuf> = matches
        .get_many::<String>("target")
        .expect("At least one target variant table is required.")
        .map(PathBuf::from)
        .collect();
    let dataset = matches
        .get_one::<String>("dataset")
        .expect("A dataset name is required.");

    let default_outdir = DEFAULT_OUTDIR.to_string();
    let outdir = matches.get_one::<String>("outdir").unwrap_or(&default_outdir);

    let config = build_config(matches)?;
    info!("Matching with {:?}", config);

    let spinner = ProgressBar::new_spinner();
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner.set_message(format!(
        "Matching {} scorefile(s) against {}",
        scorefiles.len(),
        dataset
    ));

    let output = run_pipeline(&scorefiles, &targets, dataset, Path::new(outdir), &config);
    spinner.finish_and_clear();
    let output = output?;

    for error in &output.report.errors {
        eprintln!("Skipped: {}", error);
    }
    for path in &output.scorefiles {
        println!("{}", path.display());
    }
    info!("Log written to {}", output.log.display());
    info!("Summary written to {}", output.summary.display());

    Ok(())
}
