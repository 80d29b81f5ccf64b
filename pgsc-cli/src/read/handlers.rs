use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::ArgMatches;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use pgsc_core::models::GenomeBuild;
use pgsc_scorefile::{QcSummary, read_scorefile};

#[derive(Debug, Serialize)]
struct ScorefileEntry {
    path: String,
    genome_build: Option<GenomeBuild>,
    accessions: Vec<(String, usize)>,
}

#[derive(Debug, Serialize)]
struct ReadSummary {
    scorefiles: Vec<ScorefileEntry>,
    qc: QcSummary,
}

pub fn run_read(matches: &ArgMatches) -> Result<()> {
    let scorefiles: Vec<&String> = matches
        .get_many::<String>("scorefiles")
        .expect("At least one scorefile is required.")
        .collect();
    let output = matches.get_one::<String>("output");

    let pb = ProgressBar::new(scorefiles.len() as u64);
    pb.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")?.progress_chars("=> "),
    );

    let mut summary = ReadSummary {
        scorefiles: Vec::with_capacity(scorefiles.len()),
        qc: QcSummary::default(),
    };

    for path in scorefiles {
        pb.set_message(path.clone());
        let set = read_scorefile(Path::new(path))
            .with_context(|| format!("Failed to read scorefile {}", path))?;

        summary.scorefiles.push(ScorefileEntry {
            path: path.clone(),
            genome_build: set.genome_build,
            accessions: set
                .scorefiles
                .iter()
                .map(|(accession, variants)| (accession.clone(), variants.len()))
                .collect(),
        });
        summary.qc.merge(set.qc);
        pb.inc(1);
    }
    pb.finish_and_clear();

    let mut writer: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path))?,
        )),
        None => Box::new(std::io::stdout().lock()),
    };
    serde_json::to_writer_pretty(&mut writer, &summary)?;
    writeln!(writer)?;

    Ok(())
}
