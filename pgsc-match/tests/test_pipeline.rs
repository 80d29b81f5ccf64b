use std::fs;
use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use rstest::*;
use tempfile::TempDir;

use pgsc_core::PgscError;
use pgsc_core::models::GenomeBuild;
use pgsc_match::{MatchConfig, ReportPolicy, run_pipeline};

#[fixture]
fn path_to_data() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .join("tests/data")
}

#[fixture]
fn outdir() -> TempDir {
    tempfile::tempdir().unwrap()
}

#[fixture]
fn config() -> MatchConfig {
    MatchConfig {
        min_overlap: 0.5,
        ..Default::default()
    }
}

fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(String::from)
        .collect()
}

#[rstest]
fn test_pipeline_bim(path_to_data: PathBuf, outdir: TempDir, config: MatchConfig) {
    let output = run_pipeline(
        &[path_to_data.join("PGS000001.txt")],
        &[path_to_data.join("target.bim")],
        "test",
        outdir.path(),
        &config,
    )
    .unwrap();

    assert_eq!(
        output.scorefiles,
        vec![outdir.path().join("test_ALL_additive_0.scorefile")]
    );
    assert_eq!(
        read_lines(&output.scorefiles[0]),
        vec![
            "ID\teffect_allele\tPGS000001",
            "22:17080378:A:G\tA\t1.01",
            "22:17080400:C:T\tT\t0.5",
            "22:17080600:G:A\tG\t0.3",
        ]
    );

    let summary = &output.report.summaries[0];
    assert_eq!(summary.n_variants, 4);
    assert_eq!(summary.n_matched, 3);
    assert_eq!(summary.n_ambiguous, 1);
    assert!(summary.pass);

    // one row per scorefile line, including the row dropped by QC
    assert_eq!(read_lines(&output.log).len(), 6);

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output.summary).unwrap()).unwrap();
    assert_eq!(json["dataset"], "test");
    assert_eq!(json["accessions"][0]["n_matched"], 3);
    assert_eq!(json["qc"][0]["n_fail"], 1);
}

#[rstest]
fn test_pipeline_keep_ambiguous(path_to_data: PathBuf, outdir: TempDir, mut config: MatchConfig) {
    config.remove_ambiguous = false;
    let output = run_pipeline(
        &[path_to_data.join("PGS000001.txt")],
        &[path_to_data.join("target.bim")],
        "test",
        outdir.path(),
        &config,
    )
    .unwrap();

    let lines = read_lines(&output.scorefiles[0]);
    assert_eq!(lines.len(), 5);
    assert!(lines.contains(&"22:17080500:A:T\tA\t-0.2".to_string()));
}

#[rstest]
fn test_pipeline_low_overlap_is_fatal(path_to_data: PathBuf, outdir: TempDir) {
    let config = MatchConfig {
        min_overlap: 0.95,
        ..Default::default()
    };
    let result = run_pipeline(
        &[path_to_data.join("PGS000001.txt")],
        &[path_to_data.join("target.pvar")],
        "test",
        outdir.path(),
        &config,
    );
    assert!(matches!(result, Err(PgscError::MatchRate { .. })));
    assert!(fs::read_dir(outdir.path()).unwrap().next().is_none());
}

#[rstest]
fn test_pipeline_skip_failing(path_to_data: PathBuf, outdir: TempDir, mut config: MatchConfig) {
    let input = tempfile::tempdir().unwrap();
    let other = input.path().join("PGS000002.txt");
    fs::write(
        &other,
        "chr_name\tchr_position\teffect_allele\tother_allele\teffect_weight\n\
         22\t17080378\tA\tG\t2\n\
         22\t30000000\tA\tG\t1\n\
         22\t30000001\tA\tG\t1\n",
    )
    .unwrap();

    config.policy = ReportPolicy::SkipFailing;
    let output = run_pipeline(
        &[path_to_data.join("PGS000001.txt"), other],
        &[path_to_data.join("target.bim")],
        "test",
        outdir.path(),
        &config,
    )
    .unwrap();

    assert_eq!(output.report.passed().collect::<Vec<_>>(), vec!["PGS000001"]);
    assert_eq!(output.report.errors.len(), 1);

    // the failing accession is left out of the scoring tables
    let header = &read_lines(&output.scorefiles[0])[0];
    assert_eq!(header, "ID\teffect_allele\tPGS000001");
}

#[rstest]
fn test_pipeline_liftover(path_to_data: PathBuf, outdir: TempDir, mut config: MatchConfig) {
    config.target_build = Some(GenomeBuild::GRCh38);
    config.chain_dir = Some(path_to_data.join("chains"));
    config.min_liftover = 0.5;
    config.split_chromosomes = true;

    let output = run_pipeline(
        &[path_to_data.join("PGS000001.txt")],
        &[path_to_data.join("target_hg38.pvar")],
        "test",
        outdir.path(),
        &config,
    )
    .unwrap();

    assert_eq!(
        output.scorefiles,
        vec![outdir.path().join("test_22_additive_0.scorefile")]
    );
    let lines = read_lines(&output.scorefiles[0]);
    assert_eq!(lines[1], "chr22:16580378:A:G\tA\t1.01");

    let log = read_lines(&output.log);
    assert!(log[1].contains("16580378"));
    assert!(log[1].contains("mapped"));
}

#[rstest]
fn test_pipeline_unlifted_variants_count_as_unmatched(path_to_data: PathBuf, outdir: TempDir) {
    let input = tempfile::tempdir().unwrap();
    let scorefile = input.path().join("PGS000004.txt");
    fs::write(
        &scorefile,
        "#genome_build=GRCh37\n\
         chr_name\tchr_position\teffect_allele\tother_allele\teffect_weight\n\
         22\t17080378\tA\tG\t1\n\
         22\t17080400\tT\tC\t1\n\
         22\t17080600\tG\tA\t1\n\
         22\t20000000\tA\tG\t1\n",
    )
    .unwrap();

    let mut config = MatchConfig {
        min_overlap: 0.9,
        min_liftover: 0.5,
        target_build: Some(GenomeBuild::GRCh38),
        chain_dir: Some(path_to_data.join("chains")),
        ..Default::default()
    };

    let result = run_pipeline(
        &[scorefile.clone()],
        &[path_to_data.join("target_hg38.pvar")],
        "test",
        outdir.path(),
        &config,
    );
    assert!(matches!(
        result,
        Err(PgscError::MatchRate { unmatched: 1, total: 4, .. })
    ));

    config.min_overlap = 0.7;
    let output = run_pipeline(
        &[scorefile],
        &[path_to_data.join("target_hg38.pvar")],
        "test",
        outdir.path(),
        &config,
    )
    .unwrap();
    let summary = &output.report.summaries[0];
    assert_eq!(summary.n_variants, 4);
    assert_eq!(summary.n_matched, 3);
    assert_eq!(summary.n_unmatched, 1);
    assert_eq!(summary.failed_fraction, 0.25);
    assert!(summary.pass);
}

#[rstest]
fn test_pipeline_missing_build(path_to_data: PathBuf, outdir: TempDir, mut config: MatchConfig) {
    let input = tempfile::tempdir().unwrap();
    let scorefile = input.path().join("PGS000003.txt");
    fs::write(
        &scorefile,
        "chr_name\tchr_position\teffect_allele\tother_allele\teffect_weight\n22\t17080378\tA\tG\t2\n",
    )
    .unwrap();

    config.target_build = Some(GenomeBuild::GRCh38);
    config.chain_dir = Some(path_to_data.join("chains"));
    let result = run_pipeline(
        &[scorefile],
        &[path_to_data.join("target_hg38.pvar")],
        "test",
        outdir.path(),
        &config,
    );
    assert!(matches!(result, Err(PgscError::MissingBuild { .. })));
}

#[rstest]
fn test_pipeline_no_overlap(path_to_data: PathBuf, outdir: TempDir, config: MatchConfig) {
    let result = run_pipeline(
        &[path_to_data.join("PGS000001.txt")],
        &[path_to_data.join("target_hg38.pvar")],
        "test",
        outdir.path(),
        &config,
    );
    assert!(matches!(result, Err(PgscError::EmptyMatch { n_scorefiles: 1 })));
}
