use clap::{Arg, ArgAction, Command, arg};

pub const MATCH_CMD: &str = "match";
pub const DEFAULT_OUTDIR: &str = ".";

pub fn create_match_cli() -> Command {
    Command::new(MATCH_CMD)
        .author("PGS Catalog")
        .about("Match scoring file variants to target genotype variants and write scoring tables.")
        .arg(
            Arg::new("scorefiles")
                .long("scorefiles")
                .short('s')
                .required(true)
                .num_args(1..)
                .action(ArgAction::Append)
                .help("PGS Catalog scoring files, plain or gzipped"),
        )
        .arg(
            Arg::new("target")
                .long("target")
                .short('t')
                .required(true)
                .num_args(1..)
                .action(ArgAction::Append)
                .help("Target variant tables (.bim or .pvar, plain or gzipped)"),
        )
        .arg(arg!(--dataset <dataset> "Name of the target dataset, prefixes output files").required(true))
        .arg(arg!(--config <config> "TOML file with matching settings"))
        .arg(arg!(--"min-overlap" <min_overlap> "Minimum fraction of variants that must match"))
        .arg(
            arg!(--"keep-ambiguous" "Keep strand ambiguous matches under their best hypothesis")
                .action(ArgAction::SetTrue),
        )
        .arg(
            arg!(--"remove-multiallelic" "Drop multi-allelic target variants instead of splitting them")
                .action(ArgAction::SetTrue),
        )
        .arg(
            arg!(--liftover "Lift scorefile coordinates to the target build")
                .action(ArgAction::SetTrue)
                .requires("target-build"),
        )
        .arg(arg!(--"target-build" <target_build> "Genome build of the target data (GRCh37 or GRCh38)"))
        .arg(arg!(--"chain-dir" <chain_dir> "Directory with UCSC chain files"))
        .arg(arg!(--"min-liftover" <min_liftover> "Minimum fraction of variants that must lift"))
        .arg(
            arg!(--split "Write one scoring table per chromosome")
                .action(ArgAction::SetTrue),
        )
        .arg(
            arg!(--"skip-failing" "Skip accessions that fail the match rate instead of aborting")
                .action(ArgAction::SetTrue),
        )
        .arg(arg!(--compress "Gzip the scoring tables").action(ArgAction::SetTrue))
        .arg(arg!(--outdir <outdir> "Output directory"))
}
