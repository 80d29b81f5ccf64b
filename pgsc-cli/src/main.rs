mod matching;
mod read;

use anyhow::Result;
use clap::{Arg, ArgAction, Command};
use log::LevelFilter;

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const PKG_NAME: &str = "pgsc";
    pub const BIN_NAME: &str = "pgsc";
}

fn build_parser() -> Command {
    Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .author("PGS Catalog")
        .about("Match polygenic scoring files to target genotype data, with optional liftover between genome builds.")
        .subcommand_required(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .global(true)
                .help("Increase logging verbosity (-v info, -vv debug)"),
        )
        .subcommand(read::cli::create_read_cli())
        .subcommand(matching::cli::create_match_cli())
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };

    // RUST_LOG wins over -v
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn main() -> Result<()> {
    let app = build_parser();
    let matches = app.get_matches();

    init_logging(matches.get_count("verbose"));

    match matches.subcommand() {
        //
        // READ
        //
        Some((read::cli::READ_CMD, matches)) => {
            read::handlers::run_read(matches)?;
        }

        //
        // MATCH
        //
        Some((matching::cli::MATCH_CMD, matches)) => {
            matching::handlers::run_match(matches)?;
        }

        _ => unreachable!("Subcommand not found"),
    };

    Ok(())
}
