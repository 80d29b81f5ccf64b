use clap::{Arg, ArgAction, Command, arg};

pub const READ_CMD: &str = "read";

pub fn create_read_cli() -> Command {
    Command::new(READ_CMD)
        .author("PGS Catalog")
        .about("Read scoring files, run quality control and print a JSON summary.")
        .arg(
            Arg::new("scorefiles")
                .long("scorefiles")
                .short('s')
                .required(true)
                .num_args(1..)
                .action(ArgAction::Append)
                .help("PGS Catalog scoring files, plain or gzipped"),
        )
        .arg(arg!(--output <output> "Write the summary to a file instead of stdout"))
}
