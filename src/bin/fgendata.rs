use std::fs::File;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use log::info;

use dedup_rs::common::{init_logging, io_error_msg, reset_sigpipe};
use dedup_rs::gendata::{GenConfig, generate};

#[derive(Parser)]
#[command(
    name = "fgendata",
    version,
    about = "Generate a file of random hex strings for exercising fdedup"
)]
struct Cli {
    /// File location for the test data to be created
    #[arg(long = "file", value_name = "PATH", default_value = "testdata.log")]
    file: PathBuf,

    /// How many lines to generate
    #[arg(long = "lines", value_name = "N", default_value_t = 100,
          value_parser = clap::value_parser!(u64).range(1..))]
    lines: u64,

    /// Length of the strings to generate
    #[arg(long = "strlen", value_name = "N", default_value_t = 50,
          value_parser = clap::value_parser!(u64).range(1..))]
    strlen: u64,

    /// Seed for reproducible output
    #[arg(long = "seed", value_name = "N")]
    seed: Option<u64>,

    /// Log progress to stderr
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    reset_sigpipe();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = GenConfig {
        lines: cli.lines as usize,
        strlen: cli.strlen as usize,
        seed: cli.seed,
    };

    let file = File::create(&cli.file).unwrap_or_else(|e| {
        eprintln!(
            "fgendata: cannot create '{}': {}",
            cli.file.display(),
            io_error_msg(&e)
        );
        process::exit(1);
    });

    if let Err(e) = generate(file, &config) {
        eprintln!(
            "fgendata: write error on '{}': {}",
            cli.file.display(),
            io_error_msg(&e)
        );
        process::exit(1);
    }
    info!(
        "wrote {} lines of {} characters to {}",
        config.lines,
        config.strlen,
        cli.file.display()
    );
}
