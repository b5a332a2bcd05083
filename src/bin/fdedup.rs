use std::io;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result, anyhow};
use clap::{ArgAction, Parser};
use log::info;

use dedup_rs::common::io::{MultiReader, OutputFile, open_input, total_input_size};
use dedup_rs::common::{init_logging, io_error_msg, reset_sigpipe};
use dedup_rs::dedup::{
    DEFAULT_BUFFER_SIZE, DedupConfig, DedupError, DedupStats, parse_buffer_size,
};

#[derive(Parser)]
#[command(
    name = "fdedup",
    version,
    about = "Remove duplicate lines from files too large for memory",
    after_help = "Each distinct line is written exactly once, in byte order. Distinct lines are \
                  held in memory up to SIZE bytes, then spilled to sorted temporary chunks that \
                  are merged at the end. Peak memory is a small multiple of SIZE."
)]
struct Cli {
    /// Write result to FILE instead of standard output (FILE must not exist unless --append)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    output: Option<PathBuf>,

    /// Append to FILE instead of requiring a new file
    #[arg(long = "append", requires = "output")]
    append: bool,

    /// Bytes of distinct lines to hold in memory before spilling (suffixes K, M, G, T)
    #[arg(short = 'S', long = "buffer-size", value_name = "SIZE")]
    buffer_size: Option<String>,

    /// Use DIR for temporaries, not $TMPDIR or /tmp
    #[arg(short = 'T', long = "temporary-directory", value_name = "DIR")]
    temp_dir: Option<PathBuf>,

    /// Skip lines matching REGEX (may be given more than once)
    #[arg(long = "skip-pattern", value_name = "REGEX")]
    skip_patterns: Vec<String>,

    /// Log progress to stderr (-vv for per-chunk detail)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,

    /// Files to deduplicate, read back to back; '-' or none means stdin
    files: Vec<String>,
}

fn main() {
    reset_sigpipe();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let buffer_size = match cli.buffer_size {
        Some(ref s) => parse_buffer_size(s).unwrap_or_else(|e| {
            eprintln!("fdedup: {}", e);
            process::exit(2);
        }),
        None => DEFAULT_BUFFER_SIZE,
    };

    if let Err(e) = run(&cli, buffer_size) {
        eprintln!("fdedup: {:#}", e);
        process::exit(1);
    }
}

fn run(cli: &Cli, buffer_size: usize) -> Result<()> {
    let inputs = if cli.files.is_empty() {
        vec!["-".to_string()]
    } else {
        cli.files.clone()
    };

    // Open every input before touching the output, so a bad path fails cleanly.
    let mut readers = Vec::with_capacity(inputs.len());
    for path in &inputs {
        let reader =
            open_input(path).map_err(|e| anyhow!("cannot open '{}': {}", path, io_error_msg(&e)))?;
        readers.push(reader);
    }
    let input = MultiReader::new(readers);

    let config = DedupConfig {
        buffer_size,
        temp_dir: cli.temp_dir.clone(),
        skip_patterns: cli.skip_patterns.clone(),
        input_size_hint: total_input_size(&inputs),
    };

    // Reject bad settings before the output file is created.
    let plan = config.prepare().map_err(engine_error)?;

    info!("Starting dedup...");
    let stats = match cli.output {
        Some(ref path) => {
            let mut out = OutputFile::open(path, cli.append).map_err(|e| {
                if e.kind() == io::ErrorKind::AlreadyExists {
                    anyhow!("'{}' already exists (use --append)", path.display())
                } else {
                    anyhow!("cannot create '{}': {}", path.display(), io_error_msg(&e))
                }
            })?;
            let stats = plan.run(input, &mut out).map_err(engine_error)?;
            out.commit()
                .with_context(|| format!("cannot write '{}'", path.display()))?;
            stats
        }
        None => plan.run(input, io::stdout().lock()).map_err(engine_error)?,
    };
    report(&stats);
    info!("Success!");
    Ok(())
}

/// Plain I/O failures are reported without the "(os error N)" suffix.
fn engine_error(e: DedupError) -> anyhow::Error {
    match e {
        DedupError::Io(ref err) => anyhow!("{}", io_error_msg(err)),
        other => other.into(),
    }
}

fn report(stats: &DedupStats) {
    info!(
        "read {} lines ({} bytes), skipped {}, wrote {} distinct lines from {} chunk(s){}",
        stats.lines_read,
        stats.bytes_read,
        stats.lines_skipped,
        stats.distinct_written,
        stats.chunks,
        if stats.merged { ", merged" } else { "" }
    );
}
