/// Core dedup pipeline for fdedup.
/// Memory-bounded external deduplication: split the input into sorted,
/// duplicate-free chunks under a byte budget, then k-way merge them.
///
/// Output is every distinct input line exactly once, newline-terminated,
/// in ascending byte order.
use std::io::{BufReader, BufWriter, Read, Write};
use std::num::NonZeroU64;
use std::path::PathBuf;

use regex::bytes::RegexSet;

use super::chunk::SpillDir;
use super::error::{DedupError, Result};
use super::line::LineReader;
use super::merge::merge;
use super::split::{SplitOutcome, Splitter};

/// Default byte budget for distinct lines held in memory (250MB).
pub const DEFAULT_BUFFER_SIZE: usize = 250_000_000;

/// 4MB output buffer.
const OUTPUT_BUF_SIZE: usize = 4 * 1024 * 1024;

const INPUT_BUF_SIZE: usize = 256 * 1024;

/// Configuration for a dedup run.
#[derive(Debug, Clone)]
pub struct DedupConfig {
    /// Byte budget for distinct lines held in memory before a spill.
    pub buffer_size: usize,
    /// Directory for chunk stores; `None` uses the system temp dir.
    pub temp_dir: Option<PathBuf>,
    /// Lines matching any of these patterns are dropped.
    pub skip_patterns: Vec<String>,
    /// Total input size, when known. Only used for progress messages.
    pub input_size_hint: Option<u64>,
}

impl Default for DedupConfig {
    fn default() -> Self {
        DedupConfig {
            buffer_size: DEFAULT_BUFFER_SIZE,
            temp_dir: None,
            skip_patterns: Vec::new(),
            input_size_hint: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DedupStats {
    /// Lines read from the input, skipped lines included.
    pub lines_read: u64,
    pub lines_skipped: u64,
    pub bytes_read: u64,
    /// Lines written to the output.
    pub distinct_written: u64,
    /// Chunks produced by the split phase, the direct output included.
    pub chunks: usize,
    /// Whether the merge phase ran.
    pub merged: bool,
}

impl DedupConfig {
    /// Validate the settings and compile the skip patterns.
    ///
    /// An explicit temp directory is probed here, so a bad one is reported
    /// before any input is read. The system temp directory is first touched
    /// by the first spill.
    pub fn prepare(&self) -> Result<DedupPlan> {
        let budget =
            NonZeroU64::new(self.buffer_size as u64).ok_or(DedupError::InvalidBufferSize)?;
        let skip = compile_skip_patterns(&self.skip_patterns)?;
        let spill_dir = SpillDir::new(self.temp_dir.clone());
        if spill_dir.path().is_some() {
            spill_dir.check()?;
        }
        Ok(DedupPlan {
            budget,
            skip,
            spill_dir,
            input_size_hint: self.input_size_hint,
        })
    }
}

/// A validated [`DedupConfig`], ready to run against an input.
#[derive(Debug)]
pub struct DedupPlan {
    budget: NonZeroU64,
    skip: Option<RegexSet>,
    spill_dir: SpillDir,
    input_size_hint: Option<u64>,
}

impl DedupPlan {
    /// Deduplicate the lines of `input` into `output`.
    ///
    /// On error the output may hold a partial result and must be discarded
    /// by the caller.
    pub fn run<R: Read, W: Write>(self, input: R, output: W) -> Result<DedupStats> {
        let reader = LineReader::new(BufReader::with_capacity(INPUT_BUF_SIZE, input))
            .with_skip_patterns(self.skip);
        let mut out = BufWriter::with_capacity(OUTPUT_BUF_SIZE, output);

        let (outcome, split) = Splitter::new(self.budget, &self.spill_dir)
            .with_total_input(self.input_size_hint)
            .split(reader, &mut out)?;

        let mut stats = DedupStats {
            lines_read: split.lines_read,
            lines_skipped: split.lines_skipped,
            bytes_read: split.bytes_read,
            ..DedupStats::default()
        };

        match outcome {
            SplitOutcome::Empty => {}
            SplitOutcome::Direct { lines } => {
                stats.distinct_written = lines;
                stats.chunks = 1;
            }
            SplitOutcome::Spilled(chunks) => {
                stats.chunks = chunks.len();
                stats.distinct_written = merge(chunks, &mut out)?;
                stats.merged = true;
            }
        }

        out.flush()?;
        Ok(stats)
    }
}

/// Deduplicate the lines of `input` into `output`.
///
/// The configuration is validated before any input is read.
pub fn dedup<R: Read, W: Write>(input: R, output: W, config: &DedupConfig) -> Result<DedupStats> {
    config.prepare()?.run(input, output)
}

/// Compile skip patterns into one set. No patterns means no filtering.
pub fn compile_skip_patterns(patterns: &[String]) -> Result<Option<RegexSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    Ok(Some(RegexSet::new(patterns)?))
}

/// Convenience wrapper: dedup an in-memory buffer.
pub fn dedup_bytes(input: &[u8], config: &DedupConfig) -> Result<(Vec<u8>, DedupStats)> {
    let mut output = Vec::new();
    let stats = dedup(input, &mut output, config)?;
    Ok((output, stats))
}

/// Parse a buffer size string like "250000000", "64K", "250M", "1G".
/// Suffixes are binary (K = 1024). Zero is rejected.
pub fn parse_buffer_size(s: &str) -> std::result::Result<usize, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty buffer size".to_string());
    }

    let (num_part, suffix) = if s.ends_with(|c: char| c.is_ascii_alphabetic()) {
        let (n, suf) = s.split_at(s.len() - 1);
        (n, suf.chars().next())
    } else {
        (s, None)
    };

    let base: usize = num_part
        .parse()
        .map_err(|_| format!("invalid buffer size: '{}'", s))?;

    let multiplier: usize = match suffix {
        Some('K') | Some('k') => 1024,
        Some('M') | Some('m') => 1024 * 1024,
        Some('G') | Some('g') => 1024 * 1024 * 1024,
        Some('T') | Some('t') => 1024usize.pow(4),
        Some(c) => return Err(format!("invalid suffix '{}' in buffer size", c)),
        None => 1,
    };

    let size = base
        .checked_mul(multiplier)
        .ok_or_else(|| format!("buffer size too large: '{}'", s))?;
    if size == 0 {
        return Err("buffer size must be positive".to_string());
    }
    Ok(size)
}
