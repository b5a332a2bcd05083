use std::io::{BufRead, Write};
use std::num::NonZeroU64;

use log::{debug, info};

use super::chunk::{Chunk, SpillDir, write_sorted_lines};
use super::distinct::{DistinctSet, GrowthAccumulator};
use super::error::Result;
use super::line::{LineReader, Lookahead};

/// What the split phase produced.
#[derive(Debug)]
pub enum SplitOutcome {
    /// The input held no lines. Nothing was written.
    Empty,
    /// Everything fit in one segment, which was written straight to the
    /// output. The merge phase must not run.
    Direct { lines: u64 },
    /// At least one spill happened. Every chunk is sorted, non-empty and
    /// duplicate-free; they still need merging.
    Spilled(Vec<Chunk>),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SplitStats {
    pub lines_read: u64,
    pub lines_skipped: u64,
    pub bytes_read: u64,
    /// Chunks written to temporary stores (the direct output is not counted).
    pub spills: usize,
}

/// Partitions a line stream into sorted, duplicate-free chunks under a byte budget.
pub struct Splitter<'a> {
    budget: NonZeroU64,
    spill_dir: &'a SpillDir,
    total_input: Option<u64>,
}

impl<'a> Splitter<'a> {
    pub fn new(budget: NonZeroU64, spill_dir: &'a SpillDir) -> Self {
        Self {
            budget,
            spill_dir,
            total_input: None,
        }
    }

    /// Total input size in bytes, when known, for progress messages.
    pub fn with_total_input(mut self, total: Option<u64>) -> Self {
        self.total_input = total;
        self
    }

    /// Run the split phase. When no spill is needed the single segment is
    /// written to `out`; otherwise `out` is left untouched.
    pub fn split<R: BufRead, W: Write>(
        &self,
        reader: LineReader<R>,
        out: &mut W,
    ) -> Result<(SplitOutcome, SplitStats)> {
        let mut lines = Lookahead::new(reader)?;
        let mut set = DistinctSet::new();
        let mut acc = GrowthAccumulator::new(self.budget);
        let mut chunks: Vec<Chunk> = Vec::new();
        debug!("splitting with a budget of {} bytes", acc.budget());

        while let Some(line) = lines.take_current() {
            let grew = set.insert(line.bytes);
            acc.observe(grew, line.raw_len);

            // Repeats never trigger a spill on their own.
            if grew {
                if let Some(next_len) = lines.next_len() {
                    if acc.would_exceed(next_len) {
                        let chunk = self.spill(&mut set)?;
                        debug!(
                            "spilled chunk {}: {} lines, {} bytes{}",
                            chunks.len(),
                            chunk.lines(),
                            chunk.bytes(),
                            self.progress(lines.reader().bytes_read())
                        );
                        chunks.push(chunk);
                        acc.reset();
                    }
                }
            }
            lines.advance()?;
        }

        let reader = lines.reader();
        let mut stats = SplitStats {
            lines_read: reader.lines_read(),
            lines_skipped: reader.lines_skipped(),
            bytes_read: reader.bytes_read(),
            spills: chunks.len(),
        };

        let outcome = if chunks.is_empty() {
            if set.is_empty() {
                SplitOutcome::Empty
            } else {
                let sorted = set.drain_sorted();
                write_sorted_lines(&sorted, out)?;
                info!("input fit in memory: {} distinct lines", sorted.len());
                SplitOutcome::Direct {
                    lines: sorted.len() as u64,
                }
            }
        } else {
            // A spill only happens while a line is still pending, so the
            // final segment is never empty here.
            if !set.is_empty() {
                chunks.push(self.spill(&mut set)?);
                stats.spills += 1;
            }
            info!(
                "split {} lines into {} chunks",
                stats.lines_read - stats.lines_skipped,
                chunks.len()
            );
            SplitOutcome::Spilled(chunks)
        };

        Ok((outcome, stats))
    }

    fn spill(&self, set: &mut DistinctSet) -> Result<Chunk> {
        let sorted = set.drain_sorted();
        let mut writer = self.spill_dir.create()?;
        writer.write_lines(&sorted)?;
        Ok(writer.finish()?)
    }

    fn progress(&self, bytes_read: u64) -> String {
        match self.total_input {
            Some(total) if total > 0 => {
                format!(" ({:.1}% of input)", bytes_read as f64 * 100.0 / total as f64)
            }
            _ => String::new(),
        }
    }
}
