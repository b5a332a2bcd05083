use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::io::Write;

use log::info;

use super::chunk::{Chunk, MergeCursor};
use super::error::{DedupError, Result};

/// K-way merge of sorted, duplicate-free chunks into `out`, dropping lines
/// that repeat across chunk boundaries. Returns the number of lines written.
///
/// Requires at least two chunks, none of them empty; both are checked before
/// anything is written. Each chunk's store is released as soon as its cursor
/// runs dry.
pub fn merge<W: Write>(chunks: Vec<Chunk>, out: &mut W) -> Result<u64> {
    if chunks.len() < 2 {
        return Err(DedupError::TooFewChunks(chunks.len()));
    }
    if let Some(idx) = chunks.iter().position(Chunk::is_empty) {
        return Err(DedupError::EmptyChunk(idx));
    }

    let k = chunks.len();
    // BinaryHeap is a max-heap; Reverse pops the smallest current line first.
    let mut heap: BinaryHeap<Reverse<MergeCursor>> = BinaryHeap::with_capacity(k);
    for (index, chunk) in chunks.into_iter().enumerate() {
        match MergeCursor::open(chunk, index)? {
            Some(cursor) => heap.push(Reverse(cursor)),
            None => return Err(DedupError::EmptyChunk(index)),
        }
    }

    let mut last: Option<Vec<u8>> = None;
    let mut written = 0u64;

    while let Some(Reverse(mut cursor)) = heap.pop() {
        let is_new = last.as_deref() != Some(cursor.line());
        if is_new {
            out.write_all(cursor.line())?;
            out.write_all(b"\n")?;
            let prev = last.get_or_insert_with(Vec::new);
            prev.clear();
            prev.extend_from_slice(cursor.line());
            written += 1;
        }
        if cursor.advance()? {
            heap.push(Reverse(cursor));
        }
    }

    out.flush()?;
    info!("merged {} chunks into {} distinct lines", k, written);
    Ok(written)
}
