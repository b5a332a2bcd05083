use std::cmp::Ordering;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use super::error::{DedupError, Result};
use super::line::LineReader;

/// 256KB per chunk writer/cursor. Cursors exist one per chunk during the
/// merge, so this bounds merge memory at roughly k * 256KB.
const CHUNK_BUF_SIZE: usize = 256 * 1024;

/// Write each line followed by `\n`. Returns the number of bytes written.
pub fn write_sorted_lines<L: AsRef<[u8]>>(lines: &[L], out: &mut impl Write) -> io::Result<u64> {
    let mut bytes = 0u64;
    for line in lines {
        let line = line.as_ref();
        out.write_all(line)?;
        out.write_all(b"\n")?;
        bytes += line.len() as u64 + 1;
    }
    Ok(bytes)
}

/// Where chunk stores are created.
///
/// Stores are anonymous temp files: unlinked as soon as they are created, so
/// the space is reclaimed when the last handle drops, whether the run
/// finished or failed.
#[derive(Debug, Clone, Default)]
pub struct SpillDir {
    dir: Option<PathBuf>,
}

impl SpillDir {
    /// `None` means the system temp directory ($TMPDIR or /tmp).
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self { dir }
    }

    pub fn path(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    pub fn create(&self) -> Result<ChunkWriter> {
        let file = match self.path() {
            Some(dir) => tempfile::tempfile_in(dir),
            None => tempfile::tempfile(),
        }
        .map_err(|source| DedupError::TempStore {
            dir: self.path().map_or_else(std::env::temp_dir, Path::to_path_buf),
            source,
        })?;
        Ok(ChunkWriter {
            out: BufWriter::with_capacity(CHUNK_BUF_SIZE, file),
            lines: 0,
            bytes: 0,
        })
    }

    /// Create and drop one store, so an unusable directory is reported
    /// before any input is consumed.
    pub fn check(&self) -> Result<()> {
        self.create().map(drop)
    }
}

/// Write side of a chunk. Call [`finish`](Self::finish) to get a readable [`Chunk`].
pub struct ChunkWriter {
    out: BufWriter<File>,
    lines: u64,
    bytes: u64,
}

impl ChunkWriter {
    /// Append lines; the caller supplies them sorted and distinct.
    pub fn write_lines<L: AsRef<[u8]>>(&mut self, lines: &[L]) -> io::Result<()> {
        self.bytes += write_sorted_lines(lines, &mut self.out)?;
        self.lines += lines.len() as u64;
        Ok(())
    }

    pub fn finish(self) -> io::Result<Chunk> {
        let file = self.out.into_inner().map_err(|e| e.into_error())?;
        Ok(Chunk {
            file,
            lines: self.lines,
            bytes: self.bytes,
        })
    }
}

/// A sorted, duplicate-free run of lines in a temporary store.
#[derive(Debug)]
pub struct Chunk {
    file: File,
    lines: u64,
    bytes: u64,
}

impl Chunk {
    pub fn lines(&self) -> u64 {
        self.lines
    }

    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    pub fn is_empty(&self) -> bool {
        self.lines == 0
    }
}

/// Sequential reader over one chunk, positioned on its current line.
///
/// Dropping the cursor closes the store, which releases its disk space.
pub struct MergeCursor {
    reader: LineReader<BufReader<File>>,
    line: Vec<u8>,
    index: usize,
}

impl MergeCursor {
    /// Rewind `chunk` and position on its first line.
    /// Returns `None` if the store holds no data.
    pub fn open(chunk: Chunk, index: usize) -> io::Result<Option<Self>> {
        let mut file = chunk.file;
        file.seek(SeekFrom::Start(0))?;
        let mut reader = LineReader::new(BufReader::with_capacity(CHUNK_BUF_SIZE, file));
        let mut line = Vec::new();
        if reader.read_line(&mut line)?.is_none() {
            return Ok(None);
        }
        Ok(Some(Self {
            reader,
            line,
            index,
        }))
    }

    #[inline]
    pub fn line(&self) -> &[u8] {
        &self.line
    }

    /// Position of the chunk in the split order.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Move to the next line. Returns `false` once the chunk is exhausted.
    pub fn advance(&mut self) -> io::Result<bool> {
        Ok(self.reader.read_line(&mut self.line)?.is_some())
    }
}

// Heap order: current line, then chunk index so equal lines pop in split order.
impl PartialEq for MergeCursor {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for MergeCursor {}

impl PartialOrd for MergeCursor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MergeCursor {
    fn cmp(&self, other: &Self) -> Ordering {
        self.line
            .cmp(&other.line)
            .then_with(|| self.index.cmp(&other.index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk_of(lines: &[&[u8]]) -> Chunk {
        let mut writer = SpillDir::default().create().unwrap();
        writer.write_lines(lines).unwrap();
        writer.finish().unwrap()
    }

    #[test]
    fn test_write_sorted_lines_terminates_every_line() {
        let mut out = Vec::new();
        let lines: [&[u8]; 3] = [b"a", b"", b"bc"];
        let n = write_sorted_lines(&lines, &mut out).unwrap();
        assert_eq!(out, b"a\n\nbc\n");
        assert_eq!(n, 6);
    }

    #[test]
    fn test_chunk_counts() {
        let chunk = chunk_of(&[b"a", b"b", b"c"]);
        assert_eq!(chunk.lines(), 3);
        assert_eq!(chunk.bytes(), 6);
        assert!(!chunk.is_empty());
    }

    #[test]
    fn test_cursor_reads_back_in_order() {
        let chunk = chunk_of(&[b"apple", b"banana", b"cherry"]);
        let mut cursor = MergeCursor::open(chunk, 7).unwrap().unwrap();
        assert_eq!(cursor.index(), 7);
        assert_eq!(cursor.line(), b"apple");
        assert!(cursor.advance().unwrap());
        assert_eq!(cursor.line(), b"banana");
        assert!(cursor.advance().unwrap());
        assert_eq!(cursor.line(), b"cherry");
        assert!(!cursor.advance().unwrap());
    }

    #[test]
    fn test_cursor_on_empty_chunk() {
        let chunk = chunk_of(&[]);
        assert!(chunk.is_empty());
        assert!(MergeCursor::open(chunk, 0).unwrap().is_none());
    }

    #[test]
    fn test_chunk_keeps_single_empty_line() {
        let chunk = chunk_of(&[b""]);
        assert_eq!(chunk.lines(), 1);
        let mut cursor = MergeCursor::open(chunk, 0).unwrap().unwrap();
        assert_eq!(cursor.line(), b"");
        assert!(!cursor.advance().unwrap());
    }

    #[test]
    fn test_spill_dir_in_custom_directory() {
        let dir = tempfile::tempdir().unwrap();
        let spill = SpillDir::new(Some(dir.path().to_path_buf()));
        assert_eq!(spill.path(), Some(dir.path()));
        let mut writer = spill.create().unwrap();
        writer.write_lines(&[b"x"]).unwrap();
        writer.finish().unwrap();
        // Anonymous stores leave no names behind.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_spill_dir_missing_names_the_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone");
        let spill = SpillDir::new(Some(missing.clone()));
        match spill.check() {
            Err(DedupError::TempStore { dir, source }) => {
                assert_eq!(dir, missing);
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("expected TempStore error, got {:?}", other),
        }
        let msg = spill.create().err().unwrap().to_string();
        assert!(msg.starts_with("cannot create temporary file in '"), "got: {}", msg);
        assert!(msg.contains("gone"), "got: {}", msg);
        assert!(!msg.contains("os error"), "got: {}", msg);
    }
}
