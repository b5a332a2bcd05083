use std::io::{self, BufRead};

use memchr::memchr;
use regex::bytes::RegexSet;

/// One input line with its terminator stripped.
///
/// `raw_len` is the number of input bytes the line occupied, including the
/// `\n` when one was present. Budget accounting uses this length.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Line {
    pub bytes: Vec<u8>,
    pub raw_len: usize,
}

/// Newline-delimited reader over raw bytes.
///
/// A final line without a trailing `\n` is returned like any other line.
/// Lines matched by the optional skip set are consumed and dropped.
pub struct LineReader<R> {
    inner: R,
    skip: Option<RegexSet>,
    bytes_read: u64,
    lines_read: u64,
    lines_skipped: u64,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            skip: None,
            bytes_read: 0,
            lines_read: 0,
            lines_skipped: 0,
        }
    }

    /// Drop every line matched anywhere by any pattern in `skip`.
    pub fn with_skip_patterns(mut self, skip: Option<RegexSet>) -> Self {
        self.skip = skip;
        self
    }

    /// Bytes consumed from the underlying reader so far, skipped lines included.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Lines seen so far, skipped lines included.
    pub fn lines_read(&self) -> u64 {
        self.lines_read
    }

    pub fn lines_skipped(&self) -> u64 {
        self.lines_skipped
    }

    /// Read the next kept line into `buf` (cleared first, terminator stripped).
    /// Returns the raw length of the line, or `None` at end of stream.
    pub fn read_line(&mut self, buf: &mut Vec<u8>) -> io::Result<Option<usize>> {
        loop {
            let Some(raw_len) = self.read_raw(buf)? else {
                return Ok(None);
            };
            self.lines_read += 1;
            if let Some(ref skip) = self.skip {
                if skip.is_match(buf) {
                    self.lines_skipped += 1;
                    continue;
                }
            }
            return Ok(Some(raw_len));
        }
    }

    /// Read one line regardless of skip patterns.
    fn read_raw(&mut self, buf: &mut Vec<u8>) -> io::Result<Option<usize>> {
        buf.clear();
        let mut consumed = 0usize;
        loop {
            let (found_newline, used) = {
                let available = match self.inner.fill_buf() {
                    Ok(b) => b,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e),
                };
                if available.is_empty() {
                    break;
                }
                match memchr(b'\n', available) {
                    Some(pos) => {
                        buf.extend_from_slice(&available[..pos]);
                        (true, pos + 1)
                    }
                    None => {
                        buf.extend_from_slice(available);
                        (false, available.len())
                    }
                }
            };
            self.inner.consume(used);
            consumed += used;
            if found_newline {
                break;
            }
        }
        self.bytes_read += consumed as u64;
        Ok(if consumed == 0 { None } else { Some(consumed) })
    }
}

/// Read-ahead-by-one window over a [`LineReader`]: the line being processed
/// and the line after it.
///
/// The splitter needs the length of the upcoming line before it decides to
/// spill, so the next line is always read before the current one is handed out.
pub struct Lookahead<R> {
    reader: LineReader<R>,
    current: Option<Line>,
    next: Option<Line>,
}

impl<R: BufRead> Lookahead<R> {
    /// Prime the window with the first two lines of `reader`.
    pub fn new(mut reader: LineReader<R>) -> io::Result<Self> {
        let current = fetch(&mut reader)?;
        let next = if current.is_some() {
            fetch(&mut reader)?
        } else {
            None
        };
        Ok(Self {
            reader,
            current,
            next,
        })
    }

    pub fn current(&self) -> Option<&Line> {
        self.current.as_ref()
    }

    /// Move the current line out of the window. The slot stays empty until
    /// the next [`advance`](Self::advance).
    pub fn take_current(&mut self) -> Option<Line> {
        self.current.take()
    }

    /// Raw length of the line after the current one, if any.
    pub fn next_len(&self) -> Option<usize> {
        self.next.as_ref().map(|l| l.raw_len)
    }

    /// Shift the next line into the current slot and read a new next line.
    pub fn advance(&mut self) -> io::Result<()> {
        self.current = self.next.take();
        if self.current.is_some() {
            self.next = fetch(&mut self.reader)?;
        }
        Ok(())
    }

    pub fn reader(&self) -> &LineReader<R> {
        &self.reader
    }
}

fn fetch<R: BufRead>(reader: &mut LineReader<R>) -> io::Result<Option<Line>> {
    let mut bytes = Vec::new();
    Ok(reader
        .read_line(&mut bytes)?
        .map(|raw_len| Line { bytes, raw_len }))
}
