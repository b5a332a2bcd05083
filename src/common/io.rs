use std::collections::VecDeque;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

#[cfg(target_os = "linux")]
use std::sync::atomic::{AtomicBool, Ordering};

/// Track whether O_NOATIME is supported to avoid repeated failed open() attempts.
/// After the first EPERM, we never try O_NOATIME again.
#[cfg(target_os = "linux")]
static NOATIME_SUPPORTED: AtomicBool = AtomicBool::new(true);

/// Open a file with O_NOATIME on Linux to avoid atime inode writes.
#[cfg(target_os = "linux")]
fn open_noatime(path: &Path) -> io::Result<File> {
    use std::os::unix::fs::OpenOptionsExt;
    if NOATIME_SUPPORTED.load(Ordering::Relaxed) {
        match OpenOptions::new()
            .read(true)
            .custom_flags(libc::O_NOATIME)
            .open(path)
        {
            Ok(f) => return Ok(f),
            Err(ref e) if e.raw_os_error() == Some(libc::EPERM) => {
                // O_NOATIME requires file ownership or CAP_FOWNER; disable globally
                NOATIME_SUPPORTED.store(false, Ordering::Relaxed);
            }
            Err(e) => return Err(e),
        }
    }
    File::open(path)
}

#[cfg(not(target_os = "linux"))]
fn open_noatime(path: &Path) -> io::Result<File> {
    File::open(path)
}

/// Open one input: `-` is stdin, anything else a file path.
pub fn open_input(path: &str) -> io::Result<Box<dyn Read>> {
    if path == "-" {
        Ok(Box::new(io::stdin().lock()))
    } else {
        Ok(Box::new(open_noatime(Path::new(path))?))
    }
}

/// Reads several inputs back to back as one byte stream, like `cat`.
///
/// No separator is inserted: if an input does not end with a newline, its
/// last line runs into the first line of the next input.
pub struct MultiReader {
    readers: VecDeque<Box<dyn Read>>,
}

impl MultiReader {
    pub fn new(readers: Vec<Box<dyn Read>>) -> Self {
        Self {
            readers: readers.into(),
        }
    }
}

impl Read for MultiReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        while let Some(reader) = self.readers.front_mut() {
            match reader.read(buf) {
                Ok(0) => {
                    self.readers.pop_front();
                }
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(0)
    }
}

/// Combined size of the inputs, if every one is a regular file.
/// Stdin and special files make the total unknown.
pub fn total_input_size(paths: &[String]) -> Option<u64> {
    let mut total = 0u64;
    for path in paths {
        if path == "-" {
            return None;
        }
        let meta = fs::metadata(path).ok()?;
        if !meta.file_type().is_file() {
            return None;
        }
        total += meta.len();
    }
    Some(total)
}

/// What to undo if the run does not complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rollback {
    /// We created the file: remove it.
    Remove,
    /// We appended to an existing file: truncate back to its old length.
    Truncate(u64),
}

/// Output file that is rolled back unless [`commit`](Self::commit) is called.
///
/// Without `append`, the file must not already exist. With `append`, new
/// lines go after the existing content. Either way, a run that fails (or a
/// value dropped without commit) leaves the path as it was found.
#[derive(Debug)]
pub struct OutputFile {
    file: File,
    path: PathBuf,
    rollback: Rollback,
    committed: bool,
}

impl OutputFile {
    pub fn open(path: &Path, append: bool) -> io::Result<Self> {
        if append {
            match OpenOptions::new().append(true).open(path) {
                Ok(file) => {
                    let len = file.metadata()?.len();
                    return Ok(Self {
                        file,
                        path: path.to_path_buf(),
                        rollback: Rollback::Truncate(len),
                        committed: false,
                    });
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
        }
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
            rollback: Rollback::Remove,
            committed: false,
        })
    }

    /// Keep the output. Flushes to the OS first.
    pub fn commit(mut self) -> io::Result<()> {
        self.file.flush()?;
        self.committed = true;
        Ok(())
    }
}

impl Write for OutputFile {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }
    #[inline]
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.file.write_all(buf)
    }
    #[inline]
    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

impl Drop for OutputFile {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        // Best effort: the run has already failed, report that error instead.
        match self.rollback {
            Rollback::Remove => {
                let _ = fs::remove_file(&self.path);
            }
            Rollback::Truncate(len) => {
                let _ = self.file.set_len(len);
            }
        }
    }
}
