use std::io::{self, BufWriter, Write};

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

/// 256KB write buffer, matching the dedup input buffer.
const WRITE_BUF_SIZE: usize = 256 * 1024;

/// Configuration for generating test data.
#[derive(Debug, Clone)]
pub struct GenConfig {
    /// Number of lines to write.
    pub lines: usize,
    /// Characters per line, excluding the newline.
    pub strlen: usize,
    /// Fixed seed for reproducible output; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for GenConfig {
    fn default() -> Self {
        GenConfig {
            lines: 100,
            strlen: 50,
            seed: None,
        }
    }
}

/// Write `config.lines` random lowercase-hex strings of exactly
/// `config.strlen` characters, one per line.
pub fn generate<W: Write>(out: W, config: &GenConfig) -> io::Result<()> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut w = BufWriter::with_capacity(WRITE_BUF_SIZE, out);

    // Two hex characters per random byte, cut back to strlen.
    let mut raw = vec![0u8; config.strlen.div_ceil(2)];
    let mut encoded = vec![0u8; raw.len() * 2];
    for _ in 0..config.lines {
        rng.fill_bytes(&mut raw);
        hex::encode_to_slice(&raw, &mut encoded)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        w.write_all(&encoded[..config.strlen])?;
        w.write_all(b"\n")?;
    }
    w.flush()
}
