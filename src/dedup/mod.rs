pub mod chunk;
pub mod core;
pub mod distinct;
pub mod error;
pub mod line;
pub mod merge;
pub mod split;


pub use self::chunk::{Chunk, ChunkWriter, MergeCursor, SpillDir};
pub use self::core::*;
pub use self::error::DedupError;
pub use self::merge::merge;
pub use self::split::{SplitOutcome, SplitStats, Splitter};
