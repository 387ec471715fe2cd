//! Gzip compression of finished documents.

use std::io::{self, Write};

use flate2::Compression;
use flate2::write::GzEncoder;

use crate::options::DEFAULT_COMPRESSION_LEVEL;
use crate::pool::Recycle;

pub trait Compressor: Send {
    /// Appends the compressed form of `input` to `output`.
    fn compress(&mut self, input: &[u8], output: &mut Vec<u8>) -> io::Result<()>;
}

/// Gzip-framed deflate. Holds no state between calls besides its level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GzipCompressor {
    level: u32,
}

impl GzipCompressor {
    /// Levels above 9 are clamped.
    pub fn new(level: u32) -> Self {
        Self { level: level.min(9) }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn set_level(&mut self, level: u32) {
        self.level = level.min(9);
    }
}

impl Default for GzipCompressor {
    fn default() -> Self {
        Self::new(DEFAULT_COMPRESSION_LEVEL)
    }
}

impl Compressor for GzipCompressor {
    fn compress(&mut self, input: &[u8], output: &mut Vec<u8>) -> io::Result<()> {
        let target = std::mem::take(output);
        let mut encoder = GzEncoder::new(target, Compression::new(self.level));
        encoder.write_all(input)?;
        *output = encoder.finish()?;
        Ok(())
    }
}

impl Recycle for GzipCompressor {
    fn recycle(&mut self) {
        self.level = DEFAULT_COMPRESSION_LEVEL;
    }
}
