use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

pub const DEFAULT_CHUNK_SIZE: u32 = 800;
pub const DEFAULT_CHUNK_OVERLAP: u32 = 100;
pub const CHUNK_SIZE_RANGE: RangeInclusive<u32> = 100..=2000;
pub const CHUNK_OVERLAP_RANGE: RangeInclusive<u32> = 0..=500;

/// Chunking parameters forwarded to the backend with an ingestion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: u32,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: u32,
}

fn default_chunk_size() -> u32 {
    DEFAULT_CHUNK_SIZE
}

fn default_chunk_overlap() -> u32 {
    DEFAULT_CHUNK_OVERLAP
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

impl ChunkingConfig {
    pub fn new(chunk_size: u32, chunk_overlap: u32) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
        }
        .clamped()
    }

    /// Replaces each out-of-range value with its default.
    pub fn clamped(self) -> Self {
        Self {
            chunk_size: if CHUNK_SIZE_RANGE.contains(&self.chunk_size) {
                self.chunk_size
            } else {
                DEFAULT_CHUNK_SIZE
            },
            chunk_overlap: if CHUNK_OVERLAP_RANGE.contains(&self.chunk_overlap) {
                self.chunk_overlap
            } else {
                DEFAULT_CHUNK_OVERLAP
            },
        }
    }
}
