use std::{io, path::PathBuf};

use thiserror::Error;

use crate::format::chunk::ChunkId;

#[derive(Debug, Error)]
pub enum ModError {
    #[error("misaligned chunk {tag} at offset {offset:#x}")]
    Framing { offset: u64, tag: ChunkId },

    #[error("unexpected end of data at offset {offset:#x} (need {needed} bytes, have {available})")]
    TruncatedInput { offset: u64, needed: u64, available: u64 },

    #[error("chunk {tag} read past its end at {limit:#x}")]
    Overrun { tag: ChunkId, limit: u64 },

    #[error("chunk {0} cannot be cleared")]
    UnsupportedChunk(ChunkId),

    #[error("no model loaded")]
    NoModel,

    #[error("{0}")]
    Invalid(String),

    #[error("failed to access '{}': {source}", path.display())]
    File { path: PathBuf, source: io::Error },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Binrw(binrw::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl From<binrw::Error> for ModError {
    fn from(e: binrw::Error) -> Self {
        match e {
            binrw::Error::Io(e) => Self::Io(e),
            e => Self::Binrw(e),
        }
    }
}

impl ModError {
    /// Whether the error was caused by the stream ending early.
    pub fn is_eof(&self) -> bool {
        match self {
            Self::Io(e) => e.kind() == io::ErrorKind::UnexpectedEof,
            Self::Binrw(e) => e.is_eof(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ModError>;
