//! Reading, editing and writing MOD model containers, plus decoding of the
//! GX display lists embedded in their meshes.

pub mod error;
pub mod format;
pub mod gx;
pub mod session;
pub mod util;

pub use error::{ModError, Result};
pub use format::{
    chunk::{chunk_id_to_name, ChunkId},
    model::Model,
};
pub use session::Session;
