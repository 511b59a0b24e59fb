pub mod collision;
pub mod dl;
pub mod material;
pub mod model;

use std::path::Path;

use anyhow::{Context, Result};
use modlib::Session;

/// Opens a session with `path` loaded.
pub fn open(path: &Path) -> Result<Session> {
    let mut session = Session::new();
    session.read(path).with_context(|| format!("Failed to read '{}'", path.display()))?;
    Ok(session)
}

pub fn save(session: &Session, path: &Path) -> Result<()> {
    session.write(path).with_context(|| format!("Failed to write '{}'", path.display()))
}
