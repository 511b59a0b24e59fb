use std::path::{Path, PathBuf};

use indexmap::IndexMap;

pub use crate::format::chunk::chunk_id_to_name;
use crate::{
    error::{ModError, Result},
    format::{chunk::ChunkId, model::Model},
    util::file::{create_file, map_file},
};

/// Editing context owning the active model.
#[derive(Debug, Default)]
pub struct Session {
    active: Option<ActiveModel>,
}

#[derive(Debug)]
struct ActiveModel {
    path: PathBuf,
    model: Model,
}

impl Session {
    pub fn new() -> Self { Self::default() }

    /// Loads `path`, replacing the current model. The current model is kept
    /// if loading fails.
    pub fn read<P: AsRef<Path>>(&mut self, path: P) -> Result<&Model> {
        let path = path.as_ref();
        let model = {
            let map = map_file(path)?;
            Model::from_bytes(&map)?
        };
        log::info!("Loaded {}", path.display());
        let active = self.active.insert(ActiveModel { path: path.to_path_buf(), model });
        Ok(&active.model)
    }

    /// Writes the current model to `path`.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let model = self.model()?;
        let path = path.as_ref();
        create_file(path, |w| model.write(w))?;
        log::info!("Wrote {}", path.display());
        Ok(())
    }

    /// Drops the current model.
    pub fn reset(&mut self) {
        if let Some(active) = self.active.take() {
            log::debug!("Closed {}", active.path.display());
        }
    }

    /// Installs an in-memory model, e.g. one built from scratch.
    pub fn load_model<P: Into<PathBuf>>(&mut self, path: P, model: Model) {
        self.active = Some(ActiveModel { path: path.into(), model });
    }

    #[inline]
    pub fn is_loaded(&self) -> bool { self.active.is_some() }

    /// Path the current model was read from.
    pub fn path(&self) -> Option<&Path> { self.active.as_ref().map(|a| a.path.as_path()) }

    pub fn model(&self) -> Result<&Model> {
        self.active.as_ref().map(|a| &a.model).ok_or(ModError::NoModel)
    }

    pub fn model_mut(&mut self) -> Result<&mut Model> {
        self.active.as_mut().map(|a| &mut a.model).ok_or(ModError::NoModel)
    }

    pub fn clear_chunk(&mut self, id: ChunkId) -> Result<()> { self.model_mut()?.clear_chunk(id) }

    pub fn set_header_date(&mut self, year: u16, month: u8, day: u8) -> Result<()> {
        let header = &mut self.model_mut()?.header;
        header.year = year;
        header.month = month;
        header.day = day;
        Ok(())
    }

    pub fn set_header_flags(&mut self, flags: u32) -> Result<()> {
        self.model_mut()?.header.flags = flags;
        Ok(())
    }

    /// Record count per populated chunk, in write order.
    pub fn summary(&self) -> Result<IndexMap<&'static str, usize>> {
        let model = self.model()?;
        let mut out = IndexMap::new();
        for id in ChunkId::KNOWN {
            match model.element_count(id) {
                Some(0) | None => {}
                Some(count) => {
                    out.insert(id.name(), count);
                }
            }
            if id == ChunkId::Material && !model.materials.tev_infos.is_empty() {
                out.insert("TEV_INFO", model.materials.tev_infos.len());
            }
        }
        Ok(out)
    }
}
