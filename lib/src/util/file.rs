use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use memmap2::{Mmap, MmapOptions};

use crate::error::{ModError, Result};

/// Opens a memory mapped file.
pub fn map_file<P: AsRef<Path>>(path: P) -> Result<Mmap> {
    let path = path.as_ref();
    let file =
        File::open(path).map_err(|source| ModError::File { path: path.to_path_buf(), source })?;
    let map = unsafe { MmapOptions::new().map(&file) }
        .map_err(|source| ModError::File { path: path.to_path_buf(), source })?;
    Ok(map)
}

/// Creates `path` and hands a buffered writer to `cb`. The file is flushed
/// and closed before returning.
pub fn create_file<P, CB>(path: P, cb: CB) -> Result<()>
where
    P: AsRef<Path>,
    CB: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    let path = path.as_ref();
    let file =
        File::create(path).map_err(|source| ModError::File { path: path.to_path_buf(), source })?;
    let mut writer = BufWriter::new(file);
    cb(&mut writer)?;
    writer.flush().map_err(|source| ModError::File { path: path.to_path_buf(), source })?;
    Ok(())
}
