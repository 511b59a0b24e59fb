use std::io::{self, Cursor, Seek, SeekFrom, Write};

use binrw::{BinRead, BinReaderExt, BinWrite, BinWriterExt, Endian};

use crate::error::Result;

/// Byte order of every field in a MOD container.
pub const ENDIAN: Endian = Endian::Big;

/// Alignment of chunk payloads and display list data.
pub const ALIGNMENT: u64 = 0x20;

const PADDING: [u8; ALIGNMENT as usize] = [0u8; ALIGNMENT as usize];

/// Rounds `pos` up to the next multiple of [`ALIGNMENT`].
#[inline]
pub const fn align_up(pos: u64) -> u64 { (pos + ALIGNMENT - 1) & !(ALIGNMENT - 1) }

#[inline]
pub const fn is_aligned(pos: u64) -> bool { pos & (ALIGNMENT - 1) == 0 }

/// Skips forward to the next aligned offset. No-op when already aligned.
pub fn align_reader<R>(reader: &mut R) -> io::Result<u64>
where R: Seek + ?Sized {
    let pos = reader.stream_position()?;
    let aligned = align_up(pos);
    if aligned != pos {
        reader.seek(SeekFrom::Start(aligned))?;
    }
    Ok(aligned)
}

/// Writes zero padding up to the next aligned offset. No-op when already aligned.
pub fn align_writer<W>(writer: &mut W) -> io::Result<u64>
where W: Write + Seek + ?Sized {
    let pos = writer.stream_position()?;
    let aligned = align_up(pos);
    writer.write_all(&PADDING[..(aligned - pos) as usize])?;
    Ok(aligned)
}

/// Runs `cb` with the stream positioned at `pos`, then returns to the
/// previous position, even if `cb` failed.
pub fn at_position<S, T, CB>(stream: &mut S, pos: u64, cb: CB) -> Result<T>
where
    S: Seek + ?Sized,
    CB: FnOnce(&mut S) -> Result<T>,
{
    let saved = stream.stream_position()?;
    stream.seek(SeekFrom::Start(pos))?;
    let result = cb(stream);
    stream.seek(SeekFrom::Start(saved))?;
    result
}

/// Reads a count-prefixed array: `u32` count, alignment, then the records
/// back-to-back.
pub fn read_array<T>(reader: &mut Cursor<&[u8]>) -> Result<Vec<T>>
where T: for<'a> BinRead<Args<'a> = ()> {
    let count: u32 = reader.read_type(ENDIAN)?;
    align_reader(reader)?;
    let mut out = Vec::new();
    for _ in 0..count {
        out.push(reader.read_type(ENDIAN)?);
    }
    Ok(out)
}

/// Writes a count-prefixed array in the layout read by [`read_array`].
pub fn write_array<T, W>(writer: &mut W, items: &[T]) -> Result<()>
where
    T: for<'a> BinWrite<Args<'a> = ()>,
    W: Write + Seek,
{
    writer.write_type(&count_u32(items.len())?, ENDIAN)?;
    align_writer(writer)?;
    for item in items {
        writer.write_type(item, ENDIAN)?;
    }
    Ok(())
}

#[inline]
pub fn count_u32(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| crate::error::ModError::Invalid(format!("Too many records: {len}")))
}
