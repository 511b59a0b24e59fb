use std::io::{self, Read, Seek, Write};

use binrw::{binrw, BinRead, BinResult, BinWrite, Endian};

use crate::{
    format::{bitfield::DisplayListFlags, chunk::TEXCOORD_CHANNELS},
    util::io::{align_reader, align_writer},
};

/// Vertex control descriptor: which per-vertex attributes are present in
/// the display lists of a mesh.
///
/// ```text
/// bit 0      position matrix index
/// bit 1      texture matrix index
/// bit 2      vertex colour
/// bits 3-10  texcoord channels 0-7
/// ```
#[binrw]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Vcd(pub u32);

impl Vcd {
    pub const MATRIX_INDEX: u32 = 1 << 0;
    pub const TEX_MATRIX_INDEX: u32 = 1 << 1;
    pub const COLOUR: u32 = 1 << 2;
    pub const TEXCOORD0: u32 = 1 << 3;

    #[inline]
    pub fn has_matrix_index(self) -> bool { self.0 & Self::MATRIX_INDEX != 0 }

    #[inline]
    pub fn has_tex_matrix_index(self) -> bool { self.0 & Self::TEX_MATRIX_INDEX != 0 }

    #[inline]
    pub fn has_colour(self) -> bool { self.0 & Self::COLOUR != 0 }

    #[inline]
    pub fn has_texcoord(self, channel: usize) -> bool {
        channel < TEXCOORD_CHANNELS && self.0 & (Self::TEXCOORD0 << channel) != 0
    }

    #[inline]
    pub fn texcoord_count(self) -> usize {
        (0..TEXCOORD_CHANNELS).filter(|&c| self.has_texcoord(c)).count()
    }

    /// Size in bytes of one vertex record in a display list.
    pub fn vertex_size(self) -> usize {
        let mut size = 4; // position + normal
        if self.has_matrix_index() {
            size += 1;
        }
        if self.has_tex_matrix_index() {
            size += 1;
        }
        if self.has_colour() {
            size += 2;
        }
        // Two padding bytes stand in for texcoords when there are none
        size + 2 * self.texcoord_count().max(1)
    }
}

#[binrw]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Mesh {
    pub bone_index: u32,
    pub vcd: Vcd,
    #[bw(try_calc = packets.len().try_into())]
    packet_count: u32,
    #[br(count = packet_count)]
    pub packets: Vec<MeshPacket>,
}

#[binrw]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MeshPacket {
    #[bw(try_calc = indices.len().try_into())]
    index_count: u32,
    /// Vertex matrix slots used by this packet.
    #[br(count = index_count)]
    pub indices: Vec<i16>,
    #[bw(try_calc = display_lists.len().try_into())]
    display_list_count: u32,
    #[br(count = display_list_count)]
    pub display_lists: Vec<DisplayList>,
}

/// GX display list. The data is kept opaque until decoded against the
/// owning mesh's [`Vcd`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DisplayList {
    pub flags: DisplayListFlags,
    pub cmd_count: u32,
    pub data: Vec<u8>,
}

impl BinRead for DisplayList {
    type Args<'a> = ();

    fn read_options<R: Read + Seek>(
        reader: &mut R,
        endian: Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<Self> {
        let flags = DisplayListFlags::read_options(reader, endian, ())?;
        let cmd_count = u32::read_options(reader, endian, ())?;
        let data_len = u32::read_options(reader, endian, ())?;
        // GX FIFO data starts aligned
        align_reader(reader)?;
        let mut data = Vec::new();
        Read::take(&mut *reader, data_len as u64).read_to_end(&mut data)?;
        if data.len() != data_len as usize {
            return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
        }
        Ok(Self { flags, cmd_count, data })
    }
}

impl BinWrite for DisplayList {
    type Args<'a> = ();

    fn write_options<W: Write + Seek>(
        &self,
        writer: &mut W,
        endian: Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<()> {
        let data_len = u32::try_from(self.data.len()).map_err(|_| binrw::Error::AssertFail {
            pos: writer.stream_position().unwrap_or_default(),
            message: format!("Display list too large: {:#x} bytes", self.data.len()),
        })?;
        self.flags.write_options(writer, endian, ())?;
        self.cmd_count.write_options(writer, endian, ())?;
        data_len.write_options(writer, endian, ())?;
        align_writer(writer)?;
        writer.write_all(&self.data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use binrw::{BinReaderExt, BinWriterExt};

    use super::*;
    use crate::util::io::ENDIAN;

    #[test]
    fn vertex_size() {
        assert_eq!(Vcd(0).vertex_size(), 6);
        assert_eq!(Vcd(Vcd::TEXCOORD0).vertex_size(), 6);
        assert_eq!(Vcd(Vcd::TEXCOORD0 | Vcd::TEXCOORD0 << 1).vertex_size(), 8);
        assert_eq!(Vcd(Vcd::MATRIX_INDEX | Vcd::TEX_MATRIX_INDEX | Vcd::COLOUR).vertex_size(), 10);
        assert_eq!(Vcd(0x7F8).texcoord_count(), 8);
    }

    #[test]
    fn display_list_data_is_aligned() {
        let dl = DisplayList {
            flags: DisplayListFlags(0x0000_0002),
            cmd_count: 1,
            data: vec![0x98, 0x00, 0x00],
        };
        let mut w = Cursor::new(Vec::new());
        w.write_type(&dl, ENDIAN).unwrap();
        let data = w.into_inner();
        assert_eq!(data.len(), 0x23);
        assert_eq!(&data[0..12], &[0, 0, 0, 2, 0, 0, 0, 1, 0, 0, 0, 3]);
        assert!(data[12..0x20].iter().all(|&b| b == 0));

        let read: DisplayList = Cursor::new(&data[..]).read_type(ENDIAN).unwrap();
        assert_eq!(read, dl);
    }
}
