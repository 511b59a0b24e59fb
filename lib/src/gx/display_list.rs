//! GX display list parsing.
//!
//! A display list is a sequence of primitive commands. Each command is a
//! one-byte opcode, a `u16` vertex count, then that many vertex records
//! whose layout is given by the mesh's [`Vcd`]:
//!
//! ```text
//! u8   matrix index          (VCD bit 0)
//! u8   texture matrix index  (VCD bit 1)
//! u16  position index
//! u16  normal index
//! u16  colour index          (VCD bit 2)
//! u16  texcoord index        (one per VCD bit 3..=10)
//! ```
//!
//! With no texcoord bits set, every vertex carries two padding bytes in
//! place of the texcoords. Any opcode other than the two triangle
//! primitives (usually the `0x00` NOP padding that fills the list up to its
//! aligned size) ends the list.

use strum::IntoStaticStr;

use crate::{
    error::{ModError, Result},
    format::{chunk::TEXCOORD_CHANNELS, mesh::Vcd},
};

pub const GX_TRIANGLE_STRIP: u8 = 0x98;
pub const GX_TRIANGLES: u8 = 0xA0;

#[derive(Copy, Clone, Debug, Eq, PartialEq, IntoStaticStr)]
pub enum PrimitiveType {
    TriangleStrip,
    Triangles,
}

impl PrimitiveType {
    pub fn from_opcode(opcode: u8) -> Option<Self> {
        match opcode {
            GX_TRIANGLE_STRIP => Some(Self::TriangleStrip),
            GX_TRIANGLES => Some(Self::Triangles),
            _ => None,
        }
    }
}

/// Raw attribute indices of one display list vertex.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Vertex {
    pub matrix_index: Option<u8>,
    pub tex_matrix_index: Option<u8>,
    pub position: u16,
    pub normal: u16,
    pub colour: Option<u16>,
    pub texcoords: [Option<u16>; TEXCOORD_CHANNELS],
}

pub type Triangle = [Vertex; 3];

/// One primitive command with its vertices.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FaceBatch {
    pub primitive: PrimitiveType,
    pub vertices: Vec<Vertex>,
}

impl FaceBatch {
    pub fn triangles(&self) -> Vec<Triangle> {
        match self.primitive {
            PrimitiveType::TriangleStrip => strip_to_triangles(&self.vertices),
            PrimitiveType::Triangles => list_to_triangles(&self.vertices),
        }
    }
}

/// Converts a triangle strip into a triangle list, flipping every odd
/// triangle so all faces keep the winding of the first.
///
/// ```text
///  0---2---4
///   \ / \ / \
///    1---3---5
/// ```
pub fn strip_to_triangles<T: Copy>(vertices: &[T]) -> Vec<[T; 3]> {
    let count = vertices.len().saturating_sub(2);
    let mut out = Vec::with_capacity(count);
    for i in 0..count {
        let tri = if i % 2 == 0 {
            [vertices[i], vertices[i + 1], vertices[i + 2]]
        } else {
            [vertices[i + 1], vertices[i], vertices[i + 2]]
        };
        out.push(tri);
    }
    out
}

/// Groups a triangle list into triangles. Leftover vertices are dropped.
pub fn list_to_triangles<T: Copy>(vertices: &[T]) -> Vec<[T; 3]> {
    let chunks = vertices.chunks_exact(3);
    if !chunks.remainder().is_empty() {
        log::warn!(
            "Triangle list of {} vertices left {} over, ignoring them",
            vertices.len(),
            chunks.remainder().len()
        );
    }
    chunks.map(|c| [c[0], c[1], c[2]]).collect()
}

/// Lazy display list parser. Yields one [`FaceBatch`] per primitive
/// command and stops at the first byte that is not a primitive opcode.
pub struct DisplayListReader<'a> {
    data: &'a [u8],
    pos: usize,
    vcd: Vcd,
    done: bool,
}

impl<'a> DisplayListReader<'a> {
    pub fn new(data: &'a [u8], vcd: Vcd) -> Self { Self { data, pos: 0, vcd, done: false } }

    /// Offset of the next unread byte. After the last batch this points
    /// at the terminating opcode.
    #[inline]
    pub fn position(&self) -> usize { self.pos }

    /// Restarts parsing from the beginning of the list.
    pub fn rewind(&mut self) {
        self.pos = 0;
        self.done = false;
    }

    pub fn parse_next(&mut self) -> Result<Option<FaceBatch>> {
        let Some(&opcode) = self.data.get(self.pos) else {
            return Ok(None);
        };
        let Some(primitive) = PrimitiveType::from_opcode(opcode) else {
            log::trace!("Display list ends with opcode {opcode:#04x} at {:#x}", self.pos);
            return Ok(None);
        };
        self.pos += 1;
        let count = self.read_u16()?;
        let mut vertices = Vec::with_capacity(count as usize);
        for _ in 0..count {
            vertices.push(self.read_vertex()?);
        }
        Ok(Some(FaceBatch { primitive, vertices }))
    }

    fn read_vertex(&mut self) -> Result<Vertex> {
        let vcd = self.vcd;
        let mut vertex = Vertex::default();
        if vcd.has_matrix_index() {
            vertex.matrix_index = Some(self.read_u8()?);
        }
        if vcd.has_tex_matrix_index() {
            vertex.tex_matrix_index = Some(self.read_u8()?);
        }
        vertex.position = self.read_u16()?;
        vertex.normal = self.read_u16()?;
        if vcd.has_colour() {
            vertex.colour = Some(self.read_u16()?);
        }
        if vcd.texcoord_count() == 0 {
            self.take(2)?;
        } else {
            for (channel, slot) in vertex.texcoords.iter_mut().enumerate() {
                if vcd.has_texcoord(channel) {
                    *slot = Some(self.read_u16()?);
                }
            }
        }
        Ok(vertex)
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let available = self.data.len() - self.pos;
        if available < len {
            return Err(ModError::TruncatedInput {
                offset: self.pos as u64,
                needed: len as u64,
                available: available as u64,
            });
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    #[inline]
    fn read_u8(&mut self) -> Result<u8> { Ok(self.take(1)?[0]) }

    #[inline]
    fn read_u16(&mut self) -> Result<u16> {
        let bytes = self.take(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }
}

impl Iterator for DisplayListReader<'_> {
    type Item = Result<FaceBatch>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let result = self.parse_next().transpose();
        if !matches!(result, Some(Ok(_))) {
            self.done = true;
        }
        result
    }
}

/// Decodes every batch in `data`.
pub fn decode(data: &[u8], vcd: Vcd) -> Result<Vec<FaceBatch>> {
    DisplayListReader::new(data, vcd).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vtx(position: u16) -> Vertex { Vertex { position, normal: position, ..Default::default() } }

    #[test]
    fn strip_winding() {
        let tris = strip_to_triangles(&[0, 1, 2, 3, 4]);
        assert_eq!(tris, vec![[0, 1, 2], [2, 1, 3], [2, 3, 4]]);
        assert!(strip_to_triangles(&[0, 1]).is_empty());
        assert!(strip_to_triangles::<u32>(&[]).is_empty());
    }

    #[test]
    fn list_drops_leftovers() {
        assert_eq!(list_to_triangles(&[0, 1, 2, 3, 4, 5, 6]), vec![[0, 1, 2], [3, 4, 5]]);
    }

    #[test]
    fn no_texcoords_consumes_padding() {
        // strip of 3, position/normal pairs followed by two padding bytes
        let data = [
            0x98, 0x00, 0x03, //
            0x00, 0x00, 0x00, 0x00, 0xEE, 0xEE, //
            0x00, 0x01, 0x00, 0x01, 0xEE, 0xEE, //
            0x00, 0x02, 0x00, 0x02, 0xEE, 0xEE, //
            0x00, 0x00, 0x00,
        ];
        let mut reader = DisplayListReader::new(&data, Vcd(0));
        let batch = reader.parse_next().unwrap().unwrap();
        assert_eq!(batch.primitive, PrimitiveType::TriangleStrip);
        assert_eq!(batch.vertices, vec![vtx(0), vtx(1), vtx(2)]);
        assert_eq!(reader.position(), 21);
        assert!(reader.parse_next().unwrap().is_none());
        assert_eq!(reader.position(), 21);
    }

    #[test]
    fn full_vertex_layout() {
        let vcd = Vcd(Vcd::MATRIX_INDEX | Vcd::TEX_MATRIX_INDEX | Vcd::COLOUR | Vcd::TEXCOORD0 << 2);
        let data = [
            0xA0, 0x00, 0x01, //
            0x03, 0x1E, 0x00, 0x10, 0x00, 0x11, 0x00, 0x12, 0x00, 0x13,
        ];
        let batches = decode(&data, vcd).unwrap();
        assert_eq!(batches.len(), 1);
        let v = batches[0].vertices[0];
        assert_eq!(v.matrix_index, Some(3));
        assert_eq!(v.tex_matrix_index, Some(0x1E));
        assert_eq!((v.position, v.normal, v.colour), (0x10, 0x11, Some(0x12)));
        assert_eq!(v.texcoords[2], Some(0x13));
        assert_eq!(v.texcoords.iter().flatten().count(), 1);
    }

    #[test]
    fn stops_on_unknown_opcode() {
        let data = [0x90, 0x00, 0x03];
        let mut reader = DisplayListReader::new(&data, Vcd(0));
        assert!(reader.parse_next().unwrap().is_none());
        assert_eq!(reader.position(), 0);
        assert_eq!(reader.count(), 0);
    }

    #[test]
    fn rewind_restarts_parsing() {
        let mut data = vec![];
        for (opcode, first) in [(0x98u8, 0u8), (0xA0, 3)] {
            data.extend([opcode, 0x00, 0x03]);
            for i in first..first + 3 {
                data.extend([0, i, 0, i, 0, i]);
            }
        }
        data.push(0x00);
        let vcd = Vcd(Vcd::TEXCOORD0);
        let mut reader = DisplayListReader::new(&data, vcd);
        let first: Vec<_> = reader.by_ref().collect::<Result<_>>().unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(reader.position(), 42);
        assert!(reader.next().is_none());

        reader.rewind();
        assert_eq!(reader.position(), 0);
        let second: Vec<_> = reader.by_ref().collect::<Result<_>>().unwrap();
        assert_eq!(second, first);
        assert_eq!(reader.position(), 42);
    }

    #[test]
    fn rewind_after_error() {
        let data = [0xA0, 0x00, 0x03, 0x00, 0x01, 0x00];
        let mut reader = DisplayListReader::new(&data, Vcd(0));
        assert!(matches!(reader.next(), Some(Err(_))));
        assert!(reader.next().is_none());
        reader.rewind();
        assert!(matches!(reader.next(), Some(Err(ModError::TruncatedInput { offset: 5, .. }))));
    }

    #[test]
    fn truncated_vertex() {
        let data = [0xA0, 0x00, 0x03, 0x00, 0x01, 0x00];
        let err = decode(&data, Vcd(0)).unwrap_err();
        assert!(matches!(err, ModError::TruncatedInput { offset: 5, needed: 2, available: 1 }));

        let mut reader = DisplayListReader::new(&data, Vcd(0));
        assert!(matches!(reader.next(), Some(Err(_))));
        assert!(reader.next().is_none());
    }
}
