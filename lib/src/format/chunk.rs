use std::{
    fmt::{Display, Formatter},
    io::{Cursor, Seek, Write},
};

use binrw::{BinReaderExt, BinWriterExt};

use crate::{
    error::{ModError, Result},
    util::io::{align_writer, at_position, ENDIAN},
};

/// Number of texture coordinate channels a model can carry.
pub const TEXCOORD_CHANNELS: usize = 8;

const K_CHUNK_HEADER: u32 = 0x0000;
const K_CHUNK_VERTEX: u32 = 0x0010;
const K_CHUNK_NORMAL: u32 = 0x0011;
const K_CHUNK_NBT: u32 = 0x0012;
const K_CHUNK_COLOUR: u32 = 0x0013;
const K_CHUNK_TEXCOORD0: u32 = 0x0018;
const K_CHUNK_TEXCOORD7: u32 = 0x001F;
const K_CHUNK_TEXTURE: u32 = 0x0020;
const K_CHUNK_TEXTURE_ATTRIBUTE: u32 = 0x0022;
const K_CHUNK_MATERIAL: u32 = 0x0030;
const K_CHUNK_VERTEX_MATRIX: u32 = 0x0040;
const K_CHUNK_ENVELOPE: u32 = 0x0041;
const K_CHUNK_MESH: u32 = 0x0050;
const K_CHUNK_JOINT: u32 = 0x0060;
const K_CHUNK_JOINT_NAME: u32 = 0x0061;
const K_CHUNK_COLLISION_PRISM: u32 = 0x0100;
const K_CHUNK_COLLISION_GRID: u32 = 0x0110;
const K_CHUNK_EOF: u32 = 0xFFFF;

/// Size of the `(tag, length)` pair in front of every chunk payload.
pub const CHUNK_DESCRIPTOR_SIZE: u64 = 8;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ChunkId {
    Header,
    Vertex,
    Normal,
    Nbt,
    Colour,
    TexCoord(u8),
    Texture,
    TextureAttribute,
    Material,
    VertexMatrix,
    Envelope,
    Mesh,
    Joint,
    JointName,
    CollisionPrism,
    CollisionGrid,
    EndOfFile,
    Unknown(u32),
}

impl ChunkId {
    /// Every chunk type the container codec understands, in write order.
    pub const KNOWN: [ChunkId; 24] = [
        ChunkId::Header,
        ChunkId::Vertex,
        ChunkId::Colour,
        ChunkId::Normal,
        ChunkId::Nbt,
        ChunkId::TexCoord(0),
        ChunkId::TexCoord(1),
        ChunkId::TexCoord(2),
        ChunkId::TexCoord(3),
        ChunkId::TexCoord(4),
        ChunkId::TexCoord(5),
        ChunkId::TexCoord(6),
        ChunkId::TexCoord(7),
        ChunkId::Texture,
        ChunkId::TextureAttribute,
        ChunkId::Material,
        ChunkId::Envelope,
        ChunkId::VertexMatrix,
        ChunkId::Mesh,
        ChunkId::Joint,
        ChunkId::JointName,
        ChunkId::CollisionPrism,
        ChunkId::CollisionGrid,
        ChunkId::EndOfFile,
    ];

    pub fn from_u32(value: u32) -> Self {
        match value {
            K_CHUNK_HEADER => Self::Header,
            K_CHUNK_VERTEX => Self::Vertex,
            K_CHUNK_NORMAL => Self::Normal,
            K_CHUNK_NBT => Self::Nbt,
            K_CHUNK_COLOUR => Self::Colour,
            K_CHUNK_TEXCOORD0..=K_CHUNK_TEXCOORD7 => Self::TexCoord((value - K_CHUNK_TEXCOORD0) as u8),
            K_CHUNK_TEXTURE => Self::Texture,
            K_CHUNK_TEXTURE_ATTRIBUTE => Self::TextureAttribute,
            K_CHUNK_MATERIAL => Self::Material,
            K_CHUNK_VERTEX_MATRIX => Self::VertexMatrix,
            K_CHUNK_ENVELOPE => Self::Envelope,
            K_CHUNK_MESH => Self::Mesh,
            K_CHUNK_JOINT => Self::Joint,
            K_CHUNK_JOINT_NAME => Self::JointName,
            K_CHUNK_COLLISION_PRISM => Self::CollisionPrism,
            K_CHUNK_COLLISION_GRID => Self::CollisionGrid,
            K_CHUNK_EOF => Self::EndOfFile,
            other => Self::Unknown(other),
        }
    }

    pub fn as_u32(self) -> u32 {
        match self {
            Self::Header => K_CHUNK_HEADER,
            Self::Vertex => K_CHUNK_VERTEX,
            Self::Normal => K_CHUNK_NORMAL,
            Self::Nbt => K_CHUNK_NBT,
            Self::Colour => K_CHUNK_COLOUR,
            Self::TexCoord(channel) => K_CHUNK_TEXCOORD0 + (channel as u32 & 7),
            Self::Texture => K_CHUNK_TEXTURE,
            Self::TextureAttribute => K_CHUNK_TEXTURE_ATTRIBUTE,
            Self::Material => K_CHUNK_MATERIAL,
            Self::VertexMatrix => K_CHUNK_VERTEX_MATRIX,
            Self::Envelope => K_CHUNK_ENVELOPE,
            Self::Mesh => K_CHUNK_MESH,
            Self::Joint => K_CHUNK_JOINT,
            Self::JointName => K_CHUNK_JOINT_NAME,
            Self::CollisionPrism => K_CHUNK_COLLISION_PRISM,
            Self::CollisionGrid => K_CHUNK_COLLISION_GRID,
            Self::EndOfFile => K_CHUNK_EOF,
            Self::Unknown(value) => value,
        }
    }

    pub fn name(self) -> &'static str { chunk_id_to_name(self.as_u32()) }

    /// Looks up a chunk by its diagnostic name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::KNOWN.into_iter().find(|id| id.name().eq_ignore_ascii_case(name))
    }
}

impl Display for ChunkId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({:#06X})", self.name(), self.as_u32())
    }
}

/// Diagnostic name for a raw chunk tag.
pub fn chunk_id_to_name(id: u32) -> &'static str {
    match id {
        K_CHUNK_HEADER => "HEADER",
        K_CHUNK_VERTEX => "VERTEX",
        K_CHUNK_NORMAL => "VERTEX_NORMAL",
        K_CHUNK_NBT => "VERTEX_NBT",
        K_CHUNK_COLOUR => "VERTEX_COLOUR",
        0x0018 => "TEXCOORD0",
        0x0019 => "TEXCOORD1",
        0x001A => "TEXCOORD2",
        0x001B => "TEXCOORD3",
        0x001C => "TEXCOORD4",
        0x001D => "TEXCOORD5",
        0x001E => "TEXCOORD6",
        0x001F => "TEXCOORD7",
        K_CHUNK_TEXTURE => "TEXTURE",
        K_CHUNK_TEXTURE_ATTRIBUTE => "TEXTURE_ATTRIBUTE",
        K_CHUNK_MATERIAL => "MATERIAL",
        K_CHUNK_VERTEX_MATRIX => "VERTEX_MATRIX",
        K_CHUNK_ENVELOPE => "MATRIX_ENVELOPE",
        K_CHUNK_MESH => "MESH",
        K_CHUNK_JOINT => "JOINT",
        K_CHUNK_JOINT_NAME => "JOINT_NAME",
        K_CHUNK_COLLISION_PRISM => "COLLISION_PRISM",
        K_CHUNK_COLLISION_GRID => "COLLISION_GRID",
        K_CHUNK_EOF => "END_OF_FILE",
        _ => "UNKNOWN",
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ChunkDescriptor {
    pub id: ChunkId,
    /// Byte count following the length field.
    pub length: u32,
    /// File offset of the tag.
    pub offset: u64,
}

impl ChunkDescriptor {
    /// Reads the `(tag, length)` pair at the cursor position and validates
    /// framing: the chunk must start aligned and its payload must fit.
    pub fn read(reader: &mut Cursor<&[u8]>) -> Result<Self> {
        let offset = reader.position();
        let available = reader.get_ref().len() as u64 - offset;
        if available < CHUNK_DESCRIPTOR_SIZE {
            return Err(ModError::TruncatedInput {
                offset,
                needed: CHUNK_DESCRIPTOR_SIZE,
                available,
            });
        }
        let id = ChunkId::from_u32(reader.read_type(ENDIAN)?);
        let length: u32 = reader.read_type(ENDIAN)?;
        if !crate::util::io::is_aligned(offset) {
            return Err(ModError::Framing { offset, tag: id });
        }
        let available = available - CHUNK_DESCRIPTOR_SIZE;
        if length as u64 > available {
            return Err(ModError::TruncatedInput {
                offset: offset + CHUNK_DESCRIPTOR_SIZE,
                needed: length as u64,
                available,
            });
        }
        Ok(Self { id, length, offset })
    }

    /// Offset of the first byte after the payload.
    #[inline]
    pub fn end(&self) -> u64 { self.offset + CHUNK_DESCRIPTOR_SIZE + self.length as u64 }

    /// Writes a chunk: tag, length placeholder, aligned payload from `cb`,
    /// then patches the length once the payload size is known.
    pub fn write<W, CB>(id: ChunkId, w: &mut W, cb: CB) -> Result<Self>
    where
        W: Write + Seek,
        CB: FnOnce(&mut W) -> Result<()>,
    {
        let offset = w.stream_position()?;
        w.write_type(&id.as_u32(), ENDIAN)?;
        let length_pos = w.stream_position()?;
        w.write_type(&0u32, ENDIAN)?;
        align_writer(w)?;

        cb(w)?;
        let end_pos = align_writer(w)?;

        // Return to the length field and patch it
        let length = u32::try_from(end_pos - length_pos - 4)
            .map_err(|_| ModError::Invalid(format!("Chunk {id} is too large")))?;
        at_position(w, length_pos, |w| {
            w.write_type(&length, ENDIAN)?;
            Ok(())
        })?;
        log::debug!("Wrote chunk {id} at {offset:#x}, length {length:#x}");
        Ok(Self { id, length, offset })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_mapping_round_trips() {
        for id in ChunkId::KNOWN {
            assert_eq!(ChunkId::from_u32(id.as_u32()), id);
        }
        assert_eq!(ChunkId::from_u32(0x1A), ChunkId::TexCoord(2));
        assert_eq!(ChunkId::from_u32(0x1234), ChunkId::Unknown(0x1234));
        assert_eq!(ChunkId::Unknown(0x1234).as_u32(), 0x1234);
    }

    #[test]
    fn names() {
        assert_eq!(chunk_id_to_name(0x10), "VERTEX");
        assert_eq!(chunk_id_to_name(0x1F), "TEXCOORD7");
        assert_eq!(chunk_id_to_name(0xFFFF), "END_OF_FILE");
        assert_eq!(chunk_id_to_name(0x9999), "UNKNOWN");
        assert_eq!(ChunkId::from_name("joint_name"), Some(ChunkId::JointName));
        assert_eq!(ChunkId::from_name("nope"), None);
    }

    #[test]
    fn write_patches_length() {
        let mut w = Cursor::new(Vec::new());
        let desc = ChunkDescriptor::write(ChunkId::Vertex, &mut w, |w| {
            w.write_all(&[1, 2, 3])?;
            Ok(())
        })
        .unwrap();
        let data = w.into_inner();
        assert_eq!(data.len(), 0x40);
        assert_eq!(desc.length, 0x38);
        assert_eq!(&data[0..8], &[0, 0, 0, 0x10, 0, 0, 0, 0x38]);
        assert_eq!(&data[0x20..0x23], &[1, 2, 3]);
        assert_eq!(desc.end(), 0x40);
    }

    #[test]
    fn read_rejects_misaligned_chunk() {
        let data = [0u8; 0x40];
        let mut reader = Cursor::new(&data[..]);
        reader.set_position(4);
        assert!(matches!(
            ChunkDescriptor::read(&mut reader),
            Err(ModError::Framing { offset: 4, tag: ChunkId::Header })
        ));
    }

    #[test]
    fn read_rejects_oversized_length() {
        let mut data = vec![0u8; 0x20];
        data[3] = 0x10;
        data[6] = 0x01;
        let mut reader = Cursor::new(&data[..]);
        assert!(matches!(
            ChunkDescriptor::read(&mut reader),
            Err(ModError::TruncatedInput { offset: 8, needed: 0x100, available: 0x18 })
        ));
    }
}
