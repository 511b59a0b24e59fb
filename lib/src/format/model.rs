use std::io::{Cursor, Read, Seek, Write};

use binrw::{BinReaderExt, BinWriterExt};

use crate::{
    error::{ModError, Result},
    format::{
        bitfield::VertexMatrix,
        chunk::{ChunkDescriptor, ChunkId, CHUNK_DESCRIPTOR_SIZE, TEXCOORD_CHANNELS},
        collision::{CollisionData, CollisionGrid},
        envelope::Envelope,
        header::Header,
        joint::{read_joint_names, write_joint_names, Joint},
        material::MaterialContainer,
        mesh::Mesh,
        texture::{Texture, TextureAttributes},
        vertex::Nbt,
        ColourU8, Vector2f, Vector3f,
    },
    util::io::{align_reader, read_array, write_array, ENDIAN},
};

/// An in-memory MOD container. Each collection maps to one chunk; empty
/// collections are not written.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Model {
    pub header: Header,
    pub vertices: Vec<Vector3f>,
    pub normals: Vec<Vector3f>,
    pub nbt: Vec<Nbt>,
    pub colours: Vec<ColourU8>,
    pub texcoords: [Vec<Vector2f>; TEXCOORD_CHANNELS],
    pub textures: Vec<Texture>,
    pub texture_attributes: Vec<TextureAttributes>,
    pub materials: MaterialContainer,
    pub vertex_matrices: Vec<VertexMatrix>,
    pub envelopes: Vec<Envelope>,
    pub meshes: Vec<Mesh>,
    pub joints: Vec<Joint>,
    /// Raw byte strings, see [`display_name`](crate::format::joint::display_name).
    pub joint_names: Vec<Vec<u8>>,
    pub collision: CollisionData,
    /// Opaque bytes after the end-of-file chunk, kept verbatim.
    pub trailing: Vec<u8>,
}

impl Model {
    /// Reads a container from the current stream position to the end of the stream.
    pub fn read<R>(reader: &mut R) -> Result<Self>
    where R: Read + Seek {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(&data)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut model = Self::default();
        let mut reader = Cursor::new(data);
        while reader.position() < data.len() as u64 {
            let desc = ChunkDescriptor::read(&mut reader)?;
            let end = desc.end();
            if desc.id == ChunkId::EndOfFile {
                log::debug!("Found {} at {:#x}", desc.id, desc.offset);
                model.trailing = data[end as usize..].to_vec();
                return Ok(model);
            }
            model.read_chunk(&desc, &data[..end as usize])?;
            reader.set_position(end);
        }
        log::debug!("Reached end of data without an end-of-file chunk");
        Ok(model)
    }

    /// Decodes one chunk payload. `data` ends where the chunk ends, so a
    /// decoder running past the payload hits end of input.
    fn read_chunk(&mut self, desc: &ChunkDescriptor, data: &[u8]) -> Result<()> {
        let mut reader = Cursor::new(data);
        reader.set_position(desc.offset + CHUNK_DESCRIPTOR_SIZE);
        align_reader(&mut reader)?;
        log::debug!("Reading chunk {} at {:#x}, length {:#x}", desc.id, desc.offset, desc.length);
        let result: Result<()> = match desc.id {
            ChunkId::Header => reader.read_type(ENDIAN).map(|h| self.header = h).map_err(Into::into),
            ChunkId::Vertex => read_array(&mut reader).map(|v| self.vertices = v),
            ChunkId::Normal => read_array(&mut reader).map(|v| self.normals = v),
            ChunkId::Nbt => read_array(&mut reader).map(|v| self.nbt = v),
            ChunkId::Colour => read_array(&mut reader).map(|v| self.colours = v),
            ChunkId::TexCoord(channel) => {
                read_array(&mut reader).map(|v| self.texcoords[channel as usize % TEXCOORD_CHANNELS] = v)
            }
            ChunkId::Texture => read_array(&mut reader).map(|v| self.textures = v),
            ChunkId::TextureAttribute => read_array(&mut reader).map(|v| self.texture_attributes = v),
            ChunkId::Material => MaterialContainer::read(&mut reader).map(|v| self.materials = v),
            ChunkId::VertexMatrix => read_array(&mut reader).map(|v| self.vertex_matrices = v),
            ChunkId::Envelope => read_array(&mut reader).map(|v| self.envelopes = v),
            ChunkId::Mesh => read_array(&mut reader).map(|v| self.meshes = v),
            ChunkId::Joint => read_array(&mut reader).map(|v| self.joints = v),
            ChunkId::JointName => read_joint_names(&mut reader).map(|v| self.joint_names = v),
            ChunkId::CollisionPrism => CollisionData::read_prism(&mut reader).map(|(t, r)| {
                self.collision.triangles = t;
                self.collision.rooms = r;
            }),
            ChunkId::CollisionGrid => reader
                .read_type::<CollisionGrid>(ENDIAN)
                .map(|g| self.collision.grid = Some(g))
                .map_err(Into::into),
            ChunkId::EndOfFile | ChunkId::Unknown(_) => {
                log::debug!("Skipping chunk {} ({:#x} bytes)", desc.id, desc.length);
                Ok(())
            }
        };
        result.map_err(|e| {
            if e.is_eof() {
                ModError::Overrun { tag: desc.id, limit: desc.end() }
            } else {
                e
            }
        })
    }

    /// Writes every populated chunk in canonical order, then the
    /// end-of-file chunk and the trailing bytes. Records whose layout would
    /// not read back are rejected before anything is written.
    pub fn write<W>(&self, w: &mut W) -> Result<()>
    where W: Write + Seek {
        self.materials.check_layout()?;
        if let Some(grid) = &self.collision.grid {
            grid.check_layout()?;
        }
        ChunkDescriptor::write(ChunkId::Header, w, |w| {
            w.write_type(&self.header, ENDIAN)?;
            Ok(())
        })?;
        write_array_chunk(w, ChunkId::Vertex, &self.vertices)?;
        write_array_chunk(w, ChunkId::Colour, &self.colours)?;
        write_array_chunk(w, ChunkId::Normal, &self.normals)?;
        if self.header.use_nbt() {
            write_array_chunk(w, ChunkId::Nbt, &self.nbt)?;
        } else if !self.nbt.is_empty() {
            log::warn!("Dropping {} NBT entries: header flag USE_NBT is not set", self.nbt.len());
        }
        for (channel, texcoords) in self.texcoords.iter().enumerate() {
            write_array_chunk(w, ChunkId::TexCoord(channel as u8), texcoords)?;
        }
        write_array_chunk(w, ChunkId::Texture, &self.textures)?;
        write_array_chunk(w, ChunkId::TextureAttribute, &self.texture_attributes)?;
        if !self.materials.is_empty() {
            ChunkDescriptor::write(ChunkId::Material, w, |w| self.materials.write(w))?;
        }
        write_array_chunk(w, ChunkId::Envelope, &self.envelopes)?;
        write_array_chunk(w, ChunkId::VertexMatrix, &self.vertex_matrices)?;
        write_array_chunk(w, ChunkId::Mesh, &self.meshes)?;
        write_array_chunk(w, ChunkId::Joint, &self.joints)?;
        if !self.joint_names.is_empty() {
            ChunkDescriptor::write(ChunkId::JointName, w, |w| write_joint_names(w, &self.joint_names))?;
        }
        if !self.collision.triangles.is_empty() || !self.collision.rooms.is_empty() {
            ChunkDescriptor::write(ChunkId::CollisionPrism, w, |w| self.collision.write_prism(w))?;
        }
        if let Some(grid) = &self.collision.grid {
            ChunkDescriptor::write(ChunkId::CollisionGrid, w, |w| {
                w.write_type(grid, ENDIAN)?;
                Ok(())
            })?;
        }
        ChunkDescriptor::write(ChunkId::EndOfFile, w, |_| Ok(()))?;
        w.write_all(&self.trailing)?;
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut w = Cursor::new(Vec::new());
        self.write(&mut w)?;
        Ok(w.into_inner())
    }

    /// Empties the collection stored in chunk `id`.
    pub fn clear_chunk(&mut self, id: ChunkId) -> Result<()> {
        match id {
            ChunkId::Vertex => self.vertices.clear(),
            ChunkId::Normal => self.normals.clear(),
            ChunkId::Nbt => self.nbt.clear(),
            ChunkId::Colour => self.colours.clear(),
            ChunkId::TexCoord(channel) => {
                self.texcoords.get_mut(channel as usize).ok_or(ModError::UnsupportedChunk(id))?.clear()
            }
            ChunkId::Texture => self.textures.clear(),
            ChunkId::TextureAttribute => self.texture_attributes.clear(),
            ChunkId::Material => self.materials = MaterialContainer::default(),
            ChunkId::VertexMatrix => self.vertex_matrices.clear(),
            ChunkId::Envelope => self.envelopes.clear(),
            ChunkId::Mesh => self.meshes.clear(),
            ChunkId::Joint => self.joints.clear(),
            ChunkId::JointName => self.joint_names.clear(),
            ChunkId::CollisionPrism => {
                self.collision.triangles.clear();
                self.collision.rooms.clear();
            }
            ChunkId::CollisionGrid => self.collision.grid = None,
            ChunkId::EndOfFile => self.trailing.clear(),
            ChunkId::Header | ChunkId::Unknown(_) => return Err(ModError::UnsupportedChunk(id)),
        }
        log::debug!("Cleared {id}");
        Ok(())
    }

    /// Number of records stored for chunk `id`, or `None` for chunks that
    /// do not hold a collection.
    pub fn element_count(&self, id: ChunkId) -> Option<usize> {
        Some(match id {
            ChunkId::Vertex => self.vertices.len(),
            ChunkId::Normal => self.normals.len(),
            ChunkId::Nbt => self.nbt.len(),
            ChunkId::Colour => self.colours.len(),
            ChunkId::TexCoord(channel) => self.texcoords.get(channel as usize)?.len(),
            ChunkId::Texture => self.textures.len(),
            ChunkId::TextureAttribute => self.texture_attributes.len(),
            ChunkId::Material => self.materials.materials.len(),
            ChunkId::VertexMatrix => self.vertex_matrices.len(),
            ChunkId::Envelope => self.envelopes.len(),
            ChunkId::Mesh => self.meshes.len(),
            ChunkId::Joint => self.joints.len(),
            ChunkId::JointName => self.joint_names.len(),
            ChunkId::CollisionPrism => self.collision.triangles.len(),
            ChunkId::CollisionGrid => self.collision.grid.as_ref().map_or(0, |g| g.groups.len()),
            ChunkId::EndOfFile => self.trailing.len(),
            ChunkId::Header | ChunkId::Unknown(_) => return None,
        })
    }
}

fn write_array_chunk<T, W>(w: &mut W, id: ChunkId, items: &[T]) -> Result<()>
where
    T: for<'a> binrw::BinWrite<Args<'a> = ()>,
    W: Write + Seek,
{
    if items.is_empty() {
        return Ok(());
    }
    ChunkDescriptor::write(id, w, |w| write_array(w, items))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_model_writes_header_and_terminator() {
        let data = Model::default().to_bytes().unwrap();
        // header chunk: 0x20 descriptor + padding, 8 byte payload padded to 0x20
        assert_eq!(data.len(), 0x40 + 0x20);
        assert_eq!(&data[0x40..0x48], &[0, 0, 0xFF, 0xFF, 0, 0, 0, 0x18]);
        assert_eq!(Model::from_bytes(&data).unwrap(), Model::default());
    }

    #[test]
    fn clear_chunk_rejects_header() {
        let mut model = Model::default();
        assert!(matches!(
            model.clear_chunk(ChunkId::Header),
            Err(ModError::UnsupportedChunk(ChunkId::Header))
        ));
        assert!(matches!(
            model.clear_chunk(ChunkId::Unknown(5)),
            Err(ModError::UnsupportedChunk(ChunkId::Unknown(5)))
        ));
    }

    #[test]
    fn clear_texcoord_channel_individually() {
        let mut model = Model::default();
        model.texcoords[1].push(Vector2f { x: 1.0, y: 0.0 });
        model.texcoords[2].push(Vector2f { x: 0.0, y: 1.0 });
        model.clear_chunk(ChunkId::TexCoord(1)).unwrap();
        assert!(model.texcoords[1].is_empty());
        assert_eq!(model.element_count(ChunkId::TexCoord(2)), Some(1));
    }
}
