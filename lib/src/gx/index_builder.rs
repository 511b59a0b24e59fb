use std::collections::HashMap;

use crate::gx::display_list::{FaceBatch, Vertex};

/// Triangle list with a deduplicated vertex table.
///
/// Two vertices are merged only when every attribute index matches,
/// including all texcoord slots. Vertices keep the order they were first
/// seen in.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct IndexedMesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl IndexedMesh {
    pub fn from_batches<'a, I>(batches: I) -> Self
    where I: IntoIterator<Item = &'a FaceBatch> {
        let mut builder = IndexBuilder::default();
        for batch in batches {
            for tri in batch.triangles() {
                for vertex in tri {
                    builder.push(vertex);
                }
            }
        }
        builder.finish()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize { self.indices.len() / 3 }

    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|c| [c[0], c[1], c[2]])
    }
}

#[derive(Default)]
struct IndexBuilder {
    lookup: HashMap<Vertex, u32>,
    mesh: IndexedMesh,
}

impl IndexBuilder {
    fn push(&mut self, vertex: Vertex) {
        let next = self.mesh.vertices.len() as u32;
        let index = *self.lookup.entry(vertex).or_insert_with(|| {
            self.mesh.vertices.push(vertex);
            next
        });
        self.mesh.indices.push(index);
    }

    fn finish(self) -> IndexedMesh { self.mesh }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gx::display_list::PrimitiveType;

    fn vtx(position: u16) -> Vertex { Vertex { position, ..Default::default() } }

    #[test]
    fn dedups_shared_vertices() {
        let strip = FaceBatch {
            primitive: PrimitiveType::TriangleStrip,
            vertices: vec![vtx(0), vtx(1), vtx(2), vtx(3)],
        };
        let mesh = IndexedMesh::from_batches([&strip]);
        assert_eq!(mesh.vertices, vec![vtx(0), vtx(1), vtx(2), vtx(3)]);
        assert_eq!(mesh.indices, vec![0, 1, 2, 2, 1, 3]);
        assert_eq!(mesh.triangle_count(), 2);
    }

    #[test]
    fn texcoords_take_part_in_equality() {
        let mut a = vtx(0);
        a.texcoords[7] = Some(1);
        let list = FaceBatch {
            primitive: PrimitiveType::Triangles,
            vertices: vec![vtx(0), a, vtx(0)],
        };
        let mesh = IndexedMesh::from_batches(&[list]);
        assert_eq!(mesh.vertices.len(), 2);
        assert_eq!(mesh.triangles().collect::<Vec<_>>(), vec![[0, 1, 0]]);
    }
}
