pub mod display_list;
pub mod index_builder;

pub use display_list::{decode, DisplayListReader, FaceBatch, PrimitiveType, Triangle, Vertex};
pub use index_builder::IndexedMesh;

use crate::{
    error::Result,
    format::mesh::{DisplayList, Mesh},
};

impl DisplayList {
    pub fn decode(&self, vcd: crate::format::mesh::Vcd) -> Result<Vec<FaceBatch>> {
        decode(&self.data, vcd)
    }
}

impl Mesh {
    /// Decodes every display list of the mesh and indexes the result.
    pub fn triangulate(&self) -> Result<IndexedMesh> {
        let mut batches = Vec::new();
        for (packet_idx, packet) in self.packets.iter().enumerate() {
            for dl in &packet.display_lists {
                let decoded = dl.decode(self.vcd)?;
                log::trace!("Packet {packet_idx}: {} batches", decoded.len());
                batches.extend(decoded);
            }
        }
        Ok(IndexedMesh::from_batches(&batches))
    }
}
