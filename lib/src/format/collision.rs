use std::io::{Cursor, Seek, Write};

use binrw::{binrw, BinReaderExt, BinWriterExt};
use serde_derive::{Deserialize, Serialize};

use crate::{
    error::{ModError, Result},
    format::{bitfield::MapCode, BoundBox, Plane},
    util::io::{align_reader, align_writer, count_u32, ENDIAN},
};

#[binrw]
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CollisionTriangle {
    pub map_code: MapCode,
    pub vertex_indices: [u32; 3],
    /// Adjacent triangle across each edge, or -1.
    pub edge_neighbours: [i16; 3],
    pub unknown: i16,
    pub plane: Plane,
}

#[binrw]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct RoomInfo {
    pub index: u32,
}

/// Spatial acceleration grid over the collision triangles.
#[binrw]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CollisionGrid {
    pub bounds: BoundBox,
    pub cell_size: f32,
    pub width: u32,
    pub height: u32,
    #[bw(try_calc = groups.len().try_into())]
    group_count: u32,
    #[br(count = group_count)]
    pub groups: Vec<CollisionGroup>,
    /// Group index per cell in row-major order, or -1 for an empty cell.
    #[br(count = width as usize * height as usize)]
    pub cells: Vec<i32>,
}

#[binrw]
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct CollisionGroup {
    #[bw(try_calc = room_flags.len().try_into())]
    room_count: u16,
    #[bw(try_calc = triangles.len().try_into())]
    triangle_count: u16,
    #[br(count = triangle_count)]
    pub triangles: Vec<u32>,
    #[br(count = room_count)]
    pub room_flags: Vec<u8>,
}

impl CollisionGrid {
    /// Group index for the cell at `(x, y)`, if the cell is populated.
    pub fn group_at(&self, x: u32, y: u32) -> Option<&CollisionGroup> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let cell = *self.cells.get((y * self.width + x) as usize)?;
        usize::try_from(cell).ok().and_then(|idx| self.groups.get(idx))
    }

    /// The cell table must hold exactly `width * height` entries.
    pub fn check_layout(&self) -> Result<()> {
        let cell_count = self.width as usize * self.height as usize;
        if self.cells.len() != cell_count {
            return Err(ModError::Invalid(format!(
                "Collision grid has {} cells, expected {}x{}",
                self.cells.len(),
                self.width,
                self.height
            )));
        }
        Ok(())
    }

    fn validate(&self, triangle_count: usize) -> Result<()> {
        self.check_layout()?;
        if let Some(cell) = self.cells.iter().find(|&&c| c < -1 || c >= self.groups.len() as i32) {
            return Err(ModError::Invalid(format!("Collision grid cell references group {cell}")));
        }
        for group in &self.groups {
            if let Some(tri) = group.triangles.iter().find(|&&t| t as usize >= triangle_count) {
                return Err(ModError::Invalid(format!(
                    "Collision group references triangle {tri} of {triangle_count}"
                )));
            }
        }
        Ok(())
    }
}

/// Everything carried by the two collision chunks.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CollisionData {
    pub triangles: Vec<CollisionTriangle>,
    pub rooms: Vec<RoomInfo>,
    #[serde(default)]
    pub grid: Option<CollisionGrid>,
}

impl CollisionData {
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty() && self.rooms.is_empty() && self.grid.is_none()
    }

    /// Reads the triangle chunk body: both counts, then rooms, then triangles.
    pub fn read_prism(reader: &mut Cursor<&[u8]>) -> Result<(Vec<CollisionTriangle>, Vec<RoomInfo>)> {
        let triangle_count: u32 = reader.read_type(ENDIAN)?;
        let room_count: u32 = reader.read_type(ENDIAN)?;
        align_reader(reader)?;
        let mut rooms = Vec::new();
        for _ in 0..room_count {
            rooms.push(reader.read_type(ENDIAN)?);
        }
        align_reader(reader)?;
        let mut triangles = Vec::new();
        for _ in 0..triangle_count {
            triangles.push(reader.read_type(ENDIAN)?);
        }
        Ok((triangles, rooms))
    }

    pub fn write_prism<W>(&self, w: &mut W) -> Result<()>
    where W: Write + Seek {
        w.write_type(&count_u32(self.triangles.len())?, ENDIAN)?;
        w.write_type(&count_u32(self.rooms.len())?, ENDIAN)?;
        align_writer(w)?;
        for room in &self.rooms {
            w.write_type(room, ENDIAN)?;
        }
        align_writer(w)?;
        for triangle in &self.triangles {
            w.write_type(triangle, ENDIAN)?;
        }
        Ok(())
    }

    /// Checks internal references before the data is accepted from text.
    pub fn validate(&self) -> Result<()> {
        if let Some(grid) = &self.grid {
            grid.validate(self.triangles.len())?;
        }
        Ok(())
    }
}

/// Serializes collision data as JSON.
pub fn to_json(data: &CollisionData) -> Result<String> { Ok(serde_json::to_string_pretty(data)?) }

/// Parses and validates collision data from JSON.
pub fn from_json(text: &str) -> Result<CollisionData> {
    let data: CollisionData = serde_json::from_str(text)?;
    data.validate()?;
    Ok(data)
}
