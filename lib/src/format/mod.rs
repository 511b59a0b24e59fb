pub mod bitfield;
pub mod chunk;
pub mod collision;
pub mod envelope;
pub mod header;
pub mod joint;
pub mod material;
pub mod mesh;
pub mod model;
pub mod texture;
pub mod vertex;

use binrw::binrw;
use serde_derive::{Deserialize, Serialize};

#[binrw]
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector2f {
    pub x: f32,
    pub y: f32,
}

#[binrw]
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3f {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3f {
    pub const fn new(x: f32, y: f32, z: f32) -> Self { Self { x, y, z } }
}

#[binrw]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ColourU8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl ColourU8 {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self { Self { r, g, b, a } }
}

/// Signed 16-bit colour, as used by TEV colour registers.
#[binrw]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ColourU16 {
    pub r: i16,
    pub g: i16,
    pub b: i16,
    pub a: i16,
}

#[binrw]
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundBox {
    pub min: Vector3f,
    pub max: Vector3f,
}

#[binrw]
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    pub normal: Vector3f,
    pub d: f32,
}
