use binrw::binrw;

use crate::format::Vector3f;

/// Normal, binormal and tangent for one vertex.
#[binrw]
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Nbt {
    pub normal: Vector3f,
    pub binormal: Vector3f,
    pub tangent: Vector3f,
}
