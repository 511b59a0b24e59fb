//! Packed integer records.
//!
//! Every accessor masks its input and leaves the other sub-fields of the
//! word untouched, so `set_x(x())` is always the identity.

use binrw::binrw;
use serde_derive::{Deserialize, Serialize};
use strum::{EnumIter, FromRepr, IntoStaticStr};

use crate::util::bits::BitField;

/// Display list header word. Only the last byte (the least significant
/// byte of the big-endian word) is meaningful.
#[binrw]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisplayListFlags(pub u32);

#[derive(Copy, Clone, Debug, Eq, PartialEq, FromRepr, EnumIter, IntoStaticStr)]
#[repr(u8)]
pub enum CullMode {
    None = 0,
    Front = 1,
    Back = 2,
    All = 3,
}

impl DisplayListFlags {
    #[inline]
    pub fn cull_mode_raw(self) -> u8 { self.0.bits(0, 8) as u8 }

    #[inline]
    pub fn set_cull_mode_raw(&mut self, value: u8) { self.0 = self.0.with_bits(0, 8, value as u32); }

    #[inline]
    pub fn cull_mode(self) -> Option<CullMode> { CullMode::from_repr(self.cull_mode_raw()) }

    #[inline]
    pub fn set_cull_mode(&mut self, mode: CullMode) { self.set_cull_mode_raw(mode as u8); }

    /// The three leading bytes, unused by the format but preserved.
    #[inline]
    pub fn unused(self) -> u32 { self.0.bits(8, 32) }

    #[inline]
    pub fn set_unused(&mut self, value: u32) { self.0 = self.0.with_bits(8, 32, value); }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, FromRepr, EnumIter, IntoStaticStr)]
#[repr(u8)]
pub enum Attribute {
    Soil = 0,
    Rock = 1,
    Grass = 2,
    Wood = 3,
    Mud = 4,
    Water = 5,
    Hole = 6,
    Unknown = 7,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, FromRepr, EnumIter, IntoStaticStr)]
#[repr(u8)]
pub enum SlipCode {
    Normal = 0,
    Slip = 1,
    SlipCliff = 2,
    Unknown = 3,
}

/// Collision surface code.
///
/// ```text
/// 31..29  attribute
/// 28..27  slip code
/// 26      bald (unplantable)
/// 25      reserved
/// 24..0   free payload
/// ```
#[binrw]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MapCode(pub u32);

impl MapCode {
    pub const OTHER_MASK: u32 = 0x01FF_FFFF;

    pub fn new(attribute: Attribute, slip: SlipCode, bald: bool, other: u32) -> Self {
        let mut code = Self(0);
        code.set_attribute(attribute);
        code.set_slip_code(slip);
        code.set_bald(bald);
        code.set_other(other);
        code
    }

    #[inline]
    pub fn attribute(self) -> Attribute {
        Attribute::from_repr(self.0.bits(29, 32) as u8).unwrap_or(Attribute::Unknown)
    }

    #[inline]
    pub fn set_attribute(&mut self, value: Attribute) {
        self.0 = self.0.with_bits(29, 32, value as u32);
    }

    #[inline]
    pub fn slip_code(self) -> SlipCode {
        SlipCode::from_repr(self.0.bits(27, 29) as u8).unwrap_or(SlipCode::Unknown)
    }

    #[inline]
    pub fn set_slip_code(&mut self, value: SlipCode) {
        self.0 = self.0.with_bits(27, 29, value as u32);
    }

    #[inline]
    pub fn is_bald(self) -> bool { self.0.bits(26, 27) != 0 }

    #[inline]
    pub fn set_bald(&mut self, value: bool) { self.0 = self.0.with_bits(26, 27, value as u32); }

    #[inline]
    pub fn other(self) -> u32 { self.0.bits(0, 25) }

    #[inline]
    pub fn set_other(&mut self, value: u32) { self.0 = self.0.with_bits(0, 25, value); }
}

/// PE alpha compare word.
///
/// ```text
/// 31..28  comp0
/// 27..20  ref0
/// 19..16  op
/// 15..12  comp1
/// 11..8   unused
///  7..0   ref1
/// ```
#[binrw]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlphaCompare(pub u32);

macro_rules! bitfield_accessors {
    ($ty:ty, $inner:ty, $($get:ident, $set:ident, $lo:expr, $hi:expr, $out:ty;)*) => {
        impl $ty {
            $(
                #[inline]
                pub fn $get(self) -> $out { self.0.bits($lo, $hi) as $out }

                #[inline]
                pub fn $set(&mut self, value: $out) { self.0 = self.0.with_bits($lo, $hi, value as $inner); }
            )*
        }
    };
}

bitfield_accessors! {
    AlphaCompare, u32,
    comp0, set_comp0, 28, 32, u8;
    ref0, set_ref0, 20, 28, u8;
    op, set_op, 16, 20, u8;
    comp1, set_comp1, 12, 16, u8;
    unused, set_unused, 8, 12, u8;
    ref1, set_ref1, 0, 8, u8;
}

/// PE blend mode word. The upper 16 bits are preserved.
///
/// ```text
/// 15..12  blend type
/// 11..8   source factor
///  7..4   destination factor
///  3..0   logic op
/// ```
#[binrw]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlendMode(pub u32);

bitfield_accessors! {
    BlendMode, u32,
    blend_type, set_blend_type, 12, 16, u8;
    src_factor, set_src_factor, 8, 12, u8;
    dst_factor, set_dst_factor, 4, 8, u8;
    logic_op, set_logic_op, 0, 4, u8;
}

/// Vertex matrix slot. Non-negative values address a joint matrix with full
/// weight; negative values address an envelope, stored as `-1 - index`.
#[binrw]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VertexMatrix(pub i16);

impl VertexMatrix {
    pub fn full(index: u16) -> Self { Self((index & 0x7FFF) as i16) }

    pub fn partial(index: u16) -> Self { Self(-1 - (index & 0x7FFF) as i16) }

    #[inline]
    pub fn is_partial_weight(self) -> bool { self.0 < 0 }

    /// Joint index (full weight) or envelope index (partial weight).
    #[inline]
    pub fn index(self) -> u16 {
        if self.is_partial_weight() {
            (-1 - self.0) as u16
        } else {
            self.0 as u16
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_code_fields() {
        let code = MapCode::new(Attribute::Grass, SlipCode::Slip, true, 0x123456);
        assert_eq!(code.attribute(), Attribute::Grass);
        assert_eq!(code.slip_code(), SlipCode::Slip);
        assert!(code.is_bald());
        assert_eq!(code.other(), 0x123456);
        assert_eq!(code.0, (2 << 29) | (1 << 27) | (1 << 26) | 0x123456);
    }

    #[test]
    fn map_code_fields_are_independent() {
        let mut code = MapCode(0xFFFF_FFFF);
        code.set_bald(false);
        assert_eq!(code.0, 0xFBFF_FFFF);
        code.set_attribute(Attribute::Soil);
        assert_eq!(code.slip_code(), SlipCode::Unknown);
        assert_eq!(code.other(), MapCode::OTHER_MASK);
        // Reserved bit 25 is never touched
        assert_eq!(code.0 & (1 << 25), 1 << 25);
        code.set_other(0xFFFF_FFFF);
        assert_eq!(code.0 & (1 << 25), 1 << 25);
        assert!(!code.is_bald());

        let before = MapCode(0x1234_5678);
        let mut after = before;
        after.set_slip_code(after.slip_code());
        after.set_attribute(after.attribute());
        after.set_bald(after.is_bald());
        after.set_other(after.other());
        assert_eq!(before, after);
    }

    #[test]
    fn display_list_flags() {
        let mut flags = DisplayListFlags(0xAABB_CC00);
        flags.set_cull_mode(CullMode::Back);
        assert_eq!(flags.0, 0xAABB_CC02);
        assert_eq!(flags.cull_mode(), Some(CullMode::Back));
        flags.set_unused(0);
        assert_eq!(flags.cull_mode_raw(), 2);
        flags.set_cull_mode_raw(0x7F);
        assert_eq!(flags.cull_mode(), None);
        assert_eq!(flags.unused(), 0);
    }

    #[test]
    fn alpha_compare_fields_are_independent() {
        let mut ac = AlphaCompare(0);
        ac.set_comp0(0xF);
        ac.set_ref0(0xAB);
        ac.set_op(0x3);
        ac.set_comp1(0x5);
        ac.set_unused(0x9);
        ac.set_ref1(0xCD);
        assert_eq!(ac.0, 0xFAB3_59CD);
        ac.set_ref0(0x12);
        assert_eq!(ac.comp0(), 0xF);
        assert_eq!(ac.op(), 0x3);
        assert_eq!(ac.comp1(), 0x5);
        assert_eq!(ac.unused(), 0x9);
        assert_eq!(ac.ref1(), 0xCD);
        // Out of range values are masked
        ac.set_op(0xFF);
        assert_eq!(ac.op(), 0xF);
        assert_eq!(ac.ref0(), 0x12);
        assert_eq!(ac.comp1(), 0x5);
    }

    #[test]
    fn blend_mode_preserves_upper_bits() {
        let mut bm = BlendMode(0xDEAD_0000);
        bm.set_blend_type(1);
        bm.set_src_factor(4);
        bm.set_dst_factor(5);
        bm.set_logic_op(0x13);
        assert_eq!(bm.0, 0xDEAD_1453);
        bm.set_src_factor(bm.src_factor());
        assert_eq!(bm.0, 0xDEAD_1453);
        assert_eq!(bm.logic_op(), 3);
    }

    #[test]
    fn vertex_matrix_encoding() {
        assert!(!VertexMatrix(0).is_partial_weight());
        assert_eq!(VertexMatrix(0).index(), 0);
        assert_eq!(VertexMatrix(-1), VertexMatrix::partial(0));
        assert_eq!(VertexMatrix(-1).index(), 0);
        assert_eq!(VertexMatrix(-6).index(), 5);
        assert_eq!(VertexMatrix::full(12), VertexMatrix(12));
        assert_eq!(VertexMatrix::partial(i16::MAX as u16).0, i16::MIN);
        assert_eq!(VertexMatrix(i16::MIN).index(), i16::MAX as u16);
    }
}
