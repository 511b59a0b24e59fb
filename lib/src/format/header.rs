use binrw::binrw;

#[binrw]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Header {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub flags: u32,
}

impl Header {
    /// The model carries a normal/binormal/tangent chunk.
    pub const USE_NBT: u32 = 0x01;
    pub const USE_CLASSIC_SCALE: u32 = 0x08;

    #[inline]
    pub fn use_nbt(&self) -> bool { self.flags & Self::USE_NBT != 0 }
}
