use binrw::binrw;
use strum::{EnumIter, FromRepr, IntoStaticStr};

#[derive(Copy, Clone, Debug, Eq, PartialEq, FromRepr, EnumIter, IntoStaticStr)]
#[repr(u32)]
pub enum TextureFormat {
    Rgb565 = 0,
    Cmpr = 1,
    Rgb5a3 = 2,
    I4 = 3,
    I8 = 4,
    Ia4 = 5,
    Ia8 = 6,
    Rgba8 = 7,
}

impl TextureFormat {
    /// Bits per texel.
    pub fn bits_per_pixel(self) -> u32 {
        match self {
            TextureFormat::Cmpr | TextureFormat::I4 => 4,
            TextureFormat::I8 | TextureFormat::Ia4 => 8,
            TextureFormat::Rgb565 | TextureFormat::Rgb5a3 | TextureFormat::Ia8 => 16,
            TextureFormat::Rgba8 => 32,
        }
    }
}

#[binrw]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Texture {
    pub width: u16,
    pub height: u16,
    /// Raw format, see [`TextureFormat`]. Unknown values are preserved.
    pub format: u32,
    pub unknown: u32,
    #[bw(calc = [0u32; 4])]
    reserved: [u32; 4],
    #[bw(try_calc = data.len().try_into())]
    data_len: u32,
    #[br(count = data_len)]
    pub data: Vec<u8>,
}

impl Texture {
    #[inline]
    pub fn texture_format(&self) -> Option<TextureFormat> { TextureFormat::from_repr(self.format) }

    /// Expected image size for the declared dimensions and format.
    pub fn expected_size(&self) -> Option<usize> {
        let format = self.texture_format()?;
        Some(self.width as usize * self.height as usize * format.bits_per_pixel() as usize / 8)
    }
}

#[binrw]
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct TextureAttributes {
    pub image_index: u16,
    #[bw(calc = 0u16)]
    padding: u16,
    pub tiling_mode: u16,
    pub unknown: u16,
    pub lod_bias: f32,
}
