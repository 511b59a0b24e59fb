use std::io::{Cursor, Seek, Write};

use binrw::{binrw, BinReaderExt, BinWriterExt};
use serde_derive::{Deserialize, Serialize};

use crate::{
    error::{ModError, Result},
    format::{
        bitfield::{AlphaCompare, BlendMode},
        ColourU16, ColourU8, Vector2f, Vector3f,
    },
    util::io::{align_reader, align_writer, count_u32, ENDIAN},
};

/// Materials and TEV environments. Both live in the same chunk.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialContainer {
    pub materials: Vec<Material>,
    pub tev_infos: Vec<TevInfo>,
}

impl MaterialContainer {
    pub fn is_empty(&self) -> bool { self.materials.is_empty() && self.tev_infos.is_empty() }

    /// Reads the chunk body. Both counts come first; all TEV environments
    /// precede all materials.
    pub fn read(reader: &mut Cursor<&[u8]>) -> Result<Self> {
        let material_count: u32 = reader.read_type(ENDIAN)?;
        let tev_count: u32 = reader.read_type(ENDIAN)?;
        align_reader(reader)?;
        let mut tev_infos = Vec::new();
        for _ in 0..tev_count {
            tev_infos.push(reader.read_type(ENDIAN)?);
        }
        let mut materials = Vec::new();
        for _ in 0..material_count {
            materials.push(reader.read_type(ENDIAN)?);
        }
        Ok(Self { materials, tev_infos })
    }

    pub fn write<W>(&self, w: &mut W) -> Result<()>
    where W: Write + Seek {
        w.write_type(&count_u32(self.materials.len())?, ENDIAN)?;
        w.write_type(&count_u32(self.tev_infos.len())?, ENDIAN)?;
        align_writer(w)?;
        for tev in &self.tev_infos {
            w.write_type(tev, ENDIAN)?;
        }
        for material in &self.materials {
            w.write_type(material, ENDIAN)?;
        }
        Ok(())
    }

    /// Checks that every material's flags agree with its payload, so the
    /// binary form reads back unchanged.
    pub fn check_layout(&self) -> Result<()> {
        for (idx, material) in self.materials.iter().enumerate() {
            if material.uses_pvw() != material.pvw.is_some() {
                return Err(ModError::Invalid(format!(
                    "Material {idx}: USE_PVW flag does not match its data"
                )));
            }
        }
        Ok(())
    }

    /// [`check_layout`](Self::check_layout), plus TEV group references
    /// must resolve.
    pub fn validate(&self) -> Result<()> {
        self.check_layout()?;
        for (idx, material) in self.materials.iter().enumerate() {
            if let Some(pvw) = &material.pvw {
                if pvw.tev_group_index as usize >= self.tev_infos.len() {
                    return Err(ModError::Invalid(format!(
                        "Material {idx}: TEV group {} out of range ({} defined)",
                        pvw.tev_group_index,
                        self.tev_infos.len()
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Serializes the material chunk as JSON.
pub fn to_json(container: &MaterialContainer) -> Result<String> {
    Ok(serde_json::to_string_pretty(container)?)
}

/// Parses and validates a material chunk from JSON.
pub fn from_json(text: &str) -> Result<MaterialContainer> {
    let container: MaterialContainer = serde_json::from_str(text)?;
    container.validate()?;
    Ok(container)
}

#[binrw]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub flags: u32,
    pub texture_index: u32,
    pub diffuse: ColourU8,
    #[br(if(flags & Material::USE_PVW != 0))]
    #[serde(default)]
    pub pvw: Option<PvwData>,
}

impl Material {
    pub const USE_PVW: u32 = 0x01;
    pub const OPAQUE: u32 = 0x100;
    pub const ALPHA_CLIP: u32 = 0x200;
    pub const TRANSPARENT_BLEND: u32 = 0x400;
    pub const HIDDEN: u32 = 0x10000;

    #[inline]
    pub fn uses_pvw(&self) -> bool { self.flags & Self::USE_PVW != 0 }
}

/// Extended material data, present when [`Material::USE_PVW`] is set.
#[binrw]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PvwData {
    pub tev_group_index: u32,
    pub colour_info: PolygonColourInfo,
    pub lighting: LightingInfo,
    pub pe: PeInfo,
    pub texture_info: TextureInfo,
}

#[binrw]
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyU8 {
    pub value: u8,
    #[bw(calc = [0u8; 3])]
    padding: [u8; 3],
    pub in_tangent: f32,
    pub out_tangent: f32,
}

#[binrw]
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ColourKey {
    pub frame: i32,
    pub r: KeyU8,
    pub g: KeyU8,
    pub b: KeyU8,
}

#[binrw]
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AlphaKey {
    pub frame: i32,
    pub a: KeyU8,
}

#[binrw]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PolygonColourInfo {
    pub diffuse: ColourU8,
    pub anim_length: i32,
    pub anim_speed: f32,
    #[bw(try_calc = colour_keys.len().try_into())]
    colour_key_count: u32,
    #[br(count = colour_key_count)]
    pub colour_keys: Vec<ColourKey>,
    #[bw(try_calc = alpha_keys.len().try_into())]
    alpha_key_count: u32,
    #[br(count = alpha_key_count)]
    pub alpha_keys: Vec<AlphaKey>,
}

#[binrw]
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LightingInfo {
    pub flags: u32,
    pub unknown: f32,
}

#[binrw]
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PeInfo {
    pub mode: i32,
    pub alpha_compare: AlphaCompare,
    pub z_mode: i32,
    pub blend: BlendMode,
}

#[binrw]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct TexGen {
    pub gen_type: u8,
    pub src: u8,
    pub mtx: u8,
    pub unknown: u8,
}

#[binrw]
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3Key {
    pub frame: i32,
    pub value: Vector3f,
}

#[binrw]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TextureData {
    /// Index into the texture attribute chunk.
    pub attribute_index: i32,
    pub min_lod: i16,
    pub max_lod: i16,
    pub wrap_s: u8,
    pub wrap_t: u8,
    pub mag_filter: u8,
    pub min_filter: u8,
    pub anim_length: i32,
    pub anim_speed: f32,
    pub scale: Vector2f,
    pub rotation: f32,
    pub translation: Vector2f,
    pub pivot: Vector2f,
    #[bw(try_calc = scale_keys.len().try_into())]
    scale_key_count: u32,
    #[br(count = scale_key_count)]
    pub scale_keys: Vec<Vector3Key>,
    #[bw(try_calc = rotation_keys.len().try_into())]
    rotation_key_count: u32,
    #[br(count = rotation_key_count)]
    pub rotation_keys: Vec<Vector3Key>,
    #[bw(try_calc = translation_keys.len().try_into())]
    translation_key_count: u32,
    #[br(count = translation_key_count)]
    pub translation_keys: Vec<Vector3Key>,
}

#[binrw]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TextureInfo {
    pub scale_flag: i32,
    pub scale: Vector3f,
    #[bw(try_calc = tex_gens.len().try_into())]
    tex_gen_count: u32,
    #[br(count = tex_gen_count)]
    pub tex_gens: Vec<TexGen>,
    #[bw(try_calc = textures.len().try_into())]
    texture_count: u32,
    #[br(count = texture_count)]
    pub textures: Vec<TextureData>,
}

#[binrw]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ColourKey16 {
    pub frame: i32,
    pub value: ColourU16,
}

#[binrw]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TevColourRegister {
    pub colour: ColourU16,
    pub anim_length: i32,
    pub anim_speed: f32,
    #[bw(try_calc = keys.len().try_into())]
    key_count: u32,
    #[br(count = key_count)]
    pub keys: Vec<ColourKey16>,
}

/// One side (colour or alpha) of a TEV stage.
#[binrw]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct TevCombiner {
    pub in_a: u8,
    pub in_b: u8,
    pub in_c: u8,
    pub in_d: u8,
    pub op: u8,
    pub bias: u8,
    pub scale: u8,
    pub clamp: u8,
    pub out_reg: u8,
    #[bw(calc = [0u8; 3])]
    padding: [u8; 3],
}

#[binrw]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct TevStage {
    pub unknown: u8,
    pub konst_colour_sel: u8,
    pub konst_alpha_sel: u8,
    #[bw(calc = 0u8)]
    padding: u8,
    pub colour: TevCombiner,
    pub alpha: TevCombiner,
}

/// Texture environment: the fixed-function combiner setup shared by
/// materials through [`PvwData::tev_group_index`].
#[binrw]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TevInfo {
    /// PREV, REG0 and REG1.
    pub colour_regs: [TevColourRegister; 3],
    pub konst_colours: [ColourU8; 4],
    #[bw(try_calc = stages.len().try_into())]
    stage_count: u32,
    #[br(count = stage_count)]
    pub stages: Vec<TevStage>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pvw_material(tev_group_index: u32) -> Material {
        Material {
            flags: Material::USE_PVW | Material::OPAQUE,
            texture_index: 0,
            diffuse: ColourU8::new(255, 255, 255, 255),
            pvw: Some(PvwData {
                tev_group_index,
                colour_info: PolygonColourInfo {
                    diffuse: ColourU8::new(200, 100, 50, 255),
                    anim_length: 30,
                    anim_speed: 1.0,
                    colour_keys: vec![ColourKey { frame: 0, ..Default::default() }],
                    alpha_keys: vec![AlphaKey {
                        frame: 15,
                        a: KeyU8 { value: 128, in_tangent: 0.5, out_tangent: -0.5 },
                    }],
                },
                lighting: LightingInfo { flags: 1, unknown: 0.25 },
                pe: PeInfo {
                    mode: 0,
                    alpha_compare: AlphaCompare(0x7080_0000),
                    z_mode: 1,
                    blend: BlendMode(0x1450),
                },
                texture_info: TextureInfo {
                    scale_flag: 1,
                    scale: Vector3f::new(1.0, 1.0, 1.0),
                    tex_gens: vec![TexGen { gen_type: 1, src: 4, mtx: 60, unknown: 0 }],
                    textures: vec![TextureData {
                        attribute_index: 0,
                        scale: Vector2f { x: 1.0, y: 1.0 },
                        translation_keys: vec![Vector3Key {
                            frame: 2,
                            value: Vector3f::new(0.0, 0.5, 0.0),
                        }],
                        ..Default::default()
                    }],
                },
            }),
        }
    }

    fn sample() -> MaterialContainer {
        let stage = TevStage {
            unknown: 0,
            konst_colour_sel: 0x0C,
            konst_alpha_sel: 0x1C,
            colour: TevCombiner { in_a: 15, in_b: 8, in_c: 10, in_d: 15, ..Default::default() },
            alpha: TevCombiner { in_a: 7, in_b: 4, in_c: 5, in_d: 7, ..Default::default() },
        };
        MaterialContainer {
            materials: vec![
                pvw_material(0),
                Material { flags: 0, texture_index: 3, diffuse: ColourU8::new(1, 2, 3, 4), pvw: None },
            ],
            tev_infos: vec![TevInfo { stages: vec![stage], ..Default::default() }],
        }
    }

    #[test]
    fn binary_round_trip() {
        let container = sample();
        let mut w = Cursor::new(Vec::new());
        container.write(&mut w).unwrap();
        let data = w.into_inner();
        assert_eq!(&data[0..8], &[0, 0, 0, 2, 0, 0, 0, 1]);
        let read = MaterialContainer::read(&mut Cursor::new(&data[..])).unwrap();
        assert_eq!(read, container);
    }

    #[test]
    fn tev_infos_precede_materials() {
        let container = sample();
        let mut w = Cursor::new(Vec::new());
        container.write(&mut w).unwrap();
        let data = w.into_inner();
        // First TEV colour register starts right after the aligned counts
        let mut expected = Cursor::new(Vec::new());
        expected.write_type(&container.tev_infos[0], ENDIAN).unwrap();
        let expected = expected.into_inner();
        assert_eq!(&data[0x20..0x20 + expected.len()], &expected[..]);
    }

    #[test]
    fn plain_material_has_no_pvw_section() {
        let material = Material { flags: 0, texture_index: 1, diffuse: ColourU8::default(), pvw: None };
        let mut w = Cursor::new(Vec::new());
        w.write_type(&material, ENDIAN).unwrap();
        assert_eq!(w.into_inner().len(), 12);
    }

    #[test]
    fn json_round_trip_and_validation() {
        let container = sample();
        let text = to_json(&container).unwrap();
        assert_eq!(from_json(&text).unwrap(), container);

        let mut broken = sample();
        broken.materials[0].pvw.as_mut().unwrap().tev_group_index = 4;
        assert!(matches!(from_json(&to_json(&broken).unwrap()), Err(ModError::Invalid(_))));

        let mut broken = sample();
        broken.materials[1].flags |= Material::USE_PVW;
        assert!(matches!(broken.validate(), Err(ModError::Invalid(_))));
    }
}
