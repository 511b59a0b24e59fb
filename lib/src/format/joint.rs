use std::{
    borrow::Cow,
    io::{Cursor, Seek, Write},
};

use binrw::{binrw, BinReaderExt, BinWriterExt};

use crate::{
    error::{ModError, Result},
    format::{BoundBox, Vector3f},
    util::io::{align_reader, align_writer, count_u32, ENDIAN},
};

#[binrw]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Joint {
    /// Index of the parent joint, or -1 for the root.
    pub parent_index: i32,
    pub flags: u32,
    pub bounds: BoundBox,
    pub volume_radius: f32,
    pub scale: Vector3f,
    pub rotation: Vector3f,
    pub translation: Vector3f,
    #[bw(try_calc = matpolys.len().try_into())]
    matpoly_count: u32,
    #[br(count = matpoly_count)]
    pub matpolys: Vec<JointMatPoly>,
}

impl Joint {
    pub const VISIBLE: u32 = 0x01;

    #[inline]
    pub fn is_root(&self) -> bool { self.parent_index < 0 }

    #[inline]
    pub fn is_visible(&self) -> bool { self.flags & Self::VISIBLE != 0 }
}

/// Material/mesh pair drawn by a joint.
#[binrw]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct JointMatPoly {
    pub material_index: u16,
    pub mesh_index: u16,
}

/// Reads the joint name table. Names are raw byte strings in whatever
/// encoding the exporter used; use [`display_name`] to show them.
pub fn read_joint_names(reader: &mut Cursor<&[u8]>) -> Result<Vec<Vec<u8>>> {
    let count: u32 = reader.read_type(ENDIAN)?;
    align_reader(reader)?;
    let mut names = Vec::new();
    for _ in 0..count {
        let len: u32 = reader.read_type(ENDIAN)?;
        let start = reader.position() as usize;
        let end = start.checked_add(len as usize).filter(|&end| end <= reader.get_ref().len());
        let Some(end) = end else {
            return Err(ModError::TruncatedInput {
                offset: start as u64,
                needed: len as u64,
                available: reader.get_ref().len().saturating_sub(start) as u64,
            });
        };
        names.push(reader.get_ref()[start..end].to_vec());
        reader.set_position(end as u64);
    }
    Ok(names)
}

pub fn write_joint_names<W>(w: &mut W, names: &[Vec<u8>]) -> Result<()>
where W: Write + Seek {
    w.write_type(&count_u32(names.len())?, ENDIAN)?;
    align_writer(w)?;
    for name in names {
        w.write_type(&count_u32(name.len())?, ENDIAN)?;
        w.write_all(name)?;
    }
    Ok(())
}

/// Lossy UTF-8 view of a joint name.
#[inline]
pub fn display_name(name: &[u8]) -> Cow<'_, str> { String::from_utf8_lossy(name) }

/// Returns the joint indices in depth-first order starting at the roots,
/// skipping any joint whose parent chain does not reach a root.
pub fn hierarchy_order(joints: &[Joint]) -> Vec<usize> {
    let mut order = Vec::with_capacity(joints.len());
    let mut stack: Vec<usize> = (0..joints.len()).filter(|&i| joints[i].is_root()).rev().collect();
    while let Some(idx) = stack.pop() {
        order.push(idx);
        let children = joints
            .iter()
            .enumerate()
            .filter(|(_, j)| j.parent_index == idx as i32)
            .map(|(i, _)| i)
            .filter(|&i| i != idx);
        let mut children: Vec<usize> = children.collect();
        children.reverse();
        stack.extend(children);
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    fn joint(parent_index: i32) -> Joint { Joint { parent_index, ..Default::default() } }

    #[test]
    fn names_round_trip() {
        let names = vec![b"root".to_vec(), b"arm_l".to_vec(), Vec::new()];
        let mut w = Cursor::new(Vec::new());
        write_joint_names(&mut w, &names).unwrap();
        let data = w.into_inner();
        assert_eq!(&data[0..4], &[0, 0, 0, 3]);
        assert_eq!(&data[0x20..0x24], &[0, 0, 0, 4]);
        let read = read_joint_names(&mut Cursor::new(&data[..])).unwrap();
        assert_eq!(read, names);
    }

    #[test]
    fn names_keep_non_utf8_bytes() {
        // Shift-JIS katakana "A"
        let mut data = vec![0u8; 0x20];
        data[3] = 1;
        data.extend_from_slice(&[0, 0, 0, 2, 0x83, 0x41]);
        let names = read_joint_names(&mut Cursor::new(&data[..])).unwrap();
        assert_eq!(names, vec![vec![0x83, 0x41]]);
        assert_eq!(display_name(&names[0]), "\u{FFFD}A");

        let mut w = Cursor::new(Vec::new());
        write_joint_names(&mut w, &names).unwrap();
        assert_eq!(w.into_inner(), data);
    }

    #[test]
    fn names_reject_truncated_entry() {
        let mut data = vec![0u8; 0x20];
        data[3] = 1;
        data.extend_from_slice(&[0, 0, 0, 8, b'a']);
        assert!(matches!(
            read_joint_names(&mut Cursor::new(&data[..])),
            Err(ModError::TruncatedInput { offset: 0x24, needed: 8, available: 1 })
        ));
    }

    #[test]
    fn depth_first_order() {
        let joints = vec![joint(-1), joint(0), joint(1), joint(0), joint(7)];
        assert_eq!(hierarchy_order(&joints), vec![0, 1, 2, 3]);
    }
}
