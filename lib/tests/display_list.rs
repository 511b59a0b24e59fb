use modlib::{
    format::mesh::Vcd,
    gx::{decode, DisplayListReader, IndexedMesh, PrimitiveType},
};

/// Encodes a primitive with position == normal == texcoord0 == `i`.
fn primitive(opcode: u8, positions: &[u16]) -> Vec<u8> {
    let mut out = vec![opcode];
    out.extend_from_slice(&(positions.len() as u16).to_be_bytes());
    for &p in positions {
        for _ in 0..3 {
            out.extend_from_slice(&p.to_be_bytes());
        }
    }
    out
}

#[test]
fn strip_and_list_batches() {
    let mut data = primitive(0x98, &[0, 1, 2, 3, 4]);
    data.extend(primitive(0xA0, &[5, 6, 7]));
    // NOP padding
    let end = data.len();
    data.resize(end + 11, 0);

    let vcd = Vcd(Vcd::TEXCOORD0);
    let mut reader = DisplayListReader::new(&data, vcd);
    let strip = reader.parse_next().unwrap().unwrap();
    let list = reader.parse_next().unwrap().unwrap();
    assert!(reader.parse_next().unwrap().is_none());
    assert_eq!(reader.position(), end);

    assert_eq!(strip.primitive, PrimitiveType::TriangleStrip);
    let positions: Vec<[u16; 3]> =
        strip.triangles().iter().map(|t| [t[0].position, t[1].position, t[2].position]).collect();
    assert_eq!(positions, vec![[0, 1, 2], [2, 1, 3], [2, 3, 4]]);
    assert_eq!(list.primitive, PrimitiveType::Triangles);
    assert_eq!(list.triangles().len(), 1);
    assert!(list.vertices.iter().all(|v| v.texcoords[0] == Some(v.position)));

    let batches = decode(&data, vcd).unwrap();
    let mesh = IndexedMesh::from_batches(&batches);
    assert_eq!(mesh.vertices.len(), 8);
    assert_eq!(mesh.indices, vec![0, 1, 2, 2, 1, 3, 2, 3, 4, 5, 6, 7]);
}

#[test]
fn iterator_stops_at_invalid_opcode() {
    let mut data = primitive(0x98, &[0, 1, 2]);
    data.extend(primitive(0x90, &[0, 1, 2, 3]));
    let reader = DisplayListReader::new(&data, Vcd(Vcd::TEXCOORD0));
    let batches: Vec<_> = reader.collect::<Result<_, _>>().unwrap();
    assert_eq!(batches.len(), 1);
}
