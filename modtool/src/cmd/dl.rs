use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use argh::FromArgs;
use modlib::{format::mesh::Mesh, gx::IndexedMesh};

use crate::cmd::open;

#[derive(FromArgs, PartialEq, Eq, Debug)]
/// decodes mesh display lists and prints primitive statistics
#[argh(subcommand, name = "dl")]
pub struct Args {
    #[argh(positional)]
    /// input MOD
    input: PathBuf,
    #[argh(option, short = 'm')]
    /// only decode this mesh
    mesh: Option<usize>,
}

pub fn run(args: Args) -> Result<()> {
    let session = open(&args.input)?;
    let meshes = &session.model()?.meshes;
    match args.mesh {
        Some(idx) => {
            let mesh = meshes
                .get(idx)
                .ok_or_else(|| anyhow!("Mesh {idx} out of range ({} meshes)", meshes.len()))?;
            print_mesh(idx, mesh)?;
        }
        None => {
            for (idx, mesh) in meshes.iter().enumerate() {
                print_mesh(idx, mesh)?;
            }
        }
    }
    Ok(())
}

fn print_mesh(idx: usize, mesh: &Mesh) -> Result<()> {
    let mut batches = Vec::new();
    let mut lists = 0;
    for packet in &mesh.packets {
        for dl in &packet.display_lists {
            lists += 1;
            batches.extend(
                dl.decode(mesh.vcd)
                    .with_context(|| format!("Failed to decode mesh {idx} display list {lists}"))?,
            );
        }
    }
    let indexed = IndexedMesh::from_batches(&batches);
    log::info!(
        "Mesh {idx}: VCD {:#05x}, {} packets, {lists} display lists, {} batches, {} triangles, {} unique vertices",
        mesh.vcd.0,
        mesh.packets.len(),
        batches.len(),
        indexed.triangle_count(),
        indexed.vertices.len()
    );
    Ok(())
}
