use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use argh::FromArgs;
use modlib::format::collision;

use crate::cmd::{open, save};

#[derive(FromArgs, PartialEq, Debug)]
/// export or import collision triangles and grid as JSON
#[argh(subcommand, name = "collision")]
pub struct Args {
    #[argh(subcommand)]
    command: SubCommand,
}

#[derive(FromArgs, PartialEq, Debug)]
#[argh(subcommand)]
enum SubCommand {
    Export(ExportArgs),
    Import(ImportArgs),
}

#[derive(FromArgs, PartialEq, Eq, Debug)]
/// writes the collision chunks to a JSON file
#[argh(subcommand, name = "export")]
pub struct ExportArgs {
    #[argh(positional)]
    /// input MOD
    input: PathBuf,
    #[argh(positional)]
    /// output JSON
    output: PathBuf,
}

#[derive(FromArgs, PartialEq, Eq, Debug)]
/// replaces the collision chunks with the contents of a JSON file
#[argh(subcommand, name = "import")]
pub struct ImportArgs {
    #[argh(positional)]
    /// input MOD
    input: PathBuf,
    #[argh(positional)]
    /// input JSON
    json: PathBuf,
    #[argh(positional)]
    /// output MOD
    output: PathBuf,
}

pub fn run(args: Args) -> Result<()> {
    match args.command {
        SubCommand::Export(c_args) => export(c_args),
        SubCommand::Import(c_args) => import(c_args),
    }
}

fn export(args: ExportArgs) -> Result<()> {
    let session = open(&args.input)?;
    let data = &session.model()?.collision;
    if data.is_empty() {
        log::warn!("{} has no collision data", args.input.display());
    }
    fs::write(&args.output, collision::to_json(data)?)
        .with_context(|| format!("Failed to write '{}'", args.output.display()))?;
    log::info!("Exported {} triangles to {}", data.triangles.len(), args.output.display());
    Ok(())
}

fn import(args: ImportArgs) -> Result<()> {
    let text = fs::read_to_string(&args.json)
        .with_context(|| format!("Failed to read '{}'", args.json.display()))?;
    let data = collision::from_json(&text)
        .with_context(|| format!("Invalid collision data in '{}'", args.json.display()))?;
    let mut session = open(&args.input)?;
    let vertex_count = session.model()?.vertices.len();
    let out_of_range = data
        .triangles
        .iter()
        .filter(|t| t.vertex_indices.iter().any(|&i| i as usize >= vertex_count))
        .count();
    if out_of_range > 0 {
        log::warn!("{out_of_range} collision triangles reference vertices past {vertex_count}");
    }
    log::info!("Imported {} triangles, {} rooms", data.triangles.len(), data.rooms.len());
    session.model_mut()?.collision = data;
    save(&session, &args.output)
}
