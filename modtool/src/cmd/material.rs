use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use argh::FromArgs;
use modlib::format::material;

use crate::cmd::{open, save};

#[derive(FromArgs, PartialEq, Debug)]
/// export or import materials and TEV environments as JSON
#[argh(subcommand, name = "material")]
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
/// writes the material chunk to a JSON file
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
/// replaces the material chunk with the contents of a JSON file
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
    let materials = &session.model()?.materials;
    let text = material::to_json(materials)?;
    fs::write(&args.output, text)
        .with_context(|| format!("Failed to write '{}'", args.output.display()))?;
    log::info!(
        "Exported {} materials, {} TEV environments to {}",
        materials.materials.len(),
        materials.tev_infos.len(),
        args.output.display()
    );
    Ok(())
}

fn import(args: ImportArgs) -> Result<()> {
    let text = fs::read_to_string(&args.json)
        .with_context(|| format!("Failed to read '{}'", args.json.display()))?;
    let materials = material::from_json(&text)
        .with_context(|| format!("Invalid material data in '{}'", args.json.display()))?;
    let mut session = open(&args.input)?;
    log::info!(
        "Imported {} materials, {} TEV environments",
        materials.materials.len(),
        materials.tev_infos.len()
    );
    session.model_mut()?.materials = materials;
    save(&session, &args.output)
}
