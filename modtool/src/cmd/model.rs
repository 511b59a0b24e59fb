use std::path::PathBuf;

use anyhow::{bail, Result};
use argh::FromArgs;
use modlib::{
    chunk_id_to_name,
    format::joint::{display_name, hierarchy_order},
    ChunkId,
};

use crate::cmd::{open, save};

#[derive(FromArgs, PartialEq, Eq, Debug)]
/// prints the header and per-chunk record counts
#[argh(subcommand, name = "info")]
pub struct InfoArgs {
    #[argh(positional)]
    /// input MOD
    input: PathBuf,
}

#[derive(FromArgs, PartialEq, Eq, Debug)]
/// reads and writes a MOD file back in canonical form
#[argh(subcommand, name = "rewrite")]
pub struct RewriteArgs {
    #[argh(positional)]
    /// input MOD
    input: PathBuf,
    #[argh(positional)]
    /// output MOD
    output: PathBuf,
}

#[derive(FromArgs, PartialEq, Eq, Debug)]
/// removes one chunk's contents
#[argh(subcommand, name = "delete-chunk")]
pub struct DeleteChunkArgs {
    #[argh(positional)]
    /// input MOD
    input: PathBuf,
    #[argh(positional)]
    /// output MOD
    output: PathBuf,
    #[argh(option, short = 'c', from_str_fn(parse_chunk))]
    /// chunk name (e.g. VERTEX_NORMAL) or hex tag (e.g. 0x11)
    chunk: ChunkId,
}

#[derive(FromArgs, PartialEq, Eq, Debug)]
/// edits the header date and flags
#[argh(subcommand, name = "edit-header")]
pub struct EditHeaderArgs {
    #[argh(positional)]
    /// input MOD
    input: PathBuf,
    #[argh(positional)]
    /// output MOD
    output: PathBuf,
    #[argh(option)]
    /// year
    year: Option<u16>,
    #[argh(option)]
    /// month
    month: Option<u8>,
    #[argh(option)]
    /// day
    day: Option<u8>,
    #[argh(option, from_str_fn(parse_u32))]
    /// header flags (decimal or 0x hex)
    flags: Option<u32>,
}

fn parse_u32(value: &str) -> Result<u32, String> {
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => value.parse(),
    };
    parsed.map_err(|e| format!("invalid number '{value}': {e}"))
}

fn parse_chunk(value: &str) -> Result<ChunkId, String> {
    if let Some(id) = ChunkId::from_name(value) {
        return Ok(id);
    }
    let id = ChunkId::from_u32(parse_u32(value)?);
    match id {
        ChunkId::Unknown(tag) => Err(format!("unknown chunk {tag:#x}")),
        id => Ok(id),
    }
}

pub fn info(args: InfoArgs) -> Result<()> {
    let session = open(&args.input)?;
    let model = session.model()?;
    let header = &model.header;
    if let Some(path) = session.path() {
        log::info!("{}", path.display());
    }
    log::info!("  Date: {:04}-{:02}-{:02}", header.year, header.month, header.day);
    log::info!("  Flags: {:#x}{}", header.flags, if header.use_nbt() { " (NBT)" } else { "" });
    for (name, count) in session.summary()? {
        log::info!("  {name}: {count}");
    }
    for (idx, texture) in model.textures.iter().enumerate() {
        let format: &str = texture.texture_format().map_or("unknown", |f| f.into());
        log::info!("  Texture {idx}: {}x{} {format}", texture.width, texture.height);
        if texture.expected_size().map_or(false, |size| size != texture.data.len()) {
            log::warn!("  Texture {idx}: data size {:#x} does not match its format", texture.data.len());
        }
    }
    for (idx, envelope) in model.envelopes.iter().enumerate() {
        let total = envelope.total_weight();
        if (total - 1.0).abs() > 0.001 {
            log::warn!("  Envelope {idx}: weights sum to {total}");
        }
    }
    for (idx, joint) in model.joints.iter().enumerate() {
        let name = model.joint_names.get(idx).map_or("<unnamed>".into(), |n| display_name(n));
        log::debug!(
            "  Joint {idx} '{name}': parent {}{}",
            joint.parent_index,
            if joint.is_visible() { "" } else { " (hidden)" }
        );
    }
    let reachable = hierarchy_order(&model.joints).len();
    if reachable != model.joints.len() {
        log::warn!("  {} joints are not connected to a root", model.joints.len() - reachable);
    }
    Ok(())
}

pub fn rewrite(args: RewriteArgs) -> Result<()> {
    let session = open(&args.input)?;
    save(&session, &args.output)
}

pub fn delete_chunk(args: DeleteChunkArgs) -> Result<()> {
    let mut session = open(&args.input)?;
    let count = session.model()?.element_count(args.chunk).unwrap_or_default();
    session.clear_chunk(args.chunk)?;
    log::info!("Removed {} ({count} records)", chunk_id_to_name(args.chunk.as_u32()));
    save(&session, &args.output)
}

pub fn edit_header(args: EditHeaderArgs) -> Result<()> {
    if args.month.map_or(false, |m| !(1..=12).contains(&m)) {
        bail!("Invalid month {:?}", args.month);
    }
    if args.day.map_or(false, |d| !(1..=31).contains(&d)) {
        bail!("Invalid day {:?}", args.day);
    }
    let mut session = open(&args.input)?;
    let header = session.model()?.header;
    let (year, month, day) = (
        args.year.unwrap_or(header.year),
        args.month.unwrap_or(header.month),
        args.day.unwrap_or(header.day),
    );
    session.set_header_date(year, month, day)?;
    if let Some(flags) = args.flags {
        session.set_header_flags(flags)?;
    }
    save(&session, &args.output)
}
