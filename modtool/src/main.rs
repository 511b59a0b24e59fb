mod argh_version;
mod cmd;

use argh::FromArgs;

#[derive(FromArgs, PartialEq, Debug)]
/// Tools for working with MOD model containers.
struct TopLevel {
    #[argh(subcommand)]
    command: SubCommand,
}

#[derive(FromArgs, PartialEq, Debug)]
#[argh(subcommand)]
enum SubCommand {
    Info(cmd::model::InfoArgs),
    Rewrite(cmd::model::RewriteArgs),
    DeleteChunk(cmd::model::DeleteChunkArgs),
    EditHeader(cmd::model::EditHeaderArgs),
    Material(cmd::material::Args),
    Collision(cmd::collision::Args),
    Dl(cmd::dl::Args),
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .format_target(false)
        .format_level(false)
        .init();

    let args: TopLevel = argh_version::from_env();
    let result = match args.command {
        SubCommand::Info(args) => cmd::model::info(args),
        SubCommand::Rewrite(args) => cmd::model::rewrite(args),
        SubCommand::DeleteChunk(args) => cmd::model::delete_chunk(args),
        SubCommand::EditHeader(args) => cmd::model::edit_header(args),
        SubCommand::Material(args) => cmd::material::run(args),
        SubCommand::Collision(args) => cmd::collision::run(args),
        SubCommand::Dl(args) => cmd::dl::run(args),
    };
    if let Err(e) = result {
        eprintln!("Failed: {e:?}");
        std::process::exit(1);
    }
}
