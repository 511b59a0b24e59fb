use argh::TopLevelCommand;

/// Like [`argh::from_env`], with a lone `--version` / `-V` printing the
/// package version.
pub fn from_env<T: TopLevelCommand>() -> T {
    let mut args = std::env::args().skip(1);
    if let (Some(arg), None) = (args.next(), args.next()) {
        if arg == "--version" || arg == "-V" {
            println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
            std::process::exit(0);
        }
    }
    argh::from_env()
}
