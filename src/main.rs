use clap::Parser;
use nbdscan::{
    cli::{init_verbose, Cli, Command, FULL_VERSION},
    commands::{classes, scan},
    utils::{handle_error_and_exit, Result},
};

fn runner() -> Result<()> {
    let cli = Cli::parse();
    init_verbose(&cli);
    let subcommand_name = match cli.command {
        Command::Scan(_) => "scan",
        Command::Classes(_) => "classes",
    };

    log::info!(
        "Running {}-{} [{}]",
        env!("CARGO_PKG_NAME"),
        *FULL_VERSION,
        subcommand_name
    );
    match cli.command {
        Command::Scan(args) => scan::scan(args)?,
        Command::Classes(args) => classes::classes(args)?,
    }
    log::info!("{} end", env!("CARGO_PKG_NAME"));
    Ok(())
}

fn main() {
    if let Err(e) = runner() {
        handle_error_and_exit(e);
    }
}
