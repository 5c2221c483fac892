use anyhow::Result;
use clap::{Parser, Subcommand};
use log::error;

use sample_triage_helper::logging;
use sample_triage_helper::trace::{self, TraceArgs};
use sample_triage_helper::unpacker::{self, UnpackArgs};

#[derive(Parser, Debug)]
#[command(
    name = "sample-triage-helper",
    about = "Sample correlation and corpus unpacking helpers",
    version
)]
struct Cli {
    /// Enable debug output
    #[arg(short = 'd', long = "debug", default_value_t = false)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write an opcode trace for a host-exported program dump
    Trace(TraceArgs),
    /// Normalize password-protected group archives into exe/others layouts
    Unpack(UnpackArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _logger = logging::init(cli.debug)?;

    let outcome = match cli.command {
        Command::Trace(args) => trace::run(args).map(|_| ()),
        Command::Unpack(args) => unpacker::run(args),
    };

    if let Err(err) = outcome {
        error!("{}", err);
        std::process::exit(1);
    }
    Ok(())
}
