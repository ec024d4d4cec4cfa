//! midimod - envelope and LFO modulation over MIDI
//!
//! Run with: cargo run -- --list-ports
//!           cargo run -- --input 0 --output 1 --start

mod app;
mod transport;

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "midimod", version, about)]
pub struct Cli {
    /// Session file (JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Input port index for notes, clock and transport
    #[arg(short, long)]
    pub input: Option<usize>,

    /// Output port index
    #[arg(short, long)]
    pub output: Option<usize>,

    /// List MIDI ports and exit
    #[arg(long)]
    pub list_ports: bool,

    /// Log messages instead of sending them
    #[arg(long)]
    pub dry_run: bool,

    /// Tick rate in Hz
    #[arg(long)]
    pub tick_hz: Option<f64>,

    /// Start the LFO immediately
    #[arg(long)]
    pub start: bool,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if cli.list_ports {
        return transport::list_ports();
    }

    app::run(cli)
}
