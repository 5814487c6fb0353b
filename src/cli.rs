use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(author, version, about = "A Z-Machine interpreter", long_about = None)]
pub struct Cli {
    /// The story file to run
    pub game_file: PathBuf,

    /// The interface to use
    #[arg(short, long, value_enum, default_value_t = InterfaceMode::Terminal)]
    pub interface: InterfaceMode,

    /// Commands for the replay interface, one per line
    #[arg(long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Where output stream 2 writes the transcript
    #[arg(long, value_name = "FILE")]
    pub transcript: Option<PathBuf>,

    /// Where output stream 4 records the player's commands
    #[arg(long, value_name = "FILE")]
    pub record: Option<PathBuf>,

    /// Seed the random number generator with a fixed value
    #[arg(long)]
    pub seed: Option<u32>,

    /// Trace every instruction to the log
    #[arg(short, long)]
    pub debug: bool,

    /// The log file. Defaults to zaffre.log when --debug is set
    #[arg(long, value_name = "FILE")]
    pub log: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum InterfaceMode {
    Terminal,
    Replay,
}
