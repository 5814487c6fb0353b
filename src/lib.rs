pub mod cli;
pub mod game;
pub mod ui;

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use cli::{Cli, InterfaceMode};
use game::config::Config;
use game::state::GameState;
use game::stream::OutputStreams;
use ui::interface::{EchoInterface, ReplayInterface};
use ui::Interface;

fn open_sink(path: Option<&Path>) -> Result<Option<Box<dyn Write>>> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Couldn't create {}", path.display()))?;
            Ok(Some(Box::new(file)))
        }
        None => Ok(None),
    }
}

pub fn run(cli: Cli) -> Result<()> {
    let story = fs::read(&cli.game_file).context("Couldn't open story file.")?;

    let interface: Box<dyn Interface> = match cli.interface {
        InterfaceMode::Terminal => Box::new(EchoInterface::new().context("Couldn't start UI")?),
        InterfaceMode::Replay => {
            let script = match &cli.input {
                Some(path) => fs::read_to_string(path).context("Couldn't open input file.")?,
                None => String::new(),
            };
            Box::new(ReplayInterface::new(&script).with_echo(true))
        }
    };

    let config = Config {
        seed: cli.seed,
        ..Config::default()
    };
    let streams = OutputStreams::new(
        open_sink(cli.transcript.as_deref())?,
        open_sink(cli.record.as_deref())?,
    );

    let mut game_state = GameState::new(&story, interface, config)
        .context("Error loading story file")?
        .with_streams(streams);

    game_state.run().context("The story stopped with an error")?;
    game_state.finish()?;
    info!("Exited normally");
    Ok(())
}
