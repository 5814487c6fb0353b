use std::fs::File;
use std::path::PathBuf;

use clap::Parser;
use tracing::error;
use tracing::Level;

use zaffre::cli::Cli;
use zaffre::run;

fn main() {
    let cli = Cli::parse();

    let log = match (&cli.log, cli.debug) {
        (Some(path), _) => Some(path.clone()),
        (None, true) => Some(PathBuf::from("zaffre.log")),
        (None, false) => None,
    };

    // The guard flushes the log when dropped, so it must outlive run.
    let guard = match log {
        Some(path) => match File::create(&path) {
            Ok(file) => {
                let (writer, guard) = tracing_appender::non_blocking(file);
                tracing_subscriber::fmt()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_max_level(if cli.debug { Level::TRACE } else { Level::WARN })
                    .init();
                Some(guard)
            }
            Err(e) => {
                eprintln!("Couldn't create log file {}: {}", path.display(), e);
                None
            }
        },
        None => None,
    };

    if let Err(e) = run(cli) {
        eprintln!("{:#}", e);
        error!("Exited with error: {:#}", e);
        drop(guard);
        std::process::exit(1);
    }
}
