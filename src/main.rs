//! mp3-meta
//!
//! Converts a folder of audio files to MP3 with ffmpeg, tagging each output
//! with title and artist from a metadata spreadsheet plus album-level
//! metadata and cover art given on the command line.

mod catalog;
mod cli;
mod command;
mod conversion;
mod error;
mod logging;
mod metadata;
mod profiles;
#[cfg(test)]
mod test_fixtures;

use std::io;
use std::process::ExitCode;

use clap::Parser;

use cli::Cli;
use command::Converter;
use conversion::{cancel_on_ctrl_c, cancel_pair};
use error::Result;
use profiles::{load_profile, save_profile, RunProfile};

async fn run(cli: Cli) -> Result<()> {
    let profile = match &cli.profile {
        Some(path) => load_profile(path)?,
        None => RunProfile::default(),
    };
    let options = cli.resolve(profile)?;

    if let Some(path) = &cli.save_profile {
        save_profile(&RunProfile::from(&options), path)?;
    }

    let converter = Converter::new(options);
    let catalog = converter.build_catalog()?;

    if converter.is_dry_run() {
        return converter.print_catalog(&catalog, &mut io::stdout().lock());
    }

    // Until here Ctrl-C keeps its default behavior and ends the process
    let (trigger, cancel) = cancel_pair();
    cancel_on_ctrl_c(trigger);

    converter.convert(&catalog, cancel).await?;
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logging(&cli.log_config());

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
