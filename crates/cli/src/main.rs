mod cli;
mod config;
mod logging;
mod rename;
mod report;
mod run;
mod tts;

use anyhow::{anyhow, Result};
use clap::Parser;
use mediabatch_core::NamingStyle;

use crate::cli::{Cli, Command};

fn main() -> Result<()> {
    let cli = Cli::parse();
    config::load_env_file(cli.env_file.as_deref())?;
    let verbose = if cli.verbose {
        true
    } else {
        logging::env_flag()
    };
    logging::init(verbose);
    match cli.command {
        Command::Rename(args) => rename::run(args),
        Command::Tts(args) => tts::run(args),
        Command::Run { config } => run::run_from_config(&config),
        Command::Sanitize { texts, naming } => {
            let style = NamingStyle::from_str(&naming)
                .ok_or_else(|| anyhow!("unknown naming style {naming}"))?;
            for text in texts {
                println!("{}", style.stem(&text));
            }
            Ok(())
        }
    }
}
