mod cli_messages;
mod config;
mod consts;
mod dataset;
mod dispatch;
mod environment;
mod error_classifier;
mod events;
mod logging;
mod model;
mod network;
mod openaq;
mod session;
mod transform;
mod ui;
mod workers;

use crate::config::{Config, get_config_path};
use crate::environment::Environment;
use crate::model::{DisplayMode, Pollutant, Region};
use crate::session::{SessionOptions, run_snapshot, run_tui_mode, setup_session};
use clap::{Parser, Subcommand};
use std::error::Error;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
/// Command-line arguments
struct Args {
    /// Command to execute
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the interactive air quality dashboard
    Start {
        /// Region shown first
        #[arg(long, value_enum)]
        region: Option<Region>,

        /// Pollutant shown first
        #[arg(long, value_enum)]
        pollutant: Option<Pollutant>,

        /// Map rendering
        #[arg(long, value_enum)]
        display: Option<DisplayMode>,

        /// OpenAQ API key (overrides OPENAQ_API_KEY and the config file)
        #[arg(long, value_name = "KEY")]
        api_key: Option<String>,

        /// Enable background colors
        #[arg(long, default_value = "false")]
        with_background: bool,
    },
    /// Fetch one region and print the station table and summary
    Snapshot {
        /// Region to fetch
        #[arg(long, value_enum)]
        region: Option<Region>,

        /// Pollutant to report
        #[arg(long, value_enum)]
        pollutant: Option<Pollutant>,

        /// Only request stations that report the selected pollutant
        #[arg(long, default_value = "false")]
        parameter_filter: bool,

        /// OpenAQ API key (overrides OPENAQ_API_KEY and the config file)
        #[arg(long, value_name = "KEY")]
        api_key: Option<String>,
    },
}

fn load_config() -> Result<Config, Box<dyn Error>> {
    let config_path = get_config_path()?;
    match Config::load_or_default(&config_path) {
        Ok(config) => Ok(config),
        Err(e) => {
            print_cmd_error!(
                "Failed to read the configuration file",
                format!("{}: {}", config_path.display(), e).as_str()
            );
            Err(e.into())
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let environment = Environment::from_env();
    let args = Args::parse();
    let config = load_config()?;

    match args.command {
        Command::Start {
            region,
            pollutant,
            display,
            api_key,
            with_background,
        } => {
            let options = SessionOptions {
                region,
                pollutant,
                display_mode: display,
                api_key,
            };
            let session = setup_session(&config, environment, options)?;
            run_tui_mode(session, with_background).await
        }
        Command::Snapshot {
            region,
            pollutant,
            parameter_filter,
            api_key,
        } => {
            let options = SessionOptions {
                region,
                pollutant,
                display_mode: None,
                api_key,
            };
            let session = setup_session(&config, environment, options)?;
            run_snapshot(session, parameter_filter).await
        }
    }
}
