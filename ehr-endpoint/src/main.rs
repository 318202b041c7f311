#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

#[macro_use]
extern crate slog_scope;

mod error;
mod metrics;
mod routes;
mod server;
mod settings;

use std::error::Error;

use docopt::Docopt;
use serde_derive::Deserialize;

use ehr_common::logging;

const USAGE: &str = "
Usage: ehr-endpoint [options]

Options:
    -h, --help              Show this message
    --config=CONFIGFILE     Configuration file path.
";

#[derive(Debug, Deserialize)]
struct Args {
    flag_config: Option<String>,
}

#[actix_web::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args: Args = Docopt::new(USAGE)
        .and_then(|d| d.deserialize())
        .unwrap_or_else(|e| e.exit());
    let filenames: Vec<String> = args.flag_config.into_iter().collect();
    let settings = settings::Settings::with_env_and_config_files(&filenames)?;
    logging::init_logging(!settings.human_logs, logging::get_default_hostname("ehr"))
        .expect("Logging failed to initialize");
    debug!("Starting up...");

    // Run server...
    let server = server::Server::with_settings(settings).expect("Could not start server");
    info!("Server started");
    server.await?;

    // Shutdown
    info!("Server closing");
    logging::reset_logging();
    Ok(())
}
