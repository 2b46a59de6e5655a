mod macros;

pub mod config;
pub mod error;
pub mod logger;
pub mod model;
pub mod repl;
pub mod service;

use dotenvy::dotenv;
use snafu::ResultExt;

use config::Config;
use error::{ApplicationError, ConfigLoadSnafu, ConsoleSnafu};
use repl::Repl;

/// Reads the configuration, starts logging and runs the console until it is closed.
pub async fn run() -> Result<(), ApplicationError> {
    dotenv().ok();

    let config = Config::from_env().context(ConfigLoadSnafu)?;
    let _guard = logger::init(&config)?;

    let mut repl = Repl::new().context(ConsoleSnafu)?;
    repl::start(&mut repl, config).await.context(ConsoleSnafu)
}
