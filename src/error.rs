use snafu::{Location, Snafu};

use crate::config::ConfigError;
use crate::repl::ReplError;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ApplicationError {
    /// Could not read the configuration from the environment
    ConfigLoad {
        source: ConfigError,
        #[snafu(implicit)]
        location: Location,
    },

    /// Could not initialize the logger
    InitializeLogger {
        source: tracing::subscriber::SetGlobalDefaultError,
        #[snafu(implicit)]
        location: Location,
    },

    /// Could not create the log directory
    LogDirectory {
        source: std::io::Error,
        #[snafu(implicit)]
        location: Location,
    },

    /// The console stopped with an error
    Console {
        source: ReplError,
        #[snafu(implicit)]
        location: Location,
    },
}
