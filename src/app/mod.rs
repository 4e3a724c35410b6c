pub mod cli_parser;
pub mod config;
pub mod console;
pub mod logging;
pub mod modules;
pub mod output;

pub use config::AppConfig;

/// `ExitStatus` represents the exit states that will be return to the OS after termination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// All fine.
    Ok = 0,
    /// CLI argument parsing failed.
    CliParsingFailed = 1,
    /// Configuration parsing failed.
    ConfigParsingFailed = 2,
    /// An unrecoverable error occurred. This is worst case and should not happen.
    UnrecoverableError = 3,
    /// The benchmark failed to properly execute.
    Failed = 10,
    /// The benchmark could not proceed because there is nothing to benchmark.
    Abort = 12,
}
