use std::convert::TryInto;
use std::env;
use std::process;

use anyhow::Result;
use clap::ArgMatches;
use tracing::{debug, info};

use nsbench::app::console::{Console, ConsoleOpts};
use nsbench::app::logging::Logging;
use nsbench::app::output::styles;
use nsbench::app::{cli_parser, modules, AppConfig, ExitStatus};

#[tokio::main]
async fn main() {
    let args = match cli_parser::create_parser().try_get_matches() {
        Ok(args) => args,
        Err(err) => {
            // --help and --version end up here, too.
            let exit_status = if err.use_stderr() {
                ExitStatus::CliParsingFailed
            } else {
                ExitStatus::Ok
            };
            let _ = err.print();
            process::exit(exit_status as i32);
        }
    };

    let app_config: AppConfig = match (&args).try_into() {
        Ok(app_config) => app_config,
        Err(err) => {
            eprintln!("Failed to parse configuration: {:#}", err);
            process::exit(ExitStatus::ConfigParsingFailed as i32);
        }
    };

    if let Err(err) = setup_terminal_and_logging(&app_config) {
        eprintln!("Failed to set up logging: {:#}", err);
        process::exit(ExitStatus::UnrecoverableError as i32);
    }
    debug!("Parsed args and set up logging.");

    let exit_status = match run(&args, &app_config).await {
        Ok(exit_status) => exit_status,
        Err(err) => {
            let console = Console::new(ConsoleOpts::from(&app_config));
            console.error(format!("Error: {:#}", err));
            ExitStatus::Failed
        }
    };
    info!("Exiting with {:?}.", exit_status);

    process::exit(exit_status as i32);
}

fn setup_terminal_and_logging(app_config: &AppConfig) -> Result<()> {
    if app_config.no_color {
        styles::no_color_mode();
    }
    if app_config.ascii_only {
        styles::ascii_mode();
    }

    let logging = Logging::new(
        app_config.verbosity,
        env::var_os("RUST_LOG"),
        !app_config.no_color,
        app_config.debug,
    );
    logging.start()
}

async fn run(args: &ArgMatches, app_config: &AppConfig) -> Result<ExitStatus> {
    modules::benchmark::run(args, app_config).await
}
