use std::convert::TryInto;

use anyhow::Result;
use clap::ArgMatches;
use tracing::info;

use crate::app::{AppConfig, ExitStatus};

#[allow(clippy::module_inception)]
mod benchmark;
pub mod config;

use benchmark::NsBench;
use config::BenchmarkConfig;

pub async fn run(args: &ArgMatches, app_config: &AppConfig) -> Result<ExitStatus> {
    info!("benchmark module selected.");
    let config: BenchmarkConfig = args.try_into()?;

    NsBench::init(app_config, &config)?
        .select_domains()
        .await?
        .benchmark()
        .await?
        .output()
}
