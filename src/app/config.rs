// Copyright 2017-2021 Lukas Pustina <lukas@pustina.de>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::convert::TryFrom;

use anyhow::{Context, Result};
use clap::ArgMatches;

use crate::app::output::json::JsonOptions;
use crate::app::output::summary::SummaryOptions;
use crate::app::output::{OutputConfig, OutputType};

/// Global settings shared by every part of the app
#[derive(Debug)]
pub struct AppConfig {
    pub quiet: bool,
    pub no_color: bool,
    pub ascii_only: bool,
    pub verbosity: u8,
    pub debug: bool,
    pub output: OutputType,
    pub output_config: OutputConfig,
}

impl TryFrom<&ArgMatches> for AppConfig {
    type Error = anyhow::Error;

    fn try_from(args: &ArgMatches) -> std::result::Result<Self, Self::Error> {
        let output = args
            .get_one::<String>("output")
            .map(|x| OutputType::try_from(x.as_str()).context("failed to parse output type"))
            .context("no output type specified")??;
        let config = AppConfig {
            quiet: args.get_flag("quiet"),
            no_color: args.get_flag("no-color"),
            ascii_only: args.get_flag("ascii"),
            verbosity: args.get_count("v"),
            debug: args.get_flag("debug"),
            output_config: output_config(output, args)?,
            output,
        };

        Ok(config)
    }
}

fn output_config(output_type: OutputType, args: &ArgMatches) -> Result<OutputConfig> {
    let options: Vec<&str> = args
        .get_many::<String>("output-options")
        .map(|xs| xs.map(String::as_str).collect())
        .unwrap_or_default();
    parse_output_options(output_type, options)
}

fn parse_output_options(output_type: OutputType, options: Vec<&str>) -> Result<OutputConfig> {
    match output_type {
        OutputType::Json => {
            let options = JsonOptions::try_from(options).context("failed to parse json options")?;
            Ok(OutputConfig::json(options))
        }
        OutputType::Summary => {
            let options = SummaryOptions::try_from(options).context("failed to parse summary options")?;
            Ok(OutputConfig::summary(options))
        }
    }
}
