use std::convert::TryFrom;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::ArgMatches;

use crate::benchmark::BenchmarkOpts;
use crate::domains::{DomainSelection, DomainSource};
use crate::resolver::UdpExecutorOpts;
use crate::system_config::DEFAULT_RESOLV_CONF;

#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    /// Comma separated `host[:port]` list
    pub nameservers: Option<String>,
    pub system_nameservers: bool,
    pub resolv_conf_path: String,
    pub domain_source: DomainSource,
    pub count: usize,
    pub history_days: u32,
    /// Upper case record type mnemonic
    pub record_type: String,
    pub extended_validation: bool,
    pub workers: usize,
    pub queue_length: usize,
    pub timeout: Duration,
    pub reuse_queue: bool,
}

impl BenchmarkConfig {
    pub fn benchmark_opts(&self) -> BenchmarkOpts {
        BenchmarkOpts {
            record_type: self.record_type.clone(),
            extended_validation: self.extended_validation,
            workers: self.workers,
            queue_capacity: self.queue_length,
            reuse_queue: self.reuse_queue,
        }
    }

    pub fn executor_opts(&self) -> UdpExecutorOpts {
        UdpExecutorOpts {
            timeout: self.timeout,
            ..Default::default()
        }
    }

    pub fn domain_selection(&self) -> DomainSelection {
        DomainSelection::new(self.domain_source.clone(), self.count, self.history_days)
    }
}

impl TryFrom<&ArgMatches> for BenchmarkConfig {
    type Error = anyhow::Error;

    fn try_from(args: &ArgMatches) -> std::result::Result<Self, Self::Error> {
        let config = BenchmarkConfig {
            nameservers: args.get_one::<String>("nameservers").cloned(),
            system_nameservers: args.get_flag("system-nameservers"),
            resolv_conf_path: args
                .get_one::<String>("resolv-conf")
                .map(String::as_str)
                .unwrap_or(DEFAULT_RESOLV_CONF)
                .to_string(),
            domain_source: DomainSource::from_str(&string_arg(args, "domain-source")?)
                .context("failed to parse domain source")?,
            count: copied_arg(args, "count")?,
            history_days: copied_arg(args, "history-days")?,
            record_type: string_arg(args, "record-type")?.trim().to_uppercase(),
            extended_validation: args.get_flag("dnssec"),
            workers: copied_arg(args, "workers")?,
            queue_length: copied_arg(args, "queue-length")?,
            timeout: copied_arg(args, "timeout").map(Duration::from_secs)?,
            reuse_queue: args.get_flag("reuse-queue"),
        };

        Ok(config)
    }
}

fn string_arg(args: &ArgMatches, id: &str) -> Result<String> {
    args.get_one::<String>(id)
        .cloned()
        .with_context(|| format!("no value for {} specified", id))
}

fn copied_arg<T: Copy + Send + Sync + 'static>(args: &ArgMatches, id: &str) -> Result<T> {
    args.get_one::<T>(id)
        .copied()
        .with_context(|| format!("no value for {} specified", id))
}

#[cfg(test)]
mod tests {
    use spectral::prelude::*;

    use super::*;
    use crate::app::cli_parser::create_parser;

    #[test]
    fn defaults() {
        let args = create_parser().try_get_matches_from(["nsbench"]).unwrap();

        let config = BenchmarkConfig::try_from(&args).unwrap();

        assert_that(&config.nameservers).is_none();
        assert_that(&config.system_nameservers).is_false();
        assert_that(&config.domain_source).is_equal_to(DomainSource::History);
        assert_that(&config.count).is_equal_to(20);
        assert_that(&config.history_days).is_equal_to(30);
        assert_that(&config.record_type.as_str()).is_equal_to("A");
        assert_that(&config.extended_validation).is_false();
        assert_that(&config.workers).is_equal_to(8);
        assert_that(&config.queue_length).is_equal_to(65535);
        assert_that(&config.timeout).is_equal_to(Duration::from_secs(2));
        assert_that(&config.reuse_queue).is_false();
    }

    #[test]
    fn all_flags() {
        let args = create_parser()
            .try_get_matches_from([
                "nsbench",
                "-s",
                "9.9.9.9,1.1.1.1:5353",
                "--system-nameservers",
                "--resolv-conf",
                "/tmp/resolv.conf",
                "-d",
                "default_list",
                "-c",
                "5",
                "-t",
                "aaaa",
                "--dnssec",
                "--workers",
                "2",
                "--timeout",
                "1",
                "--reuse-queue",
            ])
            .unwrap();

        let config = BenchmarkConfig::try_from(&args).unwrap();

        assert_that(&config.nameservers).is_equal_to(Some("9.9.9.9,1.1.1.1:5353".to_string()));
        assert_that(&config.resolv_conf_path.as_str()).is_equal_to("/tmp/resolv.conf");
        assert_that(&config.domain_source).is_equal_to(DomainSource::DefaultList);
        assert_that(&config.record_type.as_str()).is_equal_to("AAAA");
        let opts = config.benchmark_opts();
        assert_that(&opts.extended_validation).is_true();
        assert_that(&opts.workers).is_equal_to(2);
        assert_that(&opts.reuse_queue).is_true();
        assert_that(&config.executor_opts().timeout).is_equal_to(Duration::from_secs(1));
        assert_that(&config.domain_selection().limit).is_equal_to(5);
    }

    #[test]
    fn domain_file() {
        let args = create_parser()
            .try_get_matches_from(["nsbench", "--domain-source", "domains.txt"])
            .unwrap();

        let config = BenchmarkConfig::try_from(&args).unwrap();

        assert_that(&config.domain_source).is_equal_to(DomainSource::File("domains.txt".into()));
    }

    #[test]
    fn zero_values_are_rejected() {
        for arg in ["--timeout", "--workers", "--queue-length"] {
            let args = create_parser().try_get_matches_from(["nsbench", arg, "0"]);

            assert_that(&args.is_err()).is_true();
        }
    }
}
