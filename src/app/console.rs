// Copyright 2017-2021 Lukas Pustina <lukas@pustina.de>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::fmt;
use std::time::Duration;

use yansi::{Paint, Painted};

use crate::app::modules::benchmark::config::BenchmarkConfig;
use crate::app::output::styles::{self, ATTENTION, EMPH, ERROR};
use crate::app::AppConfig;
use crate::domains::SelectedDomains;
use crate::nameserver::NameServerConfigGroup;
use crate::statistics::{BenchmarkStats, Statistics};

#[derive(Debug, Default)]
pub struct ConsoleOpts {
    quiet: bool,
}

impl From<&AppConfig> for ConsoleOpts {
    fn from(app_config: &AppConfig) -> Self {
        ConsoleOpts {
            quiet: app_config.quiet,
        }
    }
}

#[derive(Debug)]
pub struct Console {
    opts: ConsoleOpts,
}

impl Console {
    pub fn new(opts: ConsoleOpts) -> Console {
        Console { opts }
    }

    pub fn print_benchmark_opts(&self, config: &BenchmarkConfig) {
        if self.not_quiet() {
            self.caption(format!(
                "{}: record type={}, max. domains={}, workers={}, queue length={}, timeout={}{}{}",
                Fmt::emph("Options"),
                config.record_type,
                config.count,
                config.workers,
                config.queue_length,
                humantime::format_duration(config.timeout),
                if config.extended_validation {
                    ", extended validation"
                } else {
                    ""
                },
                if config.reuse_queue { ", reuse queue" } else { "" },
            ));
        }
    }

    pub fn print_domain_selection(&self, selected: &SelectedDomains) {
        if let Some(reason) = &selected.fallback_reason {
            self.attention(format!("Using {} because {}.", selected.source, reason));
        }
        if self.not_quiet() {
            self.info(format!(
                "Selected {} from {}.",
                plural(selected.domains.len(), "domain", "domains"),
                selected.source
            ));
        }
    }

    pub fn print_estimates(&self, name_servers: &NameServerConfigGroup, num_domains: usize) {
        if self.not_quiet() {
            let num_name_servers = name_servers.len();
            self.info(format!(
                "Sending {} to {} for {}.",
                plural(num_name_servers * num_domains, "request", "requests"),
                plural(num_name_servers, "nameserver", "nameservers"),
                plural(num_domains, "domain", "domains"),
            ));
        }
    }

    pub fn print_statistics<'a, T>(&self, data: &'a T, total_run_time: Duration)
    where
        T: Statistics<'a, StatsOut = BenchmarkStats>,
    {
        if !self.not_quiet() {
            return;
        }
        let statistics = data.statistics();
        self.info(format!(
            "Received {} within {} of total run time.",
            statistics,
            humantime::format_duration(Duration::from_millis(total_run_time.as_millis() as u64))
        ));
        for (kind, count) in &statistics.failure_counts {
            self.itemize(format!("Err {} occurred {} times", kind, count));
        }
        if statistics.degraded > 0 {
            self.itemize(format!(
                "{} without extended validation support",
                plural(statistics.degraded, "response", "responses")
            ));
        }
    }

    pub fn print_finished(&self) {
        if self.not_quiet() {
            self.finished();
        }
    }

    pub fn emphasize<T: fmt::Display>(&self, item: T) {
        println!("{}", Fmt::emph(&item))
    }

    pub fn info<T: AsRef<str>>(&self, str: T) {
        println!("{} {}", styles::info_prefix(), str.as_ref());
    }

    pub fn attention<T: AsRef<str>>(&self, str: T) {
        println!("{} {}", Fmt::attention(styles::attention_prefix()), str.as_ref());
    }

    pub fn finished(&self) {
        self.emphasize(format!("{} Finished.", styles::finished_prefix()));
    }

    pub fn caption<T: AsRef<str>>(&self, str: T) {
        self.emphasize(format!("{} {}", styles::caption_prefix(), str.as_ref()));
    }

    pub fn error<T: AsRef<str>>(&self, str: T) {
        eprintln!("{} {}", Fmt::error(styles::error_prefix()), str.as_ref());
    }

    pub fn itemize<T: AsRef<str>>(&self, str: T) {
        println!(" {} {}", styles::itemization_prefix(), str.as_ref());
    }

    pub fn not_quiet(&self) -> bool {
        !self.opts.quiet
    }
}

fn plural(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("1 {}", singular)
    } else {
        format!("{} {}", count, plural)
    }
}

pub struct Fmt {}

impl Fmt {
    pub fn emph<T: fmt::Display + ?Sized>(item: &T) -> Painted<&T> {
        item.paint(EMPH)
    }

    pub fn attention<T: fmt::Display + ?Sized>(item: &T) -> Painted<&T> {
        item.paint(ATTENTION)
    }

    pub fn error<T: fmt::Display + ?Sized>(item: &T) -> Painted<&T> {
        item.paint(ERROR)
    }
}
