use std::convert::TryFrom;
use std::io::{self, Write};
use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::benchmark::BenchmarkResults;
use crate::resolver::QueryResult;
use crate::statistics::ranking::{NameServerSummary, Ranking};
use crate::utils::serialize::ser_duration_ms;
use crate::{Error, Result};

pub mod json;
pub mod styles;
pub mod summary;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputType {
    Json,
    Summary,
}

impl TryFrom<&str> for OutputType {
    type Error = Error;

    fn try_from(value: &str) -> std::result::Result<Self, Self::Error> {
        match value {
            "json" => Ok(OutputType::Json),
            "summary" => Ok(OutputType::Summary),
            _ => Err(Error::ParserError {
                what: value.to_string(),
                to: "OutputType",
                why: "invalid output type".to_string(),
            }),
        }
    }
}

pub trait OutputFormat<T> {
    fn output<W: Write>(&self, writer: &mut W, data: &T) -> Result<()>;
}

#[derive(Debug)]
pub enum OutputConfig {
    Json { format: json::JsonFormat },
    Summary { format: summary::SummaryFormat },
}

impl OutputConfig {
    pub fn json(opts: json::JsonOptions) -> Self {
        OutputConfig::Json {
            format: json::JsonFormat::new(opts),
        }
    }

    pub fn summary(opts: summary::SummaryOptions) -> Self {
        OutputConfig::Summary {
            format: summary::SummaryFormat::new(opts),
        }
    }
}

#[derive(Debug)]
pub struct Output<'a> {
    config: &'a OutputConfig,
}

impl Output<'_> {
    pub fn new(config: &OutputConfig) -> Output {
        Output { config }
    }
}

impl<T: Serialize + summary::SummaryFormatter> OutputFormat<T> for Output<'_> {
    fn output<W: Write>(&self, writer: &mut W, data: &T) -> Result<()> {
        match self.config {
            OutputConfig::Json { format } => format.output(writer, data),
            OutputConfig::Summary { format } => format.output(writer, data),
        }
    }
}

/// Writes `data` to stdout according to `config`
pub fn output<T: Serialize + summary::SummaryFormatter>(config: &OutputConfig, data: &T) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    let output = Output::new(config);
    output
        .output(&mut handle, data)
        .context("Failed to print results to stdout.")
}

/// Everything worth reporting about a benchmark run
#[derive(Debug, Serialize)]
pub struct BenchmarkReport<'a> {
    record_type: &'a str,
    extended_validation: bool,
    domains: &'a [String],
    started_at: DateTime<Utc>,
    #[serde(serialize_with = "ser_duration_ms", rename = "run_time_ms")]
    run_time: Duration,
    name_servers: Vec<NameServerReport<'a>>,
    ranked: Vec<String>,
    fastest: Vec<String>,
    #[serde(skip)]
    ranking: Ranking<'a>,
}

#[derive(Debug, Serialize)]
struct NameServerReport<'a> {
    #[serde(flatten)]
    summary: NameServerSummary<'a>,
    results: &'a [QueryResult],
}

impl<'a> BenchmarkReport<'a> {
    pub fn new(results: &'a BenchmarkResults) -> BenchmarkReport<'a> {
        let ranking = Ranking::summarize(results);
        let name_servers = ranking
            .summaries()
            .iter()
            .map(|x| NameServerReport {
                summary: x.clone(),
                results: x.results(),
            })
            .collect();
        let ranked = ranking.ranked().map(|x| x.name_server().to_string()).collect();
        let fastest = ranking.fastest().iter().map(|x| x.name_server().to_string()).collect();

        BenchmarkReport {
            record_type: results.record_type(),
            extended_validation: results.extended_validation(),
            domains: results.domains(),
            started_at: results.started_at(),
            run_time: results.run_time(),
            name_servers,
            ranked,
            fastest,
            ranking,
        }
    }

    pub fn ranking(&self) -> &Ranking<'a> {
        &self.ranking
    }

    pub fn record_type(&self) -> &str {
        self.record_type
    }

    pub fn extended_validation(&self) -> bool {
        self.extended_validation
    }

    pub fn domains(&self) -> &[String] {
        self.domains
    }
}
