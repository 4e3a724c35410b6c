//! Aggregation and ranking of benchmark results
//!
//! Nameservers are ranked by mean latency over successful queries, lower is better. Nameservers
//! without any successful query always rank last. Equal mean latencies are ordered by the number of
//! successful queries, more is better; remaining ties keep the benchmark order.

use std::cmp::Ordering;
use std::time::Duration;

use serde::Serialize;

use crate::benchmark::BenchmarkResults;
use crate::nameserver::NameServerConfig;
use crate::resolver::QueryResult;
use crate::utils::serialize::{ser_opt_duration_ms, ser_to_string};

#[derive(Debug, Clone, Serialize)]
pub struct NameServerSummary<'a> {
    #[serde(serialize_with = "ser_to_string")]
    name_server: &'a NameServerConfig,
    name: Option<&'a str>,
    attempted: usize,
    successful: usize,
    /// `None` if there has been no successful query; never coerced to zero.
    #[serde(serialize_with = "ser_opt_duration_ms", rename = "mean_latency_ms")]
    mean_latency: Option<Duration>,
    #[serde(skip)]
    results: &'a [QueryResult],
}

impl<'a> NameServerSummary<'a> {
    pub fn new(name_server: &'a NameServerConfig, results: &'a [QueryResult]) -> NameServerSummary<'a> {
        let latencies: Vec<Duration> = results.iter().filter(|x| x.is_success()).map(|x| x.elapsed()).collect();
        let successful = latencies.len();
        let mean_latency = mean(&latencies);

        NameServerSummary {
            name_server,
            name: name_server.name(),
            attempted: results.len(),
            successful,
            mean_latency,
            results,
        }
    }

    pub fn name_server(&self) -> &'a NameServerConfig {
        self.name_server
    }

    pub fn results(&self) -> &'a [QueryResult] {
        self.results
    }

    pub fn attempted(&self) -> usize {
        self.attempted
    }

    pub fn successful(&self) -> usize {
        self.successful
    }

    pub fn failed(&self) -> usize {
        self.attempted - self.successful
    }

    pub fn mean_latency(&self) -> Option<Duration> {
        self.mean_latency
    }

    /// Share of successful queries in `[0, 1]`; 0 if nothing has been attempted
    pub fn success_ratio(&self) -> f64 {
        if self.attempted == 0 {
            return 0.0;
        }
        self.successful as f64 / self.attempted as f64
    }

    fn compare(&self, other: &Self) -> Ordering {
        match (self.mean_latency, other.mean_latency) {
            (Some(left), Some(right)) => left.cmp(&right).then_with(|| other.successful.cmp(&self.successful)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

fn mean(values: &[Duration]) -> Option<Duration> {
    if values.is_empty() {
        return None;
    }
    let total: Duration = values.iter().sum();
    let count = u32::try_from(values.len()).unwrap_or(u32::MAX);
    Some(total / count)
}

/// Total order over the summaries of all benchmarked nameservers
#[derive(Debug, Clone)]
pub struct Ranking<'a> {
    /// Benchmark order
    summaries: Vec<NameServerSummary<'a>>,
    /// Indices into `summaries`, best first
    order: Vec<usize>,
}

impl<'a> Ranking<'a> {
    pub fn summarize(results: &'a BenchmarkResults) -> Ranking<'a> {
        let summaries: Vec<_> = results
            .iter()
            .map(|(name_server, results)| NameServerSummary::new(name_server, results))
            .collect();
        let mut order: Vec<usize> = (0..summaries.len()).collect();
        // Stable sort keeps the benchmark order for ties.
        order.sort_by(|&left, &right| summaries[left].compare(&summaries[right]));

        Ranking { summaries, order }
    }

    /// Summaries in benchmark order
    pub fn summaries(&self) -> &[NameServerSummary<'a>] {
        &self.summaries
    }

    /// Summaries in rank order, best first
    pub fn ranked(&self) -> impl Iterator<Item = &NameServerSummary<'a>> {
        self.order.iter().map(move |&i| &self.summaries[i])
    }

    /// All nameservers tied for the best mean latency; empty if no nameserver answered at all
    pub fn fastest(&self) -> Vec<&NameServerSummary<'a>> {
        let best = self.ranked().next().and_then(NameServerSummary::mean_latency);
        match best {
            Some(best) => self.ranked().take_while(|x| x.mean_latency == Some(best)).collect(),
            None => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.summaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }
}

impl Serialize for Ranking<'_> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let ranked: Vec<_> = self.ranked().map(|x| x.name_server().to_string()).collect();
        let fastest: Vec<_> = self.fastest().iter().map(|x| x.name_server().to_string()).collect();

        let mut state = serializer.serialize_struct("Ranking", 3)?;
        state.serialize_field("summaries", &self.summaries)?;
        state.serialize_field("ranked", &ranked)?;
        state.serialize_field("fastest", &fastest)?;
        state.end()
    }
}
