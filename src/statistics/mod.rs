use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::benchmark::BenchmarkResults;
use crate::resolver::QueryError;

pub mod ranking;

pub trait Statistics<'a> {
    type StatsOut;

    fn statistics(&'a self) -> Self::StatsOut;
}

#[derive(Debug, Serialize)]
pub struct Summary<T: Ord + Clone> {
    pub min: Option<T>,
    pub max: Option<T>,
}

impl<T: Ord + Clone> Summary<T> {
    pub fn summary(values: &[T]) -> Summary<T> {
        let min = values.iter().min().cloned();
        let max = values.iter().max().cloned();

        Summary { min, max }
    }
}

#[derive(Debug)]
pub struct BenchmarkStats {
    pub name_servers: usize,
    pub queries: usize,
    pub successes: usize,
    pub failures: usize,
    pub degraded: usize,
    /// Failure kinds and their number of occurrences
    pub failure_counts: BTreeMap<String, usize>,
    pub elapsed: Summary<Duration>,
}

impl fmt::Display for BenchmarkStats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} responses from {} nameservers ({} Ok, {} Err)",
            self.queries, self.name_servers, self.successes, self.failures
        )?;
        if let (Some(min), Some(max)) = (self.elapsed.min, self.elapsed.max) {
            write!(f, ", {} ms min, {} ms max response time", min.as_millis(), max.as_millis())?;
        }
        Ok(())
    }
}

impl<'a> Statistics<'a> for BenchmarkResults {
    type StatsOut = BenchmarkStats;

    fn statistics(&'a self) -> Self::StatsOut {
        let mut failure_counts = BTreeMap::new();
        for failure in self.all_results().filter_map(|x| x.failure()) {
            *failure_counts.entry(failure_kind(failure).to_string()).or_insert(0) += 1;
        }
        let elapsed: Vec<_> = self
            .all_results()
            .filter(|x| x.is_success())
            .map(|x| x.elapsed())
            .collect();

        BenchmarkStats {
            name_servers: self.len(),
            queries: self.all_results().count(),
            successes: elapsed.len(),
            failures: failure_counts.values().sum(),
            degraded: self.all_results().filter(|x| x.is_degraded()).count(),
            failure_counts,
            elapsed: Summary::summary(&elapsed),
        }
    }
}

fn failure_kind(failure: &QueryError) -> &'static str {
    match failure {
        QueryError::UnknownRecordType { .. } => "UnknownRecordType",
        QueryError::InvalidQuery { .. } => "InvalidQuery",
        QueryError::Timeout => "Timeout",
        QueryError::Transport { .. } => "Transport",
        QueryError::MalformedResponse { .. } => "MalformedResponse",
        QueryError::Cancelled => "Cancelled",
        QueryError::RuntimePanic => "RuntimePanic",
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use spectral::prelude::*;
    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::nameserver::NameServerConfig;
    use crate::resolver::{Exchange, Failure, Job, QueryResult};

    #[test]
    fn statistics_of_results() {
        let name_server = Arc::new(NameServerConfig::udp(([127, 0, 0, 1], 53)));
        let job = Job::new(Arc::clone(&name_server), "A", "example.com.", false, CancellationToken::new());
        let ok = |ms| {
            QueryResult::success(
                job.clone(),
                Exchange {
                    elapsed: Duration::from_millis(ms),
                    answers: Vec::new(),
                    response_code: "No Error".to_string(),
                    degraded: false,
                },
            )
        };
        let timeout = QueryResult::failed(job.clone(), Failure::new(Duration::from_secs(2), QueryError::Timeout));
        let mut results = BenchmarkResults::new("A", false, vec!["example.com.".to_string()]);
        results.insert(name_server, vec![ok(10), ok(30), timeout.clone(), timeout]);

        let stats = results.statistics();

        assert_that(&stats.queries).is_equal_to(4);
        assert_that(&stats.successes).is_equal_to(2);
        assert_that(&stats.failures).is_equal_to(2);
        assert_that(&stats.failure_counts.get("Timeout")).is_some().is_equal_to(&2);
        assert_that(&stats.elapsed.min).is_some().is_equal_to(Duration::from_millis(10));
        assert_that(&stats.elapsed.max).is_some().is_equal_to(Duration::from_millis(30));
        assert_that(&stats.to_string())
            .is_equal_to("4 responses from 1 nameservers (2 Ok, 2 Err), 10 ms min, 30 ms max response time".to_string());
    }
}
