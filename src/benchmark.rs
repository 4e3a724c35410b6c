//! Benchmark Orchestrator
//!
//! Nameservers are benchmarked one after another. For each nameserver one `Job` per domain is
//! dispatched and exactly as many results are collected before the next nameserver is started.
//! The domains of a single nameserver are queried in parallel.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use indexmap::{IndexMap, IndexSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::nameserver::{NameServerConfig, NameServerConfigGroup};
use crate::queue::{self, DispatchQueue};
use crate::resolver::{Job, QueryExecutor, QueryResult};
use crate::{Error, Result};

#[derive(Debug, Clone)]
pub struct BenchmarkOpts {
    /// Record type mnemonic, e.g. "A"
    pub record_type: String,
    pub extended_validation: bool,
    pub workers: usize,
    pub queue_capacity: usize,
    /// Share one dispatch queue across all nameservers instead of opening one per nameserver
    pub reuse_queue: bool,
}

impl Default for BenchmarkOpts {
    fn default() -> Self {
        BenchmarkOpts {
            record_type: "A".to_string(),
            extended_validation: false,
            workers: queue::DEFAULT_WORKERS,
            queue_capacity: queue::DEFAULT_CAPACITY,
            reuse_queue: false,
        }
    }
}

pub struct Benchmark<E: QueryExecutor> {
    executor: Arc<E>,
    opts: BenchmarkOpts,
}

impl<E: QueryExecutor> Benchmark<E> {
    pub fn new(executor: E, opts: BenchmarkOpts) -> Benchmark<E> {
        Benchmark::with_executor(Arc::new(executor), opts)
    }

    pub fn with_executor(executor: Arc<E>, opts: BenchmarkOpts) -> Benchmark<E> {
        Benchmark { executor, opts }
    }

    pub fn opts(&self) -> &BenchmarkOpts {
        &self.opts
    }

    /// Benchmarks `name_servers` with `domains`.
    ///
    /// Domains are de-duplicated and qualified with a trailing `.` before dispatch. Failed queries
    /// do not abort the run; they are part of the results. Cancelling `cancellation` aborts
    /// in-flight queries which then show up as cancelled results.
    ///
    /// Fails only if there is nothing to do, i.e. no nameservers or no domains.
    pub async fn run(
        &self,
        name_servers: &NameServerConfigGroup,
        domains: &[String],
        cancellation: &CancellationToken,
    ) -> Result<BenchmarkResults> {
        if name_servers.is_empty() {
            return Err(Error::ConfigError {
                reason: "no nameservers to benchmark".to_string(),
            });
        }
        let domains = qualified_domains(domains);
        if domains.is_empty() {
            return Err(Error::ConfigError {
                reason: "no domains to query".to_string(),
            });
        }

        let start_time = Instant::now();
        let mut results = BenchmarkResults::new(&self.opts.record_type, self.opts.extended_validation, domains);
        let mut shared_queue = if self.opts.reuse_queue {
            Some(self.open_queue()?)
        } else {
            None
        };

        for name_server in name_servers.iter() {
            if results.contains(name_server) {
                debug!("Skipping duplicate nameserver {}.", name_server);
                continue;
            }
            let name_server = Arc::new(name_server.clone());
            let jobs = self.jobs(&name_server, results.domains(), cancellation);
            info!("Benchmarking nameserver {} with {} queries.", name_server, jobs.len());

            let batch_start = Instant::now();
            let batch = match shared_queue.as_mut() {
                Some(queue) => queue.dispatch(jobs).await?,
                None => {
                    let mut queue = self.open_queue()?;
                    let batch = queue.dispatch(jobs).await;
                    queue.shutdown().await;
                    batch?
                }
            };
            info!(
                "Finished nameserver {}: {} of {} queries succeeded within {} ms.",
                name_server,
                batch.iter().filter(|x| x.is_success()).count(),
                batch.len(),
                batch_start.elapsed().as_millis()
            );

            results.insert(name_server, batch);
        }

        if let Some(queue) = shared_queue {
            queue.shutdown().await;
        }
        results.run_time = start_time.elapsed();

        Ok(results)
    }

    fn open_queue(&self) -> Result<DispatchQueue> {
        DispatchQueue::open(self.opts.queue_capacity, self.opts.workers, Arc::clone(&self.executor))
    }

    fn jobs(&self, name_server: &Arc<NameServerConfig>, domains: &[String], cancellation: &CancellationToken) -> Vec<Job> {
        domains
            .iter()
            .map(|domain| {
                Job::new(
                    Arc::clone(name_server),
                    self.opts.record_type.as_str(),
                    domain.as_str(),
                    self.opts.extended_validation,
                    cancellation.clone(),
                )
            })
            .collect()
    }
}

/// Removes duplicates and empty names, keeping first occurrences, and appends a trailing `.` where missing.
///
/// Names are compared case-insensitively and returned in lowercase.
pub fn qualified_domains(domains: &[String]) -> Vec<String> {
    let qualified: IndexSet<String> = domains
        .iter()
        .map(|x| x.trim().to_lowercase())
        .filter(|x| !x.is_empty() && x != ".")
        .map(|x| if x.ends_with('.') { x } else { format!("{}.", x) })
        .collect();
    qualified.into_iter().collect()
}

/// Results of a benchmark run by nameserver in benchmark order
#[derive(Debug, Clone)]
pub struct BenchmarkResults {
    record_type: String,
    extended_validation: bool,
    domains: Vec<String>,
    results: IndexMap<Arc<NameServerConfig>, Vec<QueryResult>>,
    started_at: DateTime<Utc>,
    run_time: Duration,
}

impl BenchmarkResults {
    pub fn new<T: Into<String>>(record_type: T, extended_validation: bool, domains: Vec<String>) -> BenchmarkResults {
        BenchmarkResults {
            record_type: record_type.into(),
            extended_validation,
            domains,
            results: IndexMap::new(),
            started_at: Utc::now(),
            run_time: Duration::ZERO,
        }
    }

    /// Adds the results of one nameserver; results of a nameserver already present are replaced.
    pub fn insert(&mut self, name_server: Arc<NameServerConfig>, results: Vec<QueryResult>) {
        self.results.insert(name_server, results);
    }

    pub fn contains(&self, name_server: &NameServerConfig) -> bool {
        self.results.contains_key(name_server)
    }

    pub fn record_type(&self) -> &str {
        &self.record_type
    }

    pub fn extended_validation(&self) -> bool {
        self.extended_validation
    }

    /// Fully qualified domains every nameserver has been queried for
    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn run_time(&self) -> Duration {
        self.run_time
    }

    pub fn name_servers(&self) -> impl Iterator<Item = &NameServerConfig> {
        self.results.keys().map(|x| &**x)
    }

    pub fn results_for(&self, name_server: &NameServerConfig) -> Option<&[QueryResult]> {
        self.results.get(name_server).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NameServerConfig, &[QueryResult])> {
        self.results.iter().map(|(k, v)| (&**k, v.as_slice()))
    }

    pub fn all_results(&self) -> impl Iterator<Item = &QueryResult> {
        self.results.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use spectral::prelude::*;

    use super::*;
    use crate::resolver::{Answer, Exchange, Failure, Outcome, QueryError};

    /// Nameservers on port 5353 fail every query, everything else answers.
    struct FakeExecutor {
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl FakeExecutor {
        fn new() -> FakeExecutor {
            FakeExecutor {
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl QueryExecutor for FakeExecutor {
        async fn execute(&self, job: &Job) -> Outcome {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(2)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if job.name_server().port() == 5353 {
                return Err(Failure::new(Duration::from_millis(2), QueryError::Timeout));
            }
            Ok(Exchange {
                elapsed: Duration::from_millis(2),
                answers: vec![Answer::new(60, job.name(), "192.0.2.1")],
                response_code: "No Error".to_string(),
                degraded: false,
            })
        }
    }

    fn domains(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn qualify_and_dedup_domains() {
        let qualified = qualified_domains(&domains(&["example.com", "example.com.", " example.org ", "", "."]));

        assert_that(&qualified).is_equal_to(domains(&["example.com.", "example.org."]));
    }

    #[test]
    fn qualify_ignores_case() {
        let qualified = qualified_domains(&domains(&["Example.COM", "example.com.", "EXAMPLE.com."]));

        assert_that(&qualified).is_equal_to(domains(&["example.com."]));
    }

    #[tokio::test]
    async fn every_nameserver_gets_every_domain() {
        crate::utils::tests::logging::init();
        let name_servers = NameServerConfigGroup::parse_list("127.0.0.1,127.0.0.2:5353,127.0.0.3").unwrap();
        let benchmark = Benchmark::new(FakeExecutor::new(), BenchmarkOpts::default());

        let results = benchmark
            .run(
                &name_servers,
                &domains(&["a.example.com", "b.example.com", "c.example.com", "a.example.com"]),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_that(&results.len()).is_equal_to(3);
        assert_that(&results.domains().len()).is_equal_to(3);
        let order: Vec<_> = results.name_servers().map(ToString::to_string).collect();
        assert_that(&order).is_equal_to(domains(&["127.0.0.1:53", "127.0.0.2:5353", "127.0.0.3:53"]));
        for (name_server, batch) in results.iter() {
            assert_that(&batch.len()).is_equal_to(3);
            assert_that(&batch.iter().all(|x| x.job().name_server() == name_server)).is_true();
            assert_that(&batch.iter().all(|x| x.job().is_fqdn())).is_true();
        }
        let failing = NameServerConfig::from_str("127.0.0.2:5353").unwrap();
        let failed = results.results_for(&failing).unwrap();
        assert_that(&failed.iter().all(QueryResult::is_failure)).is_true();
    }

    #[tokio::test]
    async fn reused_queue_and_single_worker() {
        crate::utils::tests::logging::init();
        let name_servers = NameServerConfigGroup::parse_list("127.0.0.1,127.0.0.2").unwrap();
        let executor = Arc::new(FakeExecutor::new());
        let opts = BenchmarkOpts {
            workers: 1,
            queue_capacity: 1,
            reuse_queue: true,
            ..Default::default()
        };
        let benchmark = Benchmark::with_executor(Arc::clone(&executor), opts);
        let names: Vec<_> = (0..20).map(|i| format!("n{}.example.com", i)).collect();

        let results = benchmark.run(&name_servers, &names, &CancellationToken::new()).await.unwrap();

        assert_that(&results.all_results().count()).is_equal_to(40);
        assert_that(&executor.max_in_flight.load(Ordering::SeqCst)).is_equal_to(1);
    }

    #[tokio::test]
    async fn workers_run_in_parallel() {
        crate::utils::tests::logging::init();
        let name_servers = NameServerConfigGroup::parse_list("127.0.0.1").unwrap();
        let executor = Arc::new(FakeExecutor::new());
        let opts = BenchmarkOpts {
            workers: 4,
            ..Default::default()
        };
        let benchmark = Benchmark::with_executor(Arc::clone(&executor), opts);
        let names: Vec<_> = (0..40).map(|i| format!("n{}.example.com", i)).collect();

        benchmark.run(&name_servers, &names, &CancellationToken::new()).await.unwrap();

        let max_in_flight = executor.max_in_flight.load(Ordering::SeqCst);
        assert_that(&max_in_flight).is_greater_than(1);
        assert_that(&max_in_flight).is_less_than_or_equal_to(4);
    }

    #[tokio::test]
    async fn duplicate_nameservers_are_benchmarked_once() {
        crate::utils::tests::logging::init();
        let name_servers = NameServerConfigGroup::parse_list("127.0.0.1,127.0.0.1:53").unwrap();
        let benchmark = Benchmark::new(FakeExecutor::new(), BenchmarkOpts::default());

        let results = benchmark
            .run(&name_servers, &domains(&["example.com"]), &CancellationToken::new())
            .await
            .unwrap();

        assert_that(&results.len()).is_equal_to(1);
    }

    #[tokio::test]
    async fn nothing_to_do() {
        let benchmark = Benchmark::new(FakeExecutor::new(), BenchmarkOpts::default());
        let name_servers = NameServerConfigGroup::parse_list("127.0.0.1").unwrap();

        let no_name_servers = benchmark
            .run(&NameServerConfigGroup::default(), &domains(&["example.com"]), &CancellationToken::new())
            .await;
        let no_domains = benchmark.run(&name_servers, &[], &CancellationToken::new()).await;

        assert_that(&no_name_servers).is_err();
        assert_that(&no_domains).is_err();
    }
}
