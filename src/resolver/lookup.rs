use std::time::Duration;

use hickory_proto::rr::Record;
use serde::Serialize;

use crate::resolver::error::QueryError;
use crate::resolver::query::Job;
use crate::utils::serialize::ser_duration_ms;

/// Read-only projection of one resource record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Answer {
    ttl: u32,
    name: String,
    value: String,
}

impl Answer {
    pub fn new<N: Into<String>, V: Into<String>>(ttl: u32, name: N, value: V) -> Answer {
        Answer {
            ttl,
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl From<&Record> for Answer {
    fn from(record: &Record) -> Self {
        Answer {
            ttl: record.ttl(),
            name: record.name().to_string(),
            value: record.data().to_string(),
        }
    }
}

/// Successful exchange as reported by a `QueryExecutor`
#[derive(Debug, Clone)]
pub struct Exchange {
    pub elapsed: Duration,
    pub answers: Vec<Answer>,
    /// DNS response code, e.g. "No Error"; a non-zero code does not make the exchange a failure.
    pub response_code: String,
    /// Extended validation was requested, but the nameserver did not honor it.
    pub degraded: bool,
}

/// Failed exchange as reported by a `QueryExecutor`
#[derive(Debug, Clone)]
pub struct Failure {
    pub elapsed: Duration,
    pub error: QueryError,
}

impl Failure {
    pub fn new(elapsed: Duration, error: QueryError) -> Failure {
        Failure { elapsed, error }
    }

    /// Failure before anything has been sent; no time has been spent.
    pub fn pre_flight(error: QueryError) -> Failure {
        Failure {
            elapsed: Duration::ZERO,
            error,
        }
    }
}

pub type Outcome = std::result::Result<Exchange, Failure>;

/// Timed outcome of exactly one `Job`
///
/// A failed result never carries answers.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    job: Job,
    #[serde(serialize_with = "ser_duration_ms", rename = "elapsed_ms")]
    elapsed: Duration,
    answers: Vec<Answer>,
    response_code: Option<String>,
    degraded: bool,
    failure: Option<QueryError>,
}

impl QueryResult {
    pub fn success(job: Job, exchange: Exchange) -> QueryResult {
        QueryResult {
            job,
            elapsed: exchange.elapsed,
            answers: exchange.answers,
            response_code: Some(exchange.response_code),
            degraded: exchange.degraded,
            failure: None,
        }
    }

    pub fn failed(job: Job, failure: Failure) -> QueryResult {
        QueryResult {
            job,
            elapsed: failure.elapsed,
            answers: Vec::new(),
            response_code: None,
            degraded: false,
            failure: Some(failure.error),
        }
    }

    pub fn from_outcome(job: Job, outcome: Outcome) -> QueryResult {
        match outcome {
            Ok(exchange) => QueryResult::success(job, exchange),
            Err(failure) => QueryResult::failed(job, failure),
        }
    }

    pub fn job(&self) -> &Job {
        &self.job
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    pub fn response_code(&self) -> Option<&str> {
        self.response_code.as_deref()
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn failure(&self) -> Option<&QueryError> {
        self.failure.as_ref()
    }

    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    pub fn is_failure(&self) -> bool {
        self.failure.is_some()
    }
}
