//! Query execution
//!
//! A `QueryExecutor` performs exactly one request/response exchange per `Job` and reports either an
//! `Exchange` or a typed `Failure`. `UdpExecutor` is the executor sending plain DNS over UDP.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::str::FromStr;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use hickory_proto::op::{Edns, Message, MessageType, OpCode, Query};
use hickory_proto::rr::{Name, RecordType};
use tokio::net::UdpSocket;
use tracing::{debug, trace};

pub use error::QueryError;
pub use lookup::{Answer, Exchange, Failure, Outcome, QueryResult};
pub use query::Job;

pub mod error;
pub mod lookup;
pub mod query;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);
pub const DEFAULT_EDNS_PAYLOAD: u16 = 4096;
const MAX_UDP_RESPONSE_SIZE: usize = 65_535;

#[async_trait]
pub trait QueryExecutor: Send + Sync + 'static {
    /// Executes `job` with exactly one network exchange and no retries.
    ///
    /// Implementations must honor the job's cancellation token and must not normalize the query
    /// name.
    async fn execute(&self, job: &Job) -> Outcome;
}

#[derive(Debug, Clone)]
pub struct UdpExecutorOpts {
    pub timeout: Duration,
    /// UDP payload size advertised via EDNS(0) when extended validation is requested
    pub edns_payload: u16,
}

impl Default for UdpExecutorOpts {
    fn default() -> Self {
        UdpExecutorOpts {
            timeout: DEFAULT_TIMEOUT,
            edns_payload: DEFAULT_EDNS_PAYLOAD,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct UdpExecutor {
    opts: UdpExecutorOpts,
}

impl UdpExecutor {
    pub fn new(opts: UdpExecutorOpts) -> UdpExecutor {
        UdpExecutor { opts }
    }

    pub fn opts(&self) -> &UdpExecutorOpts {
        &self.opts
    }

    fn build_query(&self, job: &Job) -> std::result::Result<(u16, Vec<u8>), QueryError> {
        let record_type = RecordType::from_str(job.record_type()).map_err(|_| QueryError::UnknownRecordType {
            record_type: job.record_type().to_string(),
        })?;
        let name = Name::from_str(job.name()).map_err(|e| QueryError::InvalidQuery {
            reason: format!("invalid name '{}': {}", job.name(), e),
        })?;

        let id: u16 = rand::random();
        let mut message = Message::new();
        message
            .set_id(id)
            .set_message_type(MessageType::Query)
            .set_op_code(OpCode::Query)
            .set_recursion_desired(true)
            .add_query(Query::query(name, record_type));
        if job.extended_validation() {
            let mut edns = Edns::new();
            edns.set_max_payload(self.opts.edns_payload);
            edns.set_dnssec_ok(true);
            message.set_edns(edns);
        }

        let bytes = message.to_vec().map_err(|e| QueryError::InvalidQuery { reason: e.to_string() })?;

        Ok((id, bytes))
    }

    /// Resolves the nameserver and performs the exchange; the elapsed time covers the round trip only.
    async fn resolve_and_exchange(
        &self,
        job: &Job,
        id: u16,
        request: &[u8],
    ) -> std::result::Result<(Message, Duration), QueryError> {
        let addr = job.name_server().resolve().await.map_err(QueryError::transport)?;
        let start_time = Instant::now();
        let message = self.exchange(addr, id, request).await?;

        Ok((message, start_time.elapsed()))
    }

    async fn exchange(&self, addr: SocketAddr, id: u16, request: &[u8]) -> std::result::Result<Message, QueryError> {
        let bind_addr: SocketAddr = if addr.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };
        let socket = UdpSocket::bind(bind_addr).await.map_err(QueryError::transport)?;
        socket.connect(addr).await.map_err(QueryError::transport)?;
        socket.send(request).await.map_err(QueryError::transport)?;

        let mut buf = vec![0u8; MAX_UDP_RESPONSE_SIZE];
        loop {
            let len = socket.recv(&mut buf).await.map_err(QueryError::transport)?;
            let message = Message::from_vec(&buf[..len]).map_err(QueryError::malformed)?;
            if message.id() != id || message.message_type() != MessageType::Response {
                debug!("Ignoring unrelated response with id {} from {}.", message.id(), addr);
                continue;
            }
            return Ok(message);
        }
    }
}

#[async_trait]
impl QueryExecutor for UdpExecutor {
    async fn execute(&self, job: &Job) -> Outcome {
        let (id, request) = self.build_query(job).map_err(Failure::pre_flight)?;
        if job.cancellation().is_cancelled() {
            return Err(Failure::pre_flight(QueryError::Cancelled));
        }
        trace!(
            "Sending query for '{}', record type {} to {}.",
            job.name(),
            job.record_type(),
            job.name_server()
        );
        let start_time = Instant::now();
        let response = tokio::select! {
            biased;
            _ = job.cancellation().cancelled() => Err(QueryError::Cancelled),
            res = tokio::time::timeout(self.opts.timeout, self.resolve_and_exchange(job, id, &request)) => {
                res.unwrap_or(Err(QueryError::Timeout))
            }
        };

        let (message, elapsed) = response.map_err(|error| Failure::new(start_time.elapsed(), error))?;
        let degraded = job.extended_validation() && message.extensions().is_none();
        if degraded {
            debug!(
                "Nameserver {} ignored extended validation for '{}'.",
                job.name_server(),
                job.name()
            );
        }

        Ok(Exchange {
            elapsed,
            answers: message.answers().iter().map(Answer::from).collect(),
            response_code: message.response_code().to_string(),
            degraded,
        })
    }
}
