//! nsbench measures the performance of DNS nameservers.
//!
//! A batch of lookups is sent to each nameserver under test through a bounded worker pool, every
//! response is timed, and the nameservers are ranked by mean latency and reliability.
//!
//! # Example
//! ```no_run
//! # use nsbench::benchmark::{Benchmark, BenchmarkOpts};
//! # use nsbench::nameserver::NameServerConfigGroup;
//! # use nsbench::resolver::UdpExecutor;
//! # use nsbench::statistics::ranking::Ranking;
//! # use tokio_util::sync::CancellationToken;
//! # #[tokio::main]
//! # async fn main() -> nsbench::Result<()> {
//! let nameservers = NameServerConfigGroup::parse_list("8.8.8.8,1.1.1.1")?;
//! let domains = vec!["example.com".to_string(), "example.org".to_string()];
//! let benchmark = Benchmark::new(UdpExecutor::default(), BenchmarkOpts::default());
//! let results = benchmark.run(&nameservers, &domains, &CancellationToken::new()).await?;
//! let ranking = Ranking::summarize(&results);
//! for summary in ranking.fastest() {
//!     println!("{}", summary.name_server());
//! }
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]

pub use error::Error;
pub use hickory_proto::rr::RecordType;

pub mod benchmark;
pub mod domains;
pub mod error;
pub mod nameserver;
pub mod queue;
pub mod resolver;
pub mod statistics;
pub mod system_config;
pub mod utils;

#[cfg(feature = "app-cli")]
pub mod app;

pub type Result<T> = std::result::Result<T, Error>;
