use std::sync::Arc;

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::nameserver::NameServerConfig;
use crate::utils::serialize::ser_to_string;

/// A single query to execute: one name, one record type, one nameserver.
///
/// Jobs are immutable once created. The nameserver is shared, so cloning a `Job` is cheap.
#[derive(Debug, Clone, Serialize)]
pub struct Job {
    #[serde(serialize_with = "ser_to_string")]
    name_server: Arc<NameServerConfig>,
    record_type: String,
    name: String,
    extended_validation: bool,
    #[serde(skip)]
    cancellation: CancellationToken,
}

impl Job {
    /// `name` must be fully qualified, i.e. end with a trailing `.`; it is sent as is.
    pub fn new<T: Into<String>, N: Into<String>>(
        name_server: Arc<NameServerConfig>,
        record_type: T,
        name: N,
        extended_validation: bool,
        cancellation: CancellationToken,
    ) -> Job {
        Job {
            name_server,
            record_type: record_type.into(),
            name: name.into(),
            extended_validation,
            cancellation,
        }
    }

    pub fn name_server(&self) -> &NameServerConfig {
        &self.name_server
    }

    /// Record type mnemonic, e.g. "A"
    pub fn record_type(&self) -> &str {
        &self.record_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_fqdn(&self) -> bool {
        self.name.ends_with('.')
    }

    pub fn extended_validation(&self) -> bool {
        self.extended_validation
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }
}
