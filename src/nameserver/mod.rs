//! Nameservers under test.
//!
//! A nameserver is identified by its host and port. Its canonical textual form is `host:port`
//! (`[v6]:port` for IPv6 addresses); a missing port defaults to 53, so `9.9.9.9` and
//! `9.9.9.9:53` denote the same nameserver.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::str::FromStr;

use resolv_conf::ScopedIp;
use serde::Serialize;

use crate::utils::serialize::ser_to_string;
use crate::{system_config, Error, Result};

mod parser;
pub mod predefined;

pub const DEFAULT_PORT: u16 = 53;

#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum Host {
    Ip(IpAddr),
    Name(String),
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Host::Ip(IpAddr::V4(ip)) => write!(f, "{}", ip),
            Host::Ip(IpAddr::V6(ip)) => write!(f, "[{}]", ip),
            Host::Name(name) => f.write_str(name),
        }
    }
}

/// Nameserver identified by host and port; the optional label does not take part in equality.
#[derive(Debug, Clone, Serialize)]
pub struct NameServerConfig {
    #[serde(serialize_with = "ser_to_string")]
    host: Host,
    port: u16,
    name: Option<String>,
}

impl NameServerConfig {
    pub fn new(host: Host, port: u16) -> Self {
        NameServerConfig { host, port, name: None }
    }

    pub fn udp<T: Into<SocketAddr>>(socket_addr: T) -> Self {
        NameServerConfig::udp_with_name(socket_addr, None)
    }

    pub fn udp_with_name<T: Into<SocketAddr>, S: Into<Option<String>>>(socket_addr: T, name: S) -> Self {
        let socket_addr = socket_addr.into();
        NameServerConfig {
            host: Host::Ip(socket_addr.ip()),
            port: socket_addr.port(),
            name: name.into(),
        }
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Optional human readable label, e.g. "Google"
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Socket address without name resolution; `None` if the host is a name.
    pub fn socket_addr(&self) -> Option<SocketAddr> {
        match self.host {
            Host::Ip(ip) => Some(SocketAddr::new(ip, self.port)),
            Host::Name(_) => None,
        }
    }

    /// Socket address of this nameserver, resolving host names with the system resolver.
    pub async fn resolve(&self) -> io::Result<SocketAddr> {
        match &self.host {
            Host::Ip(ip) => Ok(SocketAddr::new(*ip, self.port)),
            Host::Name(name) => tokio::net::lookup_host((name.as_str(), self.port))
                .await?
                .next()
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("no address found for '{}'", name))),
        }
    }
}

impl PartialEq for NameServerConfig {
    fn eq(&self, other: &Self) -> bool {
        self.host == other.host && self.port == other.port
    }
}

impl Eq for NameServerConfig {}

impl Hash for NameServerConfig {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.host.hash(state);
        self.port.hash(state);
    }
}

impl FromStr for NameServerConfig {
    type Err = Error;

    fn from_str(str: &str) -> std::result::Result<Self, Self::Err> {
        let str = str.trim();
        match parser::parsed_name_server(str) {
            Ok((_, parsed)) => Ok(NameServerConfig::new(parsed.target.into(), parsed.port.unwrap_or(DEFAULT_PORT))),
            Err(nom::Err::Incomplete(_)) => Err(Error::ParserError {
                what: str.to_string(),
                to: "NameServerConfig",
                why: "input is incomplete".to_string(),
            }),
            Err(nom::Err::Error(err)) | Err(nom::Err::Failure(err)) => Err(Error::ParserError {
                what: str.to_string(),
                to: "NameServerConfig",
                why: err.code.description().to_string(),
            }),
        }
    }
}

impl fmt::Display for NameServerConfig {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{}:{}", self.host, self.port)
    }
}

impl From<parser::Target<'_>> for Host {
    fn from(target: parser::Target<'_>) -> Self {
        match target {
            parser::Target::Ipv4(ip) => Host::Ip(IpAddr::V4(ip)),
            parser::Target::Ipv6(ip) => Host::Ip(IpAddr::V6(ip)),
            parser::Target::Name(name) => Host::Name(name.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NameServerConfigGroup {
    configs: Vec<NameServerConfig>,
}

impl NameServerConfigGroup {
    pub fn new(configs: Vec<NameServerConfig>) -> NameServerConfigGroup {
        NameServerConfigGroup { configs }
    }

    /// Parses a comma separated list of `host[:port]` specifications.
    ///
    /// Surrounding whitespace is trimmed and empty entries are skipped, so `",,"` yields an empty
    /// group.
    pub fn parse_list(list: &str) -> Result<NameServerConfigGroup> {
        let configs: Result<Vec<_>> = list
            .split(',')
            .map(str::trim)
            .filter(|x| !x.is_empty())
            .map(NameServerConfig::from_str)
            .collect();

        Ok(NameServerConfigGroup::new(configs?))
    }

    /// Loads nameservers from local system configuration.
    ///
    /// Unix: Parses `/etc/resolv.conf`.
    pub fn from_system_config() -> Result<Self> {
        let configs = system_config::load_from_system_config()?;
        Ok(configs)
    }

    pub fn from_system_config_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let configs = system_config::load_from_system_config_path(path)?;
        Ok(configs)
    }

    /// Merges this `NameServerConfigGroup` with another
    ///
    /// Nameservers already present are not added twice.
    pub fn merge(&mut self, other: Self) {
        for config in other.configs {
            if !self.configs.contains(&config) {
                self.configs.push(config);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<NameServerConfig> {
        self.configs.iter()
    }
}

impl IntoIterator for NameServerConfigGroup {
    type Item = NameServerConfig;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.configs.into_iter()
    }
}

impl<'a> IntoIterator for &'a NameServerConfigGroup {
    type Item = &'a NameServerConfig;
    type IntoIter = std::slice::Iter<'a, NameServerConfig>;

    fn into_iter(self) -> Self::IntoIter {
        self.configs.iter()
    }
}

impl From<Vec<NameServerConfig>> for NameServerConfigGroup {
    fn from(configs: Vec<NameServerConfig>) -> Self {
        NameServerConfigGroup::new(configs)
    }
}

#[doc(hidden)]
impl From<resolv_conf::Config> for NameServerConfigGroup {
    fn from(config: resolv_conf::Config) -> Self {
        let configs: Vec<NameServerConfig> = config
            .nameservers
            .into_iter()
            .map(|ip| match ip {
                ScopedIp::V4(ipv4) => NameServerConfig::udp_with_name((ipv4, DEFAULT_PORT), "System".to_string()),
                ScopedIp::V6(ipv6, _) => NameServerConfig::udp_with_name((ipv6, DEFAULT_PORT), "System".to_string()),
            })
            .collect();
        NameServerConfigGroup::new(configs)
    }
}
