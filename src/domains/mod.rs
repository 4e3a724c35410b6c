//! Domains to benchmark with
//!
//! Domains come from the browser history, a file, or a built-in list. Whenever the history or a
//! file cannot be read or yields nothing, the built-in list is used instead.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use indexmap::IndexSet;
use rand::seq::SliceRandom;
use serde::Serialize;
use tracing::{debug, warn};

use crate::{Error, Result};

pub mod file;
#[cfg(feature = "history")]
pub mod history;

pub static DEFAULT_DOMAINS: &[&str] = &[
    "google.com",
    "cloudflare.com",
    "amazon.com",
    "wikipedia.org",
    "twitter.com",
    "facebook.com",
    "youtube.com",
    "instagram.com",
    "linkedin.com",
    "netflix.com",
];

pub const DEFAULT_COUNT: usize = 20;
pub const DEFAULT_HISTORY_DAYS: u32 = 30;

pub fn default_domains() -> Vec<String> {
    DEFAULT_DOMAINS.iter().map(ToString::to_string).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DomainSource {
    History,
    DefaultList,
    File(PathBuf),
}

impl FromStr for DomainSource {
    type Err = Error;

    fn from_str(str: &str) -> std::result::Result<Self, Self::Err> {
        match str.trim() {
            "" => Err(Error::ParserError {
                what: str.to_string(),
                to: "DomainSource",
                why: "empty domain source".to_string(),
            }),
            "history" => Ok(DomainSource::History),
            "default_list" => Ok(DomainSource::DefaultList),
            path => Ok(DomainSource::File(PathBuf::from(path))),
        }
    }
}

impl fmt::Display for DomainSource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DomainSource::History => f.write_str("history"),
            DomainSource::DefaultList => f.write_str("default_list"),
            DomainSource::File(path) => write!(f, "file '{}'", path.display()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DomainSelection {
    pub source: DomainSource,
    /// Maximum number of domains to select
    pub limit: usize,
    /// How far back to look into the browser history
    pub history_days: u32,
}

impl Default for DomainSelection {
    fn default() -> Self {
        DomainSelection {
            source: DomainSource::History,
            limit: DEFAULT_COUNT,
            history_days: DEFAULT_HISTORY_DAYS,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SelectedDomains {
    pub domains: Vec<String>,
    /// Source the domains have actually been taken from
    pub source: DomainSource,
    /// Why the requested source has been replaced by the default list
    pub fallback_reason: Option<String>,
}

impl DomainSelection {
    pub fn new(source: DomainSource, limit: usize, history_days: u32) -> DomainSelection {
        DomainSelection {
            source,
            limit,
            history_days,
        }
    }

    /// Loads, de-duplicates, and samples up to `limit` domains.
    ///
    /// Never fails: if the requested source fails or yields no domains, the default list is used.
    pub async fn select(&self) -> SelectedDomains {
        let (pool, source, fallback_reason) = match self.load().await.map(uniq) {
            Ok(domains) if !domains.is_empty() => (domains, self.source.clone(), None),
            Ok(_) => {
                let reason = format!("{} yielded no domains", self.source);
                warn!("{}; falling back to default domain list.", reason);
                (uniq(default_domains()), DomainSource::DefaultList, Some(reason))
            }
            Err(err) => {
                let reason = format!("failed to read domains from {}: {}", self.source, err);
                warn!("{}; falling back to default domain list.", reason);
                (uniq(default_domains()), DomainSource::DefaultList, Some(reason))
            }
        };

        debug!("Loaded {} unique domains from {}.", pool.len(), source);
        let domains = sample(pool, self.limit);

        SelectedDomains {
            domains,
            source,
            fallback_reason,
        }
    }

    async fn load(&self) -> Result<Vec<String>> {
        match &self.source {
            DomainSource::DefaultList => Ok(default_domains()),
            DomainSource::File(path) => file::load(path).await,
            DomainSource::History => load_history(self.history_days).await,
        }
    }
}

#[cfg(feature = "history")]
async fn load_history(days: u32) -> Result<Vec<String>> {
    history::chrome_hostnames(days).await
}

#[cfg(not(feature = "history"))]
async fn load_history(_days: u32) -> Result<Vec<String>> {
    Err(Error::DomainSourceError {
        reason: "browser history support is not available".to_string(),
    })
}

/// Removes duplicates, keeping the first occurrence of each domain.
///
/// Domains are compared in their normalized form: lowercase and without a trailing `.`.
pub fn uniq(domains: Vec<String>) -> Vec<String> {
    let unique: IndexSet<String> = domains.iter().filter_map(|x| normalize(x)).collect();
    unique.into_iter().collect()
}

fn normalize(domain: &str) -> Option<String> {
    let domain = domain.trim().trim_end_matches('.');
    if domain.is_empty() {
        None
    } else {
        Some(domain.to_lowercase())
    }
}

/// Draws up to `limit` distinct domains at random.
///
/// If the pool holds no more than `limit` domains, it is returned as is.
pub fn sample(mut pool: Vec<String>, limit: usize) -> Vec<String> {
    if limit >= pool.len() {
        return pool;
    }
    pool.shuffle(&mut rand::rng());
    pool.truncate(limit);
    pool
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::io::Write;

    use spectral::prelude::*;

    use super::*;

    #[test]
    fn parse_domain_source() {
        assert_that(&DomainSource::from_str("history")).is_ok().is_equal_to(DomainSource::History);
        assert_that(&DomainSource::from_str("default_list"))
            .is_ok()
            .is_equal_to(DomainSource::DefaultList);
        assert_that(&DomainSource::from_str("domains.txt"))
            .is_ok()
            .is_equal_to(DomainSource::File(PathBuf::from("domains.txt")));
        assert_that(&DomainSource::from_str(" ")).is_err();
    }

    #[test]
    fn uniq_keeps_first_occurrence() {
        let domains = vec!["b.com", "a.com", "b.com", "c.com", "a.com"]
            .into_iter()
            .map(ToString::to_string)
            .collect();

        assert_that(&uniq(domains)).is_equal_to(vec!["b.com".to_string(), "a.com".to_string(), "c.com".to_string()]);
    }

    #[test]
    fn uniq_ignores_case_and_trailing_dot() {
        let domains = vec!["example.com", "example.com.", "EXAMPLE.com", " Example.org ", "."]
            .into_iter()
            .map(ToString::to_string)
            .collect();

        assert_that(&uniq(domains)).is_equal_to(vec!["example.com".to_string(), "example.org".to_string()]);
    }

    #[tokio::test]
    async fn file_variants_of_one_domain_are_one_domain() {
        crate::utils::tests::logging::init();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "example.com\nexample.com.\nEXAMPLE.com").unwrap();
        let selection = DomainSelection::new(DomainSource::File(file.path().to_path_buf()), 3, 30);

        let selected = selection.select().await;

        assert_that(&selected.domains).is_equal_to(vec!["example.com".to_string()]);
        assert_that(&selected.fallback_reason).is_none();
    }

    #[test]
    fn sample_without_repetition() {
        let pool: Vec<String> = (0..100).map(|i| format!("d{}.example.com", i)).collect();

        let sampled = sample(pool.clone(), 10);

        assert_that(&sampled.len()).is_equal_to(10);
        let unique: HashSet<_> = sampled.iter().collect();
        assert_that(&unique.len()).is_equal_to(10);
        assert_that(&sampled.iter().all(|x| pool.contains(x))).is_true();
    }

    #[test]
    fn sample_small_pool_verbatim() {
        let pool = default_domains();

        assert_that(&sample(pool.clone(), 20)).is_equal_to(&pool);
        assert_that(&sample(pool.clone(), 10)).is_equal_to(&pool);
        assert_that(&sample(pool, 0).is_empty()).is_true();
    }

    #[tokio::test]
    async fn default_list_is_used_verbatim() {
        crate::utils::tests::logging::init();
        let selection = DomainSelection::new(DomainSource::DefaultList, 20, 30);

        let selected = selection.select().await;

        assert_that(&selected.domains).is_equal_to(default_domains());
        assert_that(&selected.source).is_equal_to(DomainSource::DefaultList);
        assert_that(&selected.fallback_reason).is_none();
    }

    #[tokio::test]
    async fn default_list_capped_by_count() {
        let selection = DomainSelection::new(DomainSource::DefaultList, 3, 30);

        let selected = selection.select().await;

        assert_that(&selected.domains.len()).is_equal_to(3);
        assert_that(&selected.domains.iter().all(|x| DEFAULT_DOMAINS.contains(&x.as_str()))).is_true();
    }

    #[tokio::test]
    async fn unreadable_file_falls_back_to_default_list() {
        crate::utils::tests::logging::init();
        let selection = DomainSelection::new(
            DomainSource::File(PathBuf::from("/this/file/does/not/exist.txt")),
            20,
            30,
        );

        let selected = selection.select().await;

        assert_that(&selected.domains).is_equal_to(default_domains());
        assert_that(&selected.source).is_equal_to(DomainSource::DefaultList);
        assert_that(&selected.fallback_reason).is_some();
    }
}
