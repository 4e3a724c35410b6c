//! Host names from the Chrome browser history
//!
//! Chrome keeps its history database locked while running, so the database is copied into a
//! temporary file first. The copy is removed when it goes out of scope, no matter how reading ends.

use std::env;
use std::path::{Path, PathBuf};

use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{ConnectOptions, Connection};
use tempfile::NamedTempFile;
use tracing::{debug, trace};
use url::{Host, Url};

use crate::{Error, Result};

// Chrome stores visit times as microseconds since 1601-01-01.
static VISITED_URLS_QUERY: &str = r#"SELECT urls.url FROM visits
 LEFT JOIN urls ON visits.url = urls.id
 WHERE (visits.visit_time - 11644473600000000 > strftime('%s', date('now', '-' || ?1 || ' day')) * 1000000)
 ORDER BY visits.visit_time DESC"#;

/// External host names of all URLs visited within the last `days` days
///
/// The first history database that yields any URLs is used.
pub async fn chrome_hostnames(days: u32) -> Result<Vec<String>> {
    let mut last_err = None;

    for path in chrome_history_paths() {
        if fs_exists(&path).await {
            trace!("Reading Chrome history from '{}'.", path.display());
        } else {
            trace!("No Chrome history at '{}'.", path.display());
            continue;
        }
        match visited_urls(&path, days).await {
            Ok(urls) if !urls.is_empty() => {
                debug!("Read {} URLs from Chrome history '{}'.", urls.len(), path.display());
                return Ok(external_hostnames(&urls));
            }
            Ok(_) => debug!("Chrome history '{}' holds no recent URLs.", path.display()),
            Err(err) => {
                debug!("Failed to read Chrome history '{}': {}", path.display(), err);
                last_err = Some(err);
            }
        }
    }

    Err(last_err.unwrap_or_else(|| Error::DomainSourceError {
        reason: "no readable Chrome history found".to_string(),
    }))
}

fn chrome_history_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(home) = env::var_os("HOME").map(PathBuf::from) {
        paths.push(home.join("Library/Application Support/Google/Chrome/Default/History"));
        paths.push(home.join(".config/google-chrome/Default/History"));
        paths.push(home.join(".config/chromium/Default/History"));
    }
    if let Some(local_app_data) = env::var_os("LOCALAPPDATA").map(PathBuf::from) {
        paths.push(local_app_data.join("Google/Chrome/User Data/Default/History"));
    }
    if let Some(app_data) = env::var_os("APPDATA").map(PathBuf::from) {
        paths.push(app_data.join("Google/Chrome/User Data/Default/History"));
    }
    paths
}

async fn fs_exists(path: &Path) -> bool {
    tokio::fs::metadata(path).await.map(|x| x.is_file()).unwrap_or(false)
}

pub(crate) async fn visited_urls(path: &Path, days: u32) -> Result<Vec<String>> {
    let copy = unlocked_copy(path).await?;

    let mut conn = SqliteConnectOptions::new()
        .filename(copy.path())
        .read_only(true)
        .connect()
        .await
        .map_err(sqlite_error)?;
    let urls: Vec<Option<String>> = sqlx::query_scalar(VISITED_URLS_QUERY)
        .bind(i64::from(days))
        .fetch_all(&mut conn)
        .await
        .map_err(sqlite_error)?;
    if let Err(err) = conn.close().await {
        debug!("Failed to close Chrome history copy: {}", err);
    }

    Ok(urls.into_iter().flatten().collect())
}

async fn unlocked_copy(path: &Path) -> Result<NamedTempFile> {
    let copy = tempfile::Builder::new()
        .prefix("nsbench-history-")
        .suffix(".db")
        .tempfile()?;
    let bytes = tokio::fs::copy(path, copy.path()).await?;
    trace!(
        "Copied {} bytes of '{}' to '{}'.",
        bytes,
        path.display(),
        copy.path().display()
    );

    Ok(copy)
}

fn sqlite_error(err: sqlx::Error) -> Error {
    Error::DomainSourceError {
        reason: format!("failed to read history database: {}", err),
    }
}

/// Host names of `urls` that denote hosts on the internet
///
/// IP addresses, single label names, and local names are dropped.
pub fn external_hostnames<T: AsRef<str>>(urls: &[T]) -> Vec<String> {
    urls.iter()
        .filter_map(|x| Url::parse(x.as_ref()).ok())
        .filter_map(|url| match url.host() {
            Some(Host::Domain(domain)) => Some(domain.trim_end_matches('.').to_lowercase()),
            _ => None,
        })
        .filter(|x| is_external(x))
        .collect()
}

fn is_external(host: &str) -> bool {
    host.contains('.')
        && host != "localhost"
        && !host.ends_with(".localhost")
        && !host.ends_with(".local")
        && !host.ends_with(".internal")
}

#[cfg(test)]
mod tests {
    use spectral::prelude::*;

    use super::*;

    #[test]
    fn external_hostnames_only() {
        let urls = vec![
            "https://www.example.com/index.html",
            "http://192.168.0.1/admin",
            "http://[::1]:8080/",
            "http://localhost:3000/",
            "http://printer.local/",
            "chrome://settings/",
            "file:///home/user/index.html",
            "not a url",
            "https://Docs.Example.org./path?q=1",
        ];

        let hosts = external_hostnames(&urls);

        assert_that(&hosts).is_equal_to(vec!["www.example.com".to_string(), "docs.example.org".to_string()]);
    }

    #[tokio::test]
    async fn read_recent_visits_from_copy() {
        crate::utils::tests::logging::init();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("History");

        let mut conn = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true)
            .connect()
            .await
            .unwrap();
        sqlx::query("CREATE TABLE urls (id INTEGER PRIMARY KEY, url LONGVARCHAR)")
            .execute(&mut conn)
            .await
            .unwrap();
        sqlx::query("CREATE TABLE visits (id INTEGER PRIMARY KEY, url INTEGER NOT NULL, visit_time INTEGER NOT NULL)")
            .execute(&mut conn)
            .await
            .unwrap();
        let now = (chrono::Utc::now().timestamp() + 11_644_473_600) * 1_000_000;
        let year_ago = now - 365 * 24 * 3600 * 1_000_000;
        for (id, url, visit_time) in [
            (1, "https://recent.example.com/", now),
            (2, "https://old.example.com/", year_ago),
        ] {
            sqlx::query("INSERT INTO urls (id, url) VALUES (?1, ?2)")
                .bind(id)
                .bind(url)
                .execute(&mut conn)
                .await
                .unwrap();
            sqlx::query("INSERT INTO visits (url, visit_time) VALUES (?1, ?2)")
                .bind(id)
                .bind(visit_time)
                .execute(&mut conn)
                .await
                .unwrap();
        }
        conn.close().await.unwrap();

        let urls = visited_urls(&path, 30).await.unwrap();

        assert_that(&urls).is_equal_to(vec!["https://recent.example.com/".to_string()]);
    }

    #[tokio::test]
    async fn missing_database() {
        let res = visited_urls(Path::new("/this/history/does/not/exist"), 30).await;

        assert_that(&res).is_err();
    }
}
