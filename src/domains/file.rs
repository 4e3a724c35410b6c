use std::path::Path;

use tokio::fs;

use crate::Result;

/// Reads one domain per line. Blank lines and lines starting with `#` or `//` are skipped.
pub async fn load<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let content = fs::read_to_string(path.as_ref()).await?;
    Ok(parse(&content))
}

pub fn parse(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|x| !x.is_empty() && !x.starts_with('#') && !x.starts_with("//"))
        .map(ToString::to_string)
        .collect()
}
