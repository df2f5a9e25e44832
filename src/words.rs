use anyhow::Context;
use std::fs;
use std::path::Path;

/// Split newline-delimited text into words. Carriage returns are dropped
/// first; blank lines become empty words.
pub fn parse_words(raw: &str) -> Vec<String> {
    raw.replace('\r', "")
        .split('\n')
        .map(str::to_owned)
        .collect()
}

/// Read and split the word source at `path`
pub fn load_words(path: &Path) -> anyhow::Result<Vec<String>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read word source {}", path.display()))?;
    let words = parse_words(&raw);

    tracing::info!(path = %path.display(), words = words.len(), "word source loaded");
    Ok(words)
}
