//! Loading spec text from a file, stdin or URL, with optional hash pinning.

use anyhow::Context as _;
use clap::ValueEnum;
use sha2::{Digest as _, Sha256};
use std::fmt;
use std::io::Read as _;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub const DEFAULT_MAX_SPEC_BYTES: usize = 16 * 1024 * 1024;

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Where a spec is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecSource {
    Stdin,
    File(PathBuf),
    Url(Url),
}

impl SpecSource {
    /// `-` is stdin, `http(s)://` is a URL, anything else a file path.
    pub fn parse(location: &str) -> anyhow::Result<Self> {
        if location == "-" {
            return Ok(Self::Stdin);
        }
        if location.starts_with("http://") || location.starts_with("https://") {
            let url = Url::parse(location)
                .with_context(|| format!("invalid spec URL '{location}'"))?;
            return Ok(Self::Url(url));
        }
        Ok(Self::File(PathBuf::from(location)))
    }

    /// Read the whole spec as UTF-8 text, refusing anything over `max_bytes`.
    pub async fn read(&self, max_bytes: usize) -> anyhow::Result<String> {
        match self {
            Self::Stdin => {
                let mut buf = Vec::new();
                std::io::stdin()
                    .take(max_bytes as u64 + 1)
                    .read_to_end(&mut buf)
                    .context("read spec from stdin")?;
                into_text(buf, max_bytes, "stdin")
            }
            Self::File(path) => {
                tracing::info!(path = %path.display(), "loading spec");
                let len = std::fs::metadata(path)
                    .with_context(|| format!("read spec {}", path.display()))?
                    .len();
                if len > max_bytes as u64 {
                    anyhow::bail!(
                        "spec {} too large: {len} bytes (limit {max_bytes})",
                        path.display()
                    );
                }
                let bytes =
                    std::fs::read(path).with_context(|| format!("read spec {}", path.display()))?;
                into_text(bytes, max_bytes, &path.display().to_string())
            }
            Self::Url(url) => {
                tracing::info!(url = %url, "fetching spec");
                fetch(url, max_bytes).await
            }
        }
    }
}

impl fmt::Display for SpecSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdin => f.write_str("<stdin>"),
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => write!(f, "{url}"),
        }
    }
}

async fn fetch(url: &Url, max_bytes: usize) -> anyhow::Result<String> {
    let client = reqwest::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()
        .context("build HTTP client")?;

    let mut response = client
        .get(url.clone())
        .send()
        .await
        .with_context(|| format!("fetch spec {url}"))?
        .error_for_status()
        .with_context(|| format!("fetch spec {url}"))?;

    if let Some(len) = response.content_length()
        && len > max_bytes as u64
    {
        anyhow::bail!("spec {url} too large: {len} bytes (limit {max_bytes})");
    }

    let mut out: Vec<u8> = Vec::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .with_context(|| format!("read spec body {url}"))?
    {
        if out.len().saturating_add(chunk.len()) > max_bytes {
            anyhow::bail!("spec {url} too large: exceeded {max_bytes} bytes");
        }
        out.extend_from_slice(&chunk);
    }

    into_text(out, max_bytes, url.as_str())
}

fn into_text(bytes: Vec<u8>, max_bytes: usize, origin: &str) -> anyhow::Result<String> {
    if bytes.len() > max_bytes {
        anyhow::bail!("spec {origin} too large: exceeded {max_bytes} bytes");
    }
    String::from_utf8(bytes).with_context(|| format!("spec {origin} is not valid UTF-8"))
}

/// What to do when the spec does not match its pinned hash.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum HashPolicy {
    /// Log a warning and continue.
    #[default]
    Warn,
    /// Abort.
    Fail,
    /// Do not check.
    Ignore,
}

/// `sha256:<hex>` digest of the raw spec text.
pub fn spec_hash(content: &str) -> String {
    format!("sha256:{}", hex::encode(Sha256::digest(content.as_bytes())))
}

/// Compare the spec against `expected` and apply `policy` on mismatch.
pub fn verify_hash(content: &str, expected: &str, policy: HashPolicy) -> anyhow::Result<()> {
    if policy == HashPolicy::Ignore {
        return Ok(());
    }
    let actual = spec_hash(content);
    if actual.eq_ignore_ascii_case(expected.trim()) {
        return Ok(());
    }
    match policy {
        HashPolicy::Fail => {
            anyhow::bail!("Spec hash mismatch. Expected: {expected}, Got: {actual}")
        }
        HashPolicy::Warn => {
            tracing::warn!(expected, actual = %actual, "spec hash mismatch");
            Ok(())
        }
        HashPolicy::Ignore => Ok(()),
    }
}
