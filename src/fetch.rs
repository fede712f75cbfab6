//! HTTP plumbing shared by both enrichment passes, plus the favicon
//! downloader.

use std::sync::LazyLock;
use std::time::Duration;

use anyhow::{Context, Result};
use regex::Regex;
use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

use crate::config::EnrichConfig;

static UNSAFE_CHARS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_-]").unwrap());

pub fn client(timeout: Duration, user_agent: &str) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .build()
        .context("building HTTP client")
}

/// Bare hosts are assumed to speak HTTPS.
pub fn normalize_url(raw: &str) -> String {
    if raw.starts_with("http://") || raw.starts_with("https://") {
        raw.to_string()
    } else {
        format!("https://{}", raw)
    }
}

/// GET one page and return its body. Non-2xx statuses are errors.
pub async fn fetch_page(client: &Client, url: &Url) -> Result<String> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .with_context(|| format!("requesting {}", url))?
        .error_for_status()
        .with_context(|| format!("fetching {}", url))?;
    response
        .text()
        .await
        .with_context(|| format!("reading body of {}", url))
}

pub fn domain(url: &Url) -> &str {
    url.host_str().unwrap_or_default()
}

/// Host with a leading "www." label stripped; the title pass uses this
/// as its last-resort title.
pub fn bare_domain(url: &Url) -> String {
    let host = domain(url);
    host.strip_prefix("www.").unwrap_or(host).to_string()
}

/// Every character outside [A-Za-z0-9_-] becomes one underscore.
pub fn sanitize_domain(domain: &str) -> String {
    UNSAFE_CHARS.replace_all(domain, "_").into_owned()
}

/// Download a favicon and store it under a name derived from the page's
/// domain, overwriting any previous copy. Returns the catalog-relative
/// reference; the caller substitutes the default on failure.
pub async fn download_favicon(
    client: &Client,
    icon_url: &Url,
    domain: &str,
    cfg: &EnrichConfig,
) -> Result<String> {
    let filename = format!("{}.png", sanitize_domain(domain));
    let bytes = fetch_bytes(client, icon_url.as_str()).await?;
    let path = cfg.logo_dir.join(&filename);
    std::fs::write(&path, bytes).with_context(|| format!("writing favicon {}", path.display()))?;
    debug!("stored favicon for {} at {}", domain, path.display());
    Ok(format!("{}/{}", cfg.logo_prefix, filename))
}

/// Make sure the logo directory and the shared fallback image exist
/// before a pass starts. Tries a well-known icon once; an empty
/// placeholder also satisfies existence.
pub async fn ensure_default_logo(client: &Client, cfg: &EnrichConfig) -> Result<()> {
    std::fs::create_dir_all(&cfg.logo_dir)
        .with_context(|| format!("creating {}", cfg.logo_dir.display()))?;
    let path = cfg.default_logo_path();
    if path.exists() {
        return Ok(());
    }
    let bytes = match fetch_bytes(client, &cfg.fallback_icon_url).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("fallback icon fetch failed: {}", e);
            Vec::new()
        }
    };
    std::fs::write(&path, bytes).with_context(|| format!("writing {}", path.display()))
}

async fn fetch_bytes(client: &Client, url: &str) -> Result<Vec<u8>> {
    let response = client.get(url).send().await?.error_for_status()?;
    Ok(response.bytes().await?.to_vec())
}

// ── Tests ──
