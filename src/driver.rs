//! Sequential enrichment passes over the catalog: fetch each record,
//! merge, checkpoint every few records, pace between requests.

use std::future::Future;
use std::path::Path;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use scraper::Html;
use tracing::{info, warn};
use url::Url;

use crate::catalog::{is_blank, Catalog, SiteRecord};
use crate::config::EnrichConfig;
use crate::extract;
use crate::fetch;

/// What one pass did, for the CLI summary.
#[derive(Debug, Default)]
pub struct PassStats {
    pub eligible: usize,
    pub processed: usize,
    pub skipped: usize,
    pub checkpoints: usize,
}

/// Description and stored logo reference for one site, already reduced
/// to well-formed defaults on any failure.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteMetadata {
    pub description: String,
    pub logo: String,
}

/// Metadata pass: fill in description and favicon for every record that
/// still needs them, saving as it goes.
pub async fn enrich_catalog(
    catalog: &mut Catalog,
    cfg: &EnrichConfig,
    catalog_path: &Path,
    limit: Option<usize>,
) -> Result<PassStats> {
    let pages = fetch::client(cfg.page_timeout, &cfg.user_agent)?;
    let assets = fetch::client(cfg.asset_timeout, &cfg.user_agent)?;
    fetch::ensure_default_logo(&assets, cfg).await?;

    run_pass(
        catalog,
        cfg,
        limit,
        fully_populated,
        |url| fetch_site_metadata(&pages, &assets, cfg, url),
        merge_metadata,
        |c| c.save(catalog_path),
    )
    .await
}

/// Title pass: overwrite every record's description with the fetched
/// page title, with the same checkpoint and pacing rules.
pub async fn retitle_catalog(
    catalog: &mut Catalog,
    cfg: &EnrichConfig,
    catalog_path: &Path,
    limit: Option<usize>,
) -> Result<PassStats> {
    let pages = fetch::client(cfg.page_timeout, &cfg.user_agent)?;

    run_pass(
        catalog,
        cfg,
        limit,
        never_skip,
        |url| fetch_site_title(&pages, url),
        merge_title,
        |c| c.save(catalog_path),
    )
    .await
}

/// One sequential walk over every record with a URL. `skip` decides
/// whether a record needs no fetch at all; `merge` folds the fetched
/// value into the record. The catalog is saved after every
/// `checkpoint_every`-th processed record and once more at the end.
/// Processed means attempted: skipped records neither advance the
/// checkpoint counter nor trigger the pacing sleep.
pub async fn run_pass<T, F, Fut, M, S>(
    catalog: &mut Catalog,
    cfg: &EnrichConfig,
    limit: Option<usize>,
    skip: fn(&SiteRecord) -> bool,
    fetch: F,
    merge: M,
    mut save: S,
) -> Result<PassStats>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = T>,
    M: Fn(&mut SiteRecord, T),
    S: FnMut(&Catalog) -> Result<()>,
{
    let eligible = catalog
        .categories
        .iter()
        .flat_map(|c| &c.links)
        .filter(|record| !is_blank(&record.url))
        .count();
    let mut stats = PassStats {
        eligible,
        ..Default::default()
    };

    let pb = progress_bar(eligible as u64)?;

    'pass: for ci in 0..catalog.categories.len() {
        for li in 0..catalog.categories[ci].links.len() {
            let (title, url) = {
                let record = &catalog.categories[ci].links[li];
                if is_blank(&record.url) {
                    continue;
                }
                if skip(record) {
                    stats.skipped += 1;
                    pb.inc(1);
                    continue;
                }
                (record.title.clone(), record.url.clone().unwrap_or_default())
            };

            if let Some(limit) = limit {
                if stats.processed >= limit {
                    break 'pass;
                }
            }

            pb.set_message(format!("{} ({})", title, url));
            let value = fetch(url).await;
            merge(&mut catalog.categories[ci].links[li], value);
            stats.processed += 1;
            pb.inc(1);

            if stats.processed % cfg.checkpoint_every == 0 {
                save(&*catalog)?;
                stats.checkpoints += 1;
                info!("checkpoint after {} records", stats.processed);
            }

            if !cfg.request_delay.is_zero() {
                tokio::time::sleep(cfg.request_delay).await;
            }
        }
    }

    save(&*catalog)?;
    pb.finish_and_clear();
    Ok(stats)
}

fn fully_populated(record: &SiteRecord) -> bool {
    !is_blank(&record.description) && !is_blank(&record.logo)
}

fn never_skip(_: &SiteRecord) -> bool {
    false
}

/// Fill-if-missing: populated fields win over freshly fetched values.
fn merge_metadata(record: &mut SiteRecord, meta: SiteMetadata) {
    if is_blank(&record.description) {
        record.description = Some(meta.description);
    }
    if is_blank(&record.logo) {
        record.logo = Some(meta.logo);
    }
}

/// The title pass repurposes `description` as a title cache and always
/// overwrites it.
fn merge_title(record: &mut SiteRecord, title: String) {
    record.description = Some(title);
}

/// Fetch one page and reduce it to description + stored logo reference.
/// Failures never escape: transport errors, bad statuses, and missing
/// tags all collapse into empty or default fields.
pub async fn fetch_site_metadata(
    pages: &reqwest::Client,
    assets: &reqwest::Client,
    cfg: &EnrichConfig,
    raw_url: String,
) -> SiteMetadata {
    let fallback = SiteMetadata {
        description: String::new(),
        logo: cfg.default_logo_ref(),
    };

    let url = match Url::parse(&fetch::normalize_url(&raw_url)) {
        Ok(url) => url,
        Err(e) => {
            warn!("bad url {}: {}", raw_url, e);
            return fallback;
        }
    };

    let body = match fetch::fetch_page(pages, &url).await {
        Ok(body) => body,
        Err(e) => {
            warn!("page fetch failed for {}: {:#}", url, e);
            return fallback;
        }
    };

    // Html is not Send; keep it scoped so nothing holds it across the
    // favicon download await.
    let (description, icon_url) = {
        let doc = Html::parse_document(&body);
        let description = extract::description::extract(&doc)
            .map(|d| truncate_chars(&d, cfg.max_description))
            .unwrap_or_default();
        (description, extract::favicon::extract(&doc, &url))
    };

    let logo = match icon_url {
        Some(icon_url) => {
            match fetch::download_favicon(assets, &icon_url, fetch::domain(&url), cfg).await {
                Ok(reference) => reference,
                Err(e) => {
                    warn!("favicon fetch failed for {}: {:#}", url, e);
                    cfg.default_logo_ref()
                }
            }
        }
        None => cfg.default_logo_ref(),
    };

    SiteMetadata { description, logo }
}

/// Fetch one page and reduce it to a display title. Any failure falls
/// back to the bare domain.
pub async fn fetch_site_title(pages: &reqwest::Client, raw_url: String) -> String {
    let url = match Url::parse(&fetch::normalize_url(&raw_url)) {
        Ok(url) => url,
        Err(e) => {
            warn!("bad url {}: {}", raw_url, e);
            return String::new();
        }
    };
    let fallback = fetch::bare_domain(&url);

    let body = match fetch::fetch_page(pages, &url).await {
        Ok(body) => body,
        Err(e) => {
            warn!("title fetch failed for {}: {:#}", url, e);
            return fallback;
        }
    };

    let title = {
        let doc = Html::parse_document(&body);
        extract::title::extract(&doc)
    };
    title.unwrap_or(fallback)
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

fn progress_bar(len: u64) -> Result<ProgressBar> {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );
    Ok(pb)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Category;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn test_config() -> EnrichConfig {
        EnrichConfig {
            request_delay: Duration::ZERO,
            ..Default::default()
        }
    }

    fn catalog_with(n: usize) -> Catalog {
        Catalog {
            categories: vec![Category {
                taxonomy: "test".into(),
                icon: "fa-star".into(),
                links: (0..n)
                    .map(|i| SiteRecord {
                        title: format!("site {}", i),
                        url: Some(format!("example{}.com", i)),
                        ..Default::default()
                    })
                    .collect(),
            }],
        }
    }

    fn meta(description: &str, logo: &str) -> SiteMetadata {
        SiteMetadata {
            description: description.to_string(),
            logo: logo.to_string(),
        }
    }

    #[tokio::test]
    async fn checkpoint_after_every_tenth_record_plus_final_save() {
        let mut catalog = catalog_with(10);
        let cfg = test_config();
        let mut saves = 0;
        let stats = run_pass(
            &mut catalog,
            &cfg,
            None,
            never_skip,
            |_url| async { "t".to_string() },
            merge_title,
            |_c| {
                saves += 1;
                Ok(())
            },
        )
        .await
        .unwrap();
        assert_eq!(stats.processed, 10);
        assert_eq!(stats.checkpoints, 1);
        // one mid-run checkpoint plus the unconditional final save
        assert_eq!(saves, 2);
    }

    #[tokio::test]
    async fn short_pass_saves_only_at_the_end() {
        let mut catalog = catalog_with(4);
        let cfg = test_config();
        let mut saves = 0;
        let stats = run_pass(
            &mut catalog,
            &cfg,
            None,
            never_skip,
            |_url| async { "t".to_string() },
            merge_title,
            |_c| {
                saves += 1;
                Ok(())
            },
        )
        .await
        .unwrap();
        assert_eq!(stats.checkpoints, 0);
        assert_eq!(saves, 1);
    }

    #[tokio::test]
    async fn populated_records_are_skipped_without_a_fetch() {
        let mut catalog = catalog_with(3);
        catalog.categories[0].links[1].description = Some("already".into());
        catalog.categories[0].links[1].logo = Some("assets/images/logos/b.png".into());
        let cfg = test_config();
        let fetches = AtomicUsize::new(0);
        let stats = run_pass(
            &mut catalog,
            &cfg,
            None,
            fully_populated,
            |_url| {
                fetches.fetch_add(1, Ordering::Relaxed);
                async { meta("fetched", "fetched.png") }
            },
            merge_metadata,
            |_c| Ok(()),
        )
        .await
        .unwrap();
        assert_eq!(stats.eligible, 3);
        assert_eq!(stats.processed, 2);
        assert_eq!(stats.skipped, 1);
        assert_eq!(fetches.load(Ordering::Relaxed), 2);
        // the populated record is untouched
        assert_eq!(
            catalog.categories[0].links[1].description.as_deref(),
            Some("already")
        );
    }

    #[tokio::test]
    async fn merge_fills_only_missing_fields() {
        let mut record = SiteRecord {
            title: "a".into(),
            url: Some("a.com".into()),
            description: Some("keep me".into()),
            ..Default::default()
        };
        merge_metadata(&mut record, meta("fresh", "assets/images/logos/a.png"));
        assert_eq!(record.description.as_deref(), Some("keep me"));
        assert_eq!(record.logo.as_deref(), Some("assets/images/logos/a.png"));

        // empty string counts as missing
        record.logo = Some(String::new());
        merge_metadata(&mut record, meta("fresh", "assets/images/logos/b.png"));
        assert_eq!(record.logo.as_deref(), Some("assets/images/logos/b.png"));
    }

    #[tokio::test]
    async fn title_merge_always_overwrites() {
        let mut record = SiteRecord {
            title: "a".into(),
            url: Some("a.com".into()),
            description: Some("old description".into()),
            ..Default::default()
        };
        merge_title(&mut record, "Fetched Title".into());
        assert_eq!(record.description.as_deref(), Some("Fetched Title"));
    }

    #[tokio::test]
    async fn enrichment_is_idempotent_across_runs() {
        let mut catalog = catalog_with(5);
        let cfg = test_config();
        for _ in 0..2 {
            run_pass(
                &mut catalog,
                &cfg,
                None,
                fully_populated,
                |_url| async { meta("desc", "assets/images/logos/x.png") },
                merge_metadata,
                |_c| Ok(()),
            )
            .await
            .unwrap();
        }
        let first = catalog.clone();
        let stats = run_pass(
            &mut catalog,
            &cfg,
            None,
            fully_populated,
            |_url| async { meta("different now", "other.png") },
            merge_metadata,
            |_c| Ok(()),
        )
        .await
        .unwrap();
        // every record is already populated: all skipped, nothing changed
        assert_eq!(stats.processed, 0);
        assert_eq!(stats.skipped, 5);
        assert_eq!(catalog, first);
    }

    #[tokio::test]
    async fn records_without_url_are_not_eligible() {
        let mut catalog = catalog_with(2);
        catalog.categories[0].links[0].url = None;
        catalog.categories[0].links[1].url = Some(String::new());
        let cfg = test_config();
        let stats = run_pass(
            &mut catalog,
            &cfg,
            None,
            never_skip,
            |_url| async { "t".to_string() },
            merge_title,
            |_c| Ok(()),
        )
        .await
        .unwrap();
        assert_eq!(stats.eligible, 0);
        assert_eq!(stats.processed, 0);
        assert!(catalog.categories[0].links[0].description.is_none());
    }

    #[tokio::test]
    async fn limit_caps_processed_records() {
        let mut catalog = catalog_with(25);
        let cfg = test_config();
        let mut saves = 0;
        let stats = run_pass(
            &mut catalog,
            &cfg,
            Some(7),
            never_skip,
            |_url| async { "t".to_string() },
            merge_title,
            |_c| {
                saves += 1;
                Ok(())
            },
        )
        .await
        .unwrap();
        assert_eq!(stats.processed, 7);
        assert_eq!(stats.checkpoints, 0);
        assert_eq!(saves, 1);
    }

    #[tokio::test]
    async fn unreachable_site_yields_defaults_without_panicking() {
        let cfg = test_config();
        let client = fetch::client(Duration::from_secs(1), &cfg.user_agent).unwrap();
        let result =
            fetch_site_metadata(&client, &client, &cfg, "http://127.0.0.1:9/".into()).await;
        assert_eq!(result.description, "");
        assert_eq!(result.logo, cfg.default_logo_ref());
    }

    #[tokio::test]
    async fn unreachable_site_title_falls_back_to_bare_domain() {
        let cfg = test_config();
        let client = fetch::client(Duration::from_secs(1), &cfg.user_agent).unwrap();
        let title = fetch_site_title(&client, "http://www.localhost.invalid/".into()).await;
        assert_eq!(title, "localhost.invalid");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let s = "汉".repeat(120);
        let cut = truncate_chars(&s, 100);
        assert_eq!(cut.chars().count(), 100);
        assert_eq!(truncate_chars("short", 100), "short");
    }
}
