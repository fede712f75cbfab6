use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// The whole persisted directory: an ordered list of categories.
/// On disk this is one YAML document, rewritten wholesale on every save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    pub categories: Vec<Category>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub taxonomy: String,
    pub icon: String,
    pub links: Vec<SiteRecord>,
}

/// One directory entry. Field declaration order is the on-disk order;
/// absent optional fields stay out of the file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteRecord {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qrcode: Option<String>,
}

/// Absent and empty-string fields count the same everywhere: for the
/// skip rule, the merge, and the stats.
pub fn is_blank(field: &Option<String>) -> bool {
    field.as_deref().map_or(true, str::is_empty)
}

#[derive(Debug, Default)]
pub struct CatalogStats {
    pub categories: usize,
    pub sites: usize,
    pub with_url: usize,
    pub described: usize,
    pub with_logo: usize,
}

impl Catalog {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading catalog {}", path.display()))?;
        serde_yaml::from_str(&text).with_context(|| format!("parsing catalog {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_yaml::to_string(self)
            .with_context(|| format!("serializing catalog for {}", path.display()))?;
        std::fs::write(path, text).with_context(|| format!("writing catalog {}", path.display()))
    }

    pub fn site_count(&self) -> usize {
        self.categories.iter().map(|c| c.links.len()).sum()
    }

    pub fn stats(&self) -> CatalogStats {
        let mut stats = CatalogStats {
            categories: self.categories.len(),
            ..Default::default()
        };
        for record in self.categories.iter().flat_map(|c| &c.links) {
            stats.sites += 1;
            if !is_blank(&record.url) {
                stats.with_url += 1;
            }
            if !is_blank(&record.description) {
                stats.described += 1;
            }
            if !is_blank(&record.logo) {
                stats.with_logo += 1;
            }
        }
        stats
    }
}

// ── Tests ──
