use std::path::PathBuf;
use std::time::Duration;

/// Fixed policy for the enrichment passes, hoisted into one place so
/// tests can override it (zero delay, temp directories).
#[derive(Debug, Clone)]
pub struct EnrichConfig {
    /// Directory downloaded favicons are written into.
    pub logo_dir: PathBuf,
    /// Path prefix stored in the catalog for downloaded logos.
    pub logo_prefix: String,
    /// Filename of the shared fallback image inside `logo_dir`.
    pub default_logo_name: String,
    /// Well-known icon fetched once to seed the fallback image.
    pub fallback_icon_url: String,
    pub page_timeout: Duration,
    pub asset_timeout: Duration,
    /// Save the whole catalog after this many processed records.
    pub checkpoint_every: usize,
    /// Fixed pause after each processed record.
    pub request_delay: Duration,
    /// Descriptions are cut to this many characters.
    pub max_description: usize,
    pub user_agent: String,
}

impl EnrichConfig {
    /// Catalog-relative reference for the fallback image.
    pub fn default_logo_ref(&self) -> String {
        format!("{}/{}", self.logo_prefix, self.default_logo_name)
    }

    /// On-disk path of the fallback image.
    pub fn default_logo_path(&self) -> PathBuf {
        self.logo_dir.join(&self.default_logo_name)
    }
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            logo_dir: PathBuf::from("static/assets/images/logos"),
            logo_prefix: "assets/images/logos".to_string(),
            default_logo_name: "default.png".to_string(),
            fallback_icon_url: "https://www.google.com/favicon.ico".to_string(),
            page_timeout: Duration::from_secs(10),
            asset_timeout: Duration::from_secs(5),
            checkpoint_every: 10,
            request_delay: Duration::from_secs(1),
            max_description: 100,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
        }
    }
}
