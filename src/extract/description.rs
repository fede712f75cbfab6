use std::sync::LazyLock;

use scraper::{Html, Selector};

static META_DESC: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[name="description"]"#).unwrap());
static OG_DESC: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[property="og:description"]"#).unwrap());

/// `<meta name="description">`, else `<meta property="og:description">`.
pub fn extract(doc: &Html) -> Option<String> {
    super::meta_content(doc, &META_DESC).or_else(|| super::meta_content(doc, &OG_DESC))
}
