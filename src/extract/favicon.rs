use std::sync::LazyLock;

use scraper::{Html, Selector};
use url::Url;

static REL_LINKS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("link[rel]").unwrap());

/// First `<link>` whose rel mentions "icon" (any casing), resolved
/// against the page URL; else the conventional `/favicon.ico` on the
/// page's origin. `None` only for URLs that cannot carry a path.
pub fn extract(doc: &Html, page_url: &Url) -> Option<Url> {
    doc.select(&REL_LINKS)
        .find(|el| {
            el.value()
                .attr("rel")
                .is_some_and(|rel| rel.to_ascii_lowercase().contains("icon"))
        })
        .and_then(|el| el.value().attr("href"))
        .and_then(|href| page_url.join(href).ok())
        .or_else(|| page_url.join("/favicon.ico").ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> Url {
        Url::parse("https://example.com/deep/page.html").unwrap()
    }

    #[test]
    fn relative_href_resolves_against_page() {
        let doc = Html::parse_document(r#"<link rel="icon" href="/fav.png">"#);
        assert_eq!(
            extract(&doc, &page()).unwrap().as_str(),
            "https://example.com/fav.png"
        );
    }

    #[test]
    fn shortcut_icon_rel_matches_case_insensitively() {
        let doc = Html::parse_document(r#"<link rel="SHORTCUT ICON" href="f.ico">"#);
        assert_eq!(
            extract(&doc, &page()).unwrap().as_str(),
            "https://example.com/deep/f.ico"
        );
    }

    #[test]
    fn stylesheet_links_are_ignored() {
        let doc = Html::parse_document(r#"<link rel="stylesheet" href="s.css">"#);
        assert_eq!(
            extract(&doc, &page()).unwrap().as_str(),
            "https://example.com/favicon.ico"
        );
    }
}
