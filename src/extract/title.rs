use std::sync::LazyLock;

use scraper::{Html, Selector};

static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").unwrap());
static OG_TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[property="og:title"]"#).unwrap());
static TWITTER_TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[name="twitter:title"]"#).unwrap());

/// `<title>` text, else `og:title`, else `twitter:title`. The caller
/// substitutes the bare domain when nothing matches.
pub fn extract(doc: &Html) -> Option<String> {
    page_title(doc)
        .or_else(|| trimmed(super::meta_content(doc, &OG_TITLE)))
        .or_else(|| trimmed(super::meta_content(doc, &TWITTER_TITLE)))
}

fn page_title(doc: &Html) -> Option<String> {
    doc.select(&TITLE)
        .next()
        .map(|el| el.text().collect::<String>())
        .and_then(|text| trimmed(Some(text)))
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_tag_wins_and_is_trimmed() {
        let doc = Html::parse_document(
            r#"<head><title>  Site Name </title><meta property="og:title" content="OG"></head>"#,
        );
        assert_eq!(extract(&doc).as_deref(), Some("Site Name"));
    }

    #[test]
    fn whitespace_title_falls_through_the_chain() {
        let doc = Html::parse_document(
            r#"<head>
                <title>   </title>
                <meta property="og:title" content=" ">
                <meta name="twitter:title" content="Twitter Name">
            </head>"#,
        );
        assert_eq!(extract(&doc).as_deref(), Some("Twitter Name"));
    }
}
