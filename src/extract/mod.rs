//! Ordered fallback chains over a parsed page. Each extractor tries its
//! alternatives in order and stops at the first one that yields a value.

pub mod description;
pub mod favicon;
pub mod title;

use scraper::{Html, Selector};

/// Content attribute of the first matching meta element, if nonempty.
/// Later matches are not consulted; an empty first match falls through
/// to the next alternative in the chain instead.
pub(crate) fn meta_content(doc: &Html, selector: &Selector) -> Option<String> {
    doc.select(selector)
        .next()
        .and_then(|el| el.value().attr("content"))
        .filter(|content| !content.is_empty())
        .map(str::to_string)
}

// ── Tests ──
