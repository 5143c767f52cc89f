//! Markdown link formatting.
//!
//! The results file is read by a UI that extracts links with
//! `\[([^\]]+)\]\(([^)]+)\)`. Every link emitted here must round-trip through that
//! pattern, so link text never contains brackets and URLs never contain parentheses
//! or whitespace.

use crate::search::Source;
use once_cell::sync::Lazy;
use regex::Regex;

/// Link pattern shared with the UI consumer of the results file
pub static LINK_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("link pattern is valid")
});

pub const REFERENCES_HEADING: &str = "**Источники:**";
pub const NO_REFERENCES: &str = "Источники будут добавлены позже.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub text: String,
    pub url: String,
}

impl Link {
    pub fn markdown(&self) -> String {
        format!("[{}]({})", self.text, self.url)
    }
}

/// Strip brackets and collapse whitespace; empty text becomes `Источник {position}`.
pub fn sanitize_text(text: &str, position: usize) -> String {
    let cleaned = text
        .replace(['[', ']'], "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if cleaned.is_empty() {
        format!("Источник {}", position)
    } else {
        cleaned
    }
}

/// Accept only `http(s)://host...` URLs; percent-encode spaces and parentheses.
pub fn sanitize_url(url: &str) -> Option<String> {
    let url = url.trim();
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))?;
    let host_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let host = &rest[..host_end];
    if host.is_empty() || host.contains(char::is_whitespace) {
        return None;
    }
    if url.chars().any(|c| c.is_whitespace() && c != ' ') {
        return None;
    }
    Some(
        url.replace(' ', "%20")
            .replace('(', "%28")
            .replace(')', "%29"),
    )
}

/// Links for usable sources, in source order; sources with unusable URLs are dropped.
pub fn links_from_sources(sources: &[Source]) -> Vec<Link> {
    sources
        .iter()
        .filter_map(|source| sanitize_url(&source.url).map(|url| (source, url)))
        .enumerate()
        .map(|(index, (source, url))| Link {
            text: sanitize_text(&source.title, index + 1),
            url,
        })
        .collect()
}

/// Numbered reference block, or the placeholder when there is nothing to list.
pub fn format_references(links: &[Link]) -> String {
    if links.is_empty() {
        return format!("{}\n\n{}", REFERENCES_HEADING, NO_REFERENCES);
    }
    let items: Vec<String> = links
        .iter()
        .enumerate()
        .map(|(index, link)| format!("{}. {}", index + 1, link.markdown()))
        .collect();
    format!("{}\n\n{}", REFERENCES_HEADING, items.join("\n"))
}

/// `(text, url)` pairs exactly as the UI would extract them
pub fn extract_links(text: &str) -> Vec<(String, String)> {
    LINK_PATTERN
        .captures_iter(text)
        .map(|caps| (caps[1].to_string(), caps[2].to_string()))
        .collect()
}

/// Replace every link with its text
pub fn strip_links(text: &str) -> String {
    LINK_PATTERN.replace_all(text, "$1").into_owned()
}
