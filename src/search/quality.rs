//! Heuristic quality scoring of search results.

use super::{SearchResult, Source};

/// (markers, score) pairs checked against the lower-cased URL only
const URL_RULES: &[(&[&str], i32)] = &[
    (&["docs.", "/docs/", "/documentation/"], 100),
    (&[".edu", "academic"], 90),
    (&["scholar", "research"], 85),
    (&["arxiv", "ieee", "acm"], 95),
    (&["wikipedia.org"], 75),
    (&["coursera", "edx", "udacity"], 70),
    (&["mdn.", "w3schools"], 80),
    (&["github.com"], 50),
    (&["forum", "stackoverflow"], -10),
    (&["ads", "promo"], -50),
];

/// (marker, score) pairs checked against the URL or the title
const URL_OR_TITLE_RULES: &[(&str, i32)] = &[
    ("official", 80),
    ("tutorial", 70),
    ("guide", 65),
    ("learn", 60),
];

const SNIPPET_RULES: &[(&[&str], i32)] = &[
    (&["documentation", "документация"], 10),
    (&["tutorial", "руководство"], 8),
];

/// Additive score: official docs, academic and well-known educational sites gain,
/// blogs, forums and promotional pages lose.
pub fn score_result(result: &SearchResult) -> i32 {
    let url = result.url.to_lowercase();
    let title = result.title.to_lowercase();
    let snippet = result.snippet.to_lowercase();

    let mut score = 0;
    for (markers, points) in URL_RULES {
        if markers.iter().any(|m| url.contains(m)) {
            score += points;
        }
    }
    for (marker, points) in URL_OR_TITLE_RULES {
        if url.contains(marker) || title.contains(marker) {
            score += points;
        }
    }
    if url.contains("blog") && !url.contains("official") {
        score -= 20;
    }
    for (markers, points) in SNIPPET_RULES {
        if markers.iter().any(|m| snippet.contains(m)) {
            score += points;
        }
    }
    score
}

/// Score, sort best first (stable for ties) and drop negative scores.
pub fn filter_by_quality(results: Vec<SearchResult>) -> Vec<Source> {
    let mut scored: Vec<Source> = results
        .into_iter()
        .map(|result| {
            let quality_score = score_result(&result);
            Source::from_result(result, quality_score)
        })
        .collect();
    scored.sort_by(|a, b| b.quality_score.cmp(&a.quality_score));
    scored.retain(|source| source.quality_score >= 0);
    scored
}
