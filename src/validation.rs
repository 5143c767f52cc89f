//! Content validation: structure, length, link format and language checks.
//!
//! Every check runs independently so one report lists all problems at once.
//! A failed report is a quality signal, not a processing failure.

use crate::config::LimitsConfig;
use crate::generation::links::{strip_links, LINK_PATTERN};
use crate::generation::Description;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use unicode_normalization::UnicodeNormalization;

/// Shortest first paragraph accepted as an introduction, in characters
pub const MIN_INTRO_CHARS: usize = 100;

static SECTION_MARKERS: Lazy<[(&'static str, Regex); 4]> = Lazy::new(|| {
    let marker = |pattern: &str| Regex::new(pattern).expect("section marker is valid");
    [
        (
            "technology",
            marker(r"(?i)(технолог|инструмент|средств|библиотек|фреймворк|платформ)"),
        ),
        (
            "processes",
            marker(r"(?i)(процесс|методолог|подход|практик|этап|шаг)"),
        ),
        (
            "applications",
            marker(r"(?i)(применен|использован|использует|применяет|задач|проблем|решен)"),
        ),
        (
            "intersections",
            marker(r"(?i)(пересечен|связ|взаимодейств|интеграц|комбинир|совмест|област)"),
        ),
    ]
});

static URL_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://[^/\s]+").expect("url pattern is valid"));

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    fn from_parts(errors: Vec<String>, warnings: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ContentValidator {
    min_words: usize,
    max_words: usize,
    min_links: usize,
    min_cyrillic_ratio: f64,
}

impl Default for ContentValidator {
    fn default() -> Self {
        Self::new(&LimitsConfig::default())
    }
}

impl ContentValidator {
    pub fn new(limits: &LimitsConfig) -> Self {
        Self {
            min_words: limits.min_words,
            max_words: limits.max_words,
            min_links: limits.min_links,
            min_cyrillic_ratio: limits.min_cyrillic_ratio,
        }
    }

    pub fn validate(&self, description: &Description) -> ValidationReport {
        if description.title.trim().is_empty() {
            return ValidationReport::from_parts(
                vec!["Missing or invalid title".to_string()],
                Vec::new(),
            );
        }
        let content = description.description.as_str();
        if content.trim().is_empty() {
            return ValidationReport::from_parts(
                vec!["Missing or invalid description content".to_string()],
                Vec::new(),
            );
        }

        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        let missing = missing_sections(content);
        if !missing.is_empty() {
            errors.push(format!("Missing required sections: {}", missing.join(", ")));
        }

        let words = count_words(content);
        if words < self.min_words {
            errors.push(format!(
                "Content too short: {} words (minimum {})",
                words, self.min_words
            ));
        }
        if words > self.max_words {
            errors.push(format!(
                "Content too long: {} words (maximum {})",
                words, self.max_words
            ));
        }

        if !validate_links(content) {
            errors.push("Invalid link format".to_string());
        } else {
            let links = LINK_PATTERN.find_iter(content).count();
            if links < self.min_links {
                warnings.push(format!(
                    "Only {} links (recommended at least {})",
                    links, self.min_links
                ));
            }
        }

        match cyrillic_ratio(content) {
            Some(ratio) if ratio >= self.min_cyrillic_ratio => {}
            Some(ratio) => errors.push(format!(
                "Content not in Russian: {:.0}% Cyrillic (minimum {:.0}%)",
                ratio * 100.0,
                self.min_cyrillic_ratio * 100.0
            )),
            None => errors.push("Content not in Russian: no alphabetic text".to_string()),
        }

        ValidationReport::from_parts(errors, warnings)
    }
}

/// True when the intro and every section vocabulary are present
pub fn has_all_sections(content: &str) -> bool {
    missing_sections(content).is_empty()
}

fn missing_sections(content: &str) -> Vec<&'static str> {
    let mut missing = Vec::new();
    let intro = content.trim_start().split("\n\n").next().unwrap_or("");
    if intro.chars().count() < MIN_INTRO_CHARS {
        missing.push("intro");
    }
    for (name, pattern) in SECTION_MARKERS.iter() {
        if !pattern.is_match(content) {
            missing.push(*name);
        }
    }
    missing
}

/// Whitespace-separated words after reducing links to their text
pub fn count_words(content: &str) -> usize {
    strip_links(content).split_whitespace().count()
}

/// At least one link, and every link has text and an `http(s)://host` URL.
pub fn validate_links(content: &str) -> bool {
    let mut found = false;
    for caps in LINK_PATTERN.captures_iter(content) {
        found = true;
        if caps[1].trim().is_empty() || !URL_SHAPE.is_match(&caps[2]) {
            return false;
        }
    }
    found
}

/// Cyrillic share of Cyrillic plus Latin letters, or `None` without any.
pub fn cyrillic_ratio(content: &str) -> Option<f64> {
    let text: String = strip_links(content).nfc().collect();
    let (cyrillic, latin) = text.chars().fold((0usize, 0usize), |(c, l), ch| match ch {
        '\u{0400}'..='\u{04FF}' => (c + 1, l),
        'a'..='z' | 'A'..='Z' => (c, l + 1),
        _ => (c, l),
    });
    let total = cyrillic + latin;
    if total == 0 {
        None
    } else {
        Some(cyrillic as f64 / total as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTRO: &str = "Введение в тему описывает основные понятия, историю развития и ключевые принципы, на которых строится вся дисциплина.";
    const BODY: &str = "Технологии и инструменты. Процессы и методологии. Практические применения. Междисциплинарные связи. Подробнее: [Открытый курс](https://ocw.mit.edu/).";

    /// Description with exactly `words` words after link stripping
    fn with_words(words: usize) -> Description {
        let base = format!("{}\n\n{}", INTRO, BODY);
        let base_words = count_words(&base);
        assert!(words >= base_words);
        let filler = vec!["слово"; words - base_words].join(" ");
        Description::new("Тема", format!("{}\n\n{}", base, filler).trim())
    }

    #[test]
    fn test_word_count_boundaries() {
        let validator = ContentValidator::default();

        let report = validator.validate(&with_words(499));
        assert!(!report.valid);
        assert_eq!(report.errors, vec!["Content too short: 499 words (minimum 500)"]);

        assert!(validator.validate(&with_words(500)).valid);
        assert!(validator.validate(&with_words(2000)).valid);

        let report = validator.validate(&with_words(2001));
        assert_eq!(report.errors, vec!["Content too long: 2001 words (maximum 2000)"]);
    }

    #[test]
    fn test_link_text_counts_but_urls_do_not() {
        assert_eq!(count_words("см. [MIT Open Course](https://ocw.mit.edu/a b)"), 4);
        assert_eq!(count_words("  \n "), 0);
    }

    #[test]
    fn test_validate_links() {
        assert!(validate_links("[a](https://a.org/x)"));
        assert!(!validate_links("no links here"));
        assert!(!validate_links("[a](ftp://a.org)"));
        assert!(!validate_links("[ ](https://a.org)"));
        assert!(!validate_links("[a](https:///path)"));
    }

    #[test]
    fn test_cyrillic_ratio() {
        assert_eq!(cyrillic_ratio("Алгебра"), Some(1.0));
        assert_eq!(cyrillic_ratio("1234 !?"), None);
        let ratio = cyrillic_ratio("абв abc").unwrap();
        assert!((ratio - 0.5).abs() < f64::EPSILON);
        // link URLs are ignored
        assert_eq!(cyrillic_ratio("[курс](https://example.org/course)"), Some(1.0));
    }

    #[test]
    fn test_errors_accumulate() {
        let description = Description::new("Topic", "Short English text [x](http://a.org).");
        let report = ContentValidator::default().validate(&description);
        assert!(!report.valid);
        assert_eq!(report.errors.len(), 3);
        assert!(report.errors[0].starts_with("Missing required sections: intro"));
        assert!(report.errors[1].starts_with("Content too short"));
        assert!(report.errors[2].starts_with("Content not in Russian"));
    }

    #[test]
    fn test_missing_title_short_circuits() {
        let report = ContentValidator::default().validate(&Description::new(" ", "текст"));
        assert_eq!(report.errors, vec!["Missing or invalid title"]);
    }

    #[test]
    fn test_few_links_is_only_a_warning() {
        let report = ContentValidator::default().validate(&with_words(600));
        assert!(report.valid);
        assert_eq!(report.warnings, vec!["Only 1 links (recommended at least 5)"]);
    }
}
