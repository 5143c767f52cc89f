//! Description generation: plan, gather sources, compose sections, assemble.

pub mod composer;
pub mod legacy;
pub mod links;
pub mod plan;

pub use composer::{ContentComposer, SectionContext, TemplateComposer};
pub use legacy::LegacyComposer;
pub use links::{extract_links, Link, LINK_PATTERN};
pub use plan::{plan_article, ArticlePlan, SectionKind};

use crate::config::{ComposerKind, GeneratorConfig, SearchMode};
use crate::curriculum::Topic;
use crate::error::{GenerationCause, GenerationError, SearchError};
use crate::search::{dedupe_by_url, filter_by_quality, SearchOptions, SourceFinder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Generated content for one topic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Description {
    pub title: String,
    pub description: String,
}

impl Description {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorSettings {
    pub min_links: usize,
    pub max_links: usize,
    pub queries_per_topic: usize,
    pub results_per_query: usize,
    pub mode: SearchMode,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self::from_config(&GeneratorConfig::default())
    }
}

impl GeneratorSettings {
    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self {
            min_links: config.limits.min_links,
            max_links: config.limits.max_links,
            queries_per_topic: config.search.queries_per_topic,
            results_per_query: config.search.results_per_query,
            mode: config.search.mode,
        }
    }
}

/// Composer selected by configuration
pub fn composer_for(config: &GeneratorConfig) -> Arc<dyn ContentComposer> {
    match config.generation.composer {
        ComposerKind::Template => Arc::new(TemplateComposer),
        ComposerKind::Legacy => Arc::new(LegacyComposer::new(config.generation.seed)),
    }
}

pub struct DescriptionGenerator {
    finder: Arc<SourceFinder>,
    composer: Arc<dyn ContentComposer>,
    settings: GeneratorSettings,
}

impl DescriptionGenerator {
    pub fn new(
        finder: Arc<SourceFinder>,
        composer: Arc<dyn ContentComposer>,
        settings: GeneratorSettings,
    ) -> Self {
        Self {
            finder,
            composer,
            settings,
        }
    }

    pub fn composer_name(&self) -> &str {
        self.composer.name()
    }

    /// Generate the full description for `topic`.
    ///
    /// Body order is fixed: intro, technology, processes, applications,
    /// intersections, then the reference list. The technology section cites the
    /// first source and the applications section the second (or the first again
    /// when only one exists); the reference list holds the rest.
    pub async fn generate(&self, topic: &Topic) -> Result<Description, GenerationError> {
        let fail = |cause: GenerationCause| GenerationError::new(topic.title.clone(), cause);

        if topic.title.trim().is_empty() {
            return Err(fail(SearchError::InvalidTopic(topic.id.clone()).into()));
        }

        let plan = plan_article(topic);
        let links = self.find_links(topic).await.map_err(fail)?;

        let tech_links = &links[..1];
        let app_links = if links.len() > 1 { &links[1..2] } else { &links[..1] };
        let references = if links.len() > 2 { &links[2..] } else { &[][..] };

        let mut blocks = Vec::with_capacity(SectionKind::ORDER.len() + 1);
        for kind in SectionKind::ORDER {
            let section_links = match kind {
                SectionKind::Technology => tech_links,
                SectionKind::Applications => app_links,
                _ => &[][..],
            };
            let ctx = SectionContext {
                topic,
                kind,
                key_points: plan.key_points(kind),
                links: section_links,
            };
            let body = self
                .composer
                .compose(&ctx)
                .await
                .map_err(|e| fail(e.into()))?;
            let body = ensure_links(body.trim(), section_links);
            blocks.push(match kind.heading() {
                Some(heading) => format!("{}\n\n{}", heading, body),
                None => body,
            });
        }
        blocks.push(links::format_references(references));

        let description = blocks.join("\n\n").trim().to_string();
        debug!(
            topic_id = %topic.id,
            composer = self.composer.name(),
            links = links.len(),
            "Description assembled"
        );
        Ok(Description::new(topic.title.clone(), description))
    }

    /// Sources for `topic`, best first, as sanitized links.
    ///
    /// Individual query failures are logged and skipped. The cause is
    /// `NoSources` whenever nothing usable was collected, including when every
    /// query failed.
    pub async fn find_links(&self, topic: &Topic) -> Result<Vec<Link>, GenerationCause> {
        let queries = self.finder.build_queries(topic)?;
        let queries: Vec<String> = queries
            .into_iter()
            .take(self.settings.queries_per_topic.max(1))
            .collect();

        let options = SearchOptions {
            num_results: self.settings.results_per_query,
            mode: self.settings.mode,
        };

        let mut results = Vec::new();
        let mut failed = 0usize;
        for query in &queries {
            match self.finder.search(query, &options).await {
                Ok(found) => results.extend(found),
                Err(e) => {
                    warn!(topic_id = %topic.id, query = %query, error = %e, "Search query failed");
                    failed += 1;
                }
            }
        }
        if failed == queries.len() {
            warn!(topic_id = %topic.id, queries = queries.len(), "Every search query failed");
        }

        let ranked = dedupe_by_url(filter_by_quality(results));
        let usable: Vec<_> = ranked
            .into_iter()
            .filter(|source| links::sanitize_url(&source.url).is_some())
            .take(self.settings.max_links.max(1))
            .collect();
        let found = links::links_from_sources(&usable);

        if found.is_empty() {
            return Err(GenerationCause::NoSources {
                queries: queries.len(),
            });
        }
        if found.len() < self.settings.min_links {
            warn!(
                topic_id = %topic.id,
                found = found.len(),
                minimum = self.settings.min_links,
                "Fewer sources than the configured minimum"
            );
        }
        Ok(found)
    }
}

/// Append a citation sentence for any assigned link the composer left out.
fn ensure_links(body: &str, links: &[Link]) -> String {
    let missing: Vec<&Link> = links
        .iter()
        .filter(|link| !body.contains(&link.markdown()))
        .collect();
    if missing.is_empty() {
        return body.to_string();
    }
    let cited: Vec<String> = missing.iter().map(|link| link.markdown()).collect();
    let separator = if body.is_empty() { "" } else { " " };
    format!("{}{}Подробнее: {}.", body, separator, cited.join(", "))
}
