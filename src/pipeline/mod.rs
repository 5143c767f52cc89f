//! Orchestrator: drives one run from configuration to summary.
//!
//! Topics are processed strictly one at a time: generate, validate, persist,
//! mark. Per-topic failures are routed into the progress tracker; only
//! configuration, curriculum and initialization problems abort the run.

pub mod summary;

pub use summary::{format_duration, ProgressUpdate, RunSummary, Timings, VerificationReport};

use crate::clock::{SharedClock, SystemClock};
use crate::config::{ComposerKind, GeneratorConfig, SearchBackendKind};
use crate::curriculum::{CurriculumSource, Topic};
use crate::error::{ConfigError, PipelineError, TopicError};
use crate::generation::{
    composer_for, ContentComposer, Description, DescriptionGenerator, GeneratorSettings,
};
use crate::progress::ProgressTracker;
use crate::search::{CatalogBackend, HttpSearchBackend, SearchBackend, SourceFinder};
use crate::store::ResultStore;
use crate::validation::ContentValidator;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Callback invoked before each topic is processed
pub type ProgressObserver = Arc<dyn Fn(&ProgressUpdate) + Send + Sync>;

/// Per-run switches, normally taken from the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Continue from persisted progress
    pub resume: bool,
    /// Generate and validate without writing results or progress
    pub dry_run: bool,
    /// Restrict the run to these topic ids
    pub topics: Option<Vec<String>>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            resume: true,
            dry_run: false,
            topics: None,
        }
    }
}

struct Components {
    curriculum: CurriculumSource,
    generator: DescriptionGenerator,
    validator: ContentValidator,
    store: ResultStore,
}

/// Counters kept for the current run only
#[derive(Default)]
struct RunState {
    successful: usize,
    timings: Timings,
    validation_issues: BTreeMap<String, Vec<String>>,
}

pub struct Orchestrator {
    config: GeneratorConfig,
    options: RunOptions,
    clock: SharedClock,
    backend: Option<Arc<dyn SearchBackend>>,
    composer: Option<Arc<dyn ContentComposer>>,
    observer: Option<ProgressObserver>,
}

impl Orchestrator {
    pub fn new(config: GeneratorConfig, options: RunOptions) -> Self {
        Self {
            config,
            options,
            clock: SystemClock::shared(),
            backend: None,
            composer: None,
            observer: None,
        }
    }

    pub fn with_clock(mut self, clock: SharedClock) -> Self {
        self.clock = clock;
        self
    }

    /// Use `backend` instead of the one named in the configuration.
    pub fn with_backend(mut self, backend: Arc<dyn SearchBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Use `composer` instead of the one named in the configuration.
    pub fn with_composer(mut self, composer: Arc<dyn ContentComposer>) -> Self {
        self.composer = Some(composer);
        self
    }

    pub fn with_progress_observer(mut self, observer: ProgressObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Copy the results backup over the live results file.
    pub fn restore_backup(&self) -> Result<(), PipelineError> {
        ResultStore::new(&self.config.paths.descriptions).restore_from_backup()?;
        Ok(())
    }

    pub async fn run(&self) -> Result<RunSummary, PipelineError> {
        self.check_config()?;
        let components = self.init_components()?;

        let all_topics = components.curriculum.read_all()?;
        let topics = self.filter_topics(all_topics);
        let (mut tracker, skipped) = self.prepare_tracker(topics)?;

        let started = self.clock.now();
        let initial_hash = self.curriculum_hash(&components.curriculum);
        info!(
            total = tracker.topics().len(),
            dry_run = self.options.dry_run,
            "Starting content generation"
        );

        let mut state = RunState::default();
        while let Some(topic) = tracker.next() {
            self.report_progress(&tracker, &topic, &state);
            self.process_topic(&components, &mut tracker, &topic, &mut state)
                .await?;
        }

        let curriculum_changed = match (initial_hash, self.curriculum_hash(&components.curriculum)) {
            (Some(before), Some(after)) if before != after => {
                error!(path = ?components.curriculum.path(), "Curriculum file was modified during generation");
                true
            }
            (Some(_), Some(_)) => {
                info!("Curriculum integrity verified");
                false
            }
            _ => false,
        };

        let verification = if self.options.dry_run {
            None
        } else {
            Some(self.verify(&components.store, &tracker))
        };

        let elapsed_ms = (self.clock.now() - started).num_milliseconds().max(0) as u64;
        let stats = tracker.get_stats();
        let summary = RunSummary {
            total: stats.total,
            processed: stats.processed,
            successful: state.successful,
            failed: stats.failed,
            skipped,
            duration: format_duration(elapsed_ms),
            average_time_per_topic: format_duration(state.timings.average_ms()),
            failed_topics: tracker.failed_topics(),
            dry_run: self.options.dry_run,
            curriculum_changed,
            validation_issues: state.validation_issues,
            verification,
        };

        let summary_path = self.config.paths.summary_path();
        summary.write(&summary_path)?;
        info!(
            path = ?summary_path,
            total = summary.total,
            successful = summary.successful,
            failed = summary.failed,
            duration = %summary.duration,
            "Generation finished"
        );
        Ok(summary)
    }

    fn check_config(&self) -> Result<(), PipelineError> {
        self.config.validate().map_err(|errors| {
            let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            PipelineError::Config(ConfigError::Invalid(messages.join("\n")))
        })?;
        if self.composer.is_none()
            && self.config.generation.composer == ComposerKind::Legacy
            && self.config.validation.strict
        {
            warn!(
                min_words = self.config.limits.min_words,
                "Legacy composer output is below the word minimum; strict validation will fail every topic"
            );
        }
        Ok(())
    }

    fn init_components(&self) -> Result<Components, PipelineError> {
        let backend = self.search_backend()?;
        let finder = SourceFinder::from_config(backend, &self.config.search, self.clock.clone());
        let composer = self
            .composer
            .clone()
            .unwrap_or_else(|| composer_for(&self.config));
        info!(
            backend = finder.backend_name(),
            composer = composer.name(),
            "Components initialized"
        );
        Ok(Components {
            curriculum: CurriculumSource::new(&self.config.paths.curriculum),
            generator: DescriptionGenerator::new(
                Arc::new(finder),
                composer,
                GeneratorSettings::from_config(&self.config),
            ),
            validator: ContentValidator::new(&self.config.limits),
            store: ResultStore::new(&self.config.paths.descriptions),
        })
    }

    fn search_backend(&self) -> Result<Arc<dyn SearchBackend>, PipelineError> {
        if let Some(backend) = &self.backend {
            return Ok(backend.clone());
        }
        let backend: Arc<dyn SearchBackend> = match self.config.search.backend {
            SearchBackendKind::Catalog => {
                let catalog = match &self.config.paths.catalog {
                    Some(path) => CatalogBackend::from_file(path)?,
                    None => CatalogBackend::builtin()?,
                };
                Arc::new(catalog)
            }
            SearchBackendKind::Http => Arc::new(
                HttpSearchBackend::from_config(&self.config.search.http)
                    .map_err(|e| PipelineError::Init(e.to_string()))?,
            ),
        };
        Ok(backend)
    }

    fn filter_topics(&self, topics: Vec<Topic>) -> Vec<Topic> {
        let Some(wanted) = &self.options.topics else {
            info!(count = topics.len(), "Topics loaded from curriculum");
            return topics;
        };
        let total = topics.len();
        let ids: HashSet<&str> = wanted.iter().map(String::as_str).collect();
        let filtered: Vec<Topic> = topics
            .into_iter()
            .filter(|topic| ids.contains(topic.id.as_str()))
            .collect();

        let found: HashSet<&str> = filtered.iter().map(|t| t.id.as_str()).collect();
        for id in wanted.iter().filter(|id| !found.contains(id.as_str())) {
            warn!(topic_id = %id, "Requested topic not found in curriculum");
        }
        info!(total, filtered = filtered.len(), "Topics filtered");
        filtered
    }

    /// Tracker with resume, reset, requeue and dry-run applied; also returns
    /// how many topics were already processed before this run.
    fn prepare_tracker(
        &self,
        topics: Vec<Topic>,
    ) -> Result<(ProgressTracker, usize), PipelineError> {
        let mut tracker =
            ProgressTracker::new(topics, &self.config.paths.progress, self.clock.clone());

        if self.options.resume {
            if tracker.load_progress()? {
                info!(processed = tracker.get_stats().processed, "Resumed from previous progress");
            }
        } else if self.options.dry_run {
            warn!("Dry run: previewing from scratch, persisted progress left untouched");
        } else {
            info!("Starting fresh, ignoring previous progress");
            tracker.reset()?;
        }

        if let Some(ids) = &self.options.topics {
            tracker.requeue(ids);
        }
        tracker.rewind();

        if self.options.dry_run {
            tracker.detach();
        }
        let skipped = tracker.get_stats().processed;
        Ok((tracker, skipped))
    }

    fn report_progress(&self, tracker: &ProgressTracker, topic: &Topic, state: &RunState) {
        let stats = tracker.get_stats();
        let update = ProgressUpdate {
            topic_id: topic.id.clone(),
            title: topic.title.clone(),
            total: stats.total,
            processed: stats.processed,
            successful: state.successful,
            failed: stats.failed,
            remaining: stats.remaining,
            eta_ms: state.timings.eta_ms(stats.remaining),
        };
        info!(
            topic_id = %topic.id,
            title = %topic.title,
            processed = stats.processed,
            total = stats.total,
            remaining = stats.remaining,
            eta = %update.eta(),
            "Processing topic"
        );
        if let Some(observer) = &self.observer {
            observer(&update);
        }
    }

    async fn process_topic(
        &self,
        components: &Components,
        tracker: &mut ProgressTracker,
        topic: &Topic,
        state: &mut RunState,
    ) -> Result<(), PipelineError> {
        let started = self.clock.now();
        let outcome = self.generate_and_store(components, topic, state).await;
        let elapsed_ms = (self.clock.now() - started).num_milliseconds().max(0) as u64;

        match outcome {
            Ok(()) => {
                tracker.mark_processed(&topic.id)?;
                state.successful += 1;
                state.timings.record(elapsed_ms);
                info!(topic_id = %topic.id, duration_ms = elapsed_ms, "Topic completed");
            }
            Err(e) => {
                let attempt = tracker.failed_count(&topic.id) + 1;
                error!(topic_id = %topic.id, attempt, error = %e, "Topic failed");
                tracker.mark_failed(&topic.id, &e.to_string())?;
                if tracker.should_retry(&topic.id) {
                    info!(topic_id = %topic.id, attempt, "Topic will be retried");
                } else {
                    warn!(topic_id = %topic.id, attempt, "Max retries exceeded, skipping topic");
                }
            }
        }
        Ok(())
    }

    async fn generate_and_store(
        &self,
        components: &Components,
        topic: &Topic,
        state: &mut RunState,
    ) -> Result<(), TopicError> {
        let description: Description = components.generator.generate(topic).await?;

        let report = components.validator.validate(&description);
        if !report.valid {
            warn!(
                topic_id = %topic.id,
                errors = ?report.errors,
                warnings = ?report.warnings,
                "Content validation failed"
            );
            state
                .validation_issues
                .insert(topic.id.clone(), report.errors.clone());
            if self.config.validation.strict {
                return Err(TopicError::Validation(report.errors));
            }
        } else {
            state.validation_issues.remove(&topic.id);
        }

        if self.options.dry_run {
            info!(topic_id = %topic.id, "Dry run: result not written");
        } else {
            components.store.upsert(&topic.id, &description)?;
        }
        Ok(())
    }

    fn curriculum_hash(&self, curriculum: &CurriculumSource) -> Option<String> {
        match curriculum.content_hash() {
            Ok(hash) => Some(hash),
            Err(e) => {
                warn!(error = %e, "Failed to hash curriculum file");
                None
            }
        }
    }

    /// Every processed id must be present and the file must parse.
    fn verify(&self, store: &ResultStore, tracker: &ProgressTracker) -> VerificationReport {
        let mut report = VerificationReport {
            total_processed: tracker.processed().len(),
            ..VerificationReport::default()
        };

        match fs::read_to_string(store.path()) {
            Ok(text) => report.syntax_valid = ResultStore::validate_syntax(&text),
            Err(e) => report.error = Some(format!("{}: {}", store.path().display(), e)),
        }

        match store.read_all() {
            Ok(descriptions) => {
                report.total_in_file = descriptions.len();
                report.missing_topics = tracker
                    .processed()
                    .iter()
                    .filter(|id| !descriptions.contains_key(id.as_str()))
                    .cloned()
                    .collect();
            }
            Err(e) => {
                report.error.get_or_insert_with(|| e.to_string());
            }
        }

        report.valid = report.syntax_valid && report.missing_topics.is_empty();
        if report.valid {
            info!(
                total_in_file = report.total_in_file,
                total_processed = report.total_processed,
                "Content verification passed"
            );
        } else {
            warn!(
                missing = ?report.missing_topics,
                syntax_valid = report.syntax_valid,
                error = ?report.error,
                "Content verification failed"
            );
        }
        report
    }
}
