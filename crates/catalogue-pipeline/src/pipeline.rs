//! End-to-end pipeline: extract, validate, check, write

use crate::config::{CatalogueConfig, ConfigError};
use crate::error::PipelineError;
use crate::writer::DuplicateCheckedWriter;
use catalogue_domain::traits::{GenerationService, ModelStore};
use catalogue_domain::{ModelEntry, RunState, RunTracker};
use catalogue_extractor::ExtractionClient;
use catalogue_gatekeeper::Gatekeeper;
use catalogue_llm::AnthropicProvider;
use catalogue_store::SqliteStore;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Result of a successful run
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    /// The stored entry
    pub entity: ModelEntry,
    /// Units consumed by the extraction call
    pub consumption_units: u64,
    /// Model reported by the generation service
    pub model_used: String,
    /// States the run passed through, ending at `Completed`
    pub history: Vec<RunState>,
}

/// Extraction pipeline over a generation service `G` and a store `S`
///
/// Cheap to clone; clones share the service, the policy and the store, and
/// nothing else. Each call to `run` is an independent run.
pub struct Pipeline<G, S> {
    extractor: ExtractionClient<G>,
    gatekeeper: Arc<Gatekeeper>,
    writer: DuplicateCheckedWriter<S>,
    run_timeout: Option<Duration>,
}

impl<G, S> Clone for Pipeline<G, S> {
    fn clone(&self) -> Self {
        Self {
            extractor: self.extractor.clone(),
            gatekeeper: Arc::clone(&self.gatekeeper),
            writer: self.writer.clone(),
            run_timeout: self.run_timeout,
        }
    }
}

impl Pipeline<AnthropicProvider, SqliteStore> {
    /// Build the production pipeline from configuration
    ///
    /// # Errors
    ///
    /// Fails if the configuration is invalid, the API key is missing, or the
    /// database cannot be opened.
    pub fn from_config(config: &CatalogueConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let provider = AnthropicProvider::with_settings(
            &config.provider.endpoint,
            &config.provider.api_key,
            &config.provider.model,
            config.provider.timeout(),
        )?;
        let store = SqliteStore::new(&config.store.database)?;

        info!(
            model = %config.provider.model,
            database = %config.store.database,
            "Pipeline configured"
        );

        Ok(Self::new(
            ExtractionClient::new(provider, config.extractor.clone()),
            Gatekeeper::new(config.validation.clone()),
            DuplicateCheckedWriter::new(store),
        )
        .with_run_timeout(config.pipeline.run_timeout()))
    }
}

impl<G: GenerationService, S: ModelStore> Pipeline<G, S> {
    /// Assemble a pipeline from its three components
    pub fn new(
        extractor: ExtractionClient<G>,
        gatekeeper: Gatekeeper,
        writer: DuplicateCheckedWriter<S>,
    ) -> Self {
        Self {
            extractor,
            gatekeeper: Arc::new(gatekeeper),
            writer,
            run_timeout: None,
        }
    }

    /// Deadline applied by `run_bounded`
    pub fn with_run_timeout(mut self, timeout: Duration) -> Self {
        self.run_timeout = Some(timeout);
        self
    }

    /// The extraction client
    pub fn extractor(&self) -> &ExtractionClient<G> {
        &self.extractor
    }

    /// The validator
    pub fn gatekeeper(&self) -> &Gatekeeper {
        &self.gatekeeper
    }

    /// The duplicate-checked writer
    pub fn writer(&self) -> &DuplicateCheckedWriter<S> {
        &self.writer
    }

    /// Run the pipeline once over `text`
    pub async fn run(&self, text: &str) -> Result<PipelineOutput, PipelineError> {
        let mut tracker = RunTracker::new();

        match self.execute(text, &mut tracker).await {
            Ok((entity, consumption_units, model_used)) => {
                enter(&mut tracker, RunState::Completed);
                info!(
                    id = %entity.id,
                    name = %entity.name,
                    consumption_units,
                    "Pipeline run completed"
                );
                Ok(PipelineOutput {
                    entity,
                    consumption_units,
                    model_used,
                    history: tracker.into_history(),
                })
            }
            Err(e) => {
                let kind = e.kind();
                tracker.fail(kind);
                warn!(
                    kind = %kind,
                    status = kind.status_code(),
                    states = ?tracker.history(),
                    error = %e,
                    "Pipeline run failed"
                );
                Err(e)
            }
        }
    }

    /// Run the pipeline with an overall deadline
    ///
    /// Dropping the run at the deadline abandons whatever step was in
    /// flight. A write that already completed stays written.
    pub async fn run_with_timeout(
        &self,
        text: &str,
        timeout: Duration,
    ) -> Result<PipelineOutput, PipelineError> {
        match tokio::time::timeout(timeout, self.run(text)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(timeout = ?timeout, "Pipeline run timed out");
                Err(PipelineError::TimedOut(timeout))
            }
        }
    }

    /// Run with the configured deadline, if any
    pub async fn run_bounded(&self, text: &str) -> Result<PipelineOutput, PipelineError> {
        match self.run_timeout {
            Some(timeout) => self.run_with_timeout(text, timeout).await,
            None => self.run(text).await,
        }
    }

    async fn execute(
        &self,
        text: &str,
        tracker: &mut RunTracker,
    ) -> Result<(ModelEntry, u64, String), PipelineError> {
        enter(tracker, RunState::Extracting);
        let outcome = self.extractor.extract_default(text).await?;
        let consumption_units = outcome.consumption_units;
        let model_used = outcome.model_used.clone();

        enter(tracker, RunState::Validating);
        let record = self.gatekeeper.validate(outcome)?;

        enter(tracker, RunState::CheckingDuplicate);
        self.writer.find_conflict(&record).await?;

        enter(tracker, RunState::Writing);
        let entity = self.writer.insert_checked(record).await?;

        Ok((entity, consumption_units, model_used))
    }
}

fn enter(tracker: &mut RunTracker, next: RunState) {
    if let Err(e) = tracker.advance(next) {
        error!(error = %e, "Run state machine out of order");
    }
}
