//! The stage executor: requirements → architecture → UML → implementation,
//! then a best-effort rendering pass over every saved diagram.
//!
//! ```text
//! Init → Requirements → Architecture → UML → Implementation → Rendering → Done
//!             │              │           │          │
//!             └──────────────┴───────────┴──────────┴──→ Aborted(partial results)
//! ```
//!
//! Each stage loads its template, substitutes the previous stage's output
//! (the user story for the first stage), calls the model, records the text,
//! and persists it. A failure in any stage stops the run; everything produced
//! until then is returned in the [`PipelineReport`]. Render failures are
//! recorded per diagram and never stop anything.

use std::sync::Arc;

use pipeline::{
    extract_mermaid_diagrams, interpolate, ArtifactError, ArtifactStore, DiagramName, DiagramRenderer,
    ModelClient, Payload, PipelineRunId, PipelineSettings, Stage, StageError, StageResults,
    TemplateSource, Timestamp,
};
use tracing::{error, info, info_span, warn, Instrument};

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

/// How a run ended.
#[derive(Debug)]
pub enum RunOutcome {
    /// All four stages succeeded and the rendering pass ran.
    Completed,
    /// `stage` failed; later stages and the rendering pass were skipped.
    Aborted { stage: Stage, error: StageError },
}

/// Result of rendering one diagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderStatus {
    Rendered { bytes: usize },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramRender {
    pub name: DiagramName,
    pub status: RenderStatus,
}

/// Everything a run produced.
#[derive(Debug)]
pub struct PipelineReport {
    pub run_id: PipelineRunId,
    pub started_at: Timestamp,
    pub finished_at: Timestamp,
    pub results: StageResults,
    /// Diagrams saved by this run, in extraction order.
    pub diagrams: Vec<DiagramName>,
    pub renders: Vec<DiagramRender>,
    pub outcome: RunOutcome,
}

impl PipelineReport {
    pub fn is_complete(&self) -> bool {
        matches!(self.outcome, RunOutcome::Completed)
    }

    /// The stage that aborted the run, if any.
    pub fn failed_stage(&self) -> Option<Stage> {
        match &self.outcome {
            RunOutcome::Completed => None,
            RunOutcome::Aborted { stage, .. } => Some(*stage),
        }
    }
}

// ---------------------------------------------------------------------------
// Executor
// ---------------------------------------------------------------------------

/// Drives one pipeline run. Stages and renders are awaited strictly in order.
pub struct PipelineExecutor {
    settings: PipelineSettings,
    client: Arc<dyn ModelClient>,
    templates: Arc<dyn TemplateSource>,
    store: Arc<dyn ArtifactStore>,
    renderer: Arc<dyn DiagramRenderer>,
}

impl PipelineExecutor {
    pub fn new(
        settings: PipelineSettings,
        client: Arc<dyn ModelClient>,
        templates: Arc<dyn TemplateSource>,
        store: Arc<dyn ArtifactStore>,
        renderer: Arc<dyn DiagramRenderer>,
    ) -> Self {
        Self {
            settings,
            client,
            templates,
            store,
            renderer,
        }
    }

    /// Runs every stage against `user_story`.
    ///
    /// Only a failure to prepare the output layout is returned as `Err`;
    /// stage failures produce an [`RunOutcome::Aborted`] report instead.
    pub async fn run(&self, user_story: &str) -> Result<PipelineReport, ArtifactError> {
        let run_id = PipelineRunId::new_random();
        let span = info_span!("pipeline_run", %run_id, model = %self.settings.model);
        self.run_inner(run_id, user_story).instrument(span).await
    }

    async fn run_inner(&self, run_id: PipelineRunId, user_story: &str) -> Result<PipelineReport, ArtifactError> {
        self.store.prepare().await?;

        let mut report = PipelineReport {
            run_id,
            started_at: Timestamp::now(),
            finished_at: Timestamp::now(),
            results: StageResults::new(),
            diagrams: Vec::new(),
            renders: Vec::new(),
            outcome: RunOutcome::Completed,
        };

        let mut input = user_story.to_string();
        for stage in Stage::ALL {
            info!(stage = %stage, "--- Stage {}: Generating {} ---", stage.number(), stage.label());

            let text = match self.generate(stage, &input).await {
                Ok(text) => text,
                Err(err) => return Ok(abort(report, stage, err)),
            };
            report.results.record(stage, text.as_str());

            if let Err(err) = self.persist(stage, &text, &mut report.diagrams).await {
                return Ok(abort(report, stage, err.into()));
            }
            info!(stage = %stage, "{} generated successfully", stage.label());
            input = text;
        }

        info!("--- Rendering Diagrams to Images ---");
        report.renders = self.render_all().await;
        report.finished_at = Timestamp::now();
        Ok(report)
    }

    /// Template → prompt → model call for one stage.
    async fn generate(&self, stage: Stage, input: &str) -> Result<String, StageError> {
        let template = match self.templates.load(stage.template()).await? {
            Some(template) => template,
            None => {
                // Degenerate prompt, but the stage still runs.
                warn!(template = stage.template(), "Template file not found; using an empty template");
                String::new()
            }
        };

        let prompt = interpolate(&template, stage.placeholder(), input);
        let payload = Payload::new(
            self.settings.target,
            self.settings.model.clone(),
            prompt,
            self.settings.generation_options(),
        );
        let generation = self.client.generate(&payload).await?;
        Ok(generation.text)
    }

    /// Writes the stage output and, where applicable, its diagrams.
    async fn persist(&self, stage: Stage, text: &str, saved: &mut Vec<DiagramName>) -> Result<(), ArtifactError> {
        self.store.save_stage_output(stage, text).await?;
        if !stage.extracts_diagrams() {
            return Ok(());
        }

        for (index, source) in extract_mermaid_diagrams(text).iter().enumerate() {
            let Some(name) = stage.diagram_name(index) else {
                continue;
            };
            self.store.save_diagram(&name, source).await?;
            saved.push(name);
        }
        Ok(())
    }

    /// Renders every diagram in the store, one at a time.
    async fn render_all(&self) -> Vec<DiagramRender> {
        let names = match self.store.list_diagrams().await {
            Ok(names) => names,
            Err(err) => {
                warn!(error = %err, "Could not list diagrams; skipping rendering");
                return Vec::new();
            }
        };

        let mut renders = Vec::with_capacity(names.len());
        for name in names {
            let status = match self.render_one(&name).await {
                Ok(bytes) => RenderStatus::Rendered { bytes },
                Err(reason) => {
                    warn!(diagram = %name, %reason, "Failed to render diagram");
                    RenderStatus::Failed { reason }
                }
            };
            renders.push(DiagramRender { name, status });
        }
        renders
    }

    async fn render_one(&self, name: &DiagramName) -> Result<usize, String> {
        let source = self.store.load_diagram(name).await.map_err(|err| err.to_string())?;
        let image = self.renderer.render(&source).await.map_err(|err| err.to_string())?;
        self.store
            .save_rendered_diagram(name, &image)
            .await
            .map_err(|err| err.to_string())?;
        Ok(image.len())
    }
}

fn abort(mut report: PipelineReport, stage: Stage, error: StageError) -> PipelineReport {
    error!(stage = %stage, error = %error, "Error generating {}", stage.label());
    report.finished_at = Timestamp::now();
    report.outcome = RunOutcome::Aborted { stage, error };
    report
}
