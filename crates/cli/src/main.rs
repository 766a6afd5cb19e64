//! SDLC pipeline CLI entry point.
//!
//! This binary is the composition root for the entire system. Responsibilities:
//!
//! 1. **Wire observability**: `tracing-subscriber` console/JSON output plus an
//!    optional OpenTelemetry OTLP exporter (see [`telemetry`]).
//! 2. **Load configuration**: find `_config` (writing a sample one if none
//!    exists), parse it once, and build the typed model-server config.
//! 3. **Construct infrastructure**: `HttpModelClient`, filesystem template
//!    source and artifact store, mermaid.ink renderer, injected into
//!    [`stages::PipelineExecutor`].
//! 4. **Run and report**: run the pipeline on the built-in user story and
//!    print where the artifacts went. Exits non-zero if a stage failed.

mod bootstrap;
mod telemetry;

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use llm::{ConfigResolver, HttpModelClient};
use renderer::MermaidInkRenderer;
use stages::{FsArtifactStore, FsTemplateSource, PipelineExecutor, PipelineReport, RenderStatus, RunOutcome};
use tracing::info;

const USER_STORY: &str = "
    As a university student, I want a task management application that helps me organize my assignments,
    track deadlines, set priorities, and receive reminders. The application should allow me to categorize
    tasks by course, set recurring tasks for regular study sessions, and provide analytics on my productivity
    and completion rates.
    ";

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let telemetry = telemetry::init()?;
    let result = run().await;
    telemetry.shutdown();
    result
}

async fn run() -> Result<ExitCode> {
    info!("Starting SDLC Automation Pipeline...");
    info!(user_story = USER_STORY.trim(), "User story");

    let config_file =
        bootstrap::load_or_create_config(&ConfigResolver::default(), Path::new(bootstrap::SAMPLE_CONFIG_PATH))?;
    let server = bootstrap::model_server_config(&config_file)?;
    let settings = bootstrap::pipeline_settings(&config_file)?;

    let client = HttpModelClient::new(&server).context("failed to build model client")?;
    let executor = PipelineExecutor::new(
        settings.clone(),
        Arc::new(client),
        Arc::new(FsTemplateSource::new(&settings.templates_dir)),
        Arc::new(FsArtifactStore::new(&settings.output_dir)),
        Arc::new(MermaidInkRenderer::new(settings.render_base_url.clone())),
    );

    let report = executor
        .run(USER_STORY)
        .await
        .context("failed to prepare output directories")?;

    print_summary(&report, &settings.output_dir);
    Ok(if report.is_complete() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_summary(report: &PipelineReport, out: &Path) {
    match &report.outcome {
        RunOutcome::Completed => {
            let rendered = report
                .renders
                .iter()
                .filter(|r| matches!(r.status, RenderStatus::Rendered { .. }))
                .count();
            println!("\nSDLC Pipeline Complete! (run {})", report.run_id);
            println!("Generated files:");
            println!("- Requirements: {}", out.join("requirements.txt").display());
            println!(
                "- Architecture: {} and {}",
                out.join("architecture.txt").display(),
                out.join("diagrams/architecture.png").display()
            );
            println!(
                "- UML Diagrams: {} and {}",
                out.join("uml_diagrams.txt").display(),
                out.join("diagrams/uml_diagram_*.png").display()
            );
            println!("- Implementation: {}", out.join("code/implementation.py").display());
            println!("Rendered {rendered} of {} diagram(s).", report.renders.len());
        }
        RunOutcome::Aborted { stage, error } => {
            println!("\nSDLC Pipeline encountered errors. Please check the logs above.");
            println!("Stage '{stage}' failed: {error}");
            let completed: Vec<&str> = report.results.stages().map(|s| s.key()).collect();
            if !completed.is_empty() {
                println!("Completed before the failure: {}", completed.join(", "));
            }
        }
    }
}
