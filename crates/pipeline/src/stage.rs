//! The four generation stages and the results they accumulate.
//!
//! Each stage reads one template, fills exactly one placeholder with the
//! previous stage's output, and writes its text to a fixed path under the
//! output directory.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::DiagramName;

/// One step of the generation sequence, ordered as executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Requirements,
    Architecture,
    #[serde(rename = "uml_diagrams")]
    Uml,
    Implementation,
}

impl Stage {
    /// All stages in execution order.
    pub const ALL: [Stage; 4] = [
        Stage::Requirements,
        Stage::Architecture,
        Stage::Uml,
        Stage::Implementation,
    ];

    /// Key under which the stage's text is reported.
    pub fn key(self) -> &'static str {
        match self {
            Self::Requirements => "requirements",
            Self::Architecture => "architecture",
            Self::Uml => "uml_diagrams",
            Self::Implementation => "implementation",
        }
    }

    /// Human-readable label used in progress events.
    pub fn label(self) -> &'static str {
        match self {
            Self::Requirements => "Requirements",
            Self::Architecture => "Architecture",
            Self::Uml => "UML Diagrams",
            Self::Implementation => "Implementation Code",
        }
    }

    /// 1-based position in the sequence.
    pub fn number(self) -> usize {
        match self {
            Self::Requirements => 1,
            Self::Architecture => 2,
            Self::Uml => 3,
            Self::Implementation => 4,
        }
    }

    /// Name of the prompt template the stage loads.
    pub fn template(self) -> &'static str {
        match self {
            Self::Requirements => "requirements",
            Self::Architecture => "architecture",
            Self::Uml => "uml",
            Self::Implementation => "implementation",
        }
    }

    /// Name of the `{placeholder}` this stage's template consumes.
    pub fn placeholder(self) -> &'static str {
        match self {
            Self::Requirements => "user_story",
            Self::Architecture => "requirements",
            Self::Uml => "architecture",
            Self::Implementation => "design",
        }
    }

    /// Output path relative to the output directory.
    pub fn output_path(self) -> &'static str {
        match self {
            Self::Requirements => "requirements.txt",
            Self::Architecture => "architecture.txt",
            Self::Uml => "uml_diagrams.txt",
            Self::Implementation => "code/implementation.py",
        }
    }

    /// Whether diagrams embedded in this stage's output are extracted.
    pub fn extracts_diagrams(self) -> bool {
        matches!(self, Self::Architecture | Self::Uml)
    }

    /// File stem for the `index`-th (0-based) diagram found in this stage's output.
    ///
    /// Architecture diagrams: `architecture`, `architecture_2`, ...
    /// UML diagrams: `uml_diagram_1`, `uml_diagram_2`, ...
    /// Other stages do not produce diagrams and return `None`.
    pub fn diagram_name(self, index: usize) -> Option<DiagramName> {
        let name = match (self, index) {
            (Self::Architecture, 0) => "architecture".to_string(),
            (Self::Architecture, i) => format!("architecture_{}", i + 1),
            (Self::Uml, i) => format!("uml_diagram_{}", i + 1),
            _ => return None,
        };
        DiagramName::new(name)
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Text produced by each successful stage of a run.
///
/// Grows monotonically; a stage is only inserted after its model call
/// succeeded, so an error message is never stored as a result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageResults(BTreeMap<Stage, String>);

impl StageResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a stage's output. Re-recording a stage replaces its text.
    pub fn record(&mut self, stage: Stage, text: impl Into<String>) {
        self.0.insert(stage, text.into());
    }

    pub fn get(&self, stage: Stage) -> Option<&str> {
        self.0.get(&stage).map(String::as_str)
    }

    pub fn contains(&self, stage: Stage) -> bool {
        self.0.contains_key(&stage)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Stages that completed, in execution order.
    pub fn stages(&self) -> impl Iterator<Item = Stage> + '_ {
        self.0.keys().copied()
    }

    /// `(stage, text)` pairs in execution order.
    pub fn iter(&self) -> impl Iterator<Item = (Stage, &str)> + '_ {
        self.0.iter().map(|(stage, text)| (*stage, text.as_str()))
    }
}
