//! Extraction of fenced Mermaid blocks from model output.

use std::sync::OnceLock;

use regex::Regex;

static MERMAID_BLOCK: OnceLock<Regex> = OnceLock::new();

fn mermaid_block() -> &'static Regex {
    MERMAID_BLOCK.get_or_init(|| {
        // Lazy body so adjacent fences are never merged into one match.
        Regex::new(r"(?s)```mermaid\s*(.*?)\s*```").expect("mermaid fence pattern is valid")
    })
}

/// Returns the body of every ```` ```mermaid ```` block in `text`, in order of
/// appearance, with the whitespace just inside the fences trimmed.
///
/// The marker tag is case-sensitive. Returns an empty vector when `text`
/// contains no block.
pub fn extract_mermaid_diagrams(text: &str) -> Vec<String> {
    mermaid_block()
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|body| body.as_str().to_string())
        .collect()
}
