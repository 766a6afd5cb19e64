//! Prompt template interpolation.

/// Replaces every `{placeholder}` in `template` with `value`.
///
/// Plain substitution: other braces are left untouched, and a template that
/// lacks the placeholder is returned unchanged.
pub fn interpolate(template: &str, placeholder: &str, value: &str) -> String {
    template.replace(&format!("{{{placeholder}}}"), value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_every_occurrence() {
        let out = interpolate("Story: {user_story}\nAgain: {user_story}", "user_story", "X");
        assert_eq!(out, "Story: X\nAgain: X");
    }

    #[test]
    fn leaves_unrelated_braces_alone() {
        let out = interpolate("{\"json\": 1} {design}", "design", "D");
        assert_eq!(out, "{\"json\": 1} D");
    }

    #[test]
    fn empty_template_stays_empty() {
        assert_eq!(interpolate("", "requirements", "R"), "");
    }
}
