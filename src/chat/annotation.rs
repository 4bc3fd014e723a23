//! Display-time failure annotation.
//!
//! Annotating is idempotent: any trailing copies of the suffix are stripped
//! before exactly one is appended.

pub fn strip_failure(text: &str, suffix: &str) -> String {
    if suffix.is_empty() {
        return text.to_string();
    }
    let mut stripped = text;
    while let Some(rest) = stripped.strip_suffix(suffix) {
        stripped = rest;
    }
    stripped.to_string()
}

pub fn annotate_failure(text: &str, suffix: &str) -> String {
    let mut annotated = strip_failure(text, suffix);
    annotated.push_str(suffix);
    annotated
}
