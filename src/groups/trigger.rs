use std::path::Path;

/// Returns `true` if any non-empty trigger occurs in `path`, ignoring case.
pub fn path_matches_any<S: AsRef<str>>(path: &Path, triggers: &[S]) -> bool {
    let haystack = path.to_string_lossy().to_lowercase();
    triggers
        .iter()
        .map(AsRef::as_ref)
        .filter(|trigger| !trigger.is_empty())
        .any(|trigger| haystack.contains(&trigger.to_lowercase()))
}

/// Derives trigger words from a group title.
///
/// The title is split on `", "` into at most two parts and the first word of
/// each part is kept, so `"cats model, dogs lora"` gives `["cats", "dogs"]`.
/// Titles without a second part fall back to their first two words.
pub fn triggers_from_title(title: &str) -> Vec<String> {
    if title.is_empty() {
        return Vec::new();
    }
    let triggers: Vec<String> = title
        .split(", ")
        .take(2)
        .map(|part| part.split(' ').next().unwrap_or_default().trim().to_string())
        .collect();
    if triggers.len() < 2 {
        return title.split(' ').take(2).map(str::to_string).collect();
    }
    triggers
}
