use crate::error::BatchError;
use log::warn;
use std::path::{Path, PathBuf};

/// Lists the files under `dir` matching `pattern` (e.g. `**/*.png`), in glob order.
/// Glob metacharacters in `dir` itself are matched literally.
pub fn collect_inputs(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>, BatchError> {
    let root = dir
        .to_str()
        .ok_or_else(|| BatchError::Pattern(format!("{} is not valid UTF-8", dir.display())))?;
    let full = Path::new(&glob::Pattern::escape(root)).join(pattern);
    let full = full
        .to_str()
        .ok_or_else(|| BatchError::Pattern(format!("{} is not valid UTF-8", full.display())))?;
    let entries = glob::glob(full).map_err(|e| BatchError::Pattern(e.to_string()))?;

    Ok(entries
        .filter_map(|entry| match entry {
            Ok(path) if path.is_file() => Some(path),
            Ok(_) => None,
            Err(e) => {
                warn!("skipping unreadable input: {}", e);
                None
            }
        })
        .collect())
}
