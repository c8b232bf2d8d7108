use crate::error::BatchError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Batch run settings, read from a JSON file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BatchConfig {
    /// The template graph to submit once per input.
    pub workflow: PathBuf,
    /// Root directory of the inputs; also written into the loader node.
    pub input_dir: PathBuf,
    #[serde(default = "default_server")]
    pub server: String,
    #[serde(default = "default_groups_path")]
    pub groups_path: PathBuf,
    #[serde(default = "default_input_pattern")]
    pub input_pattern: String,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_loader_class")]
    pub loader_class: String,
    #[serde(default = "default_loader_title")]
    pub loader_title: String,
    #[serde(default = "default_loader_fallback_id")]
    pub loader_fallback_id: String,
}

fn default_server() -> String {
    "http://127.0.0.1:8188".to_string()
}

fn default_groups_path() -> PathBuf {
    PathBuf::from("out/model_loader_groups.json")
}

fn default_input_pattern() -> String {
    "**/*.png".to_string()
}

fn default_poll_interval_secs() -> u64 {
    10
}

fn default_loader_class() -> String {
    "LoadImagesFromFolderKJ".to_string()
}

fn default_loader_title() -> String {
    "LoadImage".to_string()
}

fn default_loader_fallback_id() -> String {
    "1100".to_string()
}

impl BatchConfig {
    /// Load the configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, BatchError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| BatchError::io(path, e))?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(text: &str) -> Result<Self, BatchError> {
        serde_json::from_str(text).map_err(|e| BatchError::Config(e.to_string()))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}
