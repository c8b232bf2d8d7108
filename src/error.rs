use thiserror::Error;

/// Errors that can occur while ingesting or emitting a graph document.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Failed to parse graph JSON: {0}")]
    Json(String),

    #[error("Graph root must be a JSON object keyed by node id, but found {found}")]
    NotAnObject { found: &'static str },
}

/// Errors that can occur while reading a layout document or a group list.
#[derive(Error, Debug, Clone)]
pub enum LayoutError {
    #[error("Failed to parse layout JSON: {0}")]
    Json(String),

    #[error("Could not access '{path}': {message}")]
    Io { path: String, message: String },
}

/// Errors that can occur while preparing or running a batch.
#[derive(Error, Debug, Clone)]
pub enum BatchError {
    #[error("Invalid batch configuration: {0}")]
    Config(String),

    #[error("Could not access '{path}': {message}")]
    Io { path: String, message: String },

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(
        "No loader node found with class_type '{class_type}' and title '{title}', and the fallback id is not in the graph"
    )]
    LoaderNotFound { class_type: String, title: String },

    #[error("Invalid input pattern: {0}")]
    Pattern(String),

    #[error("Submission failed: {0}")]
    Transport(String),
}

impl BatchError {
    pub(crate) fn io(path: impl AsRef<std::path::Path>, err: impl std::fmt::Display) -> Self {
        BatchError::Io {
            path: path.as_ref().display().to_string(),
            message: err.to_string(),
        }
    }
}

impl LayoutError {
    pub(crate) fn io(path: impl AsRef<std::path::Path>, err: impl std::fmt::Display) -> Self {
        LayoutError::Io {
            path: path.as_ref().display().to_string(),
            message: err.to_string(),
        }
    }
}
