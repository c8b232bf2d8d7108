//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and functions from the
//! tsugite crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use tsugite::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let text = std::fs::read_to_string("path/to/workflow.json")?;
//! let mut graph = Graph::from_json_str(&text)?;
//! strip_switches(&mut graph);
//! assert!(graph.dangling_references().is_empty());
//! # Ok(())
//! # }
//! ```

// Graph model
pub use crate::graph::{
    Bypass, Graph, GraphEntry, InputValue, Node, RedirectOptions, Reference, SourceId,
    classify_input,
};

// Rewrite passes
pub use crate::groups::layout::{extract_groups, load_layout};
pub use crate::groups::{Group, SkipSet, bypass_nodes, load_groups, path_matches_any};
pub use crate::selector::{strip_switches, strip_switches_json};

// Batch
pub use crate::batch::{BatchConfig, Runner, Submission, Submitter, Template};

// Error types
pub use crate::error::{BatchError, GraphError, LayoutError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
