//! # Tsugite - Per-Item Workflow Graph Rewriting
//!
//! **Tsugite** rewrites node-based image workflows before they are queued on an
//! execution engine. A single template graph is specialized for every input of a
//! batch by splicing nodes out of it: consumers of a removed node are rewired
//! straight to the producer it would have forwarded, so the graph stays
//! consistent without ever being executed.
//!
//! ## Core Workflow
//!
//! 1.  **Load the Graph**: Parse the workflow's API-format JSON into a [`graph::Graph`].
//!     Every input is classified once into a literal or a wire to another node's output.
//! 2.  **Cut Untriggered Groups**: Build a [`groups::SkipSet`] from the groups whose
//!     trigger words do not occur in the item's path, and bypass those nodes with
//!     [`groups::bypass_nodes`].
//! 3.  **Strip Switches**: Replace every switch by the input it selects with
//!     [`selector::strip_switches`], reading constant `select` values where possible.
//! 4.  **Submit**: Serialize the graph and hand it to a [`batch::Submitter`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tsugite::prelude::*;
//! use std::path::Path;
//!
//! fn main() -> Result<()> {
//!     let template = Graph::from_json_str(&std::fs::read_to_string("workflow.json")?)?;
//!     let groups = load_groups("out/model_loader_groups.json")?;
//!
//!     // Every item works on its own copy of the template.
//!     let mut graph = template.clone();
//!     let skip = SkipSet::for_path(&groups, Path::new("/in/cats/001.png"));
//!     bypass_nodes(&mut graph, &skip);
//!     let removed = strip_switches(&mut graph);
//!
//!     println!("Removed {} switches", removed.len());
//!     println!("{}", graph.to_json_pretty()?);
//!     Ok(())
//! }
//! ```

pub mod batch;
pub mod error;
pub mod graph;
pub mod groups;
pub mod prelude;
pub mod selector;

#[cfg(feature = "python-bindings")]
mod python;
