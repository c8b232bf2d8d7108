//! Per-item graph preparation and the submission loop.
//!
//! The template graph is prepared once ([`Template::prepare`]) and then cloned
//! for every input: the clone gets the item's index, loses the groups the item
//! does not trigger, and has its switches stripped before it is handed to a
//! [`Submitter`].

use crate::error::BatchError;
use crate::graph::Graph;
use crate::groups::{Group, SkipSet, bypass_nodes};
use crate::selector::strip_switches;
use log::{debug, info, warn};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

mod config;
#[cfg(feature = "runner")]
mod http;
#[cfg(feature = "runner")]
mod inputs;

pub use config::*;
#[cfg(feature = "runner")]
pub use http::*;
#[cfg(feature = "runner")]
pub use inputs::*;

/// The execution engine a batch is submitted to.
pub trait Submitter {
    /// Number of jobs waiting to run.
    fn queue_depth(&self) -> Result<usize, BatchError>;

    /// Queues `graph` under `client_id` and returns the engine's job id.
    fn submit(&self, graph: &Graph, client_id: &str) -> Result<String, BatchError>;
}

/// A template graph with its folder-loader node located and configured.
#[derive(Debug, Clone)]
pub struct Template {
    graph: Graph,
    loader_id: String,
}

impl Template {
    /// Finds the loader node (by class and `_meta.title`, else the configured
    /// fallback id), points it at `input_dir` and enables subfolder scanning.
    pub fn prepare(mut graph: Graph, config: &BatchConfig) -> Result<Self, BatchError> {
        let loader_id = graph
            .nodes()
            .find(|(_, node)| {
                node.class_type() == config.loader_class
                    && node.title() == Some(config.loader_title.as_str())
            })
            .map(|(id, _)| id.to_string())
            .or_else(|| {
                graph
                    .node(&config.loader_fallback_id)
                    .map(|_| config.loader_fallback_id.clone())
            })
            .ok_or_else(|| BatchError::LoaderNotFound {
                class_type: config.loader_class.clone(),
                title: config.loader_title.clone(),
            })?;

        graph.set_input(
            &loader_id,
            "folder",
            Value::String(config.input_dir.to_string_lossy().into_owned()),
        );
        graph.set_input(&loader_id, "include_subfolders", Value::Bool(true));
        debug!("using loader node '{}'", loader_id);

        Ok(Self { graph, loader_id })
    }

    pub fn from_file(config: &BatchConfig) -> Result<Self, BatchError> {
        let text = std::fs::read_to_string(&config.workflow)
            .map_err(|e| BatchError::io(&config.workflow, e))?;
        Self::prepare(Graph::from_json_str(&text)?, config)
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn loader_id(&self) -> &str {
        &self.loader_id
    }

    /// Builds the graph submitted for the `index`-th input at `path`.
    pub fn build_item(&self, index: usize, path: &Path, groups: &[Group]) -> Graph {
        let mut graph = self.graph.clone();
        graph.set_input(&self.loader_id, "start_index", Value::from(index as u64));

        let skip = SkipSet::for_path(groups, path);
        if !skip.is_empty() {
            let bypassed = bypass_nodes(&mut graph, &skip);
            debug!(
                "{}: cut {} of {} skipped nodes",
                path.display(),
                bypassed.len(),
                skip.len()
            );
        }
        strip_switches(&mut graph);
        graph
    }
}

/// One queued input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub index: usize,
    pub path: PathBuf,
    pub job_id: String,
}

/// Feeds inputs to a [`Submitter`] one at a time, waiting for an empty queue
/// before each submission.
pub struct Runner<'a, S: Submitter> {
    template: &'a Template,
    groups: &'a [Group],
    submitter: S,
    client_id: String,
    poll_interval: Duration,
}

impl<'a, S: Submitter> Runner<'a, S> {
    pub fn new(template: &'a Template, groups: &'a [Group], submitter: S, client_id: String) -> Self {
        Self {
            template,
            groups,
            submitter,
            client_id,
            poll_interval: Duration::from_secs(10),
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn submitter(&self) -> &S {
        &self.submitter
    }

    /// Submits every input in order.
    ///
    /// A failed queue poll is logged and retried after the poll interval. A
    /// failed submission ends the run with that error.
    pub fn run(&self, inputs: &[PathBuf]) -> Result<Vec<Submission>, BatchError> {
        let mut submissions = Vec::with_capacity(inputs.len());
        while submissions.len() < inputs.len() {
            let index = submissions.len();
            match self.submitter.queue_depth() {
                Ok(0) => {
                    let path = &inputs[index];
                    let graph = self.template.build_item(index, path, self.groups);
                    let job_id = self.submitter.submit(&graph, &self.client_id)?;
                    info!(
                        "[queued] index={} file={} prompt_id={}",
                        index,
                        path.display(),
                        job_id
                    );
                    submissions.push(Submission {
                        index,
                        path: path.clone(),
                        job_id,
                    });
                }
                Ok(pending) => debug!("{} jobs pending; waiting", pending),
                Err(e) => warn!("[queue check error] {}", e),
            }
            thread::sleep(self.poll_interval);
        }
        Ok(submissions)
    }
}
