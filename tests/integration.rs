//! Integration tests for Tsugite
//!
//! End-to-end tests that prepare a template, specialize it per item and drive
//! the submission loop against an in-memory engine.
//!
mod common;
use common::*;
use serde_json::{Value, json};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::result::Result;
use std::time::Duration;
use tsugite::prelude::*;

fn workflow() -> Graph {
    graph(json!({
        "4": {"inputs": {"ckpt_name": "base.safetensors"}, "class_type": "CheckpointLoaderSimple"},
        "7": {
            "inputs": {"folder": "", "start_index": 0, "image_load_cap": 1},
            "class_type": "LoadImagesFromFolderKJ",
            "_meta": {"title": "LoadImage"}
        },
        "1200:11": {
            "inputs": {"model": ["4", 0], "clip": ["4", 1], "lora_name": "cats.safetensors"},
            "class_type": "LoraLoader"
        },
        "1200:12": {
            "inputs": {"model": ["1200:11", 0], "clip": ["1200:11", 1], "lora_name": "dogs.safetensors"},
            "class_type": "LoraLoader"
        },
        "8": {"inputs": {"value": 2}, "class_type": "SimpleMathInt+"},
        "9": {"inputs": {"input1": ["4", 0], "input2": ["1200:12", 0], "select": ["8", 0]}, "class_type": "ImpactSwitch"},
        "30": {"inputs": {"model": ["9", 0], "image": ["7", 0], "seed": 7}, "class_type": "KSampler"}
    }))
}

fn config() -> BatchConfig {
    BatchConfig::from_json_str(r#"{"workflow": "workflow.json", "input_dir": "/data/in"}"#)
        .expect("Failed to parse config")
}

/// An engine that replays queue depths and records every submitted graph.
struct MockEngine {
    depths: RefCell<VecDeque<Result<usize, BatchError>>>,
    submitted: RefCell<Vec<(Value, String)>>,
    fail_submit: bool,
}

impl MockEngine {
    fn new(depths: Vec<Result<usize, BatchError>>) -> Self {
        Self {
            depths: RefCell::new(depths.into()),
            submitted: RefCell::new(Vec::new()),
            fail_submit: false,
        }
    }
}

impl Submitter for MockEngine {
    fn queue_depth(&self) -> Result<usize, BatchError> {
        self.depths.borrow_mut().pop_front().unwrap_or(Ok(0))
    }

    fn submit(&self, graph: &Graph, client_id: &str) -> Result<String, BatchError> {
        if self.fail_submit {
            return Err(BatchError::Transport("engine refused the prompt".to_string()));
        }
        let mut submitted = self.submitted.borrow_mut();
        submitted.push((graph.to_value(), client_id.to_string()));
        Ok(format!("job-{}", submitted.len() - 1))
    }
}

#[test]
fn test_config_defaults() {
    let config = config();
    assert_eq!(config.server, "http://127.0.0.1:8188");
    assert_eq!(config.groups_path, PathBuf::from("out/model_loader_groups.json"));
    assert_eq!(config.input_pattern, "**/*.png");
    assert_eq!(config.poll_interval(), Duration::from_secs(10));
    assert_eq!(config.loader_fallback_id, "1100");

    let err = BatchConfig::from_json_str(r#"{"input_dir": "/x"}"#).unwrap_err();
    assert!(matches!(err, BatchError::Config(_)));
}

#[test]
fn test_template_configures_loader() {
    let template = Template::prepare(workflow(), &config()).unwrap();
    assert_eq!(template.loader_id(), "7");
    let loader = inputs_of(template.graph(), "7");
    assert_eq!(loader["folder"], json!("/data/in"));
    assert_eq!(loader["include_subfolders"], json!(true));
}

#[test]
fn test_template_falls_back_to_configured_id() {
    let mut g = workflow();
    let loader = g.node("7").unwrap().to_value();
    g.delete_node("7");
    g.insert_node("1100", Node::from_map(loader.as_object().unwrap().clone()));
    let mut renamed = config();
    renamed.loader_title = "Something else".to_string();

    let template = Template::prepare(g, &renamed).unwrap();
    assert_eq!(template.loader_id(), "1100");
}

#[test]
fn test_template_without_loader_fails() {
    let mut g = workflow();
    g.delete_node("7");
    let err = Template::prepare(g, &config()).unwrap_err();
    assert!(matches!(err, BatchError::LoaderNotFound { .. }));
    assert!(err.to_string().contains("LoadImagesFromFolderKJ"));
}

#[test]
fn test_build_item_specializes_a_copy() {
    let template = Template::prepare(workflow(), &config()).unwrap();
    let item = template.build_item(3, &PathBuf::from("/data/in/dogs/003.png"), &lora_groups());

    assert_eq!(inputs_of(&item, "7")["start_index"], json!(3));
    assert!(!item.contains("1200:11"));
    assert!(!item.contains("9"));
    assert!(item.contains("1200:12"));
    assert_eq!(inputs_of(&item, "30")["model"], json!(["1200:12", 0]));
    assert_eq!(inputs_of(&item, "1200:12")["model"], json!(["4", 1]));
    assert!(item.dangling_references().is_empty());

    // The template itself is never touched.
    assert!(template.graph().contains("1200:11"));
    assert!(template.graph().contains("9"));
    assert_eq!(inputs_of(template.graph(), "7")["start_index"], json!(0));
}

#[test]
fn test_build_item_without_groups_only_strips_switches() {
    let template = Template::prepare(workflow(), &config()).unwrap();
    let item = template.build_item(0, &PathBuf::from("/data/in/x.png"), &[]);
    assert_eq!(item.len(), template.graph().len() - 1);
    assert!(!item.contains("9"));
}

#[test]
fn test_runner_waits_for_empty_queue() {
    let template = Template::prepare(workflow(), &config()).unwrap();
    let groups = lora_groups();
    let engine = MockEngine::new(vec![
        Ok(2),
        Err(BatchError::Transport("connection refused".to_string())),
        Ok(0),
        Ok(1),
    ]);
    let inputs = vec![
        PathBuf::from("/data/in/cats/001.png"),
        PathBuf::from("/data/in/dogs/002.png"),
    ];

    let runner = Runner::new(&template, &groups, engine, "client-1".to_string())
        .with_poll_interval(Duration::ZERO);
    let submissions = runner.run(&inputs).unwrap();

    assert_eq!(
        submissions,
        vec![
            Submission {
                index: 0,
                path: inputs[0].clone(),
                job_id: "job-0".to_string()
            },
            Submission {
                index: 1,
                path: inputs[1].clone(),
                job_id: "job-1".to_string()
            },
        ]
    );

    let submitted = runner.submitter().submitted.borrow();
    assert_eq!(submitted.len(), 2);
    assert_eq!(submitted[0].1, "client-1");
    assert_eq!(submitted[0].0["7"]["inputs"]["start_index"], json!(0));
    assert_eq!(submitted[1].0["7"]["inputs"]["start_index"], json!(1));
    // The cats item loses the dogs LoRA and vice versa.
    assert!(submitted[0].0.get("1200:12").is_none());
    assert!(submitted[0].0.get("1200:11").is_some());
    assert!(submitted[1].0.get("1200:11").is_none());
}

#[test]
fn test_runner_stops_on_failed_submission() {
    let template = Template::prepare(workflow(), &config()).unwrap();
    let mut engine = MockEngine::new(Vec::new());
    engine.fail_submit = true;

    let runner = Runner::new(&template, &[], engine, "client".to_string())
        .with_poll_interval(Duration::ZERO);
    let err = runner
        .run(&[PathBuf::from("/data/in/a.png")])
        .unwrap_err();
    assert!(matches!(err, BatchError::Transport(_)));
}

#[test]
fn test_runner_with_no_inputs_submits_nothing() {
    let template = Template::prepare(workflow(), &config()).unwrap();
    let runner = Runner::new(&template, &[], MockEngine::new(Vec::new()), "c".to_string());
    assert!(runner.run(&[]).unwrap().is_empty());
    assert!(runner.submitter().submitted.borrow().is_empty());
}

#[cfg(feature = "runner")]
#[test]
fn test_collect_inputs_matches_files_recursively() {
    use tsugite::batch::collect_inputs;

    let dir = scratch_dir("inputs");
    std::fs::create_dir_all(dir.join("cats")).unwrap();
    std::fs::write(dir.join("a.png"), b"").unwrap();
    std::fs::write(dir.join("cats").join("b.png"), b"").unwrap();
    std::fs::write(dir.join("notes.txt"), b"").unwrap();

    let inputs = collect_inputs(&dir, "**/*.png").unwrap();
    assert_eq!(inputs.len(), 2);
    assert!(inputs.iter().all(|path| path.extension().is_some_and(|ext| ext == "png")));
    std::fs::remove_dir_all(dir).unwrap();
}

#[cfg(feature = "runner")]
#[test]
fn test_collect_inputs_treats_directory_name_literally() {
    use tsugite::batch::collect_inputs;

    let dir = scratch_dir("bracketed");
    let bracketed = dir.join("set[1]");
    std::fs::create_dir_all(&bracketed).unwrap();
    std::fs::create_dir_all(dir.join("set1")).unwrap();
    std::fs::write(bracketed.join("a.png"), b"").unwrap();
    std::fs::write(dir.join("set1").join("b.png"), b"").unwrap();

    let inputs = collect_inputs(&bracketed, "**/*.png").unwrap();
    assert_eq!(inputs, vec![bracketed.join("a.png")]);
    std::fs::remove_dir_all(dir).unwrap();
}
