//! Common test fixtures: small workflow graphs in API format.
use serde_json::{Value, json};
use tsugite::prelude::*;

/// Parses a fixture graph.
#[allow(dead_code)]
pub fn graph(value: Value) -> Graph {
    Graph::from_value(value).expect("fixture must be a JSON object")
}

/// The `inputs` object of node `id`, as JSON.
#[allow(dead_code)]
pub fn inputs_of(graph: &Graph, id: &str) -> Value {
    graph
        .node(id)
        .unwrap_or_else(|| panic!("node '{}' missing", id))
        .to_value()["inputs"]
        .clone()
}

/// Two loaders `1` (A) and `2` (B), a constant `3`, an indexed switch `10`
/// selecting by that constant and a sink `20` reading the switch.
#[allow(dead_code)]
pub fn indexed_switch_graph(select: Value) -> Graph {
    graph(json!({
        "1": {"inputs": {"image": "a.png"}, "class_type": "LoadImage", "_meta": {"title": "A"}},
        "2": {"inputs": {"image": "b.png"}, "class_type": "LoadImage", "_meta": {"title": "B"}},
        "3": {"inputs": {"value": select}, "class_type": "SimpleMathInt+"},
        "10": {
            "inputs": {"input1": ["1", 0], "input2": ["2", 0], "select": ["3", 0], "sel_mode": false},
            "class_type": "ImpactSwitch"
        },
        "20": {"inputs": {"images": ["10", 0], "filename_prefix": "out"}, "class_type": "SaveImage"}
    }))
}

/// An inverse switch `10` over loader `1`, with consumers of both outputs.
#[allow(dead_code)]
pub fn inverse_switch_graph(select: Value) -> Graph {
    graph(json!({
        "1": {"inputs": {"image": "a.png"}, "class_type": "LoadImage"},
        "3": {"inputs": {"value": select}, "class_type": "SimpleMathInt+"},
        "10": {"inputs": {"input": ["1", 0], "select": ["3", 0]}, "class_type": "ImpactInversedSwitch"},
        "20": {"inputs": {"images": ["10", 0]}, "class_type": "SaveImage"},
        "21": {"inputs": {"images": ["10", 1]}, "class_type": "PreviewImage"}
    }))
}

/// A model loader subgraph instance (`1200`) with a LoRA stack: `SG:11` is
/// gated by "cats", `SG:12` by "dogs", and the sampler `30` reads the end of
/// the chain.
#[allow(dead_code)]
pub fn lora_chain_graph() -> Graph {
    graph(json!({
        "4": {"inputs": {"ckpt_name": "base.safetensors"}, "class_type": "CheckpointLoaderSimple"},
        "1200:11": {
            "inputs": {"model": ["4", 0], "clip": ["4", 1], "lora_name": "cats.safetensors"},
            "class_type": "LoraLoader"
        },
        "1200:12": {
            "inputs": {"model": ["1200:11", 0], "clip": ["1200:11", 1], "lora_name": "dogs.safetensors"},
            "class_type": "LoraLoader"
        },
        "30": {"inputs": {"model": ["1200:12", 0], "seed": 7}, "class_type": "KSampler"}
    }))
}

/// The groups gating [`lora_chain_graph`].
#[allow(dead_code)]
pub fn lora_groups() -> Vec<Group> {
    vec![
        Group {
            subgraph_id: Some("1200".to_string()),
            triggers: vec!["cats".to_string()],
            node_ids: vec!["11".to_string()],
        },
        Group {
            subgraph_id: Some("1200".to_string()),
            triggers: vec!["dogs".to_string()],
            node_ids: vec!["12".to_string()],
        },
    ]
}

/// A scratch directory unique to one test.
#[allow(dead_code)]
pub fn scratch_dir(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("tsugite-{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).expect("Failed to create scratch dir");
    dir
}
