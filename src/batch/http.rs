use super::Submitter;
use crate::error::BatchError;
use crate::graph::Graph;
use reqwest::blocking::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

const QUEUE_TIMEOUT: Duration = Duration::from_secs(30);
const PROMPT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Serialize)]
struct PromptRequest<'a> {
    prompt: &'a Graph,
    client_id: &'a str,
}

/// Talks to the execution engine's HTTP API (`/queue` and `/prompt`).
pub struct HttpSubmitter {
    client: Client,
    base_url: String,
}

impl HttpSubmitter {
    pub fn new(base_url: impl Into<String>) -> Result<Self, BatchError> {
        let client = Client::builder()
            .build()
            .map_err(|e| BatchError::Transport(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn get_json(&self, path: &str, timeout: Duration) -> Result<Value, BatchError> {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .timeout(timeout)
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.json())
            .map_err(|e| BatchError::Transport(e.to_string()))
    }
}

impl Submitter for HttpSubmitter {
    fn queue_depth(&self) -> Result<usize, BatchError> {
        let queue = self.get_json("/queue", QUEUE_TIMEOUT)?;
        Ok(queue
            .get("queue_pending")
            .and_then(Value::as_array)
            .map_or(0, Vec::len))
    }

    fn submit(&self, graph: &Graph, client_id: &str) -> Result<String, BatchError> {
        let response: Value = self
            .client
            .post(format!("{}/prompt", self.base_url))
            .timeout(PROMPT_TIMEOUT)
            .json(&PromptRequest {
                prompt: graph,
                client_id,
            })
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.json())
            .map_err(|e| BatchError::Transport(e.to_string()))?;

        match response.get("prompt_id") {
            Some(Value::String(id)) => Ok(id.clone()),
            Some(Value::Number(id)) => Ok(id.to_string()),
            _ => Err(BatchError::Transport(
                "response carried no prompt_id".to_string(),
            )),
        }
    }
}

/// A fresh session id for one batch run.
pub fn new_client_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
