/// Agent layer.
///
/// Agents wrap a specialized capability behind a common async trait:
///
/// - [`Agent`]: `process_task` plus `validate_output`, the contract the
///   coordinator relies on
/// - [`LlmTaskAgent`]: routes tasks through the [`LlmManager`] by task type
/// - [`coordination::AgentCoordinator`]: per-project registry and sequential
///   multi-agent task execution
pub mod coordination;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::provider::TaskType;
use crate::routing::LlmManager;

/// Configuration for an agent instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    pub agent_id: String,
    pub agent_type: String,
    pub model: String,
    pub system_prompt: String,
    pub tools: Vec<String>,
    pub workpool_name: String,
    pub max_concurrent_tasks: usize,
    #[serde(default)]
    pub context_namespace: Option<String>,
}

/// A task handed to a single agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRequest {
    pub task_id: String,
    pub project_id: String,
    pub task_type: TaskType,
    #[serde(default)]
    pub context: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Success,
    Error,
}

/// Output from an agent's task processing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskOutput {
    pub status: TaskStatus,
    pub result: Value,
    #[serde(default)]
    pub agent_id: Option<String>,
}

#[async_trait]
pub trait Agent: Send + Sync {
    fn config(&self) -> &AgentConfig;

    /// Process a task using the agent's specialized capability.
    async fn process_task(&self, task: &TaskRequest) -> Result<TaskOutput>;

    /// Validate agent output before it is accepted downstream.
    ///
    /// The default check requires a success status and a non-null result.
    fn validate_output(&self, output: &TaskOutput) -> bool {
        output.status == TaskStatus::Success && !output.result.is_null()
    }
}

/// An agent that delegates its tasks to the LLM routing layer.
pub struct LlmTaskAgent {
    config: AgentConfig,
    manager: LlmManager,
}

impl LlmTaskAgent {
    pub fn new(config: AgentConfig, manager: LlmManager) -> Self {
        Self { config, manager }
    }
}

#[async_trait]
impl Agent for LlmTaskAgent {
    fn config(&self) -> &AgentConfig {
        &self.config
    }

    async fn process_task(&self, task: &TaskRequest) -> Result<TaskOutput> {
        tracing::info!(
            agent_id = %self.config.agent_id,
            task_id = %task.task_id,
            task_type = task.task_type.label(),
            "processing task"
        );

        let prompt = task
            .context
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or(&task.task_id)
            .to_string();

        let response = self
            .manager
            .generate_response(
                &prompt,
                task.task_type,
                None,
                Some(&self.config.system_prompt),
            )
            .await?;

        Ok(TaskOutput {
            status: TaskStatus::Success,
            result: json!({
                "content": response.content,
                "model": response.model,
                "usage_tokens": response.usage_tokens,
            }),
            agent_id: Some(self.config.agent_id.clone()),
        })
    }
}
