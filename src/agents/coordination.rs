/// Per-project agent registry and multi-agent task coordination.
use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Agent, TaskOutput, TaskRequest};
use crate::provider::TaskType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

/// A task that requires coordination between multiple agents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinationTask {
    pub task_id: String,
    pub project_id: String,
    pub task_type: TaskType,
    pub required_agents: Vec<String>,
    #[serde(default)]
    pub dependencies: Vec<String>,
    pub priority: Priority,
    #[serde(default)]
    pub context: Value,
}

/// Outcome of a coordinated task run.
#[derive(Debug, Clone, Serialize)]
pub struct CoordinationOutcome {
    pub task_id: String,
    pub results: Vec<TaskOutput>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectStatus {
    pub project_id: String,
    pub active_agents: usize,
    pub agent_types: Vec<String>,
    pub queued_tasks: usize,
}

/// Coordinates the agents registered for one project.
///
/// Agents run sequentially in the order their types appear in the task's
/// `required_agents` list; each output is validated before the next agent
/// starts.
pub struct AgentCoordinator {
    project_id: String,
    active_agents: HashMap<String, Arc<dyn Agent>>,
    task_queue: Vec<CoordinationTask>,
}

impl AgentCoordinator {
    pub fn new(project_id: &str) -> Self {
        Self {
            project_id: project_id.to_string(),
            active_agents: HashMap::new(),
            task_queue: Vec::new(),
        }
    }

    /// Register an agent for coordination in this project.
    pub fn register_agent(&mut self, agent: Arc<dyn Agent>) {
        let key = format!("{}_{}", agent.config().agent_type, agent.config().agent_id);
        tracing::info!(
            agent = %key,
            project_id = %self.project_id,
            "registered agent"
        );
        self.active_agents.insert(key, agent);
    }

    /// Queue a task for later assignment.
    pub fn enqueue_task(&mut self, task: CoordinationTask) {
        self.task_queue.push(task);
    }

    /// Assign a coordination task to the agents matching its required types.
    pub async fn assign_task(&self, task: &CoordinationTask) -> Result<CoordinationOutcome> {
        tracing::info!(task_id = %task.task_id, "assigning coordination task");

        let mut suitable: Vec<Arc<dyn Agent>> = Vec::new();
        for agent_type in &task.required_agents {
            if let Some(agent) = self.find_agent_by_type(agent_type) {
                suitable.push(agent);
            }
        }

        if suitable.is_empty() {
            anyhow::bail!(
                "no suitable agents found for task '{}' (required: {})",
                task.task_id,
                task.required_agents.join(", ")
            );
        }

        let mut results = Vec::new();
        for agent in suitable {
            let agent_id = agent.config().agent_id.clone();
            tracing::debug!(
                agent_id = %agent_id,
                task_id = %task.task_id,
                "coordination task start"
            );

            let output = agent
                .process_task(&TaskRequest {
                    task_id: task.task_id.clone(),
                    project_id: task.project_id.clone(),
                    task_type: task.task_type,
                    context: task.context.clone(),
                })
                .await?;

            if !agent.validate_output(&output) {
                anyhow::bail!(
                    "agent '{}' output validation failed for task '{}'",
                    agent_id,
                    task.task_id
                );
            }

            tracing::debug!(
                agent_id = %agent_id,
                task_id = %task.task_id,
                "coordination task complete"
            );
            results.push(output);
        }

        Ok(CoordinationOutcome {
            task_id: task.task_id.clone(),
            results,
        })
    }

    pub fn find_agent_by_type(&self, agent_type: &str) -> Option<Arc<dyn Agent>> {
        self.active_agents
            .values()
            .find(|agent| agent.config().agent_type == agent_type)
            .cloned()
    }

    pub fn project_status(&self) -> ProjectStatus {
        let mut agent_types: Vec<String> = self
            .active_agents
            .values()
            .map(|a| a.config().agent_type.clone())
            .collect();
        agent_types.sort();

        ProjectStatus {
            project_id: self.project_id.clone(),
            active_agents: self.active_agents.len(),
            agent_types,
            queued_tasks: self.task_queue.len(),
        }
    }
}
