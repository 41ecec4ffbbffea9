/// Workflow coordinator: instance registry and bounded workflow queue.
///
/// Queued workflows start in FIFO order. Capacity is a counter checked
/// inside a single loop; each drain pass starts at most
/// `max_concurrent_workflows` workflows and awaits each one inline, so there
/// is no real parallel scheduling.
use std::collections::{HashMap, VecDeque};

use anyhow::Result;
use serde::Serialize;
use serde_json::json;

use crate::config::RuntimeConfig;
use crate::telemetry::{TelemetrySink, unix_ms_now};
use crate::workflow::{
    DevelopmentWorkflow, WorkflowConfig, WorkflowProgress, WorkflowStatus,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowType {
    Development,
    Deployment,
    Testing,
    Maintenance,
}

/// One tracked workflow and its lifecycle timestamps.
pub struct WorkflowInstance {
    pub workflow_id: String,
    pub workflow_type: WorkflowType,
    pub project_id: String,
    pub status: WorkflowStatus,
    pub workflow: DevelopmentWorkflow,
    pub created_at: u128,
    pub started_at: Option<u128>,
    pub completed_at: Option<u128>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkflowStatusReport {
    pub workflow_id: String,
    pub workflow_type: WorkflowType,
    pub project_id: String,
    pub status: WorkflowStatus,
    pub created_at: u128,
    pub started_at: Option<u128>,
    pub completed_at: Option<u128>,
    pub progress: WorkflowProgress,
}

#[derive(Debug, Clone, Serialize)]
pub struct CoordinatorStatus {
    pub total_workflows: usize,
    pub queued_workflows: usize,
    pub max_concurrent: usize,
    pub pending: usize,
    pub running: usize,
    pub completed: usize,
    pub failed: usize,
    pub cancelled: usize,
    pub projects_active: usize,
}

pub struct WorkflowCoordinator {
    active_workflows: HashMap<String, WorkflowInstance>,
    workflow_queue: VecDeque<String>,
    max_concurrent_workflows: usize,
    telemetry: TelemetrySink,
}

impl WorkflowCoordinator {
    pub fn new(max_concurrent_workflows: usize) -> Self {
        Self {
            active_workflows: HashMap::new(),
            workflow_queue: VecDeque::new(),
            max_concurrent_workflows: max_concurrent_workflows.max(1),
            telemetry: TelemetrySink::disabled(),
        }
    }

    pub fn from_config(cfg: &RuntimeConfig) -> Self {
        Self::new(cfg.max_concurrent_workflows).with_telemetry(TelemetrySink::new(cfg))
    }

    pub fn with_telemetry(mut self, telemetry: TelemetrySink) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Register and enqueue a development workflow, then process the queue.
    ///
    /// Returns the workflow id. Duplicate ids are rejected.
    pub async fn start_development_workflow(
        &mut self,
        project_id: &str,
        config: WorkflowConfig,
    ) -> Result<String> {
        let workflow_id = config.workflow_id.clone();
        if self.active_workflows.contains_key(&workflow_id) {
            anyhow::bail!("workflow '{workflow_id}' is already registered");
        }

        let workflow =
            DevelopmentWorkflow::new(config).with_telemetry(self.telemetry.clone());
        let instance = WorkflowInstance {
            workflow_id: workflow_id.clone(),
            workflow_type: WorkflowType::Development,
            project_id: project_id.to_string(),
            status: WorkflowStatus::Pending,
            workflow,
            created_at: unix_ms_now(),
            started_at: None,
            completed_at: None,
        };

        self.active_workflows.insert(workflow_id.clone(), instance);
        self.workflow_queue.push_back(workflow_id.clone());
        tracing::info!(
            workflow_id = %workflow_id,
            project_id = project_id,
            "started development workflow"
        );

        self.process_queue().await;
        Ok(workflow_id)
    }

    /// Drain the queue, starting workflows while capacity allows.
    pub async fn process_queue(&mut self) {
        let mut running_count = self
            .active_workflows
            .values()
            .filter(|w| w.status == WorkflowStatus::Running)
            .count();

        while running_count < self.max_concurrent_workflows
            && let Some(workflow_id) = self.workflow_queue.pop_front()
        {
            let Some(instance) = self.active_workflows.get_mut(&workflow_id) else {
                continue;
            };
            if instance.status != WorkflowStatus::Pending {
                continue;
            }

            instance.status = WorkflowStatus::Running;
            instance.started_at = Some(unix_ms_now());
            self.telemetry
                .emit("workflow.started", json!({ "workflow_id": workflow_id }));

            match instance.workflow.execute().await {
                Ok(report) => {
                    instance.status = report.status;
                    instance.completed_at = Some(unix_ms_now());
                    tracing::info!(workflow_id = %workflow_id, "completed workflow");
                    self.telemetry
                        .emit("workflow.completed", json!({ "workflow_id": workflow_id }));
                }
                Err(err) => {
                    instance.status = WorkflowStatus::Failed;
                    instance.completed_at = Some(unix_ms_now());
                    tracing::error!(
                        workflow_id = %workflow_id,
                        error = %err,
                        "workflow failed"
                    );
                    self.telemetry.emit(
                        "workflow.failed",
                        json!({
                            "workflow_id": workflow_id,
                            "error": format!("{err:#}"),
                        }),
                    );
                }
            }

            running_count += 1;
        }
    }

    pub fn workflow_status(&self, workflow_id: &str) -> Option<WorkflowStatusReport> {
        let instance = self.active_workflows.get(workflow_id)?;
        Some(WorkflowStatusReport {
            workflow_id: instance.workflow_id.clone(),
            workflow_type: instance.workflow_type,
            project_id: instance.project_id.clone(),
            status: instance.status,
            created_at: instance.created_at,
            started_at: instance.started_at,
            completed_at: instance.completed_at,
            progress: instance.workflow.progress(),
        })
    }

    pub fn pause_workflow(&mut self, workflow_id: &str) -> bool {
        let Some(instance) = self.active_workflows.get_mut(workflow_id) else {
            return false;
        };
        match instance.workflow.pause() {
            Ok(()) => {
                instance.status = WorkflowStatus::Pending;
                tracing::info!(workflow_id = %workflow_id, "paused workflow");
                true
            }
            Err(err) => {
                tracing::error!(workflow_id = %workflow_id, error = %err, "failed to pause workflow");
                false
            }
        }
    }

    pub fn resume_workflow(&mut self, workflow_id: &str) -> bool {
        let Some(instance) = self.active_workflows.get_mut(workflow_id) else {
            return false;
        };
        match instance.workflow.resume() {
            Ok(()) => {
                instance.status = WorkflowStatus::Running;
                tracing::info!(workflow_id = %workflow_id, "resumed workflow");
                true
            }
            Err(err) => {
                tracing::error!(workflow_id = %workflow_id, error = %err, "failed to resume workflow");
                false
            }
        }
    }

    pub fn cancel_workflow(&mut self, workflow_id: &str) -> bool {
        let Some(instance) = self.active_workflows.get_mut(workflow_id) else {
            return false;
        };
        match instance.workflow.cancel() {
            Ok(()) => {
                instance.status = WorkflowStatus::Cancelled;
                instance.completed_at = Some(unix_ms_now());
                tracing::info!(workflow_id = %workflow_id, "cancelled workflow");
                true
            }
            Err(err) => {
                tracing::error!(workflow_id = %workflow_id, error = %err, "failed to cancel workflow");
                false
            }
        }
    }

    /// Status reports for every workflow belonging to a project.
    pub fn project_workflows(&self, project_id: &str) -> Vec<WorkflowStatusReport> {
        let mut reports: Vec<WorkflowStatusReport> = self
            .active_workflows
            .values()
            .filter(|w| w.project_id == project_id)
            .filter_map(|w| self.workflow_status(&w.workflow_id))
            .collect();
        reports.sort_by(|a, b| a.workflow_id.cmp(&b.workflow_id));
        reports
    }

    pub fn coordinator_status(&self) -> CoordinatorStatus {
        let count = |status: WorkflowStatus| {
            self.active_workflows
                .values()
                .filter(|w| w.status == status)
                .count()
        };
        let projects: std::collections::BTreeSet<&str> = self
            .active_workflows
            .values()
            .map(|w| w.project_id.as_str())
            .collect();

        CoordinatorStatus {
            total_workflows: self.active_workflows.len(),
            queued_workflows: self.workflow_queue.len(),
            max_concurrent: self.max_concurrent_workflows,
            pending: count(WorkflowStatus::Pending),
            running: count(WorkflowStatus::Running),
            completed: count(WorkflowStatus::Completed),
            failed: count(WorkflowStatus::Failed),
            cancelled: count(WorkflowStatus::Cancelled),
            projects_active: projects.len(),
        }
    }

    /// Drop finished workflows older than `max_age`.
    ///
    /// Returns the number of workflows removed.
    pub fn cleanup_finished(&mut self, max_age: chrono::Duration) -> usize {
        let now = unix_ms_now();
        let max_age_ms = max_age.num_milliseconds().max(0) as u128;

        let to_remove: Vec<String> = self
            .active_workflows
            .values()
            .filter(|w| {
                w.status.is_terminal()
                    && w.completed_at
                        .is_some_and(|done| now.saturating_sub(done) > max_age_ms)
            })
            .map(|w| w.workflow_id.clone())
            .collect();

        for workflow_id in &to_remove {
            self.active_workflows.remove(workflow_id);
            tracing::info!(workflow_id = %workflow_id, "cleaned up finished workflow");
        }
        to_remove.len()
    }

    pub fn instance_mut(&mut self, workflow_id: &str) -> Option<&mut WorkflowInstance> {
        self.active_workflows.get_mut(workflow_id)
    }

    /// Register an externally built instance without enqueueing it.
    pub fn register_instance(&mut self, instance: WorkflowInstance) {
        self.active_workflows
            .insert(instance.workflow_id.clone(), instance);
    }

    /// Re-enqueue a registered workflow for the next drain pass.
    pub fn workflow_queue_push(&mut self, workflow_id: &str) {
        self.workflow_queue.push_back(workflow_id.to_string());
    }
}
