/// Development workflow: ordered steps with bounded per-step retries.
///
/// Steps are delegated to workpools through the [`StepExecutor`] seam; the
/// production executor returns mock workpool payloads. Execution is
/// sequential. The `parallel_execution` flag is accepted for config
/// compatibility but falls back to sequential execution.
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::telemetry::TelemetrySink;

// ---------------------------------------------------------------------------
// Steps and statuses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStep {
    ArchitectureDesign,
    TaskCreation,
    WorkAssignment,
    Coding,
    Testing,
    Qa,
    Deployment,
}

impl WorkflowStep {
    pub fn label(self) -> &'static str {
        match self {
            WorkflowStep::ArchitectureDesign => "architecture_design",
            WorkflowStep::TaskCreation => "task_creation",
            WorkflowStep::WorkAssignment => "work_assignment",
            WorkflowStep::Coding => "coding",
            WorkflowStep::Testing => "testing",
            WorkflowStep::Qa => "qa",
            WorkflowStep::Deployment => "deployment",
        }
    }

    /// The workpool responsible for this step.
    pub fn workpool(self) -> &'static str {
        match self {
            WorkflowStep::ArchitectureDesign => "architecture",
            WorkflowStep::TaskCreation | WorkflowStep::WorkAssignment => "task",
            WorkflowStep::Coding => "coding",
            WorkflowStep::Testing | WorkflowStep::Qa => "testing",
            WorkflowStep::Deployment => "deployment",
        }
    }

    /// The full development lifecycle in execution order.
    pub fn full_lifecycle() -> Vec<WorkflowStep> {
        vec![
            WorkflowStep::ArchitectureDesign,
            WorkflowStep::TaskCreation,
            WorkflowStep::WorkAssignment,
            WorkflowStep::Coding,
            WorkflowStep::Testing,
            WorkflowStep::Qa,
            WorkflowStep::Deployment,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl WorkflowStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            WorkflowStatus::Completed | WorkflowStatus::Failed | WorkflowStatus::Cancelled
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowConfig {
    pub project_id: String,
    pub workflow_id: String,
    pub steps: Vec<WorkflowStep>,
    #[serde(default)]
    pub parallel_execution: bool,
    pub retry_attempts: u32,
}

impl WorkflowConfig {
    pub fn new(project_id: &str, workflow_id: &str) -> Self {
        Self {
            project_id: project_id.to_string(),
            workflow_id: workflow_id.to_string(),
            steps: WorkflowStep::full_lifecycle(),
            parallel_execution: false,
            retry_attempts: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub step: WorkflowStep,
    pub status: WorkflowStatus,
    pub output: Value,
    #[serde(default)]
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkflowProgress {
    pub workflow_id: String,
    pub status: WorkflowStatus,
    pub current_step: usize,
    pub total_steps: usize,
    pub completed_steps: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkflowReport {
    pub workflow_id: String,
    pub status: WorkflowStatus,
    pub results: Vec<StepResult>,
}

// ---------------------------------------------------------------------------
// Step execution seam
// ---------------------------------------------------------------------------

/// Executes one workflow step against its workpool.
#[async_trait]
pub trait StepExecutor: Send + Sync {
    async fn run(&self, step: WorkflowStep, config: &WorkflowConfig) -> Result<Value>;
}

/// Production executor delegating to mocked workpools.
pub struct WorkpoolExecutor;

#[async_trait]
impl StepExecutor for WorkpoolExecutor {
    async fn run(&self, step: WorkflowStep, _config: &WorkflowConfig) -> Result<Value> {
        let workpool = step.workpool();
        tracing::info!(
            step = step.label(),
            workpool = workpool,
            "delegating step to workpool"
        );
        Ok(json!({
            "step": step.label(),
            "workpool": workpool,
            "result": format!("Mock result for {}", step.label()),
        }))
    }
}

// ---------------------------------------------------------------------------
// Development workflow
// ---------------------------------------------------------------------------

pub struct DevelopmentWorkflow {
    config: WorkflowConfig,
    executor: Arc<dyn StepExecutor>,
    telemetry: TelemetrySink,
    current_step: usize,
    step_results: Vec<StepResult>,
    status: WorkflowStatus,
}

impl DevelopmentWorkflow {
    pub fn new(config: WorkflowConfig) -> Self {
        Self::with_executor(config, Arc::new(WorkpoolExecutor))
    }

    pub fn with_executor(config: WorkflowConfig, executor: Arc<dyn StepExecutor>) -> Self {
        Self {
            config,
            executor,
            telemetry: TelemetrySink::disabled(),
            current_step: 0,
            step_results: Vec::new(),
            status: WorkflowStatus::Pending,
        }
    }

    pub fn with_telemetry(mut self, telemetry: TelemetrySink) -> Self {
        self.telemetry = telemetry;
        self
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    pub fn status(&self) -> WorkflowStatus {
        self.status
    }

    pub fn step_results(&self) -> &[StepResult] {
        &self.step_results
    }

    /// Execute the complete workflow.
    pub async fn execute(&mut self) -> Result<WorkflowReport> {
        tracing::info!(workflow_id = %self.config.workflow_id, "starting development workflow");
        self.status = WorkflowStatus::Running;

        let outcome = if self.config.parallel_execution {
            // Parallel execution is not implemented; run sequentially.
            tracing::warn!(
                workflow_id = %self.config.workflow_id,
                "parallel execution requested, falling back to sequential"
            );
            self.execute_sequential().await
        } else {
            self.execute_sequential().await
        };

        match outcome {
            Ok(()) => {
                self.status = WorkflowStatus::Completed;
            }
            Err(err) => {
                tracing::error!(
                    workflow_id = %self.config.workflow_id,
                    error = %err,
                    "workflow execution failed"
                );
                self.status = WorkflowStatus::Failed;
                return Err(err);
            }
        }

        Ok(WorkflowReport {
            workflow_id: self.config.workflow_id.clone(),
            status: self.status,
            results: self.step_results.clone(),
        })
    }

    async fn execute_sequential(&mut self) -> Result<()> {
        let steps = self.config.steps.clone();
        for step in steps {
            tracing::info!(step = step.label(), "executing step");

            let mut result = self.execute_step(step).await;
            if result.status == WorkflowStatus::Failed {
                let mut retry = 0;
                while retry < self.config.retry_attempts {
                    tracing::info!(
                        step = step.label(),
                        attempt = retry + 1,
                        "retrying failed step"
                    );
                    self.telemetry.emit(
                        "step.retried",
                        json!({
                            "workflow_id": self.config.workflow_id,
                            "step": step.label(),
                            "attempt": retry + 1,
                        }),
                    );
                    result = self.execute_step(step).await;
                    if result.status == WorkflowStatus::Completed {
                        break;
                    }
                    retry += 1;
                }
            }

            let failed = result.status == WorkflowStatus::Failed;
            let error = result.error.clone();
            self.step_results.push(result);

            if failed {
                anyhow::bail!(
                    "step '{}' failed after {} retries: {}",
                    step.label(),
                    self.config.retry_attempts,
                    error.unwrap_or_else(|| "unknown error".to_string())
                );
            }

            self.current_step += 1;
        }
        Ok(())
    }

    async fn execute_step(&self, step: WorkflowStep) -> StepResult {
        let started = Instant::now();
        match self.executor.run(step, &self.config).await {
            Ok(output) => StepResult {
                step,
                status: WorkflowStatus::Completed,
                output,
                duration_ms: Some(started.elapsed().as_millis() as u64),
                error: None,
            },
            Err(err) => StepResult {
                step,
                status: WorkflowStatus::Failed,
                output: Value::Null,
                duration_ms: Some(started.elapsed().as_millis() as u64),
                error: Some(format!("{err:#}")),
            },
        }
    }

    pub fn progress(&self) -> WorkflowProgress {
        let total_steps = self.config.steps.len();
        let completed_steps = self
            .step_results
            .iter()
            .filter(|r| r.status == WorkflowStatus::Completed)
            .count();
        let percentage = if total_steps > 0 {
            (completed_steps as f64 / total_steps as f64) * 100.0
        } else {
            0.0
        };

        WorkflowProgress {
            workflow_id: self.config.workflow_id.clone(),
            status: self.status,
            current_step: self.current_step,
            total_steps,
            completed_steps,
            percentage,
        }
    }

    /// Pause the workflow. Durable pause lives in the backend; here it only
    /// flips the local status.
    pub fn pause(&mut self) -> Result<()> {
        anyhow::ensure!(
            !self.status.is_terminal(),
            "workflow '{}' is already finished",
            self.config.workflow_id
        );
        tracing::info!(workflow_id = %self.config.workflow_id, "pausing workflow");
        self.status = WorkflowStatus::Pending;
        Ok(())
    }

    pub fn resume(&mut self) -> Result<()> {
        anyhow::ensure!(
            self.status == WorkflowStatus::Pending,
            "workflow '{}' is not paused",
            self.config.workflow_id
        );
        tracing::info!(workflow_id = %self.config.workflow_id, "resuming workflow");
        self.status = WorkflowStatus::Running;
        Ok(())
    }

    pub fn cancel(&mut self) -> Result<()> {
        anyhow::ensure!(
            !self.status.is_terminal(),
            "workflow '{}' is already finished",
            self.config.workflow_id
        );
        tracing::info!(workflow_id = %self.config.workflow_id, "cancelled workflow");
        self.status = WorkflowStatus::Cancelled;
        Ok(())
    }
}
