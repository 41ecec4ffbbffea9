/// Provider routing with preference table and single-hop fallback.
///
/// The manager owns at most one GPT and one Claude provider. Routing is a
/// static lookup: code generation prefers GPT, analysis-style tasks prefer
/// Claude, everything else auto-selects by availability. When the primary
/// provider fails and no explicit override was given, the other provider is
/// tried exactly once.
use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{Value, json};

use crate::config::RuntimeConfig;
use crate::provider::{
    ClaudeProvider, GenerateRequest, GptProvider, LlmProvider, LlmResponse, ProviderKind, TaskType,
    UsageStats,
};
use crate::telemetry::TelemetrySink;

pub struct LlmManager {
    gpt: Option<Arc<dyn LlmProvider>>,
    claude: Option<Arc<dyn LlmProvider>>,
    preferences: HashMap<TaskType, ProviderKind>,
    enable_fallback: bool,
    telemetry: TelemetrySink,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProviderStatus {
    pub gpt_available: bool,
    pub claude_available: bool,
    pub gpt_usage: Option<UsageStats>,
    pub claude_usage: Option<UsageStats>,
}

impl LlmManager {
    pub fn new(
        gpt: Option<Arc<dyn LlmProvider>>,
        claude: Option<Arc<dyn LlmProvider>>,
        enable_fallback: bool,
    ) -> Self {
        Self {
            gpt,
            claude,
            preferences: default_preferences(),
            enable_fallback,
            telemetry: TelemetrySink::disabled(),
        }
    }

    /// Build providers from the runtime config.
    pub fn from_config(cfg: &RuntimeConfig) -> Self {
        let gpt = cfg
            .gpt
            .clone()
            .map(|c| Arc::new(GptProvider::new(c)) as Arc<dyn LlmProvider>);
        let claude = cfg
            .claude
            .clone()
            .map(|c| Arc::new(ClaudeProvider::new(c)) as Arc<dyn LlmProvider>);
        Self::new(gpt, claude, cfg.enable_fallback)
    }

    pub fn with_telemetry(mut self, telemetry: TelemetrySink) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Generate a response, routing by task type unless `provider` overrides.
    ///
    /// An explicit override disables fallback: the caller asked for that
    /// provider specifically.
    pub async fn generate_response(
        &self,
        prompt: &str,
        task_type: TaskType,
        provider: Option<ProviderKind>,
        system_prompt: Option<&str>,
    ) -> Result<LlmResponse> {
        let selected = match provider {
            Some(kind) => self.resolve_kind(kind)?,
            None => self.select_provider(task_type)?,
        };

        tracing::info!(
            provider = selected.label(),
            task_type = task_type.label(),
            "generating response"
        );

        let mut request = GenerateRequest::new(prompt);
        if let Some(system) = system_prompt {
            request = request.with_system(system);
        }

        match self.try_provider(selected, &request).await {
            Ok(response) => Ok(response),
            Err(primary_err) => {
                if self.enable_fallback
                    && provider.is_none()
                    && let Some(fallback) = self.fallback_for(selected)
                {
                    tracing::warn!(
                        primary = selected.label(),
                        fallback = fallback.label(),
                        error = %primary_err,
                        "primary provider failed, falling back"
                    );
                    self.telemetry.emit(
                        "provider.fallback",
                        json!({
                            "primary": selected.label(),
                            "fallback": fallback.label(),
                        }),
                    );
                    return self
                        .try_provider(fallback, &request)
                        .await
                        .context("all LLM providers failed to generate a response");
                }
                Err(primary_err)
            }
        }
    }

    /// Generate code with the best available provider for code generation.
    pub async fn generate_code(
        &self,
        task_description: &str,
        tech_stack: &[String],
        existing_context: Option<&str>,
    ) -> Result<String> {
        let system_prompt = format!(
            "You are a code generation agent working with tech stack: {}.\n\
             Generate clean, maintainable code that follows best practices.",
            tech_stack.join(", ")
        );

        let mut prompt = format!("Generate code for: {task_description}");
        if let Some(context) = existing_context {
            prompt.push_str(&format!("\n\nExisting context: {context}"));
        }

        let response = self
            .generate_response(
                &prompt,
                TaskType::CodeGeneration,
                None,
                Some(&system_prompt),
            )
            .await?;
        Ok(response.content)
    }

    /// Analyze code with the best available provider for analysis.
    pub async fn analyze_code(&self, code_snippet: &str, analysis_type: &str) -> Result<Value> {
        let system_prompt = format!(
            "You are a code analysis agent specializing in {analysis_type} analysis.\n\
             Provide thorough, actionable feedback on code quality and improvements."
        );
        let prompt = format!("Analyze this code for {analysis_type}:\n\n{code_snippet}");

        let response = self
            .generate_response(&prompt, TaskType::CodeAnalysis, None, Some(&system_prompt))
            .await?;
        Ok(json!({
            "analysis": response.content,
            "type": analysis_type,
        }))
    }

    pub fn provider_status(&self) -> ProviderStatus {
        ProviderStatus {
            gpt_available: self.gpt.is_some(),
            claude_available: self.claude.is_some(),
            gpt_usage: self.gpt.as_ref().map(|p| p.usage()),
            claude_usage: self.claude.as_ref().map(|p| p.usage()),
        }
    }

    /// Select a provider for the task type, honoring availability.
    pub fn select_provider(&self, task_type: TaskType) -> Result<ProviderKind> {
        let preferred = self
            .preferences
            .get(&task_type)
            .copied()
            .unwrap_or(ProviderKind::Auto);

        let selected = match preferred {
            ProviderKind::Auto => {
                // Default to GPT when both are configured.
                if self.gpt.is_some() {
                    ProviderKind::Gpt
                } else if self.claude.is_some() {
                    ProviderKind::Claude
                } else {
                    anyhow::bail!("no LLM provider is configured")
                }
            }
            ProviderKind::Gpt if self.gpt.is_some() => ProviderKind::Gpt,
            ProviderKind::Claude if self.claude.is_some() => ProviderKind::Claude,
            // Preferred provider unavailable: take whichever exists.
            _ => {
                if self.gpt.is_some() {
                    ProviderKind::Gpt
                } else if self.claude.is_some() {
                    ProviderKind::Claude
                } else {
                    anyhow::bail!("no LLM provider is configured")
                }
            }
        };

        Ok(selected)
    }

    fn resolve_kind(&self, kind: ProviderKind) -> Result<ProviderKind> {
        match kind {
            ProviderKind::Auto => self.select_provider(TaskType::General),
            ProviderKind::Gpt => {
                anyhow::ensure!(self.gpt.is_some(), "GPT provider is not configured");
                Ok(ProviderKind::Gpt)
            }
            ProviderKind::Claude => {
                anyhow::ensure!(self.claude.is_some(), "Claude provider is not configured");
                Ok(ProviderKind::Claude)
            }
        }
    }

    fn fallback_for(&self, primary: ProviderKind) -> Option<ProviderKind> {
        match primary {
            ProviderKind::Gpt if self.claude.is_some() => Some(ProviderKind::Claude),
            ProviderKind::Claude if self.gpt.is_some() => Some(ProviderKind::Gpt),
            _ => None,
        }
    }

    async fn try_provider(
        &self,
        kind: ProviderKind,
        request: &GenerateRequest,
    ) -> Result<LlmResponse> {
        let provider = match kind {
            ProviderKind::Gpt => self.gpt.as_ref(),
            ProviderKind::Claude => self.claude.as_ref(),
            ProviderKind::Auto => None,
        }
        .with_context(|| format!("provider '{}' is not configured", kind.label()))?;

        let response = provider
            .generate(request)
            .await
            .with_context(|| format!("provider '{}' failed", kind.label()))?;

        anyhow::ensure!(
            response.is_valid(),
            "provider '{}' returned an invalid response",
            kind.label()
        );
        Ok(response)
    }
}

fn default_preferences() -> HashMap<TaskType, ProviderKind> {
    HashMap::from([
        (TaskType::CodeGeneration, ProviderKind::Gpt),
        (TaskType::CodeAnalysis, ProviderKind::Claude),
        (TaskType::Architecture, ProviderKind::Claude),
        (TaskType::RequirementsAnalysis, ProviderKind::Claude),
        (TaskType::General, ProviderKind::Auto),
    ])
}
