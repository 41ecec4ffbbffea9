/// Mocked LLM provider integrations.
///
/// The GPT and Claude integrations implement a common async [`LlmProvider`]
/// trait and return deterministic mock completions; no network calls are
/// made. Rate limiting is delegated to an external component and only usage
/// counters are tracked here.
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Provider selection types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Gpt,
    Claude,
    Auto,
}

impl ProviderKind {
    pub fn label(self) -> &'static str {
        match self {
            ProviderKind::Gpt => "gpt",
            ProviderKind::Claude => "claude",
            ProviderKind::Auto => "auto",
        }
    }
}

/// Task categories used for provider routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    CodeGeneration,
    CodeAnalysis,
    Architecture,
    RequirementsAnalysis,
    General,
}

impl TaskType {
    pub fn label(self) -> &'static str {
        match self {
            TaskType::CodeGeneration => "code_generation",
            TaskType::CodeAnalysis => "code_analysis",
            TaskType::Architecture => "architecture",
            TaskType::RequirementsAnalysis => "requirements_analysis",
            TaskType::General => "general",
        }
    }
}

// ---------------------------------------------------------------------------
// Requests and responses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct GenerateRequest {
    pub prompt: String,
    pub system_prompt: Option<String>,
    pub context: Option<Value>,
}

impl GenerateRequest {
    pub fn new(prompt: &str) -> Self {
        Self {
            prompt: prompt.to_string(),
            system_prompt: None,
            context: None,
        }
    }

    pub fn with_system(mut self, system_prompt: &str) -> Self {
        self.system_prompt = Some(system_prompt.to_string());
        self
    }

    pub fn with_context(mut self, context: Value) -> Self {
        self.context = Some(context);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub content: String,
    pub usage_tokens: u64,
    pub model: String,
    pub finish_reason: String,
}

impl LlmResponse {
    /// Whether the response is usable: non-empty content and accounted usage.
    pub fn is_valid(&self) -> bool {
        !self.content.trim().is_empty() && self.usage_tokens > 0
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct UsageStats {
    pub requests: u64,
    pub total_tokens: u64,
}

// ---------------------------------------------------------------------------
// Provider trait
// ---------------------------------------------------------------------------

#[async_trait]
pub trait LlmProvider: Send + Sync {
    fn name(&self) -> &str;

    fn kind(&self) -> ProviderKind;

    async fn generate(&self, request: &GenerateRequest) -> Result<LlmResponse>;

    fn usage(&self) -> UsageStats;
}

// ---------------------------------------------------------------------------
// GPT integration (mock)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GptConfig {
    pub model: Option<String>,
    pub max_tokens: Option<u64>,
    pub temperature: Option<f64>,
    pub rate_limit_per_minute: Option<u64>,
}

impl Default for GptConfig {
    fn default() -> Self {
        Self {
            model: Some("gpt-5".to_string()),
            max_tokens: Some(4000),
            temperature: Some(0.7),
            rate_limit_per_minute: Some(60),
        }
    }
}

pub struct GptProvider {
    model: String,
    max_tokens: u64,
    requests: AtomicU64,
    total_tokens: AtomicU64,
}

impl GptProvider {
    pub fn new(config: GptConfig) -> Self {
        Self {
            model: config.model.unwrap_or_else(|| "gpt-5".to_string()),
            max_tokens: config.max_tokens.unwrap_or(4000),
            requests: AtomicU64::new(0),
            total_tokens: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl LlmProvider for GptProvider {
    fn name(&self) -> &str {
        &self.model
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Gpt
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<LlmResponse> {
        let response = mock_completion(&self.model, self.max_tokens, request)?;
        self.requests.fetch_add(1, Ordering::Relaxed);
        self.total_tokens
            .fetch_add(response.usage_tokens, Ordering::Relaxed);
        tracing::debug!(model = %self.model, tokens = response.usage_tokens, "gpt generation");
        Ok(response)
    }

    fn usage(&self) -> UsageStats {
        UsageStats {
            requests: self.requests.load(Ordering::Relaxed),
            total_tokens: self.total_tokens.load(Ordering::Relaxed),
        }
    }
}

// ---------------------------------------------------------------------------
// Claude integration (mock)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClaudeConfig {
    pub model: Option<String>,
    pub max_tokens: Option<u64>,
    pub temperature: Option<f64>,
    pub rate_limit_per_minute: Option<u64>,
}

impl Default for ClaudeConfig {
    fn default() -> Self {
        Self {
            model: Some("claude-4.1".to_string()),
            max_tokens: Some(4000),
            temperature: Some(0.7),
            rate_limit_per_minute: Some(50),
        }
    }
}

pub struct ClaudeProvider {
    model: String,
    max_tokens: u64,
    requests: AtomicU64,
    total_tokens: AtomicU64,
}

impl ClaudeProvider {
    pub fn new(config: ClaudeConfig) -> Self {
        Self {
            model: config.model.unwrap_or_else(|| "claude-4.1".to_string()),
            max_tokens: config.max_tokens.unwrap_or(4000),
            requests: AtomicU64::new(0),
            total_tokens: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl LlmProvider for ClaudeProvider {
    fn name(&self) -> &str {
        &self.model
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Claude
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<LlmResponse> {
        let response = mock_completion(&self.model, self.max_tokens, request)?;
        self.requests.fetch_add(1, Ordering::Relaxed);
        self.total_tokens
            .fetch_add(response.usage_tokens, Ordering::Relaxed);
        tracing::debug!(model = %self.model, tokens = response.usage_tokens, "claude generation");
        Ok(response)
    }

    fn usage(&self) -> UsageStats {
        UsageStats {
            requests: self.requests.load(Ordering::Relaxed),
            total_tokens: self.total_tokens.load(Ordering::Relaxed),
        }
    }
}

// ---------------------------------------------------------------------------
// Mock completion
// ---------------------------------------------------------------------------

/// Build a deterministic stand-in completion for a request.
///
/// Token usage is a rough word count of the prompt plus the canned reply,
/// capped at the provider's `max_tokens`.
fn mock_completion(
    model: &str,
    max_tokens: u64,
    request: &GenerateRequest,
) -> Result<LlmResponse> {
    let prompt = request.prompt.trim();
    if prompt.is_empty() {
        anyhow::bail!("prompt is empty");
    }

    let mut content = String::new();
    if let Some(system) = &request.system_prompt {
        let first_line = system.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
        content.push_str(&format!("[{}] ", first_line.trim()));
    }
    content.push_str(&format!("{model} mock response for: {prompt}"));

    let usage = (prompt.split_whitespace().count() as u64 + 32).min(max_tokens);
    let response = LlmResponse {
        content,
        usage_tokens: usage.max(1),
        model: model.to_string(),
        finish_reason: "stop".to_string(),
    };

    if !response.is_valid() {
        anyhow::bail!("provider '{model}' produced an invalid response");
    }
    Ok(response)
}
