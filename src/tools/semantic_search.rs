/// Semantic search tool for codebase context retrieval (mocked).
use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::json;

pub const SEMANTIC_MOCK_RESULT_COUNT: usize = 3;
pub const SNIPPET_PREVIEW_CHARS: usize = 200;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticResult {
    pub content: String,
    pub file_path: String,
    pub relevance_score: f64,
    pub context: serde_json::Value,
}

/// Mock retrieval over a project namespace.
pub struct SemanticSearchTool {
    project_namespace: String,
}

impl SemanticSearchTool {
    pub fn new(project_namespace: &str) -> Self {
        Self {
            project_namespace: project_namespace.to_string(),
        }
    }

    /// Search the codebase for semantically relevant content.
    pub async fn search_codebase(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SemanticResult>> {
        if query.trim().is_empty() {
            anyhow::bail!("semantic search query is empty");
        }
        tracing::info!(
            namespace = %self.project_namespace,
            query = query,
            "performing semantic search"
        );

        let count = max_results.min(SEMANTIC_MOCK_RESULT_COUNT);
        let results = (0..count)
            .map(|i| SemanticResult {
                content: format!("Mock semantic content for query: {query}"),
                file_path: format!("src/mock-file-{i}.rs"),
                relevance_score: 0.9 - (i as f64 * 0.1),
                context: json!({
                    "namespace": self.project_namespace,
                    "function_name": format!("mock_function_{i}"),
                    "line_range": [10 + i * 5, 20 + i * 5],
                }),
            })
            .collect();
        Ok(results)
    }

    /// Search focused on documentation files.
    pub async fn search_documentation(&self, query: &str) -> Result<Vec<SemanticResult>> {
        let enhanced = format!("documentation {query}");
        self.search_codebase(&enhanced, SEMANTIC_MOCK_RESULT_COUNT)
            .await
    }

    /// Find code similar to the given snippet.
    pub async fn find_similar_implementations(
        &self,
        code_snippet: &str,
    ) -> Result<Vec<SemanticResult>> {
        let preview: String = code_snippet.chars().take(SNIPPET_PREVIEW_CHARS).collect();
        let query = format!("similar code implementation: {preview}");
        self.search_codebase(&query, SEMANTIC_MOCK_RESULT_COUNT)
            .await
    }

    /// Retrieve codebase context relevant to a task description.
    pub async fn context_for_task(&self, task_description: &str) -> Result<Vec<SemanticResult>> {
        let query = format!("relevant code for task: {task_description}");
        self.search_codebase(&query, SEMANTIC_MOCK_RESULT_COUNT)
            .await
    }

    /// Validate that a namespace matches this tool's configured namespace.
    pub fn validate_namespace(&self, namespace: &str) -> bool {
        !namespace.is_empty() && namespace == self.project_namespace
    }
}
