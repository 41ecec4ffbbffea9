/// Web search tool returning mock results.
use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const SEARCH_QUERY_MAX_CHARS: usize = 500;
pub const MOCK_RESULT_COUNT: usize = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
    pub relevance_score: f64,
}

/// Mock web search standing in for the backend search infrastructure.
pub struct WebSearchTool {
    project_id: Option<String>,
}

impl WebSearchTool {
    pub fn new(project_id: Option<&str>) -> Self {
        Self {
            project_id: project_id.map(str::to_string),
        }
    }

    /// Perform a web search and return mock results.
    pub async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        validate_search_query(query)?;
        tracing::info!(
            query = query,
            project_id = self.project_id.as_deref().unwrap_or("-"),
            "performing web search"
        );

        // Stand-in latency for the remote search call.
        tokio::time::sleep(std::time::Duration::from_millis(1)).await;

        let count = max_results.min(MOCK_RESULT_COUNT);
        let results = (0..count)
            .map(|i| SearchResult {
                title: format!("Result for {query} #{i}"),
                url: format!("https://example.com/result-{i}"),
                snippet: format!("This is a mock search result for query: {query}"),
                relevance_score: 1.0 - (i as f64 * 0.1),
            })
            .collect();
        Ok(results)
    }

    /// Search with the query enhanced by project context.
    pub async fn search_with_context(
        &self,
        query: &str,
        context: &Value,
        max_results: usize,
    ) -> Result<Vec<SearchResult>> {
        let enhanced = enhance_query_with_context(query, context);
        self.search(&enhanced, max_results).await
    }
}

/// Append tech stack and project type from the context to the query.
pub fn enhance_query_with_context(query: &str, context: &Value) -> String {
    let mut terms: Vec<String> = Vec::new();

    if let Some(stack) = context.get("tech_stack").and_then(Value::as_array) {
        terms.extend(
            stack
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string),
        );
    }
    if let Some(project_type) = context.get("project_type").and_then(Value::as_str)
        && !project_type.is_empty()
    {
        terms.push(project_type.to_string());
    }

    if terms.is_empty() {
        query.to_string()
    } else {
        format!("{query} {}", terms.join(" "))
    }
}

pub fn validate_search_query(query: &str) -> Result<()> {
    if query.trim().is_empty() {
        anyhow::bail!("search query is empty");
    }
    if query.chars().count() > SEARCH_QUERY_MAX_CHARS {
        anyhow::bail!("search query is too long (max {SEARCH_QUERY_MAX_CHARS} chars)");
    }
    Ok(())
}
