/// Error categorization for user-facing failure reporting.
///
/// Errors flow through the crate as `anyhow::Error`; before display they are
/// bucketed into coarse categories with an actionable hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Provider,
    Workflow,
    Tooling,
    Input,
    Internal,
}

impl ErrorCategory {
    pub fn code(self) -> &'static str {
        match self {
            ErrorCategory::Provider => "PROVIDER",
            ErrorCategory::Workflow => "WORKFLOW",
            ErrorCategory::Tooling => "TOOLING",
            ErrorCategory::Input => "INPUT",
            ErrorCategory::Internal => "INTERNAL",
        }
    }

    pub fn hint(self) -> &'static str {
        match self {
            ErrorCategory::Provider => {
                "Configure at least one provider in the manager or pass an explicit provider override."
            }
            ErrorCategory::Workflow => {
                "Inspect the step results for the failing workflow and raise retry_attempts if the failure is transient."
            }
            ErrorCategory::Tooling => {
                "Review the tool arguments and retry with RUST_LOG=debug for detailed tool logs."
            }
            ErrorCategory::Input => "Correct the request arguments and try again.",
            ErrorCategory::Internal => {
                "Retry with RUST_LOG=debug. If it persists, capture logs and open an issue."
            }
        }
    }
}

pub fn categorize_error(err: &anyhow::Error) -> ErrorCategory {
    let msg = format!("{err:#}").to_ascii_lowercase();

    if msg.contains("provider") || msg.contains("no llm") || msg.contains("all llm") {
        return ErrorCategory::Provider;
    }

    if msg.contains("empty") || msg.contains("too long") || msg.contains("invalid") {
        return ErrorCategory::Input;
    }

    if msg.contains("workflow") || msg.contains("step") {
        return ErrorCategory::Workflow;
    }

    if msg.contains("tool") || msg.contains("note") || msg.contains("todo") || msg.contains("search")
    {
        return ErrorCategory::Tooling;
    }

    ErrorCategory::Internal
}

pub fn format_error(err: &anyhow::Error) -> String {
    let category = categorize_error(err);
    format!("[{}] {}\nHint: {}", category.code(), err, category.hint())
}
