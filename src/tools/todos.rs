/// Todo manager tool for agent task tracking.
use std::collections::HashMap;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::ids::IdGenerator;
use crate::telemetry::unix_ms_now;

pub const TODO_TITLE_MAX_CHARS: usize = 200;
pub const TODO_DESCRIPTION_MAX_CHARS: usize = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TodoPriority {
    Low,
    Medium,
    High,
    Urgent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Todo {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: TodoStatus,
    pub priority: TodoPriority,
    pub agent_id: String,
    pub project_id: String,
    pub created_at: u128,
    pub updated_at: u128,
    #[serde(default)]
    pub due_date: Option<u128>,
    #[serde(default)]
    pub dependencies: Vec<String>,
}

/// Todo tool backed by an in-memory store standing in for the backend table.
pub struct TodoManager {
    agent_id: String,
    project_id: String,
    todos: HashMap<String, Todo>,
    ids: IdGenerator,
}

impl TodoManager {
    pub fn new(agent_id: &str, project_id: &str) -> Self {
        Self {
            agent_id: agent_id.to_string(),
            project_id: project_id.to_string(),
            todos: HashMap::new(),
            ids: IdGenerator::new("todo"),
        }
    }

    /// Create a new todo assigned to this tool's agent.
    pub fn create_todo(
        &mut self,
        title: &str,
        description: &str,
        priority: TodoPriority,
    ) -> Result<Todo> {
        validate_todo_data(title, description)?;
        tracing::info!(title = title, "creating todo");

        let now = unix_ms_now();
        let todo = Todo {
            id: self.ids.next_id(),
            title: title.to_string(),
            description: description.to_string(),
            status: TodoStatus::Pending,
            priority,
            agent_id: self.agent_id.clone(),
            project_id: self.project_id.clone(),
            created_at: now,
            updated_at: now,
            due_date: None,
            dependencies: Vec::new(),
        };
        self.todos.insert(todo.id.clone(), todo.clone());
        Ok(todo)
    }

    pub fn update_status(&mut self, todo_id: &str, status: TodoStatus) -> Result<()> {
        let todo = self
            .todos
            .get_mut(todo_id)
            .ok_or_else(|| anyhow::anyhow!("todo '{todo_id}' not found"))?;
        tracing::info!(todo_id = todo_id, status = ?status, "updating todo status");
        todo.status = status;
        todo.updated_at = unix_ms_now();
        Ok(())
    }

    /// Todos assigned to this tool's agent, optionally filtered by status.
    pub fn agent_todos(&self, status: Option<TodoStatus>) -> Vec<&Todo> {
        let mut todos: Vec<&Todo> = self
            .todos
            .values()
            .filter(|t| t.agent_id == self.agent_id)
            .filter(|t| status.is_none_or(|s| t.status == s))
            .collect();
        todos.sort_by_key(|t| t.id.clone());
        todos
    }

    /// All todos in this project, optionally filtered by status.
    pub fn project_todos(&self, status: Option<TodoStatus>) -> Vec<&Todo> {
        let mut todos: Vec<&Todo> = self
            .todos
            .values()
            .filter(|t| t.project_id == self.project_id)
            .filter(|t| status.is_none_or(|s| t.status == s))
            .collect();
        todos.sort_by_key(|t| t.id.clone());
        todos
    }

    /// Reassign a todo to another agent.
    pub fn assign_todo(&mut self, todo_id: &str, target_agent_id: &str) -> Result<()> {
        let todo = self
            .todos
            .get_mut(todo_id)
            .ok_or_else(|| anyhow::anyhow!("todo '{todo_id}' not found"))?;
        tracing::info!(todo_id = todo_id, target = target_agent_id, "assigning todo");
        todo.agent_id = target_agent_id.to_string();
        todo.updated_at = unix_ms_now();
        Ok(())
    }

    /// Record that `todo_id` depends on `dependency_id`.
    pub fn add_dependency(&mut self, todo_id: &str, dependency_id: &str) -> Result<()> {
        if todo_id == dependency_id {
            anyhow::bail!("todo '{todo_id}' cannot depend on itself");
        }
        if !self.todos.contains_key(dependency_id) {
            anyhow::bail!("dependency todo '{dependency_id}' not found");
        }
        let todo = self
            .todos
            .get_mut(todo_id)
            .ok_or_else(|| anyhow::anyhow!("todo '{todo_id}' not found"))?;
        if todo.dependencies.iter().any(|d| d == dependency_id) {
            return Ok(());
        }
        todo.dependencies.push(dependency_id.to_string());
        todo.updated_at = unix_ms_now();
        Ok(())
    }

    /// Format a summary of project todos for display.
    pub fn format_summary(&self) -> String {
        let todos = self.project_todos(None);
        if todos.is_empty() {
            return "No todos. Agents can create them during task execution.".to_string();
        }
        let mut out = String::from("Todos:\n");
        for todo in todos {
            let mark = match todo.status {
                TodoStatus::Completed => "✓",
                TodoStatus::Cancelled => "✗",
                TodoStatus::InProgress => "…",
                TodoStatus::Pending => " ",
            };
            out.push_str(&format!(
                "  [{mark}] {} ({:?}): {}\n",
                todo.id, todo.priority, todo.title
            ));
        }
        out
    }

    pub fn len(&self) -> usize {
        self.todos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.todos.is_empty()
    }
}

pub fn validate_todo_data(title: &str, description: &str) -> Result<()> {
    if title.trim().is_empty() {
        anyhow::bail!("todo title is empty");
    }
    if title.chars().count() > TODO_TITLE_MAX_CHARS {
        anyhow::bail!("todo title is too long (max {TODO_TITLE_MAX_CHARS} chars)");
    }
    if description.chars().count() > TODO_DESCRIPTION_MAX_CHARS {
        anyhow::bail!("todo description is too long (max {TODO_DESCRIPTION_MAX_CHARS} chars)");
    }
    Ok(())
}
