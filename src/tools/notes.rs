/// Project notes tool for knowledge and decision tracking.
use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::ids::IdGenerator;
use crate::telemetry::unix_ms_now;

pub const NOTE_TITLE_MAX_CHARS: usize = 300;
pub const NOTE_CONTENT_MAX_CHARS: usize = 50_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteCategory {
    Architecture,
    Decisions,
    Requirements,
    Issues,
    Meeting,
    Research,
    General,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectNote {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: NoteCategory,
    pub author_agent_id: String,
    pub project_id: String,
    pub created_at: u128,
    pub updated_at: u128,
    pub tags: Vec<String>,
    #[serde(default)]
    pub references: Vec<String>,
}

/// Notes tool backed by an in-memory store standing in for the backend table.
pub struct ProjectNotesTool {
    agent_id: String,
    project_id: String,
    notes: Vec<ProjectNote>,
    ids: IdGenerator,
}

impl ProjectNotesTool {
    pub fn new(agent_id: &str, project_id: &str) -> Self {
        Self {
            agent_id: agent_id.to_string(),
            project_id: project_id.to_string(),
            notes: Vec::new(),
            ids: IdGenerator::new("note"),
        }
    }

    /// Create a new project note.
    pub fn create_note(
        &mut self,
        title: &str,
        content: &str,
        category: NoteCategory,
        tags: Vec<String>,
    ) -> Result<&ProjectNote> {
        validate_note_data(title, content)?;
        tracing::info!(title = title, "creating project note");

        let now = unix_ms_now();
        let note = ProjectNote {
            id: self.ids.next_id(),
            title: title.to_string(),
            content: content.to_string(),
            category,
            author_agent_id: self.agent_id.clone(),
            project_id: self.project_id.clone(),
            created_at: now,
            updated_at: now,
            tags,
            references: Vec::new(),
        };
        let idx = self.notes.len();
        self.notes.push(note);
        Ok(&self.notes[idx])
    }

    /// Update an existing note's content and optionally its tags.
    pub fn update_note(
        &mut self,
        note_id: &str,
        content: &str,
        tags: Option<Vec<String>>,
    ) -> Result<()> {
        let note = self
            .notes
            .iter_mut()
            .find(|n| n.id == note_id)
            .ok_or_else(|| anyhow::anyhow!("note '{note_id}' not found"))?;
        validate_note_data(&note.title, content)?;

        note.content = content.to_string();
        if let Some(tags) = tags {
            note.tags = tags;
        }
        note.updated_at = unix_ms_now();
        Ok(())
    }

    pub fn notes_by_category(&self, category: NoteCategory) -> Vec<&ProjectNote> {
        self.notes
            .iter()
            .filter(|n| n.category == category)
            .collect()
    }

    /// Case-insensitive substring search over titles and content.
    pub fn search_notes(&self, query: &str) -> Vec<&ProjectNote> {
        let needle = query.to_lowercase();
        self.notes
            .iter()
            .filter(|n| {
                n.title.to_lowercase().contains(&needle)
                    || n.content.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Notes carrying at least one of the given tags.
    pub fn notes_by_tags(&self, tags: &[String]) -> Vec<&ProjectNote> {
        self.notes
            .iter()
            .filter(|n| n.tags.iter().any(|t| tags.contains(t)))
            .collect()
    }

    /// Attach a reference (URL, file path) to a note.
    pub fn add_reference(&mut self, note_id: &str, reference: &str) -> Result<()> {
        let note = self
            .notes
            .iter_mut()
            .find(|n| n.id == note_id)
            .ok_or_else(|| anyhow::anyhow!("note '{note_id}' not found"))?;
        note.references.push(reference.to_string());
        note.updated_at = unix_ms_now();
        Ok(())
    }

    /// Create a specialized note documenting a decision and its alternatives.
    pub fn create_decision_note(
        &mut self,
        decision: &str,
        rationale: &str,
        alternatives: &[String],
    ) -> Result<&ProjectNote> {
        let alternatives_list = alternatives
            .iter()
            .map(|alt| format!("- {alt}"))
            .collect::<Vec<_>>()
            .join("\n");
        let content = format!(
            "Decision: {decision}\n\nRationale:\n{rationale}\n\nAlternatives Considered:\n{alternatives_list}"
        );

        let title = if decision.chars().count() > 50 {
            let short: String = decision.chars().take(50).collect();
            format!("Decision: {short}...")
        } else {
            format!("Decision: {decision}")
        };

        self.create_note(
            &title,
            &content,
            NoteCategory::Decisions,
            vec!["decision".to_string(), "architecture".to_string()],
        )
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

pub fn validate_note_data(title: &str, content: &str) -> Result<()> {
    if title.trim().is_empty() {
        anyhow::bail!("note title is empty");
    }
    if content.trim().is_empty() {
        anyhow::bail!("note content is empty");
    }
    if title.chars().count() > NOTE_TITLE_MAX_CHARS {
        anyhow::bail!("note title is too long (max {NOTE_TITLE_MAX_CHARS} chars)");
    }
    if content.chars().count() > NOTE_CONTENT_MAX_CHARS {
        anyhow::bail!("note content is too long (max {NOTE_CONTENT_MAX_CHARS} chars)");
    }
    Ok(())
}
