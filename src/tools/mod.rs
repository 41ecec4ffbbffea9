/// Backend tools exposed to agents.
///
/// Every tool fronts a mocked backend: notes and todos keep in-memory stores
/// standing in for the remote tables, while the search tools return canned
/// results. The interfaces match what the real backend would offer.
pub mod notes;
pub mod semantic_search;
pub mod todos;
pub mod web_search;

pub const NOTES_TOOL_NAME: &str = "project_notes";
pub const TODO_TOOL_NAME: &str = "todo_manager";
pub const WEB_SEARCH_TOOL_NAME: &str = "web_search";
pub const SEMANTIC_SEARCH_TOOL_NAME: &str = "semantic_search";
