//! Save payload assembly.

use chrono::{DateTime, Local};
use nova_protocols::{RecordedEvent, RecordingError, SavedTestPayload, TestStep, TestType};

/// User input for saving a recording. Empty fields fall back to defaults.
#[derive(Debug, Clone, Default)]
pub struct SaveOptions {
    pub name: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub test_type: TestType,
    pub project_id: Option<String>,
}

impl SaveOptions {
    pub fn for_project(project_id: impl Into<String>) -> Self {
        Self {
            project_id: Some(project_id.into()),
            ..Default::default()
        }
    }
}

/// Build the payload handed to the persistence API.
///
/// Preconditions are checked in order (project selected, events present,
/// name not blank) and nothing is built when one fails.
pub fn build_saved_test(
    url: &str,
    events: &[RecordedEvent],
    steps: &[TestStep],
    options: &SaveOptions,
    now: DateTime<Local>,
) -> Result<SavedTestPayload, RecordingError> {
    let project_id = options
        .project_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or(RecordingError::NoProjectSelected)?;

    if events.is_empty() {
        return Err(RecordingError::NoEvents);
    }

    let name = match options.name.as_deref() {
        None => format!("Test {}", now.format("%Y-%m-%d %H:%M:%S")),
        Some(name) if name.trim().is_empty() => return Err(RecordingError::EmptyTestName),
        Some(name) => name.trim().to_string(),
    };

    let description = options
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("Recorded test from {}", url));

    let tags = if options.tags.is_empty() {
        vec!["recorded".to_string()]
    } else {
        options.tags.clone()
    };

    Ok(SavedTestPayload {
        name,
        description,
        url: url.to_string(),
        steps: steps.to_vec(),
        events: events.to_vec(),
        tags,
        test_type: options.test_type,
        project_id: project_id.to_string(),
    })
}
