use std::collections::VecDeque;
use std::ops::Range;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::EditRequest;

/// Pipeline stage a [`SessionStep`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Parse,
    Classify,
    Locate,
    Prompt,
    Generate,
    Clean,
    Apply,
    Validate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionStep {
    pub stage: Stage,
    pub detail: String,
    pub at: DateTime<Utc>,
}

/// Audit record of one edit attempt.
///
/// Steps are only ever appended; once the session is pushed into the
/// [`EditHistory`] it is no longer mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditSession {
    id: Uuid,
    timestamp: DateTime<Utc>,
    user_instruction: String,
    selected_text: Option<String>,
    selection_range: Option<Range<usize>>,
    original_document: String,
    steps: Vec<SessionStep>,
    error: Option<String>,
    /// `None` until validation has run.
    validation_issues: Option<Vec<String>>,
}

impl EditSession {
    pub(crate) fn start(request: &EditRequest) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            user_instruction: request.instruction.to_string(),
            selected_text: request.selected_text.map(str::to_string),
            selection_range: request.selection_range.clone(),
            original_document: request.document.to_string(),
            steps: Vec::new(),
            error: None,
            validation_issues: None,
        }
    }

    pub(crate) fn record(&mut self, stage: Stage, detail: impl Into<String>) {
        let detail = detail.into();
        log::debug!("[{}] {stage:?}: {detail}", self.id);
        self.steps.push(SessionStep {
            stage,
            detail,
            at: Utc::now(),
        });
    }

    pub(crate) fn fail(&mut self, error: &impl std::fmt::Display) {
        self.error = Some(error.to_string());
    }

    pub(crate) fn mark_validated(&mut self, issues: &[String]) {
        self.validation_issues = Some(issues.to_vec());
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn user_instruction(&self) -> &str {
        &self.user_instruction
    }

    pub fn selected_text(&self) -> Option<&str> {
        self.selected_text.as_deref()
    }

    pub fn selection_range(&self) -> Option<&Range<usize>> {
        self.selection_range.as_ref()
    }

    pub fn original_document(&self) -> &str {
        &self.original_document
    }

    pub fn steps(&self) -> &[SessionStep] {
        &self.steps
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Whether the edited document passed validation. `None` when validation
    /// did not run.
    pub fn is_valid(&self) -> Option<bool> {
        self.validation_issues.as_ref().map(Vec::is_empty)
    }

    pub fn validation_issues(&self) -> &[String] {
        self.validation_issues.as_deref().unwrap_or_default()
    }

    /// Steps recorded for one stage, in order.
    pub fn steps_for(&self, stage: Stage) -> impl Iterator<Item = &SessionStep> {
        self.steps.iter().filter(move |step| step.stage == stage)
    }
}

/// Bounded, oldest-first store of finished sessions.
#[derive(Debug, Clone, Default)]
pub struct EditHistory {
    sessions: VecDeque<EditSession>,
    capacity: usize,
}

impl EditHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            sessions: VecDeque::with_capacity(capacity.min(64)),
            capacity,
        }
    }

    /// Appends `session`, evicting the oldest entry when full.
    pub fn push(&mut self, session: EditSession) {
        if self.capacity == 0 {
            return;
        }
        while self.sessions.len() >= self.capacity {
            self.sessions.pop_front();
        }
        self.sessions.push_back(session);
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &EditSession> {
        self.sessions.iter()
    }

    pub fn latest(&self) -> Option<&EditSession> {
        self.sessions.back()
    }

    pub fn get(&self, id: Uuid) -> Option<&EditSession> {
        self.sessions.iter().find(|session| session.id == id)
    }

    pub fn clear(&mut self) {
        self.sessions.clear();
    }
}
