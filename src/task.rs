use crate::date::When;
use crate::error::{Result, TkError};
use chrono::NaiveDate;
use std::fmt;

/// Kind-specific payload. A task's kind never changes after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskKind {
    Todo,
    Deadline { due: When },
    Event { start: When, end: When },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    description: String,
    done: bool,
    kind: TaskKind,
}

impl Task {
    pub fn todo(description: &str) -> Result<Self> {
        Self::with_kind(description, TaskKind::Todo)
    }

    pub fn deadline(description: &str, due: When) -> Result<Self> {
        Self::with_kind(description, TaskKind::Deadline { due })
    }

    pub fn event(description: &str, start: When, end: When) -> Result<Self> {
        Self::with_kind(description, TaskKind::Event { start, end })
    }

    /// Descriptions are stored trimmed and must not be blank.
    fn with_kind(description: &str, kind: TaskKind) -> Result<Self> {
        let description = description.trim();
        if description.is_empty() {
            return Err(TkError::EmptyDescription(
                "Task description cannot be empty.".to_string(),
            ));
        }
        Ok(Self {
            description: description.to_string(),
            done: false,
            kind,
        })
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn kind(&self) -> &TaskKind {
        &self.kind
    }

    /// Completion is one-way.
    pub fn mark_done(&mut self) {
        self.done = true;
    }

    /// One-letter tag used both in rendering and in storage records.
    pub fn type_tag(&self) -> char {
        match self.kind {
            TaskKind::Todo => 'T',
            TaskKind::Deadline { .. } => 'D',
            TaskKind::Event { .. } => 'E',
        }
    }

    /// Due date for deadlines, start for events; `None` for to-dos.
    pub fn primary_when(&self) -> Option<When> {
        match self.kind {
            TaskKind::Todo => None,
            TaskKind::Deadline { due } => Some(due),
            TaskKind::Event { start, .. } => Some(start),
        }
    }

    pub fn primary_date(&self) -> Option<NaiveDate> {
        self.primary_when().map(|w| w.date())
    }

    fn status_icon(&self) -> char {
        if self.done {
            'X'
        } else {
            ' '
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}][{}] {}",
            self.type_tag(),
            self.status_icon(),
            self.description
        )?;
        match &self.kind {
            TaskKind::Todo => Ok(()),
            TaskKind::Deadline { due } => write!(f, " (by: {})", due),
            TaskKind::Event { start, end } => write!(f, " (from: {} to: {})", start, end),
        }
    }
}
