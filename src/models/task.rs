use serde::{Deserialize, Serialize};

/// Task snapshot handed over by the task store. The planner only reads it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub priority: TaskPriority,
    /// Calendar date (`YYYY-MM-DD`); a full timestamp is accepted and its date part used.
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub estimate_minutes: Option<i64>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub status: TaskStatus,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum TaskPriority {
    H,
    #[default]
    M,
    L,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Open,
    Done,
    Blocked,
}

impl Task {
    pub fn is_open(&self) -> bool {
        self.status == TaskStatus::Open
    }

    pub fn is_high_priority(&self) -> bool {
        self.priority == TaskPriority::H
    }

    /// Declared estimate, ignoring zero or negative values.
    pub fn declared_estimate(&self) -> Option<i64> {
        self.estimate_minutes.filter(|minutes| *minutes > 0)
    }

    /// Estimate used for placement: the declared one, else 60 minutes for
    /// high priority tasks and 30 for the rest.
    pub fn effective_estimate(&self) -> i64 {
        self.declared_estimate()
            .unwrap_or(if self.is_high_priority() { 60 } else { 30 })
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|candidate| candidate == tag)
    }
}
