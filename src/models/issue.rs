use serde::{Deserialize, Serialize};

/// A single tracked issue as exchanged with the webview and the remote
/// feed. `status` stays a raw string so a malformed value coming from
/// the feed can never fail deserialization; column logic goes through
/// [`IssueStatus::parse`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub assignee: String,
    pub priority: String, // "low" | "medium" | "high"
    pub severity: i64,    // 1..=3
    pub status: String,   // "Backlog" | "In Progress" | "Done"
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: i64,
}

/// The three fixed, ordered board columns. Ordering determines which
/// directional moves are legal: Backlog < In Progress < Done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueStatus {
    Backlog,
    #[serde(rename = "In Progress")]
    InProgress,
    Done,
}

impl IssueStatus {
    pub const COLUMNS: [IssueStatus; 3] = [
        IssueStatus::Backlog,
        IssueStatus::InProgress,
        IssueStatus::Done,
    ];

    /// Normalized column lookup: trims whitespace and matches
    /// case-insensitively. Anything else is no column.
    pub fn parse(raw: &str) -> Option<IssueStatus> {
        let normalized = raw.trim();
        Self::COLUMNS
            .iter()
            .copied()
            .find(|column| column.as_str().eq_ignore_ascii_case(normalized))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IssueStatus::Backlog => "Backlog",
            IssueStatus::InProgress => "In Progress",
            IssueStatus::Done => "Done",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            IssueStatus::Backlog => 0,
            IssueStatus::InProgress => 1,
            IssueStatus::Done => 2,
        }
    }

    /// Column one step to the right, or `None` at the rightmost edge.
    pub fn next(&self) -> Option<IssueStatus> {
        Self::COLUMNS.get(self.index() + 1).copied()
    }

    /// Column one step to the left, or `None` at the leftmost edge.
    pub fn prev(&self) -> Option<IssueStatus> {
        self.index().checked_sub(1).map(|i| Self::COLUMNS[i])
    }
}

impl Issue {
    /// Typed column view of the raw status field.
    pub fn column(&self) -> Option<IssueStatus> {
        IssueStatus::parse(&self.status)
    }
}
