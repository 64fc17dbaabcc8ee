use crate::models::issue::Issue;
use std::time::Duration;

/// Bundled issue feed. Stands in for the remote tracker: every fetch
/// returns a fresh deep copy of this dataset.
const ISSUE_FEED: &str = include_str!("data/issues.json");

/// Simulated network latency for the mock feed.
const FEED_LATENCY_MS: u64 = 150;

/// Parse the bundled dataset for first paint, before the first poll
/// tick lands.
pub fn seed_issues() -> Result<Vec<Issue>, String> {
    serde_json::from_str(ISSUE_FEED).map_err(|e| format!("Failed to parse bundled issue feed: {e}"))
}

/// Fetch collaborator for the polling reconciler. Opaque and fallible
/// from the caller's point of view; there is no retry contract beyond
/// "try again next tick".
pub async fn fetch_issues() -> Result<Vec<Issue>, String> {
    tokio::time::sleep(Duration::from_millis(FEED_LATENCY_MS)).await;
    seed_issues()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_feed_parses_and_covers_every_column() {
        let issues = seed_issues().expect("seed data");
        assert!(issues.len() >= 6);
        for status in ["Backlog", "In Progress", "Done"] {
            assert!(issues.iter().any(|i| i.status == status));
        }
    }

    #[test]
    fn bundled_feed_ids_are_unique() {
        let issues = seed_issues().expect("seed data");
        let mut ids: Vec<&str> = issues.iter().map(|i| i.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), issues.len());
    }
}
