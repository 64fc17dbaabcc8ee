use crate::models::board::MoveAction;
use crate::models::issue::{Issue, IssueStatus};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    Left,
    Right,
}

/// Move an issue one column left or right. Only the status changes;
/// intra-column order is untouched. Returns `None` for every no-op:
/// unknown issue id, a status that maps to no column, or a step past
/// either edge of the board. No-ops produce no undo record.
pub fn move_directional(
    issues: &[Issue],
    issue_id: &str,
    direction: MoveDirection,
) -> Option<(Vec<Issue>, MoveAction)> {
    let issue = issues.iter().find(|i| i.id == issue_id)?;
    let from = issue.column()?;
    let to = match direction {
        MoveDirection::Left => from.prev()?,
        MoveDirection::Right => from.next()?,
    };

    let snapshot = issues.to_vec();
    let next = issues
        .iter()
        .map(|i| {
            if i.id == issue_id {
                let mut moved = i.clone();
                moved.status = to.as_str().to_string();
                moved
            } else {
                i.clone()
            }
        })
        .collect();

    Some((
        next,
        MoveAction {
            issue_id: issue_id.to_string(),
            from_status: from,
            to_status: to,
            snapshot,
        },
    ))
}

/// Drag-and-drop move: remove the issue from its source column's
/// positional sequence and reinsert it at `dest_index` within the
/// destination column (which may be the source column, making this a
/// pure reorder). `dest_index` is interpreted against the destination
/// sub-list after the dragged issue has been removed, and clamped to
/// its length. Returns `None` when source and destination match in
/// both column and index, when either column name is unrecognized, or
/// when the issue is not found in the source column.
pub fn move_drag_drop(
    issues: &[Issue],
    source_status: &str,
    source_index: usize,
    dest_status: &str,
    dest_index: usize,
    issue_id: &str,
) -> Option<(Vec<Issue>, MoveAction)> {
    let from = IssueStatus::parse(source_status)?;
    let to = IssueStatus::parse(dest_status)?;
    if from == to && source_index == dest_index {
        return None;
    }

    let mut start: Vec<Issue> = issues
        .iter()
        .filter(|i| i.column() == Some(from))
        .cloned()
        .collect();
    let dragged_idx = start.iter().position(|i| i.id == issue_id)?;
    let mut dragged = start.remove(dragged_idx);

    let snapshot = issues.to_vec();

    let next = if from == to {
        let insert_at = dest_index.min(start.len());
        start.insert(insert_at, dragged);
        refill_column(issues, from, start)
    } else {
        dragged.status = to.as_str().to_string();
        let mut finish: Vec<Issue> = issues
            .iter()
            .filter(|i| i.column() == Some(to))
            .cloned()
            .collect();
        let insert_at = dest_index.min(finish.len());
        finish.insert(insert_at, dragged);
        rebuild_columns(issues, from, &start, to, &finish)
    };

    Some((
        next,
        MoveAction {
            issue_id: issue_id.to_string(),
            from_status: from,
            to_status: to,
            snapshot,
        },
    ))
}

/// Same-column reorder: walk the original list and re-fill that
/// column's slots from the reordered sub-list, so every issue outside
/// the column keeps its exact position.
fn refill_column(issues: &[Issue], column: IssueStatus, reordered: Vec<Issue>) -> Vec<Issue> {
    let mut queue = reordered.into_iter();
    let mut next = Vec::with_capacity(issues.len());
    for issue in issues {
        if issue.column() == Some(column) {
            if let Some(replacement) = queue.next() {
                next.push(replacement);
            }
        } else {
            next.push(issue.clone());
        }
    }
    next
}

/// Cross-column rebuild: columns concatenated in fixed board order,
/// each with intra-column order preserved. Issues whose status maps to
/// no column are appended afterwards in their original relative order
/// rather than dropped.
fn rebuild_columns(
    issues: &[Issue],
    from: IssueStatus,
    start: &[Issue],
    to: IssueStatus,
    finish: &[Issue],
) -> Vec<Issue> {
    let mut next = Vec::with_capacity(issues.len());
    for column in IssueStatus::COLUMNS {
        if column == from {
            next.extend(start.iter().cloned());
        } else if column == to {
            next.extend(finish.iter().cloned());
        } else {
            next.extend(issues.iter().filter(|i| i.column() == Some(column)).cloned());
        }
    }
    next.extend(issues.iter().filter(|i| i.column().is_none()).cloned());
    next
}
