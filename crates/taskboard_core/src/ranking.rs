//! Priority ranking rules for tasks within one project.
//!
//! # Responsibility
//! - Compute the priority of a newly created task.
//! - Plan move-up/move-down swaps against a snapshot of project ranks.
//!
//! # Invariants
//! - Reorders exchange two priority values; no other task is touched.
//! - Neighbour selection is by priority value only.
//! - A duplicated priority in the snapshot is reported, never resolved.
//!
//! These functions are pure. Callers own the transaction that makes the
//! snapshot read and the resulting writes atomic.

use crate::model::task::TaskId;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Priority held by a task only while a swap is in flight.
///
/// Valid ranks start at 1, so this value never collides with a real one.
pub const SWAP_PARKING_PRIORITY: i64 = 0;

/// Reorder direction. `Up` means earlier in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

impl MoveDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

/// One `(task, priority)` pair from a project snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rank {
    pub task_uuid: TaskId,
    pub priority: i64,
}

/// Priority exchange between a task and its neighbour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapPlan {
    /// Task being moved, with its priority before the swap.
    pub target: Rank,
    /// Neighbour it trades places with, with its priority before the swap.
    pub neighbour: Rank,
}

impl SwapPlan {
    /// Ranks after the swap has been applied.
    pub fn applied(&self) -> (Rank, Rank) {
        (
            Rank {
                task_uuid: self.target.task_uuid,
                priority: self.neighbour.priority,
            },
            Rank {
                task_uuid: self.neighbour.task_uuid,
                priority: self.target.priority,
            },
        )
    }
}

/// Broken ranking state detected while planning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RankError {
    /// Two tasks in one project share a priority.
    DuplicatePriority { priority: i64 },
    /// Target task is absent from the snapshot.
    TaskNotRanked(TaskId),
}

impl Display for RankError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicatePriority { priority } => {
                write!(f, "priority {priority} is held by more than one task")
            }
            Self::TaskNotRanked(id) => write!(f, "task is not ranked in project: {id}"),
        }
    }
}

impl Error for RankError {}

/// Returns the priority for a task appended to a project.
///
/// `current_max` is `MAX(priority)` over the project, `None` when empty.
/// Gaps left by deletes are never reused.
pub fn next_priority(current_max: Option<i64>) -> i64 {
    current_max.unwrap_or(0) + 1
}

/// Plans a one-step reorder of `target` in `direction`.
///
/// Returns `Ok(None)` when the task is already first (`Up`) or last (`Down`).
pub fn plan_swap(
    ranks: &[Rank],
    target: TaskId,
    direction: MoveDirection,
) -> Result<Option<SwapPlan>, RankError> {
    ensure_unique_priorities(ranks)?;

    let target = *ranks
        .iter()
        .find(|rank| rank.task_uuid == target)
        .ok_or(RankError::TaskNotRanked(target))?;

    let neighbour = match direction {
        MoveDirection::Up => ranks
            .iter()
            .filter(|rank| rank.priority < target.priority)
            .max_by_key(|rank| rank.priority),
        MoveDirection::Down => ranks
            .iter()
            .filter(|rank| rank.priority > target.priority)
            .min_by_key(|rank| rank.priority),
    };

    Ok(neighbour.map(|neighbour| SwapPlan {
        target,
        neighbour: *neighbour,
    }))
}

/// Fails when any priority value appears more than once.
pub fn ensure_unique_priorities(ranks: &[Rank]) -> Result<(), RankError> {
    let mut seen = HashSet::with_capacity(ranks.len());
    for rank in ranks {
        if !seen.insert(rank.priority) {
            return Err(RankError::DuplicatePriority {
                priority: rank.priority,
            });
        }
    }
    Ok(())
}
