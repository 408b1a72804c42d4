// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use stacks_core::{EPersonId, Principal};

/// Identifier of an item moving through workflow review.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorkflowItemId(pub u64);

impl Display for WorkflowItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "workflow item {}", self.0)
    }
}

/// Identifier of a pool or claimed task, assigned by the task store.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(pub u64);

/// One step of a workflow definition, as configured for a collection.
///
/// `required_users` is the exact number of distinct accounts which must claim
/// and finish the step before it is satisfied. `action` is the id of the
/// action a reviewer performs after claiming; regenerated pool tasks carry it
/// too.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub id: String,
    pub action: String,
    pub required_users: usize,
}

impl Step {
    pub fn new(id: impl Into<String>, action: impl Into<String>, required_users: usize) -> Self {
        Self {
            id: id.into(),
            action: action.into(),
            required_users,
        }
    }
}

/// An unclaimed unit of review work, assignable to one account or to every
/// member of one group. The assignee is a [`Principal`], so a task naming
/// both cannot be constructed.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PoolTask {
    pub id: TaskId,
    pub workflow_item: WorkflowItemId,
    pub step_id: String,
    pub action_id: String,
    pub assignee: Principal,
}

/// A unit of review work one account has taken ownership of.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ClaimedTask {
    pub id: TaskId,
    pub workflow_item: WorkflowItemId,
    pub step_id: String,
    pub action_id: String,
    pub owner: EPersonId,
}

/// Quorum-accounting row: one per (workflow item, account) which has claimed
/// the active step. `finished` flips when the reviewer completes their part.
/// The row grants nothing by itself.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct InProgressUser {
    pub workflow_item: WorkflowItemId,
    pub user: EPersonId,
    pub finished: bool,
}
