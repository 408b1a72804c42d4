// SPDX-License-Identifier: MIT OR Apache-2.0

//! The quorum predicate over in-progress accounting rows.
//!
//! Counts are scoped to a workflow item, not a step: the engine keeps rows
//! only for the single active step of an item and clears them on every step
//! transition, so the item-scoped counts are the step's counts.

use stacks_core::StoreError;

use crate::store::ProgressStore;
use crate::task::{Step, WorkflowItemId};

/// How many accounts are engaged with the active step: claimed but not yet
/// finished, plus finished.
pub fn engaged<P: ProgressStore>(
    progress: &P,
    workflow_item: WorkflowItemId,
) -> Result<usize, StoreError> {
    Ok(progress.count_in_progress(workflow_item)? + progress.count_finished(workflow_item)?)
}

/// Whether enough distinct reviewers have claimed or finished the step to
/// meet its quorum.
pub fn met<P: ProgressStore>(
    progress: &P,
    workflow_item: WorkflowItemId,
    step: &Step,
) -> Result<bool, StoreError> {
    Ok(engaged(progress, workflow_item)? == step.required_users)
}
