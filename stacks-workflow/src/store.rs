// SPDX-License-Identifier: MIT OR Apache-2.0

use stacks_core::{EPersonId, Principal, StoreError};

use crate::task::{ClaimedTask, InProgressUser, PoolTask, TaskId, WorkflowItemId};

/// Storage of pool and claimed tasks, keyed by their natural keys.
pub trait TaskStore {
    fn create_pool_task(
        &mut self,
        workflow_item: WorkflowItemId,
        step_id: &str,
        action_id: &str,
        assignee: Principal,
    ) -> Result<TaskId, StoreError>;

    /// Every pool task of a workflow item.
    fn pool_tasks(&self, workflow_item: WorkflowItemId) -> Result<Vec<PoolTask>, StoreError>;

    /// The pool task assigned personally to one account, if any.
    fn personal_pool_task(
        &self,
        workflow_item: WorkflowItemId,
        step_id: &str,
        user: EPersonId,
    ) -> Result<Option<PoolTask>, StoreError>;

    fn delete_pool_task(&mut self, id: TaskId) -> Result<bool, StoreError>;

    /// Delete every pool task of one step instance. Returns how many were
    /// deleted.
    fn delete_pool_tasks_for_step(
        &mut self,
        workflow_item: WorkflowItemId,
        step_id: &str,
    ) -> Result<usize, StoreError>;

    fn create_claimed_task(
        &mut self,
        workflow_item: WorkflowItemId,
        step_id: &str,
        action_id: &str,
        owner: EPersonId,
    ) -> Result<TaskId, StoreError>;

    fn claimed_tasks(&self, workflow_item: WorkflowItemId)
    -> Result<Vec<ClaimedTask>, StoreError>;

    /// The claimed task one account owns on a workflow item, if any.
    fn claimed_task_of(
        &self,
        workflow_item: WorkflowItemId,
        user: EPersonId,
    ) -> Result<Option<ClaimedTask>, StoreError>;

    fn delete_claimed_task(&mut self, id: TaskId) -> Result<bool, StoreError>;
}

/// Storage of quorum-accounting rows, one per (workflow item, account).
pub trait ProgressStore {
    fn insert(&mut self, row: InProgressUser) -> Result<(), StoreError>;

    fn find(
        &self,
        workflow_item: WorkflowItemId,
        user: EPersonId,
    ) -> Result<Option<InProgressUser>, StoreError>;

    fn all(&self, workflow_item: WorkflowItemId) -> Result<Vec<InProgressUser>, StoreError>;

    /// Flip a row to finished. Returns `false` when no row exists.
    fn set_finished(
        &mut self,
        workflow_item: WorkflowItemId,
        user: EPersonId,
    ) -> Result<bool, StoreError>;

    fn delete(
        &mut self,
        workflow_item: WorkflowItemId,
        user: EPersonId,
    ) -> Result<bool, StoreError>;

    fn delete_all(&mut self, workflow_item: WorkflowItemId) -> Result<(), StoreError>;

    /// How many accounts have claimed but not finished.
    fn count_in_progress(&self, workflow_item: WorkflowItemId) -> Result<usize, StoreError>;

    /// How many accounts have finished their part.
    fn count_finished(&self, workflow_item: WorkflowItemId) -> Result<usize, StoreError>;
}
