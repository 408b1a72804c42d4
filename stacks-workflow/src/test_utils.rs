// SPDX-License-Identifier: MIT OR Apache-2.0

//! Small in-memory fixtures for exercising the task-pool engine without a
//! real backend. The production-shaped combined store lives in `stacks-store`.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use stacks_core::{Directory, EPersonId, GroupId, Principal, StoreError};

use crate::pool::TaskPool;
use crate::role::{RoleDirectory, RoleMembers};
use crate::store::{ProgressStore, TaskStore};
use crate::task::{ClaimedTask, InProgressUser, PoolTask, Step, TaskId, WorkflowItemId};

/// Task rows in maps, ids handed out sequentially.
#[derive(Debug, Default)]
pub struct MemTasks {
    next_id: u64,
    pool: BTreeMap<TaskId, PoolTask>,
    claimed: BTreeMap<TaskId, ClaimedTask>,
}

impl MemTasks {
    fn next_id(&mut self) -> TaskId {
        self.next_id += 1;
        TaskId(self.next_id)
    }
}

impl TaskStore for MemTasks {
    fn create_pool_task(
        &mut self,
        workflow_item: WorkflowItemId,
        step_id: &str,
        action_id: &str,
        assignee: Principal,
    ) -> Result<TaskId, StoreError> {
        let id = self.next_id();
        self.pool.insert(
            id,
            PoolTask {
                id,
                workflow_item,
                step_id: step_id.to_owned(),
                action_id: action_id.to_owned(),
                assignee,
            },
        );
        Ok(id)
    }

    fn pool_tasks(&self, workflow_item: WorkflowItemId) -> Result<Vec<PoolTask>, StoreError> {
        Ok(self
            .pool
            .values()
            .filter(|task| task.workflow_item == workflow_item)
            .cloned()
            .collect())
    }

    fn personal_pool_task(
        &self,
        workflow_item: WorkflowItemId,
        step_id: &str,
        user: EPersonId,
    ) -> Result<Option<PoolTask>, StoreError> {
        Ok(self
            .pool
            .values()
            .find(|task| {
                task.workflow_item == workflow_item
                    && task.step_id == step_id
                    && task.assignee == Principal::EPerson(user)
            })
            .cloned())
    }

    fn delete_pool_task(&mut self, id: TaskId) -> Result<bool, StoreError> {
        Ok(self.pool.remove(&id).is_some())
    }

    fn delete_pool_tasks_for_step(
        &mut self,
        workflow_item: WorkflowItemId,
        step_id: &str,
    ) -> Result<usize, StoreError> {
        let before = self.pool.len();
        self.pool
            .retain(|_, task| !(task.workflow_item == workflow_item && task.step_id == step_id));
        Ok(before - self.pool.len())
    }

    fn create_claimed_task(
        &mut self,
        workflow_item: WorkflowItemId,
        step_id: &str,
        action_id: &str,
        owner: EPersonId,
    ) -> Result<TaskId, StoreError> {
        let id = self.next_id();
        self.claimed.insert(
            id,
            ClaimedTask {
                id,
                workflow_item,
                step_id: step_id.to_owned(),
                action_id: action_id.to_owned(),
                owner,
            },
        );
        Ok(id)
    }

    fn claimed_tasks(
        &self,
        workflow_item: WorkflowItemId,
    ) -> Result<Vec<ClaimedTask>, StoreError> {
        Ok(self
            .claimed
            .values()
            .filter(|task| task.workflow_item == workflow_item)
            .cloned()
            .collect())
    }

    fn claimed_task_of(
        &self,
        workflow_item: WorkflowItemId,
        user: EPersonId,
    ) -> Result<Option<ClaimedTask>, StoreError> {
        Ok(self
            .claimed
            .values()
            .find(|task| task.workflow_item == workflow_item && task.owner == user)
            .cloned())
    }

    fn delete_claimed_task(&mut self, id: TaskId) -> Result<bool, StoreError> {
        Ok(self.claimed.remove(&id).is_some())
    }
}

/// Quorum-accounting rows keyed by (item, account).
#[derive(Debug, Default)]
pub struct MemProgress {
    rows: BTreeMap<(WorkflowItemId, EPersonId), InProgressUser>,
}

impl ProgressStore for MemProgress {
    fn insert(&mut self, row: InProgressUser) -> Result<(), StoreError> {
        self.rows.insert((row.workflow_item, row.user), row);
        Ok(())
    }

    fn find(
        &self,
        workflow_item: WorkflowItemId,
        user: EPersonId,
    ) -> Result<Option<InProgressUser>, StoreError> {
        Ok(self.rows.get(&(workflow_item, user)).copied())
    }

    fn all(&self, workflow_item: WorkflowItemId) -> Result<Vec<InProgressUser>, StoreError> {
        Ok(self
            .rows
            .values()
            .filter(|row| row.workflow_item == workflow_item)
            .copied()
            .collect())
    }

    fn set_finished(
        &mut self,
        workflow_item: WorkflowItemId,
        user: EPersonId,
    ) -> Result<bool, StoreError> {
        match self.rows.get_mut(&(workflow_item, user)) {
            Some(row) => {
                row.finished = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete(
        &mut self,
        workflow_item: WorkflowItemId,
        user: EPersonId,
    ) -> Result<bool, StoreError> {
        Ok(self.rows.remove(&(workflow_item, user)).is_some())
    }

    fn delete_all(&mut self, workflow_item: WorkflowItemId) -> Result<(), StoreError> {
        self.rows.retain(|(item, _), _| *item != workflow_item);
        Ok(())
    }

    fn count_in_progress(&self, workflow_item: WorkflowItemId) -> Result<usize, StoreError> {
        Ok(self
            .rows
            .values()
            .filter(|row| row.workflow_item == workflow_item && !row.finished)
            .count())
    }

    fn count_finished(&self, workflow_item: WorkflowItemId) -> Result<usize, StoreError> {
        Ok(self
            .rows
            .values()
            .filter(|row| row.workflow_item == workflow_item && row.finished)
            .count())
    }
}

/// Workflow definition: steps and role memberships by step id.
#[derive(Debug, Default)]
pub struct MemRoles {
    steps: HashMap<String, Step>,
    roles: HashMap<String, RoleMembers>,
}

impl RoleDirectory for MemRoles {
    fn step(&self, step_id: &str) -> Result<Option<Step>, StoreError> {
        Ok(self.steps.get(step_id).cloned())
    }

    fn members(
        &self,
        _workflow_item: WorkflowItemId,
        step_id: &str,
    ) -> Result<Option<RoleMembers>, StoreError> {
        Ok(self.roles.get(step_id).cloned())
    }
}

/// Flat group membership.
#[derive(Debug, Default)]
pub struct MemDirectory {
    members: HashMap<GroupId, BTreeSet<EPersonId>>,
}

impl Directory for MemDirectory {
    fn is_member(&self, eperson: EPersonId, group: GroupId) -> Result<bool, StoreError> {
        Ok(self
            .members
            .get(&group)
            .is_some_and(|members| members.contains(&eperson)))
    }

    fn expand(&self, group: GroupId) -> Result<Vec<EPersonId>, StoreError> {
        Ok(self
            .members
            .get(&group)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default())
    }
}

/// A complete workflow environment over the in-memory fixtures.
#[derive(Debug, Default)]
pub struct WorkflowEnv {
    pub tasks: MemTasks,
    pub progress: MemProgress,
    pub roles: MemRoles,
    pub directory: MemDirectory,
}

impl WorkflowEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pool(&mut self) -> TaskPool<'_, MemTasks, MemProgress, MemRoles, MemDirectory> {
        TaskPool::new(
            &mut self.tasks,
            &mut self.progress,
            &self.roles,
            &self.directory,
        )
    }

    pub fn define_step(&mut self, step: Step) {
        self.roles.steps.insert(step.id.clone(), step);
    }

    pub fn define_role(&mut self, step_id: impl Into<String>, members: RoleMembers) {
        self.roles.roles.insert(step_id.into(), members);
    }

    pub fn add_member(&mut self, group: GroupId, eperson: EPersonId) {
        self.directory.members.entry(group).or_default().insert(eperson);
    }
}
