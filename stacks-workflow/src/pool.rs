// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::BTreeSet;

use stacks_core::{Directory, EPersonId, Principal, StoreError};
use thiserror::Error;
use tracing::{debug, warn};

use crate::requirements;
use crate::role::{RoleDirectory, RoleMembers};
use crate::store::{ProgressStore, TaskStore};
use crate::task::{ClaimedTask, InProgressUser, PoolTask, Step, WorkflowItemId};

#[derive(Error, Debug)]
pub enum WorkflowError {
    /// The step id does not exist in the workflow definition.
    #[error("step '{step_id}' is not defined")]
    StepNotDefined { step_id: String },

    /// The step exists but no reviewer role is configured for it.
    #[error("no reviewer role is defined for step '{step_id}'")]
    RoleNotDefined { step_id: String },

    /// The reviewer role is configured but names nobody.
    #[error("the reviewer role of step '{step_id}' has no members")]
    NoEligibleReviewers { step_id: String },

    /// The account holds no assignable pool task, personally or through a
    /// group.
    #[error("no pool task on {workflow_item} is claimable by {user}")]
    TaskNotFound {
        workflow_item: WorkflowItemId,
        user: EPersonId,
    },

    /// The account has already claimed the active step.
    #[error("{user} has already claimed {workflow_item}")]
    AlreadyClaimed {
        workflow_item: WorkflowItemId,
        user: EPersonId,
    },

    /// The account has no claim to release or finish.
    #[error("{user} holds no claim on {workflow_item}")]
    NotClaimed {
        workflow_item: WorkflowItemId,
        user: EPersonId,
    },

    /// A claim would push the engaged-reviewer count past the step's quorum.
    /// The pool should have been retired already; this is an invariant
    /// failure, not a user error.
    #[error("quorum of step '{step_id}' on {workflow_item} is already satisfied")]
    QuorumExceeded {
        workflow_item: WorkflowItemId,
        step_id: String,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The claim/release engine over one workflow item's task pool.
///
/// A `TaskPool` borrows its stores mutably for the duration of one unit of
/// work; the caller commits or rolls back the whole unit, so a failure
/// mid-sequence is undone by rollback rather than compensating writes.
#[derive(Debug)]
pub struct TaskPool<'a, T, P, R, D> {
    tasks: &'a mut T,
    progress: &'a mut P,
    roles: &'a R,
    directory: &'a D,
}

impl<'a, T, P, R, D> TaskPool<'a, T, P, R, D>
where
    T: TaskStore,
    P: ProgressStore,
    R: RoleDirectory,
    D: Directory,
{
    pub fn new(tasks: &'a mut T, progress: &'a mut P, roles: &'a R, directory: &'a D) -> Self {
        Self {
            tasks,
            progress,
            roles,
            directory,
        }
    }

    /// Populate the pool when a step becomes active: one personal task per
    /// role account, one group task per role group. Returns the number of
    /// tasks created.
    pub fn open(
        &mut self,
        workflow_item: WorkflowItemId,
        step_id: &str,
    ) -> Result<usize, WorkflowError> {
        let step = self.step(step_id)?;
        let members = self.role(workflow_item, step_id)?;
        if members.is_empty() {
            return Err(WorkflowError::NoEligibleReviewers {
                step_id: step_id.to_owned(),
            });
        }

        let mut created = 0;
        for eperson in &members.epersons {
            self.tasks.create_pool_task(
                workflow_item,
                step_id,
                &step.action,
                Principal::EPerson(*eperson),
            )?;
            created += 1;
        }
        for group in &members.groups {
            self.tasks.create_pool_task(
                workflow_item,
                step_id,
                &step.action,
                Principal::Group(*group),
            )?;
            created += 1;
        }

        debug!(%workflow_item, step_id, created, "opened task pool");

        Ok(created)
    }

    /// Take ownership of a unit of review work.
    ///
    /// The claimer must hold a personal pool task or reach a group task
    /// through membership. The personal task is consumed; group tasks stay
    /// for the remaining members. When the claim satisfies the step's
    /// quorum, every remaining pool task of the step instance is retired —
    /// no further claims are offered.
    pub fn claim(
        &mut self,
        workflow_item: WorkflowItemId,
        step_id: &str,
        user: EPersonId,
    ) -> Result<ClaimedTask, WorkflowError> {
        let step = self.step(step_id)?;

        if self.progress.find(workflow_item, user)?.is_some() {
            return Err(WorkflowError::AlreadyClaimed {
                workflow_item,
                user,
            });
        }

        let task = self
            .claimable_task(workflow_item, step_id, user)?
            .ok_or(WorkflowError::TaskNotFound {
                workflow_item,
                user,
            })?;

        if requirements::engaged(self.progress, workflow_item)? >= step.required_users {
            // A pool task survived past a satisfied quorum. Refuse loudly
            // rather than over-admit.
            warn!(%workflow_item, step_id, "pool task found past a satisfied quorum");
            return Err(WorkflowError::QuorumExceeded {
                workflow_item,
                step_id: step_id.to_owned(),
            });
        }

        if task.assignee.is_eperson() {
            self.tasks.delete_pool_task(task.id)?;
        }

        let id =
            self.tasks
                .create_claimed_task(workflow_item, step_id, &task.action_id, user)?;
        self.progress.insert(InProgressUser {
            workflow_item,
            user,
            finished: false,
        })?;

        if requirements::met(self.progress, workflow_item, &step)? {
            let retired = self.tasks.delete_pool_tasks_for_step(workflow_item, step_id)?;
            debug!(%workflow_item, step_id, retired, "quorum satisfied, retired pool");
        }

        Ok(ClaimedTask {
            id,
            workflow_item,
            step_id: step_id.to_owned(),
            action_id: task.action_id,
            owner: user,
        })
    }

    /// Give a claim back to the pool.
    ///
    /// When the quorum had just been satisfied and this release breaks it,
    /// every role member not engaged anymore gets a fresh personal task:
    /// they are all owed an opportunity again. Below quorum nothing was
    /// retired, so only the releasing account needs its personal task back —
    /// and only if it is still a role member. Returns the number of pool
    /// tasks regenerated.
    pub fn release(
        &mut self,
        workflow_item: WorkflowItemId,
        step_id: &str,
        user: EPersonId,
    ) -> Result<usize, WorkflowError> {
        let step = self.step(step_id)?;
        let total_before = requirements::engaged(self.progress, workflow_item)?;

        if self.progress.find(workflow_item, user)?.is_none() {
            return Err(WorkflowError::NotClaimed {
                workflow_item,
                user,
            });
        }

        if let Some(claimed) = self.tasks.claimed_task_of(workflow_item, user)? {
            self.tasks.delete_claimed_task(claimed.id)?;
        }
        self.progress.delete(workflow_item, user)?;

        let members = self
            .role(workflow_item, step_id)?
            .all_epersons(self.directory)?;

        let regenerated = if total_before == step.required_users {
            let engaged: BTreeSet<EPersonId> = self
                .progress
                .all(workflow_item)?
                .iter()
                .map(|row| row.user)
                .collect();

            let mut count = 0;
            for member in members {
                if engaged.contains(&member) {
                    continue;
                }
                self.tasks.create_pool_task(
                    workflow_item,
                    step_id,
                    &step.action,
                    Principal::EPerson(member),
                )?;
                count += 1;
            }
            count
        } else if members.contains(&user) {
            self.tasks.create_pool_task(
                workflow_item,
                step_id,
                &step.action,
                Principal::EPerson(user),
            )?;
            1
        } else {
            0
        };

        debug!(%workflow_item, step_id, %user, regenerated, "released claim");

        Ok(regenerated)
    }

    /// Record that a reviewer has completed their part. Quorum accounting
    /// already happened at claim time, so the pool is untouched.
    pub fn finish(
        &mut self,
        workflow_item: WorkflowItemId,
        user: EPersonId,
    ) -> Result<(), WorkflowError> {
        if let Some(claimed) = self.tasks.claimed_task_of(workflow_item, user)? {
            self.tasks.delete_claimed_task(claimed.id)?;
        }

        if !self.progress.set_finished(workflow_item, user)? {
            return Err(WorkflowError::NotClaimed {
                workflow_item,
                user,
            });
        }

        Ok(())
    }

    /// Drop every quorum-accounting row of the item. Called on step
    /// transition and on termination; this is what keeps the item-scoped
    /// counts step-scoped.
    pub fn clear(&mut self, workflow_item: WorkflowItemId) -> Result<(), WorkflowError> {
        self.progress.delete_all(workflow_item)?;
        Ok(())
    }

    /// Drop every pool and claimed task of the item (workflow advance or
    /// termination).
    pub fn retire(&mut self, workflow_item: WorkflowItemId) -> Result<(), WorkflowError> {
        for task in self.tasks.pool_tasks(workflow_item)? {
            self.tasks.delete_pool_task(task.id)?;
        }
        for task in self.tasks.claimed_tasks(workflow_item)? {
            self.tasks.delete_claimed_task(task.id)?;
        }
        Ok(())
    }

    fn step(&self, step_id: &str) -> Result<Step, WorkflowError> {
        self.roles
            .step(step_id)?
            .ok_or_else(|| WorkflowError::StepNotDefined {
                step_id: step_id.to_owned(),
            })
    }

    fn role(
        &self,
        workflow_item: WorkflowItemId,
        step_id: &str,
    ) -> Result<RoleMembers, WorkflowError> {
        self.roles
            .members(workflow_item, step_id)?
            .ok_or_else(|| WorkflowError::RoleNotDefined {
                step_id: step_id.to_owned(),
            })
    }

    /// The pool task `user` may claim: their personal task, or the first
    /// group task whose group they belong to.
    fn claimable_task(
        &self,
        workflow_item: WorkflowItemId,
        step_id: &str,
        user: EPersonId,
    ) -> Result<Option<PoolTask>, WorkflowError> {
        if let Some(task) = self.tasks.personal_pool_task(workflow_item, step_id, user)? {
            return Ok(Some(task));
        }

        for task in self.tasks.pool_tasks(workflow_item)? {
            if task.step_id != step_id {
                continue;
            }
            if let Some(group) = task.assignee.group()
                && self.directory.is_member(user, group)?
            {
                return Ok(Some(task));
            }
        }

        Ok(None)
    }
}
