// SPDX-License-Identifier: MIT OR Apache-2.0

//! Review-task pools and reviewer-quorum accounting for the stacks
//! repository.
//!
//! A workflow step declares how many distinct reviewers must claim and finish
//! it. While the step is active, its unclaimed work sits in a pool of
//! [`PoolTask`]s assignable to individual accounts or whole groups; claiming
//! converts pool entries into a personal [`ClaimedTask`] and an
//! [`InProgressUser`] row used for quorum accounting. The [`TaskPool`] engine
//! maintains the central invariant: the pool never offers more claims than
//! the quorum leaves room for, yet no eligible reviewer is left without an
//! assignable task after a claim is released.

mod pool;
pub mod requirements;
mod role;
mod store;
mod task;
#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;

pub use pool::{TaskPool, WorkflowError};
pub use role::{RoleDirectory, RoleMembers};
pub use store::{ProgressStore, TaskStore};
pub use task::{ClaimedTask, InProgressUser, PoolTask, Step, TaskId, WorkflowItemId};
