// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::{Deserialize, Serialize};
use stacks_core::{Directory, EPersonId, GroupId, StoreError};

use crate::task::{Step, WorkflowItemId};

/// The configured membership of a step's reviewer role: individual accounts
/// and whole groups.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct RoleMembers {
    pub epersons: Vec<EPersonId>,
    pub groups: Vec<GroupId>,
}

impl RoleMembers {
    pub fn is_empty(&self) -> bool {
        self.epersons.is_empty() && self.groups.is_empty()
    }

    /// Every account the role reaches: the named accounts plus the flattened
    /// membership of the named groups, deduplicated, ascending id.
    pub fn all_epersons<D: Directory>(&self, directory: &D) -> Result<Vec<EPersonId>, StoreError> {
        let mut all: Vec<EPersonId> = self.epersons.clone();
        for group in &self.groups {
            all.extend(directory.expand(*group)?);
        }

        all.sort_unstable();
        all.dedup();
        Ok(all)
    }
}

/// Role-membership oracle, supplied by the workflow-definition subsystem.
///
/// A step or role missing from the configuration is reported as `None` and
/// treated as a hard configuration failure by the engine, never as an empty
/// but valid role.
pub trait RoleDirectory {
    fn step(&self, step_id: &str) -> Result<Option<Step>, StoreError>;

    fn members(
        &self,
        workflow_item: WorkflowItemId,
        step_id: &str,
    ) -> Result<Option<RoleMembers>, StoreError>;
}
