// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Identifier of an individual account.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EPersonId(pub u64);

impl Display for EPersonId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "eperson {}", self.0)
    }
}

/// Identifier of a named group of accounts, possibly nested inside other
/// groups.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupId(pub u64);

impl Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "group {}", self.0)
    }
}

/// The principal a grant or task is addressed to: one account or one group,
/// never both.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Principal {
    EPerson(EPersonId),
    Group(GroupId),
}

impl Principal {
    /// Return the account this principal refers to, if it is an individual.
    pub fn eperson(&self) -> Option<EPersonId> {
        match self {
            Principal::EPerson(id) => Some(*id),
            Principal::Group(_) => None,
        }
    }

    /// Return the group this principal refers to, if it is a group.
    pub fn group(&self) -> Option<GroupId> {
        match self {
            Principal::EPerson(_) => None,
            Principal::Group(id) => Some(*id),
        }
    }

    pub fn is_eperson(&self) -> bool {
        matches!(self, Principal::EPerson(_))
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Principal::Group(_))
    }
}

impl Display for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Principal::EPerson(id) => id.fmt(f),
            Principal::Group(id) => id.fmt(f),
        }
    }
}

impl From<EPersonId> for Principal {
    fn from(id: EPersonId) -> Self {
        Principal::EPerson(id)
    }
}

impl From<GroupId> for Principal {
    fn from(id: GroupId) -> Self {
        Principal::Group(id)
    }
}
