// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Actions which can be granted on a resource.
///
/// `Admin` is not merely another action: during resolution with inheritance
/// enabled it acts as a superset, satisfying any requested action on the
/// resource or one of its descendants.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Action {
    Read,
    Write,
    Delete,
    Add,
    Remove,
    Admin,

    /// Read access granted by default to bitstreams of newly archived items.
    DefaultBitstreamRead,

    /// Read access granted by default to newly archived items.
    DefaultItemRead,

    /// Read access to an item after it has been withdrawn.
    WithdrawnRead,
}

impl Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Action::Read => "READ",
            Action::Write => "WRITE",
            Action::Delete => "DELETE",
            Action::Add => "ADD",
            Action::Remove => "REMOVE",
            Action::Admin => "ADMIN",
            Action::DefaultBitstreamRead => "DEFAULT_BITSTREAM_READ",
            Action::DefaultItemRead => "DEFAULT_ITEM_READ",
            Action::WithdrawnRead => "WITHDRAWN_READ",
        };

        write!(f, "{}", s)
    }
}
