// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use stacks_core::{Action, Principal, Resource};

/// Identifier of a stored [`ResourcePolicy`], assigned by the policy store.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PolicyId(pub u64);

impl Display for PolicyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "policy {}", self.0)
    }
}

/// Why a policy exists. Used to keep automatically managed grants apart from
/// ordinary ones during bulk operations and inheritance copies. An ordinary
/// grant carries no kind at all.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum PolicyKind {
    /// Placed while an item moves through submission.
    Submission,

    /// Placed while an item moves through workflow review.
    Workflow,

    /// Copied down from the enclosing resource at creation time.
    Inherited,

    /// Hand-placed for its exact resource, typically an access condition a
    /// submitter configured. Never copied down to child resources.
    Custom,
}

/// A grant of one action to one principal, before it is bound to a resource
/// and assigned an id by the store.
///
/// The optional validity window is a pair of Unix timestamps; a policy grants
/// nothing outside its window. Embargoes are windows with a future start.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Grant {
    pub action: Action,
    pub principal: Principal,
    pub kind: Option<PolicyKind>,
    pub valid_from: Option<u64>,
    pub valid_until: Option<u64>,
}

impl Grant {
    /// An ordinary grant: no kind, unbounded validity window. Ordinary grants
    /// participate in inheritance copies; tag with [`PolicyKind::Custom`] to
    /// opt out.
    pub fn new(action: Action, principal: impl Into<Principal>) -> Self {
        Self {
            action,
            principal: principal.into(),
            kind: None,
            valid_from: None,
            valid_until: None,
        }
    }

    pub fn with_kind(mut self, kind: PolicyKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn valid_from(mut self, from: u64) -> Self {
        self.valid_from = Some(from);
        self
    }

    pub fn valid_until(mut self, until: u64) -> Self {
        self.valid_until = Some(until);
        self
    }
}

/// A stored policy: one action on one resource for one principal.
///
/// The principal is a [`Principal`] tagged variant, so a policy naming both
/// an account and a group cannot be constructed.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ResourcePolicy {
    pub id: PolicyId,
    pub resource: Resource,
    pub action: Action,
    pub principal: Principal,
    pub kind: Option<PolicyKind>,
    pub valid_from: Option<u64>,
    pub valid_until: Option<u64>,
}

impl ResourcePolicy {
    /// Whether the policy is inside its validity window at `now`. An unset
    /// bound is unbounded on that side.
    pub fn is_active(&self, now: u64) -> bool {
        if self.valid_from.is_some_and(|from| now < from) {
            return false;
        }

        !self.valid_until.is_some_and(|until| now > until)
    }

    /// Rebind this policy as a grant, keeping action, principal, kind and
    /// validity window.
    pub fn to_grant(&self) -> Grant {
        Grant {
            action: self.action,
            principal: self.principal,
            kind: self.kind,
            valid_from: self.valid_from,
            valid_until: self.valid_until,
        }
    }
}
