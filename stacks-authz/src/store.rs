// SPDX-License-Identifier: MIT OR Apache-2.0

use stacks_core::{Action, Resource, ResourceKind, StoreError};
use tracing::debug;

use crate::policy::{Grant, PolicyId, PolicyKind, ResourcePolicy};

/// Durable storage of resource policies.
///
/// Implementations persist rows keyed by the natural key enumerated here; all
/// mutation happens inside the caller's unit of work and is committed or
/// rolled back as a whole by the caller.
pub trait PolicyStore {
    /// Bind a grant to a resource and persist it. Returns the assigned id.
    fn grant(&mut self, resource: Resource, grant: Grant) -> Result<PolicyId, StoreError>;

    /// Delete one policy. Returns `false` when no such policy exists.
    fn revoke(&mut self, id: PolicyId) -> Result<bool, StoreError>;

    /// Delete every policy on a resource (resource deletion).
    fn revoke_all(&mut self, resource: Resource) -> Result<(), StoreError>;

    /// Every policy stored on a resource.
    fn policies_on(&self, resource: Resource) -> Result<Vec<ResourcePolicy>, StoreError>;

    /// Every policy stored on a resource granting `action`.
    fn policies_on_matching(
        &self,
        resource: Resource,
        action: Action,
    ) -> Result<Vec<ResourcePolicy>, StoreError> {
        let mut policies = self.policies_on(resource)?;
        policies.retain(|policy| policy.action == action);
        Ok(policies)
    }

    /// Supersede every policy on a resource with a new set, as one unit.
    fn replace_all(&mut self, resource: Resource, grants: Vec<Grant>) -> Result<(), StoreError> {
        self.revoke_all(resource)?;
        for grant in grants {
            self.grant(resource, grant)?;
        }
        Ok(())
    }
}

/// Copy the policies of an enclosing resource down onto a newly created child.
///
/// This is the creation-time inheritance rule: lookups never walk upward for
/// ordinary actions, so the rows must be materialized on the child when it is
/// created. `Custom` policies are not copied (they are hand-placed for their
/// exact resource), and `Admin` grants are not copied onto bundles or
/// bitstreams since administration of containers flows through the Admin
/// cascade instead. Validity windows are preserved so embargoes carry over.
///
/// Returns the number of policies copied.
pub fn inherit_policies<S: PolicyStore>(
    store: &mut S,
    from: Resource,
    to: Resource,
) -> Result<usize, StoreError> {
    let mut copied = 0;

    for policy in store.policies_on(from)? {
        if policy.kind == Some(PolicyKind::Custom) {
            continue;
        }

        let skip_admin = matches!(to.kind(), ResourceKind::Bundle | ResourceKind::Bitstream);
        if skip_admin && policy.action == Action::Admin {
            continue;
        }

        let grant = policy.to_grant().with_kind(PolicyKind::Inherited);
        store.grant(to, grant)?;
        copied += 1;
    }

    debug!(%from, %to, copied, "inherited policies");

    Ok(copied)
}
