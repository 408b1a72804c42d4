// SPDX-License-Identifier: MIT OR Apache-2.0

//! Small in-memory fixtures for exercising the resolver without a real
//! backend. The production-shaped combined store lives in `stacks-store`.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use stacks_core::{
    BitstreamId, BundleId, CollectionId, CommunityId, Containment, Directory, EPersonId, GroupId,
    ItemId, Resource, StoreError,
};

use crate::config::AuthorizeConfig;
use crate::policy::{Grant, PolicyId, ResourcePolicy};
use crate::resolver::Authorizer;
use crate::store::PolicyStore;

/// Policy rows in a map, ids handed out sequentially.
#[derive(Debug, Default)]
pub struct MemPolicies {
    next_id: u64,
    rows: BTreeMap<PolicyId, ResourcePolicy>,
}

impl PolicyStore for MemPolicies {
    fn grant(&mut self, resource: Resource, grant: Grant) -> Result<PolicyId, StoreError> {
        self.next_id += 1;
        let id = PolicyId(self.next_id);
        self.rows.insert(
            id,
            ResourcePolicy {
                id,
                resource,
                action: grant.action,
                principal: grant.principal,
                kind: grant.kind,
                valid_from: grant.valid_from,
                valid_until: grant.valid_until,
            },
        );
        Ok(id)
    }

    fn revoke(&mut self, id: PolicyId) -> Result<bool, StoreError> {
        Ok(self.rows.remove(&id).is_some())
    }

    fn revoke_all(&mut self, resource: Resource) -> Result<(), StoreError> {
        self.rows.retain(|_, policy| policy.resource != resource);
        Ok(())
    }

    fn policies_on(&self, resource: Resource) -> Result<Vec<ResourcePolicy>, StoreError> {
        Ok(self
            .rows
            .values()
            .filter(|policy| policy.resource == resource)
            .cloned()
            .collect())
    }
}

/// Group membership with nesting edges; transitive lookup walks the edges.
#[derive(Debug, Default)]
pub struct MemDirectory {
    members: HashMap<GroupId, BTreeSet<EPersonId>>,
    nested: HashMap<GroupId, BTreeSet<GroupId>>,
}

impl Directory for MemDirectory {
    fn is_member(&self, eperson: EPersonId, group: GroupId) -> Result<bool, StoreError> {
        Ok(self.expand(group)?.contains(&eperson))
    }

    fn expand(&self, group: GroupId) -> Result<Vec<EPersonId>, StoreError> {
        let mut seen = BTreeSet::new();
        let mut queue = vec![group];
        let mut visited = BTreeSet::new();

        while let Some(group) = queue.pop() {
            if !visited.insert(group) {
                continue;
            }
            if let Some(members) = self.members.get(&group) {
                seen.extend(members.iter().copied());
            }
            if let Some(nested) = self.nested.get(&group) {
                queue.extend(nested.iter().copied());
            }
        }

        Ok(seen.into_iter().collect())
    }
}

/// Containment edges, one parent per resource except items, which may belong
/// to several collections.
#[derive(Debug, Default)]
pub struct MemContainment {
    parents: HashMap<Resource, Resource>,
    item_collections: HashMap<ItemId, BTreeSet<CollectionId>>,
}

impl Containment for MemContainment {
    fn parent_of(&self, resource: Resource) -> Result<Option<Resource>, StoreError> {
        if let Resource::Item(item) = resource {
            return Ok(self
                .item_collections
                .get(&item)
                .and_then(|collections| collections.first())
                .map(|collection| Resource::Collection(*collection)));
        }

        Ok(self.parents.get(&resource).copied())
    }

    fn collections_of(&self, item: ItemId) -> Result<Vec<CollectionId>, StoreError> {
        Ok(self
            .item_collections
            .get(&item)
            .map(|collections| collections.iter().copied().collect())
            .unwrap_or_default())
    }

    fn parent_community_of(
        &self,
        collection: CollectionId,
    ) -> Result<Option<CommunityId>, StoreError> {
        match self.parents.get(&Resource::Collection(collection)) {
            Some(Resource::Community(community)) => Ok(Some(*community)),
            _ => Ok(None),
        }
    }
}

/// A complete authorization environment over the in-memory fixtures.
#[derive(Debug)]
pub struct TestEnv {
    pub policies: MemPolicies,
    pub directory: MemDirectory,
    pub containment: MemContainment,
    pub config: AuthorizeConfig,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            policies: MemPolicies::default(),
            directory: MemDirectory::default(),
            containment: MemContainment::default(),
            config: AuthorizeConfig::new(GroupId(1), GroupId(0)),
        }
    }

    /// An environment with every delegation flag disabled.
    pub fn locked_down() -> Self {
        Self {
            config: AuthorizeConfig::locked_down(GroupId(1), GroupId(0)),
            ..Self::new()
        }
    }

    pub fn authorizer(&self) -> Authorizer<'_, MemPolicies, MemDirectory, MemContainment> {
        Authorizer::new(
            &self.policies,
            &self.directory,
            &self.containment,
            &self.config,
        )
    }

    pub fn add_admin(&mut self, id: u64) -> EPersonId {
        let eperson = EPersonId(id);
        self.add_member(self.config.administrators, eperson);
        eperson
    }

    pub fn add_member(&mut self, group: GroupId, eperson: EPersonId) {
        self.directory.members.entry(group).or_default().insert(eperson);
    }

    pub fn nest_group(&mut self, parent: GroupId, child: GroupId) {
        self.directory.nested.entry(parent).or_default().insert(child);
    }

    pub fn add_sub_community(&mut self, child: CommunityId, parent: CommunityId) {
        self.containment
            .parents
            .insert(Resource::Community(child), Resource::Community(parent));
    }

    pub fn add_collection(&mut self, collection: CollectionId, community: CommunityId) {
        self.containment
            .parents
            .insert(Resource::Collection(collection), Resource::Community(community));
    }

    pub fn add_item(&mut self, item: ItemId, collection: CollectionId) {
        self.containment
            .item_collections
            .entry(item)
            .or_default()
            .insert(collection);
    }

    pub fn add_bundle(&mut self, bundle: BundleId, item: ItemId) {
        self.containment
            .parents
            .insert(Resource::Bundle(bundle), Resource::Item(item));
    }

    pub fn add_bitstream(&mut self, bitstream: BitstreamId, bundle: BundleId) {
        self.containment
            .parents
            .insert(Resource::Bitstream(bitstream), Resource::Bundle(bundle));
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
