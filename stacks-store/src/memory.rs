// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::{BTreeMap, BTreeSet, HashMap};

use stacks_authz::{Grant, PolicyId, PolicyStore, ResourcePolicy};
use stacks_core::{
    BitstreamId, BundleId, CollectionId, CommunityId, Containment, Directory, EPersonId, GroupId,
    ItemId, Principal, Resource, StoreError,
};
use stacks_workflow::{
    ClaimedTask, InProgressUser, PoolTask, ProgressStore, RoleDirectory, RoleMembers, Step,
    TaskId, TaskStore, WorkflowItemId,
};

/// The combined in-memory backend.
///
/// Each table is a public field implementing one of the consumed traits, so a
/// unit of work can borrow the policy table and the task tables
/// independently. Exclusive (`&mut`) access to a table is the serialization
/// point a transactional backend would provide with row locks; two claims
/// racing for the last quorum slot cannot interleave here.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub policies: PolicyTable,
    pub groups: GroupTable,
    pub content: ContentGraph,
    pub tasks: TaskTable,
    pub progress: ProgressTable,
    pub workflow: WorkflowDefs,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Resource policies keyed by id.
#[derive(Debug, Default)]
pub struct PolicyTable {
    next_id: u64,
    rows: BTreeMap<PolicyId, ResourcePolicy>,
}

impl PolicyStore for PolicyTable {
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

/// Group membership: direct members plus nesting edges. Transitive lookups
/// walk the nesting graph breadth-first; cycles are tolerated.
#[derive(Debug, Default)]
pub struct GroupTable {
    members: HashMap<GroupId, BTreeSet<EPersonId>>,
    nested: HashMap<GroupId, BTreeSet<GroupId>>,
}

impl GroupTable {
    pub fn add_member(&mut self, group: GroupId, eperson: EPersonId) {
        self.members.entry(group).or_default().insert(eperson);
    }

    pub fn remove_member(&mut self, group: GroupId, eperson: EPersonId) {
        if let Some(members) = self.members.get_mut(&group) {
            members.remove(&eperson);
        }
    }

    pub fn nest(&mut self, parent: GroupId, child: GroupId) {
        self.nested.entry(parent).or_default().insert(child);
    }
}

impl Directory for GroupTable {
    fn is_member(&self, eperson: EPersonId, group: GroupId) -> Result<bool, StoreError> {
        let mut queue = vec![group];
        let mut visited = BTreeSet::new();

        while let Some(group) = queue.pop() {
            if !visited.insert(group) {
                continue;
            }
            if self
                .members
                .get(&group)
                .is_some_and(|members| members.contains(&eperson))
            {
                return Ok(true);
            }
            if let Some(nested) = self.nested.get(&group) {
                queue.extend(nested.iter().copied());
            }
        }

        Ok(false)
    }

    fn expand(&self, group: GroupId) -> Result<Vec<EPersonId>, StoreError> {
        let mut all = BTreeSet::new();
        let mut queue = vec![group];
        let mut visited = BTreeSet::new();

        while let Some(group) = queue.pop() {
            if !visited.insert(group) {
                continue;
            }
            if let Some(members) = self.members.get(&group) {
                all.extend(members.iter().copied());
            }
            if let Some(nested) = self.nested.get(&group) {
                queue.extend(nested.iter().copied());
            }
        }

        Ok(all.into_iter().collect())
    }
}

/// The containment hierarchy. Items may belong to several collections and
/// report the lowest collection id as their owner; every other resource has
/// at most one parent.
#[derive(Debug, Default)]
pub struct ContentGraph {
    parents: HashMap<Resource, Resource>,
    item_collections: HashMap<ItemId, BTreeSet<CollectionId>>,
}

impl ContentGraph {
    pub fn add_sub_community(&mut self, child: CommunityId, parent: CommunityId) {
        self.parents
            .insert(Resource::Community(child), Resource::Community(parent));
    }

    pub fn add_collection(&mut self, collection: CollectionId, community: CommunityId) {
        self.parents
            .insert(Resource::Collection(collection), Resource::Community(community));
    }

    pub fn add_item(&mut self, item: ItemId, collection: CollectionId) {
        self.item_collections
            .entry(item)
            .or_default()
            .insert(collection);
    }

    pub fn remove_item(&mut self, item: ItemId, collection: CollectionId) {
        if let Some(collections) = self.item_collections.get_mut(&item) {
            collections.remove(&collection);
        }
    }

    pub fn add_bundle(&mut self, bundle: BundleId, item: ItemId) {
        self.parents
            .insert(Resource::Bundle(bundle), Resource::Item(item));
    }

    pub fn add_bitstream(&mut self, bitstream: BitstreamId, bundle: BundleId) {
        self.parents
            .insert(Resource::Bitstream(bitstream), Resource::Bundle(bundle));
    }
}

impl Containment for ContentGraph {
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

/// Pool and claimed tasks keyed by id.
#[derive(Debug, Default)]
pub struct TaskTable {
    next_id: u64,
    pool: BTreeMap<TaskId, PoolTask>,
    claimed: BTreeMap<TaskId, ClaimedTask>,
}

impl TaskTable {
    fn next_id(&mut self) -> TaskId {
        self.next_id += 1;
        TaskId(self.next_id)
    }
}

impl TaskStore for TaskTable {
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
pub struct ProgressTable {
    rows: BTreeMap<(WorkflowItemId, EPersonId), InProgressUser>,
}

impl ProgressStore for ProgressTable {
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

/// Workflow definitions: steps by id, role membership by step id with
/// optional per-item overrides (a collection may swap reviewers for a single
/// submission).
#[derive(Debug, Default)]
pub struct WorkflowDefs {
    steps: HashMap<String, Step>,
    roles: HashMap<String, RoleMembers>,
    item_roles: HashMap<(WorkflowItemId, String), RoleMembers>,
}

impl WorkflowDefs {
    pub fn define_step(&mut self, step: Step) {
        self.steps.insert(step.id.clone(), step);
    }

    pub fn define_role(&mut self, step_id: impl Into<String>, members: RoleMembers) {
        self.roles.insert(step_id.into(), members);
    }

    pub fn define_item_role(
        &mut self,
        workflow_item: WorkflowItemId,
        step_id: impl Into<String>,
        members: RoleMembers,
    ) {
        self.item_roles
            .insert((workflow_item, step_id.into()), members);
    }
}

impl RoleDirectory for WorkflowDefs {
    fn step(&self, step_id: &str) -> Result<Option<Step>, StoreError> {
        Ok(self.steps.get(step_id).cloned())
    }

    fn members(
        &self,
        workflow_item: WorkflowItemId,
        step_id: &str,
    ) -> Result<Option<RoleMembers>, StoreError> {
        if let Some(members) = self
            .item_roles
            .get(&(workflow_item, step_id.to_owned()))
        {
            return Ok(Some(members.clone()));
        }

        Ok(self.roles.get(step_id).cloned())
    }
}
