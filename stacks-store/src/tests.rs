// SPDX-License-Identifier: MIT OR Apache-2.0

use stacks_authz::{AuthorizeConfig, Authorizer, Grant, PolicyStore};
use stacks_core::{
    Action, CollectionId, CommunityId, EPersonId, GroupId, ItemId, Resource, Session,
};
use stacks_workflow::{RoleMembers, Step, TaskPool, TaskStore, WorkflowError, WorkflowItemId};

use crate::MemoryStore;

const NOW: u64 = 1_700_000_000;

/// community 1 → collection 2 → item 3; reviewers group 9 with three members.
fn repository() -> (MemoryStore, AuthorizeConfig) {
    let mut store = MemoryStore::new();
    store.content.add_collection(CollectionId(2), CommunityId(1));
    store.content.add_item(ItemId(3), CollectionId(2));

    for member in [10, 11, 12] {
        store.groups.add_member(GroupId(9), EPersonId(member));
    }

    (store, AuthorizeConfig::new(GroupId(1), GroupId(0)))
}

#[test]
fn granted_group_read_reaches_members_through_nesting() {
    let (mut store, config) = repository();
    let sub_group = GroupId(20);
    store.groups.nest(GroupId(9), sub_group);
    store.groups.add_member(sub_group, EPersonId(13));

    store
        .policies
        .grant(Resource::Item(ItemId(3)), Grant::new(Action::Read, GroupId(9)))
        .unwrap();

    let authz = Authorizer::new(&store.policies, &store.groups, &store.content, &config);
    let nested_member = Session::of(EPersonId(13), NOW);
    assert!(
        authz
            .allows(&nested_member, Resource::Item(ItemId(3)), Action::Read)
            .unwrap()
    );
}

#[test]
fn collection_admin_runs_the_item_through_review() {
    let (mut store, config) = repository();
    let admin = EPersonId(5);
    store
        .policies
        .grant(
            Resource::Collection(CollectionId(2)),
            Grant::new(Action::Admin, admin),
        )
        .unwrap();

    let session = Session::of(admin, NOW);
    let authz = Authorizer::new(&store.policies, &store.groups, &store.content, &config);

    // The collection admin may manage the item's policies and withdraw it.
    authz.manage_item_policies(&session, ItemId(3)).unwrap();
    authz.withdraw_item(&session, ItemId(3)).unwrap();
    authz.reinstate_item(&session, ItemId(3)).unwrap();
}

#[test]
fn reinstate_needs_every_collection_not_just_the_first() {
    let (mut store, config) = repository();
    store.content.add_collection(CollectionId(7), CommunityId(6));
    store.content.add_item(ItemId(3), CollectionId(7));

    let admin = EPersonId(5);
    store
        .policies
        .grant(
            Resource::Collection(CollectionId(2)),
            Grant::new(Action::Admin, admin),
        )
        .unwrap();

    let session = Session::of(admin, NOW);
    let authz = Authorizer::new(&store.policies, &store.groups, &store.content, &config);
    assert!(authz.reinstate_item(&session, ItemId(3)).is_err());
}

#[test]
fn full_review_with_a_group_role_and_a_mid_step_release() {
    let (mut store, _config) = repository();
    let item = WorkflowItemId(100);
    store.workflow.define_step(Step::new("review", "reviewaction", 2));
    store.workflow.define_role(
        "review",
        RoleMembers {
            epersons: vec![],
            groups: vec![GroupId(9)],
        },
    );

    let mut pool = TaskPool::new(
        &mut store.tasks,
        &mut store.progress,
        &store.workflow,
        &store.groups,
    );

    pool.open(item, "review").unwrap();
    pool.claim(item, "review", EPersonId(10)).unwrap();
    pool.claim(item, "review", EPersonId(11)).unwrap();

    // Quorum satisfied: the group task is gone.
    let err = pool.claim(item, "review", EPersonId(12)).unwrap_err();
    assert!(matches!(err, WorkflowError::TaskNotFound { .. }));

    // One reviewer steps back; everyone not engaged gets a personal task.
    let regenerated = pool.release(item, "review", EPersonId(11)).unwrap();
    assert_eq!(regenerated, 2);
    pool.claim(item, "review", EPersonId(12)).unwrap();

    pool.finish(item, EPersonId(10)).unwrap();
    pool.finish(item, EPersonId(12)).unwrap();

    // Step complete: accounting rows and tasks are cleared for the next step.
    pool.clear(item).unwrap();
    pool.retire(item).unwrap();
    assert!(store.tasks.pool_tasks(item).unwrap().is_empty());
    assert!(store.tasks.claimed_tasks(item).unwrap().is_empty());
}

#[test]
fn per_item_role_override_replaces_the_step_role() {
    let (mut store, _config) = repository();
    let item = WorkflowItemId(100);
    store.workflow.define_step(Step::new("review", "reviewaction", 1));
    store.workflow.define_role(
        "review",
        RoleMembers {
            epersons: vec![],
            groups: vec![GroupId(9)],
        },
    );
    store.workflow.define_item_role(
        item,
        "review",
        RoleMembers {
            epersons: vec![EPersonId(42)],
            groups: vec![],
        },
    );

    let mut pool = TaskPool::new(
        &mut store.tasks,
        &mut store.progress,
        &store.workflow,
        &store.groups,
    );

    pool.open(item, "review").unwrap();

    // The regular reviewers are not eligible for this submission.
    let err = pool.claim(item, "review", EPersonId(10)).unwrap_err();
    assert!(matches!(err, WorkflowError::TaskNotFound { .. }));
    pool.claim(item, "review", EPersonId(42)).unwrap();
}

#[test]
fn replace_all_supersedes_previous_grants() {
    let (mut store, config) = repository();
    let item = Resource::Item(ItemId(3));
    store
        .policies
        .grant(item, Grant::new(Action::Read, EPersonId(10)))
        .unwrap();
    store
        .policies
        .replace_all(item, vec![Grant::new(Action::Read, EPersonId(11))])
        .unwrap();

    let authz = Authorizer::new(&store.policies, &store.groups, &store.content, &config);
    assert!(
        !authz
            .allows(&Session::of(EPersonId(10), NOW), item, Action::Read)
            .unwrap()
    );
    assert!(
        authz
            .allows(&Session::of(EPersonId(11), NOW), item, Action::Read)
            .unwrap()
    );
}
