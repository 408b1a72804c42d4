// SPDX-License-Identifier: MIT OR Apache-2.0

//! Managed operations: gatekeeping for the administrative surface of the
//! repository.
//!
//! Every operation here follows the same fixed delegation chain: if the
//! configuration delegates the operation to the administrator of the
//! immediately owning level, require Admin there; else, if delegated one
//! level further up, require Admin there; else only a system administrator
//! may proceed. A chain selects the single rule that applies — it never
//! retries a lower rung after the selected one denies.

use stacks_core::{
    Action, BitstreamId, BundleId, CollectionId, CommunityId, Containment, Directory, ItemId,
    Resource, Session,
};

use crate::policy::ResourcePolicy;
use crate::resolver::{Authorizer, AuthzError};
use crate::store::PolicyStore;

impl<S, D, C> Authorizer<'_, S, D, C>
where
    S: PolicyStore,
    D: Directory,
    C: Containment,
{
    /// Who may manage the policy set of a community.
    pub fn manage_community_policies(
        &self,
        session: &Session,
        community: CommunityId,
    ) -> Result<(), AuthzError> {
        if self.config.community_admin.policies {
            self.authorize(session, Resource::Community(community), Action::Admin)
        } else {
            self.require_system_admin(session, "manage community policies")
        }
    }

    /// Who may manage the policy set of a collection.
    pub fn manage_collection_policies(
        &self,
        session: &Session,
        collection: CollectionId,
    ) -> Result<(), AuthzError> {
        if self.config.collection_admin.policies {
            self.authorize(session, Resource::Collection(collection), Action::Admin)
        } else if self.config.community_admin.collection_policies {
            let community = self.required_parent_community(collection)?;
            self.authorize(session, Resource::Community(community), Action::Admin)
        } else {
            self.require_system_admin(session, "manage collection policies")
        }
    }

    /// Who may manage the policy set of an item.
    pub fn manage_item_policies(
        &self,
        session: &Session,
        item: ItemId,
    ) -> Result<(), AuthzError> {
        if self.config.item_admin.policies {
            self.authorize(session, Resource::Item(item), Action::Admin)
        } else if self.config.collection_admin.item_policies {
            let collection = self.owning_collection(item)?;
            self.authorize(session, Resource::Collection(collection), Action::Admin)
        } else if self.config.community_admin.item_policies {
            let community = self.owning_community(item)?;
            self.authorize(session, Resource::Community(community), Action::Admin)
        } else {
            self.require_system_admin(session, "manage item policies")
        }
    }

    /// Who may manage the policy set of a bundle.
    pub fn manage_bundle_policies(
        &self,
        session: &Session,
        bundle: BundleId,
    ) -> Result<(), AuthzError> {
        let item = self.owning_item(Resource::Bundle(bundle))?;
        if self.config.item_admin.bundle_policies {
            self.authorize(session, Resource::Item(item), Action::Admin)
        } else if self.config.collection_admin.bundle_policies {
            let collection = self.owning_collection(item)?;
            self.authorize(session, Resource::Collection(collection), Action::Admin)
        } else if self.config.community_admin.bundle_policies {
            let community = self.owning_community(item)?;
            self.authorize(session, Resource::Community(community), Action::Admin)
        } else {
            self.require_system_admin(session, "manage bundle policies")
        }
    }

    /// Who may manage the policy set of a bitstream.
    pub fn manage_bitstream_policies(
        &self,
        session: &Session,
        bitstream: BitstreamId,
    ) -> Result<(), AuthzError> {
        let item = self.owning_item(Resource::Bitstream(bitstream))?;
        if self.config.item_admin.bitstream_policies {
            self.authorize(session, Resource::Item(item), Action::Admin)
        } else if self.config.collection_admin.bitstream_policies {
            let collection = self.owning_collection(item)?;
            self.authorize(session, Resource::Collection(collection), Action::Admin)
        } else if self.config.community_admin.bitstream_policies {
            let community = self.owning_community(item)?;
            self.authorize(session, Resource::Community(community), Action::Admin)
        } else {
            self.require_system_admin(session, "manage bitstream policies")
        }
    }

    /// Dispatch policy management on the kind of resource the policy is
    /// attached to.
    pub fn manage_policy(
        &self,
        session: &Session,
        policy: &ResourcePolicy,
    ) -> Result<(), AuthzError> {
        match policy.resource {
            Resource::Community(community) => self.manage_community_policies(session, community),
            Resource::Collection(collection) => {
                self.manage_collection_policies(session, collection)
            }
            Resource::Item(item) => self.manage_item_policies(session, item),
            Resource::Bundle(bundle) => self.manage_bundle_policies(session, bundle),
            Resource::Bitstream(bitstream) => self.manage_bitstream_policies(session, bitstream),
        }
    }

    /// Who may change the submitters group of a collection.
    pub fn manage_submitters_group(
        &self,
        session: &Session,
        collection: CollectionId,
    ) -> Result<(), AuthzError> {
        if self.config.collection_admin.submitters {
            self.authorize(session, Resource::Collection(collection), Action::Admin)
        } else if self.config.community_admin.collection_submitters {
            let community = self.required_parent_community(collection)?;
            self.authorize(session, Resource::Community(community), Action::Admin)
        } else {
            self.require_system_admin(session, "manage a collection's submitters group")
        }
    }

    /// Who may change the workflow reviewer groups of a collection.
    pub fn manage_workflow_groups(
        &self,
        session: &Session,
        collection: CollectionId,
    ) -> Result<(), AuthzError> {
        if self.config.collection_admin.workflows {
            self.authorize(session, Resource::Collection(collection), Action::Admin)
        } else if self.config.community_admin.collection_workflows {
            let community = self.required_parent_community(collection)?;
            self.authorize(session, Resource::Community(community), Action::Admin)
        } else {
            self.require_system_admin(session, "manage a collection's workflow groups")
        }
    }

    /// Who may create or change the administrators group of a collection.
    pub fn manage_collection_admin_group(
        &self,
        session: &Session,
        collection: CollectionId,
    ) -> Result<(), AuthzError> {
        if self.config.collection_admin.admin_group {
            self.authorize(session, Resource::Collection(collection), Action::Admin)
        } else if self.config.community_admin.collection_admin_group {
            let community = self.required_parent_community(collection)?;
            self.authorize(session, Resource::Community(community), Action::Admin)
        } else {
            self.require_system_admin(session, "manage a collection's administrators group")
        }
    }

    /// Who may remove the administrators group of a collection. The group
    /// being removed must not authorize its own removal, so this starts one
    /// level above the collection.
    pub fn remove_collection_admin_group(
        &self,
        session: &Session,
        collection: CollectionId,
    ) -> Result<(), AuthzError> {
        if self.config.community_admin.collection_admin_group {
            if let Some(community) = self.containment.parent_community_of(collection)? {
                return self.authorize(session, Resource::Community(community), Action::Admin);
            }
        }

        self.require_system_admin(session, "remove a collection's administrators group")
    }

    /// Who may create or change the administrators group of a community.
    pub fn manage_community_admin_group(
        &self,
        session: &Session,
        community: CommunityId,
    ) -> Result<(), AuthzError> {
        if self.config.community_admin.admin_group {
            self.authorize(session, Resource::Community(community), Action::Admin)
        } else {
            self.require_system_admin(session, "manage a community's administrators group")
        }
    }

    /// Who may remove the administrators group of a community. As with
    /// collections, authority must come from above: the parent community.
    pub fn remove_community_admin_group(
        &self,
        session: &Session,
        community: CommunityId,
    ) -> Result<(), AuthzError> {
        if self.config.community_admin.admin_group {
            if let Some(parent) = self.containment.parent_of(Resource::Community(community))? {
                return self.authorize(session, parent, Action::Admin);
            }
        }

        self.require_system_admin(session, "remove a community's administrators group")
    }

    /// Who may manage the template item of a collection. Ordinary edit
    /// permission on the collection suffices; the delegation chain is only
    /// consulted when that direct check fails.
    pub fn manage_template_item(
        &self,
        session: &Session,
        collection: CollectionId,
    ) -> Result<(), AuthzError> {
        if self.allows(session, Resource::Collection(collection), Action::Write)? {
            return Ok(());
        }

        if self.config.collection_admin.template_item {
            self.authorize(session, Resource::Collection(collection), Action::Admin)
        } else if self.config.community_admin.collection_template_item {
            let community = self.required_parent_community(collection)?;
            self.authorize(session, Resource::Community(community), Action::Admin)
        } else {
            self.require_system_admin(session, "manage a collection's template item")
        }
    }

    /// Who may attach or detach the Creative Commons license of an item.
    /// Direct Add and Remove permission on the item suffices; the delegation
    /// chain is only consulted when that pre-check fails.
    pub fn manage_cc_license(&self, session: &Session, item: ItemId) -> Result<(), AuthzError> {
        let resource = Resource::Item(item);
        if self.allows(session, resource, Action::Add)?
            && self.allows(session, resource, Action::Remove)?
        {
            return Ok(());
        }

        if self.config.item_admin.cc_license {
            self.authorize(session, resource, Action::Admin)
        } else if self.config.collection_admin.item_cc_license {
            let collection = self.owning_collection(item)?;
            self.authorize(session, Resource::Collection(collection), Action::Admin)
        } else if self.config.community_admin.item_cc_license {
            let community = self.owning_community(item)?;
            self.authorize(session, Resource::Community(community), Action::Admin)
        } else {
            self.require_system_admin(session, "manage the Creative Commons license of an item")
        }
    }

    /// Who may withdraw an item from the archive. The delegation chain grants
    /// Admin-based withdrawal; failing that, plain Remove permission held
    /// directly on the owning collection suffices.
    pub fn withdraw_item(&self, session: &Session, item: ItemId) -> Result<(), AuthzError> {
        let collection = self.owning_collection(item)?;
        let mut authorized = false;

        if self.config.collection_admin.item_withdraw {
            authorized = self.allows(session, Resource::Collection(collection), Action::Admin)?;
        }

        if !authorized && self.config.community_admin.item_withdraw {
            if let Some(community) = self.containment.parent_community_of(collection)? {
                authorized =
                    self.allows(session, Resource::Community(community), Action::Admin)?;
            }
        }

        if !authorized {
            authorized = self.allows_inherit(
                session,
                Resource::Collection(collection),
                Action::Remove,
                false,
            )?;
        }

        if authorized {
            Ok(())
        } else {
            Err(AuthzError::WithdrawRefused {
                collection: Resource::Collection(collection),
            })
        }
    }

    /// Who may reinstate a withdrawn item. Every collection the item belongs
    /// to must independently authorize the reinstatement; one failing
    /// collection denies the whole operation. The check itself has no side
    /// effects, so a partial pass leaves nothing behind.
    pub fn reinstate_item(&self, session: &Session, item: ItemId) -> Result<(), AuthzError> {
        let collections = self.containment.collections_of(item)?;
        if collections.is_empty() {
            return Err(AuthzError::Orphaned {
                resource: Resource::Item(item),
            });
        }

        for collection in collections {
            let mut authorized = false;

            if self.config.collection_admin.item_reinstate {
                authorized =
                    self.allows(session, Resource::Collection(collection), Action::Admin)?;
            }

            if !authorized && self.config.community_admin.item_reinstate {
                if let Some(community) = self.containment.parent_community_of(collection)? {
                    authorized =
                        self.allows(session, Resource::Community(community), Action::Admin)?;
                }
            }

            if !authorized {
                self.authorize(session, Resource::Collection(collection), Action::Add)?;
            }
        }

        Ok(())
    }

    /// Require the session to belong to a system administrator.
    pub fn require_admin_role(&self, session: &Session) -> Result<(), AuthzError> {
        self.require_system_admin(session, "perform this operation")
    }

    fn require_system_admin(
        &self,
        session: &Session,
        operation: &'static str,
    ) -> Result<(), AuthzError> {
        if self.is_system_admin(session)? {
            Ok(())
        } else {
            Err(AuthzError::NotAdmin { operation })
        }
    }

    /// Walk upward until the enclosing item is reached.
    fn owning_item(&self, resource: Resource) -> Result<ItemId, AuthzError> {
        let mut cursor = resource;
        loop {
            match cursor {
                Resource::Item(item) => return Ok(item),
                other => {
                    cursor = self
                        .containment
                        .parent_of(other)?
                        .ok_or(AuthzError::Orphaned { resource })?;
                }
            }
        }
    }

    fn owning_collection(&self, item: ItemId) -> Result<CollectionId, AuthzError> {
        match self.containment.parent_of(Resource::Item(item))? {
            Some(Resource::Collection(collection)) => Ok(collection),
            _ => Err(AuthzError::Orphaned {
                resource: Resource::Item(item),
            }),
        }
    }

    fn owning_community(&self, item: ItemId) -> Result<CommunityId, AuthzError> {
        let collection = self.owning_collection(item)?;
        self.required_parent_community(collection)
    }

    fn required_parent_community(
        &self,
        collection: CollectionId,
    ) -> Result<CommunityId, AuthzError> {
        self.containment
            .parent_community_of(collection)?
            .ok_or(AuthzError::Orphaned {
                resource: Resource::Collection(collection),
            })
    }
}

#[cfg(test)]
mod tests {
    use stacks_core::{
        Action, BitstreamId, BundleId, CollectionId, CommunityId, EPersonId, ItemId, Resource,
        Session,
    };

    use crate::policy::Grant;
    use crate::resolver::AuthzError;
    use crate::store::PolicyStore;
    use crate::test_utils::TestEnv;

    const NOW: u64 = 1_700_000_000;

    /// community 1 → collection 2 → item 3 → bundle 4 → bitstream 5.
    fn hierarchy(env: &mut TestEnv) {
        env.add_collection(CollectionId(2), CommunityId(1));
        env.add_item(ItemId(3), CollectionId(2));
        env.add_bundle(BundleId(4), ItemId(3));
        env.add_bitstream(BitstreamId(5), BundleId(4));
    }

    fn collection_admin(env: &mut TestEnv, id: u64) -> Session {
        let eperson = EPersonId(id);
        env.policies
            .grant(
                Resource::Collection(CollectionId(2)),
                Grant::new(Action::Admin, eperson),
            )
            .unwrap();
        Session::of(eperson, NOW)
    }

    fn community_admin(env: &mut TestEnv, id: u64) -> Session {
        let eperson = EPersonId(id);
        env.policies
            .grant(
                Resource::Community(CommunityId(1)),
                Grant::new(Action::Admin, eperson),
            )
            .unwrap();
        Session::of(eperson, NOW)
    }

    #[test]
    fn locked_down_config_reserves_everything_to_system_admins() {
        let mut env = TestEnv::locked_down();
        hierarchy(&mut env);
        let session = collection_admin(&mut env, 10);
        let authz = env.authorizer();

        assert!(matches!(
            authz.manage_item_policies(&session, ItemId(3)),
            Err(AuthzError::NotAdmin { .. })
        ));
        assert!(matches!(
            authz.manage_collection_policies(&session, CollectionId(2)),
            Err(AuthzError::NotAdmin { .. })
        ));
        assert!(matches!(
            authz.manage_community_policies(&session, CommunityId(1)),
            Err(AuthzError::NotAdmin { .. })
        ));
        assert!(matches!(
            authz.manage_bitstream_policies(&session, BitstreamId(5)),
            Err(AuthzError::NotAdmin { .. })
        ));
        assert!(matches!(
            authz.manage_submitters_group(&session, CollectionId(2)),
            Err(AuthzError::NotAdmin { .. })
        ));
        assert!(matches!(
            authz.require_admin_role(&session),
            Err(AuthzError::NotAdmin { .. })
        ));
    }

    #[test]
    fn locked_down_config_still_lets_system_admins_through() {
        let mut env = TestEnv::locked_down();
        hierarchy(&mut env);
        let root = env.add_admin(1);
        let session = Session::of(root, NOW);
        let authz = env.authorizer();

        assert!(authz.manage_item_policies(&session, ItemId(3)).is_ok());
        assert!(authz.withdraw_item(&session, ItemId(3)).is_ok());
        assert!(authz.reinstate_item(&session, ItemId(3)).is_ok());
        assert!(authz.require_admin_role(&session).is_ok());
    }

    #[test]
    fn item_policies_delegate_to_collection_admin() {
        let mut env = TestEnv::new();
        hierarchy(&mut env);
        let session = collection_admin(&mut env, 10);
        let authz = env.authorizer();

        // The item-admin rung requires Admin on the item, which the
        // collection admin satisfies through the cascade.
        assert!(authz.manage_item_policies(&session, ItemId(3)).is_ok());
        assert!(authz.manage_bundle_policies(&session, BundleId(4)).is_ok());
        assert!(
            authz
                .manage_bitstream_policies(&session, BitstreamId(5))
                .is_ok()
        );
    }

    #[test]
    fn community_admin_reaches_collection_operations() {
        let mut env = TestEnv::new();
        hierarchy(&mut env);
        let session = community_admin(&mut env, 11);
        let authz = env.authorizer();

        assert!(
            authz
                .manage_collection_policies(&session, CollectionId(2))
                .is_ok()
        );
        assert!(
            authz
                .manage_submitters_group(&session, CollectionId(2))
                .is_ok()
        );
        assert!(
            authz
                .manage_workflow_groups(&session, CollectionId(2))
                .is_ok()
        );
    }

    #[test]
    fn disabling_one_rung_moves_the_requirement_up() {
        let mut env = TestEnv::new();
        env.config.item_admin.policies = false;
        env.config.collection_admin.item_policies = false;
        hierarchy(&mut env);

        // Community admin passes through the community rung.
        let session = community_admin(&mut env, 11);
        assert!(
            env.authorizer()
                .manage_item_policies(&session, ItemId(3))
                .is_ok()
        );

        // With the community rung disabled too, even the community admin is
        // turned away.
        env.config.community_admin.item_policies = false;
        assert!(matches!(
            env.authorizer().manage_item_policies(&session, ItemId(3)),
            Err(AuthzError::NotAdmin { .. })
        ));
    }

    #[test]
    fn policy_dispatch_follows_the_resource_kind() {
        let mut env = TestEnv::new();
        hierarchy(&mut env);
        let session = collection_admin(&mut env, 10);

        let id = env
            .policies
            .grant(
                Resource::Bitstream(BitstreamId(5)),
                Grant::new(Action::Read, EPersonId(50)),
            )
            .unwrap();
        let policy = env
            .policies
            .policies_on(Resource::Bitstream(BitstreamId(5)))
            .unwrap()
            .into_iter()
            .find(|policy| policy.id == id)
            .unwrap();

        assert!(env.authorizer().manage_policy(&session, &policy).is_ok());
    }

    #[test]
    fn template_item_accepts_plain_edit_permission() {
        let mut env = TestEnv::locked_down();
        hierarchy(&mut env);
        let editor = EPersonId(12);
        env.policies
            .grant(
                Resource::Collection(CollectionId(2)),
                Grant::new(Action::Write, editor),
            )
            .unwrap();

        let session = Session::of(editor, NOW);
        assert!(
            env.authorizer()
                .manage_template_item(&session, CollectionId(2))
                .is_ok()
        );
    }

    #[test]
    fn cc_license_accepts_direct_add_and_remove() {
        let mut env = TestEnv::locked_down();
        hierarchy(&mut env);
        let submitter = EPersonId(13);
        for action in [Action::Add, Action::Remove] {
            env.policies
                .grant(Resource::Item(ItemId(3)), Grant::new(action, submitter))
                .unwrap();
        }

        let session = Session::of(submitter, NOW);
        assert!(
            env.authorizer()
                .manage_cc_license(&session, ItemId(3))
                .is_ok()
        );

        // Add alone is not enough.
        let half = EPersonId(14);
        env.policies
            .grant(Resource::Item(ItemId(3)), Grant::new(Action::Add, half))
            .unwrap();
        assert!(
            env.authorizer()
                .manage_cc_license(&Session::of(half, NOW), ItemId(3))
                .is_err()
        );
    }

    #[test]
    fn withdraw_falls_back_to_remove_on_the_owning_collection() {
        let mut env = TestEnv::locked_down();
        hierarchy(&mut env);
        let curator = EPersonId(15);
        env.policies
            .grant(
                Resource::Collection(CollectionId(2)),
                Grant::new(Action::Remove, curator),
            )
            .unwrap();

        let session = Session::of(curator, NOW);
        let authz = env.authorizer();
        assert!(authz.withdraw_item(&session, ItemId(3)).is_ok());

        let stranger = Session::of(EPersonId(16), NOW);
        assert!(matches!(
            authz.withdraw_item(&stranger, ItemId(3)),
            Err(AuthzError::WithdrawRefused { .. })
        ));
    }

    #[test]
    fn reinstate_requires_every_owning_collection() {
        let mut env = TestEnv::new();
        hierarchy(&mut env);
        // The item also belongs to a second collection in another community.
        env.add_collection(CollectionId(7), CommunityId(6));
        env.add_item(ItemId(3), CollectionId(7));

        // Admin on collection 2 only.
        let session = collection_admin(&mut env, 10);
        let err = env
            .authorizer()
            .reinstate_item(&session, ItemId(3))
            .unwrap_err();
        assert!(matches!(
            err,
            AuthzError::Denied {
                resource: Resource::Collection(CollectionId(7)),
                action: Action::Add,
            }
        ));

        // Add permission on the second collection completes the set.
        env.policies
            .grant(
                Resource::Collection(CollectionId(7)),
                Grant::new(Action::Add, session.actor.unwrap()),
            )
            .unwrap();
        assert!(env.authorizer().reinstate_item(&session, ItemId(3)).is_ok());
    }

    #[test]
    fn admin_groups_are_removed_from_above() {
        let mut env = TestEnv::new();
        hierarchy(&mut env);
        let collection_session = collection_admin(&mut env, 10);
        let community_session = community_admin(&mut env, 11);
        let authz = env.authorizer();

        // A collection admin may manage their own admin group but not remove
        // it; the parent community admin may do both.
        assert!(
            authz
                .manage_collection_admin_group(&collection_session, CollectionId(2))
                .is_ok()
        );
        assert!(matches!(
            authz.remove_collection_admin_group(&collection_session, CollectionId(2)),
            Err(AuthzError::Denied { .. })
        ));
        assert!(
            authz
                .remove_collection_admin_group(&community_session, CollectionId(2))
                .is_ok()
        );
    }

    #[test]
    fn community_admin_group_removal_needs_a_parent_community() {
        let mut env = TestEnv::new();
        hierarchy(&mut env);
        env.add_sub_community(CommunityId(8), CommunityId(1));
        let session = community_admin(&mut env, 11);
        let authz = env.authorizer();

        // Community 1 admin may remove the admin group of sub-community 8.
        assert!(
            authz
                .remove_community_admin_group(&session, CommunityId(8))
                .is_ok()
        );

        // Top-level community 1 has no parent: system administrators only.
        assert!(matches!(
            authz.remove_community_admin_group(&session, CommunityId(1)),
            Err(AuthzError::NotAdmin { .. })
        ));
    }

    #[test]
    fn orphaned_items_surface_as_orphaned_not_denied() {
        let mut env = TestEnv::new();
        // Push the chain to the collection rung so the missing parent is hit.
        env.config.item_admin.policies = false;
        let session = Session::of(EPersonId(10), NOW);

        let err = env
            .authorizer()
            .manage_item_policies(&session, ItemId(99))
            .unwrap_err();
        assert!(matches!(err, AuthzError::Orphaned { .. }));
    }
}
