// SPDX-License-Identifier: MIT OR Apache-2.0

use stacks_core::{Action, Containment, Directory, Principal, Resource, Session, StoreError};
use thiserror::Error;
use tracing::debug;

use crate::config::AuthorizeConfig;
use crate::store::PolicyStore;

/// Refusal or failure of an authorization request.
#[derive(Error, Debug)]
pub enum AuthzError {
    /// The acting principal lacks the requested action on the resource. A
    /// denial is definitive for the policy state it was computed against and
    /// is never retried.
    #[error("denied {action} on {resource}")]
    Denied { resource: Resource, action: Action },

    /// None of the alternative actions passed.
    #[error("denied every one of {actions:?} on {resource}")]
    AnyDenied {
        resource: Resource,
        actions: Vec<Action>,
    },

    /// The operation is reserved to system administrators.
    #[error("only system administrators are allowed to {operation}")]
    NotAdmin { operation: &'static str },

    /// Withdrawal failed both the delegation chain and the direct check.
    #[error(
        "withdrawing from {collection} requires administration of it or Remove permission on it"
    )]
    WithdrawRefused { collection: Resource },

    /// The containment hierarchy has no parent where the operation needs one.
    #[error("{resource} is not held by any enclosing resource")]
    Orphaned { resource: Resource },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Resolves requested actions against the stored policies.
///
/// Resolution order: system administrators pass unconditionally; then the
/// policies stored on the resource itself are matched against the requested
/// action; then, when inheritance is enabled, the Admin cascade walks the
/// containment hierarchy upward and an active Admin policy at the resource or
/// any ancestor passes. Ordinary actions never resolve upward: their rows are
/// copied onto child resources at creation time instead
/// (see [`inherit_policies`](crate::inherit_policies)).
#[derive(Debug)]
pub struct Authorizer<'a, S, D, C> {
    pub(crate) policies: &'a S,
    pub(crate) directory: &'a D,
    pub(crate) containment: &'a C,
    pub(crate) config: &'a AuthorizeConfig,
}

impl<'a, S, D, C> Authorizer<'a, S, D, C>
where
    S: PolicyStore,
    D: Directory,
    C: Containment,
{
    pub fn new(
        policies: &'a S,
        directory: &'a D,
        containment: &'a C,
        config: &'a AuthorizeConfig,
    ) -> Self {
        Self {
            policies,
            directory,
            containment,
            config,
        }
    }

    pub fn config(&self) -> &AuthorizeConfig {
        self.config
    }

    /// Require `action` on `resource`, with the Admin cascade enabled.
    pub fn authorize(
        &self,
        session: &Session,
        resource: Resource,
        action: Action,
    ) -> Result<(), AuthzError> {
        self.authorize_inherit(session, resource, action, true)
    }

    /// Require `action` on `resource`.
    pub fn authorize_inherit(
        &self,
        session: &Session,
        resource: Resource,
        action: Action,
        use_inheritance: bool,
    ) -> Result<(), AuthzError> {
        if self.allows_inherit(session, resource, action, use_inheritance)? {
            Ok(())
        } else {
            debug!(actor = ?session.actor, %resource, %action, "denied");
            Err(AuthzError::Denied { resource, action })
        }
    }

    /// Require any one of `actions` on `resource`.
    pub fn authorize_any_of(
        &self,
        session: &Session,
        resource: Resource,
        actions: &[Action],
    ) -> Result<(), AuthzError> {
        for action in actions {
            if self.allows(session, resource, *action)? {
                return Ok(());
            }
        }

        Err(AuthzError::AnyDenied {
            resource,
            actions: actions.to_vec(),
        })
    }

    /// Non-throwing variant of [`authorize`](Self::authorize), for pre-flight
    /// checks. Store failures still surface as errors; only a denial maps to
    /// `Ok(false)`.
    pub fn allows(
        &self,
        session: &Session,
        resource: Resource,
        action: Action,
    ) -> Result<bool, StoreError> {
        self.allows_inherit(session, resource, action, true)
    }

    pub fn allows_inherit(
        &self,
        session: &Session,
        resource: Resource,
        action: Action,
        use_inheritance: bool,
    ) -> Result<bool, StoreError> {
        if self.is_system_admin(session)? {
            return Ok(true);
        }

        if self.direct_match(session, resource, action)? {
            return Ok(true);
        }

        if use_inheritance && self.admin_cascade(session, resource)? {
            return Ok(true);
        }

        Ok(false)
    }

    /// Whether the session's account belongs to the administrators group.
    /// Anonymous sessions are never administrators.
    pub fn is_system_admin(&self, session: &Session) -> Result<bool, StoreError> {
        match session.actor {
            Some(actor) => self.directory.is_member(actor, self.config.administrators),
            None => Ok(false),
        }
    }

    /// An active policy on the resource itself grants `action` to a principal
    /// the session matches.
    fn direct_match(
        &self,
        session: &Session,
        resource: Resource,
        action: Action,
    ) -> Result<bool, StoreError> {
        for policy in self.policies.policies_on_matching(resource, action)? {
            if !policy.is_active(session.now) {
                continue;
            }

            if self.matches_principal(session, policy.principal)? {
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// Walk the containment hierarchy from `resource` upward; an active Admin
    /// policy at any level passes. This is what makes Admin a superset of the
    /// other actions on everything below it.
    fn admin_cascade(&self, session: &Session, resource: Resource) -> Result<bool, StoreError> {
        let mut cursor = Some(resource);

        while let Some(resource) = cursor {
            if self.direct_match(session, resource, Action::Admin)? {
                return Ok(true);
            }

            cursor = self.containment.parent_of(resource)?;
        }

        Ok(false)
    }

    fn matches_principal(
        &self,
        session: &Session,
        principal: Principal,
    ) -> Result<bool, StoreError> {
        match principal {
            Principal::EPerson(id) => Ok(session.actor == Some(id)),
            Principal::Group(group) if group == self.config.anonymous => Ok(true),
            Principal::Group(group) => match session.actor {
                Some(actor) => self.directory.is_member(actor, group),
                None => Ok(false),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use stacks_core::{
        Action, BitstreamId, BundleId, CollectionId, EPersonId, GroupId, ItemId, Resource, Session,
    };

    use crate::policy::{Grant, PolicyKind};
    use crate::store::{PolicyStore, inherit_policies};
    use crate::test_utils::TestEnv;

    const NOW: u64 = 1_700_000_000;

    #[test]
    fn system_admin_passes_everything() {
        let mut env = TestEnv::new();
        let root = env.add_admin(1);
        let session = Session::of(root, NOW);

        let item = Resource::Item(ItemId(10));
        let authz = env.authorizer();
        for action in [Action::Read, Action::Write, Action::Delete, Action::Admin] {
            assert!(authz.authorize(&session, item, action).is_ok());
        }
    }

    #[test]
    fn grant_then_revoke_round_trip() {
        let mut env = TestEnv::new();
        let reader = EPersonId(5);
        let item = Resource::Item(ItemId(10));

        let id = env
            .policies
            .grant(item, Grant::new(Action::Read, reader))
            .unwrap();

        let session = Session::of(reader, NOW);
        assert!(env.authorizer().allows(&session, item, Action::Read).unwrap());
        assert!(!env.authorizer().allows(&session, item, Action::Write).unwrap());

        assert!(env.policies.revoke(id).unwrap());
        assert!(!env.authorizer().allows(&session, item, Action::Read).unwrap());
    }

    #[test]
    fn group_policy_matches_through_nesting() {
        let mut env = TestEnv::new();
        let reviewer = EPersonId(5);
        let inner = GroupId(20);
        let outer = GroupId(21);
        env.add_member(inner, reviewer);
        env.nest_group(outer, inner);

        let item = Resource::Item(ItemId(10));
        env.policies
            .grant(item, Grant::new(Action::Read, outer))
            .unwrap();

        let session = Session::of(reviewer, NOW);
        assert!(env.authorizer().allows(&session, item, Action::Read).unwrap());

        let stranger = Session::of(EPersonId(99), NOW);
        assert!(!env.authorizer().allows(&stranger, item, Action::Read).unwrap());
    }

    #[test]
    fn anonymous_group_matches_every_session() {
        let mut env = TestEnv::new();
        let item = Resource::Item(ItemId(10));
        env.policies
            .grant(item, Grant::new(Action::Read, env.config.anonymous))
            .unwrap();

        let authz = env.authorizer();
        assert!(authz.allows(&Session::anonymous(NOW), item, Action::Read).unwrap());
        assert!(
            authz
                .allows(&Session::of(EPersonId(77), NOW), item, Action::Read)
                .unwrap()
        );
    }

    #[test]
    fn embargo_window_blocks_until_start() {
        let mut env = TestEnv::new();
        let reader = EPersonId(5);
        let item = Resource::Item(ItemId(10));
        env.policies
            .grant(item, Grant::new(Action::Read, reader).valid_from(NOW + 1000))
            .unwrap();

        let authz = env.authorizer();
        assert!(!authz.allows(&Session::of(reader, NOW), item, Action::Read).unwrap());
        assert!(
            authz
                .allows(&Session::of(reader, NOW + 1000), item, Action::Read)
                .unwrap()
        );
    }

    #[test]
    fn admin_cascade_reaches_down_to_bitstreams() {
        let mut env = TestEnv::new();
        let curator = EPersonId(5);
        let collection = CollectionId(3);
        let item = ItemId(10);
        let bundle = BundleId(30);
        let bitstream = BitstreamId(60);
        env.add_item(item, collection);
        env.add_bundle(bundle, item);
        env.add_bitstream(bitstream, bundle);

        env.policies
            .grant(
                Resource::Collection(collection),
                Grant::new(Action::Admin, curator),
            )
            .unwrap();

        let session = Session::of(curator, NOW);
        let authz = env.authorizer();

        // Admin on the collection satisfies any action below it.
        assert!(
            authz
                .allows(&session, Resource::Bitstream(bitstream), Action::Write)
                .unwrap()
        );
        assert!(
            authz
                .allows(&session, Resource::Item(item), Action::Admin)
                .unwrap()
        );

        // Without inheritance the cascade is off.
        assert!(
            !authz
                .allows_inherit(&session, Resource::Item(item), Action::Write, false)
                .unwrap()
        );
    }

    #[test]
    fn any_of_accepts_one_passing_action() {
        let mut env = TestEnv::new();
        let reader = EPersonId(5);
        let item = Resource::Item(ItemId(10));
        env.policies
            .grant(item, Grant::new(Action::Read, reader))
            .unwrap();

        let session = Session::of(reader, NOW);
        let authz = env.authorizer();
        assert!(
            authz
                .authorize_any_of(&session, item, &[Action::Write, Action::Read])
                .is_ok()
        );

        let err = authz
            .authorize_any_of(&session, item, &[Action::Write, Action::Delete])
            .unwrap_err();
        assert!(matches!(err, super::AuthzError::AnyDenied { .. }));
    }

    #[test]
    fn inherited_policies_materialize_on_the_child() {
        let mut env = TestEnv::new();
        let reader = EPersonId(5);
        let curator = EPersonId(6);
        let item = Resource::Item(ItemId(10));
        let bundle = Resource::Bundle(BundleId(30));

        env.policies
            .grant(item, Grant::new(Action::Read, reader))
            .unwrap();
        env.policies
            .grant(item, Grant::new(Action::Admin, curator))
            .unwrap();

        // Admin rows are not copied onto bundles; reads are.
        let copied = inherit_policies(&mut env.policies, item, bundle).unwrap();
        assert_eq!(copied, 1);

        let session = Session::of(reader, NOW);
        assert!(
            env.authorizer()
                .allows_inherit(&session, bundle, Action::Read, false)
                .unwrap()
        );

        let inherited = env.policies.policies_on(bundle).unwrap();
        assert_eq!(inherited[0].kind, Some(PolicyKind::Inherited));
    }

    #[test]
    fn custom_policies_stay_behind_on_inheritance() {
        let mut env = TestEnv::new();
        let reader = EPersonId(5);
        let item = Resource::Item(ItemId(10));
        let bundle = Resource::Bundle(BundleId(30));

        // An access condition placed for the item itself must not follow the
        // bundle; an ordinary grant of the same action does.
        env.policies
            .grant(
                item,
                Grant::new(Action::Read, reader).with_kind(PolicyKind::Custom),
            )
            .unwrap();
        assert_eq!(inherit_policies(&mut env.policies, item, bundle).unwrap(), 0);

        env.policies
            .grant(item, Grant::new(Action::Read, reader))
            .unwrap();
        assert_eq!(inherit_policies(&mut env.policies, item, bundle).unwrap(), 1);
    }
}
