// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resource policies and authorization resolution for the stacks repository.
//!
//! A [`ResourcePolicy`] grants one [`Action`](stacks_core::Action) on one
//! resource to one principal. The [`Authorizer`] resolves a requested action
//! against the stored policies, honoring transitive group membership, policy
//! validity windows, and the Admin cascade up the containment hierarchy. On
//! top of that sit the managed operations (`manage_*`, `withdraw_item`,
//! `reinstate_item`, ...): fixed delegation chains which decide whether a
//! community, collection or item administrator may act on behalf of a
//! descendant level, gated by the immutable [`AuthorizeConfig`].

mod config;
mod manage;
mod policy;
mod resolver;
mod store;
#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;

pub use config::{AuthorizeConfig, CollectionAdmin, CommunityAdmin, ItemAdmin};
pub use policy::{Grant, PolicyId, PolicyKind, ResourcePolicy};
pub use resolver::{Authorizer, AuthzError};
pub use store::{PolicyStore, inherit_policies};
