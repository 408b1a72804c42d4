// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared entity model for the stacks digital-asset repository.
//!
//! This crate defines the identifiers and tagged variants the higher layers
//! operate on: principals (accounts and groups), the five resource kinds of
//! the containment hierarchy, the action set which can be granted on a
//! resource, and the oracle traits (`Directory`, `Containment`) through which
//! the authorization and workflow layers reach the membership and
//! content-model subsystems.

mod action;
mod identity;
mod resource;
mod session;
mod store;
mod traits;

pub use action::Action;
pub use identity::{EPersonId, GroupId, Principal};
pub use resource::{
    BitstreamId, BundleId, CollectionId, CommunityId, ItemId, Resource, ResourceKind,
};
pub use session::Session;
pub use store::StoreError;
pub use traits::{Containment, Directory};
