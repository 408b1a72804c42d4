// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{CollectionId, CommunityId, EPersonId, GroupId, ItemId, Resource, StoreError};

/// Membership oracle, supplied by the group subsystem.
///
/// Membership is transitive: an account is a member of a group if it appears
/// in the group directly or in any group nested below it, to any depth.
pub trait Directory {
    fn is_member(&self, eperson: EPersonId, group: GroupId) -> Result<bool, StoreError>;

    /// The flattened membership of a group: every account reachable through
    /// the nesting graph, deduplicated, in ascending id order.
    fn expand(&self, group: GroupId) -> Result<Vec<EPersonId>, StoreError>;
}

/// Containment oracle, supplied by the content-model subsystem.
pub trait Containment {
    /// One step up the containment hierarchy.
    ///
    /// Bitstream → Bundle → Item → owning Collection → parent Community →
    /// parent Community. An item belonging to several collections reports the
    /// collection with the lowest id as its owner; likewise a collection held
    /// by several communities. Top-level communities have no parent.
    fn parent_of(&self, resource: Resource) -> Result<Option<Resource>, StoreError>;

    /// Every collection the item belongs to, in ascending id order.
    fn collections_of(&self, item: ItemId) -> Result<Vec<CollectionId>, StoreError>;

    /// The parent community of a collection (lowest id when there are
    /// several).
    fn parent_community_of(
        &self,
        collection: CollectionId,
    ) -> Result<Option<CommunityId>, StoreError>;
}
