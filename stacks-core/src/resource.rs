// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt::Display;

use serde::{Deserialize, Serialize};

macro_rules! resource_id {
    ($name:ident, $label:literal) => {
        #[derive(
            Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub struct $name(pub u64);

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{} {}", $label, self.0)
            }
        }
    };
}

resource_id!(CommunityId, "community");
resource_id!(CollectionId, "collection");
resource_id!(ItemId, "item");
resource_id!(BundleId, "bundle");
resource_id!(BitstreamId, "bitstream");

/// A reference to one entity of the containment hierarchy.
///
/// The hierarchy is containment, not inheritance: Community → (sub)Community
/// or Collection → Item → Bundle → Bitstream. Every level may carry its own
/// policy set.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Resource {
    Community(CommunityId),
    Collection(CollectionId),
    Item(ItemId),
    Bundle(BundleId),
    Bitstream(BitstreamId),
}

impl Resource {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Resource::Community(_) => ResourceKind::Community,
            Resource::Collection(_) => ResourceKind::Collection,
            Resource::Item(_) => ResourceKind::Item,
            Resource::Bundle(_) => ResourceKind::Bundle,
            Resource::Bitstream(_) => ResourceKind::Bitstream,
        }
    }
}

impl Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Resource::Community(id) => id.fmt(f),
            Resource::Collection(id) => id.fmt(f),
            Resource::Item(id) => id.fmt(f),
            Resource::Bundle(id) => id.fmt(f),
            Resource::Bitstream(id) => id.fmt(f),
        }
    }
}

impl From<CommunityId> for Resource {
    fn from(id: CommunityId) -> Self {
        Resource::Community(id)
    }
}

impl From<CollectionId> for Resource {
    fn from(id: CollectionId) -> Self {
        Resource::Collection(id)
    }
}

impl From<ItemId> for Resource {
    fn from(id: ItemId) -> Self {
        Resource::Item(id)
    }
}

impl From<BundleId> for Resource {
    fn from(id: BundleId) -> Self {
        Resource::Bundle(id)
    }
}

impl From<BitstreamId> for Resource {
    fn from(id: BitstreamId) -> Self {
        Resource::Bitstream(id)
    }
}

/// The kind of a [`Resource`], used for messages and policy dispatch.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceKind {
    Community,
    Collection,
    Item,
    Bundle,
    Bitstream,
}

impl Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ResourceKind::Community => "community",
            ResourceKind::Collection => "collection",
            ResourceKind::Item => "item",
            ResourceKind::Bundle => "bundle",
            ResourceKind::Bitstream => "bitstream",
        };

        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_and_display() {
        let resource = Resource::Bitstream(BitstreamId(7));
        assert_eq!(resource.kind(), ResourceKind::Bitstream);
        assert_eq!(resource.to_string(), "bitstream 7");
        assert_eq!(resource.kind().to_string(), "bitstream");
    }
}
