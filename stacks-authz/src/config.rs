// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::{Deserialize, Serialize};
use stacks_core::GroupId;

/// Process-wide authorization configuration.
///
/// Constructed once at startup and passed by reference; never mutated
/// afterwards. The delegation flags decide whether an administrator of one
/// level of the hierarchy may perform managed operations on behalf of a
/// descendant level. Every flag defaults to enabled, matching a deployment
/// that delegates as much as possible.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct AuthorizeConfig {
    /// The group whose members are system administrators.
    pub administrators: GroupId,

    /// The group every session matches, authenticated or not.
    pub anonymous: GroupId,

    pub community_admin: CommunityAdmin,
    pub collection_admin: CollectionAdmin,
    pub item_admin: ItemAdmin,
}

impl AuthorizeConfig {
    /// Configuration with every delegation flag enabled.
    pub fn new(administrators: GroupId, anonymous: GroupId) -> Self {
        Self {
            administrators,
            anonymous,
            community_admin: CommunityAdmin::default(),
            collection_admin: CollectionAdmin::default(),
            item_admin: ItemAdmin::default(),
        }
    }

    /// Configuration with every delegation flag disabled: managed operations
    /// require a system administrator.
    pub fn locked_down(administrators: GroupId, anonymous: GroupId) -> Self {
        Self {
            administrators,
            anonymous,
            community_admin: CommunityAdmin::none(),
            collection_admin: CollectionAdmin::none(),
            item_admin: ItemAdmin::none(),
        }
    }
}

/// What a community administrator may manage, at their own level and on
/// behalf of the collections and items below them.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommunityAdmin {
    pub policies: bool,
    pub admin_group: bool,
    pub collection_policies: bool,
    pub collection_submitters: bool,
    pub collection_workflows: bool,
    pub collection_admin_group: bool,
    pub collection_template_item: bool,
    pub item_policies: bool,
    pub item_withdraw: bool,
    pub item_reinstate: bool,
    pub item_cc_license: bool,
    pub bundle_policies: bool,
    pub bitstream_policies: bool,
}

impl CommunityAdmin {
    pub fn none() -> Self {
        Self {
            policies: false,
            admin_group: false,
            collection_policies: false,
            collection_submitters: false,
            collection_workflows: false,
            collection_admin_group: false,
            collection_template_item: false,
            item_policies: false,
            item_withdraw: false,
            item_reinstate: false,
            item_cc_license: false,
            bundle_policies: false,
            bitstream_policies: false,
        }
    }
}

impl Default for CommunityAdmin {
    fn default() -> Self {
        Self {
            policies: true,
            admin_group: true,
            collection_policies: true,
            collection_submitters: true,
            collection_workflows: true,
            collection_admin_group: true,
            collection_template_item: true,
            item_policies: true,
            item_withdraw: true,
            item_reinstate: true,
            item_cc_license: true,
            bundle_policies: true,
            bitstream_policies: true,
        }
    }
}

/// What a collection administrator may manage, at their own level and on
/// behalf of the items below them.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionAdmin {
    pub policies: bool,
    pub submitters: bool,
    pub workflows: bool,
    pub admin_group: bool,
    pub template_item: bool,
    pub item_policies: bool,
    pub item_withdraw: bool,
    pub item_reinstate: bool,
    pub item_cc_license: bool,
    pub bundle_policies: bool,
    pub bitstream_policies: bool,
}

impl CollectionAdmin {
    pub fn none() -> Self {
        Self {
            policies: false,
            submitters: false,
            workflows: false,
            admin_group: false,
            template_item: false,
            item_policies: false,
            item_withdraw: false,
            item_reinstate: false,
            item_cc_license: false,
            bundle_policies: false,
            bitstream_policies: false,
        }
    }
}

impl Default for CollectionAdmin {
    fn default() -> Self {
        Self {
            policies: true,
            submitters: true,
            workflows: true,
            admin_group: true,
            template_item: true,
            item_policies: true,
            item_withdraw: true,
            item_reinstate: true,
            item_cc_license: true,
            bundle_policies: true,
            bitstream_policies: true,
        }
    }
}

/// What an item administrator may manage on their own item and the bundles
/// and bitstreams below it.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemAdmin {
    pub policies: bool,
    pub cc_license: bool,
    pub bundle_policies: bool,
    pub bitstream_policies: bool,
}

impl ItemAdmin {
    pub fn none() -> Self {
        Self {
            policies: false,
            cc_license: false,
            bundle_policies: false,
            bitstream_policies: false,
        }
    }
}

impl Default for ItemAdmin {
    fn default() -> Self {
        Self {
            policies: true,
            cc_license: true,
            bundle_policies: true,
            bitstream_policies: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_load_from_config_file() {
        // Omitted flags fall back to their defaults.
        let config: AuthorizeConfig = serde_json::from_str(
            r#"{
                "administrators": 1,
                "anonymous": 0,
                "community_admin": { "item_withdraw": false },
                "collection_admin": {},
                "item_admin": { "cc_license": false }
            }"#,
        )
        .unwrap();

        assert_eq!(config.administrators, GroupId(1));
        assert!(!config.community_admin.item_withdraw);
        assert!(config.community_admin.policies);
        assert!(config.collection_admin.item_withdraw);
        assert!(!config.item_admin.cc_license);
        assert!(config.item_admin.policies);
    }
}
