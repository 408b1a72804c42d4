// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::{Deserialize, Serialize};

use crate::EPersonId;

/// The slice of the caller's ambient context this core needs: who is acting
/// and when.
///
/// Transaction lifecycle, caching and connection handling stay with the
/// caller; a `Session` is valid for exactly one unit of work. `now` is a Unix
/// timestamp in seconds and is the instant policy validity windows are
/// evaluated against.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub actor: Option<EPersonId>,
    pub now: u64,
}

impl Session {
    /// A session acting on behalf of an authenticated account.
    pub fn of(actor: EPersonId, now: u64) -> Self {
        Self {
            actor: Some(actor),
            now,
        }
    }

    /// A session with no authenticated account.
    pub fn anonymous(now: u64) -> Self {
        Self { actor: None, now }
    }

    pub fn is_anonymous(&self) -> bool {
        self.actor.is_none()
    }
}
