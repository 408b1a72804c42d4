// SPDX-License-Identifier: MIT OR Apache-2.0

use thiserror::Error;

/// Failure of the underlying persistence backend.
///
/// Store failures are propagated unchanged through the authorization and
/// workflow layers. They are never translated into a denial: a storage outage
/// must not be misreported as "access denied".
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store backend failure: {0}")]
    Backend(String),

    #[error("row not found: {0}")]
    NotFound(String),
}

impl StoreError {
    pub fn backend(message: impl Into<String>) -> Self {
        StoreError::Backend(message.into())
    }

    pub fn not_found(key: impl Into<String>) -> Self {
        StoreError::NotFound(key.into())
    }
}
