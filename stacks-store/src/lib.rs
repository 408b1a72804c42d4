// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory storage backend for the stacks repository core.
//!
//! [`MemoryStore`] implements every store and oracle trait the authorization
//! and workflow layers consume, over plain maps. A unit of work borrows the
//! store exclusively, which serializes concurrent mutation the way a
//! transactional backend would with row locks.

mod memory;
#[cfg(test)]
mod tests;

pub use memory::{
    ContentGraph, GroupTable, MemoryStore, PolicyTable, ProgressTable, TaskTable, WorkflowDefs,
};
