// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Broad-phase acceleration structures.
//!
//! The broad phase only answers "which fat boxes overlap"; exact tests are
//! left to [`crate::collision`]. Pairs are reported canonically as
//! `(min, max)` and sorted ascending so callers see a deterministic order.

mod bvh;

pub use bvh::{DynamicTree, NodeKind, ProxyId, TreeNode};
