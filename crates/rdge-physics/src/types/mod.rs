// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Foundational geometric types shared by the broad and narrow phase.

/// Axis-aligned bounding boxes and the box-box manifold.
pub mod aabb;
/// Rigid 2D transforms (translation + rotation).
pub mod transform;
