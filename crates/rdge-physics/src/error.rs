// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Errors surfaced by the collision graph.

use thiserror::Error;

use crate::body::BodyHandle;
use crate::fixture::FixtureHandle;
use crate::shapes::ShapeError;

/// Errors emitted by [`CollisionGraph`](crate::CollisionGraph) operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PhysicsError {
    /// The body handle is stale or was never issued by this graph.
    #[error("unknown body: {0:?}")]
    UnknownBody(BodyHandle),
    /// The fixture handle is stale or was never issued by this graph.
    #[error("unknown fixture: {0:?}")]
    UnknownFixture(FixtureHandle),
    /// `step` was called with a non-positive or non-finite timestep.
    #[error("timestep must be positive and finite, got {0}")]
    InvalidTimestep(f32),
    /// A shape failed validation.
    #[error(transparent)]
    Shape(#[from] ShapeError),
}
