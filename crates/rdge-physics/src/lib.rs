// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! rdge-physics: 2D collision detection and rigid-body simulation.
//!
//! The crate is layered leaf to root:
//! - [`pool`]: chunked slabs with generation-checked handles. Bodies,
//!   fixtures, contacts and tree nodes all live in pools.
//! - [`shapes`]: circles and convex polygons with mass, bounds and point
//!   containment.
//! - [`collision`]: exact narrow-phase tests producing a [`Manifold`].
//! - [`broad`]: a self-balancing dynamic AABB tree over fattened bounds.
//! - [`RigidBody`], [`Fixture`] and [`Contact`]: the simulated objects.
//! - [`CollisionGraph`]: owns everything above and runs the per-step
//!   pipeline, reporting events through a [`ContactListener`].
//!
//! Single-threaded and synchronous. Iteration follows pool slot order, so a
//! given sequence of calls always produces the same results.
//!
//! ```
//! use rdge_physics::{BodyProfile, Circle, CollisionGraph, FixtureProfile, GraphConfig, Vec2};
//!
//! let mut graph = CollisionGraph::new(GraphConfig::default());
//! let ball = graph.create_body(&BodyProfile::dynamic(Vec2::new(0.0, 10.0)));
//! let shape = Circle::new(Vec2::ZERO, 0.5)?;
//! graph.create_fixture(ball, &FixtureProfile::new(shape).with_density(1.0))?;
//! for _ in 0..60 {
//!     graph.step(1.0 / 60.0)?;
//! }
//! assert!(graph.body(ball).is_some_and(|b| b.position().y() < 10.0));
//! # Ok::<(), rdge_physics::PhysicsError>(())
//! ```
#![forbid(unsafe_code)]

pub mod broad;
pub mod collision;
pub mod math;
pub mod pool;
pub mod shapes;
pub mod types;

mod body;
mod config;
mod constants;
mod contact;
mod error;
mod filter;
mod fixture;
mod graph;
mod listener;
mod solver;

pub use body::{BodyHandle, BodyProfile, BodyType, ContactEdge, RigidBody};
pub use collision::{collide, intersects, Manifold};
pub use config::GraphConfig;
pub use constants::*;
pub use contact::{mix_friction, mix_restitution, Contact, ContactHandle};
pub use error::PhysicsError;
pub use filter::{CollisionFilter, ContactFilter, DefaultContactFilter};
pub use fixture::{Fixture, FixtureHandle, FixtureProfile};
pub use graph::{CollisionGraph, StepStats};
pub use listener::{ContactImpulse, ContactListener, DefaultListener};
pub use math::{Rotation, Vec2};
pub use pool::{Handle, Pool, PoolStats};
pub use shapes::{Circle, MassData, Polygon, Shape, ShapeError, ShapeType};
pub use types::aabb::Aabb;
pub use types::transform::Transform;
