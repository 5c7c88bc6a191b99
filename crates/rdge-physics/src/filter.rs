// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Pair filtering for contact creation.

use crate::fixture::Fixture;

/// Category/mask/group filter attached to every fixture.
///
/// Two fixtures sharing a non-zero `group` ignore the bit masks: a positive
/// group always collides and a negative group never does. Otherwise each
/// fixture's `mask` must accept the other's `category`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CollisionFilter {
    /// Category bits this fixture belongs to.
    pub category: u16,
    /// Categories this fixture accepts contacts with.
    pub mask: u16,
    /// Group override; zero means "no group".
    pub group: i16,
}

impl Default for CollisionFilter {
    fn default() -> Self {
        Self { category: 0x0001, mask: 0xFFFF, group: 0 }
    }
}

impl CollisionFilter {
    /// Builds a filter from its three fields.
    pub const fn new(category: u16, mask: u16, group: i16) -> Self {
        Self { category, mask, group }
    }

    /// Applies the group and mask rule described on the type.
    pub const fn should_collide(&self, other: &Self) -> bool {
        if self.group == other.group && self.group != 0 {
            return self.group > 0;
        }
        (self.mask & other.category) != 0 && (other.mask & self.category) != 0
    }
}

/// Decides whether a broad-phase pair becomes a contact.
///
/// Consulted after the body-level checks (distinct bodies, at least one
/// dynamic) and again for existing contacts after
/// [`set_filter`](crate::CollisionGraph::set_filter).
pub trait ContactFilter {
    /// Returns `true` if a contact should exist between the two fixtures.
    fn should_collide(&self, a: &Fixture, b: &Fixture) -> bool;
}

/// Uses each fixture's [`CollisionFilter`].
#[derive(Debug, Default, Copy, Clone)]
pub struct DefaultContactFilter;

impl ContactFilter for DefaultContactFilter {
    fn should_collide(&self, a: &Fixture, b: &Fixture) -> bool {
        a.filter().should_collide(&b.filter())
    }
}
