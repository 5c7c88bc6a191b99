// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Contact event callbacks.

use crate::collision::Manifold;
use crate::contact::Contact;
use crate::fixture::FixtureHandle;

/// Impulses the solver applied to a contact during one step.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct ContactImpulse {
    /// Number of valid entries (matches the manifold point count).
    pub count: usize,
    /// Accumulated normal impulse per point.
    pub normal_impulses: [f32; 2],
    /// Accumulated friction impulse per point.
    pub tangent_impulses: [f32; 2],
}

/// Receives contact events while the graph steps.
///
/// Every method defaults to a no-op, so implementors override only what they
/// need. The listener has no access to the graph: structural changes (creating
/// or destroying bodies and fixtures) have to be deferred until `step` returns.
pub trait ContactListener {
    /// Two fixtures started touching.
    fn begin_contact(&mut self, _contact: &Contact) {}

    /// Two fixtures stopped touching, or a touching contact was destroyed.
    fn end_contact(&mut self, _contact: &Contact) {}

    /// Called every step for touching non-sensor contacts after the narrow
    /// phase and before solving. `old_manifold` is last step's manifold.
    /// The contact may be disabled or retuned for this step only.
    fn pre_solve(&mut self, _contact: &mut Contact, _old_manifold: &Manifold) {}

    /// Called after the solver with the impulses applied to the contact.
    fn post_solve(&mut self, _contact: &Contact, _impulse: &ContactImpulse) {}

    /// A fixture was destroyed implicitly because its body was destroyed.
    fn fixture_destroyed(&mut self, _fixture: FixtureHandle) {}
}

/// Listener that ignores every event.
#[derive(Debug, Default, Copy, Clone)]
pub struct DefaultListener;

impl ContactListener for DefaultListener {}
