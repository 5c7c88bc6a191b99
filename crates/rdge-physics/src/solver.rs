// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Island solver: velocity integration, sequential impulses, position
//! correction and sleep.
//!
//! Bodies connected by touching, enabled, non-sensor contacts form an island.
//! Static bodies join islands but never connect two of them. Each island is
//! solved on a local copy of its body state that is written back at the end.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::body::{BodyHandle, BodyType, RigidBody};
use crate::constants::{
    ANGULAR_SLEEP_TOLERANCE, BAUMGARTE, LINEAR_SLEEP_TOLERANCE, LINEAR_SLOP, MAX_LINEAR_CORRECTION,
    MAX_ROTATION, MAX_TRANSLATION, TIME_TO_SLEEP, VELOCITY_THRESHOLD,
};
use crate::contact::{Contact, ContactHandle};
use crate::listener::{ContactImpulse, ContactListener};
use crate::math::{Rotation, Vec2};
use crate::pool::Pool;

/// Per-step solver settings.
#[derive(Debug, Copy, Clone)]
pub(crate) struct StepContext {
    pub dt: f32,
    pub gravity: Vec2,
    pub velocity_iterations: u32,
    pub position_iterations: u32,
    pub allow_sleep: bool,
}

/// What the solver did during one step.
#[derive(Debug, Copy, Clone, Default)]
pub(crate) struct SolveReport {
    pub islands: usize,
}

/// Island-local copy of a body.
#[derive(Debug, Copy, Clone)]
struct BodyState {
    handle: BodyHandle,
    body_type: BodyType,
    center: Vec2,
    angle: f32,
    velocity: Vec2,
    omega: f32,
    inv_mass: f32,
    inv_inertia: f32,
}

#[derive(Debug, Copy, Clone, Default)]
struct PointConstraint {
    r_a: Vec2,
    r_b: Vec2,
    normal_mass: f32,
    tangent_mass: f32,
    normal_impulse: f32,
    tangent_impulse: f32,
    velocity_bias: f32,
    // Anchors in each body's frame at preparation time, for re-estimating
    // separation during position correction.
    local_a: Vec2,
    local_b: Vec2,
    separation: f32,
}

#[derive(Debug, Clone)]
struct ContactConstraint {
    contact: ContactHandle,
    a: usize,
    b: usize,
    normal: Vec2,
    local_normal: Vec2,
    friction: f32,
    tangent_speed: f32,
    count: usize,
    points: [PointConstraint; 2],
}

/// Builds islands from awake bodies and solves each one.
pub(crate) fn solve<L>(
    bodies: &mut Pool<RigidBody>,
    contacts: &Pool<Contact>,
    ctx: &StepContext,
    listener: &mut L,
) -> SolveReport
where
    L: ContactListener + ?Sized,
{
    let mut report = SolveReport::default();
    let mut visited: FxHashSet<BodyHandle> = FxHashSet::default();
    let mut contact_visited: FxHashSet<ContactHandle> = FxHashSet::default();
    let mut stack: Vec<BodyHandle> = Vec::new();
    let mut island_bodies: Vec<BodyHandle> = Vec::new();
    let mut island_contacts: Vec<ContactHandle> = Vec::new();

    for seed in bodies.handles() {
        let body = &bodies[seed];
        if visited.contains(&seed)
            || !body.awake
            || !body.simulate
            || body.body_type == BodyType::Static
        {
            continue;
        }

        island_bodies.clear();
        island_contacts.clear();
        stack.push(seed);
        visited.insert(seed);

        while let Some(handle) = stack.pop() {
            island_bodies.push(handle);
            let body = &mut bodies[handle];
            body.wake_up();
            if body.body_type == BodyType::Static {
                continue;
            }
            for edge in &bodies[handle].contacts {
                if contact_visited.contains(&edge.contact) {
                    continue;
                }
                let Some(contact) = contacts.get(edge.contact) else { continue };
                if !contact.is_enabled() || !contact.is_touching() || contact.is_sensor() {
                    continue;
                }
                contact_visited.insert(edge.contact);
                island_contacts.push(edge.contact);
                if visited.insert(edge.other) {
                    stack.push(edge.other);
                }
            }
        }

        solve_island(bodies, contacts, &island_bodies, &island_contacts, ctx, listener);
        report.islands += 1;

        // Static bodies may join any number of islands.
        for handle in &island_bodies {
            if bodies[*handle].body_type == BodyType::Static {
                visited.remove(handle);
            }
        }
    }
    report
}

fn solve_island<L>(
    bodies: &mut Pool<RigidBody>,
    contacts: &Pool<Contact>,
    island_bodies: &[BodyHandle],
    island_contacts: &[ContactHandle],
    ctx: &StepContext,
    listener: &mut L,
) where
    L: ContactListener + ?Sized,
{
    let dt = ctx.dt;
    let mut index: FxHashMap<BodyHandle, usize> = FxHashMap::default();
    let mut states: Vec<BodyState> = Vec::with_capacity(island_bodies.len());

    for &handle in island_bodies {
        let body = &bodies[handle];
        let mut velocity = body.linear_velocity;
        let mut omega = body.angular_velocity;
        if body.body_type == BodyType::Dynamic {
            velocity += (ctx.gravity * body.gravity_scale + body.force * body.inv_mass) * dt;
            omega += dt * body.inv_inertia * body.torque;
            // Padé approximation of exp(-c·dt); stable for large damping.
            velocity *= 1.0 / (1.0 + dt * body.linear_damping);
            omega *= 1.0 / (1.0 + dt * body.angular_damping);
        }
        index.insert(handle, states.len());
        states.push(BodyState {
            handle,
            body_type: body.body_type,
            center: body.center,
            angle: body.angle,
            velocity,
            omega,
            inv_mass: body.inv_mass,
            inv_inertia: body.inv_inertia,
        });
    }

    let mut constraints: Vec<ContactConstraint> = island_contacts
        .iter()
        .filter_map(|&handle| {
            let contact = contacts.get(handle)?;
            let a = *index.get(&contact.body_a())?;
            let b = *index.get(&contact.body_b())?;
            Some(prepare_constraint(handle, contact, a, b, &states))
        })
        .collect();

    for _ in 0..ctx.velocity_iterations {
        for constraint in &mut constraints {
            solve_velocity(constraint, &mut states);
        }
    }

    for state in &mut states {
        if state.body_type == BodyType::Static {
            continue;
        }
        let mut translation = state.velocity * dt;
        if translation.length_squared() > MAX_TRANSLATION * MAX_TRANSLATION {
            state.velocity *= MAX_TRANSLATION / translation.length();
            translation = state.velocity * dt;
        }
        let rotation = dt * state.omega;
        if rotation * rotation > MAX_ROTATION * MAX_ROTATION {
            state.omega *= MAX_ROTATION / rotation.abs();
        }
        state.center += translation;
        state.angle += dt * state.omega;
    }

    let mut position_solved = false;
    for _ in 0..ctx.position_iterations {
        let mut min_separation = 0.0_f32;
        for constraint in &constraints {
            min_separation = min_separation.min(solve_position(constraint, &mut states));
        }
        if min_separation >= -3.0 * LINEAR_SLOP {
            position_solved = true;
            break;
        }
    }

    for state in &states {
        let body = &mut bodies[state.handle];
        if body.body_type == BodyType::Static {
            continue;
        }
        body.center = state.center;
        body.angle = state.angle;
        body.linear_velocity = state.velocity;
        body.angular_velocity = state.omega;
        body.synchronize_transform();
        body.needs_sync = true;
    }

    for constraint in &constraints {
        let Some(contact) = contacts.get(constraint.contact) else { continue };
        let mut impulse = ContactImpulse { count: constraint.count, ..ContactImpulse::default() };
        for (i, point) in constraint.points.iter().take(constraint.count).enumerate() {
            impulse.normal_impulses[i] = point.normal_impulse;
            impulse.tangent_impulses[i] = point.tangent_impulse;
        }
        listener.post_solve(contact, &impulse);
    }

    if !ctx.allow_sleep {
        return;
    }
    let lin_tol_sq = LINEAR_SLEEP_TOLERANCE * LINEAR_SLEEP_TOLERANCE;
    let ang_tol_sq = ANGULAR_SLEEP_TOLERANCE * ANGULAR_SLEEP_TOLERANCE;
    let mut min_sleep_time = f32::MAX;
    for &handle in island_bodies {
        let body = &mut bodies[handle];
        if body.body_type == BodyType::Static {
            continue;
        }
        if body.prevent_sleep
            || body.angular_velocity * body.angular_velocity > ang_tol_sq
            || body.linear_velocity.length_squared() > lin_tol_sq
        {
            body.sleep_time = 0.0;
            min_sleep_time = 0.0;
        } else {
            body.sleep_time += dt;
            min_sleep_time = min_sleep_time.min(body.sleep_time);
        }
    }
    if min_sleep_time >= TIME_TO_SLEEP && position_solved {
        for &handle in island_bodies {
            let body = &mut bodies[handle];
            if body.body_type != BodyType::Static {
                body.sleep();
            }
        }
    }
}

fn prepare_constraint(
    handle: ContactHandle,
    contact: &Contact,
    a: usize,
    b: usize,
    states: &[BodyState],
) -> ContactConstraint {
    let (sa, sb) = (&states[a], &states[b]);
    let manifold = contact.manifold();
    let normal = manifold.normal;
    let tangent = normal.cross_scalar(1.0);
    let rot_a = Rotation::from_angle(sa.angle);
    let rot_b = Rotation::from_angle(sb.angle);

    let mut points = [PointConstraint::default(); 2];
    for (i, point) in points.iter_mut().enumerate().take(manifold.count) {
        let p = manifold.points[i];
        let r_a = p - sa.center;
        let r_b = p - sb.center;

        let rn_a = r_a.cross(normal);
        let rn_b = r_b.cross(normal);
        let k_normal = sa.inv_mass
            + sb.inv_mass
            + sa.inv_inertia * rn_a * rn_a
            + sb.inv_inertia * rn_b * rn_b;

        let rt_a = r_a.cross(tangent);
        let rt_b = r_b.cross(tangent);
        let k_tangent = sa.inv_mass
            + sb.inv_mass
            + sa.inv_inertia * rt_a * rt_a
            + sb.inv_inertia * rt_b * rt_b;

        let relative = sb.velocity + Vec2::scalar_cross(sb.omega, r_b)
            - sa.velocity
            - Vec2::scalar_cross(sa.omega, r_a);
        let approach = normal.dot(relative);

        *point = PointConstraint {
            r_a,
            r_b,
            normal_mass: if k_normal > 0.0 { 1.0 / k_normal } else { 0.0 },
            tangent_mass: if k_tangent > 0.0 { 1.0 / k_tangent } else { 0.0 },
            normal_impulse: 0.0,
            tangent_impulse: 0.0,
            velocity_bias: if approach < -VELOCITY_THRESHOLD {
                -contact.restitution() * approach
            } else {
                0.0
            },
            local_a: rot_a.inv_rotate(r_a),
            local_b: rot_b.inv_rotate(r_b),
            separation: -manifold.depths[i],
        };
    }

    ContactConstraint {
        contact: handle,
        a,
        b,
        normal,
        local_normal: rot_a.inv_rotate(normal),
        friction: contact.friction(),
        tangent_speed: contact.tangent_speed(),
        count: manifold.count,
        points,
    }
}

fn apply_impulse(states: &mut [BodyState], a: usize, b: usize, point: &PointConstraint, impulse: Vec2) {
    let sa = &mut states[a];
    sa.velocity -= impulse * sa.inv_mass;
    sa.omega -= sa.inv_inertia * point.r_a.cross(impulse);
    let sb = &mut states[b];
    sb.velocity += impulse * sb.inv_mass;
    sb.omega += sb.inv_inertia * point.r_b.cross(impulse);
}

fn relative_velocity(states: &[BodyState], a: usize, b: usize, point: &PointConstraint) -> Vec2 {
    let (sa, sb) = (&states[a], &states[b]);
    sb.velocity + Vec2::scalar_cross(sb.omega, point.r_b)
        - sa.velocity
        - Vec2::scalar_cross(sa.omega, point.r_a)
}

fn solve_velocity(constraint: &mut ContactConstraint, states: &mut [BodyState]) {
    let (a, b) = (constraint.a, constraint.b);
    let normal = constraint.normal;
    let tangent = normal.cross_scalar(1.0);
    let count = constraint.count;

    // Friction first so the normal impulse has the final say on penetration.
    for point in constraint.points.iter_mut().take(count) {
        let dv = relative_velocity(states, a, b, point);
        let vt = dv.dot(tangent) - constraint.tangent_speed;
        let max_friction = constraint.friction * point.normal_impulse;
        let total = (point.tangent_impulse - point.tangent_mass * vt)
            .max(-max_friction)
            .min(max_friction);
        let lambda = total - point.tangent_impulse;
        point.tangent_impulse = total;
        apply_impulse(states, a, b, point, tangent * lambda);
    }

    for point in constraint.points.iter_mut().take(count) {
        let dv = relative_velocity(states, a, b, point);
        let vn = dv.dot(normal);
        let total = (point.normal_impulse - point.normal_mass * (vn - point.velocity_bias)).max(0.0);
        let lambda = total - point.normal_impulse;
        point.normal_impulse = total;
        apply_impulse(states, a, b, point, normal * lambda);
    }
}

/// One Baumgarte pass over a contact; returns the smallest separation seen.
fn solve_position(constraint: &ContactConstraint, states: &mut [BodyState]) -> f32 {
    let (a, b) = (constraint.a, constraint.b);
    let mut min_separation = 0.0_f32;

    for point in constraint.points.iter().take(constraint.count) {
        let (sa, sb) = (states[a], states[b]);
        let rot_a = Rotation::from_angle(sa.angle);
        let rot_b = Rotation::from_angle(sb.angle);
        let normal = rot_a.rotate(constraint.local_normal);
        let world_a = sa.center + rot_a.rotate(point.local_a);
        let world_b = sb.center + rot_b.rotate(point.local_b);
        let separation = point.separation + (world_b - world_a).dot(normal);
        let contact_point = (world_a + world_b) * 0.5;
        let r_a = contact_point - sa.center;
        let r_b = contact_point - sb.center;
        min_separation = min_separation.min(separation);

        let correction =
            (BAUMGARTE * (separation + LINEAR_SLOP)).max(-MAX_LINEAR_CORRECTION).min(0.0);
        let rn_a = r_a.cross(normal);
        let rn_b = r_b.cross(normal);
        let k = sa.inv_mass + sb.inv_mass + sa.inv_inertia * rn_a * rn_a + sb.inv_inertia * rn_b * rn_b;
        let impulse = if k > 0.0 { -correction / k } else { 0.0 };
        let p = normal * impulse;

        let sa = &mut states[a];
        sa.center -= p * sa.inv_mass;
        sa.angle -= sa.inv_inertia * r_a.cross(p);
        let sb = &mut states[b];
        sb.center += p * sb.inv_mass;
        sb.angle += sb.inv_inertia * r_b.cross(p);
    }
    min_separation
}
