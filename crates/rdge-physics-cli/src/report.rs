// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Stepping a scene and summarizing the outcome.

use anyhow::{Context, Result};
use comfy_table::{presets::UTF8_FULL, Table};
use rdge_physics::{BodyType, Contact, ContactImpulse, ContactListener, StepStats};
use serde::Serialize;
use tracing::info;

use crate::scene::Scene;

/// Counts contact transitions and tracks the strongest normal impulse.
#[derive(Debug, Default)]
pub struct Tally {
    begins: usize,
    ends: usize,
    peak_impulse: f32,
}

impl ContactListener for Tally {
    fn begin_contact(&mut self, _contact: &Contact) {
        self.begins += 1;
    }

    fn end_contact(&mut self, _contact: &Contact) {
        self.ends += 1;
    }

    fn post_solve(&mut self, _contact: &Contact, impulse: &ContactImpulse) {
        let strongest = impulse.normal_impulses[..impulse.count].iter().copied().fold(0.0, f32::max);
        self.peak_impulse = self.peak_impulse.max(strongest);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BodyReport {
    pub name: String,
    pub kind: BodyType,
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    pub awake: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub steps: u32,
    pub dt: f32,
    pub begins: usize,
    pub ends: usize,
    pub peak_touching: usize,
    pub peak_impulse: f32,
    pub contacts: usize,
    pub touching: usize,
    pub islands: usize,
    pub awake_bodies: usize,
    pub bodies: Vec<BodyReport>,
}

/// Builds `scene` and advances it `steps` times by `dt`.
pub fn simulate(scene: &Scene, steps: u32, dt: f32) -> Result<Summary> {
    let (mut graph, handles) = scene.build(Tally::default())?;
    let mut last = StepStats::default();
    let mut peak_touching = 0;
    for step in 0..steps {
        last = graph.step(dt).with_context(|| format!("step {step} failed"))?;
        peak_touching = peak_touching.max(last.touching);
    }

    let bodies = handles
        .into_iter()
        .filter_map(|(name, handle)| {
            let body = graph.body(handle)?;
            let position = body.position();
            Some(BodyReport {
                name,
                kind: body.body_type(),
                x: position.x(),
                y: position.y(),
                angle: body.angle(),
                awake: body.is_awake(),
            })
        })
        .collect();

    let tally = graph.listener();
    info!(steps, begins = tally.begins, ends = tally.ends, "simulation finished");
    Ok(Summary {
        steps,
        dt,
        begins: tally.begins,
        ends: tally.ends,
        peak_touching,
        peak_impulse: tally.peak_impulse,
        contacts: last.contacts,
        touching: last.touching,
        islands: last.islands,
        awake_bodies: last.awake_bodies,
        bodies,
    })
}

impl Summary {
    /// Human-readable report: counters first, then one row per body.
    pub fn render(&self) -> String {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(vec!["body", "kind", "x", "y", "angle", "awake"]);
        for body in &self.bodies {
            table.add_row(vec![
                body.name.clone(),
                format!("{:?}", body.kind).to_lowercase(),
                format!("{:.3}", body.x),
                format!("{:.3}", body.y),
                format!("{:.3}", body.angle),
                body.awake.to_string(),
            ]);
        }
        format!(
            "steps: {} (dt {:.4})\ncontacts: {} begin / {} end, peak touching {}, peak impulse {:.3}\n\
             final: {} contacts, {} touching, {} islands, {} awake\n{table}",
            self.steps,
            self.dt,
            self.begins,
            self.ends,
            self.peak_touching,
            self.peak_impulse,
            self.contacts,
            self.touching,
            self.islands,
            self.awake_bodies,
        )
    }
}
