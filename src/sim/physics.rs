//! Kinematic stand-in for the physics engine
//!
//! Honors the contract the agent relies on: velocity-change forces apply
//! immediately and deterministically, the body slides under linear drag, and
//! contacts are reported as enter events. It is not a rigid-body solver.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{cancel_inward_velocity, circle_circle_collision, circle_wall_contacts};
use super::state::{Stump, Truffle};

/// Planar body state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// Arena-local position
    pub pos: Vec2,
    /// Velocity in arena-local axes
    pub vel: Vec2,
    /// Heading in degrees
    pub heading: f32,
    pub radius: f32,
}

impl Body {
    pub fn new(radius: f32) -> Self {
        Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            heading: 0.0,
            radius,
        }
    }

    /// Instant velocity change (mass-independent impulse)
    #[inline]
    pub fn add_velocity_change(&mut self, delta: Vec2) {
        self.vel += delta;
    }
}

/// Contacts held at the end of the previous tick
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactState {
    touching_stumps: Vec<u32>,
    /// Per wall, in `WALL_NORMALS` order
    touching_walls: [bool; 4],
}

impl ContactState {
    pub fn clear(&mut self) {
        self.touching_stumps.clear();
        self.touching_walls = [false; 4];
    }

    pub fn is_touching_wall(&self) -> bool {
        self.touching_walls.iter().any(|&t| t)
    }

    pub fn touching_wall_count(&self) -> usize {
        self.touching_walls.iter().filter(|&&t| t).count()
    }

    pub fn is_touching_stump(&self, id: u32) -> bool {
        self.touching_stumps.contains(&id)
    }
}

/// What happened during one physics step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactEvents {
    /// Truffles the body touched, in truffle order
    pub truffles: Vec<u32>,
    /// Stumps whose contact began this step
    pub stumps_entered: Vec<u32>,
    /// Walls whose contact began this step
    pub walls_entered: usize,
}

impl ContactEvents {
    /// Number of obstacle contacts that began this step
    pub fn obstacle_entries(&self) -> usize {
        self.stumps_entered.len() + self.walls_entered
    }
}

/// Integration parameters
#[derive(Debug, Clone, Copy)]
pub struct StepParams {
    pub dt: f32,
    pub drag: f32,
    pub wall_half_extent: f32,
}

/// Integrate the body one fixed step and resolve contacts
pub fn step(
    body: &mut Body,
    params: StepParams,
    stumps: &[Stump],
    truffles: &[Truffle],
    contacts: &mut ContactState,
) -> ContactEvents {
    let mut events = ContactEvents::default();

    body.pos += body.vel * params.dt;
    body.vel *= (1.0 - params.drag * params.dt).max(0.0);

    // Stumps push the body out
    let mut touching_stumps = Vec::new();
    for stump in stumps {
        let hit = circle_circle_collision(body.pos, body.radius, stump.pos, stump.radius);
        if hit.hit {
            body.pos += hit.normal * hit.penetration;
            body.vel = cancel_inward_velocity(body.vel, hit.normal);
            if !contacts.is_touching_stump(stump.id) {
                events.stumps_entered.push(stump.id);
            }
            touching_stumps.push(stump.id);
        }
    }

    // Walls are separate colliders, so a corner can begin a second contact
    let walls = circle_wall_contacts(body.pos, body.radius, params.wall_half_extent);
    let mut touching_walls = [false; 4];
    for (i, wall) in walls.iter().enumerate() {
        if wall.hit {
            body.pos += wall.normal * wall.penetration;
            body.vel = cancel_inward_velocity(body.vel, wall.normal);
            if !contacts.touching_walls[i] {
                events.walls_entered += 1;
            }
            touching_walls[i] = true;
        }
    }

    // Truffles are triggers: touched, never pushed against
    events.truffles = truffles
        .iter()
        .filter(|t| circle_circle_collision(body.pos, body.radius, t.pos, t.radius).hit)
        .map(|t| t.id)
        .collect();

    contacts.touching_stumps = touching_stumps;
    contacts.touching_walls = touching_walls;

    events
}
