//! Ray perception
//!
//! Casts rays from the agent and encodes what each one hits. Per ray the layout
//! is `[one-hot tag..., miss flag, hit distance / ray length]`.

use glam::Vec2;

use super::collision::{ray_circle, ray_wall};
use super::state::{Stump, Truffle};
use crate::{forward_axis, right_axis};

/// Things a ray can recognize
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RayTag {
    Stump,
    Wall,
}

/// Tags reported in each ray's one-hot block, in order
pub const DETECTABLE_TAGS: [RayTag; 2] = [RayTag::Stump, RayTag::Wall];

/// Closest thing a ray ran into
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// None for blockers without a detectable tag (truffles)
    pub tag: Option<RayTag>,
    pub distance: f32,
}

/// Ray layout shared by every cast
#[derive(Debug, Clone, Copy)]
pub struct RayLayout<'a> {
    pub distance: f32,
    /// Degrees from the agent's right axis; 90 is straight ahead
    pub angles: &'a [f32],
    pub wall_half_extent: f32,
}

/// Direction of a ray at `angle` degrees for an agent facing `heading`
pub fn ray_direction(heading: f32, angle: f32) -> Vec2 {
    let a = angle.to_radians();
    right_axis(heading) * a.cos() + forward_axis(heading) * a.sin()
}

/// Closest hit along one ray, within `max_distance`
pub fn cast(
    origin: Vec2,
    dir: Vec2,
    max_distance: f32,
    wall_half_extent: f32,
    stumps: &[Stump],
    truffles: &[Truffle],
) -> Option<RayHit> {
    let stump_hits = stumps
        .iter()
        .filter_map(|s| ray_circle(origin, dir, s.pos, s.radius))
        .map(|distance| RayHit {
            tag: Some(RayTag::Stump),
            distance,
        });
    let truffle_hits = truffles
        .iter()
        .filter_map(|t| ray_circle(origin, dir, t.pos, t.radius))
        .map(|distance| RayHit {
            tag: None,
            distance,
        });
    let wall_hit = ray_wall(origin, dir, wall_half_extent).map(|distance| RayHit {
        tag: Some(RayTag::Wall),
        distance,
    });

    stump_hits
        .chain(truffle_hits)
        .chain(wall_hit)
        .filter(|hit| hit.distance <= max_distance)
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
}

/// Encode every ray of `layout` into `out`
pub fn perceive(
    out: &mut Vec<f32>,
    origin: Vec2,
    heading: f32,
    layout: RayLayout<'_>,
    stumps: &[Stump],
    truffles: &[Truffle],
) {
    for &angle in layout.angles {
        let dir = ray_direction(heading, angle);
        let hit = cast(
            origin,
            dir,
            layout.distance,
            layout.wall_half_extent,
            stumps,
            truffles,
        );

        let start = out.len();
        out.resize(start + DETECTABLE_TAGS.len() + 2, 0.0);
        let block = &mut out[start..];
        match hit {
            Some(hit) => {
                if let Some(tag) = hit.tag {
                    if let Some(slot) = DETECTABLE_TAGS.iter().position(|t| *t == tag) {
                        block[slot] = 1.0;
                    }
                }
                block[DETECTABLE_TAGS.len() + 1] = hit.distance / layout.distance;
            }
            None => block[DETECTABLE_TAGS.len()] = 1.0,
        }
    }
}
