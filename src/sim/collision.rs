//! Contact and ray queries against circles and the square pen
//!
//! Everything here works in the arena's ground plane (x, z stored as a `Vec2`).

use glam::Vec2;

/// Result of a contact check
#[derive(Debug, Clone, Copy)]
pub struct CollisionResult {
    /// Whether the shapes overlap
    pub hit: bool,
    /// Surface normal at contact, pointing toward the moving body
    pub normal: Vec2,
    /// Penetration depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Overlap between a moving circle and a static circle
pub fn circle_circle_collision(
    body_pos: Vec2,
    body_radius: f32,
    other_pos: Vec2,
    other_radius: f32,
) -> CollisionResult {
    let delta = body_pos - other_pos;
    let dist = delta.length();
    let reach = body_radius + other_radius;

    if dist >= reach {
        return CollisionResult::miss();
    }

    // Coincident centers: push out along +z
    let normal = if dist > f32::EPSILON {
        delta / dist
    } else {
        Vec2::Y
    };

    CollisionResult {
        hit: true,
        normal,
        penetration: reach - dist,
    }
}

/// Inward normals of the four pen walls: east, west, north, south
pub const WALL_NORMALS: [Vec2; 4] = [Vec2::NEG_X, Vec2::X, Vec2::NEG_Y, Vec2::Y];

/// Overlap between a circle and each inner face of a square pen of `half_extent`,
/// in [`WALL_NORMALS`] order.
///
/// At a corner both walls report a hit. A center already outside the pen is
/// past the walls and collides with nothing.
pub fn circle_wall_contacts(body_pos: Vec2, body_radius: f32, half_extent: f32) -> [CollisionResult; 4] {
    if body_pos.x.abs() > half_extent || body_pos.y.abs() > half_extent {
        return [CollisionResult::miss(); 4];
    }

    let gaps = [
        half_extent - (body_pos.x + body_radius),
        half_extent + (body_pos.x - body_radius),
        half_extent - (body_pos.y + body_radius),
        half_extent + (body_pos.y - body_radius),
    ];

    std::array::from_fn(|i| {
        if gaps[i] < 0.0 {
            CollisionResult {
                hit: true,
                normal: WALL_NORMALS[i],
                penetration: -gaps[i],
            }
        } else {
            CollisionResult::miss()
        }
    })
}

/// Remove the velocity component pointing into a surface
#[inline]
pub fn cancel_inward_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    let into = velocity.dot(normal);
    if into < 0.0 {
        velocity - into * normal
    } else {
        velocity
    }
}

/// Distance along a unit `dir` from `origin` to the first crossing of a circle.
///
/// A ray starting inside the circle hits at distance 0.
pub fn ray_circle(origin: Vec2, dir: Vec2, center: Vec2, radius: f32) -> Option<f32> {
    let to_origin = origin - center;
    let c = to_origin.length_squared() - radius * radius;
    if c <= 0.0 {
        return Some(0.0);
    }
    let b = to_origin.dot(dir);
    if b >= 0.0 {
        // Pointing away
        return None;
    }
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    Some(-b - disc.sqrt())
}

/// Distance along a unit `dir` from `origin` to the pen wall.
///
/// Origins outside the pen report 0: the wall is already behind the ray start.
pub fn ray_wall(origin: Vec2, dir: Vec2, half_extent: f32) -> Option<f32> {
    if origin.x.abs() > half_extent || origin.y.abs() > half_extent {
        return Some(0.0);
    }

    let axis_hit = |pos: f32, d: f32| -> Option<f32> {
        if d > f32::EPSILON {
            Some((half_extent - pos) / d)
        } else if d < -f32::EPSILON {
            Some((-half_extent - pos) / d)
        } else {
            None
        }
    };

    match (axis_hit(origin.x, dir.x), axis_hit(origin.y, dir.y)) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}
