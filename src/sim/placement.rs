//! Collision-free random placement
//!
//! Rejection sampling of circular footprints inside a square region. Each
//! accepted footprint is recorded right away so later placements in the same
//! reset steer clear of it.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::PlacementError;
use crate::settings::ObjectShape;

/// Occupied disc in the arena plane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    pub center: Vec2,
    pub radius: f32,
}

impl Footprint {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Footprint radius for a shape: half the larger scaled extent, inflated by `margin`
    pub fn radius_for(shape: &ObjectShape, margin: f32) -> f32 {
        shape.body_radius() * margin
    }

    /// Strictly separated discs (touching counts as overlap)
    #[inline]
    pub fn is_clear_of(&self, other: &Footprint) -> bool {
        self.center.distance(other.center) - other.radius > self.radius
    }
}

/// Footprints placed during the current episode
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FootprintRegistry {
    footprints: Vec<Footprint>,
}

impl FootprintRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.footprints.clear();
    }

    pub fn len(&self) -> usize {
        self.footprints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.footprints.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Footprint> {
        self.footprints.iter()
    }

    /// True if a disc at `center` with `radius` clears every recorded footprint
    pub fn is_open(&self, center: Vec2, radius: f32) -> bool {
        let candidate = Footprint::new(center, radius);
        self.footprints.iter().all(|f| candidate.is_clear_of(f))
    }

    /// Record a footprint without testing it
    pub fn insert(&mut self, footprint: Footprint) {
        self.footprints.push(footprint);
    }
}

/// Result of a successful placement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: Vec2,
    /// Heading in degrees, [0, 360)
    pub heading: f32,
    /// Attempts used, 1-based
    pub attempts: u32,
}

/// Square spawn region
#[derive(Debug, Clone, Copy)]
pub struct SpawnRegion {
    /// Half-width of the sampling square
    pub range: f32,
    /// Area-to-world scale applied to each sample
    pub scale: f32,
}

impl SpawnRegion {
    pub fn new(range: f32, scale: f32) -> Self {
        Self { range, scale }
    }

    fn sample<R: Rng>(&self, rng: &mut R) -> Vec2 {
        let x = rng.random_range(-self.range..=self.range);
        let z = rng.random_range(-self.range..=self.range);
        Vec2::new(x, z) * self.scale
    }
}

/// Place one footprint of `radius` in `region`, avoiding everything in `registry`.
///
/// The heading is drawn once up front and takes no part in the overlap test.
/// On success the footprint is appended to the registry.
pub fn place<R: Rng>(
    rng: &mut R,
    registry: &mut FootprintRegistry,
    region: SpawnRegion,
    radius: f32,
    max_attempts: u32,
    label: &'static str,
) -> Result<Placement, PlacementError> {
    let heading = rng.random_range(0.0..360.0);

    for attempt in 1..=max_attempts {
        let position = region.sample(rng);
        if registry.is_open(position, radius) {
            registry.insert(Footprint::new(position, radius));
            return Ok(Placement {
                position,
                heading,
                attempts: attempt,
            });
        }
    }

    Err(PlacementError::Exhausted {
        label,
        attempts: max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_footprint_radius_margin() {
        let shape = ObjectShape::new(1.0, 2.0, 1.0);
        let r = Footprint::radius_for(&shape, 1.1);
        assert!((r - 1.1).abs() < 1e-6);
    }

    #[test]
    fn test_touching_footprints_are_not_clear() {
        let a = Footprint::new(Vec2::ZERO, 1.0);
        let b = Footprint::new(Vec2::new(2.0, 0.0), 1.0);
        assert!(!a.is_clear_of(&b));
        let c = Footprint::new(Vec2::new(2.01, 0.0), 1.0);
        assert!(a.is_clear_of(&c));
    }

    #[test]
    fn test_place_appends_to_registry() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut registry = FootprintRegistry::new();
        let region = SpawnRegion::new(5.0, 1.0);

        let placed = place(&mut rng, &mut registry, region, 0.5, 10, "truffle").unwrap();
        assert_eq!(registry.len(), 1);
        assert!(placed.position.x.abs() <= 5.0 && placed.position.y.abs() <= 5.0);
        assert!((0.0..360.0).contains(&placed.heading));
        assert!(placed.attempts >= 1);
    }

    #[test]
    fn test_place_exhausts_when_region_is_full() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut registry = FootprintRegistry::new();
        // One giant footprint covering the whole region
        registry.insert(Footprint::new(Vec2::ZERO, 100.0));
        let region = SpawnRegion::new(5.0, 1.0);

        let err = place(&mut rng, &mut registry, region, 0.5, 50, "stump").unwrap_err();
        assert_eq!(
            err,
            PlacementError::Exhausted {
                label: "stump",
                attempts: 50
            }
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_zero_attempts_fails() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut registry = FootprintRegistry::new();
        let result = place(&mut rng, &mut registry, SpawnRegion::new(5.0, 1.0), 0.5, 0, "pig");
        assert!(result.is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_scale_stretches_samples() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut registry = FootprintRegistry::new();
        let region = SpawnRegion::new(1.0, 4.0);
        for _ in 0..20 {
            registry.clear();
            let placed = place(&mut rng, &mut registry, region, 0.1, 1, "truffle").unwrap();
            assert!(placed.position.x.abs() <= 4.0 && placed.position.y.abs() <= 4.0);
        }
    }
}
