//! Stereo smell readings
//!
//! Two virtual nostrils sit either side of the agent along its right axis.
//! Each sums a log falloff over every active truffle.

use glam::Vec2;

use crate::consts::{SMELL_BASE, SMELL_FALLOFF, SMELL_MIN_DISTANCE};
use crate::right_axis;

/// Left and right nostril readings
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SmellReading {
    pub left: f32,
    pub right: f32,
}

/// Scent contributed by one source at `distance`
#[inline]
pub fn scent_at(distance: f32) -> f32 {
    SMELL_BASE - SMELL_FALLOFF * distance.max(SMELL_MIN_DISTANCE).log10()
}

/// Nostril positions (left, right) for an agent at `position` facing `heading` degrees
pub fn nostril_positions(position: Vec2, heading: f32, nostril_width: f32) -> (Vec2, Vec2) {
    let offset = right_axis(heading) * (nostril_width / 2.0);
    (position - offset, position + offset)
}

/// Sum scent over `sources` at both nostrils. No sources reads exactly zero.
pub fn sniff<I>(position: Vec2, heading: f32, nostril_width: f32, sources: I) -> SmellReading
where
    I: IntoIterator<Item = Vec2>,
{
    let (left_pos, right_pos) = nostril_positions(position, heading, nostril_width);
    sources
        .into_iter()
        .fold(SmellReading::default(), |acc, source| SmellReading {
            left: acc.left + scent_at(source.distance(left_pos)),
            right: acc.right + scent_at(source.distance(right_pos)),
        })
}
