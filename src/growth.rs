//! Stochastic growth policy.
//!
//! Each frame the [`GrowthPacer`] counts towards an age- and size-dependent
//! threshold. When it fires, [`should_grow`] rolls against a chance driven by
//! soil moisture, and on success [`grow_plant`] picks a host segment and adds
//! a stem, branch, leaf or flower at its tip.

use std::f32::consts::{FRAC_PI_3, FRAC_PI_4, PI, TAU};

use cgmath::Vector2;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::archetype::Archetype;
use crate::ornament::{Flower, Leaf};
use crate::plant::Plant;
use crate::segment::StemSegment;
use crate::sensor::SensorReading;

/// Soil moisture outside this band stops growth outright.
pub const MOISTURE_GATE: (f64, f64) = (250.0, 750.0);
/// Soil moisture range mapped onto a [0, 1] growth factor.
pub const MOISTURE_SCALE: (f64, f64) = (200.0, 800.0);
pub const BASE_GROWTH_CHANCE: f64 = 0.35;
/// Plants younger than this many age units grow at 60% of the usual chance.
pub const SEEDLING_AGE: f64 = 300.0;
pub const SEEDLING_PENALTY: f64 = 0.6;
/// Extra chance contributed by every leaf on the plant.
pub const LEAF_BONUS: f64 = 0.002;

/// Segment lengths never shrink below this share of their nominal length.
const MIN_LENGTH_SCALE: f32 = 0.1;

/// Frames to wait between growth attempts. Young and small plants wait
/// longer.
pub fn growth_speed(age_units: f64, segment_count: usize) -> u32 {
    if age_units < 200.0 {
        35
    } else if segment_count < 10 {
        30
    } else if segment_count < 30 {
        25
    } else if segment_count < 50 {
        20
    } else {
        18
    }
}

/// Counts frames between growth attempts.
#[derive(Clone, Copy, Debug, Default)]
pub struct GrowthPacer {
    counter: u32,
}

impl GrowthPacer {
    pub fn new() -> GrowthPacer {
        GrowthPacer::default()
    }

    pub fn counter(&self) -> u32 {
        self.counter
    }

    pub fn reset(&mut self) {
        self.counter = 0;
    }

    /// Advances one frame. Returns `true` when a growth attempt is due, in
    /// which case the counter starts over. Never fires at or above
    /// `max_segments`.
    pub fn ready(&mut self, age_units: f64, segment_count: usize, max_segments: usize) -> bool {
        self.counter = self.counter.saturating_add(1);
        if self.counter > growth_speed(age_units, segment_count) && segment_count < max_segments {
            self.counter = 0;
            true
        } else {
            false
        }
    }
}

/// Probability of growing this attempt, or `None` when soil moisture is
/// outside the growth band.
pub fn growth_chance(reading: &SensorReading, age_units: f64, leaf_count: usize) -> Option<f64> {
    let soil = reading.soil_moisture;
    if !(MOISTURE_GATE.0..=MOISTURE_GATE.1).contains(&soil) {
        return None;
    }
    let (lo, hi) = MOISTURE_SCALE;
    let moisture_factor = ((soil - lo) / (hi - lo)).clamp(0.0, 1.0);

    let mut chance = moisture_factor * BASE_GROWTH_CHANCE;
    if age_units < SEEDLING_AGE {
        chance *= SEEDLING_PENALTY;
    }
    chance += leaf_count as f64 * LEAF_BONUS;
    Some(chance)
}

/// The growth gate: rolls against [`growth_chance`].
pub fn should_grow<R: Rng + ?Sized>(
    reading: &SensorReading,
    age_units: f64,
    leaf_count: usize,
    rng: &mut R,
) -> bool {
    match growth_chance(reading, age_units, leaf_count) {
        Some(chance) => rng.gen::<f64>() < chance,
        None => false,
    }
}

/// Performs one growth step. Each growable segment enters the draw with its
/// own growth probability; one of the entrants hosts the new structure.
///
/// Returns what was grown, or `None` if no segment qualified or the step
/// would push the plant past `max_segments`.
pub fn grow_plant<R: Rng + ?Sized>(
    plant: &mut Plant,
    max_segments: usize,
    rng: &mut R,
) -> Option<Archetype> {
    let candidates: Vec<usize> = plant
        .segments()
        .iter()
        .enumerate()
        .filter(|(_, s)| s.can_grow && rng.gen::<f32>() < s.growth_probability)
        .map(|(i, _)| i)
        .collect();

    let &host_index = candidates.choose(rng)?;
    let kind = Archetype::choose(plant.segment_count(), rng.gen());
    if kind.adds_segment() && plant.segment_count() >= max_segments {
        return None;
    }

    let host = &plant.segments()[host_index];
    match kind {
        Archetype::Stem => {
            let segment = extend_stem(host, rng);
            plant.segments_mut().push(segment);
        }
        Archetype::Branch => {
            let segment = create_branch(host, rng);
            plant.segments_mut().push(segment);
        }
        Archetype::Leaf => {
            let leaf = create_leaf(host, rng);
            plant.leaves_mut().push(leaf);
        }
        Archetype::Flower => {
            let flower = create_flower(host, rng);
            plant.flowers_mut().push(flower);
        }
    }
    debug!(
        ?kind,
        host = host_index,
        segments = plant.segment_count(),
        leaves = plant.leaf_count(),
        flowers = plant.flower_count(),
        "plant grew"
    );
    Some(kind)
}

/// One frame of automatic growth: advances the pacer and, when it fires and
/// the moisture gate passes, performs a growth step.
pub fn tick<R: Rng + ?Sized>(
    pacer: &mut GrowthPacer,
    plant: &mut Plant,
    reading: &SensorReading,
    age_units: f64,
    max_segments: usize,
    rng: &mut R,
) -> Option<Archetype> {
    if !pacer.ready(age_units, plant.segment_count(), max_segments) {
        return None;
    }
    if !should_grow(reading, age_units, plant.leaf_count(), rng) {
        return None;
    }
    grow_plant(plant, max_segments, rng)
}

fn length_scale(generation: u32, falloff: f32) -> f32 {
    (1.0 - generation as f32 * falloff).max(MIN_LENGTH_SCALE)
}

fn child_segment<R: Rng + ?Sized>(
    parent: &StemSegment,
    angle: f32,
    length: f32,
    thickness: f32,
    rng: &mut R,
) -> StemSegment {
    let start = parent.end;
    let end = start + Vector2::new(angle.cos(), angle.sin()) * length;
    StemSegment::new(start, end, parent.generation + 1, angle, thickness, rng)
}

/// Continues `parent` in a slightly perturbed direction.
pub fn extend_stem<R: Rng + ?Sized>(parent: &StemSegment, rng: &mut R) -> StemSegment {
    let angle = parent.angle + rng.gen_range(-0.4f32..0.4);
    let length = rng.gen_range(35.0f32..55.0) * length_scale(parent.generation, 0.08);
    child_segment(parent, angle, length, parent.thickness * 0.96, rng)
}

/// Splits off a thinner, shorter side branch at a wide angle. Branches are
/// less eager to grow than their parent.
pub fn create_branch<R: Rng + ?Sized>(parent: &StemSegment, rng: &mut R) -> StemSegment {
    let spread = PI / 2.2;
    let angle = parent.angle + rng.gen_range(-spread..spread);
    let length = rng.gen_range(28.0f32..45.0) * length_scale(parent.generation, 0.12);
    let mut branch = child_segment(parent, angle, length, parent.thickness * 0.75, rng);
    branch.growth_probability = parent.growth_probability * 0.85;
    branch
}

pub fn create_leaf<R: Rng + ?Sized>(host: &StemSegment, rng: &mut R) -> Leaf {
    Leaf {
        position: host.end,
        size: rng.gen_range(1.2..1.8),
        angle: host.angle + rng.gen_range(-FRAC_PI_3..FRAC_PI_3),
        age: 0,
        max_age: rng.gen_range(800..=1200),
        sway_phase: rng.gen_range(0.0..TAU),
        sway_amount: rng.gen_range(0.5..1.5),
        sway_offset: 0.0,
        color_variation: rng.gen_range(0.8..1.2),
        attached: true,
    }
}

pub fn create_flower<R: Rng + ?Sized>(host: &StemSegment, rng: &mut R) -> Flower {
    Flower {
        position: host.end,
        size: rng.gen_range(1.2..1.8),
        angle: host.angle + rng.gen_range(-FRAC_PI_4..FRAC_PI_4),
        age: 0,
        max_age: rng.gen_range(600..=900),
        sway_phase: rng.gen_range(0.0..TAU),
        sway_amount: rng.gen_range(0.3..0.8),
        sway_offset: 0.0,
        color_variation: rng.gen_range(0.9..1.1),
        bloom_progress: 0.0,
        blooming: false,
    }
}
