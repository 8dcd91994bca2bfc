use cgmath::{InnerSpace, Point2, Vector2};
use rand::Rng;

use crate::color::Color;

/// Colour of a freshly rooted stem.
pub const STEM_BROWN: Color = Color::rgb(120.0, 80.0, 60.0);
/// Colour stems reach by generation 12.
pub const STEM_GREEN: Color = Color::rgb(100.0, 130.0, 60.0);

pub const MIN_GROWTH_PROBABILITY: f32 = 0.05;
pub const ROOT_GROWTH_PROBABILITY: f32 = 0.9;

/// Growth probability for a segment of the given depth: 0.9 at the root,
/// falling by 0.075 per generation, never below 0.05.
pub fn growth_probability_for(generation: u32) -> f32 {
    let p = ROOT_GROWTH_PROBABILITY - generation as f32 * 0.075;
    p.max(MIN_GROWTH_PROBABILITY)
}

/// Brown-to-green blend keyed by generation.
pub fn color_for(generation: u32) -> Color {
    STEM_BROWN.lerp(STEM_GREEN, generation as f32 / 12.0)
}

/// Sway damping for deep segments, floored at 30% of the root's sway.
pub fn sway_intensity(generation: u32) -> f32 {
    (1.0 - generation as f32 * 0.08).max(0.3)
}

/// A straight piece of stem. Children start where their parent ended at the
/// moment they were grown; sway may pull the joints slightly apart later.
#[derive(Clone, Debug, PartialEq)]
pub struct StemSegment {
    /// Animated positions, recomputed every frame from the base positions.
    pub start: Point2<f32>,
    pub end: Point2<f32>,
    /// Positions before sway.
    pub base_start: Point2<f32>,
    pub base_end: Point2<f32>,
    /// Heading in radians; -PI/2 points straight up.
    pub angle: f32,
    pub thickness: f32,
    /// Depth from the root, which is generation 0.
    pub generation: u32,
    pub growth_probability: f32,
    pub can_grow: bool,
    pub color: Color,
    /// Fixed per-segment phase offset in [0, 1000).
    pub sway_seed: f32,
}

impl StemSegment {
    pub fn new<R: Rng + ?Sized>(
        start: Point2<f32>,
        end: Point2<f32>,
        generation: u32,
        angle: f32,
        thickness: f32,
        rng: &mut R,
    ) -> StemSegment {
        StemSegment {
            start,
            end,
            base_start: start,
            base_end: end,
            angle,
            thickness,
            generation,
            growth_probability: growth_probability_for(generation),
            can_grow: true,
            color: color_for(generation),
            sway_seed: rng.gen_range(0.0..1000.0),
        }
    }

    /// Current (animated) length.
    pub fn length(&self) -> f32 {
        (self.end - self.start).magnitude()
    }

    /// Recomputes the animated endpoints for phase `t`.
    pub fn update_sway(&mut self, t: f64) {
        let generation = self.generation as f64;
        let seed = self.sway_seed as f64;
        let intensity = sway_intensity(self.generation) as f64;

        let horizontal = ((t * 0.8 + generation * 0.3 + seed).sin() * intensity * 1.5) as f32;
        let vertical = ((t * 0.6 + generation * 0.4 + seed).cos() * intensity * 0.5) as f32;

        self.start = self.base_start + Vector2::new(horizontal, vertical);
        self.end = self.base_end + Vector2::new(horizontal * 1.2, vertical);
    }

    /// Shifts every stored position vertically.
    pub fn translate_y(&mut self, dy: f32) {
        let delta = Vector2::new(0.0, dy);
        self.base_start += delta;
        self.base_end += delta;
        self.start += delta;
        self.end += delta;
    }
}
