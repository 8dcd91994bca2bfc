//! Leaves and flowers: short-lived decorations pinned to stem tips.

use cgmath::Point2;

/// Ticks a flower takes to open fully.
pub const BLOOM_TICKS: u32 = 30;
/// Downward drift of a detached leaf per frame.
pub const LEAF_FALL_SPEED: f32 = 0.5;
/// Spin of a detached leaf per frame, in radians.
pub const LEAF_FALL_SPIN: f32 = 0.01;
/// How far below the canvas a falling leaf travels before it is dropped.
pub const LEAF_FALL_MARGIN: f32 = 50.0;

#[derive(Clone, Debug, PartialEq)]
pub struct Leaf {
    pub position: Point2<f32>,
    pub size: f32,
    pub angle: f32,
    pub age: u32,
    pub max_age: u32,
    pub sway_phase: f32,
    pub sway_amount: f32,
    /// Vertical offset from the last update.
    pub sway_offset: f32,
    pub color_variation: f32,
    pub attached: bool,
}

impl Leaf {
    /// Ages the leaf by one frame. Returns `false` once it has fallen past
    /// `fall_limit` and should be dropped.
    pub fn update(&mut self, t: f64, fall_limit: f32) -> bool {
        self.age += 1;
        self.sway_offset = ((t * 2.0 + self.sway_phase as f64).sin() * self.sway_amount as f64) as f32;

        if self.age > self.max_age {
            self.attached = false;
            self.position.y += LEAF_FALL_SPEED;
            self.angle += LEAF_FALL_SPIN;
            if self.position.y > fall_limit {
                return false;
            }
        }
        true
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Flower {
    pub position: Point2<f32>,
    pub size: f32,
    pub angle: f32,
    pub age: u32,
    pub max_age: u32,
    pub sway_phase: f32,
    pub sway_amount: f32,
    pub sway_offset: f32,
    pub color_variation: f32,
    /// Opening animation, 0 when created and 1 from tick 30 on.
    pub bloom_progress: f32,
    pub blooming: bool,
}

impl Flower {
    /// Ages the flower by one frame. Returns `false` once it has outlived
    /// `max_age`.
    pub fn update(&mut self, t: f64) -> bool {
        self.age += 1;
        self.sway_offset = ((t * 1.5 + self.sway_phase as f64).sin() * self.sway_amount as f64) as f32;

        if self.age < BLOOM_TICKS {
            self.bloom_progress = self.age as f32 / BLOOM_TICKS as f32;
        } else {
            self.bloom_progress = 1.0;
            self.blooming = true;
        }

        self.age <= self.max_age
    }
}
