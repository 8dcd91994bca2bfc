use cgmath::Point2;
use rand::Rng;
use tracing::info;

use crate::ornament::{Flower, Leaf};
use crate::segment::StemSegment;

/// Heading of the root segment (straight up in screen coordinates).
pub const ROOT_ANGLE: f32 = -std::f32::consts::FRAC_PI_2;

/// Topology of the plant: its stem segments plus the leaves and flowers
/// hanging off them.
///
/// Segments are never removed during a session. Leaves and flowers come and
/// go as they age.
#[derive(Clone, Debug, Default)]
pub struct Plant {
    segments: Vec<StemSegment>,
    leaves: Vec<Leaf>,
    flowers: Vec<Flower>,
}

impl Plant {
    pub fn new() -> Plant {
        Plant::default()
    }

    /// Clears everything and plants a single upright root segment at `base`.
    pub fn reset<R: Rng + ?Sized>(
        &mut self,
        base: Point2<f32>,
        stem_height: f32,
        thickness: f32,
        rng: &mut R,
    ) {
        self.segments.clear();
        self.leaves.clear();
        self.flowers.clear();

        let top = Point2::new(base.x, base.y - stem_height);
        self.segments
            .push(StemSegment::new(base, top, 0, ROOT_ANGLE, thickness, rng));
        info!(x = base.x, y = base.y, stem_height, "plant reset");
    }

    /// Moves the whole plant vertically, keeping its shape, after the
    /// drawing surface changed height.
    pub fn apply_viewport_resize(&mut self, delta_y: f32) {
        for segment in &mut self.segments {
            segment.translate_y(delta_y);
        }
        for leaf in &mut self.leaves {
            leaf.position.y += delta_y;
        }
        for flower in &mut self.flowers {
            flower.position.y += delta_y;
        }
    }

    pub fn segments(&self) -> &[StemSegment] {
        &self.segments
    }

    pub fn leaves(&self) -> &[Leaf] {
        &self.leaves
    }

    pub fn flowers(&self) -> &[Flower] {
        &self.flowers
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    pub fn flower_count(&self) -> usize {
        self.flowers.len()
    }

    pub(crate) fn segments_mut(&mut self) -> &mut Vec<StemSegment> {
        &mut self.segments
    }

    pub(crate) fn leaves_mut(&mut self) -> &mut Vec<Leaf> {
        &mut self.leaves
    }

    pub(crate) fn flowers_mut(&mut self) -> &mut Vec<Flower> {
        &mut self.flowers
    }

    /// Sets whether a segment may host future growth. Returns `false` if
    /// `index` is out of range.
    pub fn set_can_grow(&mut self, index: usize, can_grow: bool) -> bool {
        match self.segments.get_mut(index) {
            Some(segment) => {
                segment.can_grow = can_grow;
                true
            }
            None => false,
        }
    }
}
