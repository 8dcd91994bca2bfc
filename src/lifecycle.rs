use crate::ornament::LEAF_FALL_MARGIN;
use crate::plant::Plant;

/// Phase clock increment per frame.
pub const PHASE_STEP: f64 = 0.02;

/// Runs one frame of ambient animation and ageing at phase `t`.
///
/// Every segment sways around its base position. Leaves and flowers age by
/// one tick; leaves past their lifespan fall until they leave the canvas
/// (`canvas_height` plus a margin), flowers past theirs vanish.
pub fn animate(plant: &mut Plant, t: f64, canvas_height: f32) {
    for segment in plant.segments_mut().iter_mut() {
        segment.update_sway(t);
    }

    let fall_limit = canvas_height + LEAF_FALL_MARGIN;
    plant.leaves_mut().retain_mut(|leaf| leaf.update(t, fall_limit));
    plant.flowers_mut().retain_mut(|flower| flower.update(t));
}
