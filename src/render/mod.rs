//! Read-only drawing of the plant onto a [`Canvas`].
//!
//! Segments, leaves and flowers are drawn from sprites when the canvas has
//! them, and from procedural shapes otherwise. Nothing here mutates the
//! simulation.

pub mod raster;
mod record;

use std::f32::consts::{PI, TAU};

use cgmath::{Matrix3, Point2, Rad, Vector3};

use crate::color::Color;
use crate::noise::noise1;
use crate::ornament::{Flower, Leaf};
use crate::plant::Plant;
use crate::segment::StemSegment;

pub use record::{DrawCommand, RecordingCanvas};

pub const SKY_TOP: Color = Color::rgb(135.0, 206.0, 235.0);
pub const SKY_BOTTOM: Color = Color::rgb(240.0, 248.0, 255.0);

const SEGMENT_TINT_ALPHA: f32 = 220.0;
const SEGMENT_SPRITE_HEIGHT: f32 = 6.0;
const CROSS_TICKS: usize = 4;
const LEAF_SPRITE_SIZE: f32 = 45.0;
const FLOWER_SPRITE_SIZE: f32 = 40.0;
/// Ticks over which a falling leaf or a dying flower fades out.
const FADE_TICKS: f32 = 100.0;

/// Imagery a canvas may be able to draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Sprite {
    Branch,
    Leaf,
    Flower,
}

impl Sprite {
    pub const ALL: [Sprite; 3] = [Sprite::Branch, Sprite::Leaf, Sprite::Flower];

    pub fn file_name(self) -> &'static str {
        match self {
            Sprite::Branch => "fuchsia_branch.png",
            Sprite::Leaf => "fuchsia_leaf.png",
            Sprite::Flower => "fuchsia_flower.png",
        }
    }
}

/// Axis-aligned rectangle in local (pre-transform) coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Rect {
        Rect { x, y, w, h }
    }

    /// A `size` x `size` square centred on the origin.
    pub fn centered(size: f32) -> Rect {
        Rect::new(-size / 2.0, -size / 2.0, size, size)
    }
}

/// A drawing surface. Transforms are 2D affine maps in homogeneous
/// coordinates from local to surface space.
pub trait Canvas {
    fn width(&self) -> f32;
    fn height(&self) -> f32;
    /// Whether `sprite` can be drawn.
    fn has_sprite(&self, sprite: Sprite) -> bool;
    fn line(&mut self, from: Point2<f32>, to: Point2<f32>, weight: f32, color: Color);
    fn fill_ellipse(
        &mut self,
        transform: &Matrix3<f32>,
        center: Point2<f32>,
        width: f32,
        height: f32,
        color: Color,
    );
    fn fill_polygon(&mut self, transform: &Matrix3<f32>, points: &[Point2<f32>], color: Color);
    /// Draws `sprite` stretched over `dest`, multiplied by `tint`.
    fn blit(&mut self, sprite: Sprite, transform: &Matrix3<f32>, dest: Rect, tint: Color);
}

/// Translation followed by a rotation of `angle` radians.
pub fn placement(at: Point2<f32>, angle: f32) -> Matrix3<f32> {
    let translation = Matrix3::new(1.0, 0.0, 0.0, 0.0, 1.0, 0.0, at.x, at.y, 1.0);
    translation * Matrix3::from_angle_z(Rad(angle))
}

/// Maps a local point through `transform`.
pub fn apply(transform: &Matrix3<f32>, p: Point2<f32>) -> Point2<f32> {
    let v = *transform * Vector3::new(p.x, p.y, 1.0);
    Point2::new(v.x, v.y)
}

/// Linear remap of `value` from [a0, a1] to [b0, b1], clamped to the target
/// range.
fn fade(value: f32, a0: f32, a1: f32, b0: f32, b1: f32) -> f32 {
    let t = ((value - a0) / (a1 - a0)).clamp(0.0, 1.0);
    b0 + (b1 - b0) * t
}

/// Draws one full frame at phase `t`.
pub fn draw_frame<C: Canvas + ?Sized>(canvas: &mut C, plant: &Plant, t: f64) {
    draw_background(canvas);
    draw_plant(canvas, plant, t);
}

/// Vertical sky gradient, one line per pixel row.
pub fn draw_background<C: Canvas + ?Sized>(canvas: &mut C) {
    let width = canvas.width();
    let height = canvas.height();
    let rows = height.max(0.0) as u32;
    for y in 0..rows {
        let y = y as f32;
        let color = SKY_TOP.lerp(SKY_BOTTOM, y / height);
        canvas.line(Point2::new(0.0, y), Point2::new(width, y), 1.0, color);
    }
}

pub fn draw_plant<C: Canvas + ?Sized>(canvas: &mut C, plant: &Plant, t: f64) {
    for segment in plant.segments() {
        draw_segment(canvas, segment, t);
    }
    for leaf in plant.leaves() {
        draw_leaf(canvas, leaf);
    }
    for flower in plant.flowers() {
        draw_flower(canvas, flower);
    }
}

pub fn draw_segment<C: Canvas + ?Sized>(canvas: &mut C, segment: &StemSegment, t: f64) {
    let d = segment.end - segment.start;
    let length = (d.x * d.x + d.y * d.y).sqrt();
    if length < 0.1 {
        return;
    }

    if canvas.has_sprite(Sprite::Branch) {
        let transform = placement(segment.start, d.y.atan2(d.x));
        let variation = 1.0 + noise1(segment.sway_seed + (t * 0.5) as f32) * 0.2;
        let height = segment.thickness * SEGMENT_SPRITE_HEIGHT * variation;
        canvas.blit(
            Sprite::Branch,
            &transform,
            Rect::new(0.0, -height / 2.0, length, height),
            segment.color.with_alpha(SEGMENT_TINT_ALPHA),
        );
        return;
    }

    canvas.line(segment.start, segment.end, segment.thickness, segment.color);

    // bark cross-hatching
    let weight = (segment.thickness * 0.3).max(1.0);
    let tick_color = segment.color.darken(20.0, 10.0, 10.0).with_alpha(150.0);
    for i in 0..=CROSS_TICKS {
        let s = i as f32 / CROSS_TICKS as f32;
        let x = segment.start.x + d.x * s;
        let y = segment.start.y + d.y * s;
        let offset = ((s * PI) as f64 + t).sin() as f32 * segment.thickness * 0.3;
        canvas.line(
            Point2::new(x + offset, y),
            Point2::new(x - offset, y),
            weight,
            tick_color,
        );
    }
}

/// Alpha of a leaf sprite: opaque while attached, fading out over the
/// hundred ticks after it lets go.
pub fn leaf_alpha(leaf: &Leaf) -> f32 {
    if leaf.attached {
        255.0
    } else {
        let max_age = leaf.max_age as f32;
        fade(leaf.age as f32, max_age, max_age + FADE_TICKS, 255.0, 0.0)
    }
}

/// Alpha of a flower sprite: opaque until the last hundred ticks of its
/// life, then fading to nothing.
pub fn flower_alpha(flower: &Flower, opaque: f32) -> f32 {
    let max_age = flower.max_age as f32;
    let age = flower.age as f32;
    if age > max_age - FADE_TICKS {
        fade(age, max_age - FADE_TICKS, max_age, opaque, 0.0)
    } else {
        opaque
    }
}

pub fn draw_leaf<C: Canvas + ?Sized>(canvas: &mut C, leaf: &Leaf) {
    let at = Point2::new(leaf.position.x, leaf.position.y + leaf.sway_offset);
    let transform = placement(at, leaf.angle);

    if canvas.has_sprite(Sprite::Leaf) {
        let tint = Color::rgba(255.0 * leaf.color_variation, 255.0, 255.0, leaf_alpha(leaf));
        canvas.blit(
            Sprite::Leaf,
            &transform,
            Rect::centered(LEAF_SPRITE_SIZE * leaf.size),
            tint,
        );
        return;
    }

    let alpha = if leaf.attached { 200.0 } else { 100.0 };
    let mut outline = vec![Point2::new(0.0, 0.0)];
    let mut theta = 0.0f32;
    while theta <= TAU {
        let r = 18.0 * leaf.size * (0.5 + 0.5 * (theta * 2.0).sin());
        outline.push(Point2::new(theta.cos() * r, theta.sin() * r * 0.6));
        theta += 0.2;
    }
    canvas.fill_polygon(&transform, &outline, Color::rgba(50.0, 150.0, 70.0, alpha));
}

pub fn draw_flower<C: Canvas + ?Sized>(canvas: &mut C, flower: &Flower) {
    let at = Point2::new(flower.position.x, flower.position.y + flower.sway_offset);

    if canvas.has_sprite(Sprite::Flower) {
        let tint = Color::rgba(
            255.0 * flower.color_variation,
            255.0,
            255.0,
            flower_alpha(flower, 255.0),
        );
        let size = FLOWER_SPRITE_SIZE * flower.size * flower.bloom_progress;
        canvas.blit(
            Sprite::Flower,
            &placement(at, flower.angle),
            Rect::centered(size),
            tint,
        );
        return;
    }

    let alpha = flower_alpha(flower, 180.0);
    let petal = Color::rgba(255.0, 100.0, 150.0, alpha);
    for i in 0..5 {
        let transform = placement(at, TAU / 5.0 * i as f32 + flower.angle);
        canvas.fill_ellipse(
            &transform,
            Point2::new(0.0, -15.0 * flower.size),
            18.0 * flower.size,
            9.0 * flower.size,
            petal,
        );
    }
    canvas.fill_ellipse(
        &placement(at, 0.0),
        Point2::new(0.0, 0.0),
        12.0 * flower.size,
        12.0 * flower.size,
        Color::rgba(255.0, 220.0, 0.0, alpha),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::growth::{create_flower, create_leaf, extend_stem};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn grown_plant() -> Plant {
        let mut rng = StdRng::seed_from_u64(31);
        let mut plant = Plant::new();
        plant.reset(Point2::new(100.0, 200.0), 60.0, 12.0, &mut rng);
        let root = plant.segments()[0].clone();
        let child = extend_stem(&root, &mut rng);
        let leaf = create_leaf(&child, &mut rng);
        let mut flower = create_flower(&child, &mut rng);
        flower.bloom_progress = 1.0;
        plant.segments_mut().push(child);
        plant.leaves_mut().push(leaf);
        plant.flowers_mut().push(flower);
        plant
    }

    #[test]
    fn placement_maps_origin_to_anchor() {
        let m = placement(Point2::new(10.0, 20.0), PI / 2.0);
        let p = apply(&m, Point2::new(0.0, 0.0));
        assert!((p.x - 10.0).abs() < 1e-5 && (p.y - 20.0).abs() < 1e-5);
        let q = apply(&m, Point2::new(1.0, 0.0));
        assert!((q.x - 10.0).abs() < 1e-5 && (q.y - 21.0).abs() < 1e-5);
    }

    #[test]
    fn background_draws_one_line_per_row() {
        let mut canvas = RecordingCanvas::new(40.0, 30.0);
        draw_background(&mut canvas);
        assert_eq!(canvas.commands().len(), 30);
        match canvas.commands()[0] {
            DrawCommand::Line { color, .. } => assert_eq!(color, SKY_TOP),
            ref other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn sprites_are_used_when_available() {
        let plant = grown_plant();
        let mut canvas = RecordingCanvas::with_sprites(200.0, 200.0, &Sprite::ALL);
        draw_plant(&mut canvas, &plant, 0.0);
        let blits: Vec<Sprite> = canvas
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Blit { sprite, .. } => Some(*sprite),
                _ => None,
            })
            .collect();
        assert_eq!(
            blits,
            vec![Sprite::Branch, Sprite::Branch, Sprite::Leaf, Sprite::Flower]
        );
    }

    #[test]
    fn missing_sprites_fall_back_to_shapes() {
        let plant = grown_plant();
        let mut canvas = RecordingCanvas::new(200.0, 200.0);
        draw_plant(&mut canvas, &plant, 0.0);
        let cmds = canvas.commands();
        assert!(!cmds.iter().any(|c| matches!(c, DrawCommand::Blit { .. })));
        // two segments: one stroke plus five ticks each
        let lines = cmds.iter().filter(|c| matches!(c, DrawCommand::Line { .. })).count();
        assert_eq!(lines, 12);
        assert_eq!(
            cmds.iter().filter(|c| matches!(c, DrawCommand::Polygon { .. })).count(),
            1
        );
        // five petals and a centre
        assert_eq!(
            cmds.iter().filter(|c| matches!(c, DrawCommand::Ellipse { .. })).count(),
            6
        );
    }

    #[test]
    fn degenerate_segments_are_skipped() {
        let mut rng = StdRng::seed_from_u64(32);
        let segment = StemSegment::new(
            Point2::new(5.0, 5.0),
            Point2::new(5.0, 5.05),
            0,
            0.0,
            4.0,
            &mut rng,
        );
        let mut canvas = RecordingCanvas::new(10.0, 10.0);
        draw_segment(&mut canvas, &segment, 0.0);
        assert!(canvas.commands().is_empty());
    }

    #[test]
    fn leaf_fades_after_detaching() {
        let plant = grown_plant();
        let mut leaf = plant.leaves()[0].clone();
        assert_eq!(leaf_alpha(&leaf), 255.0);
        leaf.attached = false;
        leaf.age = leaf.max_age + 50;
        assert!((leaf_alpha(&leaf) - 127.5).abs() < 1e-3);
        leaf.age = leaf.max_age + 500;
        assert_eq!(leaf_alpha(&leaf), 0.0);
    }

    #[test]
    fn flower_fades_near_end_of_life() {
        let plant = grown_plant();
        let mut flower = plant.flowers()[0].clone();
        flower.age = 10;
        assert_eq!(flower_alpha(&flower, 255.0), 255.0);
        flower.age = flower.max_age;
        assert_eq!(flower_alpha(&flower, 255.0), 0.0);
        flower.age = flower.max_age - 50;
        assert!((flower_alpha(&flower, 180.0) - 90.0).abs() < 1e-3);
    }

    #[test]
    fn drawing_leaves_plant_untouched() {
        let plant = grown_plant();
        let before = (
            plant.segments().to_vec(),
            plant.leaves().to_vec(),
            plant.flowers().to_vec(),
        );
        let mut canvas = RecordingCanvas::new(200.0, 200.0);
        draw_frame(&mut canvas, &plant, 1.0);
        assert_eq!(before.0, plant.segments());
        assert_eq!(before.1, plant.leaves());
        assert_eq!(before.2, plant.flowers());
    }
}
