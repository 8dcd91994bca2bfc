//! Software canvas that rasterises into an [`image::RgbaImage`].
//!
//! Shapes are filled per pixel centre inside their transformed bounding box;
//! sprites are sampled nearest-neighbour through the inverse transform.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use cgmath::{InnerSpace, Matrix3, Point2, SquareMatrix, Vector2};
use image::{Rgba, RgbaImage};
use tracing::{debug, warn};

use super::{apply, Canvas, Rect, Sprite};
use crate::color::Color;
use crate::error::{Error, Result};

pub struct RasterCanvas {
    target: RgbaImage,
    sprites: HashMap<Sprite, RgbaImage>,
}

/// Inclusive pixel bounds clipped to the target.
struct PixelBounds {
    x0: u32,
    y0: u32,
    x1: u32,
    y1: u32,
}

impl RasterCanvas {
    pub fn new(width: u32, height: u32) -> RasterCanvas {
        RasterCanvas {
            target: RgbaImage::new(width.max(1), height.max(1)),
            sprites: HashMap::new(),
        }
    }

    /// Loads whichever sprites exist in `dir`. Missing files are skipped and
    /// undecodable ones are logged and skipped, so the renderer falls back to
    /// procedural shapes for them.
    pub fn load_sprites(&mut self, dir: &Path) -> usize {
        for sprite in Sprite::ALL {
            let path = dir.join(sprite.file_name());
            if !path.is_file() {
                debug!(path = %path.display(), "sprite not found, using fallback");
                continue;
            }
            match load_sprite(&path) {
                Ok(image) => {
                    self.sprites.insert(sprite, image);
                }
                Err(err) => warn!(%err, "using procedural fallback"),
            }
        }
        self.sprites.len()
    }

    pub fn insert_sprite(&mut self, sprite: Sprite, image: RgbaImage) {
        self.sprites.insert(sprite, image);
    }

    pub fn image(&self) -> &RgbaImage {
        &self.target
    }

    pub fn into_image(self) -> RgbaImage {
        self.target
    }

    pub fn save_png(&self, path: &Path) -> Result<()> {
        self.target.save(path).map_err(|source| Error::ImageWrite {
            path: path.to_path_buf(),
            source,
        })
    }

    fn bounds(&self, points: impl IntoIterator<Item = Point2<f32>>) -> Option<PixelBounds> {
        let (mut min_x, mut min_y) = (f32::INFINITY, f32::INFINITY);
        let (mut max_x, mut max_y) = (f32::NEG_INFINITY, f32::NEG_INFINITY);
        for p in points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        let w = self.target.width() as f32;
        let h = self.target.height() as f32;
        if !(max_x >= 0.0 && max_y >= 0.0 && min_x < w && min_y < h) {
            return None;
        }
        Some(PixelBounds {
            x0: min_x.max(0.0).floor() as u32,
            y0: min_y.max(0.0).floor() as u32,
            x1: (max_x.ceil().min(w - 1.0)) as u32,
            y1: (max_y.ceil().min(h - 1.0)) as u32,
        })
    }

    /// Source-over blend of `color` onto one pixel.
    fn blend(&mut self, x: u32, y: u32, color: Color) {
        let [r, g, b, a] = color.to_bytes();
        if a == 0 {
            return;
        }
        let alpha = a as f32 / 255.0;
        let dst = self.target.get_pixel_mut(x, y);
        let mix = |s: u8, d: u8| (s as f32 * alpha + d as f32 * (1.0 - alpha)).round() as u8;
        let out_a = (a as f32 + dst[3] as f32 * (1.0 - alpha)).round().min(255.0) as u8;
        *dst = Rgba([mix(r, dst[0]), mix(g, dst[1]), mix(b, dst[2]), out_a]);
    }

    fn fill_where(&mut self, bounds: PixelBounds, color: Color, inside: impl Fn(Point2<f32>) -> bool) {
        for y in bounds.y0..=bounds.y1 {
            for x in bounds.x0..=bounds.x1 {
                if inside(Point2::new(x as f32 + 0.5, y as f32 + 0.5)) {
                    self.blend(x, y, color);
                }
            }
        }
    }
}

fn load_sprite(path: &Path) -> Result<RgbaImage> {
    let image = image::open(path).map_err(|source| Error::Sprite {
        path: PathBuf::from(path),
        source,
    })?;
    Ok(image.to_rgba8())
}

fn distance_to_segment(p: Point2<f32>, a: Point2<f32>, b: Point2<f32>) -> f32 {
    let ab: Vector2<f32> = b - a;
    let len2 = ab.magnitude2();
    if len2 == 0.0 {
        return (p - a).magnitude();
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    (p - (a + ab * t)).magnitude()
}

/// Even-odd point in polygon test.
fn polygon_contains(points: &[Point2<f32>], p: Point2<f32>) -> bool {
    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (a, b) = (points[i], points[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn rect_corners(transform: &Matrix3<f32>, r: Rect) -> [Point2<f32>; 4] {
    [
        apply(transform, Point2::new(r.x, r.y)),
        apply(transform, Point2::new(r.x + r.w, r.y)),
        apply(transform, Point2::new(r.x, r.y + r.h)),
        apply(transform, Point2::new(r.x + r.w, r.y + r.h)),
    ]
}

impl Canvas for RasterCanvas {
    fn width(&self) -> f32 {
        self.target.width() as f32
    }

    fn height(&self) -> f32 {
        self.target.height() as f32
    }

    fn has_sprite(&self, sprite: Sprite) -> bool {
        self.sprites
            .get(&sprite)
            .is_some_and(|img| img.width() > 0 && img.height() > 0)
    }

    fn line(&mut self, from: Point2<f32>, to: Point2<f32>, weight: f32, color: Color) {
        let half = weight.max(1.0) / 2.0;
        let pad = Vector2::new(half, half);
        let Some(bounds) = self.bounds([from - pad, from + pad, to - pad, to + pad]) else {
            return;
        };
        self.fill_where(bounds, color, |p| distance_to_segment(p, from, to) <= half);
    }

    fn fill_ellipse(
        &mut self,
        transform: &Matrix3<f32>,
        center: Point2<f32>,
        width: f32,
        height: f32,
        color: Color,
    ) {
        let (rx, ry) = (width / 2.0, height / 2.0);
        if rx <= 0.0 || ry <= 0.0 {
            return;
        }
        let Some(inverse) = transform.invert() else {
            return;
        };
        let local = Rect::new(center.x - rx, center.y - ry, width, height);
        let Some(bounds) = self.bounds(rect_corners(transform, local)) else {
            return;
        };
        self.fill_where(bounds, color, |p| {
            let q = apply(&inverse, p);
            let dx = (q.x - center.x) / rx;
            let dy = (q.y - center.y) / ry;
            dx * dx + dy * dy <= 1.0
        });
    }

    fn fill_polygon(&mut self, transform: &Matrix3<f32>, points: &[Point2<f32>], color: Color) {
        if points.len() < 3 {
            return;
        }
        let device: Vec<Point2<f32>> = points.iter().map(|&p| apply(transform, p)).collect();
        let Some(bounds) = self.bounds(device.iter().copied()) else {
            return;
        };
        self.fill_where(bounds, color, |p| polygon_contains(&device, p));
    }

    fn blit(&mut self, sprite: Sprite, transform: &Matrix3<f32>, dest: Rect, tint: Color) {
        if dest.w <= 0.0 || dest.h <= 0.0 {
            return;
        }
        let Some(inverse) = transform.invert() else {
            return;
        };
        let Some(bounds) = self.bounds(rect_corners(transform, dest)) else {
            return;
        };
        let Some(source) = self.sprites.remove(&sprite) else {
            return;
        };
        let (sw, sh) = (source.width(), source.height());
        if sw > 0 && sh > 0 {
            for y in bounds.y0..=bounds.y1 {
                for x in bounds.x0..=bounds.x1 {
                    let q = apply(&inverse, Point2::new(x as f32 + 0.5, y as f32 + 0.5));
                    let u = (q.x - dest.x) / dest.w;
                    let v = (q.y - dest.y) / dest.h;
                    if !(0.0..1.0).contains(&u) || !(0.0..1.0).contains(&v) {
                        continue;
                    }
                    let sx = ((u * sw as f32) as u32).min(sw - 1);
                    let sy = ((v * sh as f32) as u32).min(sh - 1);
                    let texel = source.get_pixel(sx, sy);
                    let color = Color::rgba(
                        texel[0] as f32 * tint.r / 255.0,
                        texel[1] as f32 * tint.g / 255.0,
                        texel[2] as f32 * tint.b / 255.0,
                        texel[3] as f32 * tint.a / 255.0,
                    );
                    self.blend(x, y, color);
                }
            }
        }
        self.sprites.insert(sprite, source);
    }
}
