use std::collections::HashSet;

use cgmath::{Matrix3, Point2};

use super::{Canvas, Rect, Sprite};
use crate::color::Color;

/// One recorded drawing call.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Line {
        from: Point2<f32>,
        to: Point2<f32>,
        weight: f32,
        color: Color,
    },
    Ellipse {
        transform: Matrix3<f32>,
        center: Point2<f32>,
        width: f32,
        height: f32,
        color: Color,
    },
    Polygon {
        transform: Matrix3<f32>,
        points: Vec<Point2<f32>>,
        color: Color,
    },
    Blit {
        sprite: Sprite,
        transform: Matrix3<f32>,
        dest: Rect,
        tint: Color,
    },
}

/// A canvas that keeps a list of what was drawn instead of rasterising it.
/// Hosts can replay the list onto their own surface.
#[derive(Clone, Debug, Default)]
pub struct RecordingCanvas {
    width: f32,
    height: f32,
    sprites: HashSet<Sprite>,
    commands: Vec<DrawCommand>,
}

impl RecordingCanvas {
    /// A canvas without any sprites, so everything draws procedurally.
    pub fn new(width: f32, height: f32) -> RecordingCanvas {
        RecordingCanvas {
            width,
            height,
            ..RecordingCanvas::default()
        }
    }

    pub fn with_sprites(width: f32, height: f32, sprites: &[Sprite]) -> RecordingCanvas {
        RecordingCanvas {
            sprites: sprites.iter().copied().collect(),
            ..RecordingCanvas::new(width, height)
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl Canvas for RecordingCanvas {
    fn width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn has_sprite(&self, sprite: Sprite) -> bool {
        self.sprites.contains(&sprite)
    }

    fn line(&mut self, from: Point2<f32>, to: Point2<f32>, weight: f32, color: Color) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            weight,
            color,
        });
    }

    fn fill_ellipse(
        &mut self,
        transform: &Matrix3<f32>,
        center: Point2<f32>,
        width: f32,
        height: f32,
        color: Color,
    ) {
        self.commands.push(DrawCommand::Ellipse {
            transform: *transform,
            center,
            width,
            height,
            color,
        });
    }

    fn fill_polygon(&mut self, transform: &Matrix3<f32>, points: &[Point2<f32>], color: Color) {
        self.commands.push(DrawCommand::Polygon {
            transform: *transform,
            points: points.to_vec(),
            color,
        });
    }

    fn blit(&mut self, sprite: Sprite, transform: &Matrix3<f32>, dest: Rect, tint: Color) {
        self.commands.push(DrawCommand::Blit {
            sprite,
            transform: *transform,
            dest,
            tint,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_calls_in_order_until_cleared() {
        let mut canvas = RecordingCanvas::with_sprites(100.0, 50.0, &[Sprite::Leaf]);
        assert!(canvas.has_sprite(Sprite::Leaf));
        assert!(!canvas.has_sprite(Sprite::Flower));

        let red = Color::rgb(255.0, 0.0, 0.0);
        canvas.line(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0), 2.0, red);
        canvas.blit(Sprite::Leaf, &Matrix3::from_scale(1.0), Rect::centered(4.0), red);
        assert_eq!(canvas.commands().len(), 2);
        assert!(matches!(canvas.commands()[0], DrawCommand::Line { weight, .. } if weight == 2.0));
        assert!(matches!(canvas.commands()[1], DrawCommand::Blit { sprite: Sprite::Leaf, .. }));

        canvas.clear();
        assert!(canvas.commands().is_empty());
        assert_eq!(canvas.width(), 100.0);
    }
}
