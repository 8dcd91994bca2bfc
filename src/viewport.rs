use cgmath::Point2;

/// Size of the drawing surface. The plant is rooted at the horizontal centre
/// of the bottom edge.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    width: f32,
    height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Viewport {
        Viewport { width, height }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    /// Where a freshly reset plant is rooted.
    pub fn plant_base(&self) -> Point2<f32> {
        Point2::new(self.width / 2.0, self.height)
    }

    /// Vertical coordinate of the ground line.
    pub fn base_y(&self) -> f32 {
        self.height
    }

    /// Adopts a new surface size and returns how far the ground line moved.
    pub fn setscreen(&mut self, width: f32, height: f32) -> f32 {
        let delta_y = height - self.height;
        self.width = width;
        self.height = height;
        delta_y
    }
}
