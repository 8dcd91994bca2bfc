/// RGBA colour with channels on a 0-255 scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Color {
        Color { r, g, b, a: 255.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Color {
        Color { r, g, b, a }
    }

    /// Linear blend towards `other`; `t` is clamped to [0, 1].
    pub fn lerp(self, other: Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        Color {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
            a: self.a + (other.a - self.a) * t,
        }
    }

    pub fn with_alpha(self, a: f32) -> Color {
        Color { a, ..self }
    }

    /// Subtracts per-channel amounts, saturating at zero.
    pub fn darken(self, dr: f32, dg: f32, db: f32) -> Color {
        Color {
            r: (self.r - dr).max(0.0),
            g: (self.g - dg).max(0.0),
            b: (self.b - db).max(0.0),
            a: self.a,
        }
    }

    /// Channels clamped and rounded to bytes.
    pub fn to_bytes(self) -> [u8; 4] {
        let q = |c: f32| c.clamp(0.0, 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }
}
