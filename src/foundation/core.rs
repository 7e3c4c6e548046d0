pub use kurbo::{Affine, BezPath, CubicBez, Line, Point, Rect, Vec2};

/// Which half of the split keyboard a shape belongs to.
///
/// Layout values are authored for the left hand. The right hand is the mirror image
/// about the vertical midline (`x = 0`).
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Hand {
    Left,
    Right,
}

impl Hand {
    pub const BOTH: [Hand; 2] = [Hand::Left, Hand::Right];

    pub fn index(self) -> usize {
        match self {
            Self::Left => 0,
            Self::Right => 1,
        }
    }

    /// Horizontal sign applied to left-hand authored values.
    pub fn sign(self) -> f64 {
        match self {
            Self::Left => 1.0,
            Self::Right => -1.0,
        }
    }

    pub fn mirror_x(self, x: f64) -> f64 {
        x * self.sign()
    }

    pub fn mirror_vec(self, v: Vec2) -> Vec2 {
        Vec2::new(self.mirror_x(v.x), v.y)
    }

    pub fn mirror_point(self, p: Point) -> Point {
        Point::new(self.mirror_x(p.x), p.y)
    }

    /// Rotations flip direction under a horizontal mirror.
    pub fn mirror_angle(self, rad: f64) -> f64 {
        rad * self.sign()
    }

    pub fn other(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// Conversion from physical and grid measurements into render space.
///
/// Design space is y-up: `UP = +y`, `RIGHT = +x`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Units {
    /// Render length of one key pitch.
    pub unit: f64,
    /// Key pitches per millimeter.
    pub mm_to_unit: f64,
}

impl Units {
    pub fn mm(self, v: f64) -> f64 {
        v * self.mm_to_unit * self.unit
    }

    pub fn keys(self, v: f64) -> f64 {
        v * self.unit
    }

    pub fn mm_vec(self, (x, y): (f64, f64)) -> Vec2 {
        Vec2::new(self.mm(x), self.mm(y))
    }

    pub fn mm_point(self, xy: (f64, f64)) -> Point {
        self.mm_vec(xy).to_point()
    }
}

/// Rotation component of a rigid transform, in radians.
pub fn affine_rotation(t: Affine) -> f64 {
    let [a, b, _c, _d, _e, _f] = t.as_coeffs();
    b.atan2(a)
}
