use kurbo::Shape as _;

use crate::foundation::core::{
    Affine, BezPath, CubicBez, Hand, Line, Point, Rect, Vec2, affine_rotation,
};

/// Tolerance used when flattening rounded corners into path segments.
const PATH_TOLERANCE: f64 = 1e-3;

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct ShapeId(pub u32);

impl ShapeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// What a shape stands for in the diagram.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Role {
    Switch { hand: Hand, row: usize, col: usize },
    Outline { hand: Hand },
    Connector { hand: Hand },
    CableSegment { hand: Hand },
    Coil { index: usize },
}

impl Role {
    pub fn hand(self) -> Option<Hand> {
        match self {
            Self::Switch { hand, .. }
            | Self::Outline { hand }
            | Self::Connector { hand }
            | Self::CableSegment { hand } => Some(hand),
            Self::Coil { .. } => None,
        }
    }
}

/// Local geometry, before the shape's placement transform.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Geometry {
    /// Centered on the local origin.
    RoundedSquare { size: f64, corner_radius: f64 },
    /// Centered on the local origin.
    Rect { width: f64, height: f64 },
    /// Closed polygon; consecutive duplicates are kept.
    Polygon { points: Vec<Point> },
    Cubic { curve: CubicBez },
    Segment { line: Line },
}

impl Geometry {
    pub fn to_local_path(&self) -> BezPath {
        match self {
            Self::RoundedSquare {
                size,
                corner_radius,
            } => Rect::from_center_size(Point::ORIGIN, (*size, *size))
                .to_rounded_rect(*corner_radius)
                .to_path(PATH_TOLERANCE),
            Self::Rect { width, height } => {
                Rect::from_center_size(Point::ORIGIN, (*width, *height)).to_path(PATH_TOLERANCE)
            }
            Self::Polygon { points } => {
                let mut path = BezPath::new();
                let mut iter = points.iter();
                if let Some(first) = iter.next() {
                    path.move_to(*first);
                    for p in iter {
                        path.line_to(*p);
                    }
                    path.close_path();
                }
                path
            }
            Self::Cubic { curve } => {
                let mut path = BezPath::new();
                path.move_to(curve.p0);
                path.curve_to(curve.p1, curve.p2, curve.p3);
                path
            }
            Self::Segment { line } => {
                let mut path = BezPath::new();
                path.move_to(line.p0);
                path.line_to(line.p1);
                path
            }
        }
    }

    /// Whether the shape has an interior worth filling.
    pub fn is_closed(&self) -> bool {
        matches!(
            self,
            Self::RoundedSquare { .. } | Self::Rect { .. } | Self::Polygon { .. }
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Style {
    pub stroke_width: f64,
    pub stroke_opacity: f64,
    /// `0.0` leaves the shape unfilled.
    pub fill_opacity: f64,
}

impl Style {
    pub const SWITCH: Style = Style {
        stroke_width: 2.0,
        stroke_opacity: 1.0,
        fill_opacity: 0.4,
    };

    pub const LINEWORK: Style = Style {
        stroke_width: 2.0,
        stroke_opacity: 0.5,
        fill_opacity: 0.0,
    };
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Shape {
    pub id: ShapeId,
    pub role: Role,
    pub geometry: Geometry,
    /// Placement in render space; only ever a rigid motion.
    pub transform: Affine,
    pub style: Style,
}

impl Shape {
    pub fn world_path(&self) -> BezPath {
        let mut path = self.geometry.to_local_path();
        path.apply_affine(self.transform);
        path
    }

    pub fn bounding_box(&self) -> Rect {
        self.world_path().bounding_box()
    }

    /// Placement origin in render space (the center for switches and connectors).
    pub fn position(&self) -> Point {
        self.transform * Point::ORIGIN
    }

    pub fn rotation(&self) -> f64 {
        affine_rotation(self.transform)
    }

    pub fn apply(&mut self, motion: Affine) {
        self.transform = motion * self.transform;
    }
}

/// Owned store of every shape in the diagram, addressable by id or grid cell.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ShapeArena {
    rows: usize,
    cols: usize,
    shapes: Vec<Shape>,
    /// Row-major switch ids, indexed by `Hand::index()`.
    switches: [Vec<ShapeId>; 2],
}

impl ShapeArena {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            shapes: Vec::new(),
            switches: [Vec::new(), Vec::new()],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn insert(
        &mut self,
        role: Role,
        geometry: Geometry,
        transform: Affine,
        style: Style,
    ) -> ShapeId {
        let id = ShapeId(self.shapes.len() as u32);
        if let Role::Switch { hand, row, col } = role {
            debug_assert_eq!(self.switches[hand.index()].len(), row * self.cols + col);
            self.switches[hand.index()].push(id);
        }
        self.shapes.push(Shape {
            id,
            role,
            geometry,
            transform,
            style,
        });
        id
    }

    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.get(id.index())
    }

    pub fn get_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.shapes.get_mut(id.index())
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn switch(&self, hand: Hand, row: usize, col: usize) -> Option<ShapeId> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.switches[hand.index()].get(row * self.cols + col).copied()
    }

    pub fn switches(&self, hand: Hand) -> &[ShapeId] {
        &self.switches[hand.index()]
    }

    /// The last grid row, addressed by column.
    pub fn thumb_cluster(&self, hand: Hand) -> &[ShapeId] {
        let all = self.switches(hand);
        let start = all.len().saturating_sub(self.cols);
        &all[start..]
    }

    /// Non-thumb switches of one column, top to bottom.
    pub fn column_above_thumbs(&self, hand: Hand, col: usize) -> Vec<ShapeId> {
        (0..self.rows.saturating_sub(1))
            .filter_map(|row| self.switch(hand, row, col))
            .collect()
    }

    pub fn find(&self, role: Role) -> Option<ShapeId> {
        self.shapes.iter().find(|s| s.role == role).map(|s| s.id)
    }

    /// Every shape that moves with one hand: its switches and its outline.
    pub fn hand_assembly(&self, hand: Hand) -> Vec<ShapeId> {
        self.shapes
            .iter()
            .filter(|s| {
                matches!(
                    s.role,
                    Role::Switch { hand: h, .. } | Role::Outline { hand: h } if h == hand
                )
            })
            .map(|s| s.id)
            .collect()
    }

    /// Union of the members' bounding boxes.
    pub fn bounds_of(&self, ids: &[ShapeId]) -> Option<Rect> {
        ids.iter()
            .filter_map(|id| self.get(*id))
            .map(Shape::bounding_box)
            .reduce(|a, b| a.union(b))
    }

    pub fn translate(&mut self, id: ShapeId, by: Vec2) {
        if let Some(s) = self.get_mut(id) {
            s.apply(Affine::translate(by));
        }
    }
}
