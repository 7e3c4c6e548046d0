use crate::{
    ease::Ease,
    foundation::core::{Affine, Hand, Point, Vec2},
    shapes::{ShapeArena, ShapeId},
};

/// How a driver should bring a shape on screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevealStyle {
    /// Stroke the border, then fade the fill in.
    DrawBorderThenFill,
    /// Stroke the path from start to end; no fill.
    Create,
}

/// A single change applied to one shape.
///
/// Motions are world-space and carry their own pivot, so an operation means the same thing
/// no matter which phase came before it.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    Reveal { style: RevealStyle },
    Translate { by: Vec2 },
    Rotate { angle: f64, pivot: Point },
    /// Member of a rigid per-hand rotation; every member shares `angle` and `pivot`.
    RotateGroup { hand: Hand, angle: f64, pivot: Point },
    /// Member of a rigid per-hand translation.
    TranslateGroup { hand: Hand, by: Vec2 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpKind {
    Reveal,
    Translate,
    Rotate,
    RotateGroup,
    TranslateGroup,
}

impl Operation {
    pub fn kind(&self) -> OpKind {
        match self {
            Self::Reveal { .. } => OpKind::Reveal,
            Self::Translate { .. } => OpKind::Translate,
            Self::Rotate { .. } => OpKind::Rotate,
            Self::RotateGroup { .. } => OpKind::RotateGroup,
            Self::TranslateGroup { .. } => OpKind::TranslateGroup,
        }
    }

    pub fn is_reveal(&self) -> bool {
        matches!(self, Self::Reveal { .. })
    }

    /// World-space motion after `progress` (0..1) of the operation; reveals don't move.
    pub fn motion_at(&self, progress: f64) -> Affine {
        match *self {
            Self::Reveal { .. } => Affine::IDENTITY,
            Self::Translate { by } | Self::TranslateGroup { by, .. } => {
                Affine::translate(by * progress)
            }
            Self::Rotate { angle, pivot } | Self::RotateGroup { angle, pivot, .. } => {
                Affine::rotate_about(angle * progress, pivot)
            }
        }
    }

    pub fn motion(&self) -> Affine {
        self.motion_at(1.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PhaseOp {
    pub shape: ShapeId,
    pub op: Operation,
}

/// Which step of the construction a phase belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum PhaseKind {
    GridReveal { row: usize, col: usize },
    Separate,
    ThumbRotate,
    ThumbTranslate,
    ColumnStagger { col: usize },
    OutlineReveal,
    HandRotate,
    ConnectorReveal { hand: Hand },
    CableReveal { hand: Hand },
    CoilReveal { index: usize },
}

/// One sequential step; its operations are independent and run concurrently.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Phase {
    pub kind: PhaseKind,
    pub ops: Vec<PhaseOp>,
    /// Seconds.
    pub duration: f64,
    pub ease: Ease,
}

impl Phase {
    pub fn touches(&self, id: ShapeId) -> bool {
        self.ops.iter().any(|o| o.shape == id)
    }

    pub fn op_kinds(&self) -> impl Iterator<Item = OpKind> + '_ {
        self.ops.iter().map(|o| o.op.kind())
    }

    /// Moves the phase's shapes as if `progress` (0..1, already eased) of it had run.
    pub fn apply_to(&self, arena: &mut ShapeArena, progress: f64) {
        for entry in &self.ops {
            if entry.op.is_reveal() {
                continue;
            }
            if let Some(shape) = arena.get_mut(entry.shape) {
                shape.apply(entry.op.motion_at(progress));
            }
        }
    }
}

pub fn total_duration(phases: &[Phase]) -> f64 {
    phases.iter().map(|p| p.duration).sum()
}
