use std::{f64::consts::PI, path::Path};

use anyhow::Context as _;

use crate::{
    ease::Ease,
    foundation::core::Units,
    foundation::error::{DiagramError, DiagramResult},
};

/// Hand silhouette of the reference board, left hand, millimeters, y-up.
///
/// Points 2 and 3 coincide: the duplicate marks a straight run in the drawing.
pub const REFERENCE_OUTLINE_MM: [(f64, f64); 21] = [
    (0.0, 0.0),
    (19.0, 2.0),
    (38.0, 17.0),
    (38.0, 17.0),
    (57.0, 22.0),
    (80.0, 22.0),
    (95.0, 16.0),
    (114.0, 13.0),
    (122.0, -2.0),
    (140.0, -2.0),
    (140.0, -64.0),
    (160.0, -84.0),
    (152.0, -104.0),
    (132.419, -110.926),
    (118.807, -97.418),
    (102.451, -87.931),
    (84.0, -83.0),
    (46.0, -83.0),
    (24.0, -81.0),
    (0.0, -76.0),
    (-7.0, -38.5),
];

/// Thumb key displacement, left hand, millimeters (+x right, +y down).
pub const REFERENCE_THUMB_OFFSETS_MM: [(f64, f64); 6] = [
    (46.0, 9.95),
    (46.0, 9.95),
    (46.0 + 2.191, 9.95 + 2.79),
    (46.0 + 2.191 + 0.747, 9.95 + 2.79 + 8.179),
    (46.0 + 2.191 + 0.747 - 2.043, 9.95 + 2.79 + 8.179 + 13.011),
    (
        46.0 + 2.191 + 0.747 - 2.043 - 5.565,
        9.95 + 2.79 + 8.179 + 13.011 - 13.435,
    ),
];

pub const REFERENCE_THUMB_ANGLES: [f64; 6] = [
    0.0,
    0.0,
    -PI / 12.0,
    -PI / 12.0 * 2.0,
    -PI / 12.0 * 3.0,
    -PI / 12.0 * 3.0,
];

/// Upper bound on `rows * cols`; every key becomes a shape and a reveal phase.
pub const MAX_KEYS_PER_HAND: usize = 4096;
pub const MAX_SPIRAL_COUNT: usize = 4096;

pub const REFERENCE_COLUMN_STAGGER_MM: [f64; 6] = [22.0, 20.0, 5.0, 0.0, 6.0, 9.0];

/// Full layout and choreography description.
///
/// Everything the builder places is derived from these values; unspecified JSON
/// fields fall back to the reference board.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub rows: usize,
    pub cols: usize,

    pub unit: f64,
    pub mm_to_unit: f64,
    /// Switch side is `unit - switch_inset_mm * mm_to_unit`.
    pub switch_inset_mm: f64,
    /// Corner radius as a fraction of the switch side.
    pub switch_corner_ratio: f64,

    /// Final distance between the hand grid origins, in key pitches.
    pub gap: f64,
    /// Distance between the hand grid origins while the grid is revealed.
    pub staging_gap: f64,
    /// Height of row 0 above the horizontal midline, in key pitches.
    pub top_row_offset: f64,

    pub run_time: f64,
    pub grid_reveal_divisor: f64,
    pub outline_run_time: f64,
    /// Seconds the finished diagram stays on screen after the last phase.
    pub final_hold: f64,
    pub ease: Ease,

    pub thumb_offsets_mm: Vec<(f64, f64)>,
    pub thumb_angles: Vec<f64>,
    pub column_stagger_mm: Vec<f64>,
    /// Relaxed-hand correction; left rotates by the negation.
    pub hand_angle: f64,

    pub outline_points_mm: Vec<(f64, f64)>,
    pub outline_anchor: OutlineAnchor,

    pub cable: CableConfig,
}

/// Where outline point `(0, 0)` lands for the left hand.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct OutlineAnchor {
    /// Extra key pitches past `gap / 2`, away from the midline.
    pub margin_keys: f64,
    pub rise_keys: f64,
    pub drop_mm: f64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CableConfig {
    /// Jack outline `(width, height)`.
    pub connector_size_mm: (f64, f64),
    /// Jack center relative to the left outline anchor.
    pub connector_offset_mm: (f64, f64),
    /// Left jack rotates by the negation.
    pub connector_angle: f64,
    /// Left cable run `[start, handle, handle, end]`, absolute.
    pub bezier_mm: [(f64, f64); 4],
    pub spiral_count: usize,
    pub spiral_pitch_mm: f64,
    /// Coil segment `i` sits at `spiral_start_x_mm + (i + 1) * spiral_pitch_mm`.
    pub spiral_start_x_mm: f64,
    pub spiral_top_mm: f64,
    pub spiral_bottom_mm: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self::reference()
    }
}

impl Default for OutlineAnchor {
    fn default() -> Self {
        Self {
            margin_keys: 0.5,
            rise_keys: 3.0 + 0.5,
            drop_mm: 22.0,
        }
    }
}

impl Default for CableConfig {
    fn default() -> Self {
        Self {
            connector_size_mm: (4.0, 8.0),
            // 106 mm plus two key pitches.
            connector_offset_mm: (106.0 + 2.0 * 19.0, -72.0),
            connector_angle: PI / 4.0 + PI / 24.0,
            bezier_mm: [(-57.0, -25.0), (-45.0, -15.0), (-45.0, -15.0), (-45.0, 30.0)],
            spiral_count: 29,
            spiral_pitch_mm: 3.0,
            spiral_start_x_mm: -45.0,
            spiral_top_mm: 30.0,
            spiral_bottom_mm: 20.0,
        }
    }
}

impl LayoutConfig {
    /// The 5x6 split board the diagram was drawn from.
    pub fn reference() -> Self {
        Self {
            rows: 5,
            cols: 6,
            unit: 0.6,
            mm_to_unit: 1.0 / 19.0,
            switch_inset_mm: 1.0,
            switch_corner_ratio: 0.1,
            gap: 20.5,
            staging_gap: 11.0,
            top_row_offset: 3.0,
            run_time: 0.5,
            grid_reveal_divisor: 5.0,
            outline_run_time: 0.5,
            final_hold: 10.0,
            ease: Ease::Smooth,
            thumb_offsets_mm: REFERENCE_THUMB_OFFSETS_MM.to_vec(),
            thumb_angles: REFERENCE_THUMB_ANGLES.to_vec(),
            column_stagger_mm: REFERENCE_COLUMN_STAGGER_MM.to_vec(),
            hand_angle: PI / 24.0,
            outline_points_mm: REFERENCE_OUTLINE_MM.to_vec(),
            outline_anchor: OutlineAnchor::default(),
            cable: CableConfig::default(),
        }
    }

    pub fn from_json_str(s: &str) -> DiagramResult<Self> {
        let cfg: Self = serde_json::from_str(s)?;
        Ok(cfg)
    }

    pub fn from_path(path: &Path) -> DiagramResult<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read layout config '{}'", path.display()))?;
        Self::from_json_str(&s)
    }

    pub fn units(&self) -> Units {
        Units {
            unit: self.unit,
            mm_to_unit: self.mm_to_unit,
        }
    }

    pub fn switch_size(&self) -> f64 {
        self.unit - self.switch_inset_mm * self.mm_to_unit
    }

    pub fn nonzero_stagger_columns(&self) -> usize {
        self.column_stagger_mm.iter().filter(|o| **o != 0.0).count()
    }

    /// Number of phases `build` emits for this configuration.
    pub fn expected_phase_count(&self) -> usize {
        // separate, thumb rotate, thumb translate, outline, hand rotate,
        // two connectors, two cable runs
        self.rows * self.cols + self.nonzero_stagger_columns() + self.cable.spiral_count + 9
    }

    pub fn validate(&self) -> DiagramResult<()> {
        if self.rows == 0 {
            return Err(DiagramError::config("rows", "must be > 0"));
        }
        if self.cols == 0 {
            return Err(DiagramError::config("cols", "must be > 0"));
        }
        if self.cable.spiral_count == 0 {
            return Err(DiagramError::config("cable.spiral_count", "must be > 0"));
        }

        expect_len("thumb_offsets_mm", self.thumb_offsets_mm.len(), self.cols)?;
        expect_len("thumb_angles", self.thumb_angles.len(), self.cols)?;
        expect_len("column_stagger_mm", self.column_stagger_mm.len(), self.cols)?;

        match self.rows.checked_mul(self.cols) {
            Some(keys) if keys <= MAX_KEYS_PER_HAND => {}
            _ => {
                return Err(DiagramError::config(
                    "rows",
                    format!(
                        "{} x {} grid exceeds {MAX_KEYS_PER_HAND} keys per hand",
                        self.rows, self.cols
                    ),
                ));
            }
        }
        if self.cable.spiral_count > MAX_SPIRAL_COUNT {
            return Err(DiagramError::config(
                "cable.spiral_count",
                format!("must be <= {MAX_SPIRAL_COUNT}"),
            ));
        }

        if self.outline_points_mm.len() < 3 {
            return Err(DiagramError::config(
                "outline_points_mm",
                format!(
                    "polygon needs at least 3 points, got {}",
                    self.outline_points_mm.len()
                ),
            ));
        }

        expect_positive("unit", self.unit)?;
        expect_positive("mm_to_unit", self.mm_to_unit)?;
        expect_positive("run_time", self.run_time)?;
        expect_positive("grid_reveal_divisor", self.grid_reveal_divisor)?;
        expect_non_negative("outline_run_time", self.outline_run_time)?;
        expect_non_negative("final_hold", self.final_hold)?;
        expect_non_negative("switch_inset_mm", self.switch_inset_mm)?;
        expect_non_negative("switch_corner_ratio", self.switch_corner_ratio)?;
        if self.switch_size() <= 0.0 {
            return Err(DiagramError::config(
                "switch_inset_mm",
                "inset leaves no room for the switch",
            ));
        }

        expect_finite("gap", [self.gap])?;
        expect_finite("staging_gap", [self.staging_gap])?;
        expect_finite("top_row_offset", [self.top_row_offset])?;
        expect_finite("hand_angle", [self.hand_angle])?;
        expect_finite("thumb_angles", self.thumb_angles.iter().copied())?;
        expect_finite("column_stagger_mm", self.column_stagger_mm.iter().copied())?;
        expect_finite("thumb_offsets_mm", flatten(&self.thumb_offsets_mm))?;
        expect_finite("outline_points_mm", flatten(&self.outline_points_mm))?;
        expect_finite(
            "outline_anchor",
            [
                self.outline_anchor.margin_keys,
                self.outline_anchor.rise_keys,
                self.outline_anchor.drop_mm,
            ],
        )?;

        self.cable.validate()
    }
}

impl CableConfig {
    fn validate(&self) -> DiagramResult<()> {
        let (w, h) = self.connector_size_mm;
        expect_positive("cable.connector_size_mm", w)?;
        expect_positive("cable.connector_size_mm", h)?;
        expect_finite("cable.connector_offset_mm", flatten(&[self.connector_offset_mm]))?;
        expect_finite("cable.connector_angle", [self.connector_angle])?;
        expect_finite("cable.bezier_mm", flatten(&self.bezier_mm))?;
        expect_finite(
            "cable.spiral",
            [
                self.spiral_pitch_mm,
                self.spiral_start_x_mm,
                self.spiral_top_mm,
                self.spiral_bottom_mm,
            ],
        )?;
        Ok(())
    }
}

fn flatten(points: &[(f64, f64)]) -> impl Iterator<Item = f64> + '_ {
    points.iter().flat_map(|(x, y)| [*x, *y])
}

fn expect_len(field: &'static str, got: usize, cols: usize) -> DiagramResult<()> {
    if got != cols {
        return Err(DiagramError::config(
            field,
            format!("expected {cols} entries (one per column), got {got}"),
        ));
    }
    Ok(())
}

fn expect_positive(field: &'static str, v: f64) -> DiagramResult<()> {
    if !v.is_finite() || v <= 0.0 {
        return Err(DiagramError::config(
            field,
            format!("must be finite and > 0, got {v}"),
        ));
    }
    Ok(())
}

fn expect_non_negative(field: &'static str, v: f64) -> DiagramResult<()> {
    if !v.is_finite() || v < 0.0 {
        return Err(DiagramError::config(
            field,
            format!("must be finite and >= 0, got {v}"),
        ));
    }
    Ok(())
}

fn expect_finite(field: &'static str, vals: impl IntoIterator<Item = f64>) -> DiagramResult<()> {
    if vals.into_iter().any(|v| !v.is_finite()) {
        return Err(DiagramError::config(field, "values must be finite"));
    }
    Ok(())
}
