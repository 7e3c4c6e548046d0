use crate::{
    config::LayoutConfig,
    foundation::core::{Affine, CubicBez, Hand, Line, Point, Units, Vec2},
    foundation::error::DiagramResult,
    phase::{Operation, Phase, PhaseKind, PhaseOp, RevealStyle, total_duration},
    shapes::{Geometry, Role, ShapeArena, ShapeId, Style},
};

/// Built diagram: initial shape placements plus the ordered reveal phases.
///
/// Replaying `phases` in order over `shapes` reproduces the final layout; see
/// [`Timeline`](crate::Timeline).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Diagram {
    pub config: LayoutConfig,
    pub shapes: ShapeArena,
    pub phases: Vec<Phase>,
}

impl Diagram {
    pub fn total_duration(&self) -> f64 {
        total_duration(&self.phases)
    }

    /// Geometry after every phase has run.
    pub fn final_shapes(&self) -> ShapeArena {
        let mut arena = self.shapes.clone();
        for phase in &self.phases {
            phase.apply_to(&mut arena, 1.0);
        }
        arena
    }

    pub fn count_shapes(&self, pred: impl Fn(Role) -> bool) -> usize {
        self.shapes.shapes().iter().filter(|s| pred(s.role)).count()
    }
}

/// Computes diagram geometry and the phase list from a [`LayoutConfig`].
///
/// Phases are emitted against a working copy of the arena so that pivots and group
/// centers are taken from the geometry each phase actually starts from.
pub struct DiagramBuilder {
    cfg: LayoutConfig,
    units: Units,
    arena: ShapeArena,
    phases: Vec<Phase>,
}

impl DiagramBuilder {
    pub fn new(cfg: LayoutConfig) -> Self {
        let units = cfg.units();
        let arena = ShapeArena::new(cfg.rows, cfg.cols);
        Self {
            cfg,
            units,
            arena,
            phases: Vec::new(),
        }
    }

    #[tracing::instrument(skip(self), fields(rows = self.cfg.rows, cols = self.cfg.cols))]
    pub fn build(mut self) -> DiagramResult<Diagram> {
        self.cfg.validate()?;

        self.place_grids();
        self.place_outlines();
        self.place_cable();
        let initial = self.arena.clone();

        self.reveal_grid();
        self.separate_hands();
        self.rotate_thumbs();
        self.translate_thumbs();
        self.stagger_columns();
        self.reveal_outlines();
        self.rotate_hands();
        self.reveal_cable();

        tracing::debug!(
            shapes = initial.len(),
            phases = self.phases.len(),
            duration = total_duration(&self.phases),
            "diagram built"
        );

        Ok(Diagram {
            config: self.cfg,
            shapes: initial,
            phases: self.phases,
        })
    }

    fn place_grids(&mut self) {
        let size = self.cfg.switch_size();
        let geometry = Geometry::RoundedSquare {
            size,
            corner_radius: self.cfg.switch_corner_ratio * size,
        };
        let half = self.cfg.staging_gap / 2.0;

        for hand in Hand::BOTH {
            for row in 0..self.cfg.rows {
                for col in 0..self.cfg.cols {
                    let center = Point::new(
                        hand.mirror_x(self.units.keys(col as f64 - half)),
                        self.units.keys(self.cfg.top_row_offset - row as f64),
                    );
                    self.arena.insert(
                        Role::Switch { hand, row, col },
                        geometry.clone(),
                        Affine::translate(center.to_vec2()),
                        Style::SWITCH,
                    );
                }
            }
        }
    }

    /// Where outline point `(0, 0)` lands for `hand`.
    fn outline_anchor(&self, hand: Hand) -> Point {
        let a = &self.cfg.outline_anchor;
        Point::new(
            hand.mirror_x(-self.units.keys(self.cfg.gap / 2.0 + a.margin_keys)),
            self.units.keys(a.rise_keys) - self.units.mm(a.drop_mm),
        )
    }

    fn place_outlines(&mut self) {
        for hand in Hand::BOTH {
            let points = self
                .cfg
                .outline_points_mm
                .iter()
                .map(|xy| hand.mirror_point(self.units.mm_point(*xy)))
                .collect();
            let anchor = self.outline_anchor(hand);
            self.arena.insert(
                Role::Outline { hand },
                Geometry::Polygon { points },
                Affine::translate(anchor.to_vec2()),
                Style::LINEWORK,
            );
        }
    }

    fn place_cable(&mut self) {
        let cable = self.cfg.cable.clone();
        let u = self.units;

        for hand in Hand::BOTH {
            let center =
                self.outline_anchor(hand) + hand.mirror_vec(u.mm_vec(cable.connector_offset_mm));
            let (w, h) = cable.connector_size_mm;
            self.arena.insert(
                Role::Connector { hand },
                Geometry::Rect {
                    width: u.mm(w),
                    height: u.mm(h),
                },
                Affine::translate(center.to_vec2())
                    * Affine::rotate(hand.mirror_angle(-cable.connector_angle)),
                Style::LINEWORK,
            );
        }

        // The right run is the mirrored left run traced backwards, so both start at their jack.
        let [p0, p1, p2, p3] = cable.bezier_mm.map(|xy| u.mm_point(xy));
        for hand in Hand::BOTH {
            let curve = match hand {
                Hand::Left => CubicBez::new(p0, p1, p2, p3),
                Hand::Right => CubicBez::new(
                    hand.mirror_point(p3),
                    hand.mirror_point(p2),
                    hand.mirror_point(p1),
                    hand.mirror_point(p0),
                ),
            };
            self.arena.insert(
                Role::CableSegment { hand },
                Geometry::Cubic { curve },
                Affine::IDENTITY,
                Style::LINEWORK,
            );
        }

        for index in 0..cable.spiral_count {
            let x = cable.spiral_start_x_mm + (index + 1) as f64 * cable.spiral_pitch_mm;
            let line = Line::new(
                u.mm_point((x, cable.spiral_top_mm)),
                u.mm_point((x, cable.spiral_bottom_mm)),
            );
            self.arena.insert(
                Role::Coil { index },
                Geometry::Segment { line },
                Affine::IDENTITY,
                Style::LINEWORK,
            );
        }
    }

    fn emit(&mut self, kind: PhaseKind, duration: f64, ops: Vec<PhaseOp>) {
        let phase = Phase {
            kind,
            ops,
            duration,
            ease: self.cfg.ease,
        };
        phase.apply_to(&mut self.arena, 1.0);
        tracing::debug!(
            index = self.phases.len(),
            ?kind,
            duration,
            ops = phase.ops.len(),
            "emit phase"
        );
        self.phases.push(phase);
    }

    fn position(&self, id: ShapeId) -> Point {
        self.arena
            .get(id)
            .map(|s| s.position())
            .unwrap_or(Point::ORIGIN)
    }

    fn reveal_grid(&mut self) {
        let duration = self.cfg.run_time / self.cfg.grid_reveal_divisor;
        let reveal = Operation::Reveal {
            style: RevealStyle::DrawBorderThenFill,
        };
        let left = self.arena.switches(Hand::Left).to_vec();
        let right = self.arena.switches(Hand::Right).to_vec();
        for (i, (&l, &r)) in left.iter().zip(&right).enumerate() {
            let (row, col) = (i / self.cfg.cols, i % self.cfg.cols);
            let ops = vec![
                PhaseOp {
                    shape: l,
                    op: reveal,
                },
                PhaseOp {
                    shape: r,
                    op: reveal,
                },
            ];
            self.emit(PhaseKind::GridReveal { row, col }, duration, ops);
        }
    }

    fn separate_hands(&mut self) {
        let shift = self.units.keys((self.cfg.gap - self.cfg.staging_gap) / 2.0);
        let mut ops = Vec::with_capacity(2 * self.cfg.rows * self.cfg.cols);
        for hand in Hand::BOTH {
            let by = hand.mirror_vec(Vec2::new(-shift, 0.0));
            ops.extend(self.arena.switches(hand).iter().map(|&shape| PhaseOp {
                shape,
                op: Operation::TranslateGroup { hand, by },
            }));
        }
        self.emit(PhaseKind::Separate, self.cfg.run_time, ops);
    }

    /// Fans the thumb keys, each about its own center.
    fn rotate_thumbs(&mut self) {
        let mut ops = Vec::with_capacity(2 * self.cfg.cols);
        for hand in Hand::BOTH {
            for (col, &shape) in self.arena.thumb_cluster(hand).iter().enumerate() {
                ops.push(PhaseOp {
                    shape,
                    op: Operation::Rotate {
                        angle: hand.mirror_angle(self.cfg.thumb_angles[col]),
                        pivot: self.position(shape),
                    },
                });
            }
        }
        self.emit(PhaseKind::ThumbRotate, self.cfg.run_time, ops);
    }

    /// Must follow [`Self::rotate_thumbs`]: the offsets were measured on the fanned keys.
    fn translate_thumbs(&mut self) {
        let mut ops = Vec::with_capacity(2 * self.cfg.cols);
        for hand in Hand::BOTH {
            for (col, &shape) in self.arena.thumb_cluster(hand).iter().enumerate() {
                let (x, y) = self.cfg.thumb_offsets_mm[col];
                let by = hand.mirror_vec(Vec2::new(self.units.mm(x), -self.units.mm(y)));
                ops.push(PhaseOp {
                    shape,
                    op: Operation::Translate { by },
                });
            }
        }
        self.emit(PhaseKind::ThumbTranslate, self.cfg.run_time, ops);
    }

    fn stagger_columns(&mut self) {
        for col in 0..self.cfg.cols {
            let offset = self.cfg.column_stagger_mm[col];
            if offset == 0.0 {
                continue;
            }
            let by = Vec2::new(0.0, -self.units.mm(offset));
            let ops = Hand::BOTH
                .iter()
                .flat_map(|&hand| self.arena.column_above_thumbs(hand, col))
                .map(|shape| PhaseOp {
                    shape,
                    op: Operation::Translate { by },
                })
                .collect();
            self.emit(PhaseKind::ColumnStagger { col }, self.cfg.run_time, ops);
        }
    }

    fn reveal_outlines(&mut self) {
        let ops = Hand::BOTH
            .iter()
            .filter_map(|&hand| self.arena.find(Role::Outline { hand }))
            .map(|shape| PhaseOp {
                shape,
                op: Operation::Reveal {
                    style: RevealStyle::Create,
                },
            })
            .collect();
        self.emit(PhaseKind::OutlineReveal, self.cfg.outline_run_time, ops);
    }

    /// Tilts each hand assembly about the center of its bounding box.
    fn rotate_hands(&mut self) {
        let mut ops = Vec::new();
        for hand in Hand::BOTH {
            let members = self.arena.hand_assembly(hand);
            let pivot = self
                .arena
                .bounds_of(&members)
                .map(|r| r.center())
                .unwrap_or(Point::ORIGIN);
            let angle = hand.mirror_angle(-self.cfg.hand_angle);
            ops.extend(members.into_iter().map(|shape| PhaseOp {
                shape,
                op: Operation::RotateGroup { hand, angle, pivot },
            }));
        }
        self.emit(PhaseKind::HandRotate, self.cfg.run_time, ops);
    }

    fn reveal_one(&mut self, kind: PhaseKind, role: Role, duration: f64) {
        let ops = self
            .arena
            .find(role)
            .map(|shape| PhaseOp {
                shape,
                op: Operation::Reveal {
                    style: RevealStyle::Create,
                },
            })
            .into_iter()
            .collect();
        self.emit(kind, duration, ops);
    }

    /// Plugs the cable in from the left jack to the right one.
    fn reveal_cable(&mut self) {
        let run = self.cfg.run_time;
        let count = self.cfg.cable.spiral_count;

        self.reveal_one(
            PhaseKind::ConnectorReveal { hand: Hand::Left },
            Role::Connector { hand: Hand::Left },
            run,
        );
        self.reveal_one(
            PhaseKind::CableReveal { hand: Hand::Left },
            Role::CableSegment { hand: Hand::Left },
            run,
        );
        for index in 0..count {
            self.reveal_one(
                PhaseKind::CoilReveal { index },
                Role::Coil { index },
                run / count as f64,
            );
        }
        self.reveal_one(
            PhaseKind::CableReveal { hand: Hand::Right },
            Role::CableSegment { hand: Hand::Right },
            run,
        );
        self.reveal_one(
            PhaseKind::ConnectorReveal { hand: Hand::Right },
            Role::Connector { hand: Hand::Right },
            run,
        );
    }
}

/// Validates `cfg` and builds the diagram.
pub fn build(cfg: &LayoutConfig) -> DiagramResult<Diagram> {
    DiagramBuilder::new(cfg.clone()).build()
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use super::*;
    use crate::phase::OpKind;

    fn reference() -> Diagram {
        build(&LayoutConfig::reference()).unwrap()
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn staging_grid_coordinates() {
        let d = reference();
        let u = 0.6;
        let l = d.shapes.get(d.shapes.switch(Hand::Left, 0, 0).unwrap()).unwrap();
        assert_close(l.position().x, -5.5 * u);
        assert_close(l.position().y, 3.0 * u);

        let r = d.shapes.get(d.shapes.switch(Hand::Right, 2, 4).unwrap()).unwrap();
        assert_close(r.position().x, 5.5 * u - 4.0 * u);
        assert_close(r.position().y, 3.0 * u - 2.0 * u);
    }

    #[test]
    fn grid_phases_pair_hands_in_row_major_order() {
        let d = reference();
        for (i, phase) in d.phases.iter().take(30).enumerate() {
            let (row, col) = (i / 6, i % 6);
            assert_eq!(phase.kind, PhaseKind::GridReveal { row, col });
            assert_eq!(phase.ops.len(), 2);
            assert_eq!(phase.ops[0].shape, d.shapes.switch(Hand::Left, row, col).unwrap());
            assert_eq!(phase.ops[1].shape, d.shapes.switch(Hand::Right, row, col).unwrap());
            assert_close(phase.duration, 0.1);
        }
    }

    #[test]
    fn separation_reaches_final_gap() {
        let d = reference();
        let mut arena = d.shapes.clone();
        for phase in d.phases.iter().take(31) {
            phase.apply_to(&mut arena, 1.0);
        }
        assert_eq!(d.phases[30].kind, PhaseKind::Separate);
        assert!(d.phases[30].op_kinds().all(|k| k == OpKind::TranslateGroup));

        let l = arena.get(arena.switch(Hand::Left, 0, 0).unwrap()).unwrap();
        let r = arena.get(arena.switch(Hand::Right, 0, 0).unwrap()).unwrap();
        assert_close(r.position().x - l.position().x, 20.5 * 0.6);
    }

    #[test]
    fn thumb_rotation_pivots_on_each_key() {
        let d = reference();
        let rotate = &d.phases[31];
        assert_eq!(rotate.kind, PhaseKind::ThumbRotate);
        assert_eq!(rotate.ops.len(), 12);
        let mut arena = d.shapes.clone();
        for phase in d.phases.iter().take(31) {
            phase.apply_to(&mut arena, 1.0);
        }
        for entry in &rotate.ops {
            let Operation::Rotate { pivot, .. } = entry.op else {
                panic!("thumb rotate phase holds only rotations");
            };
            let before = arena.get(entry.shape).unwrap().position();
            assert!((before - pivot).hypot() < 1e-12);
        }

        let Operation::Rotate { angle, .. } = rotate.ops[2].op else {
            unreachable!()
        };
        assert_close(angle, -PI / 12.0);
        let Operation::Rotate { angle, .. } = rotate.ops[6 + 2].op else {
            unreachable!()
        };
        assert_close(angle, PI / 12.0);
    }

    #[test]
    fn zero_stagger_columns_emit_nothing() {
        let d = reference();
        let staggered: Vec<usize> = d
            .phases
            .iter()
            .filter_map(|p| match p.kind {
                PhaseKind::ColumnStagger { col } => Some(col),
                _ => None,
            })
            .collect();
        assert_eq!(staggered, vec![0, 1, 2, 4, 5]);
        let first = d
            .phases
            .iter()
            .find(|p| p.kind == PhaseKind::ColumnStagger { col: 0 })
            .unwrap();
        // four non-thumb rows per hand
        assert_eq!(first.ops.len(), 8);
    }

    #[test]
    fn hand_rotation_moves_outline_with_switches() {
        let d = reference();
        let phase = d
            .phases
            .iter()
            .find(|p| p.kind == PhaseKind::HandRotate)
            .unwrap();
        let outline_l = d.shapes.find(Role::Outline { hand: Hand::Left }).unwrap();
        assert!(phase.touches(outline_l));
        assert_eq!(phase.ops.len(), 2 * (30 + 1));
        for entry in &phase.ops {
            let Operation::RotateGroup { hand, angle, .. } = entry.op else {
                panic!("hand rotate phase holds only group rotations");
            };
            assert_close(angle, hand.mirror_angle(-PI / 24.0));
        }
    }

    #[test]
    fn cable_phases_run_left_to_right() {
        let d = reference();
        let tail: Vec<PhaseKind> = d.phases.iter().rev().take(33).rev().map(|p| p.kind).collect();
        assert_eq!(tail[0], PhaseKind::ConnectorReveal { hand: Hand::Left });
        assert_eq!(tail[1], PhaseKind::CableReveal { hand: Hand::Left });
        for i in 0..29 {
            assert_eq!(tail[2 + i], PhaseKind::CoilReveal { index: i });
        }
        assert_eq!(tail[31], PhaseKind::CableReveal { hand: Hand::Right });
        assert_eq!(tail[32], PhaseKind::ConnectorReveal { hand: Hand::Right });
    }

    #[test]
    fn right_cable_run_starts_at_its_jack_side() {
        let d = reference();
        let l = d.shapes.find(Role::CableSegment { hand: Hand::Left }).unwrap();
        let r = d.shapes.find(Role::CableSegment { hand: Hand::Right }).unwrap();
        let (Geometry::Cubic { curve: cl }, Geometry::Cubic { curve: cr }) = (
            &d.shapes.get(l).unwrap().geometry,
            &d.shapes.get(r).unwrap().geometry,
        ) else {
            panic!("cable segments are cubic");
        };
        assert_eq!(cr.p0, Point::new(-cl.p3.x, cl.p3.y));
        assert_eq!(cr.p3, Point::new(-cl.p0.x, cl.p0.y));
    }

    #[test]
    fn reference_linework_placement() {
        let d = reference();
        let mm = 0.6 / 19.0;
        let shape = |role| d.shapes.get(d.shapes.find(role).unwrap()).unwrap();

        // outline point (0, 0) lands on the anchor
        let outline = shape(Role::Outline { hand: Hand::Left });
        let Geometry::Polygon { points } = &outline.geometry else {
            panic!("outline is a polygon");
        };
        let first = outline.transform * points[0];
        assert_close(first.x, -6.45);
        assert_close(first.y, 2.1 - 22.0 * mm);
        let right = shape(Role::Outline { hand: Hand::Right });
        assert_close(right.position().x, 6.45);
        assert_close(right.position().y, 2.1 - 22.0 * mm);

        let jack = shape(Role::Connector { hand: Hand::Left }).position();
        assert_close(jack.x, -6.45 + 144.0 * mm);
        assert_close(jack.y, 2.1 - 94.0 * mm);
        let jack_r = shape(Role::Connector { hand: Hand::Right }).position();
        assert_close(jack_r.x, 6.45 - 144.0 * mm);

        let Geometry::Cubic { curve } = &shape(Role::CableSegment { hand: Hand::Left }).geometry
        else {
            panic!("cable segment is cubic");
        };
        assert_close(curve.p0.x, -57.0 * mm);
        assert_close(curve.p0.y, -25.0 * mm);
        assert_close(curve.p3.x, -45.0 * mm);
        assert_close(curve.p3.y, 30.0 * mm);

        let Geometry::Segment { line } = &shape(Role::Coil { index: 0 }).geometry else {
            panic!("coil is a segment");
        };
        assert_close(line.p0.x, -42.0 * mm);
        assert_close(line.p1.x, -42.0 * mm);
        assert_close(line.p0.y, 30.0 * mm);
        assert_close(line.p1.y, 20.0 * mm);
        let Geometry::Segment { line } = &shape(Role::Coil { index: 28 }).geometry else {
            panic!("coil is a segment");
        };
        assert_close(line.p0.x, 42.0 * mm);
    }

    #[test]
    fn huge_grid_reports_config_error_instead_of_allocating() {
        let mut cfg = LayoutConfig::reference();
        cfg.rows = usize::MAX / 4;
        cfg.thumb_angles.pop();
        assert_eq!(build(&cfg).unwrap_err().field(), Some("thumb_angles"));

        cfg.thumb_angles.push(0.0);
        assert_eq!(build(&cfg).unwrap_err().field(), Some("rows"));
    }

    #[test]
    fn invalid_config_builds_nothing() {
        let mut cfg = LayoutConfig::reference();
        cfg.column_stagger_mm.push(1.0);
        let err = build(&cfg).unwrap_err();
        assert_eq!(err.field(), Some("column_stagger_mm"));
    }
}
