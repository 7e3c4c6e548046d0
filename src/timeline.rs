use crate::{
    builder::Diagram,
    foundation::error::{DiagramError, DiagramResult},
    shapes::{Shape, ShapeArena, ShapeId},
};

/// Position of the playhead inside the phase list.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct Cursor {
    pub phase: usize,
    /// Raw fraction of the phase's duration that has elapsed, 0..1.
    pub elapsed: f64,
    /// `elapsed` after the phase's ease.
    pub progress: f64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ShapeState {
    pub shape: Shape,
    /// 0 = not on screen yet, 1 = fully revealed.
    pub reveal: f64,
}

/// Cumulative geometry at one instant.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Snapshot {
    pub shapes: Vec<ShapeState>,
}

impl Snapshot {
    pub fn visible(&self) -> impl Iterator<Item = &ShapeState> {
        self.shapes.iter().filter(|s| s.reveal > 0.0)
    }

    pub fn get(&self, id: ShapeId) -> Option<&ShapeState> {
        self.shapes.get(id.index())
    }
}

/// Replays a [`Diagram`]'s phases against a clock.
///
/// The diagram is only read; every query starts from the initial placements.
pub struct Timeline<'a> {
    diagram: &'a Diagram,
    /// `starts[i]` is when phase `i` begins; the last entry is the end of the final phase.
    starts: Vec<f64>,
}

impl<'a> Timeline<'a> {
    pub fn new(diagram: &'a Diagram) -> Self {
        let mut starts = Vec::with_capacity(diagram.phases.len() + 1);
        let mut t = 0.0;
        starts.push(t);
        for phase in &diagram.phases {
            t += phase.duration;
            starts.push(t);
        }
        Self { diagram, starts }
    }

    pub fn phase_count(&self) -> usize {
        self.diagram.phases.len()
    }

    pub fn phase_start(&self, index: usize) -> Option<f64> {
        if index < self.phase_count() {
            self.starts.get(index).copied()
        } else {
            None
        }
    }

    pub fn total_duration(&self) -> f64 {
        self.starts.last().copied().unwrap_or(0.0)
    }

    /// Phases plus the closing hold.
    pub fn runtime(&self) -> f64 {
        self.total_duration() + self.diagram.config.final_hold
    }

    pub fn locate(&self, t: f64) -> DiagramResult<Cursor> {
        if !t.is_finite() || t < 0.0 {
            return Err(DiagramError::timeline(format!(
                "time must be finite and >= 0, got {t}"
            )));
        }
        let Some(last) = self.phase_count().checked_sub(1) else {
            return Err(DiagramError::timeline("diagram has no phases"));
        };

        // First phase whose end lies strictly after `t`; zero-length phases are stepped over.
        let ends = &self.starts[1..];
        let phase = ends.partition_point(|end| *end <= t).min(last);
        let p = &self.diagram.phases[phase];

        let elapsed = if t >= self.starts[phase + 1] || p.duration <= 0.0 {
            1.0
        } else {
            ((t - self.starts[phase]) / p.duration).clamp(0.0, 1.0)
        };
        Ok(Cursor {
            phase,
            elapsed,
            progress: p.ease.apply(elapsed),
        })
    }

    /// Geometry once the first `applied` phases have completed.
    pub fn snapshot(&self, applied: usize) -> DiagramResult<Snapshot> {
        if applied > self.phase_count() {
            return Err(DiagramError::timeline(format!(
                "cannot apply {applied} phases, diagram has {}",
                self.phase_count()
            )));
        }
        Ok(self.replay(applied, None))
    }

    /// Geometry at `t` seconds, with the running phase part-way done.
    pub fn sample(&self, t: f64) -> DiagramResult<Snapshot> {
        let cursor = self.locate(t)?;
        Ok(self.replay(cursor.phase, Some(cursor)))
    }

    fn replay(&self, complete: usize, partial: Option<Cursor>) -> Snapshot {
        let mut arena: ShapeArena = self.diagram.shapes.clone();
        let mut reveal = vec![0.0; arena.len()];

        let mut run = |index: usize, progress: f64, reveal_amount: f64| {
            let phase = &self.diagram.phases[index];
            phase.apply_to(&mut arena, progress);
            for entry in phase.ops.iter().filter(|o| o.op.is_reveal()) {
                if let Some(r) = reveal.get_mut(entry.shape.index()) {
                    *r = reveal_amount;
                }
            }
        };

        for index in 0..complete {
            run(index, 1.0, 1.0);
        }
        if let Some(c) = partial {
            run(c.phase, c.progress, c.elapsed);
        }

        let shapes = arena
            .shapes()
            .iter()
            .zip(reveal)
            .map(|(shape, reveal)| ShapeState {
                shape: shape.clone(),
                reveal,
            })
            .collect();
        Snapshot { shapes }
    }
}
