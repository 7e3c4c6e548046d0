/// Rate curve a driver applies while a phase runs.
///
/// Phases default to [`Ease::Smooth`], the symmetric smoothstep most motion-graphics
/// tools use for their default transition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ease {
    Linear,
    #[default]
    Smooth,
    InQuad,
    OutQuad,
    InOutQuad,
    InCubic,
    OutCubic,
    InOutCubic,
}

impl Ease {
    pub const ALL: [Ease; 8] = [
        Ease::Linear,
        Ease::Smooth,
        Ease::InQuad,
        Ease::OutQuad,
        Ease::InOutQuad,
        Ease::InCubic,
        Ease::OutCubic,
        Ease::InOutCubic,
    ];

    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::Smooth => t * t * (3.0 - 2.0 * t),
            Self::InQuad => power_in(t, 2),
            Self::OutQuad => power_out(t, 2),
            Self::InOutQuad => power_in_out(t, 2),
            Self::InCubic => power_in(t, 3),
            Self::OutCubic => power_out(t, 3),
            Self::InOutCubic => power_in_out(t, 3),
        }
    }
}

fn power_in(t: f64, n: i32) -> f64 {
    t.powi(n)
}

/// `power_in` reflected through `(0.5, 0.5)`.
fn power_out(t: f64, n: i32) -> f64 {
    1.0 - (1.0 - t).powi(n)
}

/// Accelerates through the first half and decelerates through the second.
fn power_in_out(t: f64, n: i32) -> f64 {
    if t < 0.5 {
        power_in(2.0 * t, n) / 2.0
    } else {
        0.5 + power_out(2.0 * t - 1.0, n) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_are_stable() {
        for ease in Ease::ALL {
            assert_eq!(ease.apply(0.0), 0.0);
            assert_eq!(ease.apply(1.0), 1.0);
        }
    }

    #[test]
    fn monotonic_spot_check() {
        for ease in Ease::ALL {
            let a = ease.apply(0.25);
            let b = ease.apply(0.5);
            let c = ease.apply(0.75);
            assert!(a < b);
            assert!(b < c);
        }
    }

    #[test]
    fn in_out_curves_are_point_symmetric() {
        for ease in [Ease::Smooth, Ease::InOutQuad, Ease::InOutCubic] {
            assert!((ease.apply(0.5) - 0.5).abs() < 1e-12, "{ease:?}");
            for t in [0.1, 0.2, 0.35] {
                let sum = ease.apply(t) + ease.apply(1.0 - t);
                assert!((sum - 1.0).abs() < 1e-12, "{ease:?} at {t}");
            }
        }
        assert!((Ease::InOutQuad.apply(0.25) - 0.125).abs() < 1e-12);
        assert!((Ease::InOutCubic.apply(0.75) - 0.9375).abs() < 1e-12);
        assert!((Ease::OutCubic.apply(0.5) - 0.875).abs() < 1e-12);
    }

    #[test]
    fn out_of_range_input_is_clamped() {
        assert_eq!(Ease::Smooth.apply(-3.0), 0.0);
        assert_eq!(Ease::Smooth.apply(7.0), 1.0);
        assert_eq!(Ease::Smooth.apply(0.5), 0.5);
    }
}
