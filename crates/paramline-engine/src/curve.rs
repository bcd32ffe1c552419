use serde::{Deserialize, Serialize};

/// Smallest value an exponential segment may pass through. True zero is not
/// representable on an exponential curve, so targets below this floor are
/// ramped to the floor and then snapped to the exact target at the segment
/// boundary.
pub const MIN_EXP_VALUE: f64 = 1.4e-45;

/// Interpolation law governing the segment that ends at an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CurveKind {
    /// Hold the previous value, jump at the event time.
    Step,
    /// Straight-line ramp from the previous event.
    Linear,
    /// Constant-ratio ramp from the previous event.
    Exponential,
    /// Asymptotic approach toward the event value, starting at the event
    /// time, parameterized by a time constant instead of an end time.
    TargetDecay,
}

impl CurveKind {
    /// Ramp curves interpolate between two events; Step and TargetDecay
    /// take effect only from their own event time.
    pub fn is_ramp(&self) -> bool {
        matches!(self, CurveKind::Linear | CurveKind::Exponential)
    }
}

/// Value of a linear segment `(t1, v1) -> (t2, v2)` at `t`.
pub fn linear_value(t1: f64, v1: f64, t2: f64, v2: f64, t: f64) -> f64 {
    if t2 <= t1 {
        return v2;
    }
    v1 + (v2 - v1) * (t - t1) / (t2 - t1)
}

/// Value of an exponential segment `(t1, v1) -> (t2, v2)` at `t < t2`.
///
/// A start below the floor cannot anchor a ratio, so the segment degrades
/// to Step. A target below the floor is ramped toward the floor instead;
/// the caller is responsible for snapping to the exact target at `t2`.
pub fn exponential_value(t1: f64, v1: f64, t2: f64, v2: f64, t: f64) -> f64 {
    if t2 <= t1 {
        return v2;
    }
    if v1 < MIN_EXP_VALUE {
        return v1;
    }
    let target = if v2 < MIN_EXP_VALUE { MIN_EXP_VALUE } else { v2 };
    v1 * (target / v1).powf((t - t1) / (t2 - t1))
}

/// Value of a decay segment at `t >= t0`: approach `target` from `start`
/// with time constant `time_constant`.
pub fn decay_value(start: f64, target: f64, t0: f64, time_constant: f64, t: f64) -> f64 {
    target + (start - target) * (-(t - t0) / time_constant).exp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_midpoint() {
        assert!((linear_value(0.0, 0.0, 2.0, 1.0, 1.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn linear_degenerate_span_takes_target() {
        assert_eq!(linear_value(1.0, 0.0, 1.0, 0.7, 1.0), 0.7);
    }

    #[test]
    fn exponential_is_constant_ratio() {
        // 1 -> 4 over one second doubles at the midpoint.
        let mid = exponential_value(0.0, 1.0, 1.0, 4.0, 0.5);
        assert!((mid - 2.0).abs() < 1e-9);
    }

    #[test]
    fn exponential_to_zero_stays_finite() {
        let v = exponential_value(0.0, 1.0, 1.0, 0.0, 0.999);
        assert!(v.is_finite());
        assert!(v > 0.0);
    }

    #[test]
    fn exponential_from_zero_degrades_to_step() {
        assert_eq!(exponential_value(0.0, 0.0, 1.0, 1.0, 0.5), 0.0);
    }

    #[test]
    fn decay_reaches_one_time_constant() {
        let v = decay_value(440.0, 0.0, 0.0, 0.08, 0.08);
        assert!((v - 440.0 * (-1.0f64).exp()).abs() < 1e-9);
    }

    #[test]
    fn decay_never_lands_exactly() {
        let v = decay_value(1.0, 0.0, 0.0, 0.1, 10.0);
        assert!(v > 0.0);
    }
}
