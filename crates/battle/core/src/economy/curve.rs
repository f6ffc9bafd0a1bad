//! Piecewise curves used by the scaling economy.
//!
//! [`Curve`] is a keyframed, linearly interpolated function clamped at its ends.
//! [`ResponseCurve`] shapes normalized `[0, 1]` inputs for the soft cap.

/// A single curve key.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Keyframe {
    pub time: f32,
    pub value: f32,
}

impl Keyframe {
    pub const fn new(time: f32, value: f32) -> Self {
        Self { time, value }
    }
}

/// Keyframed curve with linear interpolation between keys.
///
/// Keys are kept sorted by time. Inputs before the first key evaluate to the
/// first value and inputs after the last key evaluate to the last value.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "Vec<Keyframe>", into = "Vec<Keyframe>"))]
pub struct Curve {
    keys: Vec<Keyframe>,
}

impl Curve {
    pub fn new(mut keys: Vec<Keyframe>) -> Self {
        keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { keys }
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &[Keyframe] {
        &self.keys
    }

    /// Evaluates the curve at `time`. An empty curve evaluates to 0.
    pub fn evaluate(&self, time: f32) -> f32 {
        let (first, last) = match (self.keys.first(), self.keys.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return 0.0,
        };
        if time <= first.time {
            return first.value;
        }
        if time >= last.time {
            return last.value;
        }

        let upper = self.keys.partition_point(|key| key.time <= time);
        let a = self.keys[upper - 1];
        let b = self.keys[upper];
        let span = b.time - a.time;
        if span <= f32::EPSILON {
            return b.value;
        }
        let t = (time - a.time) / span;
        a.value + (b.value - a.value) * t
    }
}

impl From<Vec<Keyframe>> for Curve {
    fn from(keys: Vec<Keyframe>) -> Self {
        Self::new(keys)
    }
}

impl From<Curve> for Vec<Keyframe> {
    fn from(curve: Curve) -> Self {
        curve.keys
    }
}

/// Shape applied to a normalized ratio in `[0, 1]`.
///
/// Output is clamped to `[0, 1]` so callers can blend without overshooting.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResponseCurve {
    Linear,
    /// `1 - (1 - x)^exponent`: fast early growth that flattens out.
    #[default]
    EaseOut,
    EaseOutPow { exponent: f32 },
    Custom(Curve),
}

impl ResponseCurve {
    pub fn evaluate(&self, ratio: f32) -> f32 {
        let x = ratio.clamp(0.0, 1.0);
        let y = match self {
            ResponseCurve::Linear => x,
            ResponseCurve::EaseOut => 1.0 - (1.0 - x) * (1.0 - x),
            ResponseCurve::EaseOutPow { exponent } => 1.0 - (1.0 - x).powf(exponent.max(0.0)),
            ResponseCurve::Custom(curve) => curve.evaluate(x),
        };
        y.clamp(0.0, 1.0)
    }
}
