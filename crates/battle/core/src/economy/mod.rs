//! Charge & timed-hit economy.
//!
//! Maps committed charge and timed-input quality to a damage multiplier and a
//! hit count. Everything here is a pure function of its configuration.
mod charge;
mod curve;
mod scaling;
mod timed_hit;

pub use charge::{ChargeError, ChargeProfile};
pub use curve::{Curve, Keyframe, ResponseCurve};
pub use scaling::{
    ComboScalingProfile, DEFAULT_FIRST_BONUS, DEFAULT_GROWTH_FACTOR, DEFAULT_GROWTH_OFFSET,
    SoftCap, default_bonus, default_multiplier,
};
pub use timed_hit::{
    HitSequence, MAX_HITS, TimedGrade, TimedHitProfile, TimedHitProfileId, TimedHitResult,
    TimedHitTier, scale,
};
