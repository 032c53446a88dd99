//! Geographic and scheduling primitives for address verification.
//!
//! Everything here is a pure function: great-circle distance with risk
//! classification, and overnight verification-window arithmetic. No I/O and
//! no clock access; the caller supplies every instant that gets tested.

mod distance;
mod window;

pub use distance::{
    classify_distance, distance_km, exceeds_threshold, round_km, DistanceAssessment, GeoPoint,
    ParseRiskTierError, RiskTier, DEFAULT_THRESHOLD_KM,
};
pub use window::{parse_wall_clock, validate_slot_pair, Window, WindowError, WINDOW_SLOTS};
