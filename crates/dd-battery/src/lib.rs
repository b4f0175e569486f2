//! `dd-battery` — the battery model.
//!
//! Stateless functions over battery percentages in `[0, 100]`.  Nothing here
//! knows about vehicles or state; callers decide what to do with the
//! numbers.
//!
//! # Model
//!
//! ```text
//! consumption(d, w, adverse) = d · BASE_RATE · (1 + w · WEIGHT_FACTOR) · (ADVERSE_MULTIPLIER if adverse)
//! recharge(b, t, r)          = min(100, b + r · t)
//! ```
//!
//! A vehicle may leave on (or continue) a mission only while the projected
//! battery after the trip home stays at or above [`RETURN_MARGIN`].


// ── Constants ─────────────────────────────────────────────────────────────────

/// Fully charged.
pub const FULL: f64 = 100.0;

/// At or below this level a vehicle is "low".
pub const LOW_THRESHOLD: f64 = 20.0;

/// At or below this level a vehicle is "critical".
pub const CRITICAL_THRESHOLD: f64 = 10.0;

/// Minimum battery that must remain after the trip home.
pub const RETURN_MARGIN: f64 = 5.0;

/// Percent per grid unit, unloaded, calm air.
pub const BASE_RATE: f64 = 0.5;

/// Extra fractional draw per unit of payload weight.
pub const WEIGHT_FACTOR: f64 = 0.05;

/// Multiplier applied under adverse conditions (wind, rain).
pub const ADVERSE_MULTIPLIER: f64 = 1.3;

/// Default charger throughput, percent per minute.
pub const DEFAULT_RECHARGE_RATE: f64 = 1.5;

// ── Consumption ───────────────────────────────────────────────────────────────

/// Battery percent drawn flying `distance` grid units carrying `payload`.
///
/// Monotonically non-decreasing in both `distance` and `payload`; negative
/// inputs are treated as zero.
pub fn consumption(distance: f64, payload: f64, adverse: bool) -> f64 {
    let base = distance.max(0.0) * BASE_RATE * (1.0 + payload.max(0.0) * WEIGHT_FACTOR);
    if adverse { base * ADVERSE_MULTIPLIER } else { base }
}

// ── Thresholds ────────────────────────────────────────────────────────────────

#[inline]
pub fn is_low(battery: f64) -> bool {
    battery <= LOW_THRESHOLD
}

#[inline]
pub fn is_critical(battery: f64) -> bool {
    battery <= CRITICAL_THRESHOLD
}

/// `true` if an unloaded, calm-air flight of `return_distance` leaves at
/// least [`RETURN_MARGIN`].
pub fn sufficient_for_return(battery: f64, return_distance: f64) -> bool {
    battery - consumption(return_distance, 0.0, false) >= RETURN_MARGIN
}

/// `true` if a whole round trip of `total_distance` (outbound legs plus the
/// return) carrying `total_weight` leaves at least [`RETURN_MARGIN`].
///
/// The projection is calm-air and charges the full weight over the whole
/// distance, so it over-estimates the real draw of a multi-drop mission.
pub fn safe_for_mission(battery: f64, total_distance: f64, total_weight: f64) -> bool {
    battery - consumption(total_distance, total_weight, false) >= RETURN_MARGIN
}

// ── Recharge ──────────────────────────────────────────────────────────────────

/// Battery after `elapsed_minutes` on a charger at `rate_per_minute`.
///
/// Non-decreasing in `elapsed_minutes` and clamped to [`FULL`].
pub fn recharge(battery: f64, elapsed_minutes: f64, rate_per_minute: f64) -> f64 {
    let gained = rate_per_minute.max(0.0) * elapsed_minutes.max(0.0);
    (battery + gained).min(FULL)
}

/// Minutes until full at `rate_per_minute`; `f64::INFINITY` for a zero rate.
pub fn minutes_to_full(battery: f64, rate_per_minute: f64) -> f64 {
    let missing = (FULL - battery).max(0.0);
    if missing == 0.0 {
        0.0
    } else if rate_per_minute <= 0.0 {
        f64::INFINITY
    } else {
        missing / rate_per_minute
    }
}

/// Clamp a battery reading into `[0, cap]`, with `cap` itself capped at
/// [`FULL`].
#[inline]
pub fn clamp(battery: f64, cap: f64) -> f64 {
    battery.clamp(0.0, cap.clamp(0.0, FULL))
}
