//! Point award and balance decay for a single redemption.
//!
//! The scanning user receives the code's whole current balance. The code then
//! loses 10% of that balance (rounded down, at least one point), so repeated
//! scans are worth progressively less until the code is exhausted.

use crate::models::QrCode;

/// Codes in this namespace pay out a 50% bonus.
pub const PREMIUM_PREFIX: &str = "PREMIUM_";

/// Percentage of the awarded balance removed from the code per scan.
pub const DECAY_PERCENT: i32 = 10;

/// Smallest possible decrement, so a balance can never stagnate.
pub const MIN_REDUCTION: i32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecayOutcome {
    /// Credited to the user and recorded on the scan.
    pub points_awarded: i32,
    /// Balance the computation started from.
    pub base_points: i32,
    pub reduction: i32,
    pub new_curr_points: i32,
}

/// `max(1, floor(base_points * 0.1))`
pub fn reduction(base_points: i32) -> i32 {
    let decayed = i64::from(base_points.max(0)) * i64::from(DECAY_PERCENT) / 100;
    (decayed as i32).max(MIN_REDUCTION)
}

pub fn is_premium(code: &str) -> bool {
    code.starts_with(PREMIUM_PREFIX)
}

/// Points paid out for a code currently worth `curr_points`.
pub fn points_awarded(code: &str, curr_points: i32) -> i32 {
    if is_premium(code) {
        curr_points.saturating_add(curr_points / 2)
    } else {
        curr_points
    }
}

/// Decay for a scan of `qr`, or `None` when the code has nothing left to give.
pub fn compute(qr: &QrCode) -> Option<DecayOutcome> {
    compute_for(&qr.code, qr.curr_points)
}

pub fn compute_for(code: &str, curr_points: i32) -> Option<DecayOutcome> {
    if curr_points <= 0 {
        return None;
    }

    let reduction = reduction(curr_points);

    Some(DecayOutcome {
        points_awarded: points_awarded(code, curr_points),
        base_points: curr_points,
        reduction,
        new_curr_points: curr_points - reduction,
    })
}
