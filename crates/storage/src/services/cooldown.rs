use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::ledger::Ledger;

pub const COOLDOWN_HOURS: i64 = 24;

pub fn cooldown() -> Duration {
    Duration::hours(COOLDOWN_HOURS)
}

/// Oldest scan timestamp that still blocks a redemption at `now`.
pub fn window_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now - cooldown()
}

/// Why a user cannot redeem a code yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CooldownStatus {
    pub last_scanned: DateTime<Utc>,
    pub remaining: Duration,
}

impl CooldownStatus {
    pub fn from_last_scan(last_scanned: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let remaining = (last_scanned + cooldown() - now).max(Duration::zero());
        Self {
            last_scanned,
            remaining,
        }
    }

    pub fn available_at(&self) -> DateTime<Utc> {
        self.last_scanned + cooldown()
    }

    /// e.g. `23h 4m`, rounded up to the next whole minute.
    pub fn remaining_display(&self) -> String {
        let seconds = self.remaining.num_seconds();
        let minutes = (seconds + 59) / 60;
        format!("{}h {}m", minutes / 60, minutes % 60)
    }
}

/// Latest blocking scan of `qr_code_id` by `user_id`, if any.
pub async fn check_cooldown<L: Ledger + ?Sized>(
    ledger: &L,
    user_id: Uuid,
    qr_code_id: Uuid,
    now: DateTime<Utc>,
) -> Result<Option<CooldownStatus>> {
    let recent = ledger
        .find_recent_scan(user_id, qr_code_id, window_start(now))
        .await?;

    Ok(recent.map(|scan| CooldownStatus::from_last_scan(scan.scanned_at, now)))
}

pub async fn is_on_cooldown<L: Ledger + ?Sized>(
    ledger: &L,
    user_id: Uuid,
    qr_code_id: Uuid,
    now: DateTime<Utc>,
) -> Result<bool> {
    Ok(check_cooldown(ledger, user_id, qr_code_id, now)
        .await?
        .is_some())
}
