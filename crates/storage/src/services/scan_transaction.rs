//! Redemption of a QR code by a user.
//!
//! A scan attempt moves through code lookup, the cooldown check and the decay
//! computation before the ledger commits the scan, the new code balance and
//! the user's credit as one unit. The commit only succeeds if the code still
//! holds the balance the attempt started from; otherwise the whole attempt is
//! replayed against a fresh read, up to `max_attempts` times.

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::error::StorageError;
use crate::ledger::{CommittedScan, Ledger, NewScan, QrCodeBalanceUpdate, UserPointsCredit};
use crate::models::{QrCode, Scan};
use crate::services::cooldown::{self, CooldownStatus};
use crate::services::point_decay::{self, DecayOutcome};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("QR code not registered in system")]
    UnknownCode,

    #[error("QR code already scanned recently, try again in {}", .0.remaining_display())]
    Cooldown(CooldownStatus),

    #[error("QR code has no points left")]
    Exhausted,

    #[error("Scanning user is not registered")]
    UnknownUser,

    #[error("Scan could not be committed after {attempts} attempts")]
    TransactionFailed { attempts: u32 },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ScanError {
    /// Stable, machine-readable rejection code.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::UnknownCode => "not_found",
            Self::Cooldown(_) => "cooldown",
            Self::Exhausted => "exhausted",
            Self::UnknownUser => "unauthorized",
            Self::TransactionFailed { .. } => "transaction_failed",
            Self::Storage(_) => "internal",
        }
    }
}

/// A committed redemption.
#[derive(Debug, Clone)]
pub struct ScanReceipt {
    pub scan: Scan,
    pub qr_code: String,
    pub decay: DecayOutcome,
    pub remaining_points: i32,
    pub user_total_points: i64,
    pub attempts: u32,
}

pub struct ScanCoordinator<'a, L: Ledger + ?Sized> {
    ledger: &'a L,
    max_attempts: u32,
}

impl<'a, L: Ledger + ?Sized> ScanCoordinator<'a, L> {
    pub fn new(ledger: &'a L) -> Self {
        Self::with_max_attempts(ledger, DEFAULT_MAX_ATTEMPTS)
    }

    pub fn with_max_attempts(ledger: &'a L, max_attempts: u32) -> Self {
        Self {
            ledger,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Redeem `code` for `user_id` at `now`.
    pub async fn redeem(
        &self,
        user_id: Uuid,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<ScanReceipt, ScanError> {
        let mut attempt = 1;

        loop {
            match self.attempt(user_id, code, now).await {
                Ok((qr_code, decay, committed)) => {
                    tracing::info!(
                        %user_id,
                        qr_code_id = %qr_code.qr_code_id,
                        points_earned = decay.points_awarded,
                        remaining_points = committed.remaining_points,
                        attempt,
                        "Scan committed"
                    );

                    return Ok(ScanReceipt {
                        scan: committed.scan,
                        qr_code: qr_code.code,
                        decay,
                        remaining_points: committed.remaining_points,
                        user_total_points: committed.user_total_points,
                        attempts: attempt,
                    });
                }
                Err(ScanError::Storage(e)) if e.is_retryable() => {
                    if attempt >= self.max_attempts {
                        tracing::warn!(%user_id, code, attempt, "Giving up on scan: {}", e);
                        return Err(ScanError::TransactionFailed { attempts: attempt });
                    }
                    tracing::debug!(%user_id, code, attempt, "Retrying scan: {}", e);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn attempt(
        &self,
        user_id: Uuid,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<(QrCode, DecayOutcome, CommittedScan), ScanError> {
        let qr_code = match self.ledger.find_qr_code_by_code(code).await {
            Ok(qr_code) => qr_code,
            Err(StorageError::NotFound) => return Err(ScanError::UnknownCode),
            Err(e) => return Err(e.into()),
        };

        if let Some(status) =
            cooldown::check_cooldown(self.ledger, user_id, qr_code.qr_code_id, now).await?
        {
            tracing::debug!(
                %user_id,
                qr_code_id = %qr_code.qr_code_id,
                last_scanned = %status.last_scanned,
                "Scan rejected, code on cooldown"
            );
            return Err(ScanError::Cooldown(status));
        }

        let decay = point_decay::compute(&qr_code).ok_or(ScanError::Exhausted)?;

        let committed = self
            .ledger
            .commit_scan_transaction(
                NewScan {
                    qr_code_id: qr_code.qr_code_id,
                    user_id,
                    points_earned: decay.points_awarded,
                    scanned_at: now,
                },
                QrCodeBalanceUpdate {
                    qr_code_id: qr_code.qr_code_id,
                    expected_curr_points: decay.base_points,
                    new_curr_points: decay.new_curr_points,
                },
                UserPointsCredit {
                    user_id,
                    points: i64::from(decay.points_awarded),
                },
            )
            .await
            .map_err(|e| match e {
                StorageError::NotFound => ScanError::UnknownUser,
                other => ScanError::Storage(other),
            })?;

        Ok((qr_code, decay, committed))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use chrono::Duration;

    use super::*;
    use crate::error::Result;
    use crate::ledger::memory::MemoryLedger;

    #[tokio::test]
    async fn test_first_scan_awards_full_balance() {
        let ledger = MemoryLedger::new();
        let user = ledger.add_user("alice");
        let qr = ledger.add_qr_code("QR_1_abc", 100);

        let receipt = ScanCoordinator::new(&ledger)
            .redeem(user.user_id, "QR_1_abc", Utc::now())
            .await
            .unwrap();

        assert_eq!(receipt.scan.points_earned, 100);
        assert_eq!(receipt.decay.reduction, 10);
        assert_eq!(receipt.remaining_points, 90);
        assert_eq!(receipt.user_total_points, 100);
        assert_eq!(receipt.attempts, 1);
        assert_eq!(ledger.qr_code(qr.qr_code_id).curr_points, 90);
        assert_eq!(ledger.user(user.user_id).total_points, 100);
    }

    #[tokio::test]
    async fn test_small_balance_decrements_by_one() {
        let ledger = MemoryLedger::new();
        let user = ledger.add_user("alice");
        let qr = ledger.add_qr_code("QR_1_abc", 10);
        ledger.set_curr_points(qr.qr_code_id, 5);

        let receipt = ScanCoordinator::new(&ledger)
            .redeem(user.user_id, "QR_1_abc", Utc::now())
            .await
            .unwrap();

        assert_eq!(receipt.scan.points_earned, 5);
        assert_eq!(receipt.remaining_points, 4);
    }

    #[tokio::test]
    async fn test_unknown_code_is_rejected() {
        let ledger = MemoryLedger::new();
        let user = ledger.add_user("alice");

        let err = ScanCoordinator::new(&ledger)
            .redeem(user.user_id, "QR_missing", Utc::now())
            .await
            .unwrap_err();

        assert!(matches!(err, ScanError::UnknownCode));
        assert_eq!(err.reason(), "not_found");
        assert!(ledger.scans().is_empty());
    }

    #[tokio::test]
    async fn test_second_scan_within_cooldown_conflicts() {
        let ledger = MemoryLedger::new();
        let user = ledger.add_user("alice");
        let qr = ledger.add_qr_code("QR_1_abc", 100);
        let coordinator = ScanCoordinator::new(&ledger);
        let first_at = Utc::now();

        coordinator
            .redeem(user.user_id, "QR_1_abc", first_at)
            .await
            .unwrap();
        let err = coordinator
            .redeem(user.user_id, "QR_1_abc", first_at + Duration::hours(1))
            .await
            .unwrap_err();

        match err {
            ScanError::Cooldown(status) => {
                assert_eq!(status.last_scanned, first_at);
                assert_eq!(status.remaining, Duration::hours(23));
            }
            other => panic!("expected cooldown, got {other:?}"),
        }
        assert_eq!(ledger.scans().len(), 1);
        assert_eq!(ledger.qr_code(qr.qr_code_id).curr_points, 90);
        assert_eq!(ledger.user(user.user_id).total_points, 100);
    }

    #[tokio::test]
    async fn test_scan_after_cooldown_succeeds() {
        let ledger = MemoryLedger::new();
        let user = ledger.add_user("alice");
        ledger.add_qr_code("QR_1_abc", 100);
        let coordinator = ScanCoordinator::new(&ledger);
        let first_at = Utc::now();

        coordinator
            .redeem(user.user_id, "QR_1_abc", first_at)
            .await
            .unwrap();
        let receipt = coordinator
            .redeem(
                user.user_id,
                "QR_1_abc",
                first_at + Duration::hours(24) + Duration::seconds(1),
            )
            .await
            .unwrap();

        assert_eq!(receipt.scan.points_earned, 90);
        assert_eq!(receipt.remaining_points, 81);
        assert_eq!(receipt.user_total_points, 190);
    }

    #[tokio::test]
    async fn test_exhausted_code_is_rejected() {
        let ledger = MemoryLedger::new();
        let user = ledger.add_user("alice");
        let qr = ledger.add_qr_code("QR_1_abc", 10);
        ledger.set_curr_points(qr.qr_code_id, 0);

        let err = ScanCoordinator::new(&ledger)
            .redeem(user.user_id, "QR_1_abc", Utc::now())
            .await
            .unwrap_err();

        assert!(matches!(err, ScanError::Exhausted));
        assert!(ledger.scans().is_empty());
        assert_eq!(ledger.user(user.user_id).total_points, 0);
    }

    #[tokio::test]
    async fn test_unknown_user_leaves_no_partial_state() {
        let ledger = MemoryLedger::new();
        let qr = ledger.add_qr_code("QR_1_abc", 100);

        let err = ScanCoordinator::new(&ledger)
            .redeem(Uuid::new_v4(), "QR_1_abc", Utc::now())
            .await
            .unwrap_err();

        assert!(matches!(err, ScanError::UnknownUser));
        assert!(ledger.scans().is_empty());
        assert_eq!(ledger.qr_code(qr.qr_code_id).curr_points, 100);
    }

    #[tokio::test]
    async fn test_premium_code_credits_bonus() {
        let ledger = MemoryLedger::new();
        let user = ledger.add_user("alice");
        ledger.add_qr_code("PREMIUM_QR_1_abc", 100);

        let receipt = ScanCoordinator::new(&ledger)
            .redeem(user.user_id, "PREMIUM_QR_1_abc", Utc::now())
            .await
            .unwrap();

        assert_eq!(receipt.scan.points_earned, 150);
        assert_eq!(receipt.user_total_points, 150);
        assert_eq!(receipt.remaining_points, 90);
    }

    #[tokio::test]
    async fn test_user_totals_match_scan_history() {
        let ledger = MemoryLedger::new();
        let users: Vec<_> = ["alice", "bob", "carol"]
            .iter()
            .map(|name| ledger.add_user(name))
            .collect();
        for i in 0..4 {
            ledger.add_qr_code(&format!("QR_{i}"), 50 + i * 17);
        }
        let coordinator = ScanCoordinator::new(&ledger);
        let start = Utc::now();

        for day in 0..3 {
            for user in &users {
                for i in 0..4 {
                    let now = start + Duration::hours(25 * day) + Duration::minutes(i64::from(i));
                    coordinator
                        .redeem(user.user_id, &format!("QR_{i}"), now)
                        .await
                        .unwrap();
                }
            }
        }

        let scans = ledger.scans();
        assert_eq!(scans.len(), 36);
        for user in &users {
            let scanned: i64 = scans
                .iter()
                .filter(|s| s.user_id == user.user_id)
                .map(|s| i64::from(s.points_earned))
                .sum();
            assert_eq!(ledger.user(user.user_id).total_points, scanned);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_scans_do_not_lose_updates() {
        const SCANNERS: u32 = 8;
        const START: i32 = 100;

        let ledger = Arc::new(MemoryLedger::interleaving());
        let qr = ledger.add_qr_code("QR_shared", START);
        let users: Vec<_> = (0..SCANNERS)
            .map(|i| ledger.add_user(&format!("user{i}")))
            .collect();
        let now = Utc::now();

        let handles: Vec<_> = users
            .iter()
            .map(|user| {
                let ledger = Arc::clone(&ledger);
                let user_id = user.user_id;
                tokio::spawn(async move {
                    ScanCoordinator::with_max_attempts(ledger.as_ref(), SCANNERS)
                        .redeem(user_id, "QR_shared", now)
                        .await
                        .map(|receipt| receipt.scan.points_earned)
                })
            })
            .collect();

        let mut awarded = Vec::new();
        for handle in handles {
            awarded.push(handle.await.unwrap().unwrap());
        }

        let mut expected = Vec::new();
        let mut balance = START;
        for _ in 0..SCANNERS {
            let outcome = point_decay::compute_for("QR_shared", balance).unwrap();
            expected.push(outcome.points_awarded);
            balance = outcome.new_curr_points;
        }

        awarded.sort_unstable_by(|a, b| b.cmp(a));
        assert_eq!(awarded, expected);
        assert_eq!(ledger.qr_code(qr.qr_code_id).curr_points, balance);
        assert_eq!(ledger.scans().len(), SCANNERS as usize);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_scans_by_same_user_credit_once() {
        let ledger = Arc::new(MemoryLedger::interleaving());
        let user = ledger.add_user("alice");
        ledger.add_qr_code("QR_shared", 100);
        let now = Utc::now();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let ledger = Arc::clone(&ledger);
                let user_id = user.user_id;
                tokio::spawn(async move {
                    ScanCoordinator::with_max_attempts(ledger.as_ref(), 4)
                        .redeem(user_id, "QR_shared", now)
                        .await
                })
            })
            .collect();

        let mut committed = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => committed += 1,
                Err(ScanError::Cooldown(_)) => {}
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }

        assert_eq!(committed, 1);
        assert_eq!(ledger.scans().len(), 1);
        assert_eq!(ledger.user(user.user_id).total_points, 100);
    }

    /// Ledger whose commits always lose the race.
    struct ContendedLedger {
        inner: MemoryLedger,
        commits: AtomicU32,
    }

    #[async_trait]
    impl Ledger for ContendedLedger {
        async fn find_qr_code_by_code(&self, code: &str) -> Result<QrCode> {
            self.inner.find_qr_code_by_code(code).await
        }

        async fn find_recent_scan(
            &self,
            user_id: Uuid,
            qr_code_id: Uuid,
            window_start: DateTime<Utc>,
        ) -> Result<Option<Scan>> {
            self.inner
                .find_recent_scan(user_id, qr_code_id, window_start)
                .await
        }

        async fn commit_scan_transaction(
            &self,
            _scan: NewScan,
            _qr_code_update: QrCodeBalanceUpdate,
            _user_credit: UserPointsCredit,
        ) -> Result<CommittedScan> {
            self.commits.fetch_add(1, Ordering::SeqCst);
            Err(StorageError::TransactionFailed("lost the race".to_string()))
        }
    }

    #[tokio::test]
    async fn test_retries_are_bounded() {
        let inner = MemoryLedger::new();
        let user = inner.add_user("alice");
        inner.add_qr_code("QR_1_abc", 100);
        let ledger = ContendedLedger {
            inner,
            commits: AtomicU32::new(0),
        };

        let err = ScanCoordinator::new(&ledger)
            .redeem(user.user_id, "QR_1_abc", Utc::now())
            .await
            .unwrap_err();

        assert!(matches!(err, ScanError::TransactionFailed { attempts: 3 }));
        assert_eq!(err.reason(), "transaction_failed");
        assert_eq!(ledger.commits.load(Ordering::SeqCst), DEFAULT_MAX_ATTEMPTS);
    }
}
