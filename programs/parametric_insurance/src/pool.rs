// programs/parametric_insurance/src/pool.rs
//
// Pool Accountant
// ===============
// Aggregate solvency accounting. The policy and claim ledgers never write
// `PoolStats` directly: they raise `PoolEvent`s and the accountant folds
// them in. Folding is staged on a copy so an overflow anywhere in an
// operation rejects the whole operation with nothing written.

use crate::errors::{InsuranceError, LedgerResult};
use crate::state::PoolStats;

/// Pool-relevant effect of a ledger operation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PoolEvent {
    /// New policy: premium charged, coverage added to exposure
    PolicyIssued { premium: u64, coverage: u64 },
    /// Expired or replaced policy leaves the exposure total
    PolicyReleased { coverage: u64 },
    /// Approved claim paid out
    ClaimSettled { payout: u64, exposure_released: u64 },
    ClaimRejected,
}

impl PoolStats {
    pub fn record_premium(&mut self, amount: u64) -> LedgerResult<()> {
        self.total_premiums = self
            .total_premiums
            .checked_add(amount)
            .ok_or(InsuranceError::ArithmeticOverflow)?;
        Ok(())
    }

    /// Signed change to outstanding exposure. Going below zero is treated
    /// the same as overflow: the books no longer match issued policies.
    pub fn record_exposure(&mut self, delta: i64) -> LedgerResult<()> {
        self.outstanding_exposure = self
            .outstanding_exposure
            .checked_add_signed(delta)
            .ok_or(InsuranceError::ArithmeticOverflow)?;
        Ok(())
    }

    pub fn record_payout(&mut self, amount: u64) -> LedgerResult<()> {
        self.total_payouts = self
            .total_payouts
            .checked_add(amount)
            .ok_or(InsuranceError::ArithmeticOverflow)?;
        Ok(())
    }

    /// Stats after `event`, leaving `self` untouched
    pub fn absorb(&self, event: &PoolEvent) -> LedgerResult<PoolStats> {
        let mut next = self.clone();
        match *event {
            PoolEvent::PolicyIssued { premium, coverage } => {
                next.record_premium(premium)?;
                next.record_exposure(to_delta(coverage)?)?;
                next.policies_issued = bump_counter(next.policies_issued)?;
            }
            PoolEvent::PolicyReleased { coverage } => {
                next.record_exposure(-to_delta(coverage)?)?;
            }
            PoolEvent::ClaimSettled { payout, exposure_released } => {
                next.record_payout(payout)?;
                next.record_exposure(-to_delta(exposure_released)?)?;
                next.claims_approved = bump_counter(next.claims_approved)?;
            }
            PoolEvent::ClaimRejected => {
                next.claims_rejected = bump_counter(next.claims_rejected)?;
            }
        }
        Ok(next)
    }

    /// Stats after every event in order, or the first overflow
    pub fn absorb_all(&self, events: &[PoolEvent]) -> LedgerResult<PoolStats> {
        events
            .iter()
            .try_fold(self.clone(), |stats, event| stats.absorb(event))
    }

    /// `total_premiums + external_reserve - total_payouts`. The core only
    /// reports this; circuit breaking belongs to a layer above.
    pub fn solvency_margin(&self, external_reserve: u64) -> i128 {
        self.total_premiums as i128 + external_reserve as i128 - self.total_payouts as i128
    }

    pub fn is_solvent(&self, external_reserve: u64) -> bool {
        self.solvency_margin(external_reserve) >= 0
    }
}

fn to_delta(amount: u64) -> LedgerResult<i64> {
    i64::try_from(amount).map_err(|_| InsuranceError::ArithmeticOverflow)
}

fn bump_counter(value: u64) -> LedgerResult<u64> {
    value.checked_add(1).ok_or(InsuranceError::ArithmeticOverflow)
}

/// Owner of the `PoolStats` singleton
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PoolAccountant {
    stats: PoolStats,
}

impl PoolAccountant {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> &PoolStats {
        &self.stats
    }

    /// Stats after all `events`, or the first overflow. Nothing is written.
    pub fn preview(&self, events: &[PoolEvent]) -> LedgerResult<PoolStats> {
        self.stats.absorb_all(events)
    }

    /// Install stats produced by `preview`
    pub fn commit(&mut self, next: PoolStats) {
        self.stats = next;
    }

    /// Fold `events` in atomically
    pub fn observe(&mut self, events: &[PoolEvent]) -> LedgerResult<()> {
        let next = self.preview(events)?;
        self.commit(next);
        Ok(())
    }
}

// =============================================================================
// UNIT TESTS
// =============================================================================
