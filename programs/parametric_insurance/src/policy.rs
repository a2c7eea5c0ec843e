// programs/parametric_insurance/src/policy.rs
//
// Policy Ledger
// =============
// Policy lifecycle: {absent} -> active -> {expired | claim-exhausted}
//
// A holder has at most one policy record. A record can be replaced by a new
// purchase only once it is no longer live and every claim filed against it
// has been resolved.

use anchor_lang::prelude::*;
use std::collections::BTreeMap;

use crate::errors::{InsuranceError, LedgerResult};
use crate::pool::{PoolAccountant, PoolEvent};
use crate::premium::calculate_premium;
use crate::risk::RiskRegistry;
use crate::state::{Claim, ClaimDecision, Policy, PoolStats, RiskProfile};

/// Pool effect of settling one claim against a policy
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Settlement {
    pub payout: u64,
    pub exposure_released: u64,
}

impl Policy {
    /// Validate purchase terms and return the policy's end block
    pub fn validate_terms(coverage_amount: u64, duration: u64, current_block: u64) -> LedgerResult<u64> {
        if !(Self::MIN_COVERAGE..=Self::MAX_COVERAGE).contains(&coverage_amount) {
            return Err(InsuranceError::InvalidAmount);
        }
        if duration == 0 {
            return Err(InsuranceError::InvalidDuration);
        }
        current_block
            .checked_add(duration)
            .ok_or(InsuranceError::InvalidDuration)
    }

    pub fn issue(
        holder: Pubkey,
        coverage_amount: u64,
        duration: u64,
        risk_score: u16,
        current_block: u64,
        bump: u8,
    ) -> LedgerResult<Self> {
        let end_block = Self::validate_terms(coverage_amount, duration, current_block)?;

        Ok(Self {
            holder,
            coverage_amount,
            original_coverage: coverage_amount,
            premium_amount: calculate_premium(coverage_amount, risk_score),
            risk_score,
            start_block: current_block,
            end_block,
            claims_filed: 0,
            open_claims: 0,
            total_paid: 0,
            active: true,
            bump,
        })
    }

    /// Live check against block height, not just the stored flag
    pub fn is_active(&self, current_block: u64) -> bool {
        self.active && current_block <= self.end_block
    }

    /// Coverage this record still contributes to pool exposure
    pub fn held_exposure(&self) -> u64 {
        if self.active {
            self.coverage_amount
        } else {
            0
        }
    }

    pub fn ensure_replaceable(&self, current_block: u64) -> LedgerResult<()> {
        if self.is_active(current_block) {
            return Err(InsuranceError::PolicyAlreadyActive);
        }
        if self.open_claims > 0 {
            return Err(InsuranceError::ClaimsPending);
        }
        Ok(())
    }

    pub fn ensure_claimable(&self, amount: u64, current_block: u64) -> LedgerResult<()> {
        if !self.is_active(current_block) {
            return Err(InsuranceError::PolicyInactive);
        }
        if amount < Claim::MIN_CLAIM {
            return Err(InsuranceError::AmountBelowThreshold);
        }
        if amount > self.coverage_amount {
            return Err(InsuranceError::AmountExceedsCoverage);
        }
        Ok(())
    }

    pub fn record_filing(&mut self) -> LedgerResult<()> {
        self.claims_filed = self
            .claims_filed
            .checked_add(1)
            .ok_or(InsuranceError::ArithmeticOverflow)?;
        self.open_claims = self
            .open_claims
            .checked_add(1)
            .ok_or(InsuranceError::ArithmeticOverflow)?;
        Ok(())
    }

    /// Close one open claim. Approved payouts are capped at the remaining
    /// coverage and consume it; the policy deactivates at zero coverage.
    pub fn settle(&mut self, decision: ClaimDecision, requested: u64) -> LedgerResult<Settlement> {
        self.open_claims = self
            .open_claims
            .checked_sub(1)
            .ok_or(InsuranceError::ArithmeticOverflow)?;

        if decision == ClaimDecision::Rejected {
            return Ok(Settlement::default());
        }

        let payout = requested.min(self.coverage_amount);
        let exposure_released = if self.active { payout } else { 0 };

        self.coverage_amount -= payout;
        self.total_paid = self
            .total_paid
            .checked_add(payout)
            .ok_or(InsuranceError::ArithmeticOverflow)?;
        if self.coverage_amount == 0 {
            self.active = false;
        }

        Ok(Settlement {
            payout,
            exposure_released,
        })
    }

    /// Deactivate a policy past its end block, returning the released coverage
    pub fn expire(&mut self, current_block: u64) -> LedgerResult<u64> {
        if !self.active {
            return Err(InsuranceError::PolicyInactive);
        }
        if current_block <= self.end_block {
            return Err(InsuranceError::PolicyAlreadyActive);
        }
        self.active = false;
        Ok(self.coverage_amount)
    }
}

/// New policy for `profile.holder` and the pool after issuing it, replacing
/// `existing` if there is one. Nothing is written.
pub fn plan_purchase(
    profile: &RiskProfile,
    existing: Option<&Policy>,
    pool: &PoolStats,
    coverage_amount: u64,
    duration: u64,
    current_block: u64,
    bump: u8,
) -> LedgerResult<(Policy, PoolStats)> {
    let policy = Policy::issue(
        profile.holder,
        coverage_amount,
        duration,
        profile.score,
        current_block,
        bump,
    )?;

    let mut events = Vec::with_capacity(2);
    if let Some(existing) = existing {
        existing.ensure_replaceable(current_block)?;
        let held = existing.held_exposure();
        if held > 0 {
            events.push(PoolEvent::PolicyReleased { coverage: held });
        }
    }
    events.push(PoolEvent::PolicyIssued {
        premium: policy.premium_amount,
        coverage: policy.coverage_amount,
    });
    let next_pool = pool.absorb_all(&events)?;

    Ok((policy, next_pool))
}

/// Owner of every `Policy`, keyed by holder
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PolicyLedger {
    policies: BTreeMap<Pubkey, Policy>,
}

impl PolicyLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, holder: &Pubkey) -> Option<&Policy> {
        self.policies.get(holder)
    }

    pub fn is_active(&self, holder: &Pubkey, current_block: u64) -> bool {
        self.policies
            .get(holder)
            .map_or(false, |policy| policy.is_active(current_block))
    }

    /// Copy of a holder's policy to stage changes on
    pub fn stage(&self, holder: &Pubkey) -> LedgerResult<Policy> {
        self.policies
            .get(holder)
            .cloned()
            .ok_or(InsuranceError::PolicyNotFound)
    }

    /// Write back a staged policy
    pub fn commit(&mut self, policy: Policy) {
        self.policies.insert(policy.holder, policy);
    }

    /// Issue a policy for `sender`. All checks, including pool overflow,
    /// run before the first write.
    pub fn create_policy(
        &mut self,
        sender: &Pubkey,
        coverage_amount: u64,
        duration: u64,
        current_block: u64,
        risk: &mut RiskRegistry,
        pool: &mut PoolAccountant,
    ) -> LedgerResult<Policy> {
        let profile = risk.get_or_default(sender, current_block);
        let (policy, next_pool) = plan_purchase(
            &profile,
            self.policies.get(sender),
            pool.stats(),
            coverage_amount,
            duration,
            current_block,
            0,
        )?;

        pool.commit(next_pool);
        risk.materialize(sender, current_block);
        self.commit(policy.clone());

        Ok(policy)
    }

    /// Permissionless crank releasing an expired policy's exposure
    pub fn expire_policy(
        &mut self,
        holder: &Pubkey,
        current_block: u64,
        pool: &mut PoolAccountant,
    ) -> LedgerResult<u64> {
        let mut policy = self.stage(holder)?;
        let released = policy.expire(current_block)?;
        let next_pool = pool.preview(&[PoolEvent::PolicyReleased { coverage: released }])?;

        pool.commit(next_pool);
        self.commit(policy);

        Ok(released)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Policy> {
        self.policies.values()
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}

// =============================================================================
// UNIT TESTS
// =============================================================================
