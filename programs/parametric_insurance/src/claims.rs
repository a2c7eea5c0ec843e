// programs/parametric_insurance/src/claims.rs
//
// Claim Ledger
// ============
// Claim lifecycle: Pending -> {Approved | Rejected}
//
// - Filing checks the holder's policy live and takes the next claim id
// - Any account except the claimant votes once per claim while voting is open
// - Once the voting period has elapsed anyone can resolve. Strict majority
//   approves, ties reject. Resolution settles the policy, rescores the
//   holder and posts the outcome to the pool in one step.

use anchor_lang::prelude::*;
use std::collections::BTreeMap;

use crate::errors::{InsuranceError, LedgerResult};
use crate::policy::PolicyLedger;
use crate::pool::{PoolAccountant, PoolEvent};
use crate::risk::RiskRegistry;
use crate::state::{Claim, ClaimDecision, ClaimStatus, Policy, PoolStats, ProtocolConfig, VoteRecord};

impl Claim {
    pub fn file(
        claim_id: u64,
        policy: &Policy,
        amount: u64,
        evidence_hash: [u8; 32],
        current_block: u64,
        bump: u8,
    ) -> Self {
        Self {
            claim_id,
            policyholder: policy.holder,
            policy_start_block: policy.start_block,
            amount,
            evidence_hash,
            votes_for: 0,
            votes_against: 0,
            status: ClaimStatus::Pending,
            created_at: current_block,
            resolved_at: 0,
            payout_amount: 0,
            bump,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == ClaimStatus::Pending
    }

    pub fn ensure_pending(&self) -> LedgerResult<()> {
        if !self.is_pending() {
            return Err(InsuranceError::ClaimAlreadyResolved);
        }
        Ok(())
    }

    /// Checks a ballot from `voter` against the claim itself. Duplicate
    /// ballots are caught by the vote record, after these checks.
    pub fn ensure_can_vote(&self, voter: &Pubkey, current_block: u64, voting_ends_at: u64) -> LedgerResult<()> {
        self.ensure_pending()?;
        if current_block >= voting_ends_at {
            return Err(InsuranceError::VotingClosed);
        }
        if *voter == self.policyholder {
            return Err(InsuranceError::ClaimantCannotVote);
        }
        Ok(())
    }

    pub fn ensure_resolvable(&self, current_block: u64, voting_ends_at: u64) -> LedgerResult<()> {
        self.ensure_pending()?;
        if current_block < voting_ends_at {
            return Err(InsuranceError::VotingPeriodNotElapsed);
        }
        Ok(())
    }

    pub fn record_vote(&mut self, in_favor: bool) -> LedgerResult<()> {
        let tally = if in_favor {
            &mut self.votes_for
        } else {
            &mut self.votes_against
        };
        *tally = tally.checked_add(1).ok_or(InsuranceError::ArithmeticOverflow)?;
        Ok(())
    }

    /// Strict majority of votes cast. No votes or a tie rejects.
    pub fn decide(&self) -> ClaimDecision {
        if self.votes_for > self.votes_against {
            ClaimDecision::Approved
        } else {
            ClaimDecision::Rejected
        }
    }

    pub fn close(&mut self, decision: ClaimDecision, payout: u64, current_block: u64) {
        self.status = decision.into();
        self.payout_amount = payout;
        self.resolved_at = current_block;
    }
}

impl VoteRecord {
    pub fn new(claim_id: u64, voter: Pubkey, in_favor: bool, cast_at: u64, bump: u8) -> Self {
        Self {
            claim_id,
            voter,
            in_favor,
            cast_at,
            bump,
        }
    }
}

/// Claim, policy and pool after closing a claim by its tally
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub decision: ClaimDecision,
    pub claim: Claim,
    pub policy: Policy,
    pub pool: PoolStats,
}

/// Settle `claim` against `policy` and post the outcome to `pool`.
/// The caller checks the voting window first. Nothing is written.
pub fn plan_resolution(
    claim: &Claim,
    policy: &Policy,
    pool: &PoolStats,
    current_block: u64,
) -> LedgerResult<Resolution> {
    claim.ensure_pending()?;
    let decision = claim.decide();

    let mut policy = policy.clone();
    let settlement = policy.settle(decision, claim.amount)?;

    let event = match decision {
        ClaimDecision::Approved => PoolEvent::ClaimSettled {
            payout: settlement.payout,
            exposure_released: settlement.exposure_released,
        },
        ClaimDecision::Rejected => PoolEvent::ClaimRejected,
    };
    let pool = pool.absorb(&event)?;

    let mut claim = claim.clone();
    claim.close(decision, settlement.payout, current_block);

    Ok(Resolution {
        decision,
        claim,
        policy,
        pool,
    })
}

/// Owner of every `Claim` and `VoteRecord`
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClaimLedger {
    claims: BTreeMap<u64, Claim>,
    votes: BTreeMap<(u64, Pubkey), VoteRecord>,
}

impl ClaimLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, claim_id: u64) -> Option<&Claim> {
        self.claims.get(&claim_id)
    }

    pub fn has_voted(&self, claim_id: u64, voter: &Pubkey) -> bool {
        self.votes.contains_key(&(claim_id, *voter))
    }

    pub fn vote_record(&self, claim_id: u64, voter: &Pubkey) -> Option<&VoteRecord> {
        self.votes.get(&(claim_id, *voter))
    }

    fn stage(&self, claim_id: u64) -> LedgerResult<Claim> {
        self.claims
            .get(&claim_id)
            .cloned()
            .ok_or(InsuranceError::ClaimNotFound)
    }

    /// File a claim against `sender`'s policy. Only a successful filing
    /// consumes a claim id.
    pub fn file_claim(
        &mut self,
        sender: &Pubkey,
        amount: u64,
        evidence_hash: [u8; 32],
        current_block: u64,
        config: &mut ProtocolConfig,
        policies: &mut PolicyLedger,
    ) -> LedgerResult<Claim> {
        let mut policy = policies.stage(sender)?;
        policy.ensure_claimable(amount, current_block)?;
        policy.record_filing()?;

        let mut next_config = config.clone();
        let claim_id = next_config.allocate_claim_id()?;
        let claim = Claim::file(claim_id, &policy, amount, evidence_hash, current_block, 0);

        *config = next_config;
        policies.commit(policy);
        self.claims.insert(claim_id, claim.clone());

        Ok(claim)
    }

    pub fn vote(
        &mut self,
        voter: &Pubkey,
        claim_id: u64,
        in_favor: bool,
        current_block: u64,
        config: &ProtocolConfig,
    ) -> LedgerResult<VoteRecord> {
        let mut claim = self.stage(claim_id)?;
        claim.ensure_can_vote(voter, current_block, config.voting_ends_at(claim.created_at))?;
        if self.has_voted(claim_id, voter) {
            return Err(InsuranceError::DuplicateVote);
        }
        claim.record_vote(in_favor)?;

        let record = VoteRecord::new(claim_id, *voter, in_favor, current_block, 0);
        self.votes.insert((claim_id, *voter), record.clone());
        self.claims.insert(claim_id, claim);

        Ok(record)
    }

    /// Close a claim by tally and apply the outcome to the policy, the
    /// holder's risk profile and the pool.
    pub fn resolve(
        &mut self,
        claim_id: u64,
        current_block: u64,
        config: &ProtocolConfig,
        policies: &mut PolicyLedger,
        risk: &mut RiskRegistry,
        pool: &mut PoolAccountant,
    ) -> LedgerResult<Claim> {
        let claim = self.stage(claim_id)?;
        claim.ensure_resolvable(current_block, config.voting_ends_at(claim.created_at))?;
        let policy = policies.stage(&claim.policyholder)?;

        let resolution = plan_resolution(&claim, &policy, pool.stats(), current_block)?;

        pool.commit(resolution.pool);
        policies.commit(resolution.policy);
        risk.apply_outcome(
            &claim.policyholder,
            resolution.decision == ClaimDecision::Approved,
            current_block,
            &config.params,
        );
        self.claims.insert(claim_id, resolution.claim.clone());

        Ok(resolution.claim)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Claim> {
        self.claims.values()
    }

    pub fn len(&self) -> usize {
        self.claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }
}

// =============================================================================
// UNIT TESTS
// =============================================================================
