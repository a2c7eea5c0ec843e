// programs/parametric_insurance/src/state.rs

use anchor_lang::prelude::*;

use crate::errors::{InsuranceError, LedgerResult};

// =============================================================================
// PROTOCOL CONFIGURATION
// =============================================================================

/// Tunable protocol parameters, stored in `ProtocolConfig`.
/// Premium rates and coverage bounds are fixed constants and live on
/// `premium` and `Policy`/`Claim` instead.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, InitSpace)]
pub struct ProtocolParams {
    /// Blocks a claim stays open for voting after it is filed
    pub voting_period_blocks: u64,

    /// Score increase applied to a holder when one of their claims is approved
    pub approval_risk_increase: u16,

    /// Blocks without a risk update after which a rejected claim earns decay
    pub claim_free_interval_blocks: u64,

    /// Score decrease for a long claim-free interval
    pub claim_free_decay: u16,
}

impl ProtocolParams {
    pub const DEFAULT_VOTING_PERIOD_BLOCKS: u64 = 100;
    pub const DEFAULT_APPROVAL_RISK_INCREASE: u16 = 50;
    pub const DEFAULT_CLAIM_FREE_INTERVAL_BLOCKS: u64 = 10_000;
    pub const DEFAULT_CLAIM_FREE_DECAY: u16 = 25;

    pub fn validate(&self) -> LedgerResult<()> {
        if self.voting_period_blocks == 0
            || self.approval_risk_increase > RiskProfile::MAX_SCORE
            || self.claim_free_decay > RiskProfile::MAX_SCORE
        {
            return Err(InsuranceError::InvalidParams);
        }
        Ok(())
    }
}

impl Default for ProtocolParams {
    fn default() -> Self {
        Self {
            voting_period_blocks: Self::DEFAULT_VOTING_PERIOD_BLOCKS,
            approval_risk_increase: Self::DEFAULT_APPROVAL_RISK_INCREASE,
            claim_free_interval_blocks: Self::DEFAULT_CLAIM_FREE_INTERVAL_BLOCKS,
            claim_free_decay: Self::DEFAULT_CLAIM_FREE_DECAY,
        }
    }
}

/// Protocol configuration and global claim counter
/// PDA seeds: ["protocol_config"]
#[account]
#[derive(InitSpace, Debug, PartialEq, Eq)]
pub struct ProtocolConfig {
    /// Authority allowed to change parameters and pause the protocol
    pub authority: Pubkey,

    /// Tunable parameters
    pub params: ProtocolParams,

    /// Id the next successfully filed claim receives
    pub next_claim_id: u64,

    /// Is the protocol accepting new operations
    pub is_active: bool,

    /// Bump seed
    pub bump: u8,
}

impl ProtocolConfig {
    pub const SEED_PREFIX: &'static [u8] = b"protocol_config";
    pub const FIRST_CLAIM_ID: u64 = 1;

    pub fn genesis(authority: Pubkey, params: ProtocolParams, bump: u8) -> Self {
        Self {
            authority,
            params,
            next_claim_id: Self::FIRST_CLAIM_ID,
            is_active: true,
            bump,
        }
    }

    /// Consume the next claim id. Ids are never reused.
    pub fn allocate_claim_id(&mut self) -> LedgerResult<u64> {
        let id = self.next_claim_id;
        self.next_claim_id = id
            .checked_add(1)
            .ok_or(InsuranceError::ArithmeticOverflow)?;
        Ok(id)
    }

    /// First block at which voting is closed and the claim can be resolved
    pub fn voting_ends_at(&self, created_at: u64) -> u64 {
        created_at.saturating_add(self.params.voting_period_blocks)
    }
}

// =============================================================================
// RISK
// =============================================================================

/// Per-holder risk profile
/// PDA seeds: ["risk_profile", holder]
#[account]
#[derive(InitSpace, Debug, PartialEq, Eq)]
pub struct RiskProfile {
    /// Policyholder this profile belongs to
    pub holder: Pubkey,

    /// Risk score (0-1000, higher = riskier)
    pub score: u16,

    /// Block of the last score update
    pub last_updated: u64,

    /// Resolved claims, approved or rejected
    pub total_claims: u32,

    /// Approved claims
    pub approved_claims: u32,

    /// Bump seed
    pub bump: u8,
}

impl RiskProfile {
    pub const SEED_PREFIX: &'static [u8] = b"risk_profile";
    pub const DEFAULT_SCORE: u16 = 500;
    pub const MAX_SCORE: u16 = 1000;
}

// =============================================================================
// POLICIES
// =============================================================================

/// Coverage contract for a single holder
/// PDA seeds: ["policy", holder]
#[account]
#[derive(InitSpace, Debug, PartialEq, Eq)]
pub struct Policy {
    /// Policyholder
    pub holder: Pubkey,

    /// Remaining coverage (smallest currency unit)
    pub coverage_amount: u64,

    /// Coverage at issuance
    pub original_coverage: u64,

    /// Premium charged at issuance
    pub premium_amount: u64,

    /// Risk score snapshot at issuance
    pub risk_score: u16,

    /// Block the policy was issued at
    pub start_block: u64,

    /// Last block the policy covers
    pub end_block: u64,

    /// Claims ever filed against this policy
    pub claims_filed: u32,

    /// Claims filed and not yet resolved
    pub open_claims: u32,

    /// Sum of approved payouts
    pub total_paid: u64,

    /// Cleared on expiry crank or when coverage is exhausted
    pub active: bool,

    /// Bump seed
    pub bump: u8,
}

impl Policy {
    pub const SEED_PREFIX: &'static [u8] = b"policy";

    pub const MIN_COVERAGE: u64 = 1_000_000;
    pub const MAX_COVERAGE: u64 = 1_000_000_000;
}

// =============================================================================
// CLAIMS
// =============================================================================

/// Individual claim
/// PDA seeds: ["claim", claim_id]
#[account]
#[derive(InitSpace, Debug, PartialEq, Eq)]
pub struct Claim {
    /// Unique claim id
    pub claim_id: u64,

    /// Holder who filed the claim
    pub policyholder: Pubkey,

    /// Start block of the policy the claim was filed against
    pub policy_start_block: u64,

    /// Requested payout
    pub amount: u64,

    /// Opaque evidence digest
    pub evidence_hash: [u8; 32],

    pub votes_for: u64,

    pub votes_against: u64,

    pub status: ClaimStatus,

    /// Block the claim was filed at
    pub created_at: u64,

    /// Block the claim was resolved at (0 while pending)
    pub resolved_at: u64,

    /// Amount actually paid on approval
    pub payout_amount: u64,

    /// Bump seed
    pub bump: u8,
}

impl Claim {
    pub const SEED_PREFIX: &'static [u8] = b"claim";

    pub const MIN_CLAIM: u64 = 500_000;
}

/// Claim status state machine. `Approved` and `Rejected` are terminal.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, InitSpace, Default)]
pub enum ClaimStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

/// Outcome of resolving a claim
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClaimDecision {
    Approved,
    Rejected,
}

impl From<ClaimDecision> for ClaimStatus {
    fn from(decision: ClaimDecision) -> Self {
        match decision {
            ClaimDecision::Approved => ClaimStatus::Approved,
            ClaimDecision::Rejected => ClaimStatus::Rejected,
        }
    }
}

/// One voter's ballot on one claim
/// PDA seeds: ["vote", claim_id, voter]
#[account]
#[derive(InitSpace, Debug, PartialEq, Eq)]
pub struct VoteRecord {
    pub claim_id: u64,

    /// Default key until the ballot is cast
    pub voter: Pubkey,

    pub in_favor: bool,

    /// Block the vote was cast at
    pub cast_at: u64,

    /// Bump seed
    pub bump: u8,
}

impl VoteRecord {
    pub const SEED_PREFIX: &'static [u8] = b"vote";

    pub fn is_cast(&self) -> bool {
        self.voter != Pubkey::default()
    }
}

// =============================================================================
// POOL
// =============================================================================

/// Aggregate pool accounting
/// PDA seeds: ["pool_stats"]
#[account]
#[derive(InitSpace, Debug, PartialEq, Eq, Default)]
pub struct PoolStats {
    /// Premiums charged across all issued policies
    pub total_premiums: u64,

    /// Approved payouts
    pub total_payouts: u64,

    /// Remaining coverage of policies whose active flag is set
    pub outstanding_exposure: u64,

    pub policies_issued: u64,

    pub claims_approved: u64,

    pub claims_rejected: u64,

    /// Bump seed
    pub bump: u8,
}

impl PoolStats {
    pub const SEED_PREFIX: &'static [u8] = b"pool_stats";

    pub fn genesis(bump: u8) -> Self {
        Self {
            bump,
            ..Self::default()
        }
    }
}

// =============================================================================
// UNIT TESTS
// =============================================================================
