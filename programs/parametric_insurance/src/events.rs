// programs/parametric_insurance/src/events.rs

use crate::state::{ClaimStatus, ProtocolParams};
use anchor_lang::prelude::*;

/// Emitted when the protocol is initialized
#[event]
pub struct ProtocolInitialized {
    pub authority: Pubkey,
    pub params: ProtocolParams,
    pub slot: u64,
}

/// Emitted when protocol parameters change
#[event]
pub struct ProtocolParamsUpdated {
    pub authority: Pubkey,
    pub params: ProtocolParams,
    pub slot: u64,
}

/// Emitted when the protocol is paused or resumed
#[event]
pub struct ProtocolActiveChanged {
    pub authority: Pubkey,
    pub is_active: bool,
    pub slot: u64,
}

/// Emitted when a policy is purchased
#[event]
pub struct PolicyCreated {
    pub holder: Pubkey,
    pub coverage_amount: u64,
    pub premium_amount: u64,
    pub risk_score: u16,
    pub start_block: u64,
    pub end_block: u64,
}

/// Emitted when an expired policy releases its exposure
#[event]
pub struct PolicyExpired {
    pub holder: Pubkey,
    pub released_coverage: u64,
    pub cranked_by: Pubkey,
    pub slot: u64,
}

/// Emitted when a claim is filed
#[event]
pub struct ClaimFiled {
    pub claim_id: u64,
    pub policyholder: Pubkey,
    pub amount: u64,
    pub evidence_hash: [u8; 32],
    pub voting_ends_at: u64,
    pub slot: u64,
}

/// Emitted when a vote is cast
#[event]
pub struct VoteCast {
    pub claim_id: u64,
    pub voter: Pubkey,
    pub in_favor: bool,
    pub votes_for: u64,
    pub votes_against: u64,
    pub slot: u64,
}

/// Emitted when a claim is resolved
#[event]
pub struct ClaimResolved {
    pub claim_id: u64,
    pub policyholder: Pubkey,
    pub status: ClaimStatus,
    pub votes_for: u64,
    pub votes_against: u64,
    pub payout_amount: u64,
    pub new_risk_score: u16,
    pub slot: u64,
}
