// programs/parametric_insurance/src/lib.rs
//
// Parametric Insurance Program
// ============================
// Decentralized parametric insurance:
// - Risk-adjusted policy pricing from each holder's claim history
// - Claim filing against live policies
// - Token-holder voting on claims with a fixed block window
// - Majority resolution with payout, rescoring and pool accounting
// - Permissionless expiry crank releasing pool exposure
//
// The `ledger` module runs the same rules as a plain in-memory state
// machine, used for deterministic replay and the test suite.

use anchor_lang::prelude::*;

pub mod claims;
pub mod errors;
pub mod events;
pub mod instructions;
pub mod ledger;
pub mod policy;
pub mod pool;
pub mod premium;
pub mod risk;
pub mod state;

use instructions::*;
use state::{ClaimDecision, ProtocolParams};

declare_id!("81qxRCdSDMFFt1jdxtXSEG3uZttCFVqjNz7ufkAHd25H");

#[program]
pub mod parametric_insurance {
    use super::*;

    // ==================== INITIALIZATION ====================

    /// Create the protocol config and pool singletons
    pub fn initialize_protocol(
        ctx: Context<InitializeProtocol>,
        params: InitializeProtocolParams,
    ) -> Result<()> {
        instructions::initialize::handler(ctx, params)
    }

    /// Replace the tunable parameters (authority only)
    pub fn update_protocol_params(ctx: Context<UpdateProtocol>, params: ProtocolParams) -> Result<()> {
        instructions::initialize::update_protocol_params(ctx, params)
    }

    /// Pause or resume new business (authority only)
    pub fn set_protocol_active(ctx: Context<UpdateProtocol>, is_active: bool) -> Result<()> {
        instructions::initialize::set_protocol_active(ctx, is_active)
    }

    // ==================== POLICIES ====================

    /// Buy a policy, or replace an expired or exhausted one
    pub fn create_policy(ctx: Context<CreatePolicy>, coverage_amount: u64, duration: u64) -> Result<()> {
        instructions::coverage::create_policy(ctx, coverage_amount, duration)
    }

    /// Deactivate a policy past its end block
    pub fn expire_policy(ctx: Context<ExpirePolicy>, holder: Pubkey) -> Result<()> {
        instructions::coverage::expire_policy(ctx, holder)
    }

    // ==================== CLAIMS ====================

    /// File a claim, returning its id
    pub fn file_claim(ctx: Context<FileClaim>, amount: u64, evidence_hash: [u8; 32]) -> Result<u64> {
        instructions::submission::file_claim(ctx, amount, evidence_hash)
    }

    pub fn cast_vote(ctx: Context<CastVote>, claim_id: u64, in_favor: bool) -> Result<()> {
        instructions::voting::cast_vote(ctx, claim_id, in_favor)
    }

    /// Resolve a claim after its voting period
    pub fn resolve_claim(ctx: Context<ResolveClaim>, claim_id: u64) -> Result<ClaimDecision> {
        instructions::resolution::resolve_claim(ctx, claim_id)
    }
}
