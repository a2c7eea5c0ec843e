// programs/parametric_insurance/src/instructions/resolution.rs

use anchor_lang::prelude::*;
use crate::state::{ProtocolConfig, Claim, ClaimDecision, Policy, RiskProfile, PoolStats};
use crate::events::ClaimResolved;
use crate::claims::plan_resolution;

/// Close a claim once its voting period has elapsed. Anyone can resolve.
#[derive(Accounts)]
#[instruction(claim_id: u64)]
pub struct ResolveClaim<'info> {
    #[account(
        seeds = [ProtocolConfig::SEED_PREFIX],
        bump = protocol_config.bump,
    )]
    pub protocol_config: Account<'info, ProtocolConfig>,

    #[account(
        mut,
        seeds = [Claim::SEED_PREFIX, &claim_id.to_le_bytes()],
        bump = claim.bump,
    )]
    pub claim: Account<'info, Claim>,

    #[account(
        mut,
        seeds = [Policy::SEED_PREFIX, claim.policyholder.as_ref()],
        bump = policy.bump,
    )]
    pub policy: Account<'info, Policy>,

    #[account(
        mut,
        seeds = [RiskProfile::SEED_PREFIX, claim.policyholder.as_ref()],
        bump = risk_profile.bump,
    )]
    pub risk_profile: Account<'info, RiskProfile>,

    #[account(
        mut,
        seeds = [PoolStats::SEED_PREFIX],
        bump = pool_stats.bump,
    )]
    pub pool_stats: Account<'info, PoolStats>,

    pub resolver: Signer<'info>,
}

pub fn resolve_claim(ctx: Context<ResolveClaim>, claim_id: u64) -> Result<ClaimDecision> {
    let slot = Clock::get()?.slot;
    let config = &ctx.accounts.protocol_config;

    let claim = &ctx.accounts.claim;
    claim.ensure_resolvable(slot, config.voting_ends_at(claim.created_at))?;

    let resolution = plan_resolution(claim, &ctx.accounts.policy, &ctx.accounts.pool_stats, slot)?;

    let risk_profile = &mut ctx.accounts.risk_profile;
    risk_profile.apply_outcome(
        resolution.decision == ClaimDecision::Approved,
        slot,
        &config.params,
    );

    emit!(ClaimResolved {
        claim_id,
        policyholder: resolution.claim.policyholder,
        status: resolution.claim.status,
        votes_for: resolution.claim.votes_for,
        votes_against: resolution.claim.votes_against,
        payout_amount: resolution.claim.payout_amount,
        new_risk_score: risk_profile.score,
        slot,
    });

    msg!(
        "Claim {} resolved {:?}, payout {}",
        claim_id,
        resolution.decision,
        resolution.claim.payout_amount
    );

    *ctx.accounts.claim = resolution.claim;
    *ctx.accounts.policy = resolution.policy;
    *ctx.accounts.pool_stats = resolution.pool;

    Ok(resolution.decision)
}
