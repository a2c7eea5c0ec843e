// programs/parametric_insurance/src/instructions/coverage.rs

use anchor_lang::prelude::*;
use crate::state::{ProtocolConfig, RiskProfile, Policy, PoolStats};
use crate::errors::InsuranceError;
use crate::events::{PolicyCreated, PolicyExpired};
use crate::policy::plan_purchase;
use crate::pool::PoolEvent;

/// Buy or renew coverage
#[derive(Accounts)]
pub struct CreatePolicy<'info> {
    #[account(
        seeds = [ProtocolConfig::SEED_PREFIX],
        bump = protocol_config.bump,
        constraint = protocol_config.is_active @ InsuranceError::ProtocolPaused
    )]
    pub protocol_config: Account<'info, ProtocolConfig>,

    #[account(
        mut,
        seeds = [PoolStats::SEED_PREFIX],
        bump = pool_stats.bump,
    )]
    pub pool_stats: Account<'info, PoolStats>,

    #[account(
        init_if_needed,
        payer = holder,
        space = 8 + RiskProfile::INIT_SPACE,
        seeds = [RiskProfile::SEED_PREFIX, holder.key().as_ref()],
        bump
    )]
    pub risk_profile: Account<'info, RiskProfile>,

    #[account(
        init_if_needed,
        payer = holder,
        space = 8 + Policy::INIT_SPACE,
        seeds = [Policy::SEED_PREFIX, holder.key().as_ref()],
        bump
    )]
    pub policy: Account<'info, Policy>,

    #[account(mut)]
    pub holder: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn create_policy(ctx: Context<CreatePolicy>, coverage_amount: u64, duration: u64) -> Result<()> {
    let slot = Clock::get()?.slot;
    let holder = ctx.accounts.holder.key();

    // Freshly created accounts are zeroed
    let profile_exists = ctx.accounts.risk_profile.holder == holder;
    let profile = if profile_exists {
        RiskProfile::clone(&ctx.accounts.risk_profile)
    } else {
        RiskProfile::default_for(holder, slot, ctx.bumps.risk_profile)
    };
    let existing = if ctx.accounts.policy.holder == holder {
        Some(Policy::clone(&ctx.accounts.policy))
    } else {
        None
    };

    let (policy, next_pool) = plan_purchase(
        &profile,
        existing.as_ref(),
        &ctx.accounts.pool_stats,
        coverage_amount,
        duration,
        slot,
        ctx.bumps.policy,
    )?;

    *ctx.accounts.pool_stats = next_pool;
    if !profile_exists {
        *ctx.accounts.risk_profile = profile;
    }

    emit!(PolicyCreated {
        holder,
        coverage_amount: policy.coverage_amount,
        premium_amount: policy.premium_amount,
        risk_score: policy.risk_score,
        start_block: policy.start_block,
        end_block: policy.end_block,
    });

    msg!(
        "Policy created: coverage {} premium {} until block {}",
        policy.coverage_amount,
        policy.premium_amount,
        policy.end_block
    );

    *ctx.accounts.policy = policy;

    Ok(())
}

/// Release the exposure of a policy past its end block. Anyone can crank.
#[derive(Accounts)]
#[instruction(holder: Pubkey)]
pub struct ExpirePolicy<'info> {
    #[account(
        mut,
        seeds = [Policy::SEED_PREFIX, holder.as_ref()],
        bump = policy.bump,
    )]
    pub policy: Account<'info, Policy>,

    #[account(
        mut,
        seeds = [PoolStats::SEED_PREFIX],
        bump = pool_stats.bump,
    )]
    pub pool_stats: Account<'info, PoolStats>,

    pub cranker: Signer<'info>,
}

pub fn expire_policy(ctx: Context<ExpirePolicy>, holder: Pubkey) -> Result<()> {
    let slot = Clock::get()?.slot;

    let mut policy = Policy::clone(&ctx.accounts.policy);
    let released = policy.expire(slot)?;
    let next_pool = ctx.accounts
        .pool_stats
        .absorb(&PoolEvent::PolicyReleased { coverage: released })?;

    *ctx.accounts.policy = policy;
    *ctx.accounts.pool_stats = next_pool;

    emit!(PolicyExpired {
        holder,
        released_coverage: released,
        cranked_by: ctx.accounts.cranker.key(),
        slot,
    });

    Ok(())
}
