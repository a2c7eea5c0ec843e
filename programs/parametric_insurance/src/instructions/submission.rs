// programs/parametric_insurance/src/instructions/submission.rs

use anchor_lang::prelude::*;
use crate::state::{ProtocolConfig, Policy, Claim};
use crate::errors::InsuranceError;
use crate::events::ClaimFiled;

/// File a claim against the signer's policy
#[derive(Accounts)]
pub struct FileClaim<'info> {
    #[account(
        mut,
        seeds = [ProtocolConfig::SEED_PREFIX],
        bump = protocol_config.bump,
        constraint = protocol_config.is_active @ InsuranceError::ProtocolPaused
    )]
    pub protocol_config: Account<'info, ProtocolConfig>,

    #[account(
        mut,
        seeds = [Policy::SEED_PREFIX, policyholder.key().as_ref()],
        bump = policy.bump,
    )]
    pub policy: Account<'info, Policy>,

    #[account(
        init,
        payer = policyholder,
        space = 8 + Claim::INIT_SPACE,
        seeds = [Claim::SEED_PREFIX, &protocol_config.next_claim_id.to_le_bytes()],
        bump
    )]
    pub claim: Account<'info, Claim>,

    #[account(mut)]
    pub policyholder: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn file_claim(ctx: Context<FileClaim>, amount: u64, evidence_hash: [u8; 32]) -> Result<u64> {
    let slot = Clock::get()?.slot;
    let config = &mut ctx.accounts.protocol_config;
    let policy = &mut ctx.accounts.policy;

    policy.ensure_claimable(amount, slot)?;
    policy.record_filing()?;
    let claim_id = config.allocate_claim_id()?;

    *ctx.accounts.claim = Claim::file(claim_id, policy, amount, evidence_hash, slot, ctx.bumps.claim);

    emit!(ClaimFiled {
        claim_id,
        policyholder: policy.holder,
        amount,
        evidence_hash,
        voting_ends_at: config.voting_ends_at(slot),
        slot,
    });

    msg!("Claim {} filed for {}", claim_id, amount);

    Ok(claim_id)
}
