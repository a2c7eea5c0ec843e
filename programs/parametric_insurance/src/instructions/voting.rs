// programs/parametric_insurance/src/instructions/voting.rs

use anchor_lang::prelude::*;
use crate::state::{ProtocolConfig, Claim, VoteRecord};
use crate::errors::InsuranceError;
use crate::events::VoteCast;

/// Cast one vote on a pending claim
#[derive(Accounts)]
#[instruction(claim_id: u64)]
pub struct CastVote<'info> {
    #[account(
        seeds = [ProtocolConfig::SEED_PREFIX],
        bump = protocol_config.bump,
        constraint = protocol_config.is_active @ InsuranceError::ProtocolPaused
    )]
    pub protocol_config: Account<'info, ProtocolConfig>,

    #[account(
        mut,
        seeds = [Claim::SEED_PREFIX, &claim_id.to_le_bytes()],
        bump = claim.bump,
    )]
    pub claim: Account<'info, Claim>,

    /// One record per (claim, voter); an existing cast record is a duplicate
    #[account(
        init_if_needed,
        payer = voter,
        space = 8 + VoteRecord::INIT_SPACE,
        seeds = [VoteRecord::SEED_PREFIX, &claim_id.to_le_bytes(), voter.key().as_ref()],
        bump
    )]
    pub vote_record: Account<'info, VoteRecord>,

    #[account(mut)]
    pub voter: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn cast_vote(ctx: Context<CastVote>, claim_id: u64, in_favor: bool) -> Result<()> {
    let slot = Clock::get()?.slot;
    let voter = ctx.accounts.voter.key();
    let config = &ctx.accounts.protocol_config;
    let claim = &mut ctx.accounts.claim;

    claim.ensure_can_vote(&voter, slot, config.voting_ends_at(claim.created_at))?;
    require!(!ctx.accounts.vote_record.is_cast(), InsuranceError::DuplicateVote);
    claim.record_vote(in_favor)?;

    *ctx.accounts.vote_record = VoteRecord::new(claim_id, voter, in_favor, slot, ctx.bumps.vote_record);

    emit!(VoteCast {
        claim_id,
        voter,
        in_favor,
        votes_for: claim.votes_for,
        votes_against: claim.votes_against,
        slot,
    });

    Ok(())
}
