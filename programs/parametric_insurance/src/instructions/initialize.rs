// programs/parametric_insurance/src/instructions/initialize.rs

use anchor_lang::prelude::*;
use crate::state::{ProtocolConfig, ProtocolParams, PoolStats};
use crate::errors::InsuranceError;
use crate::events::{ProtocolInitialized, ProtocolParamsUpdated, ProtocolActiveChanged};

#[derive(Accounts)]
pub struct InitializeProtocol<'info> {
    #[account(
        init,
        payer = authority,
        space = 8 + ProtocolConfig::INIT_SPACE,
        seeds = [ProtocolConfig::SEED_PREFIX],
        bump
    )]
    pub protocol_config: Account<'info, ProtocolConfig>,

    #[account(
        init,
        payer = authority,
        space = 8 + PoolStats::INIT_SPACE,
        seeds = [PoolStats::SEED_PREFIX],
        bump
    )]
    pub pool_stats: Account<'info, PoolStats>,

    #[account(mut)]
    pub authority: Signer<'info>,

    pub system_program: Program<'info, System>,
}

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct InitializeProtocolParams {
    pub voting_period_blocks: Option<u64>,
    pub approval_risk_increase: Option<u16>,
    pub claim_free_interval_blocks: Option<u64>,
    pub claim_free_decay: Option<u16>,
}

pub fn handler(ctx: Context<InitializeProtocol>, params: InitializeProtocolParams) -> Result<()> {
    let clock = Clock::get()?;
    let authority = ctx.accounts.authority.key();

    let protocol_params = ProtocolParams {
        voting_period_blocks: params.voting_period_blocks
            .unwrap_or(ProtocolParams::DEFAULT_VOTING_PERIOD_BLOCKS),
        approval_risk_increase: params.approval_risk_increase
            .unwrap_or(ProtocolParams::DEFAULT_APPROVAL_RISK_INCREASE),
        claim_free_interval_blocks: params.claim_free_interval_blocks
            .unwrap_or(ProtocolParams::DEFAULT_CLAIM_FREE_INTERVAL_BLOCKS),
        claim_free_decay: params.claim_free_decay
            .unwrap_or(ProtocolParams::DEFAULT_CLAIM_FREE_DECAY),
    };
    protocol_params.validate()?;

    *ctx.accounts.protocol_config =
        ProtocolConfig::genesis(authority, protocol_params, ctx.bumps.protocol_config);
    *ctx.accounts.pool_stats = PoolStats::genesis(ctx.bumps.pool_stats);

    emit!(ProtocolInitialized {
        authority,
        params: protocol_params,
        slot: clock.slot,
    });

    msg!("Protocol initialized, voting period {} blocks", protocol_params.voting_period_blocks);

    Ok(())
}

/// Admin-only protocol changes
#[derive(Accounts)]
pub struct UpdateProtocol<'info> {
    #[account(
        mut,
        seeds = [ProtocolConfig::SEED_PREFIX],
        bump = protocol_config.bump,
    )]
    pub protocol_config: Account<'info, ProtocolConfig>,

    #[account(
        constraint = authority.key() == protocol_config.authority @ InsuranceError::Unauthorized
    )]
    pub authority: Signer<'info>,
}

pub fn update_protocol_params(ctx: Context<UpdateProtocol>, params: ProtocolParams) -> Result<()> {
    let clock = Clock::get()?;

    params.validate()?;
    ctx.accounts.protocol_config.params = params;

    emit!(ProtocolParamsUpdated {
        authority: ctx.accounts.authority.key(),
        params,
        slot: clock.slot,
    });

    Ok(())
}

pub fn set_protocol_active(ctx: Context<UpdateProtocol>, is_active: bool) -> Result<()> {
    let clock = Clock::get()?;

    ctx.accounts.protocol_config.is_active = is_active;

    emit!(ProtocolActiveChanged {
        authority: ctx.accounts.authority.key(),
        is_active,
        slot: clock.slot,
    });

    msg!("Protocol active: {}", is_active);

    Ok(())
}
