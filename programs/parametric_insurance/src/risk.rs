// programs/parametric_insurance/src/risk.rs
//
// Risk Registry
// =============
// Risk score and claim history per policyholder. Profiles are materialized
// on the holder's first policy purchase and only rescored when one of their
// claims is resolved.

use anchor_lang::prelude::*;
use std::collections::BTreeMap;

use crate::state::{ProtocolParams, RiskProfile};

impl RiskProfile {
    /// Profile of a holder with no history
    pub fn default_for(holder: Pubkey, current_block: u64, bump: u8) -> Self {
        Self {
            holder,
            score: Self::DEFAULT_SCORE,
            last_updated: current_block,
            total_claims: 0,
            approved_claims: 0,
            bump,
        }
    }

    /// Rescore after a claim resolution.
    ///
    /// Approval raises the score and never lowers it. A rejection lowers it
    /// only when the holder went `claim_free_interval_blocks` without an update.
    pub fn apply_outcome(&mut self, claim_approved: bool, current_block: u64, params: &ProtocolParams) {
        self.total_claims = self.total_claims.saturating_add(1);

        if claim_approved {
            self.approved_claims = self.approved_claims.saturating_add(1);
            self.score = self
                .score
                .saturating_add(params.approval_risk_increase)
                .min(Self::MAX_SCORE);
        } else if current_block.saturating_sub(self.last_updated) >= params.claim_free_interval_blocks {
            self.score = self.score.saturating_sub(params.claim_free_decay);
        }

        self.last_updated = current_block;
    }
}

/// Owner of every `RiskProfile`, keyed by holder
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RiskRegistry {
    profiles: BTreeMap<Pubkey, RiskProfile>,
}

impl RiskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, holder: &Pubkey) -> Option<&RiskProfile> {
        self.profiles.get(holder)
    }

    /// Stored profile, or the default for `holder` without persisting it
    pub fn get_or_default(&self, holder: &Pubkey, current_block: u64) -> RiskProfile {
        self.profiles
            .get(holder)
            .cloned()
            .unwrap_or_else(|| RiskProfile::default_for(*holder, current_block, 0))
    }

    /// Persist the default profile if the holder has none
    pub fn materialize(&mut self, holder: &Pubkey, current_block: u64) -> &RiskProfile {
        self.profiles
            .entry(*holder)
            .or_insert_with(|| RiskProfile::default_for(*holder, current_block, 0))
    }

    pub fn apply_outcome(
        &mut self,
        holder: &Pubkey,
        claim_approved: bool,
        current_block: u64,
        params: &ProtocolParams,
    ) -> RiskProfile {
        let profile = self
            .profiles
            .entry(*holder)
            .or_insert_with(|| RiskProfile::default_for(*holder, current_block, 0));
        profile.apply_outcome(claim_approved, current_block, params);
        profile.clone()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

// =============================================================================
// UNIT TESTS
// =============================================================================
