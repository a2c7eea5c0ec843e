// programs/parametric_insurance/src/ledger.rs
//
// Protocol State
// ==============
// The whole protocol as one value. Each component owns its own mapping and
// cross-component updates go through explicit calls, so an operation either
// commits everywhere or nowhere. The same entry points are exposed as
// `Operation` values so any history can be replayed from genesis.

use anchor_lang::prelude::*;

use crate::claims::ClaimLedger;
use crate::errors::{InsuranceError, LedgerResult};
use crate::policy::PolicyLedger;
use crate::pool::PoolAccountant;
use crate::premium::calculate_premium;
use crate::risk::RiskRegistry;
use crate::state::{
    Claim, ClaimDecision, Policy, PoolStats, ProtocolConfig, ProtocolParams, RiskProfile, VoteRecord,
};

/// Caller and block height of one operation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TxContext {
    pub sender: Pubkey,
    pub block_height: u64,
}

impl TxContext {
    pub fn new(sender: Pubkey, block_height: u64) -> Self {
        Self {
            sender,
            block_height,
        }
    }
}

/// A state-changing entry point with its arguments
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operation {
    CreatePolicy { coverage_amount: u64, duration: u64 },
    FileClaim { amount: u64, evidence_hash: [u8; 32] },
    Vote { claim_id: u64, in_favor: bool },
    Resolve { claim_id: u64 },
    ExpirePolicy { holder: Pubkey },
    UpdateParams { params: ProtocolParams },
    SetProtocolActive { is_active: bool },
}

/// Successful result of an `Operation`
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Receipt {
    PolicyCreated(Policy),
    ClaimFiled { claim_id: u64 },
    VoteCast(VoteRecord),
    ClaimResolved { claim_id: u64, decision: ClaimDecision, payout: u64 },
    PolicyExpired { released_coverage: u64 },
    ParamsUpdated(ProtocolParams),
    ProtocolActiveChanged(bool),
}

/// Receipt, or the protocol error code a caller would see
pub type TxOutcome = std::result::Result<Receipt, u16>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProtocolState {
    config: ProtocolConfig,
    risk: RiskRegistry,
    policies: PolicyLedger,
    claims: ClaimLedger,
    pool: PoolAccountant,
}

impl ProtocolState {
    pub fn genesis(authority: Pubkey, params: ProtocolParams) -> LedgerResult<Self> {
        params.validate()?;
        Ok(Self {
            config: ProtocolConfig::genesis(authority, params, 0),
            risk: RiskRegistry::new(),
            policies: PolicyLedger::new(),
            claims: ClaimLedger::new(),
            pool: PoolAccountant::new(),
        })
    }

    fn ensure_active(&self) -> LedgerResult<()> {
        if !self.config.is_active {
            return Err(InsuranceError::ProtocolPaused);
        }
        Ok(())
    }

    fn ensure_authority(&self, ctx: &TxContext) -> LedgerResult<()> {
        if ctx.sender != self.config.authority {
            return Err(InsuranceError::Unauthorized);
        }
        Ok(())
    }

    // ==================== POLICIES ====================

    pub fn create_policy(&mut self, ctx: &TxContext, coverage_amount: u64, duration: u64) -> LedgerResult<Policy> {
        self.ensure_active()?;
        self.policies.create_policy(
            &ctx.sender,
            coverage_amount,
            duration,
            ctx.block_height,
            &mut self.risk,
            &mut self.pool,
        )
    }

    pub fn expire_policy(&mut self, ctx: &TxContext, holder: &Pubkey) -> LedgerResult<u64> {
        self.policies
            .expire_policy(holder, ctx.block_height, &mut self.pool)
    }

    // ==================== CLAIMS ====================

    pub fn file_claim(&mut self, ctx: &TxContext, amount: u64, evidence_hash: [u8; 32]) -> LedgerResult<u64> {
        self.ensure_active()?;
        let claim = self.claims.file_claim(
            &ctx.sender,
            amount,
            evidence_hash,
            ctx.block_height,
            &mut self.config,
            &mut self.policies,
        )?;
        Ok(claim.claim_id)
    }

    pub fn vote(&mut self, ctx: &TxContext, claim_id: u64, in_favor: bool) -> LedgerResult<VoteRecord> {
        self.ensure_active()?;
        self.claims
            .vote(&ctx.sender, claim_id, in_favor, ctx.block_height, &self.config)
    }

    pub fn resolve(&mut self, ctx: &TxContext, claim_id: u64) -> LedgerResult<Claim> {
        self.claims.resolve(
            claim_id,
            ctx.block_height,
            &self.config,
            &mut self.policies,
            &mut self.risk,
            &mut self.pool,
        )
    }

    // ==================== ADMIN ====================

    pub fn update_params(&mut self, ctx: &TxContext, params: ProtocolParams) -> LedgerResult<()> {
        self.ensure_authority(ctx)?;
        params.validate()?;
        self.config.params = params;
        Ok(())
    }

    pub fn set_protocol_active(&mut self, ctx: &TxContext, is_active: bool) -> LedgerResult<()> {
        self.ensure_authority(ctx)?;
        self.config.is_active = is_active;
        Ok(())
    }

    // ==================== QUERIES ====================

    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    pub fn get_policy(&self, holder: &Pubkey) -> Option<Policy> {
        self.policies.get(holder).cloned()
    }

    pub fn get_claim(&self, claim_id: u64) -> Option<Claim> {
        self.claims.get(claim_id).cloned()
    }

    pub fn get_risk_profile(&self, holder: &Pubkey) -> Option<RiskProfile> {
        self.risk.get(holder).cloned()
    }

    pub fn get_pool_stats(&self) -> PoolStats {
        self.pool.stats().clone()
    }

    pub fn is_active(&self, holder: &Pubkey, current_block: u64) -> bool {
        self.policies.is_active(holder, current_block)
    }

    pub fn has_voted(&self, claim_id: u64, voter: &Pubkey) -> bool {
        self.claims.has_voted(claim_id, voter)
    }

    /// Premium `holder` would pay for `coverage_amount` at `current_block`
    pub fn quote_premium(&self, holder: &Pubkey, coverage_amount: u64, current_block: u64) -> u64 {
        let profile = self.risk.get_or_default(holder, current_block);
        calculate_premium(coverage_amount, profile.score)
    }

    /// Exposure recomputed from policies, for reconciliation against the
    /// pool's running total
    pub fn computed_exposure(&self) -> u128 {
        self.policies
            .iter()
            .map(|policy| policy.held_exposure() as u128)
            .sum()
    }

    // ==================== REPLAY ====================

    pub fn execute(&mut self, ctx: &TxContext, op: &Operation) -> LedgerResult<Receipt> {
        match op {
            Operation::CreatePolicy {
                coverage_amount,
                duration,
            } => self
                .create_policy(ctx, *coverage_amount, *duration)
                .map(Receipt::PolicyCreated),
            Operation::FileClaim {
                amount,
                evidence_hash,
            } => self
                .file_claim(ctx, *amount, *evidence_hash)
                .map(|claim_id| Receipt::ClaimFiled { claim_id }),
            Operation::Vote {
                claim_id,
                in_favor,
            } => self
                .vote(ctx, *claim_id, *in_favor)
                .map(Receipt::VoteCast),
            Operation::Resolve { claim_id } => self.resolve(ctx, *claim_id).map(|claim| {
                Receipt::ClaimResolved {
                    claim_id: claim.claim_id,
                    decision: claim.decide(),
                    payout: claim.payout_amount,
                }
            }),
            Operation::ExpirePolicy { holder } => self
                .expire_policy(ctx, holder)
                .map(|released_coverage| Receipt::PolicyExpired { released_coverage }),
            Operation::UpdateParams { params } => self
                .update_params(ctx, *params)
                .map(|()| Receipt::ParamsUpdated(*params)),
            Operation::SetProtocolActive { is_active } => self
                .set_protocol_active(ctx, *is_active)
                .map(|()| Receipt::ProtocolActiveChanged(*is_active)),
        }
    }

    /// Apply `history` to a fresh genesis state. Failed operations are
    /// recorded and leave the state untouched.
    pub fn replay(
        authority: Pubkey,
        params: ProtocolParams,
        history: &[(TxContext, Operation)],
    ) -> LedgerResult<(Self, Vec<TxOutcome>)> {
        let mut state = Self::genesis(authority, params)?;
        let outcomes = history
            .iter()
            .map(|(ctx, op)| state.execute(ctx, op).map_err(|err| err.abi_code()))
            .collect();
        Ok((state, outcomes))
    }
}

// =============================================================================
// UNIT TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ClaimStatus;
    use proptest::prelude::*;

    const EVIDENCE: [u8; 32] = [9u8; 32];

    fn key(seed: u8) -> Pubkey {
        Pubkey::new_from_array([seed; 32])
    }

    fn authority() -> Pubkey {
        key(200)
    }

    fn state() -> ProtocolState {
        ProtocolState::genesis(authority(), ProtocolParams::default()).unwrap()
    }

    fn at(sender: Pubkey, block_height: u64) -> TxContext {
        TxContext::new(sender, block_height)
    }

    /// Holder with a 2_000_000 policy bought at block 1000
    fn insured() -> (ProtocolState, Pubkey) {
        let mut s = state();
        let holder = key(1);
        s.create_policy(&at(holder, 1000), 2_000_000, 1000).unwrap();
        (s, holder)
    }

    #[test]
    fn test_genesis_rejects_invalid_params() {
        let params = ProtocolParams {
            voting_period_blocks: 0,
            ..ProtocolParams::default()
        };
        let err = ProtocolState::genesis(authority(), params).unwrap_err();
        assert_eq!(err.abi_code(), 304);
    }

    #[test]
    fn test_create_policy_example() {
        let (s, holder) = insured();
        let policy = s.get_policy(&holder).unwrap();

        assert_eq!(policy.coverage_amount, 2_000_000);
        assert!(policy.active);
        assert_eq!(policy.start_block, 1000);
        assert_eq!(policy.end_block, 2000);
        assert_eq!(policy.premium_amount, calculate_premium(2_000_000, 500));
        assert_eq!(policy.risk_score, 500);
        assert!(s.is_active(&holder, 1000));

        let profile = s.get_risk_profile(&holder).unwrap();
        assert_eq!(profile.score, 500);
        assert_eq!(profile.last_updated, 1000);

        let pool = s.get_pool_stats();
        assert_eq!(pool.total_premiums, policy.premium_amount);
        assert_eq!(pool.outstanding_exposure, 2_000_000);
    }

    #[test]
    fn test_create_policy_below_minimum_changes_nothing() {
        let mut s = state();
        let before = s.clone();

        let err = s.create_policy(&at(key(1), 1000), 500_000, 1000).unwrap_err();
        assert_eq!(err.abi_code(), 101);
        assert_eq!(s, before);
        assert!(s.get_risk_profile(&key(1)).is_none());
    }

    #[test]
    fn test_create_policy_zero_duration() {
        let mut s = state();
        let err = s.create_policy(&at(key(1), 1000), 2_000_000, 0).unwrap_err();
        assert_eq!(err.abi_code(), 102);
    }

    #[test]
    fn test_file_claim_examples() {
        let (mut s, holder) = insured();
        let ctx = at(holder, 1100);

        assert_eq!(s.file_claim(&ctx, 600_000, EVIDENCE).unwrap(), 1);
        assert_eq!(s.get_claim(1).unwrap().status, ClaimStatus::Pending);
        assert_eq!(s.file_claim(&ctx, 400_000, EVIDENCE).unwrap_err().abi_code(), 101);
        assert_eq!(s.file_claim(&ctx, 3_000_000, EVIDENCE).unwrap_err().abi_code(), 105);
        assert_eq!(s.get_policy(&holder).unwrap().claims_filed, 1);
    }

    #[test]
    fn test_file_claim_without_policy() {
        let mut s = state();
        let err = s.file_claim(&at(key(3), 1000), 600_000, EVIDENCE).unwrap_err();
        assert!(matches!(err, InsuranceError::PolicyNotFound));
        assert_eq!(err.abi_code(), 102);
    }

    #[test]
    fn test_file_claim_after_expiry_block() {
        let (mut s, holder) = insured();
        let err = s.file_claim(&at(holder, 2001), 600_000, EVIDENCE).unwrap_err();
        assert_eq!(err.abi_code(), 103);
    }

    #[test]
    fn test_claim_ids_strictly_increase_across_failures() {
        let (mut s, holder) = insured();
        let other = key(2);
        s.create_policy(&at(other, 1000), 5_000_000, 1000).unwrap();

        let mut ids = Vec::new();
        ids.push(s.file_claim(&at(holder, 1100), 600_000, EVIDENCE).unwrap());
        assert!(s.file_claim(&at(holder, 1101), 100, EVIDENCE).is_err());
        ids.push(s.file_claim(&at(other, 1102), 700_000, EVIDENCE).unwrap());
        assert!(s.file_claim(&at(key(7), 1103), 700_000, EVIDENCE).is_err());
        ids.push(s.file_claim(&at(holder, 1104), 500_000, EVIDENCE).unwrap());

        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(s.config().next_claim_id, 4);
    }

    #[test]
    fn test_resolve_before_window_then_twice() {
        let (mut s, holder) = insured();
        let id = s.file_claim(&at(holder, 1100), 600_000, EVIDENCE).unwrap();
        s.vote(&at(key(10), 1150), id, true).unwrap();

        assert_eq!(s.resolve(&at(key(11), 1199), id).unwrap_err().abi_code(), 204);

        let resolved = s.resolve(&at(key(11), 1200), id).unwrap();
        assert_eq!(resolved.status, ClaimStatus::Approved);
        let snapshot = s.clone();

        assert_eq!(s.resolve(&at(key(11), 1300), id).unwrap_err().abi_code(), 202);
        assert_eq!(s, snapshot);
        let claim = s.get_claim(id).unwrap();
        assert_eq!(claim.status, ClaimStatus::Approved);
        assert_eq!(claim.votes_for, 1);
        assert_eq!(claim.votes_against, 0);
    }

    #[test]
    fn test_vote_check_order() {
        let (mut s, holder) = insured();
        let id = s.file_claim(&at(holder, 1100), 600_000, EVIDENCE).unwrap();
        let voter = key(10);

        assert_eq!(s.vote(&at(voter, 1150), 99, true).unwrap_err().abi_code(), 201);
        assert_eq!(s.vote(&at(holder, 1150), id, true).unwrap_err().abi_code(), 206);
        s.vote(&at(voter, 1150), id, true).unwrap();
        assert_eq!(s.vote(&at(voter, 1151), id, false).unwrap_err().abi_code(), 203);
        // Closed window wins over duplicate
        assert_eq!(s.vote(&at(voter, 1200), id, false).unwrap_err().abi_code(), 205);

        s.resolve(&at(voter, 1200), id).unwrap();
        assert_eq!(s.vote(&at(key(12), 1201), id, false).unwrap_err().abi_code(), 202);
        assert!(s.has_voted(id, &voter));
        assert!(!s.has_voted(id, &key(12)));
    }

    #[test]
    fn test_tie_and_silence_reject() {
        let (mut s, holder) = insured();
        let silent = s.file_claim(&at(holder, 1100), 600_000, EVIDENCE).unwrap();
        let tied = s.file_claim(&at(holder, 1100), 600_000, EVIDENCE).unwrap();
        s.vote(&at(key(10), 1110), tied, true).unwrap();
        s.vote(&at(key(11), 1110), tied, false).unwrap();

        assert_eq!(s.resolve(&at(key(10), 1200), silent).unwrap().status, ClaimStatus::Rejected);
        assert_eq!(s.resolve(&at(key(10), 1200), tied).unwrap().status, ClaimStatus::Rejected);

        let pool = s.get_pool_stats();
        assert_eq!(pool.claims_rejected, 2);
        assert_eq!(pool.total_payouts, 0);
        assert_eq!(pool.outstanding_exposure, 2_000_000);
        assert_eq!(s.get_risk_profile(&holder).unwrap().total_claims, 2);
        assert_eq!(s.get_policy(&holder).unwrap().open_claims, 0);
    }

    #[test]
    fn test_payout_capped_and_policy_exhausted() {
        let (mut s, holder) = insured();
        let first = s.file_claim(&at(holder, 1100), 1_500_000, EVIDENCE).unwrap();
        let second = s.file_claim(&at(holder, 1100), 1_500_000, EVIDENCE).unwrap();
        s.vote(&at(key(10), 1110), first, true).unwrap();
        s.vote(&at(key(10), 1110), second, true).unwrap();

        s.resolve(&at(key(10), 1200), first).unwrap();
        let capped = s.resolve(&at(key(10), 1200), second).unwrap();

        assert_eq!(capped.payout_amount, 500_000);
        let policy = s.get_policy(&holder).unwrap();
        assert_eq!(policy.coverage_amount, 0);
        assert_eq!(policy.total_paid, 2_000_000);
        assert!(!policy.active);
        assert!(!s.is_active(&holder, 1200));

        let pool = s.get_pool_stats();
        assert_eq!(pool.total_payouts, 2_000_000);
        assert_eq!(pool.outstanding_exposure, 0);
        assert_eq!(pool.claims_approved, 2);
        assert_eq!(s.get_risk_profile(&holder).unwrap().score, 600);
    }

    #[test]
    fn test_approved_claim_raises_future_premium() {
        let (mut s, holder) = insured();
        let quote_before = s.quote_premium(&holder, 2_000_000, 1100);
        let id = s.file_claim(&at(holder, 1100), 600_000, EVIDENCE).unwrap();
        s.vote(&at(key(10), 1110), id, true).unwrap();
        s.resolve(&at(key(10), 1200), id).unwrap();

        assert!(s.quote_premium(&holder, 2_000_000, 1200) > quote_before);
        // Issued policy keeps its snapshot
        assert_eq!(s.get_policy(&holder).unwrap().risk_score, 500);
    }

    #[test]
    fn test_repurchase_rules() {
        let (mut s, holder) = insured();

        assert_eq!(s.create_policy(&at(holder, 1500), 2_000_000, 1000).unwrap_err().abi_code(), 104);

        s.file_claim(&at(holder, 1900), 600_000, EVIDENCE).unwrap();
        assert_eq!(s.create_policy(&at(holder, 2001), 2_000_000, 1000).unwrap_err().abi_code(), 106);

        s.resolve(&at(key(10), 2001), 1).unwrap();
        let renewed = s.create_policy(&at(holder, 2001), 3_000_000, 500).unwrap();

        assert_eq!(renewed.start_block, 2001);
        assert_eq!(renewed.claims_filed, 0);
        let pool = s.get_pool_stats();
        assert_eq!(pool.outstanding_exposure, 3_000_000);
        assert_eq!(pool.policies_issued, 2);
        assert_eq!(pool.outstanding_exposure as u128, s.computed_exposure());
    }

    #[test]
    fn test_expire_crank() {
        let (mut s, holder) = insured();
        let cranker = at(key(50), 2000);

        assert_eq!(s.expire_policy(&cranker, &key(9)).unwrap_err().abi_code(), 102);
        assert_eq!(s.expire_policy(&cranker, &holder).unwrap_err().abi_code(), 104);

        let late = at(key(50), 2001);
        assert_eq!(s.expire_policy(&late, &holder).unwrap(), 2_000_000);
        assert_eq!(s.get_pool_stats().outstanding_exposure, 0);
        assert_eq!(s.expire_policy(&late, &holder).unwrap_err().abi_code(), 103);
    }

    #[test]
    fn test_admin_is_authority_gated() {
        let mut s = state();
        let params = ProtocolParams {
            voting_period_blocks: 10,
            ..ProtocolParams::default()
        };

        assert_eq!(s.update_params(&at(key(1), 0), params).unwrap_err().abi_code(), 302);
        assert_eq!(s.set_protocol_active(&at(key(1), 0), false).unwrap_err().abi_code(), 302);

        let bad = ProtocolParams {
            voting_period_blocks: 0,
            ..ProtocolParams::default()
        };
        assert_eq!(s.update_params(&at(authority(), 0), bad).unwrap_err().abi_code(), 304);

        s.update_params(&at(authority(), 0), params).unwrap();
        assert_eq!(s.config().params.voting_period_blocks, 10);
    }

    #[test]
    fn test_paused_protocol_blocks_new_business_only() {
        let (mut s, holder) = insured();
        let id = s.file_claim(&at(holder, 1100), 600_000, EVIDENCE).unwrap();
        s.set_protocol_active(&at(authority(), 1100), false).unwrap();

        assert_eq!(s.create_policy(&at(key(2), 1100), 2_000_000, 10).unwrap_err().abi_code(), 303);
        assert_eq!(s.file_claim(&at(holder, 1100), 600_000, EVIDENCE).unwrap_err().abi_code(), 303);
        assert_eq!(s.vote(&at(key(10), 1100), id, true).unwrap_err().abi_code(), 303);
        assert!(s.resolve(&at(key(10), 1200), id).is_ok());

        s.set_protocol_active(&at(authority(), 1300), true).unwrap();
        assert!(s.create_policy(&at(key(2), 1300), 2_000_000, 10).is_ok());
    }

    #[test]
    fn test_queries_do_not_mutate() {
        let (s, holder) = insured();
        let before = s.clone();

        let _ = s.get_policy(&holder);
        let _ = s.get_claim(1);
        let _ = s.get_risk_profile(&key(77));
        let _ = s.get_pool_stats();
        let _ = s.is_active(&holder, 1500);
        let _ = s.has_voted(1, &holder);
        let _ = s.quote_premium(&key(77), 2_000_000, 1500);

        assert_eq!(s, before);
        assert!(s.get_risk_profile(&key(77)).is_none());
    }

    #[test]
    fn test_execute_matches_direct_calls() {
        let (mut direct, holder) = insured();
        direct.file_claim(&at(holder, 1100), 600_000, EVIDENCE).unwrap();

        let (replayed, outcomes) = ProtocolState::replay(
            authority(),
            ProtocolParams::default(),
            &[
                (
                    at(holder, 1000),
                    Operation::CreatePolicy {
                        coverage_amount: 2_000_000,
                        duration: 1000,
                    },
                ),
                (
                    at(holder, 1100),
                    Operation::FileClaim {
                        amount: 600_000,
                        evidence_hash: EVIDENCE,
                    },
                ),
                (at(holder, 1100), Operation::Resolve { claim_id: 1 }),
            ],
        )
        .unwrap();

        assert_eq!(replayed, direct);
        assert_eq!(outcomes[1], Ok(Receipt::ClaimFiled { claim_id: 1 }));
        assert_eq!(outcomes[2], Err(204));
    }

    // ==================== PROPERTIES ====================

    const HOLDERS: u8 = 4;

    fn operation() -> impl Strategy<Value = Operation> {
        prop_oneof![
            (500_000u64..=3_000_000, 0u64..=300).prop_map(|(coverage_amount, duration)| {
                Operation::CreatePolicy {
                    coverage_amount,
                    duration,
                }
            }),
            (0u64..=3_500_000).prop_map(|amount| Operation::FileClaim {
                amount,
                evidence_hash: EVIDENCE,
            }),
            (1u64..=8, any::<bool>()).prop_map(|(claim_id, in_favor)| Operation::Vote {
                claim_id,
                in_favor,
            }),
            (1u64..=8).prop_map(|claim_id| Operation::Resolve { claim_id }),
            (0u8..HOLDERS).prop_map(|i| Operation::ExpirePolicy { holder: key(i) }),
        ]
    }

    /// Transactions at non-decreasing block heights from 1000
    fn history() -> impl Strategy<Value = Vec<(TxContext, Operation)>> {
        prop::collection::vec((0u8..HOLDERS + 2, 0u64..=60, operation()), 0..60).prop_map(|steps| {
            let mut block = 1000;
            steps
                .into_iter()
                .map(|(sender, gap, op)| {
                    block += gap;
                    (at(key(sender), block), op)
                })
                .collect()
        })
    }

    fn assert_invariants(s: &ProtocolState) {
        let pool = s.get_pool_stats();
        assert_eq!(pool.outstanding_exposure as u128, s.computed_exposure());
        assert_eq!(s.claims.len() as u64, s.config().next_claim_id - 1);
        for policy in s.policies.iter() {
            assert!(policy.start_block < policy.end_block);
            assert_eq!(policy.coverage_amount, policy.original_coverage - policy.total_paid);
        }
        let open: u64 = s.policies.iter().map(|p| p.open_claims as u64).sum();
        let pending = s.claims.iter().filter(|c| c.is_pending()).count() as u64;
        assert_eq!(open, pending);
    }

    proptest! {
        #[test]
        fn prop_replay_is_deterministic(history in history()) {
            let first = ProtocolState::replay(authority(), ProtocolParams::default(), &history).unwrap();
            let second = ProtocolState::replay(authority(), ProtocolParams::default(), &history).unwrap();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_failures_change_nothing_and_books_balance(history in history()) {
            let mut s = state();
            for (ctx, op) in &history {
                let before = s.clone();
                if s.execute(ctx, op).is_err() {
                    prop_assert_eq!(&s, &before);
                }
                assert_invariants(&s);
            }
        }
    }
}
