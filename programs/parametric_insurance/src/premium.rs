// programs/parametric_insurance/src/premium.rs
//
// Premium Engine
// ==============
// Risk-adjusted premium pricing. Pure integer arithmetic:
//
//   premium = coverage * BASE_RATE_BPS * (RISK_SCALE + score * RISK_MULTIPLIER)
//             / (BPS_DENOMINATOR * RISK_SCALE)
//
// Every multiplication happens before the single truncating division so the
// result does not drift with evaluation order.

use crate::state::RiskProfile;

/// Base rate in basis points of coverage (100 = 1%)
pub const BASE_RATE_BPS: u64 = 100;

/// Risk loading per score point, in thousandths
pub const RISK_MULTIPLIER: u64 = 200;

pub const BPS_DENOMINATOR: u64 = 10_000;

/// Fixed-point scale of the risk factor
pub const RISK_SCALE: u64 = 1_000;

/// Premium for `coverage_amount` at `risk_score`.
///
/// Total over all inputs: scores above the maximum are clamped, results
/// beyond `u64::MAX` saturate, and any positive coverage costs at least 1.
/// Non-decreasing in both arguments.
pub fn calculate_premium(coverage_amount: u64, risk_score: u16) -> u64 {
    if coverage_amount == 0 {
        return 0;
    }

    let score = risk_score.min(RiskProfile::MAX_SCORE) as u128;
    let risk_factor = RISK_SCALE as u128 + score * RISK_MULTIPLIER as u128;

    let numerator = coverage_amount as u128 * BASE_RATE_BPS as u128 * risk_factor;
    let premium = numerator / (BPS_DENOMINATOR as u128 * RISK_SCALE as u128);

    u64::try_from(premium).unwrap_or(u64::MAX).max(1)
}

// =============================================================================
// UNIT TESTS
// =============================================================================
