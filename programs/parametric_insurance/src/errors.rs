// programs/parametric_insurance/src/errors.rs

use anchor_lang::prelude::*;

/// Result type of the ledger layer. Converts into an Anchor error with `?`.
pub type LedgerResult<T> = std::result::Result<T, InsuranceError>;

#[error_code]
pub enum InsuranceError {
    // Policy validation
    #[msg("Coverage amount outside the allowed range")]
    InvalidAmount,

    #[msg("Policy duration must be a positive number of blocks")]
    InvalidDuration,

    #[msg("No policy exists for this holder")]
    PolicyNotFound,

    #[msg("Policy is not active")]
    PolicyInactive,

    #[msg("Holder already has a live policy")]
    PolicyAlreadyActive,

    #[msg("Policy still has unresolved claims")]
    ClaimsPending,

    // Claim validation
    #[msg("Claim amount below the minimum claim threshold")]
    AmountBelowThreshold,

    #[msg("Claim amount exceeds remaining coverage")]
    AmountExceedsCoverage,

    // Voting and resolution
    #[msg("Claim not found")]
    ClaimNotFound,

    #[msg("Claim already resolved")]
    ClaimAlreadyResolved,

    #[msg("Voter already voted on this claim")]
    DuplicateVote,

    #[msg("Voting period has not elapsed")]
    VotingPeriodNotElapsed,

    #[msg("Voting period has closed")]
    VotingClosed,

    #[msg("Policyholder cannot vote on their own claim")]
    ClaimantCannotVote,

    // Protocol
    #[msg("Arithmetic overflow in pool accounting")]
    ArithmeticOverflow,

    #[msg("Unauthorized: caller lacks permission")]
    Unauthorized,

    #[msg("Protocol is paused")]
    ProtocolPaused,

    #[msg("Invalid protocol parameters")]
    InvalidParams,
}

/// How a failure should be treated by the calling layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorClass {
    /// Bad caller input; nothing was written.
    Validation,
    /// Operation not allowed in the current ledger state; nothing was written.
    State,
    /// Accounting invariant would break. Indicates misconfigured constants.
    Fatal,
}

impl InsuranceError {
    /// Protocol ABI code returned to callers. Codes are shared between
    /// variants that report the same condition on different entry points.
    pub fn abi_code(&self) -> u16 {
        match self {
            InsuranceError::InvalidAmount => 101,
            InsuranceError::AmountBelowThreshold => 101,
            InsuranceError::InvalidDuration => 102,
            InsuranceError::PolicyNotFound => 102,
            InsuranceError::PolicyInactive => 103,
            InsuranceError::PolicyAlreadyActive => 104,
            InsuranceError::AmountExceedsCoverage => 105,
            InsuranceError::ClaimsPending => 106,
            InsuranceError::ClaimNotFound => 201,
            InsuranceError::ClaimAlreadyResolved => 202,
            InsuranceError::DuplicateVote => 203,
            InsuranceError::VotingPeriodNotElapsed => 204,
            InsuranceError::VotingClosed => 205,
            InsuranceError::ClaimantCannotVote => 206,
            InsuranceError::ArithmeticOverflow => 301,
            InsuranceError::Unauthorized => 302,
            InsuranceError::ProtocolPaused => 303,
            InsuranceError::InvalidParams => 304,
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            InsuranceError::InvalidAmount
            | InsuranceError::InvalidDuration
            | InsuranceError::AmountBelowThreshold
            | InsuranceError::AmountExceedsCoverage
            | InsuranceError::InvalidParams => ErrorClass::Validation,
            InsuranceError::ArithmeticOverflow => ErrorClass::Fatal,
            _ => ErrorClass::State,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.class() == ErrorClass::Fatal
    }
}
