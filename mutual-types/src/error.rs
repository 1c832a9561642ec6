use crate::{ClaimId, PolicyId};
use thiserror::Error;

/// Why an input was rejected before any state was consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidInput {
    #[error("amount must be greater than zero")]
    ZeroAmount,
    #[error("duration of {0} days is outside the 30..=365 day window")]
    DurationOutOfRange(u64),
    #[error("claim description must not be empty")]
    EmptyDescription,
    #[error("claim description is {len} bytes, limit is {max}")]
    DescriptionTooLong { len: usize, max: usize },
}

/// Every way an insurance operation can be rejected.
///
/// A rejection never leaves partial state behind: the caller sees the
/// ledger exactly as it was before the attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InsuranceError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInput),
    #[error("insufficient premium: required {required}, paid {paid}")]
    InsufficientPremium { required: u64, paid: u64 },
    #[error("caller is not the holder of policy {0}")]
    NotPolicyholder(PolicyId),
    #[error("policy {0} is not active")]
    PolicyInactive(PolicyId),
    #[error("policy {policy_id} expired at {end_time}, now {now}")]
    PolicyExpired { policy_id: PolicyId, end_time: u64, now: u64 },
    #[error("policy {0} has already paid out a claim")]
    AlreadyClaimed(PolicyId),
    #[error("claim amount {requested} exceeds coverage {coverage}")]
    ExceedsCoverage { requested: u64, coverage: u64 },
    #[error("insufficient pool: requested {requested}, available {available}")]
    InsufficientPool { requested: u64, available: u64 },
    #[error("caller is not the administrator")]
    Unauthorized,
    #[error("claim {0} not found")]
    ClaimNotFound(ClaimId),
    #[error("claim {0} has already been processed")]
    AlreadyProcessed(ClaimId),
    #[error("insufficient funds: needed {needed}, available {available}")]
    InsufficientFunds { needed: u64, available: u64 },
    #[error("arithmetic overflow")]
    Overflow,
}
