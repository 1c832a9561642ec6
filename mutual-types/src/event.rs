use crate::{Address, ClaimId, PolicyId};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum Event {
    PolicyCreated {
        policy_id: PolicyId,
        holder: Address,
        coverage_amount: u64,
        premium: u64,
        end_time: u64,
    },
    PremiumPaid {
        policy_id: PolicyId,
        holder: Address,
        amount: u64,
    },
    ClaimSubmitted {
        claim_id: ClaimId,
        policy_id: PolicyId,
        claimant: Address,
        amount: u64,
    },
    /// `payout` is zero when the claim was denied.
    ClaimProcessed {
        claim_id: ClaimId,
        approved: bool,
        payout: u64,
    },
    ContributionMade {
        contributor: Address,
        amount: u64,
    },
}
