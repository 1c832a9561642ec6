//! JSON shapes returned by the read endpoints. Identities are hex strings.

use mutual_types::{Claim, ClaimStatus, Policy};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PolicyView {
    pub id: u64,
    pub holder: String,
    pub coverage_amount: u64,
    pub premium_paid: u64,
    pub start_time: u64,
    pub end_time: u64,
    pub is_active: bool,
    pub has_claimed: bool,
}

impl From<&Policy> for PolicyView {
    fn from(policy: &Policy) -> Self {
        Self {
            id: policy.id,
            holder: hex::encode(policy.holder),
            coverage_amount: policy.coverage_amount,
            premium_paid: policy.premium_paid,
            start_time: policy.start_time,
            end_time: policy.end_time,
            is_active: policy.is_active,
            has_claimed: policy.has_claimed,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ClaimView {
    pub id: u64,
    pub policy_id: u64,
    pub claimant: String,
    pub amount: u64,
    pub timestamp: u64,
    pub processed: bool,
    pub approved: bool,
    pub status: ClaimStatus,
    pub description: String,
}

impl From<&Claim> for ClaimView {
    fn from(claim: &Claim) -> Self {
        Self {
            id: claim.id,
            policy_id: claim.policy_id,
            claimant: hex::encode(claim.claimant),
            amount: claim.amount,
            timestamp: claim.timestamp,
            processed: claim.processed,
            approved: claim.approved,
            status: claim.status(),
            description: claim.description.clone(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PoolView {
    /// Funds held by the program.
    pub pool_balance: u64,
    /// Pool ledger counter; equal to `pool_balance` in every reachable state.
    pub ledger_balance: u64,
    pub policies: u64,
    pub claims: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ContributionView {
    pub contributor: String,
    pub total: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AccountView {
    pub address: String,
    pub nonce: u64,
    pub balance: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SubmittedView {
    pub tx_id: String,
}
