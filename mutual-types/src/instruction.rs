use crate::{ClaimId, PolicyId};
use serde::{Deserialize, Serialize};

/// The state-mutating operations of the insurance ledger.
/// Read-only queries are served straight from `LedgerState`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum InsuranceInstruction {
    /// Buy coverage; the whole `payment` is pooled, overpayment included.
    PurchasePolicy {
        coverage_amount: u64,
        duration_days: u64,
        payment: u64,
    },
    SubmitClaim {
        policy_id: PolicyId,
        claim_amount: u64,
        description: String,
    },
    /// Administrator only.
    ProcessClaim { claim_id: ClaimId, approve: bool },
    Contribute { amount: u64 },
    /// Administrator only. Withdraws every held fund to the administrator.
    EmergencyDrain,
}

impl InsuranceInstruction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::PurchasePolicy { .. } => "purchase_policy",
            Self::SubmitClaim { .. } => "submit_claim",
            Self::ProcessClaim { .. } => "process_claim",
            Self::Contribute { .. } => "contribute",
            Self::EmergencyDrain => "emergency_drain",
        }
    }
}
