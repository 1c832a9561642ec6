use crate::claim::{Claim, ClaimBook};
use crate::policy::{Policy, PolicyRegistry};
use crate::pool::PoolLedger;
use crate::{Address, ClaimId, PolicyId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountState {
    pub nonce: u64,
    pub balance: u64,
}

/// The whole ledger. Ordered maps keep `root_hash` deterministic.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerState {
    pub administrator: Address,
    pub accounts: BTreeMap<Address, AccountState>,
    /// Funds actually held by the insurance program.
    pub custody_balance: u64,
    pub pool: PoolLedger,
    pub policies: PolicyRegistry,
    pub claims: ClaimBook,
}

impl LedgerState {
    pub fn new(administrator: Address) -> Self {
        Self {
            administrator,
            ..Default::default()
        }
    }

    pub fn root_hash(&self) -> [u8; 32] {
        let encoded = bincode::serialize(self).expect("ledger state serialization");
        *blake3::hash(&encoded).as_bytes()
    }

    pub fn is_administrator(&self, who: &Address) -> bool {
        self.administrator == *who
    }

    /// Funds held by the program, as opposed to the pool ledger counter.
    pub fn pool_balance(&self) -> u64 {
        self.custody_balance
    }

    pub fn get_policy(&self, id: PolicyId) -> Policy {
        self.policies.get(id)
    }

    pub fn get_claim(&self, id: ClaimId) -> Claim {
        self.claims.get(id)
    }

    pub fn policies_of(&self, holder: &Address) -> &[PolicyId] {
        self.policies.policies_of(holder)
    }

    pub fn claims_of(&self, policy_id: PolicyId) -> &[ClaimId] {
        self.claims.claims_of(policy_id)
    }

    pub fn contribution_of(&self, contributor: &Address) -> u64 {
        self.pool.contribution_of(contributor)
    }

    pub fn account(&self, who: &Address) -> AccountState {
        self.accounts.get(who).cloned().unwrap_or_default()
    }
}
