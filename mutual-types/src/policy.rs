use crate::error::InsuranceError;
use crate::{Address, PolicyId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const SECONDS_PER_DAY: u64 = 86_400;
pub const MIN_DURATION_DAYS: u64 = 30;
pub const MAX_DURATION_DAYS: u64 = 365;
/// Premium rate in basis points of the coverage amount (1%).
pub const PREMIUM_RATE_BPS: u64 = 100;
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Minimum premium for `coverage_amount`, truncating.
pub fn required_premium(coverage_amount: u64) -> u64 {
    // Widened so large coverage amounts cannot overflow the multiply.
    (coverage_amount as u128 * PREMIUM_RATE_BPS as u128 / BPS_DENOMINATOR as u128) as u64
}

/// A coverage agreement. Only `has_claimed` changes after creation.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Policy {
    pub id: PolicyId,
    pub holder: Address,
    pub coverage_amount: u64,
    pub premium_paid: u64,
    pub start_time: u64,
    pub end_time: u64,
    pub is_active: bool,
    pub has_claimed: bool,
}

impl Policy {
    /// Coverage lapses strictly after `end_time`.
    pub fn is_expired_at(&self, now: u64) -> bool {
        now > self.end_time
    }
}

/// Owns every policy record and the per-holder index.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyRegistry {
    policies: BTreeMap<PolicyId, Policy>,
    by_holder: BTreeMap<Address, Vec<PolicyId>>,
    last_id: PolicyId,
}

impl PolicyRegistry {
    /// Stores a new active, unclaimed policy and returns its id.
    /// Ids start at 1 and never repeat.
    pub fn insert(
        &mut self,
        holder: Address,
        coverage_amount: u64,
        premium_paid: u64,
        start_time: u64,
        end_time: u64,
    ) -> PolicyId {
        self.last_id += 1;
        let id = self.last_id;
        self.policies.insert(
            id,
            Policy {
                id,
                holder,
                coverage_amount,
                premium_paid,
                start_time,
                end_time,
                is_active: true,
                has_claimed: false,
            },
        );
        self.by_holder.entry(holder).or_default().push(id);
        id
    }

    /// Permissive lookup: unknown ids yield an all-zero record.
    pub fn get(&self, id: PolicyId) -> Policy {
        self.policies.get(&id).cloned().unwrap_or_default()
    }

    pub fn policy(&self, id: PolicyId) -> Option<&Policy> {
        self.policies.get(&id)
    }

    /// Flips `has_claimed`. Returns false if the policy is unknown or was
    /// already claimed.
    pub fn mark_claimed(&mut self, id: PolicyId) -> bool {
        match self.policies.get_mut(&id) {
            Some(policy) if !policy.has_claimed => {
                policy.has_claimed = true;
                true
            }
            _ => false,
        }
    }

    /// The active-holder gate: `actor` must hold the policy, the policy must
    /// be active, and `now` must not be past its end time. Unknown ids fail
    /// the holder check.
    pub fn active_policy_of(
        &self,
        id: PolicyId,
        actor: &Address,
        now: u64,
    ) -> Result<&Policy, InsuranceError> {
        let policy = self
            .policies
            .get(&id)
            .filter(|policy| policy.holder == *actor)
            .ok_or(InsuranceError::NotPolicyholder(id))?;

        if !policy.is_active {
            return Err(InsuranceError::PolicyInactive(id));
        }
        if policy.is_expired_at(now) {
            return Err(InsuranceError::PolicyExpired {
                policy_id: id,
                end_time: policy.end_time,
                now,
            });
        }
        Ok(policy)
    }

    pub fn policies_of(&self, holder: &Address) -> &[PolicyId] {
        self.by_holder.get(holder).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}
