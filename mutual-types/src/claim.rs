use crate::{Address, ClaimId, PolicyId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Longest claim description accepted, in bytes.
pub const MAX_DESCRIPTION_LEN: usize = 1024;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimStatus {
    Submitted,
    Approved,
    Denied,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Claim {
    pub id: ClaimId,
    pub policy_id: PolicyId,
    pub claimant: Address,
    pub amount: u64,
    pub timestamp: u64,
    pub processed: bool,
    pub approved: bool,
    pub description: String,
}

impl Claim {
    pub fn status(&self) -> ClaimStatus {
        match (self.processed, self.approved) {
            (false, _) => ClaimStatus::Submitted,
            (true, true) => ClaimStatus::Approved,
            (true, false) => ClaimStatus::Denied,
        }
    }
}

/// Owns every claim record. Claims reference policies by id only.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimBook {
    claims: BTreeMap<ClaimId, Claim>,
    by_policy: BTreeMap<PolicyId, Vec<ClaimId>>,
    last_id: ClaimId,
}

impl ClaimBook {
    pub fn insert(
        &mut self,
        policy_id: PolicyId,
        claimant: Address,
        amount: u64,
        timestamp: u64,
        description: String,
    ) -> ClaimId {
        self.last_id += 1;
        let id = self.last_id;
        self.claims.insert(
            id,
            Claim {
                id,
                policy_id,
                claimant,
                amount,
                timestamp,
                processed: false,
                approved: false,
                description,
            },
        );
        self.by_policy.entry(policy_id).or_default().push(id);
        id
    }

    pub fn get(&self, id: ClaimId) -> Claim {
        self.claims.get(&id).cloned().unwrap_or_default()
    }

    pub fn claim(&self, id: ClaimId) -> Option<&Claim> {
        self.claims.get(&id)
    }

    /// Records the one-time adjudication outcome. Returns false if the
    /// claim is unknown or already processed, leaving it untouched.
    pub fn settle(&mut self, id: ClaimId, approved: bool) -> bool {
        match self.claims.get_mut(&id) {
            Some(claim) if !claim.processed => {
                claim.processed = true;
                claim.approved = approved;
                true
            }
            _ => false,
        }
    }

    pub fn claims_of(&self, policy_id: PolicyId) -> &[ClaimId] {
        self.by_policy
            .get(&policy_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settle_is_terminal() {
        let mut book = ClaimBook::default();
        let id = book.insert(1, [1u8; 32], 10, 5, "hail".into());
        assert_eq!(id, 1);
        assert_eq!(book.get(id).status(), ClaimStatus::Submitted);

        assert!(book.settle(id, false));
        assert_eq!(book.get(id).status(), ClaimStatus::Denied);

        assert!(!book.settle(id, true));
        assert_eq!(book.get(id).status(), ClaimStatus::Denied);
    }

    #[test]
    fn claims_are_indexed_by_policy() {
        let mut book = ClaimBook::default();
        book.insert(1, [1u8; 32], 10, 5, "a".into());
        book.insert(2, [2u8; 32], 10, 5, "b".into());
        book.insert(1, [1u8; 32], 10, 6, "c".into());
        assert_eq!(book.claims_of(1), &[1, 3]);
        assert_eq!(book.claims_of(2), &[2]);
        assert!(book.claims_of(9).is_empty());
        assert!(!book.settle(9, true));
    }
}
