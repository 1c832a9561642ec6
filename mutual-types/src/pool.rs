use crate::error::{InsuranceError, InvalidInput};
use crate::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregate funds available for payout plus an informational record of
/// voluntary contributions.
///
/// All balance mutation goes through `credit`, `debit` and `drain_all`, so
/// the balance can never go negative.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolLedger {
    balance: u64,
    contributions: BTreeMap<Address, u64>,
}

impl PoolLedger {
    pub fn balance(&self) -> u64 {
        self.balance
    }

    /// The balance after crediting `amount`, without applying it.
    pub fn check_credit(&self, amount: u64) -> Result<u64, InsuranceError> {
        if amount == 0 {
            return Err(InvalidInput::ZeroAmount.into());
        }
        self.balance
            .checked_add(amount)
            .ok_or(InsuranceError::Overflow)
    }

    pub fn credit(&mut self, amount: u64) -> Result<(), InsuranceError> {
        self.balance = self.check_credit(amount)?;
        Ok(())
    }

    /// The balance after debiting `amount`, without applying it.
    pub fn check_debit(&self, amount: u64) -> Result<u64, InsuranceError> {
        self.balance
            .checked_sub(amount)
            .ok_or(InsuranceError::InsufficientPool {
                requested: amount,
                available: self.balance,
            })
    }

    pub fn debit(&mut self, amount: u64) -> Result<(), InsuranceError> {
        self.balance = self.check_debit(amount)?;
        Ok(())
    }

    pub fn check_contribution(&self, contributor: &Address, amount: u64) -> Result<u64, InsuranceError> {
        self.contribution_of(contributor)
            .checked_add(amount)
            .ok_or(InsuranceError::Overflow)
    }

    /// Adds to a contributor's running total and returns the new total.
    /// Totals only ever grow; they are not a claim on the pool.
    pub fn record_contribution(
        &mut self,
        contributor: Address,
        amount: u64,
    ) -> Result<u64, InsuranceError> {
        let total = self.check_contribution(&contributor, amount)?;
        self.contributions.insert(contributor, total);
        Ok(total)
    }

    pub fn contribution_of(&self, contributor: &Address) -> u64 {
        self.contributions.get(contributor).copied().unwrap_or(0)
    }

    /// Zeroes the balance and returns what it held.
    pub fn drain_all(&mut self) -> u64 {
        std::mem::take(&mut self.balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credit_rejects_zero() {
        let mut pool = PoolLedger::default();
        assert_eq!(
            pool.credit(0),
            Err(InsuranceError::InvalidInput(InvalidInput::ZeroAmount))
        );
        assert_eq!(pool.balance(), 0);
    }

    #[test]
    fn debit_never_goes_negative() {
        let mut pool = PoolLedger::default();
        pool.credit(500).unwrap();
        assert_eq!(
            pool.debit(501),
            Err(InsuranceError::InsufficientPool {
                requested: 501,
                available: 500
            })
        );
        pool.debit(500).unwrap();
        assert_eq!(pool.balance(), 0);
    }

    #[test]
    fn drain_blocks_debits_until_recredited() {
        let mut pool = PoolLedger::default();
        pool.credit(1_000).unwrap();
        assert_eq!(pool.drain_all(), 1_000);
        assert!(pool.debit(1).is_err());
        pool.credit(10).unwrap();
        assert!(pool.debit(10).is_ok());
    }

    #[test]
    fn contributions_accumulate() {
        let mut pool = PoolLedger::default();
        let who = [7u8; 32];
        assert_eq!(pool.record_contribution(who, 5_000).unwrap(), 5_000);
        assert_eq!(pool.record_contribution(who, 3_000).unwrap(), 8_000);
        assert_eq!(pool.contribution_of(&who), 8_000);
        assert_eq!(pool.contribution_of(&[8u8; 32]), 0);
    }

    #[test]
    fn checks_do_not_mutate() {
        let mut pool = PoolLedger::default();
        pool.credit(u64::MAX - 1).unwrap();
        let before = pool.clone();

        assert_eq!(pool.check_credit(1), Ok(u64::MAX));
        assert_eq!(pool.check_credit(2), Err(InsuranceError::Overflow));
        assert_eq!(pool.check_debit(10), Ok(u64::MAX - 11));
        assert_eq!(pool.check_contribution(&[9u8; 32], 4), Ok(4));
        assert_eq!(pool, before);
    }
}
