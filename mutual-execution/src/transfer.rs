//! Value movement between participant accounts and program custody.
//!
//! The `ensure_*` checks never write, so an operation can validate every
//! movement it needs before applying the first one.

use mutual_types::{Address, InsuranceError, LedgerState};

pub fn ensure_collectable(state: &LedgerState, from: &Address, amount: u64) -> Result<(), InsuranceError> {
    let available = state.account(from).balance;
    if available < amount {
        return Err(InsuranceError::InsufficientFunds {
            needed: amount,
            available,
        });
    }
    state
        .custody_balance
        .checked_add(amount)
        .ok_or(InsuranceError::Overflow)?;
    Ok(())
}

pub fn ensure_transferable(state: &LedgerState, amount: u64, to: &Address) -> Result<(), InsuranceError> {
    if state.custody_balance < amount {
        return Err(InsuranceError::InsufficientFunds {
            needed: amount,
            available: state.custody_balance,
        });
    }
    state
        .account(to)
        .balance
        .checked_add(amount)
        .ok_or(InsuranceError::Overflow)?;
    Ok(())
}

/// Pulls `amount` from `from` into custody.
pub fn collect(state: &mut LedgerState, from: &Address, amount: u64) -> Result<(), InsuranceError> {
    ensure_collectable(state, from, amount)?;
    state.accounts.entry(*from).or_default().balance -= amount;
    state.custody_balance += amount;
    Ok(())
}

/// Sends `amount` out of custody to `to`.
pub fn transfer(state: &mut LedgerState, amount: u64, to: &Address) -> Result<(), InsuranceError> {
    ensure_transferable(state, amount, to)?;
    state.custody_balance -= amount;
    state.accounts.entry(*to).or_default().balance += amount;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_collect_leaves_no_account_behind() {
        let mut state = LedgerState::new([0xAA; 32]);
        let stranger = [5u8; 32];

        assert_eq!(
            collect(&mut state, &stranger, 1),
            Err(InsuranceError::InsufficientFunds {
                needed: 1,
                available: 0
            })
        );
        assert!(!state.accounts.contains_key(&stranger));
    }

    #[test]
    fn transfer_guards_custody_and_recipient() {
        let mut state = LedgerState::new([0xAA; 32]);
        let rich = [6u8; 32];
        state.accounts.entry(rich).or_default().balance = u64::MAX;
        state.custody_balance = 10;

        assert_eq!(ensure_transferable(&state, 1, &rich), Err(InsuranceError::Overflow));
        assert!(ensure_transferable(&state, 11, &[7u8; 32]).is_err());
        transfer(&mut state, 10, &[7u8; 32]).unwrap();
        assert_eq!(state.custody_balance, 0);
        assert_eq!(state.account(&[7u8; 32]).balance, 10);
    }
}
