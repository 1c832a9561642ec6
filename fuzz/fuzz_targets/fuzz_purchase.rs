#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use mutual_execution::{execute_instruction, ExecutionContext};
use mutual_types::policy::required_premium;
use mutual_types::{InsuranceError, InsuranceInstruction, LedgerState};

#[derive(Arbitrary, Debug)]
struct PurchaseInput {
    balance: u64,
    coverage_amount: u64,
    duration_days: u64,
    payment: u64,
    timestamp: u64,
}

fuzz_target!(|data: PurchaseInput| {
    let holder = [5u8; 32];
    let mut state = LedgerState::new([0u8; 32]);
    state.accounts.entry(holder).or_default().balance = data.balance;

    let si = InsuranceInstruction::PurchasePolicy {
        coverage_amount: data.coverage_amount,
        duration_days: data.duration_days,
        payment: data.payment,
    };
    let mut ctx = ExecutionContext::new(&mut state, 1, data.timestamp);

    match execute_instruction(&si, &holder, &mut ctx) {
        Ok(_) => {
            let policy = state.get_policy(1);
            assert!(data.payment >= required_premium(data.coverage_amount));
            assert!(policy.end_time > policy.start_time);
            assert_eq!(state.pool_balance(), data.payment);
            assert_eq!(state.account(&holder).balance, data.balance - data.payment);
        }
        Err(InsuranceError::InsufficientPremium { required, paid }) => {
            assert!(paid < required);
            assert_eq!(state.pool_balance(), 0);
        }
        Err(_) => assert_eq!(state.pool_balance(), 0),
    }
});
