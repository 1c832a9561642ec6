#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use mutual_execution::{execute_instruction, ExecutionContext};
use mutual_types::{InsuranceInstruction, LedgerState};

const ADMIN: [u8; 32] = [0xAA; 32];

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    sender_is_admin: bool,
    balance: u64,
    seed_pool: u32,
    timestamp: u64,
    kind: u8,
    amount: u64,
    other: u64,
    approve: bool,
    description: String,
}

fuzz_target!(|data: FuzzInput| {
    let sender = if data.sender_is_admin { ADMIN } else { [1u8; 32] };
    let mut state = LedgerState::new(ADMIN);
    state.accounts.entry(sender).or_default().balance = data.balance;
    if data.seed_pool > 0 {
        state.custody_balance = data.seed_pool as u64;
        let _ = state.pool.credit(data.seed_pool as u64);
    }
    // A policy and a pending claim so the claim paths are reachable.
    state.policies.insert([1u8; 32], data.other.max(1), 1, 0, u64::MAX);
    state.claims.insert(1, [1u8; 32], data.amount.max(1), 0, "seed".into());
    let before = state.clone();

    let si = match data.kind % 5 {
        0 => InsuranceInstruction::PurchasePolicy {
            coverage_amount: data.other,
            duration_days: data.amount % 400,
            payment: data.amount,
        },
        1 => InsuranceInstruction::SubmitClaim {
            policy_id: data.other % 3,
            claim_amount: data.amount,
            description: data.description,
        },
        2 => InsuranceInstruction::ProcessClaim {
            claim_id: data.other % 3,
            approve: data.approve,
        },
        3 => InsuranceInstruction::Contribute { amount: data.amount },
        _ => InsuranceInstruction::EmergencyDrain,
    };

    let mut ctx = ExecutionContext::new(&mut state, 1, data.timestamp);
    let result = execute_instruction(&si, &sender, &mut ctx);

    if result.is_err() {
        assert_eq!(state, before);
    }
    assert_eq!(state.pool.balance(), state.custody_balance);
});
