#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use mutual_execution::{execute_instruction, ExecutionContext};
use mutual_types::{Event, InsuranceInstruction, LedgerState};
use std::collections::BTreeSet;

const ADMIN: [u8; 32] = [0xAA; 32];
const HOLDERS: [[u8; 32]; 2] = [[1u8; 32], [2u8; 32]];

#[derive(Arbitrary, Debug)]
enum Step {
    Purchase { holder: bool, coverage: u32, days: u16 },
    Claim { holder: bool, policy: u8, amount: u32, days_later: u16 },
    Process { claim: u8, approve: bool },
    Contribute { holder: bool, amount: u32 },
    Drain,
}

fuzz_target!(|steps: Vec<Step>| {
    let mut state = LedgerState::new(ADMIN);
    for holder in HOLDERS {
        state.accounts.entry(holder).or_default().balance = u32::MAX as u64 * 64;
    }

    let mut processed = BTreeSet::new();
    let mut paid_policies = BTreeSet::new();

    for step in steps.into_iter().take(64) {
        let (sender, at, si) = match step {
            Step::Purchase { holder, coverage, days } => (
                HOLDERS[holder as usize],
                0,
                InsuranceInstruction::PurchasePolicy {
                    coverage_amount: coverage as u64,
                    duration_days: days as u64,
                    payment: coverage as u64 / 100 + 1,
                },
            ),
            Step::Claim { holder, policy, amount, days_later } => (
                HOLDERS[holder as usize],
                days_later as u64 * 86_400,
                InsuranceInstruction::SubmitClaim {
                    policy_id: policy as u64,
                    claim_amount: amount as u64,
                    description: "loss".into(),
                },
            ),
            Step::Process { claim, approve } => (
                ADMIN,
                0,
                InsuranceInstruction::ProcessClaim { claim_id: claim as u64, approve },
            ),
            Step::Contribute { holder, amount } => (
                HOLDERS[holder as usize],
                0,
                InsuranceInstruction::Contribute { amount: amount as u64 },
            ),
            Step::Drain => (ADMIN, 0, InsuranceInstruction::EmergencyDrain),
        };

        let mut ctx = ExecutionContext::new(&mut state, 1, at);
        if let Ok(events) = execute_instruction(&si, &sender, &mut ctx) {
            for event in events {
                if let Event::ClaimProcessed { claim_id, payout, .. } = event {
                    assert!(processed.insert(claim_id), "claim settled twice");
                    if payout > 0 {
                        let policy_id = state.get_claim(claim_id).policy_id;
                        assert!(paid_policies.insert(policy_id), "policy paid twice");
                    }
                }
            }
        }
        assert_eq!(state.pool.balance(), state.custody_balance);
    }
});
