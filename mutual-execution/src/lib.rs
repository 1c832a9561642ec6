//! Execution of insurance instructions against the ledger state.
//!
//! Every public operation runs as one atomic step: it either commits all of
//! its effects or leaves the state exactly as it found it. Callers that
//! share a `LedgerState` between threads must hold an exclusive lock for the
//! duration of each call.

pub mod claims;
pub mod pool;
pub mod registry;
pub mod transfer;

use anyhow::{bail, Context, Result};
use mutual_crypto::signatures::verify_transaction;
use mutual_types::{Address, Event, InsuranceError, InsuranceInstruction, LedgerState, Transaction};
use tracing::debug;

pub struct ExecutionContext<'a> {
    pub state: &'a mut LedgerState,
    pub height: u64,
    /// Trusted current time in seconds, supplied by the sequencer.
    pub timestamp: u64,
    pub events: Vec<Event>,
}

impl<'a> ExecutionContext<'a> {
    pub fn new(state: &'a mut LedgerState, height: u64, timestamp: u64) -> Self {
        Self {
            state,
            height,
            timestamp,
            events: Vec::new(),
        }
    }

    pub(crate) fn emit(&mut self, event: Event) {
        self.events.push(event);
    }
}

/// Admits a signed transaction: checks the signature and nonce, runs the
/// instruction, and bumps the sender's nonce only if the instruction
/// committed. Returns the events the transaction emitted.
pub fn execute_transaction(tx: &Transaction, ctx: &mut ExecutionContext) -> Result<Vec<Event>> {
    verify_transaction(tx).context("Rejected transaction signature")?;

    let expected = ctx.state.account(&tx.sender).nonce;
    if tx.nonce != expected {
        bail!("Invalid nonce: expected {}, got {}", expected, tx.nonce);
    }

    let events = execute_instruction(&tx.instruction, &tx.sender, ctx)?;
    ctx.state.accounts.entry(tx.sender).or_default().nonce += 1;
    Ok(events)
}

/// Runs one instruction on behalf of `sender`.
///
/// Each operation finishes all of its checks before its first write, so a
/// rejection returns with the state and event log untouched.
pub fn execute_instruction(
    instruction: &InsuranceInstruction,
    sender: &Address,
    ctx: &mut ExecutionContext,
) -> Result<Vec<Event>, InsuranceError> {
    let first_event = ctx.events.len();
    if let Err(e) = apply(instruction, sender, ctx) {
        ctx.events.truncate(first_event);
        return Err(e);
    }

    let events = ctx.events[first_event..].to_vec();
    debug!(
        instruction = instruction.name(),
        events = events.len(),
        "instruction committed"
    );
    Ok(events)
}

fn apply(
    instruction: &InsuranceInstruction,
    sender: &Address,
    ctx: &mut ExecutionContext,
) -> Result<(), InsuranceError> {
    match instruction {
        InsuranceInstruction::PurchasePolicy {
            coverage_amount,
            duration_days,
            payment,
        } => {
            registry::purchase(ctx, sender, *coverage_amount, *duration_days, *payment)?;
        }
        InsuranceInstruction::SubmitClaim {
            policy_id,
            claim_amount,
            description,
        } => {
            claims::submit(ctx, sender, *policy_id, *claim_amount, description)?;
        }
        InsuranceInstruction::ProcessClaim { claim_id, approve } => {
            claims::adjudicate(ctx, sender, *claim_id, *approve)?;
        }
        InsuranceInstruction::Contribute { amount } => {
            pool::contribute(ctx, sender, *amount)?;
        }
        InsuranceInstruction::EmergencyDrain => {
            pool::emergency_drain(ctx, sender)?;
        }
    }
    Ok(())
}
