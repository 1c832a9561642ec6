use crate::transfer;
use crate::ExecutionContext;
use mutual_types::{Address, Event, InsuranceError, InvalidInput};
use tracing::{info, warn};

/// Voluntary top-up of the pool. Returns the contributor's new running total.
pub fn contribute(
    ctx: &mut ExecutionContext,
    contributor: &Address,
    amount: u64,
) -> Result<u64, InsuranceError> {
    if amount == 0 {
        return Err(InvalidInput::ZeroAmount.into());
    }

    transfer::ensure_collectable(ctx.state, contributor, amount)?;
    ctx.state.pool.check_credit(amount)?;
    ctx.state.pool.check_contribution(contributor, amount)?;

    transfer::collect(ctx.state, contributor, amount)?;
    ctx.state.pool.credit(amount)?;
    let total = ctx.state.pool.record_contribution(*contributor, amount)?;

    info!(amount, total, pool = ctx.state.pool.balance(), "contribution received");
    ctx.emit(Event::ContributionMade {
        contributor: *contributor,
        amount,
    });
    Ok(total)
}

/// Administrator-only recovery: empties the pool ledger and sends every
/// held fund to the administrator. Returns the amount withdrawn.
pub fn emergency_drain(ctx: &mut ExecutionContext, caller: &Address) -> Result<u64, InsuranceError> {
    if !ctx.state.is_administrator(caller) {
        return Err(InsuranceError::Unauthorized);
    }

    let held = ctx.state.custody_balance;
    let administrator = ctx.state.administrator;
    transfer::ensure_transferable(ctx.state, held, &administrator)?;

    let ledger_balance = ctx.state.pool.drain_all();
    transfer::transfer(ctx.state, held, &administrator)?;

    warn!(
        withdrawn = held,
        ledger_balance,
        height = ctx.height,
        "emergency drain executed"
    );
    Ok(held)
}
