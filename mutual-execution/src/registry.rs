use crate::transfer;
use crate::ExecutionContext;
use mutual_types::policy::{required_premium, MAX_DURATION_DAYS, MIN_DURATION_DAYS, SECONDS_PER_DAY};
use mutual_types::{Address, Event, InsuranceError, InvalidInput, PolicyId};
use tracing::info;

/// Buys a policy for `holder`. The full `payment` is pooled, including any
/// amount above the required premium.
pub fn purchase(
    ctx: &mut ExecutionContext,
    holder: &Address,
    coverage_amount: u64,
    duration_days: u64,
    payment: u64,
) -> Result<PolicyId, InsuranceError> {
    if coverage_amount == 0 {
        return Err(InvalidInput::ZeroAmount.into());
    }
    if !(MIN_DURATION_DAYS..=MAX_DURATION_DAYS).contains(&duration_days) {
        return Err(InvalidInput::DurationOutOfRange(duration_days).into());
    }
    let required = required_premium(coverage_amount);
    if payment < required {
        return Err(InsuranceError::InsufficientPremium {
            required,
            paid: payment,
        });
    }
    if payment == 0 {
        return Err(InvalidInput::ZeroAmount.into());
    }

    let start_time = ctx.timestamp;
    let end_time = duration_days
        .checked_mul(SECONDS_PER_DAY)
        .and_then(|span| start_time.checked_add(span))
        .ok_or(InsuranceError::Overflow)?;
    transfer::ensure_collectable(ctx.state, holder, payment)?;
    ctx.state.pool.check_credit(payment)?;

    transfer::collect(ctx.state, holder, payment)?;
    ctx.state.pool.credit(payment)?;
    let policy_id = ctx
        .state
        .policies
        .insert(*holder, coverage_amount, payment, start_time, end_time);

    info!(policy_id, coverage_amount, premium = payment, end_time, "policy created");
    ctx.emit(Event::PolicyCreated {
        policy_id,
        holder: *holder,
        coverage_amount,
        premium: payment,
        end_time,
    });
    ctx.emit(Event::PremiumPaid {
        policy_id,
        holder: *holder,
        amount: payment,
    });
    Ok(policy_id)
}
