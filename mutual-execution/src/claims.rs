use crate::transfer;
use crate::ExecutionContext;
use mutual_types::claim::MAX_DESCRIPTION_LEN;
use mutual_types::{Address, ClaimId, Event, InsuranceError, InvalidInput, PolicyId};
use tracing::info;

/// Files a claim against one of the claimant's active policies.
///
/// Pool sufficiency is only checked as of now; adjudication checks again.
/// Neither the pool nor the policy is touched until approval.
pub fn submit(
    ctx: &mut ExecutionContext,
    claimant: &Address,
    policy_id: PolicyId,
    claim_amount: u64,
    description: &str,
) -> Result<ClaimId, InsuranceError> {
    let policy = ctx
        .state
        .policies
        .active_policy_of(policy_id, claimant, ctx.timestamp)?;

    if policy.has_claimed {
        return Err(InsuranceError::AlreadyClaimed(policy_id));
    }
    if claim_amount == 0 || claim_amount > policy.coverage_amount {
        return Err(InsuranceError::ExceedsCoverage {
            requested: claim_amount,
            coverage: policy.coverage_amount,
        });
    }
    let available = ctx.state.pool.balance();
    if claim_amount > available {
        return Err(InsuranceError::InsufficientPool {
            requested: claim_amount,
            available,
        });
    }
    if description.is_empty() {
        return Err(InvalidInput::EmptyDescription.into());
    }
    if description.len() > MAX_DESCRIPTION_LEN {
        return Err(InvalidInput::DescriptionTooLong {
            len: description.len(),
            max: MAX_DESCRIPTION_LEN,
        }
        .into());
    }

    let claim_id = ctx.state.claims.insert(
        policy_id,
        *claimant,
        claim_amount,
        ctx.timestamp,
        description.to_owned(),
    );

    info!(claim_id, policy_id, amount = claim_amount, "claim submitted");
    ctx.emit(Event::ClaimSubmitted {
        claim_id,
        policy_id,
        claimant: *claimant,
        amount: claim_amount,
    });
    Ok(claim_id)
}

/// The administrator's one-time decision on a claim. Returns the payout.
///
/// An approval that cannot be honoured (pool short, or the policy already
/// paid out through another claim) is rejected as a whole and the claim
/// stays pending, so it can be retried or denied later.
pub fn adjudicate(
    ctx: &mut ExecutionContext,
    caller: &Address,
    claim_id: ClaimId,
    approve: bool,
) -> Result<u64, InsuranceError> {
    if !ctx.state.is_administrator(caller) {
        return Err(InsuranceError::Unauthorized);
    }
    let claim = ctx
        .state
        .claims
        .claim(claim_id)
        .ok_or(InsuranceError::ClaimNotFound(claim_id))?;
    if claim.processed {
        return Err(InsuranceError::AlreadyProcessed(claim_id));
    }
    let (policy_id, amount, claimant) = (claim.policy_id, claim.amount, claim.claimant);

    let payout = if approve {
        if ctx.state.policies.get(policy_id).has_claimed {
            return Err(InsuranceError::AlreadyClaimed(policy_id));
        }
        ctx.state.pool.check_debit(amount)?;
        transfer::ensure_transferable(ctx.state, amount, &claimant)?;

        ctx.state.pool.debit(amount)?;
        transfer::transfer(ctx.state, amount, &claimant)?;
        ctx.state.policies.mark_claimed(policy_id);
        amount
    } else {
        0
    };
    ctx.state.claims.settle(claim_id, approve);

    info!(claim_id, policy_id, approved = approve, payout, "claim processed");
    ctx.emit(Event::ClaimProcessed {
        claim_id,
        approved: approve,
        payout,
    });
    Ok(payout)
}
