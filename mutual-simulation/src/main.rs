use anyhow::{bail, Result};
use clap::Parser;
use mutual_crypto::signatures::{address_of, generate_keypair, sign_transaction, SigningKey};
use mutual_execution::{execute_transaction, ExecutionContext};
use mutual_types::policy::{required_premium, SECONDS_PER_DAY};
use mutual_types::{Address, Event, InsuranceError, InsuranceInstruction, LedgerState, Transaction};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(author, version, about = "Mutual insurance randomized scenario runner")]
struct Args {
    /// Number of participant wallets.
    #[arg(long, default_value_t = 50)]
    wallets: usize,
    /// Number of operations to attempt.
    #[arg(long, default_value_t = 5_000)]
    operations: usize,
    /// Starting balance of each wallet.
    #[arg(long, default_value_t = 1_000_000)]
    starting_balance: u64,
    #[arg(long, default_value_t = 7)]
    seed: u64,
    /// Finish with an emergency drain.
    #[arg(long)]
    drain_at_end: bool,
}

struct SimWallet {
    keypair: SigningKey,
    address: Address,
    nonce: u64,
}

impl SimWallet {
    fn new() -> Self {
        let keypair = generate_keypair();
        let address = address_of(&keypair);
        Self {
            keypair,
            address,
            nonce: 0,
        }
    }

    fn sign(&self, instruction: InsuranceInstruction) -> Transaction {
        let mut tx = Transaction::new(self.address, self.nonce, instruction);
        sign_transaction(&self.keypair, &mut tx);
        tx
    }
}

#[derive(Default, Debug)]
struct Tally {
    committed: u64,
    rejected: BTreeMap<String, u64>,
    inflow: u64,
    payouts: u64,
    drained: u64,
}

impl Tally {
    fn reject(&mut self, err: &anyhow::Error) {
        let kind = match err.downcast_ref::<InsuranceError>() {
            Some(e) => format!("{:?}", e).split([' ', '(', '{']).next().unwrap_or("Unknown").to_string(),
            None => "Admission".to_string(),
        };
        *self.rejected.entry(kind).or_default() += 1;
    }
}

fn seed_wallets(state: &mut LedgerState, wallets: &[SimWallet], amount: u64) {
    for wallet in wallets {
        state.accounts.entry(wallet.address).or_default().balance = amount;
    }
}

fn total_funds(state: &LedgerState) -> u128 {
    state.accounts.values().map(|a| a.balance as u128).sum::<u128>() + state.custody_balance as u128
}

fn pick_instruction(rng: &mut StdRng, state: &LedgerState, who: &Address) -> InsuranceInstruction {
    match rng.gen_range(0..10) {
        0..=3 => {
            let coverage = rng.gen_range(1..500) * 1_000;
            let overpay = if rng.gen_bool(0.2) { rng.gen_range(1..500) } else { 0 };
            InsuranceInstruction::PurchasePolicy {
                coverage_amount: coverage,
                duration_days: rng.gen_range(20..380),
                payment: required_premium(coverage) + overpay,
            }
        }
        4..=6 => {
            let owned = state.policies_of(who);
            let policy_id = if owned.is_empty() || rng.gen_bool(0.05) {
                rng.gen_range(1..=state.policies.len() as u64 + 1)
            } else {
                owned[rng.gen_range(0..owned.len())]
            };
            let coverage = state.get_policy(policy_id).coverage_amount.max(1);
            InsuranceInstruction::SubmitClaim {
                policy_id,
                claim_amount: rng.gen_range(1..=coverage + coverage / 10),
                description: if rng.gen_bool(0.02) { String::new() } else { "loss event".into() },
            }
        }
        _ => InsuranceInstruction::Contribute {
            amount: rng.gen_range(0..20_000),
        },
    }
}

fn record(tally: &mut Tally, events: &[Event]) {
    tally.committed += 1;
    for event in events {
        match event {
            Event::PremiumPaid { amount, .. } | Event::ContributionMade { amount, .. } => tally.inflow += amount,
            Event::ClaimProcessed { payout, .. } => tally.payouts += payout,
            _ => {}
        }
    }
}

fn run_simulation(args: &Args) -> Result<(LedgerState, Tally)> {
    if args.wallets == 0 {
        bail!("At least one wallet is required");
    }

    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut admin = SimWallet::new();
    let mut wallets: Vec<SimWallet> = (0..args.wallets).map(|_| SimWallet::new()).collect();
    let mut state = LedgerState::new(admin.address);
    seed_wallets(&mut state, &wallets, args.starting_balance);
    let funds_at_start = total_funds(&state);

    let mut tally = Tally::default();
    let mut timestamp = 1_700_000_000u64;

    for height in 1..=args.operations as u64 {
        if rng.gen_bool(0.1) {
            timestamp += rng.gen_range(0..30) * SECONDS_PER_DAY;
        }

        // The administrator works through pending claims now and then.
        let pending: Vec<u64> = (1..=state.claims.len() as u64)
            .filter(|id| !state.get_claim(*id).processed)
            .collect();
        let (signer, tx) = if !pending.is_empty() && rng.gen_bool(0.3) {
            let claim_id = pending[rng.gen_range(0..pending.len())];
            let tx = admin.sign(InsuranceInstruction::ProcessClaim {
                claim_id,
                approve: rng.gen_bool(0.7),
            });
            (&mut admin, tx)
        } else {
            let idx = rng.gen_range(0..wallets.len());
            let instruction = pick_instruction(&mut rng, &state, &wallets[idx].address);
            let tx = wallets[idx].sign(instruction);
            (&mut wallets[idx], tx)
        };

        let mut ctx = ExecutionContext::new(&mut state, height, timestamp);
        match execute_transaction(&tx, &mut ctx) {
            Ok(events) => {
                signer.nonce += 1;
                record(&mut tally, &events);
            }
            Err(e) => tally.reject(&e),
        }
    }

    if args.drain_at_end {
        let held = state.custody_balance;
        let tx = admin.sign(InsuranceInstruction::EmergencyDrain);
        let mut ctx = ExecutionContext::new(&mut state, args.operations as u64 + 1, timestamp);
        execute_transaction(&tx, &mut ctx)?;
        tally.committed += 1;
        tally.drained = held;
    }

    if state.pool.balance() != state.custody_balance {
        bail!(
            "Pool ledger {} diverged from custody {}",
            state.pool.balance(),
            state.custody_balance
        );
    }
    let expected = tally
        .inflow
        .checked_sub(tally.payouts)
        .and_then(|left| left.checked_sub(tally.drained));
    if expected != Some(state.custody_balance) {
        bail!("Conservation violated: custody {} vs tally {:?}", state.custody_balance, tally);
    }
    if total_funds(&state) != funds_at_start {
        bail!("Funds were created or destroyed");
    }

    let mut approvals: HashMap<u64, u32> = HashMap::new();
    for id in 1..=state.claims.len() as u64 {
        let claim = state.get_claim(id);
        if claim.approved {
            *approvals.entry(claim.policy_id).or_default() += 1;
        }
    }
    if let Some((policy, count)) = approvals.iter().find(|(_, count)| **count > 1) {
        bail!("Policy {} paid out {} times", policy, count);
    }

    Ok((state, tally))
}

fn main() -> Result<()> {
    let args = Args::parse();
    let start = Instant::now();
    let (state, tally) = run_simulation(&args)?;

    println!("=== Mutual insurance simulation ===");
    println!("Wallets: {}", args.wallets);
    println!("Operations attempted: {}", args.operations);
    println!("Committed: {}", tally.committed);
    for (kind, count) in &tally.rejected {
        println!("Rejected {:<20} {}", kind, count);
    }
    println!("Policies issued: {}", state.policies.len());
    println!("Claims filed: {}", state.claims.len());
    println!("Premiums + contributions: {}", tally.inflow);
    println!("Payouts: {}", tally.payouts);
    println!("Drained: {}", tally.drained);
    println!("Pool balance: {}", state.pool_balance());
    println!("Elapsed: {:.2?}", start.elapsed());
    println!("Invariants held.");
    Ok(())
}
