use anyhow::Result;
use mutual_types::state::LedgerState;
use prometheus_client::encoding::text::encode;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::registry::Registry;

type Labels = Vec<(String, String)>;

#[derive(Debug)]
pub struct Metrics {
    registry: Registry,
    submitted: Family<Labels, Counter>,
    pool_balance: Gauge,
    ledger_balance: Gauge,
    policies: Gauge,
    claims: Gauge,
}

fn clamp(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

impl Metrics {
    pub fn new() -> Self {
        let mut registry = Registry::with_prefix("mutual");
        let submitted = Family::<Labels, Counter>::default();
        let pool_balance = Gauge::default();
        let ledger_balance = Gauge::default();
        let policies = Gauge::default();
        let claims = Gauge::default();

        registry.register(
            "transactions_submitted",
            "Transactions accepted into the mempool",
            submitted.clone(),
        );
        registry.register("pool_balance", "Funds held by the program", pool_balance.clone());
        registry.register(
            "ledger_balance",
            "Pool ledger balance available for payout",
            ledger_balance.clone(),
        );
        registry.register("policies", "Policies ever issued", policies.clone());
        registry.register("claims", "Claims ever submitted", claims.clone());

        Self {
            registry,
            submitted,
            pool_balance,
            ledger_balance,
            policies,
            claims,
        }
    }

    pub fn record_submission(&self, instruction: &str) {
        self.submitted
            .get_or_create(&vec![("instruction".to_owned(), instruction.to_owned())])
            .inc();
    }

    pub fn observe(&self, ledger: &LedgerState) {
        self.pool_balance.set(clamp(ledger.pool_balance()));
        self.ledger_balance.set(clamp(ledger.pool.balance()));
        self.policies.set(clamp(ledger.policies.len() as u64));
        self.claims.set(clamp(ledger.claims.len() as u64));
    }

    pub fn render(&self) -> Result<String> {
        let mut buffer = String::new();
        encode(&mut buffer, &self.registry)?;
        Ok(buffer)
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
