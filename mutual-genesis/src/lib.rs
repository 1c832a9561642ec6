//! Initial ledger state: who administers the pool and who starts with funds.

use anyhow::{bail, Context, Result};
use mutual_crypto::signatures::parse_address;
use mutual_types::state::LedgerState;
use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

/// Development administrator used when no genesis file is supplied.
pub const DEV_ADMINISTRATOR: &str =
    "0000000000000000000000000000000000000000000000000000000000000000";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct GenesisAccount {
    pub address: String,
    pub balance: u64,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct GenesisConfig {
    pub administrator: String,
    #[serde(default)]
    pub accounts: Vec<GenesisAccount>,
    /// Funds the administrator contributes to the pool at height 0.
    #[serde(default)]
    pub seed_pool: u64,
}

impl Default for GenesisConfig {
    fn default() -> Self {
        Self {
            administrator: DEV_ADMINISTRATOR.to_string(),
            accounts: Vec::new(),
            seed_pool: 0,
        }
    }
}

impl GenesisConfig {
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse genesis config")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read genesis file {}", path.display()))?;
        Self::from_toml(&text)
    }
}

pub fn create_genesis_state(config: &GenesisConfig) -> Result<LedgerState> {
    let administrator = parse_address(&config.administrator).context("genesis administrator")?;
    if config.administrator == DEV_ADMINISTRATOR {
        warn!("Genesis uses the all-zero development administrator; adjudication is disabled");
    }

    let mut state = LedgerState::new(administrator);
    for account in &config.accounts {
        let address = parse_address(&account.address)?;
        if state.accounts.contains_key(&address) {
            bail!("Duplicate genesis account {}", account.address);
        }
        state.accounts.entry(address).or_default().balance = account.balance;
    }

    if config.seed_pool > 0 {
        state.custody_balance = config.seed_pool;
        state.pool.credit(config.seed_pool)?;
        state.pool.record_contribution(administrator, config.seed_pool)?;
    }

    info!(
        accounts = state.accounts.len(),
        seed_pool = config.seed_pool,
        "Genesis state created"
    );
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADMIN: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
    const ALICE: &str = "0101010101010101010101010101010101010101010101010101010101010101";

    #[test]
    fn parses_full_config() {
        let config = GenesisConfig::from_toml(&format!(
            r#"
            administrator = "{ADMIN}"
            seed_pool = 50000

            [[accounts]]
            address = "0x{ALICE}"
            balance = 1000000
            "#
        ))
        .unwrap();

        let state = create_genesis_state(&config).unwrap();
        assert_eq!(state.administrator, [0xaa; 32]);
        assert_eq!(state.account(&[1u8; 32]).balance, 1_000_000);
        assert_eq!(state.pool.balance(), 50_000);
        assert_eq!(state.pool_balance(), 50_000);
        assert_eq!(state.contribution_of(&[0xaa; 32]), 50_000);
    }

    #[test]
    fn accounts_and_seed_are_optional() {
        let config = GenesisConfig::from_toml(&format!(r#"administrator = "{ADMIN}""#)).unwrap();
        let state = create_genesis_state(&config).unwrap();
        assert!(state.accounts.is_empty());
        assert_eq!(state.pool_balance(), 0);
    }

    #[test]
    fn rejects_bad_addresses_and_duplicates() {
        let bad = GenesisConfig {
            administrator: "nope".into(),
            ..Default::default()
        };
        assert!(create_genesis_state(&bad).is_err());

        let duplicate = GenesisConfig {
            administrator: ADMIN.into(),
            accounts: vec![
                GenesisAccount { address: ALICE.into(), balance: 1 },
                GenesisAccount { address: ALICE.into(), balance: 2 },
            ],
            seed_pool: 0,
        };
        assert!(create_genesis_state(&duplicate).is_err());
    }

    #[test]
    fn default_config_builds() {
        let state = create_genesis_state(&GenesisConfig::default()).unwrap();
        assert_eq!(state.administrator, [0u8; 32]);
    }
}
