use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use ed25519_dalek::SigningKey;
use mutual_crypto::signatures::{address_of, generate_keypair, sign_transaction};
use mutual_types::instruction::InsuranceInstruction;
use mutual_types::transaction::Transaction;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "Mutual insurance CLI: buy cover, file claims, query the pool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[arg(short, long, default_value = "http://localhost:3000")]
    node_url: String,
    #[arg(short, long, default_value = "wallet.json")]
    wallet_path: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new wallet
    Init,
    /// Show current wallet info
    Show,
    /// Buy a policy; the premium is at least 1% of coverage
    Purchase {
        #[arg(long)]
        coverage: u64,
        #[arg(long)]
        days: u64,
        /// Amount paid; defaults to the minimum premium
        #[arg(long)]
        payment: Option<u64>,
    },
    /// File a claim against one of your policies
    Claim {
        #[arg(long)]
        policy: u64,
        #[arg(long)]
        amount: u64,
        #[arg(long)]
        description: String,
    },
    /// Approve a claim (administrator)
    Approve {
        #[arg(long)]
        claim: u64,
    },
    /// Deny a claim (administrator)
    Deny {
        #[arg(long)]
        claim: u64,
    },
    /// Add funds to the pool
    Contribute {
        #[arg(long)]
        amount: u64,
    },
    /// Withdraw every pooled fund to the administrator (administrator)
    EmergencyDrain,
    /// Show pool balances
    Pool,
    /// Show a policy
    Policy {
        #[arg(long)]
        id: u64,
    },
    /// Show a claim
    ClaimInfo {
        #[arg(long)]
        id: u64,
    },
    /// List policy ids held by an address (defaults to the wallet)
    Policies {
        #[arg(long)]
        holder: Option<String>,
    },
    /// Show cumulative contributions of an address (defaults to the wallet)
    Contribution {
        #[arg(long)]
        address: Option<String>,
    },
    /// Get account balance (defaults to the wallet)
    Balance {
        #[arg(long)]
        address: Option<String>,
    },
    /// Get block info
    Block {
        #[arg(long)]
        height: u64,
    },
    /// Get the outcome of a submitted transaction
    Receipt {
        #[arg(long)]
        tx_id: String,
    },
}

#[derive(Serialize, Deserialize)]
struct Wallet {
    secret_key: String,
    public_key: String,
}

impl Wallet {
    fn load(path: &PathBuf) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("No wallet at {:?}; run `init` first", path))?;
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self, path: &PathBuf) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    fn to_keypair(&self) -> Result<SigningKey> {
        let secret = hex::decode(&self.secret_key)?;
        let bytes: [u8; 32] = secret
            .as_slice()
            .try_into()
            .map_err(|_| anyhow!("Wallet secret key must be 32 bytes"))?;
        Ok(SigningKey::from_bytes(&bytes))
    }
}

#[derive(Deserialize)]
struct AccountInfo {
    nonce: u64,
}

struct Node {
    client: Client,
    url: String,
}

impl Node {
    async fn get(&self, path: &str) -> Result<String> {
        let res = self.client.get(format!("{}{}", self.url, path)).send().await?;
        let status = res.status();
        let body = res.text().await?;
        if !status.is_success() {
            return Err(anyhow!("{} ({})", body, status));
        }
        Ok(body)
    }

    /// Signs `instruction` with the wallet key at the sender's next nonce and submits it.
    async fn submit(&self, wallet_path: &PathBuf, instruction: InsuranceInstruction) -> Result<()> {
        let kp = Wallet::load(wallet_path)?.to_keypair()?;
        let sender = address_of(&kp);

        let account: AccountInfo = serde_json::from_str(
            &self
                .get(&format!("/account/{}", hex::encode(sender)))
                .await?,
        )?;

        let mut tx = Transaction::new(sender, account.nonce, instruction);
        sign_transaction(&kp, &mut tx);

        let res = self
            .client
            .post(format!("{}/tx", self.url))
            .json(&tx)
            .send()
            .await?;

        println!("Response: {}", res.text().await?);
        println!("Check the outcome with: receipt --tx-id {}", hex::encode(tx.id()));
        Ok(())
    }
}

fn wallet_or(address: &Option<String>, wallet_path: &PathBuf) -> Result<String> {
    match address {
        Some(a) => Ok(a.clone()),
        None => Ok(Wallet::load(wallet_path)?.public_key),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let node = Node {
        client: Client::new(),
        url: cli.node_url.trim_end_matches('/').to_string(),
    };

    match &cli.command {
        Commands::Init => {
            let kp = generate_keypair();
            let wallet = Wallet {
                secret_key: hex::encode(kp.to_bytes()),
                public_key: hex::encode(address_of(&kp)),
            };
            wallet.save(&cli.wallet_path)?;
            println!("Wallet initialized at {:?}", cli.wallet_path);
            println!("Public Key: {}", wallet.public_key);
        }
        Commands::Show => {
            let wallet = Wallet::load(&cli.wallet_path)?;
            println!("Wallet: {:?}", cli.wallet_path);
            println!("Public Key: {}", wallet.public_key);
        }
        Commands::Purchase { coverage, days, payment } => {
            let payment = payment.unwrap_or_else(|| mutual_types::policy::required_premium(*coverage));
            node.submit(
                &cli.wallet_path,
                InsuranceInstruction::PurchasePolicy {
                    coverage_amount: *coverage,
                    duration_days: *days,
                    payment,
                },
            )
            .await?;
        }
        Commands::Claim { policy, amount, description } => {
            node.submit(
                &cli.wallet_path,
                InsuranceInstruction::SubmitClaim {
                    policy_id: *policy,
                    claim_amount: *amount,
                    description: description.clone(),
                },
            )
            .await?;
        }
        Commands::Approve { claim } => {
            node.submit(
                &cli.wallet_path,
                InsuranceInstruction::ProcessClaim { claim_id: *claim, approve: true },
            )
            .await?;
        }
        Commands::Deny { claim } => {
            node.submit(
                &cli.wallet_path,
                InsuranceInstruction::ProcessClaim { claim_id: *claim, approve: false },
            )
            .await?;
        }
        Commands::Contribute { amount } => {
            node.submit(&cli.wallet_path, InsuranceInstruction::Contribute { amount: *amount })
                .await?;
        }
        Commands::EmergencyDrain => {
            node.submit(&cli.wallet_path, InsuranceInstruction::EmergencyDrain)
                .await?;
        }
        Commands::Pool => {
            println!("Pool:\n{}", node.get("/pool").await?);
        }
        Commands::Policy { id } => {
            println!("Policy:\n{}", node.get(&format!("/policy/{}", id)).await?);
        }
        Commands::ClaimInfo { id } => {
            println!("Claim:\n{}", node.get(&format!("/claim/{}", id)).await?);
        }
        Commands::Policies { holder } => {
            let holder = wallet_or(holder, &cli.wallet_path)?;
            println!("Policies:\n{}", node.get(&format!("/policies/{}", holder)).await?);
        }
        Commands::Contribution { address } => {
            let address = wallet_or(address, &cli.wallet_path)?;
            println!("Contribution:\n{}", node.get(&format!("/contribution/{}", address)).await?);
        }
        Commands::Balance { address } => {
            let address = wallet_or(address, &cli.wallet_path)?;
            println!("Account Info:\n{}", node.get(&format!("/account/{}", address)).await?);
        }
        Commands::Block { height } => match node.get(&format!("/block/{}", height)).await {
            Ok(block) => println!("Block Info: {}", block),
            Err(_) => println!("Block not found"),
        },
        Commands::Receipt { tx_id } => {
            println!("Receipt:\n{}", node.get(&format!("/receipt/{}", tx_id)).await?);
        }
    }

    Ok(())
}
