//! Lightweight, nonblocking RPC client utilities for funding accounts, sending transactions,
//! and printing the program's events from their logs.

use std::{
    collections::HashSet,
    time::Duration,
};

use anyhow::{
    bail,
    Context,
};
use colored::Colorize;
use solana_address::Address;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_commitment_config::CommitmentConfig;
use solana_compute_budget_interface::ComputeBudgetInstruction;
use solana_sdk::{
    message::{
        Instruction,
        Message,
    },
    signature::{
        Keypair,
        Signature,
        Signer,
    },
    transaction::Transaction,
};
use solana_transaction_status::{
    EncodedConfirmedTransactionWithStatusMeta,
    UiTransactionEncoding,
};
use transaction_parser::client_rpc::parsed_transaction::ParsedTransaction;

use crate::{
    logs::print_transaction,
    print_kv,
    LogColor,
};

pub const DEFAULT_RPC_URL: &str = "http://localhost:8899";

pub struct CustomRpcClient {
    pub client: RpcClient,
    pub config: SendTransactionConfig,
}

impl Default for CustomRpcClient {
    fn default() -> Self {
        CustomRpcClient {
            client: RpcClient::new_with_commitment(
                DEFAULT_RPC_URL.into(),
                CommitmentConfig::confirmed(),
            ),
            config: Default::default(),
        }
    }
}

impl CustomRpcClient {
    pub fn new(client: Option<RpcClient>, config: Option<SendTransactionConfig>) -> Self {
        match (client, config) {
            (Some(client), Some(config)) => Self { client, config },
            (client, config) => {
                let CustomRpcClient {
                    client: default_client,
                    config: default_config,
                } = Default::default();
                Self {
                    client: client.unwrap_or(default_client),
                    config: config.unwrap_or(default_config),
                }
            }
        }
    }

    pub fn new_from_url(url: &str, config: SendTransactionConfig) -> Self {
        CustomRpcClient {
            client: RpcClient::new_with_commitment(url.into(), CommitmentConfig::confirmed()),
            config,
        }
    }

    pub async fn fund_account(&self, address: &Address) -> anyhow::Result<()> {
        fund(&self.client, address).await
    }

    pub async fn fund_new_account(&self) -> anyhow::Result<Keypair> {
        let kp = Keypair::new();
        fund(&self.client, &kp.pubkey()).await?;

        Ok(kp)
    }

    /// Sends and confirms a transaction with the signer passed in as the payer and sole signer.
    pub async fn send_single_signer(
        &self,
        signer: &Keypair,
        instructions: impl AsRef<[Instruction]>,
    ) -> anyhow::Result<ParsedTransaction> {
        self.send_and_confirm_txn(signer, &[], instructions.as_ref())
            .await
    }

    /// Sends and confirms a transaction signed by `payer` and every keypair in `signers`.
    pub async fn send_and_confirm_txn(
        &self,
        payer: &Keypair,
        signers: &[&Keypair],
        instructions: &[Instruction],
    ) -> anyhow::Result<ParsedTransaction> {
        send_transaction_with_config(&self.client, payer, signers, instructions, &self.config).await
    }

    pub async fn fetch_parsed_transaction(
        &self,
        signature: &Signature,
    ) -> anyhow::Result<ParsedTransaction> {
        let encoded = fetch_transaction_json(&self.client, *signature).await?;
        ParsedTransaction::from_encoded_transaction(encoded, &self.config.program_id)
    }
}

const MAX_TRIES: u8 = 20;

const POLL_INTERVAL: Duration = Duration::from_millis(500);

pub const DEFAULT_FUND_AMOUNT: u64 = 10_000_000_000;

async fn fund(rpc: &RpcClient, address: &Address) -> anyhow::Result<()> {
    let airdrop_signature: Signature = rpc
        .request_airdrop(address, DEFAULT_FUND_AMOUNT)
        .await
        .context("Failed to request airdrop")?;

    if !wait_for_transaction_to_confirm(rpc, &airdrop_signature).await? {
        bail!("Airdrop did not land.");
    }

    Ok(())
}

/// Polls until `signature` is confirmed, returning `false` if it still isn't after
/// `MAX_TRIES` attempts.
pub async fn wait_for_transaction_to_confirm(
    rpc: &RpcClient,
    signature: &Signature,
) -> anyhow::Result<bool> {
    for _ in 0..MAX_TRIES {
        if rpc
            .confirm_transaction(signature)
            .await
            .context("Couldn't confirm transaction")?
        {
            return Ok(true);
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }

    Ok(false)
}

#[derive(Clone)]
pub struct SendTransactionConfig {
    pub compute_budget: Option<u32>,
    pub debug_logs: Option<bool>,
    /// Top-level invocations printed with debug logs. Empty prints all of them.
    pub program_id_filter: HashSet<Address>,
    /// The program whose events are decoded from transaction logs.
    pub program_id: Address,
}

impl Default for SendTransactionConfig {
    fn default() -> Self {
        SendTransactionConfig {
            compute_budget: Default::default(),
            debug_logs: Some(true),
            program_id_filter: HashSet::new(),
            program_id: pad_interface::program::ID,
        }
    }
}

/// Prepends the compute budget instructions when `compute_budget` is set.
pub fn with_compute_budget(
    compute_budget: Option<u32>,
    instructions: &[Instruction],
) -> Vec<Instruction> {
    [
        compute_budget.map_or(vec![], |budget| {
            vec![
                ComputeBudgetInstruction::set_compute_unit_limit(budget),
                ComputeBudgetInstruction::set_compute_unit_price(1),
            ]
        }),
        instructions.to_vec(),
    ]
    .concat()
}

async fn send_transaction_with_config(
    rpc: &RpcClient,
    payer: &Keypair,
    signers: &[&Keypair],
    instructions: &[Instruction],
    config: &SendTransactionConfig,
) -> anyhow::Result<ParsedTransaction> {
    let bh = rpc
        .get_latest_blockhash()
        .await
        .context("Failed to fetch latest blockhash")?;

    let final_instructions = with_compute_budget(config.compute_budget, instructions);
    let msg = Message::new(&final_instructions, Some(&payer.pubkey()));

    let all_signers = std::iter::once(payer)
        .chain(signers.iter().copied().filter(|s| s.pubkey() != payer.pubkey()))
        .collect::<Vec<_>>();
    let mut tx = Transaction::new_unsigned(msg);
    tx.try_sign(&all_signers, bh)
        .context("Failed to sign transaction")?;

    let signature = match rpc.send_and_confirm_transaction(&tx).await {
        Ok(signature) => signature,
        Err(error) => {
            print_kv!("Payer", payer.pubkey(), LogColor::Error);
            return Err(error).context("Failed transaction submission");
        }
    };

    let encoded = fetch_transaction_json(rpc, signature).await?;
    let parsed_transaction =
        ParsedTransaction::from_encoded_transaction(encoded, &config.program_id)
            .context("Failed to parse transaction")?;

    if matches!(config.debug_logs, Some(true)) {
        print_transaction(&parsed_transaction, &config.program_id_filter);
    }

    Ok(parsed_transaction)
}

pub async fn fetch_transaction_json(
    rpc: &RpcClient,
    sig: Signature,
) -> anyhow::Result<EncodedConfirmedTransactionWithStatusMeta> {
    rpc.get_transaction_with_config(
        &sig,
        solana_client::rpc_config::RpcTransactionConfig {
            encoding: Some(UiTransactionEncoding::Json),
            commitment: Some(CommitmentConfig::confirmed()),
            max_supported_transaction_version: Some(0),
        },
    )
    .await
    .with_context(|| format!("Failed to fetch transaction {sig}"))
}

/// Checks if an account at the given address exists on-chain.
pub async fn account_exists(rpc: &RpcClient, address: &Address) -> anyhow::Result<bool> {
    Ok(rpc
        .get_account_with_commitment(address, CommitmentConfig::confirmed())
        .await
        .context("Couldn't retrieve account data")?
        .value
        .is_some())
}
