use std::{
    sync::Arc,
    time::{
        Duration,
        Instant,
    },
};

use anyhow::{
    bail,
    Context,
};
use solana_address::Address;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_commitment_config::CommitmentConfig;
use solana_sdk::signature::{
    Keypair,
    Signer,
};
use transaction_parser::client_rpc::parsed_transaction::ParsedTransaction;

use crate::{
    context::token::TokenContext,
    read_client::PreAuthorizedDebitReadClient,
    transaction_factory::{
        TransactionFactory,
        TransactionWithMetadata,
    },
    transactions::{
        account_exists,
        CustomRpcClient,
    },
};

pub mod test_accounts;

const HEALTH_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Polls `getHealth` until the validator at `url` reports healthy or `timeout` elapses.
pub async fn wait_for_validator(url: &str, timeout: Duration) -> anyhow::Result<()> {
    let rpc = RpcClient::new(url.to_string());
    let deadline = Instant::now() + timeout;

    loop {
        let err = match rpc.get_health().await {
            Ok(()) => return Ok(()),
            Err(e) => e,
        };
        if Instant::now() >= deadline {
            return Err(err).with_context(|| {
                format!("Validator at {url} not healthy after {}s", timeout.as_secs())
            });
        }
        tokio::time::sleep(HEALTH_POLL_INTERVAL).await;
    }
}

/// Convenience harness for end-to-end tests and scripts.
///
/// Upon instantiation it:
/// - Airdrops [`crate::transactions::DEFAULT_FUND_AMOUNT`] lamports to the
///   [`test_accounts::default_payer`] account if it doesn't exist yet.
/// - Initializes the smart delegate if it doesn't exist yet.
/// - Creates a new SPL token mint, paid for by the default payer.
/// - Creates the [`test_accounts::token_account_owner`] associated token account and mints
///   `initial_amount` to it if the amount is != 0.
pub struct E2e {
    pub rpc: CustomRpcClient,
    pub factory: TransactionFactory,
    pub token: TokenContext,
    pub owner_token_account: Address,
}

impl E2e {
    pub async fn new(rpc: Option<CustomRpcClient>, initial_amount: u64) -> anyhow::Result<Self> {
        let rpc = rpc.unwrap_or_default();
        let reader = PreAuthorizedDebitReadClient::custom(
            Arc::new(RpcClient::new_with_commitment(
                rpc.client.url(),
                CommitmentConfig::confirmed(),
            )),
            rpc.config.program_id,
        );
        let factory = TransactionFactory::new(reader);

        let default_payer = test_accounts::default_payer();
        for account in [
            default_payer.pubkey(),
            test_accounts::token_account_owner().pubkey(),
            test_accounts::debit_authority().pubkey(),
        ] {
            if !account_exists(&rpc.client, &account).await? {
                rpc.fund_account(&account).await?;
            }
        }

        if factory.reader().fetch_smart_delegate().await?.is_none() {
            let tx = factory.build_init_smart_delegate_tx(&default_payer.pubkey());
            rpc.send_single_signer(default_payer, tx.instructions())
                .await
                .context("Failed to initialize the smart delegate")?;
        }

        let token = TokenContext::create_new_from_mint(
            &rpc,
            default_payer.insecure_clone(),
            Keypair::new(),
            6,
            spl_token_interface::ID,
        )
        .await?;
        let owner = test_accounts::token_account_owner().pubkey();
        let owner_token_account = token.create_ata_for(&rpc, default_payer, &owner).await?;
        if initial_amount != 0 {
            token.mint_to(&rpc, &owner, initial_amount).await?;
        }

        Ok(Self {
            rpc,
            factory,
            token,
            owner_token_account,
        })
    }

    pub fn reader(&self) -> &PreAuthorizedDebitReadClient {
        self.factory.reader()
    }

    /// Sends `tx` with `payer` as the fee payer. Every expected signer must be in `signers` or be
    /// the payer.
    pub async fn send<T>(
        &self,
        tx: &TransactionWithMetadata<T>,
        payer: &Keypair,
        signers: &[&Keypair],
    ) -> anyhow::Result<ParsedTransaction> {
        for expected in tx.expected_signers.iter() {
            let provided = std::iter::once(payer)
                .chain(signers.iter().copied())
                .any(|kp| kp.pubkey() == expected.address);
            if !provided {
                bail!("Missing signer {} ({})", expected.address, expected.reason);
            }
        }

        self.rpc
            .send_and_confirm_txn(payer, signers, &tx.instructions())
            .await
    }

    pub async fn balance_of(&self, owner: &Address) -> anyhow::Result<u64> {
        self.token.get_balance_for(&self.rpc, owner).await
    }
}
