//! Operational scripts for the pre-authorized debit program. See [`crate::cli::Command`] for the
//! available subcommands and [`crate::load_env`] for the environment they read.

use std::{
    collections::HashSet,
    io::Read,
    str::FromStr,
    sync::Arc,
    time::Duration,
};

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use pad_client::{
    e2e_helpers::wait_for_validator,
    fmt_kv,
    logs::{
        fmt_event,
        log_divider,
    },
    print_kv,
    read_client::{
        PreAuthorizationKind,
        ProgramAccount,
    },
    transaction_factory::TransactionFactory,
    transactions::{
        CustomRpcClient,
        SendTransactionConfig,
    },
    LogColor,
    PreAuthorizedDebitReadClient,
};
use pad_interface::{
    cycles::available_debit_amount,
    state::pre_authorization::{
        PreAuthorization,
        PreAuthorizationVariant,
    },
};
use solana_address::Address;
use solana_client::{
    nonblocking::rpc_client::RpcClient,
    rpc_client::GetConfirmedSignaturesForAddress2Config,
};
use solana_commitment_config::CommitmentConfig;
use solana_sdk::signature::{
    Signature,
    Signer,
};
use transaction_parser::{
    errors::pad_error_from_logs,
    events::parse_pad_events,
};

use crate::cli::{
    CliArgs,
    Command,
};

pub mod cli;
pub mod load_env;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let CliArgs { command } = CliArgs::parse();
    let program_id = load_env::program_id()?;

    match command {
        Command::ParseLogs { input } => {
            let mut contents = String::new();
            if input.as_os_str() == "-" {
                std::io::stdin()
                    .read_to_string(&mut contents)
                    .context("Couldn't read logs from stdin")?;
            } else {
                contents = std::fs::read_to_string(&input)
                    .with_context(|| format!("Couldn't read {}", input.display()))?;
            }
            parse_logs(&contents, &program_id)
        }
        Command::VerifyEvents { limit } => verify_events(&program_id, limit).await,
        Command::WaitForValidator { timeout_secs } => {
            let url = load_env::rpc_url();
            wait_for_validator(url, Duration::from_secs(timeout_secs)).await?;
            print_kv!("Validator healthy", url, LogColor::Header);
            Ok(())
        }
        Command::PreAuthorizations {
            token_account,
            debit_authority,
            kind,
        } => list_pre_authorizations(&program_id, token_account, debit_authority, kind).await,
        Command::SmartDelegate { init } => smart_delegate(&program_id, init).await,
        Command::Fund { address } => {
            let rpc = custom_rpc_client(&program_id);
            rpc.fund_account(&address).await?;
            print_kv!("Funded", address, LogColor::Header);
            Ok(())
        }
    }
}

fn read_client(program_id: &Address) -> PreAuthorizedDebitReadClient {
    PreAuthorizedDebitReadClient::custom(
        Arc::new(RpcClient::new_with_commitment(
            load_env::rpc_url().to_string(),
            CommitmentConfig::confirmed(),
        )),
        *program_id,
    )
}

fn custom_rpc_client(program_id: &Address) -> CustomRpcClient {
    CustomRpcClient::new_from_url(
        load_env::rpc_url(),
        SendTransactionConfig {
            program_id: *program_id,
            program_id_filter: HashSet::from([*program_id]),
            ..Default::default()
        },
    )
}

fn parse_logs(contents: &str, program_id: &Address) -> anyhow::Result<()> {
    let lines = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>();
    let events = parse_pad_events(&lines, program_id)?;

    print_kv!("Events", events.len(), LogColor::Info);
    for event in events.iter() {
        println!("  {}", fmt_event(event));
    }
    if let Some(err) = pad_error_from_logs(&lines) {
        print_kv!("Program error", err, LogColor::Error);
    }

    Ok(())
}

/// Decodes the events of the program's latest `limit` transactions. A transaction that can't be
/// fetched or parsed is reported and skipped.
async fn verify_events(program_id: &Address, limit: usize) -> anyhow::Result<()> {
    let rpc = custom_rpc_client(program_id);
    let statuses = rpc
        .client
        .get_signatures_for_address_with_config(
            program_id,
            GetConfirmedSignaturesForAddress2Config {
                limit: Some(limit),
                commitment: Some(CommitmentConfig::confirmed()),
                ..Default::default()
            },
        )
        .await
        .context("Couldn't fetch program signatures")?;

    let (mut parsed, mut failed, mut events) = (0usize, 0usize, 0usize);
    for status in statuses {
        let result = match Signature::from_str(&status.signature) {
            Ok(signature) => rpc.fetch_parsed_transaction(&signature).await,
            Err(e) => Err(e).context("Invalid signature"),
        };
        match result {
            Ok(transaction) => {
                parsed += 1;
                events += transaction.events.len();
                pad_client::logs::print_transaction(&transaction, &rpc.config.program_id_filter);
            }
            Err(e) => {
                failed += 1;
                eprintln!(
                    "{}",
                    fmt_kv!(status.signature, format!("{e:#}"), LogColor::Error)
                );
            }
        }
    }

    log_divider();
    print_kv!("Transactions parsed", parsed, LogColor::Header);
    print_kv!("Transactions skipped", failed, LogColor::Warning);
    print_kv!("Events decoded", events, LogColor::Info);
    Ok(())
}

async fn list_pre_authorizations(
    program_id: &Address,
    token_account: Option<Address>,
    debit_authority: Option<Address>,
    kind: PreAuthorizationKind,
) -> anyhow::Result<()> {
    let reader = read_client(program_id);
    let accounts = match (token_account, debit_authority) {
        (Some(token_account), _) => {
            reader
                .fetch_pre_authorizations_for_token_account(&token_account, kind)
                .await?
        }
        (None, Some(debit_authority)) => {
            reader
                .fetch_pre_authorizations_for_debit_authority(&debit_authority, kind)
                .await?
        }
        (None, None) => anyhow::bail!("Pass either --token-account or --debit-authority"),
    };
    let now = reader.fetch_unix_timestamp().await?;

    print_kv!("Pre-authorizations", accounts.len(), LogColor::Info);
    for account in accounts.iter() {
        log_divider();
        print_pre_authorization(account, now);
    }

    Ok(())
}

fn print_pre_authorization(
    ProgramAccount { address, account }: &ProgramAccount<PreAuthorization>,
    now: i64,
) {
    print_kv!("Address", address, LogColor::Info);
    print_kv!("Token account", account.token_account);
    print_kv!("Debit authority", account.debit_authority);
    print_kv!("Activation", account.activation_unix_timestamp);
    print_kv!("Paused", account.paused);
    match account.variant {
        PreAuthorizationVariant::OneTime {
            amount_authorized,
            expiry_unix_timestamp,
            amount_debited,
        } => {
            print_kv!("Variant", "one-time");
            print_kv!("Authorized", amount_authorized);
            print_kv!("Debited", amount_debited);
            print_kv!("Expiry", expiry_unix_timestamp);
        }
        PreAuthorizationVariant::Recurring {
            repeat_frequency_seconds,
            recurring_amount_authorized,
            amount_debited_total,
            last_debited_cycle,
            num_cycles,
            reset_every_cycle,
            ..
        } => {
            print_kv!("Variant", "recurring");
            print_kv!("Authorized per cycle", recurring_amount_authorized);
            print_kv!("Frequency (s)", repeat_frequency_seconds);
            print_kv!(
                "Cycles",
                num_cycles.map_or("unbounded".to_string(), |n| n.to_string())
            );
            print_kv!("Reset every cycle", reset_every_cycle);
            print_kv!("Debited total", amount_debited_total);
            print_kv!("Last debited cycle", last_debited_cycle);
        }
    }
    match available_debit_amount(account, now) {
        Ok(amount) => print_kv!("Available now", amount, LogColor::Header),
        Err(e) => print_kv!("Available now", format!("0 ({e})"), LogColor::Warning),
    }
}

async fn smart_delegate(program_id: &Address, init: bool) -> anyhow::Result<()> {
    let reader = read_client(program_id);
    let pda = reader.get_smart_delegate_pda();

    match reader.fetch_smart_delegate().await? {
        Some(ProgramAccount { address, account }) => {
            print_kv!("Smart delegate", address, LogColor::Info);
            print_kv!("Bump", account.bump);
        }
        None if init => {
            let payer = load_env::payer_keypair()?;
            let factory = TransactionFactory::new(reader);
            let tx = factory.build_init_smart_delegate_tx(&payer.pubkey());
            custom_rpc_client(program_id)
                .send_single_signer(&payer, tx.instructions())
                .await
                .context("Failed to initialize the smart delegate")?;
            print_kv!("Initialized smart delegate", pda.address, LogColor::Header);
        }
        None => {
            print_kv!("Smart delegate not initialized", pda.address, LogColor::Warning);
        }
    }

    Ok(())
}
