//! Read-only access to smart delegate and pre-authorization accounts.

use std::sync::Arc;

use futures::future::try_join_all;
use itertools::Itertools;
use pad_interface::{
    cycles::{
        available_debit_amount,
        compute_current_cycle,
    },
    instructions::{
        Debit,
        DebitInstructionData,
    },
    state::{
        pre_authorization::{
            PreAuthorization,
            PreAuthorizationVariant,
            ONE_TIME_VARIANT_TAG,
            RECURRING_VARIANT_TAG,
        },
        smart_delegate::SmartDelegate,
    },
    utils::is_token_program,
};
use solana_address::Address;
use solana_client::{
    client_error::ClientError,
    nonblocking::rpc_client::RpcClient,
    rpc_config::{
        RpcAccountInfoConfig,
        RpcProgramAccountsConfig,
        RpcSimulateTransactionConfig,
        UiAccountEncoding,
    },
    rpc_filter::{
        Memcmp,
        RpcFilterType,
    },
};
use solana_sdk::{
    message::Message,
    program_pack::Pack,
    transaction::Transaction,
};
use spl_associated_token_account_interface::address::get_associated_token_address_with_program_id;
use spl_token_interface::state::Account as TokenAccount;
use transaction_parser::events::{
    parse_pad_events,
    PadEvent,
};

use crate::{
    errors::{
        SdkError,
        SdkResult,
    },
    pda::{
        find_pre_authorization_address,
        find_smart_delegate_address,
        Pda,
    },
};

/// `SysvarC1ock11111111111111111111111111111111`.
pub const CLOCK_SYSVAR_ID: Address =
    Address::from_str_const("SysvarC1ock11111111111111111111111111111111");

/// The clock sysvar's bincode layout.
#[derive(Debug, serde::Deserialize)]
struct ClockSysvar {
    _slot: u64,
    _epoch_start_timestamp: i64,
    _epoch: u64,
    _leader_schedule_epoch: u64,
    unix_timestamp: i64,
}

/// Which pre-authorization variants a query should return.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, strum_macros::EnumString, strum_macros::Display,
)]
#[strum(serialize_all = "kebab-case")]
pub enum PreAuthorizationKind {
    #[default]
    All,
    OneTime,
    Recurring,
}

/// A decoded program account and its address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgramAccount<T> {
    pub address: Address,
    pub account: T,
}

/// Identifies a pre-authorization either directly or by the seeds it was derived from.
#[derive(Clone, Copy, Debug)]
pub enum PreAuthorizationQuery {
    Address(Address),
    Seeds {
        token_account: Address,
        debit_authority: Address,
    },
}

#[derive(Clone)]
pub struct PreAuthorizedDebitReadClient {
    rpc: Arc<RpcClient>,
    program_id: Address,
}

impl PreAuthorizedDebitReadClient {
    pub fn custom(rpc: Arc<RpcClient>, program_id: Address) -> Self {
        Self { rpc, program_id }
    }

    pub fn mainnet(rpc: Arc<RpcClient>) -> Self {
        Self::custom(rpc, pad_interface::program::ID)
    }

    pub fn devnet(rpc: Arc<RpcClient>) -> Self {
        Self::custom(rpc, pad_interface::program::ID)
    }

    pub fn rpc(&self) -> &RpcClient {
        &self.rpc
    }

    pub fn program_id(&self) -> &Address {
        &self.program_id
    }

    pub fn rpc_url(&self) -> String {
        self.rpc.url()
    }

    pub(crate) fn rpc_error(&self, source: ClientError) -> SdkError {
        SdkError::Rpc {
            rpc: self.rpc_url(),
            source: Box::new(source),
        }
    }

    fn invalid_account_data(&self, address: Address, reason: impl ToString) -> SdkError {
        SdkError::InvalidAccountData {
            rpc: self.rpc_url(),
            address,
            reason: reason.to_string(),
        }
    }

    pub fn get_smart_delegate_pda(&self) -> Pda {
        find_smart_delegate_address(&self.program_id)
    }

    pub fn derive_pre_authorization_pda(
        &self,
        token_account: &Address,
        debit_authority: &Address,
    ) -> Pda {
        find_pre_authorization_address(&self.program_id, token_account, debit_authority)
    }

    async fn fetch_account(&self, address: &Address) -> SdkResult<Option<solana_account::Account>> {
        self.rpc
            .get_account_with_commitment(address, self.rpc.commitment())
            .await
            .map(|response| response.value)
            .map_err(|e| self.rpc_error(e))
    }

    /// Fetches an account owned by the program, or `None` if it doesn't exist.
    async fn fetch_program_data(&self, address: &Address) -> SdkResult<Option<Vec<u8>>> {
        match self.fetch_account(address).await? {
            Some(account) if account.owner == self.program_id => Ok(Some(account.data)),
            Some(account) => Err(self.invalid_account_data(
                *address,
                format!("owned by {} instead of {}", account.owner, self.program_id),
            )),
            None => Ok(None),
        }
    }

    pub async fn fetch_smart_delegate(&self) -> SdkResult<Option<ProgramAccount<SmartDelegate>>> {
        let Pda { address, .. } = self.get_smart_delegate_pda();
        let Some(data) = self.fetch_program_data(&address).await? else {
            return Ok(None);
        };
        let account =
            SmartDelegate::unpack(&data).map_err(|e| self.invalid_account_data(address, e))?;

        Ok(Some(ProgramAccount { address, account }))
    }

    pub async fn fetch_pre_authorization(
        &self,
        query: PreAuthorizationQuery,
    ) -> SdkResult<Option<ProgramAccount<PreAuthorization>>> {
        let address = match query {
            PreAuthorizationQuery::Address(address) => address,
            PreAuthorizationQuery::Seeds {
                token_account,
                debit_authority,
            } => {
                self.derive_pre_authorization_pda(&token_account, &debit_authority)
                    .address
            }
        };
        let Some(data) = self.fetch_program_data(&address).await? else {
            return Ok(None);
        };
        let account =
            PreAuthorization::unpack(&data).map_err(|e| self.invalid_account_data(address, e))?;

        Ok(Some(ProgramAccount { address, account }))
    }

    /// Fetches a pre-authorization by address, failing if it doesn't exist.
    pub async fn fetch_pre_authorization_or_err(
        &self,
        pre_authorization: &Address,
    ) -> SdkResult<ProgramAccount<PreAuthorization>> {
        self.fetch_pre_authorization(PreAuthorizationQuery::Address(*pre_authorization))
            .await?
            .ok_or_else(|| SdkError::PreAuthorizationNotFoundAt {
                rpc: self.rpc_url(),
                pre_authorization: *pre_authorization,
            })
    }

    async fn fetch_pre_authorizations(
        &self,
        filters: Vec<RpcFilterType>,
    ) -> SdkResult<Vec<ProgramAccount<PreAuthorization>>> {
        let config = RpcProgramAccountsConfig {
            filters: Some(
                [
                    vec![
                        RpcFilterType::DataSize(PreAuthorization::LEN as u64),
                        RpcFilterType::Memcmp(Memcmp::new_raw_bytes(
                            0,
                            PreAuthorization::DISCRIMINATOR.to_vec(),
                        )),
                    ],
                    filters,
                ]
                .concat(),
            ),
            account_config: RpcAccountInfoConfig {
                encoding: Some(UiAccountEncoding::Base64),
                commitment: Some(self.rpc.commitment()),
                data_slice: None,
                min_context_slot: None,
            },
            with_context: None,
            sort_results: Some(true),
        };

        let accounts = self
            .rpc
            .get_program_accounts_with_config(&self.program_id, config)
            .await
            .map_err(|e| self.rpc_error(e))?;

        accounts
            .into_iter()
            .map(|(address, account)| {
                PreAuthorization::unpack(&account.data)
                    .map(|account| ProgramAccount { address, account })
                    .map_err(|e| self.invalid_account_data(address, e))
            })
            .collect()
    }

    pub async fn fetch_pre_authorizations_for_token_account(
        &self,
        token_account: &Address,
        kind: PreAuthorizationKind,
    ) -> SdkResult<Vec<ProgramAccount<PreAuthorization>>> {
        let mut filters = vec![memcmp(
            PreAuthorization::TOKEN_ACCOUNT_OFFSET,
            token_account.as_ref(),
        )];
        match kind {
            PreAuthorizationKind::All => (),
            PreAuthorizationKind::OneTime => filters.push(memcmp(
                PreAuthorization::VARIANT_TAG_OFFSET,
                &[ONE_TIME_VARIANT_TAG],
            )),
            PreAuthorizationKind::Recurring => filters.push(memcmp(
                PreAuthorization::VARIANT_TAG_OFFSET,
                &[RECURRING_VARIANT_TAG],
            )),
        }

        self.fetch_pre_authorizations(filters).await
    }

    /// The debit authority's offset depends on the variant and on whether a recurring
    /// pre-authorization has a cycle limit, so one query is issued per layout.
    pub async fn fetch_pre_authorizations_for_debit_authority(
        &self,
        debit_authority: &Address,
        kind: PreAuthorizationKind,
    ) -> SdkResult<Vec<ProgramAccount<PreAuthorization>>> {
        let debit_authority = debit_authority.as_ref();
        let one_time = || {
            vec![
                memcmp(PreAuthorization::VARIANT_TAG_OFFSET, &[ONE_TIME_VARIANT_TAG]),
                memcmp(
                    PreAuthorization::ONE_TIME_DEBIT_AUTHORITY_OFFSET,
                    debit_authority,
                ),
            ]
        };
        let recurring = |num_cycles_tag: u8, offset: usize| {
            vec![
                memcmp(PreAuthorization::VARIANT_TAG_OFFSET, &[RECURRING_VARIANT_TAG]),
                memcmp(PreAuthorization::NUM_CYCLES_TAG_OFFSET, &[num_cycles_tag]),
                memcmp(offset, debit_authority),
            ]
        };
        let recurring_unbounded = || {
            recurring(0, PreAuthorization::RECURRING_UNBOUNDED_DEBIT_AUTHORITY_OFFSET)
        };
        let recurring_bounded =
            || recurring(1, PreAuthorization::RECURRING_BOUNDED_DEBIT_AUTHORITY_OFFSET);

        let filter_sets = match kind {
            PreAuthorizationKind::All => {
                vec![one_time(), recurring_unbounded(), recurring_bounded()]
            }
            PreAuthorizationKind::OneTime => vec![one_time()],
            PreAuthorizationKind::Recurring => vec![recurring_unbounded(), recurring_bounded()],
        };

        let results = try_join_all(
            filter_sets
                .into_iter()
                .map(|filters| self.fetch_pre_authorizations(filters)),
        )
        .await?;

        Ok(results
            .into_iter()
            .flatten()
            .unique_by(|account| account.address)
            .collect())
    }

    /// Returns the token program that owns `token_account`.
    pub async fn fetch_token_program_id_for_token_account(
        &self,
        token_account: &Address,
    ) -> SdkResult<Address> {
        match self.fetch_account(token_account).await? {
            Some(account) if is_token_program(&account.owner) => Ok(account.owner),
            _ => Err(SdkError::TokenAccountDoesNotExist {
                rpc: self.rpc_url(),
                token_account: *token_account,
            }),
        }
    }

    /// Fetches and decodes the base state of an SPL Token or Token-2022 account, along with its
    /// token program.
    pub async fn fetch_token_account(
        &self,
        token_account: &Address,
    ) -> SdkResult<(TokenAccount, Address)> {
        let not_found = || SdkError::TokenAccountDoesNotExist {
            rpc: self.rpc_url(),
            token_account: *token_account,
        };
        let account = self
            .fetch_account(token_account)
            .await?
            .filter(|account| is_token_program(&account.owner))
            .ok_or_else(not_found)?;

        // Token-2022 extensions follow the base layout, which is shared by both programs.
        let base = account
            .data
            .get(..TokenAccount::LEN)
            .ok_or_else(|| self.invalid_account_data(*token_account, "data too short"))?;
        let state =
            TokenAccount::unpack(base).map_err(|e| self.invalid_account_data(*token_account, e))?;

        Ok((state, account.owner))
    }

    /// The cluster's current unix timestamp, read from the clock sysvar.
    pub async fn fetch_unix_timestamp(&self) -> SdkResult<i64> {
        let account = self
            .rpc
            .get_account(&CLOCK_SYSVAR_ID)
            .await
            .map_err(|e| self.rpc_error(e))?;
        bincode::deserialize::<ClockSysvar>(&account.data)
            .map(|clock| clock.unix_timestamp)
            .map_err(|e| self.invalid_account_data(CLOCK_SYSVAR_ID, e))
    }

    /// Simulates debiting `amount` into the debit authority's associated token account and
    /// returns whether the simulation emitted a debit event.
    ///
    /// Returns `false` if the pre-authorization doesn't exist.
    pub async fn check_debit_amount(
        &self,
        token_account: &Address,
        debit_authority: &Address,
        amount: u64,
    ) -> SdkResult<bool> {
        let (token_account_state, token_program) = self.fetch_token_account(token_account).await?;
        let Some(pre_authorization) = self
            .fetch_pre_authorization(PreAuthorizationQuery::Seeds {
                token_account: *token_account,
                debit_authority: *debit_authority,
            })
            .await?
        else {
            return Ok(false);
        };

        // The debit authority can debit into any token account; its ATA keeps this simple.
        let destination_token_account = get_associated_token_address_with_program_id(
            debit_authority,
            &token_account_state.mint,
            &token_program,
        );
        let mut instruction = Debit {
            debit_authority: *debit_authority,
            mint: token_account_state.mint,
            token_account: *token_account,
            destination_token_account,
            smart_delegate: self.get_smart_delegate_pda().address,
            pre_authorization: pre_authorization.address,
            token_program,
        }
        .create_instruction(DebitInstructionData { amount });
        instruction.program_id = self.program_id;

        let transaction =
            Transaction::new_unsigned(Message::new(&[instruction], Some(debit_authority)));
        let simulation = self
            .rpc
            .simulate_transaction_with_config(
                &transaction,
                RpcSimulateTransactionConfig {
                    sig_verify: false,
                    replace_recent_blockhash: true,
                    commitment: Some(self.rpc.commitment()),
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| self.rpc_error(e))?;

        let logs = simulation.value.logs.unwrap_or_default();
        let events = decode_events(&logs, &self.program_id, self.rpc_url())?;

        Ok(events
            .iter()
            .any(|event| matches!(event, PadEvent::Debit(_))))
    }

    /// The largest amount the debit authority could debit right now.
    ///
    /// This is the smallest of the amount the pre-authorization permits at the cluster's clock,
    /// the token account's balance, and the amount delegated to the smart delegate.
    pub async fn fetch_max_debit_amount(
        &self,
        token_account: &Address,
        debit_authority: &Address,
    ) -> SdkResult<u64> {
        let pre_authorization = self
            .fetch_pre_authorization(PreAuthorizationQuery::Seeds {
                token_account: *token_account,
                debit_authority: *debit_authority,
            })
            .await?
            .ok_or_else(|| SdkError::NoPreAuthorizationFound {
                rpc: self.rpc_url(),
                token_account: *token_account,
                debit_authority: *debit_authority,
            })?;
        let (token_account_state, _) = self.fetch_token_account(token_account).await?;
        let now = self.fetch_unix_timestamp().await?;

        Ok(max_debit_amount(
            &pre_authorization.account,
            &token_account_state,
            &self.get_smart_delegate_pda().address,
            now,
        ))
    }

    /// Returns the current cycle of a recurring pre-authorization at the cluster's clock, or
    /// `None` for one-time pre-authorizations.
    pub async fn fetch_current_cycle(&self, pre_authorization: &Address) -> SdkResult<Option<u64>> {
        let ProgramAccount { address, account } =
            self.fetch_pre_authorization_or_err(pre_authorization).await?;
        let PreAuthorizationVariant::Recurring {
            repeat_frequency_seconds,
            ..
        } = account.variant
        else {
            return Ok(None);
        };
        let now = self.fetch_unix_timestamp().await?;

        compute_current_cycle(
            now,
            account.activation_unix_timestamp,
            repeat_frequency_seconds,
        )
        .map(Some)
        .map_err(|e| self.invalid_account_data(address, e))
    }
}

/// Decodes the events `program_id` emitted in `logs`. A known event with a malformed payload is an
/// error rather than an absent event.
pub(crate) fn decode_events(
    logs: &[String],
    program_id: &Address,
    rpc: String,
) -> SdkResult<Vec<PadEvent>> {
    parse_pad_events(logs, program_id).map_err(|e| SdkError::EventParse {
        rpc,
        reason: format!("{e:#}"),
    })
}

fn memcmp(offset: usize, bytes: &[u8]) -> RpcFilterType {
    RpcFilterType::Memcmp(Memcmp::new_raw_bytes(offset, bytes.to_vec()))
}

/// See [`PreAuthorizedDebitReadClient::fetch_max_debit_amount`]. A pre-authorization that can't be
/// debited at `now`, e.g. because it's paused or expired, yields 0.
pub fn max_debit_amount(
    pre_authorization: &PreAuthorization,
    token_account: &TokenAccount,
    smart_delegate: &Address,
    now: i64,
) -> u64 {
    let permitted = available_debit_amount(pre_authorization, now).unwrap_or(0);
    let delegated = match Option::<Address>::from(token_account.delegate) {
        Some(delegate) if &delegate == smart_delegate => token_account.delegated_amount,
        _ => 0,
    };

    permitted.min(token_account.amount).min(delegated)
}

/// Fails unless `smart_delegate` is the delegate of `token_account` for at least `amount`.
pub fn check_smart_delegate_enabled(
    address: &Address,
    token_account: &TokenAccount,
    smart_delegate: &Address,
    amount: u64,
    rpc: String,
) -> SdkResult<()> {
    match Option::<Address>::from(token_account.delegate) {
        Some(delegate) if &delegate == smart_delegate => {}
        _ => {
            return Err(SdkError::SmartDelegateNotSet {
                rpc,
                token_account: *address,
            })
        }
    }
    if token_account.delegated_amount < amount {
        return Err(SdkError::SmartDelegatedAmountNotEnough {
            rpc,
            token_account: *address,
            delegated_amount: token_account.delegated_amount,
            required: amount,
        });
    }

    Ok(())
}
