//! Builders for every program instruction. Each builder resolves the token account's owner, mint
//! and token program from chain and reports which signers the instruction needs.

use chrono::{
    DateTime,
    Utc,
};
use itertools::Itertools;
use pad_interface::{
    instructions::{
        ClosePreAuthorization,
        Debit,
        DebitInstructionData,
        InitPreAuthorization,
        InitPreAuthorizationInstructionData,
        InitPreAuthorizationParams,
        InitPreAuthorizationVariant,
        InitSmartDelegate,
        UpdatePausePreAuthorization,
        UpdatePausePreAuthorizationInstructionData,
    },
    state::pre_authorization::PreAuthorization,
};
use solana_address::Address;
use solana_instruction::Instruction;
use spl_associated_token_account_interface::address::get_associated_token_address_with_program_id;
use spl_token_interface::state::Account as TokenAccount;

use crate::{
    errors::{
        SdkError,
        SdkResult,
    },
    read_client::{
        check_smart_delegate_enabled,
        PreAuthorizedDebitReadClient,
        ProgramAccount,
    },
    time::date_to_unix_timestamp,
};

/// A signer an instruction requires and the role it signs for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExpectedSigner {
    pub address: Address,
    pub reason: &'static str,
}

impl ExpectedSigner {
    pub fn new(address: Address, reason: &'static str) -> Self {
        Self { address, reason }
    }
}

#[derive(Clone, Debug)]
pub struct InstructionWithMetadata<T> {
    pub instruction: Instruction,
    pub expected_signers: Vec<ExpectedSigner>,
    pub meta: T,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InitSmartDelegateMeta {
    pub smart_delegate: Address,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InitPreAuthorizationMeta {
    pub pre_authorization: Address,
    pub smart_delegate: Address,
    pub token_account: Address,
    pub token_account_owner: Address,
    pub mint: Address,
    pub token_program: Address,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UpdatePausePreAuthorizationMeta {
    pub pre_authorization: Address,
    pub pause: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClosePreAuthorizationMeta {
    pub pre_authorization: Address,
    pub receiver: Address,
    pub token_account: Address,
    pub token_account_owner: Address,
    pub token_program: Address,
    /// Whether the token account holds wrapped SOL.
    pub is_native: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DebitMeta {
    pub pre_authorization: Address,
    pub smart_delegate: Address,
    pub mint: Address,
    pub destination_token_account: Address,
    pub token_program: Address,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ApproveSmartDelegateMeta {
    pub smart_delegate: Address,
}

#[derive(Clone, Copy, Debug)]
pub struct InitOneTimePreAuthorizationParams {
    pub payer: Address,
    pub token_account: Address,
    pub debit_authority: Address,
    pub activation: DateTime<Utc>,
    /// Defaults to never expiring.
    pub expiry: Option<DateTime<Utc>>,
    pub amount_authorized: u64,
}

#[derive(Clone, Copy, Debug)]
pub struct InitRecurringPreAuthorizationParams {
    pub payer: Address,
    pub token_account: Address,
    pub debit_authority: Address,
    pub activation: DateTime<Utc>,
    pub repeat_frequency_seconds: u64,
    pub recurring_amount_authorized: u64,
    pub num_cycles: Option<u64>,
    pub reset_every_cycle: bool,
}

#[derive(Clone, Copy, Debug)]
pub struct DebitParams {
    pub token_account: Address,
    pub debit_authority: Address,
    pub amount: u64,
    /// Defaults to the debit authority's associated token account.
    pub destination_token_account: Option<Address>,
    /// Fails the build unless the smart delegate is delegated at least `amount` on the source
    /// token account.
    pub check_smart_delegate_enabled: bool,
}

#[derive(Clone)]
pub struct InstructionFactory {
    reader: PreAuthorizedDebitReadClient,
}

impl InstructionFactory {
    pub fn new(reader: PreAuthorizedDebitReadClient) -> Self {
        Self { reader }
    }

    pub fn reader(&self) -> &PreAuthorizedDebitReadClient {
        &self.reader
    }

    fn with_program_id(&self, mut instruction: Instruction) -> Instruction {
        instruction.program_id = *self.reader.program_id();
        instruction
    }

    pub fn build_init_smart_delegate_ix(
        &self,
        payer: &Address,
    ) -> InstructionWithMetadata<InitSmartDelegateMeta> {
        let smart_delegate = self.reader.get_smart_delegate_pda().address;
        let instruction = InitSmartDelegate {
            payer: *payer,
            smart_delegate,
        }
        .create_instruction();

        InstructionWithMetadata {
            instruction: self.with_program_id(instruction),
            expected_signers: vec![ExpectedSigner::new(*payer, "payer")],
            meta: InitSmartDelegateMeta { smart_delegate },
        }
    }

    async fn build_init_pre_authorization_ix(
        &self,
        payer: &Address,
        token_account: &Address,
        params: InitPreAuthorizationParams,
    ) -> SdkResult<InstructionWithMetadata<InitPreAuthorizationMeta>> {
        let (token_account_state, token_program) =
            self.reader.fetch_token_account(token_account).await?;
        let smart_delegate = self.reader.get_smart_delegate_pda().address;
        let pre_authorization = self
            .reader
            .derive_pre_authorization_pda(token_account, &params.debit_authority)
            .address;

        let instruction = InitPreAuthorization {
            payer: *payer,
            owner: token_account_state.owner,
            smart_delegate,
            token_account: *token_account,
            pre_authorization,
            token_program,
        }
        .create_instruction(InitPreAuthorizationInstructionData { params });

        Ok(InstructionWithMetadata {
            instruction: self.with_program_id(instruction),
            expected_signers: dedup_signers([
                ExpectedSigner::new(*payer, "payer"),
                ExpectedSigner::new(token_account_state.owner, "token account owner"),
            ]),
            meta: InitPreAuthorizationMeta {
                pre_authorization,
                smart_delegate,
                token_account: *token_account,
                token_account_owner: token_account_state.owner,
                mint: token_account_state.mint,
                token_program,
            },
        })
    }

    pub async fn build_init_one_time_pre_authorization_ix(
        &self,
        params: InitOneTimePreAuthorizationParams,
    ) -> SdkResult<InstructionWithMetadata<InitPreAuthorizationMeta>> {
        let init_params = InitPreAuthorizationParams {
            variant: InitPreAuthorizationVariant::OneTime {
                amount_authorized: params.amount_authorized,
                expiry_unix_timestamp: params
                    .expiry
                    .map_or(i64::MAX, |expiry| date_to_unix_timestamp(expiry, true)),
            },
            debit_authority: params.debit_authority,
            activation_unix_timestamp: date_to_unix_timestamp(params.activation, true),
        };

        self.build_init_pre_authorization_ix(&params.payer, &params.token_account, init_params)
            .await
    }

    pub async fn build_init_recurring_pre_authorization_ix(
        &self,
        params: InitRecurringPreAuthorizationParams,
    ) -> SdkResult<InstructionWithMetadata<InitPreAuthorizationMeta>> {
        let init_params = InitPreAuthorizationParams {
            variant: InitPreAuthorizationVariant::Recurring {
                repeat_frequency_seconds: params.repeat_frequency_seconds,
                recurring_amount_authorized: params.recurring_amount_authorized,
                num_cycles: params.num_cycles,
                reset_every_cycle: params.reset_every_cycle,
            },
            debit_authority: params.debit_authority,
            activation_unix_timestamp: date_to_unix_timestamp(params.activation, true),
        };

        self.build_init_pre_authorization_ix(&params.payer, &params.token_account, init_params)
            .await
    }

    async fn build_update_pause_ix(
        &self,
        pre_authorization: &Address,
        pause: bool,
    ) -> SdkResult<InstructionWithMetadata<UpdatePausePreAuthorizationMeta>> {
        let ProgramAccount { account, .. } = self
            .reader
            .fetch_pre_authorization_or_err(pre_authorization)
            .await?;
        let (token_account_state, _) = self
            .reader
            .fetch_token_account(&account.token_account)
            .await?;

        let instruction = UpdatePausePreAuthorization {
            owner: token_account_state.owner,
            token_account: account.token_account,
            pre_authorization: *pre_authorization,
        }
        .create_instruction(UpdatePausePreAuthorizationInstructionData { pause });

        Ok(InstructionWithMetadata {
            instruction: self.with_program_id(instruction),
            expected_signers: vec![ExpectedSigner::new(
                token_account_state.owner,
                "token account owner",
            )],
            meta: UpdatePausePreAuthorizationMeta {
                pre_authorization: *pre_authorization,
                pause,
            },
        })
    }

    pub async fn build_pause_pre_authorization_ix(
        &self,
        pre_authorization: &Address,
    ) -> SdkResult<InstructionWithMetadata<UpdatePausePreAuthorizationMeta>> {
        self.build_update_pause_ix(pre_authorization, true).await
    }

    pub async fn build_unpause_pre_authorization_ix(
        &self,
        pre_authorization: &Address,
    ) -> SdkResult<InstructionWithMetadata<UpdatePausePreAuthorizationMeta>> {
        self.build_update_pause_ix(pre_authorization, false).await
    }

    /// Closes a pre-authorization as the token account owner. Rent goes to `rent_receiver`,
    /// defaulting to the owner.
    pub async fn build_close_pre_authorization_as_owner_ix(
        &self,
        pre_authorization: &Address,
        rent_receiver: Option<Address>,
    ) -> SdkResult<InstructionWithMetadata<ClosePreAuthorizationMeta>> {
        let ProgramAccount { account, .. } = self
            .reader
            .fetch_pre_authorization_or_err(pre_authorization)
            .await?;
        let (token_account_state, token_program) =
            self.reader.fetch_token_account(&account.token_account).await?;
        let owner = token_account_state.owner;

        Ok(self.close_ix(
            pre_authorization,
            &account,
            (&token_account_state, token_program),
            owner,
            rent_receiver.unwrap_or(owner),
            "token account owner",
        ))
    }

    /// Closes a pre-authorization as its debit authority. Rent always goes back to the token
    /// account owner.
    pub async fn build_close_pre_authorization_as_debit_authority_ix(
        &self,
        pre_authorization: &Address,
    ) -> SdkResult<InstructionWithMetadata<ClosePreAuthorizationMeta>> {
        let ProgramAccount { account, .. } = self
            .reader
            .fetch_pre_authorization_or_err(pre_authorization)
            .await?;
        let (token_account_state, token_program) =
            self.reader.fetch_token_account(&account.token_account).await?;

        Ok(self.close_ix(
            pre_authorization,
            &account,
            (&token_account_state, token_program),
            account.debit_authority,
            token_account_state.owner,
            "debit authority",
        ))
    }

    fn close_ix(
        &self,
        pre_authorization: &Address,
        account: &PreAuthorization,
        (token_account_state, token_program): (&TokenAccount, Address),
        authority: Address,
        receiver: Address,
        reason: &'static str,
    ) -> InstructionWithMetadata<ClosePreAuthorizationMeta> {
        let instruction = ClosePreAuthorization {
            receiver,
            authority,
            token_account: account.token_account,
            pre_authorization: *pre_authorization,
        }
        .create_instruction();

        InstructionWithMetadata {
            instruction: self.with_program_id(instruction),
            expected_signers: vec![ExpectedSigner::new(authority, reason)],
            meta: ClosePreAuthorizationMeta {
                pre_authorization: *pre_authorization,
                receiver,
                token_account: account.token_account,
                token_account_owner: token_account_state.owner,
                token_program,
                is_native: Option::<u64>::from(token_account_state.is_native).is_some(),
            },
        }
    }

    pub async fn build_debit_ix(
        &self,
        params: DebitParams,
    ) -> SdkResult<InstructionWithMetadata<DebitMeta>> {
        let (token_account_state, token_program) =
            self.reader.fetch_token_account(&params.token_account).await?;
        let smart_delegate = self.reader.get_smart_delegate_pda().address;
        if params.check_smart_delegate_enabled {
            check_smart_delegate_enabled(
                &params.token_account,
                &token_account_state,
                &smart_delegate,
                params.amount,
                self.reader.rpc_url(),
            )?;
        }
        let pre_authorization = self
            .reader
            .derive_pre_authorization_pda(&params.token_account, &params.debit_authority)
            .address;
        let destination_token_account = params.destination_token_account.unwrap_or_else(|| {
            get_associated_token_address_with_program_id(
                &params.debit_authority,
                &token_account_state.mint,
                &token_program,
            )
        });

        let instruction = Debit {
            debit_authority: params.debit_authority,
            mint: token_account_state.mint,
            token_account: params.token_account,
            destination_token_account,
            smart_delegate,
            pre_authorization,
            token_program,
        }
        .create_instruction(DebitInstructionData {
            amount: params.amount,
        });

        Ok(InstructionWithMetadata {
            instruction: self.with_program_id(instruction),
            expected_signers: vec![ExpectedSigner::new(params.debit_authority, "debit authority")],
            meta: DebitMeta {
                pre_authorization,
                smart_delegate,
                mint: token_account_state.mint,
                destination_token_account,
                token_program,
            },
        })
    }

    /// Re-approves the smart delegate for `u64::MAX`, e.g. after the owner revoked or replaced
    /// the token account's delegate.
    pub async fn build_approve_smart_delegate_ix(
        &self,
        token_account: &Address,
    ) -> SdkResult<InstructionWithMetadata<ApproveSmartDelegateMeta>> {
        let (token_account_state, token_program) =
            self.reader.fetch_token_account(token_account).await?;
        let smart_delegate = self.reader.get_smart_delegate_pda().address;

        let instruction = approve_smart_delegate_instruction(
            &token_program,
            token_account,
            &token_account_state,
            &smart_delegate,
        )
        .map_err(|e| SdkError::InvalidAccountData {
            rpc: self.reader.rpc_url(),
            address: *token_account,
            reason: e.to_string(),
        })?;

        Ok(InstructionWithMetadata {
            instruction,
            expected_signers: vec![ExpectedSigner::new(
                token_account_state.owner,
                "token account owner",
            )],
            meta: ApproveSmartDelegateMeta { smart_delegate },
        })
    }
}

fn approve_smart_delegate_instruction(
    token_program: &Address,
    token_account: &Address,
    token_account_state: &TokenAccount,
    smart_delegate: &Address,
) -> anyhow::Result<Instruction> {
    Ok(spl_token_2022_interface::instruction::approve(
        token_program,
        token_account,
        smart_delegate,
        &token_account_state.owner,
        &[],
        u64::MAX,
    )?)
}

/// Keeps the first occurrence of each signer, so a payer that is also the owner is listed once.
pub(crate) fn dedup_signers(
    signers: impl IntoIterator<Item = ExpectedSigner>,
) -> Vec<ExpectedSigner> {
    signers.into_iter().unique_by(|s| s.address).collect()
}
