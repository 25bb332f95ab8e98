//! Wraps built instructions into transactions with optional setup and cleanup steps, and
//! simulates or executes them.

use solana_address::Address;
use solana_client::rpc_config::RpcSimulateTransactionConfig;
use solana_instruction::Instruction;
use solana_sdk::{
    message::{
        v0,
        VersionedMessage,
    },
    signature::{
        Keypair,
        Signature,
        Signer,
    },
    transaction::VersionedTransaction,
};
use solana_transaction_error::TransactionError;
use spl_associated_token_account_interface::{
    address::get_associated_token_address_with_program_id,
    instruction::create_associated_token_account_idempotent,
};
use transaction_parser::events::PadEvent;

use crate::{
    errors::{
        SdkError,
        SdkResult,
    },
    instruction_factory::{
        ApproveSmartDelegateMeta,
        ClosePreAuthorizationMeta,
        DebitMeta,
        DebitParams,
        dedup_signers,
        ExpectedSigner,
        InitOneTimePreAuthorizationParams,
        InitPreAuthorizationMeta,
        InitRecurringPreAuthorizationParams,
        InitSmartDelegateMeta,
        InstructionFactory,
        InstructionWithMetadata,
        UpdatePausePreAuthorizationMeta,
    },
    read_client::{
        decode_events,
        PreAuthorizedDebitReadClient,
    },
};

#[derive(Clone, Debug)]
pub struct TransactionWithMetadata<T> {
    pub setup: Vec<Instruction>,
    pub core: Vec<Instruction>,
    pub cleanup: Vec<Instruction>,
    pub expected_signers: Vec<ExpectedSigner>,
    pub meta: T,
}

/// The outcome of a simulated transaction.
#[derive(Debug)]
pub struct SimulationResult {
    pub err: Option<TransactionError>,
    pub logs: Vec<String>,
    pub units_consumed: Option<u64>,
    pub events: Vec<PadEvent>,
}

impl<T> From<InstructionWithMetadata<T>> for TransactionWithMetadata<T> {
    fn from(ix: InstructionWithMetadata<T>) -> Self {
        Self {
            setup: vec![],
            core: vec![ix.instruction],
            cleanup: vec![],
            expected_signers: ix.expected_signers,
            meta: ix.meta,
        }
    }
}

impl<T> TransactionWithMetadata<T> {
    /// Setup, core and cleanup instructions, in that order.
    pub fn instructions(&self) -> Vec<Instruction> {
        [
            self.setup.as_slice(),
            self.core.as_slice(),
            self.cleanup.as_slice(),
        ]
        .concat()
    }

    /// The explicit fee payer, or else the first expected signer.
    pub fn resolve_fee_payer(
        &self,
        fee_payer: Option<Address>,
        rpc_url: impl FnOnce() -> String,
    ) -> SdkResult<Address> {
        fee_payer
            .or_else(|| self.expected_signers.first().map(|signer| signer.address))
            .ok_or_else(|| SdkError::TransactionFeesPayerNotProvided { rpc: rpc_url() })
    }

    /// Compiles a v0 transaction with the latest blockhash and signs it with `signers`.
    ///
    /// The fee payer is `fee_payer` if provided, otherwise the first of `signers`.
    pub async fn build_versioned_transaction(
        &self,
        reader: &PreAuthorizedDebitReadClient,
        signers: &[&Keypair],
        fee_payer: Option<&Keypair>,
    ) -> SdkResult<VersionedTransaction> {
        let payer = fee_payer
            .or_else(|| signers.first().copied())
            .ok_or_else(|| SdkError::TransactionFeesPayerNotProvided {
                rpc: reader.rpc_url(),
            })?;
        let blockhash = reader
            .rpc()
            .get_latest_blockhash()
            .await
            .map_err(|e| reader.rpc_error(e))?;
        let build_err = |reason: String| SdkError::TransactionBuild {
            rpc: reader.rpc_url(),
            reason,
        };

        let message =
            v0::Message::try_compile(&payer.pubkey(), &self.instructions(), &[], blockhash)
                .map_err(|e| build_err(e.to_string()))?;
        let mut all_signers: Vec<&Keypair> = vec![payer];
        all_signers.extend(
            signers
                .iter()
                .copied()
                .filter(|s| s.pubkey() != payer.pubkey()),
        );

        VersionedTransaction::try_new(VersionedMessage::V0(message), &all_signers)
            .map_err(|e| build_err(e.to_string()))
    }

    /// Simulates the transaction without signatures, paid for by `fee_payer` or the first
    /// expected signer.
    pub async fn simulate(
        &self,
        reader: &PreAuthorizedDebitReadClient,
        fee_payer: Option<Address>,
    ) -> SdkResult<SimulationResult> {
        let payer = self.resolve_fee_payer(fee_payer, || reader.rpc_url())?;
        let message = v0::Message::try_compile(
            &payer,
            &self.instructions(),
            &[],
            solana_sdk::hash::Hash::default(),
        )
        .map_err(|e| SdkError::TransactionBuild {
            rpc: reader.rpc_url(),
            reason: e.to_string(),
        })?;
        let num_signatures = usize::from(message.header.num_required_signatures);
        let transaction = VersionedTransaction {
            signatures: vec![Signature::default(); num_signatures],
            message: VersionedMessage::V0(message),
        };

        let response = reader
            .rpc()
            .simulate_transaction_with_config(
                &transaction,
                RpcSimulateTransactionConfig {
                    sig_verify: false,
                    replace_recent_blockhash: true,
                    commitment: Some(reader.rpc().commitment()),
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| reader.rpc_error(e))?;

        let logs = response.value.logs.unwrap_or_default();
        let events = decode_events(&logs, reader.program_id(), reader.rpc_url())?;

        Ok(SimulationResult {
            err: response.value.err.map(TransactionError::from),
            logs,
            units_consumed: response.value.units_consumed,
            events,
        })
    }

    /// Signs, sends and confirms the transaction.
    pub async fn execute(
        &self,
        reader: &PreAuthorizedDebitReadClient,
        signers: &[&Keypair],
        fee_payer: Option<&Keypair>,
    ) -> SdkResult<Signature> {
        let transaction = self
            .build_versioned_transaction(reader, signers, fee_payer)
            .await?;

        reader
            .rpc()
            .send_and_confirm_transaction(&transaction)
            .await
            .map_err(|e| reader.rpc_error(e))
    }
}

/// Funds a wrapped SOL token account before the core instructions and syncs its token amount.
/// Ignored when the token account's mint isn't the native mint.
#[derive(Clone, Copy, Debug)]
pub struct WrapNativeMintParams {
    /// Must sign the transaction. Defaults to the token account owner.
    pub lamports_source: Option<Address>,
    pub wrap_lamports_amount: u64,
}

/// Closes a wrapped SOL token account after the core instructions, releasing its lamports.
/// Ignored when the token account doesn't hold wrapped SOL.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnwrapNativeMintParams {
    /// Defaults to the token account owner.
    pub lamports_destination: Option<Address>,
}

/// Options for the transaction around a debit.
#[derive(Clone, Copy, Debug, Default)]
pub struct DebitTransactionOptions {
    /// Creates the destination associated token account if it doesn't exist yet. Only applies
    /// when the destination defaults to the debit authority's ATA.
    pub create_destination_ata: bool,
    /// Closes the destination after the debit when it is the debit authority's wrapped SOL ATA.
    /// A destination owned by anyone else is left untouched.
    pub unwrap_native_mint: Option<UnwrapNativeMintParams>,
}

#[derive(Clone)]
pub struct TransactionFactory {
    instructions: InstructionFactory,
}

impl TransactionFactory {
    pub fn new(reader: PreAuthorizedDebitReadClient) -> Self {
        Self {
            instructions: InstructionFactory::new(reader),
        }
    }

    pub fn reader(&self) -> &PreAuthorizedDebitReadClient {
        self.instructions.reader()
    }

    pub fn instructions(&self) -> &InstructionFactory {
        &self.instructions
    }

    pub fn build_init_smart_delegate_tx(
        &self,
        payer: &Address,
    ) -> TransactionWithMetadata<InitSmartDelegateMeta> {
        self.instructions.build_init_smart_delegate_ix(payer).into()
    }

    pub async fn build_init_one_time_pre_authorization_tx(
        &self,
        params: InitOneTimePreAuthorizationParams,
        wrap_native_mint: Option<WrapNativeMintParams>,
    ) -> SdkResult<TransactionWithMetadata<InitPreAuthorizationMeta>> {
        let ix = self
            .instructions
            .build_init_one_time_pre_authorization_ix(params)
            .await?;
        with_wrap_native_mint(ix.into(), wrap_native_mint, || self.reader().rpc_url())
    }

    pub async fn build_init_recurring_pre_authorization_tx(
        &self,
        params: InitRecurringPreAuthorizationParams,
        wrap_native_mint: Option<WrapNativeMintParams>,
    ) -> SdkResult<TransactionWithMetadata<InitPreAuthorizationMeta>> {
        let ix = self
            .instructions
            .build_init_recurring_pre_authorization_ix(params)
            .await?;
        with_wrap_native_mint(ix.into(), wrap_native_mint, || self.reader().rpc_url())
    }

    pub async fn build_pause_pre_authorization_tx(
        &self,
        pre_authorization: &Address,
    ) -> SdkResult<TransactionWithMetadata<UpdatePausePreAuthorizationMeta>> {
        Ok(self
            .instructions
            .build_pause_pre_authorization_ix(pre_authorization)
            .await?
            .into())
    }

    pub async fn build_unpause_pre_authorization_tx(
        &self,
        pre_authorization: &Address,
    ) -> SdkResult<TransactionWithMetadata<UpdatePausePreAuthorizationMeta>> {
        Ok(self
            .instructions
            .build_unpause_pre_authorization_ix(pre_authorization)
            .await?
            .into())
    }

    /// Closes the pre-authorization as the token account owner. With `unwrap_native_mint`, a
    /// wrapped SOL token account is closed as well.
    pub async fn build_close_pre_authorization_as_owner_tx(
        &self,
        pre_authorization: &Address,
        rent_receiver: Option<Address>,
        unwrap_native_mint: Option<UnwrapNativeMintParams>,
    ) -> SdkResult<TransactionWithMetadata<ClosePreAuthorizationMeta>> {
        let ix = self
            .instructions
            .build_close_pre_authorization_as_owner_ix(pre_authorization, rent_receiver)
            .await?;
        let mut tx = TransactionWithMetadata::from(ix);
        let ClosePreAuthorizationMeta {
            token_account,
            token_account_owner,
            token_program,
            is_native,
            ..
        } = tx.meta;

        if let Some(unwrap) = unwrap_native_mint.filter(|_| is_native) {
            let close = unwrap_native_mint_instruction(
                &token_program,
                &token_account,
                &token_account_owner,
                &unwrap.lamports_destination.unwrap_or(token_account_owner),
            )
            .map_err(|e| self.build_error(e))?;
            tx.cleanup.push(close);
        }

        Ok(tx)
    }

    pub async fn build_close_pre_authorization_as_debit_authority_tx(
        &self,
        pre_authorization: &Address,
    ) -> SdkResult<TransactionWithMetadata<ClosePreAuthorizationMeta>> {
        Ok(self
            .instructions
            .build_close_pre_authorization_as_debit_authority_ix(pre_authorization)
            .await?
            .into())
    }

    pub async fn build_approve_smart_delegate_tx(
        &self,
        token_account: &Address,
    ) -> SdkResult<TransactionWithMetadata<ApproveSmartDelegateMeta>> {
        Ok(self
            .instructions
            .build_approve_smart_delegate_ix(token_account)
            .await?
            .into())
    }

    pub async fn build_debit_tx(
        &self,
        params: DebitParams,
        options: DebitTransactionOptions,
    ) -> SdkResult<TransactionWithMetadata<DebitMeta>> {
        let ix = self.instructions.build_debit_ix(params).await?;
        let mut tx = TransactionWithMetadata::from(ix);
        let DebitMeta {
            mint,
            token_program,
            ..
        } = tx.meta;

        if options.create_destination_ata && params.destination_token_account.is_none() {
            tx.setup.push(create_associated_token_account_idempotent(
                &params.debit_authority,
                &params.debit_authority,
                &mint,
                &token_program,
            ));
        }

        if let Some(unwrap) = options.unwrap_native_mint {
            let close = unwrap_debited_native_mint(&params.debit_authority, &tx.meta, unwrap)
                .map_err(|e| self.build_error(e))?;
            tx.cleanup.extend(close);
        }

        Ok(tx)
    }

    fn build_error(&self, e: anyhow::Error) -> SdkError {
        SdkError::TransactionBuild {
            rpc: self.reader().rpc_url(),
            reason: format!("{e:#}"),
        }
    }
}

/// Prepends the wrap instructions to an init transaction when its token account holds the native
/// mint, and adds the lamports source to the expected signers.
fn with_wrap_native_mint(
    mut tx: TransactionWithMetadata<InitPreAuthorizationMeta>,
    wrap: Option<WrapNativeMintParams>,
    rpc: impl FnOnce() -> String,
) -> SdkResult<TransactionWithMetadata<InitPreAuthorizationMeta>> {
    let Some(wrap) = wrap.filter(|_| is_native_mint(&tx.meta.mint)) else {
        return Ok(tx);
    };
    let InitPreAuthorizationMeta {
        token_account,
        token_account_owner,
        token_program,
        ..
    } = tx.meta;
    let source = wrap.lamports_source.unwrap_or(token_account_owner);

    let instructions = wrap_native_mint_instructions(
        &token_program,
        &token_account,
        &source,
        wrap.wrap_lamports_amount,
    )
    .map_err(|e| SdkError::TransactionBuild {
        rpc: rpc(),
        reason: format!("{e:#}"),
    })?;
    tx.setup.extend(instructions);
    tx.expected_signers = dedup_signers(
        tx.expected_signers
            .into_iter()
            .chain([ExpectedSigner::new(source, "lamports source")]),
    );

    Ok(tx)
}

/// Closes the debit destination when it is the debit authority's wrapped SOL ATA.
fn unwrap_debited_native_mint(
    debit_authority: &Address,
    meta: &DebitMeta,
    unwrap: UnwrapNativeMintParams,
) -> anyhow::Result<Option<Instruction>> {
    let ata = get_associated_token_address_with_program_id(
        debit_authority,
        &meta.mint,
        &meta.token_program,
    );
    if !is_native_mint(&meta.mint) || meta.destination_token_account != ata {
        return Ok(None);
    }

    unwrap_native_mint_instruction(
        &meta.token_program,
        &ata,
        debit_authority,
        &unwrap.lamports_destination.unwrap_or(*debit_authority),
    )
    .map(Some)
}

/// Transfers `lamports` into a wrapped SOL token account and syncs its token amount.
pub fn wrap_native_mint_instructions(
    token_program: &Address,
    token_account: &Address,
    lamports_source: &Address,
    lamports: u64,
) -> anyhow::Result<[Instruction; 2]> {
    Ok([
        solana_system_interface::instruction::transfer(lamports_source, token_account, lamports),
        spl_token_2022_interface::instruction::sync_native(token_program, token_account)?,
    ])
}

/// Closes a wrapped SOL token account owned by `owner`, sending its lamports to
/// `lamports_destination`.
pub fn unwrap_native_mint_instruction(
    token_program: &Address,
    token_account: &Address,
    owner: &Address,
    lamports_destination: &Address,
) -> anyhow::Result<Instruction> {
    Ok(spl_token_2022_interface::instruction::close_account(
        token_program,
        token_account,
        lamports_destination,
        owner,
        &[],
    )?)
}

pub fn is_native_mint(mint: &Address) -> bool {
    mint == &spl_token_interface::native_mint::ID
        || mint == &spl_token_2022_interface::native_mint::ID
}

#[cfg(test)]
mod tests {
    use mollusk_svm::result::Check;

    use super::*;
    use crate::mollusk_helpers::{
        get_token_account,
        native_token_account,
        new_token_mollusk_context,
        system_account,
    };

    fn ix(byte: u8) -> Instruction {
        Instruction {
            program_id: pad_interface::program::ID,
            accounts: vec![],
            data: vec![byte],
        }
    }

    #[test]
    fn instructions_are_ordered() {
        let tx = TransactionWithMetadata {
            setup: vec![ix(0)],
            core: vec![ix(1), ix(2)],
            cleanup: vec![ix(3)],
            expected_signers: vec![],
            meta: (),
        };
        let data = tx
            .instructions()
            .into_iter()
            .map(|ix| ix.data[0])
            .collect::<Vec<_>>();
        assert_eq!(data, vec![0, 1, 2, 3]);
    }

    #[test]
    fn fee_payer_falls_back_to_first_signer() {
        let debit_authority = Address::new_from_array([7; 32]);
        let explicit = Address::new_from_array([8; 32]);
        let tx = TransactionWithMetadata::from(InstructionWithMetadata {
            instruction: ix(0),
            expected_signers: vec![ExpectedSigner::new(debit_authority, "debit authority")],
            meta: (),
        });
        let rpc = || "http://localhost:8899".to_string();

        assert_eq!(tx.resolve_fee_payer(None, rpc).unwrap(), debit_authority);
        assert_eq!(tx.resolve_fee_payer(Some(explicit), rpc).unwrap(), explicit);

        let no_signers = TransactionWithMetadata {
            expected_signers: vec![],
            ..tx
        };
        assert!(matches!(
            no_signers.resolve_fee_payer(None, rpc),
            Err(SdkError::TransactionFeesPayerNotProvided { .. })
        ));
    }

    fn init_tx(mint: Address) -> TransactionWithMetadata<InitPreAuthorizationMeta> {
        let owner = Address::new_from_array([2; 32]);
        TransactionWithMetadata::from(InstructionWithMetadata {
            instruction: ix(0),
            expected_signers: vec![ExpectedSigner::new(owner, "token account owner")],
            meta: InitPreAuthorizationMeta {
                pre_authorization: Address::new_from_array([1; 32]),
                smart_delegate: Address::new_from_array([3; 32]),
                token_account: Address::new_from_array([4; 32]),
                token_account_owner: owner,
                mint,
                token_program: spl_token_interface::ID,
            },
        })
    }

    #[test]
    fn init_wraps_only_the_native_mint() {
        let rpc = || "http://localhost:8899".to_string();
        let wrap = WrapNativeMintParams {
            lamports_source: None,
            wrap_lamports_amount: 5_000,
        };

        let tx = with_wrap_native_mint(init_tx(Address::new_from_array([9; 32])), Some(wrap), rpc)
            .unwrap();
        assert!(tx.setup.is_empty());

        let tx = with_wrap_native_mint(init_tx(spl_token_interface::native_mint::ID), None, rpc)
            .unwrap();
        assert!(tx.setup.is_empty());

        // The owner funds the account by default and already signs.
        let native = spl_token_interface::native_mint::ID;
        let tx = with_wrap_native_mint(init_tx(native), Some(wrap), rpc).unwrap();
        let [transfer, sync] = tx.setup.as_slice() else {
            panic!("expected a transfer and a sync, got {:?}", tx.setup);
        };
        assert_eq!(transfer.program_id, pad_interface::utils::SYSTEM_PROGRAM_ID);
        assert_eq!(transfer.accounts[0].pubkey, tx.meta.token_account_owner);
        assert_eq!(transfer.accounts[1].pubkey, tx.meta.token_account);
        assert_eq!(sync.program_id, spl_token_interface::ID);
        assert_eq!(sync.accounts[0].pubkey, tx.meta.token_account);
        assert_eq!(tx.expected_signers.len(), 1);
        assert_eq!(tx.instructions().len(), 3);

        let funder = Address::new_from_array([8; 32]);
        let tx = with_wrap_native_mint(
            init_tx(native),
            Some(WrapNativeMintParams {
                lamports_source: Some(funder),
                ..wrap
            }),
            rpc,
        )
        .unwrap();
        assert_eq!(tx.setup[0].accounts[0].pubkey, funder);
        assert_eq!(
            tx.expected_signers.last(),
            Some(&ExpectedSigner::new(funder, "lamports source"))
        );
    }

    #[test]
    fn debit_unwraps_only_the_debit_authority_ata() {
        let debit_authority = Address::new_from_array([5; 32]);
        let token_program = spl_token_interface::ID;
        let native_mint = spl_token_interface::native_mint::ID;
        let ata = get_associated_token_address_with_program_id(
            &debit_authority,
            &native_mint,
            &token_program,
        );
        let meta = DebitMeta {
            pre_authorization: Address::new_from_array([1; 32]),
            smart_delegate: Address::new_from_array([2; 32]),
            mint: native_mint,
            destination_token_account: ata,
            token_program,
        };

        let close = unwrap_debited_native_mint(&debit_authority, &meta, Default::default())
            .unwrap()
            .unwrap();
        assert_eq!(close.program_id, token_program);
        assert_eq!(close.accounts[0].pubkey, ata);
        assert_eq!(close.accounts[1].pubkey, debit_authority);
        assert_eq!(close.accounts[2].pubkey, debit_authority);
        assert!(close.accounts[2].is_signer);

        let treasury = Address::new_from_array([6; 32]);
        let close = unwrap_debited_native_mint(
            &debit_authority,
            &meta,
            UnwrapNativeMintParams {
                lamports_destination: Some(treasury),
            },
        )
        .unwrap()
        .unwrap();
        assert_eq!(close.accounts[1].pubkey, treasury);

        // A destination the debit authority doesn't own can't be closed by it.
        let elsewhere = DebitMeta {
            destination_token_account: Address::new_from_array([7; 32]),
            ..meta
        };
        assert!(unwrap_debited_native_mint(&debit_authority, &elsewhere, Default::default())
            .unwrap()
            .is_none());

        let mint = Address::new_from_array([8; 32]);
        let not_native = DebitMeta {
            mint,
            destination_token_account: get_associated_token_address_with_program_id(
                &debit_authority,
                &mint,
                &token_program,
            ),
            ..meta
        };
        assert!(unwrap_debited_native_mint(&debit_authority, &not_native, Default::default())
            .unwrap()
            .is_none());
    }

    #[test]
    fn wrap_then_unwrap_on_the_token_program() {
        let owner = Address::new_unique();
        let treasury = Address::new_unique();
        let token_account = Address::new_unique();
        let token_program = spl_token_interface::ID;
        let context = new_token_mollusk_context(vec![
            (owner, system_account(1_000_000_000)),
            (treasury, system_account(0)),
            (token_account, native_token_account(&owner, 0, &token_program)),
        ]);
        let reserve = context.account_store.borrow()[&token_account].lamports;

        for ix in wrap_native_mint_instructions(&token_program, &token_account, &owner, 250_000)
            .unwrap()
        {
            context.process_and_validate_instruction(&ix, &[Check::success()]);
        }
        assert_eq!(get_token_account(&context, &token_account).unwrap().amount, 250_000);

        let close =
            unwrap_native_mint_instruction(&token_program, &token_account, &owner, &treasury)
                .unwrap();
        context.process_and_validate_instruction(&close, &[Check::success()]);
        assert_eq!(
            context.account_store.borrow()[&treasury].lamports,
            reserve + 250_000
        );
    }

    #[test]
    fn native_mints() {
        assert!(is_native_mint(&spl_token_interface::native_mint::ID));
        assert!(is_native_mint(&spl_token_2022_interface::native_mint::ID));
        assert!(!is_native_mint(&Address::new_from_array([1; 32])));
    }
}
