//! See [`process_init_pre_authorization`].

use pad_interface::{
    error::PadError,
    events::{
        OneTimePreAuthorizationCreated,
        PreAuthorizationCreatedEventData,
        RecurringPreAuthorizationCreated,
    },
    instructions::{
        InitPreAuthorizationInstructionData,
        InitPreAuthorizationVariant,
    },
    pre_authorization_seeds,
    state::pre_authorization::{
        PreAuthorization,
        PreAuthorizationVariant,
    },
};
use pinocchio::{
    account::AccountView,
    error::ProgramError,
    sysvars::{
        rent::Rent,
        Sysvar,
    },
    Address,
    ProgramResult,
};

use crate::{
    context::init_pre_authorization_context::InitPreAuthorizationContext,
    debug,
    events::emit_event,
    pre_authorization_signer,
    shared::token_utils::approve,
};

/// Instruction handler logic for creating a one-time or recurring pre-authorization and approving
/// the smart delegate on the token account.
///
/// # Safety
///
/// Caller guarantees the safety contract detailed in
/// [`pad_interface::instructions::InitPreAuthorization`].
#[inline(never)]
pub unsafe fn process_init_pre_authorization<'a>(
    accounts: &'a [AccountView],
    instruction_data: &[u8],
) -> ProgramResult {
    let params = InitPreAuthorizationInstructionData::unpack_untagged(instruction_data)?.params;

    // Safety: No account data in `accounts` is currently borrowed.
    let ctx = unsafe { InitPreAuthorizationContext::load(accounts) }?;

    let variant = match params.variant {
        InitPreAuthorizationVariant::OneTime {
            amount_authorized,
            expiry_unix_timestamp,
        } => {
            if expiry_unix_timestamp <= params.activation_unix_timestamp {
                return Err(PadError::InvalidTimestamp.into());
            }
            PreAuthorizationVariant::OneTime {
                amount_authorized,
                expiry_unix_timestamp,
                amount_debited: 0,
            }
        }
        InitPreAuthorizationVariant::Recurring {
            repeat_frequency_seconds,
            recurring_amount_authorized,
            num_cycles,
            reset_every_cycle,
        } => {
            if repeat_frequency_seconds == 0 {
                return Err(PadError::InvalidTimestamp.into());
            }
            PreAuthorizationVariant::Recurring {
                repeat_frequency_seconds,
                recurring_amount_authorized,
                amount_debited_last_cycle: 0,
                amount_debited_total: 0,
                last_debited_cycle: 1,
                num_cycles,
                reset_every_cycle,
            }
        }
    };

    let token_account = ctx.token_account.address();
    // It's not necessary to check the returned PDA here because `CreateAccount` will fail if the
    // pre-authorization account's address doesn't match.
    let (pda, bump) = Address::try_find_program_address(
        pre_authorization_seeds!(token_account, params.debit_authority),
        &crate::ID,
    )
    .ok_or(ProgramError::InvalidSeeds)?;

    let lamports_required = Rent::get()?.try_minimum_balance(PreAuthorization::LEN)?;

    pinocchio_system::instructions::CreateAccount {
        from: ctx.payer,             // WRITE
        to: ctx.pre_authorization,   // WRITE
        lamports: lamports_required,
        space: PreAuthorization::LEN as u64,
        owner: &crate::ID,
    }
    .invoke_signed(&[pre_authorization_signer!(
        token_account,
        params.debit_authority,
        bump
    )])?;

    let pre_authorization = PreAuthorization {
        bump,
        paused: false,
        token_account: *token_account,
        variant,
        debit_authority: params.debit_authority,
        activation_unix_timestamp: params.activation_unix_timestamp,
    };
    // Safety: Scoped mutable borrow of the newly created pre-authorization's data.
    pre_authorization.pack_into(unsafe { ctx.pre_authorization.borrow_unchecked_mut() })?;

    approve(
        &ctx.token_account.token_program,
        ctx.token_account.account,    // WRITE
        ctx.smart_delegate.account(), // READ
        ctx.owner,                    // READ
        u64::MAX,
    )?;

    let data = PreAuthorizationCreatedEventData {
        debit_authority: params.debit_authority,
        owner: *ctx.owner.address(),
        payer: *ctx.payer.address(),
        token_account: *token_account,
        pre_authorization: pda,
        init_params: params,
    };
    if pre_authorization.is_one_time() {
        debug!("created one-time pre-authorization");
        emit_event(&OneTimePreAuthorizationCreated { data });
    } else {
        debug!("created recurring pre-authorization");
        emit_event(&RecurringPreAuthorizationCreated { data });
    }

    Ok(())
}
