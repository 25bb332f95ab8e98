//! See [`process_debit`].

use pad_interface::{
    cycles::apply_debit,
    events::DebitEvent,
    instructions::DebitInstructionData,
};
use pinocchio::{
    account::AccountView,
    sysvars::{
        clock::Clock,
        Sysvar,
    },
    ProgramResult,
};

use crate::{
    context::debit_context::DebitContext,
    debug,
    events::emit_event,
    shared::token_utils::transfer_checked_signed,
    smart_delegate_signer,
};

/// Instruction handler logic for debiting a pre-authorized token account.
///
/// The pre-authorization's accounting is updated and stored before the transfer, so a failed
/// transfer rolls back both together.
///
/// # Safety
///
/// Caller guarantees the safety contract detailed in [`pad_interface::instructions::Debit`].
#[inline(never)]
pub unsafe fn process_debit<'a>(
    accounts: &'a [AccountView],
    instruction_data: &[u8],
) -> ProgramResult {
    let amount = DebitInstructionData::unpack_untagged(instruction_data)?.amount;

    // Safety: No account data in `accounts` is currently borrowed.
    let mut ctx = unsafe { DebitContext::load(accounts) }?;

    let now = Clock::get()?.unix_timestamp;
    let debit_variant = apply_debit(&mut ctx.pre_authorization.state, amount, now)?;
    debug!("debit amount: {}", amount);

    // Safety: No other borrows of the pre-authorization's data are live.
    unsafe { ctx.pre_authorization.store() }?;

    transfer_checked_signed(
        ctx.token_program.address(),
        ctx.token_account.account,             // WRITE
        ctx.mint.account,                      // READ
        ctx.destination_token_account.account, // WRITE
        ctx.smart_delegate.account(),          // READ
        amount,
        ctx.mint.decimals,
        smart_delegate_signer!(ctx.smart_delegate.bump),
    )?;

    emit_event(&DebitEvent {
        pre_authorization: *ctx.pre_authorization.account().address(),
        debit_authority: *ctx.debit_authority.address(),
        smart_delegate: *ctx.smart_delegate.account().address(),
        mint: *ctx.mint.account.address(),
        token_program: *ctx.token_program.address(),
        source_token_account_owner: ctx.token_account.owner,
        destination_token_account_owner: ctx.destination_token_account.owner,
        source_token_account: *ctx.token_account.address(),
        destination_token_account: *ctx.destination_token_account.address(),
        debit_variant,
    });

    Ok(())
}
