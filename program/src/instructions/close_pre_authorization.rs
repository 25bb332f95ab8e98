//! See [`process_close_pre_authorization`].

use pad_interface::events::{
    OneTimePreAuthorizationClosed,
    PreAuthorizationClosedEventData,
    RecurringPreAuthorizationClosed,
};
use pinocchio::{
    account::AccountView,
    error::ProgramError,
    ProgramResult,
};

use crate::{
    context::close_pre_authorization_context::ClosePreAuthorizationContext,
    events::emit_event,
};

/// Instruction handler logic for closing a pre-authorization and moving its lamports to the
/// receiver.
///
/// The smart delegate's approval on the token account is left in place, since other
/// pre-authorizations for the same token account may still rely on it.
///
/// # Safety
///
/// Caller guarantees the safety contract detailed in
/// [`pad_interface::instructions::ClosePreAuthorization`].
#[inline(never)]
pub unsafe fn process_close_pre_authorization<'a>(
    accounts: &'a [AccountView],
    _instruction_data: &[u8],
) -> ProgramResult {
    // Safety: No account data in `accounts` is currently borrowed.
    let ctx = unsafe { ClosePreAuthorizationContext::load(accounts) }?;
    let pre_authorization = ctx.pre_authorization.account();

    let data = PreAuthorizationClosedEventData {
        debit_authority: ctx.pre_authorization.state.debit_authority,
        closing_authority: *ctx.authority.address(),
        token_account_owner: ctx.token_account.owner,
        receiver: *ctx.receiver.address(),
        token_account: *ctx.token_account.address(),
        pre_authorization: *pre_authorization.address(),
    };
    if ctx.pre_authorization.state.is_one_time() {
        emit_event(&OneTimePreAuthorizationClosed { data });
    } else {
        emit_event(&RecurringPreAuthorizationClosed { data });
    }

    let receiver_lamports = ctx
        .receiver
        .lamports()
        .checked_add(pre_authorization.lamports())
        .ok_or(ProgramError::ArithmeticOverflow)?;
    ctx.receiver.set_lamports(receiver_lamports);
    pre_authorization.set_lamports(0);

    pre_authorization.close()
}
