//! See [`process_update_pause_pre_authorization`].

use pad_interface::{
    events::{
        PausePreAuthorizationEventData,
        PreAuthorizationPaused,
        PreAuthorizationUnpaused,
    },
    instructions::UpdatePausePreAuthorizationInstructionData,
};
use pinocchio::{
    account::AccountView,
    ProgramResult,
};

use crate::{
    context::update_pause_pre_authorization_context::UpdatePausePreAuthorizationContext,
    events::emit_event,
};

/// Instruction handler logic for pausing or unpausing a pre-authorization.
///
/// # Safety
///
/// Caller guarantees the safety contract detailed in
/// [`pad_interface::instructions::UpdatePausePreAuthorization`].
#[inline(never)]
pub unsafe fn process_update_pause_pre_authorization<'a>(
    accounts: &'a [AccountView],
    instruction_data: &[u8],
) -> ProgramResult {
    let pause =
        UpdatePausePreAuthorizationInstructionData::unpack_untagged(instruction_data)?.pause;

    // Safety: No account data in `accounts` is currently borrowed.
    let mut ctx = unsafe { UpdatePausePreAuthorizationContext::load(accounts) }?;

    ctx.pre_authorization.state.paused = pause;
    // Safety: No other borrows of the pre-authorization's data are live.
    unsafe { ctx.pre_authorization.store() }?;

    let data = PausePreAuthorizationEventData {
        owner: *ctx.owner.address(),
        token_account: *ctx.token_account.address(),
        pre_authorization: *ctx.pre_authorization.account().address(),
        new_paused_value: pause,
    };
    if pause {
        emit_event(&PreAuthorizationPaused { data });
    } else {
        emit_event(&PreAuthorizationUnpaused { data });
    }

    Ok(())
}
