//! See [`process_init_smart_delegate`].

use pad_interface::{
    events::SmartDelegateInitialized,
    smart_delegate_seeds,
    state::smart_delegate::SmartDelegate,
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
    context::init_smart_delegate_context::InitSmartDelegateContext,
    events::emit_event,
    smart_delegate_signer,
};

/// Instruction handler logic for creating the program-wide smart delegate PDA.
///
/// # Safety
///
/// Caller guarantees the safety contract detailed in
/// [`pad_interface::instructions::InitSmartDelegate`].
#[inline(never)]
pub unsafe fn process_init_smart_delegate<'a>(
    accounts: &'a [AccountView],
    _instruction_data: &[u8],
) -> ProgramResult {
    // Safety: No account data in `accounts` is currently borrowed.
    let ctx = unsafe { InitSmartDelegateContext::load(accounts) }?;

    let (pda, bump) = Address::try_find_program_address(smart_delegate_seeds!(), &crate::ID)
        .ok_or(ProgramError::InvalidSeeds)?;
    if ctx.smart_delegate.address() != &pda {
        return Err(ProgramError::InvalidSeeds);
    }

    let lamports_required = Rent::get()?.try_minimum_balance(SmartDelegate::LEN)?;

    pinocchio_system::instructions::CreateAccount {
        from: ctx.payer,        // WRITE
        to: ctx.smart_delegate, // WRITE
        lamports: lamports_required,
        space: SmartDelegate::LEN as u64,
        owner: &crate::ID,
    }
    .invoke_signed(&[smart_delegate_signer!(bump)])?;

    // Safety: Scoped mutable borrow of the newly created smart delegate's data.
    SmartDelegate { bump }.pack_into(unsafe { ctx.smart_delegate.borrow_unchecked_mut() })?;

    emit_event(&SmartDelegateInitialized {
        payer: *ctx.payer.address(),
        smart_delegate: pda,
    });

    Ok(())
}
