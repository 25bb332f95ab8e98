//! Account context definitions for each instruction.
//!
//! Each context groups and validates the accounts required by its corresponding instruction before
//! execution.

pub mod close_pre_authorization_context;
pub mod debit_context;
pub mod init_pre_authorization_context;
pub mod init_smart_delegate_context;
pub mod update_pause_pre_authorization_context;

use pinocchio::{
    account::AccountView,
    error::ProgramError,
};

#[inline(always)]
pub(crate) fn check_signer(account: &AccountView) -> Result<(), ProgramError> {
    if !account.is_signer() {
        return Err(ProgramError::MissingRequiredSignature);
    }
    Ok(())
}
