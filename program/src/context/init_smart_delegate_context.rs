//! See [`InitSmartDelegateContext`].

use pinocchio::{
    account::AccountView,
    error::ProgramError,
};

use crate::context::check_signer;

/// The account context for the [`pad_interface::instructions::InitSmartDelegate`] instruction.
#[derive(Clone)]
pub struct InitSmartDelegateContext<'a> {
    pub payer: &'a AccountView,
    pub smart_delegate: &'a AccountView,
}

impl<'a> InitSmartDelegateContext<'a> {
    /// # Safety
    ///
    /// Caller guarantees:
    /// - WRITE accounts are not currently borrowed in *any* capacity.
    /// - READ accounts are not currently mutably borrowed.
    pub unsafe fn load(
        accounts: &'a [AccountView],
    ) -> Result<InitSmartDelegateContext<'a>, ProgramError> {
        let [payer, smart_delegate, system_program, ..] = accounts else {
            return Err(ProgramError::NotEnoughAccountKeys);
        };

        check_signer(payer)?;
        if system_program.address() != &pinocchio_system::ID {
            return Err(ProgramError::IncorrectProgramId);
        }

        // The smart delegate's address is checked against its PDA by the handler, and
        // `CreateAccount` fails if it's already initialized.
        Ok(Self {
            payer,
            smart_delegate,
        })
    }
}
