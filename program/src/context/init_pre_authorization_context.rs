//! See [`InitPreAuthorizationContext`].

use pad_interface::error::PadError;
use pinocchio::{
    account::AccountView,
    error::ProgramError,
};

use crate::{
    context::check_signer,
    validation::{
        smart_delegate_view::SmartDelegateView,
        token_account_view::TokenAccountView,
    },
};

/// The account context for the [`pad_interface::instructions::InitPreAuthorization`] instruction,
/// ensuring the owner signed and that the smart delegate and token account are valid.
#[derive(Clone)]
pub struct InitPreAuthorizationContext<'a> {
    pub payer: &'a AccountView,
    pub owner: &'a AccountView,
    pub smart_delegate: SmartDelegateView<'a>,
    pub token_account: TokenAccountView<'a>,
    pub pre_authorization: &'a AccountView,
}

impl<'a> InitPreAuthorizationContext<'a> {
    /// # Safety
    ///
    /// Caller guarantees:
    /// - WRITE accounts are not currently borrowed in *any* capacity.
    /// - READ accounts are not currently mutably borrowed.
    pub unsafe fn load(
        accounts: &'a [AccountView],
    ) -> Result<InitPreAuthorizationContext<'a>, ProgramError> {
        let [payer, owner, smart_delegate, token_account, pre_authorization, token_program, system_program, ..] =
            accounts
        else {
            return Err(ProgramError::NotEnoughAccountKeys);
        };

        check_signer(payer)?;
        check_signer(owner)?;
        if system_program.address() != &pinocchio_system::ID {
            return Err(ProgramError::IncorrectProgramId);
        }

        // Safety: Scoped borrows of the smart delegate and token account data.
        let (smart_delegate, token_account) = unsafe {
            (
                SmartDelegateView::new(smart_delegate)?,
                TokenAccountView::new(token_account)?,
            )
        };

        if &token_account.token_program != token_program.address() {
            return Err(ProgramError::IncorrectProgramId);
        }
        if &token_account.owner != owner.address() {
            return Err(PadError::InitPreAuthorizationUnauthorized.into());
        }

        Ok(Self {
            payer,
            owner,
            smart_delegate,
            token_account,
            pre_authorization,
        })
    }
}
