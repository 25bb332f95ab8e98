//! See [`UpdatePausePreAuthorizationContext`].

use pad_interface::error::PadError;
use pinocchio::{
    account::AccountView,
    error::ProgramError,
};

use crate::{
    context::check_signer,
    validation::{
        pre_authorization_view::PreAuthorizationView,
        token_account_view::TokenAccountView,
    },
};

/// The account context for the [`pad_interface::instructions::UpdatePausePreAuthorization`]
/// instruction, ensuring only the token account owner can pause or unpause.
#[derive(Clone)]
pub struct UpdatePausePreAuthorizationContext<'a> {
    pub owner: &'a AccountView,
    pub token_account: TokenAccountView<'a>,
    pub pre_authorization: PreAuthorizationView<'a>,
}

impl<'a> UpdatePausePreAuthorizationContext<'a> {
    /// # Safety
    ///
    /// Caller guarantees:
    /// - WRITE accounts are not currently borrowed in *any* capacity.
    /// - READ accounts are not currently mutably borrowed.
    pub unsafe fn load(
        accounts: &'a [AccountView],
    ) -> Result<UpdatePausePreAuthorizationContext<'a>, ProgramError> {
        let [owner, token_account, pre_authorization, ..] = accounts else {
            return Err(ProgramError::NotEnoughAccountKeys);
        };

        check_signer(owner)?;

        // Safety: Scoped borrows of the token account and pre-authorization data.
        let (token_account, pre_authorization) = unsafe {
            (
                TokenAccountView::new(token_account)?,
                PreAuthorizationView::new(pre_authorization)?,
            )
        };

        if &token_account.owner != owner.address() {
            return Err(PadError::PausePreAuthorizationUnauthorized.into());
        }
        if &pre_authorization.state.token_account != token_account.address() {
            return Err(PadError::PreAuthorizationTokenAccountMismatch.into());
        }

        Ok(Self {
            owner,
            token_account,
            pre_authorization,
        })
    }
}
