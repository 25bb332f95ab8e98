//! See [`ClosePreAuthorizationContext`].

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

/// The account context for the [`pad_interface::instructions::ClosePreAuthorization`]
/// instruction.
///
/// Either the token account owner or the debit authority may close a pre-authorization. Only the
/// owner may send the reclaimed rent somewhere other than back to the owner.
#[derive(Clone)]
pub struct ClosePreAuthorizationContext<'a> {
    pub receiver: &'a AccountView,
    pub authority: &'a AccountView,
    pub token_account: TokenAccountView<'a>,
    pub pre_authorization: PreAuthorizationView<'a>,
}

impl<'a> ClosePreAuthorizationContext<'a> {
    /// # Safety
    ///
    /// Caller guarantees:
    /// - WRITE accounts are not currently borrowed in *any* capacity.
    /// - READ accounts are not currently mutably borrowed.
    pub unsafe fn load(
        accounts: &'a [AccountView],
    ) -> Result<ClosePreAuthorizationContext<'a>, ProgramError> {
        let [receiver, authority, token_account, pre_authorization, ..] = accounts else {
            return Err(ProgramError::NotEnoughAccountKeys);
        };

        check_signer(authority)?;

        // Safety: Scoped borrows of the token account and pre-authorization data.
        let (token_account, pre_authorization) = unsafe {
            (
                TokenAccountView::new(token_account)?,
                PreAuthorizationView::new(pre_authorization)?,
            )
        };

        if &pre_authorization.state.token_account != token_account.address() {
            return Err(PadError::PreAuthorizationTokenAccountMismatch.into());
        }

        let is_owner = authority.address() == &token_account.owner;
        let is_debit_authority = authority.address() == &pre_authorization.state.debit_authority;
        if !is_owner && !is_debit_authority {
            return Err(PadError::PreAuthorizationCloseUnauthorized.into());
        }
        if !is_owner && receiver.address() != &token_account.owner {
            return Err(PadError::OnlyTokenAccountOwnerCanReceiveClosePreAuthFunds.into());
        }

        Ok(Self {
            receiver,
            authority,
            token_account,
            pre_authorization,
        })
    }
}
