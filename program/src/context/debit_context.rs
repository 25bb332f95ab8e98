//! See [`DebitContext`].

use pad_interface::error::PadError;
use pinocchio::{
    account::AccountView,
    error::ProgramError,
};

use crate::{
    context::check_signer,
    validation::{
        mint_view::MintView,
        pre_authorization_view::PreAuthorizationView,
        smart_delegate_view::SmartDelegateView,
        token_account_view::TokenAccountView,
    },
};

/// The account context for the [`pad_interface::instructions::Debit`] instruction.
///
/// The mint, delegate and balance of the source token account are left to the token program's
/// `TransferChecked`, which fails if the smart delegate isn't an approved delegate for `amount`.
#[derive(Clone)]
pub struct DebitContext<'a> {
    pub debit_authority: &'a AccountView,
    pub mint: MintView<'a>,
    pub token_account: TokenAccountView<'a>,
    pub destination_token_account: TokenAccountView<'a>,
    pub smart_delegate: SmartDelegateView<'a>,
    pub pre_authorization: PreAuthorizationView<'a>,
    pub token_program: &'a AccountView,
}

impl<'a> DebitContext<'a> {
    /// # Safety
    ///
    /// Caller guarantees:
    /// - WRITE accounts are not currently borrowed in *any* capacity.
    /// - READ accounts are not currently mutably borrowed.
    pub unsafe fn load(accounts: &'a [AccountView]) -> Result<DebitContext<'a>, ProgramError> {
        let [debit_authority, mint, token_account, destination_token_account, smart_delegate, pre_authorization, token_program, ..] =
            accounts
        else {
            return Err(ProgramError::NotEnoughAccountKeys);
        };

        check_signer(debit_authority)?;

        // Safety: Scoped borrows of each account's data.
        let (pre_authorization, token_account, destination_token_account, smart_delegate, mint) = unsafe {
            (
                PreAuthorizationView::new(pre_authorization)?,
                TokenAccountView::new(token_account)?,
                TokenAccountView::new(destination_token_account)?,
                SmartDelegateView::new(smart_delegate)?,
                MintView::new(mint, token_program.address())?,
            )
        };

        if &pre_authorization.state.debit_authority != debit_authority.address() {
            return Err(PadError::DebitUnauthorized.into());
        }
        if &pre_authorization.state.token_account != token_account.address() {
            return Err(PadError::PreAuthorizationTokenAccountMismatch.into());
        }
        if &token_account.token_program != token_program.address() {
            return Err(ProgramError::IncorrectProgramId);
        }

        Ok(Self {
            debit_authority,
            mint,
            token_account,
            destination_token_account,
            smart_delegate,
            pre_authorization,
            token_program,
        })
    }
}
