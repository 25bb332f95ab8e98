use pad_interface::utils::is_token_program;
use pinocchio::{
    account::AccountView,
    error::ProgramError,
    Address,
};
use pinocchio_token_interface::state::{
    account::Account,
    load as pinocchio_load,
};

/// An initialized SPL Token or Token-2022 account, with the fields the program checks copied out.
#[derive(Clone)]
pub struct TokenAccountView<'a> {
    pub account: &'a AccountView,
    /// The token program that owns the account.
    pub token_program: Address,
    pub mint: Address,
    pub owner: Address,
}

impl<'a> TokenAccountView<'a> {
    /// # Safety
    ///
    /// Caller guarantees:
    /// - WRITE accounts are not currently borrowed in *any* capacity.
    /// - READ accounts are not currently mutably borrowed.
    ///
    /// ### Accounts
    ///   0. `[READ]` Token account
    #[inline(always)]
    pub unsafe fn new(account: &'a AccountView) -> Result<TokenAccountView<'a>, ProgramError> {
        // Safety: The owner is only read, never reassigned, while this view exists.
        let token_program = unsafe { *account.owner() };
        if !is_token_program(&token_program) {
            return Err(ProgramError::InvalidAccountOwner);
        }

        // Safety: Immutable borrow of the token account data to copy the mint and owner, dropped
        // before the function returns.
        let data = unsafe { account.borrow_unchecked() };

        // Token-2022 accounts may carry extensions after the base layout.
        let base = data
            .get(..Account::LEN)
            .ok_or(ProgramError::InvalidAccountData)?;

        // Note the load below also checks that the account has been initialized.
        // Safety: The account owner has been verified as a token program.
        let token_account = unsafe { pinocchio_load::<Account>(base) }?;

        Ok(Self {
            account,
            token_program,
            mint: token_account.mint,
            owner: token_account.owner,
        })
    }

    #[inline(always)]
    pub fn address(&self) -> &'a Address {
        self.account.address()
    }
}
