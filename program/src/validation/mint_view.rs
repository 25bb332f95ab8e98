use pad_interface::utils::owned_by;
use pinocchio::{
    account::AccountView,
    error::ProgramError,
};
use pinocchio_token_interface::state::{
    load_unchecked as pinocchio_load_unchecked,
    mint::Mint,
};

#[derive(Clone)]
pub struct MintView<'a> {
    pub account: &'a AccountView,
    pub decimals: u8,
}

impl<'a> MintView<'a> {
    /// Checks the mint is owned by `token_program` and copies out its decimals.
    ///
    /// # Safety
    ///
    /// Caller guarantees:
    /// - WRITE accounts are not currently borrowed in *any* capacity.
    /// - READ accounts are not currently mutably borrowed.
    ///
    /// ### Accounts
    ///   0. `[READ]` Mint account
    #[inline(always)]
    pub unsafe fn new(
        account: &'a AccountView,
        token_program: &pinocchio::Address,
    ) -> Result<MintView<'a>, ProgramError> {
        if !owned_by(account, token_program) {
            return Err(ProgramError::InvalidAccountOwner);
        }

        // Safety: Scoped immutable borrow of the mint account data to read its decimals.
        let data = unsafe { account.borrow_unchecked() };
        let base = data.get(..Mint::LEN).ok_or(ProgramError::InvalidAccountData)?;

        // Safety: The mint owner was verified above and the length matches the base mint layout.
        let decimals = unsafe { pinocchio_load_unchecked::<Mint>(base) }?.decimals;

        Ok(Self { account, decimals })
    }
}
