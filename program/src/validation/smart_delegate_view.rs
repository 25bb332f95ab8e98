use pad_interface::{
    program,
    state::smart_delegate::SmartDelegate,
    utils::owned_by,
};
use pinocchio::{
    account::AccountView,
    error::ProgramError,
};

#[derive(Clone)]
pub struct SmartDelegateView<'a> {
    /// The account as a private field, so a view can only be built through [`Self::new`].
    account: &'a AccountView,
    pub bump: u8,
}

impl<'a> SmartDelegateView<'a> {
    #[inline(always)]
    pub fn account(&self) -> &'a AccountView {
        self.account
    }

    /// Checks that the account is an initialized smart delegate owned by this program.
    ///
    /// The program only ever creates the smart delegate at its PDA, so owner and discriminator
    /// checks are sufficient to authenticate it.
    ///
    /// # Safety
    ///
    /// Caller guarantees:
    /// - WRITE accounts are not currently borrowed in *any* capacity.
    /// - READ accounts are not currently mutably borrowed.
    ///
    /// ### Accounts
    ///   0. `[READ]` Smart delegate account
    #[inline(always)]
    pub unsafe fn new(account: &'a AccountView) -> Result<SmartDelegateView<'a>, ProgramError> {
        if !owned_by(account, &program::ID) {
            return Err(ProgramError::InvalidAccountOwner);
        }

        // Safety: Scoped immutable borrow of the smart delegate's data.
        let data = unsafe { account.borrow_unchecked() };
        let SmartDelegate { bump } =
            SmartDelegate::unpack(data).or(Err(ProgramError::InvalidAccountData))?;

        Ok(Self { account, bump })
    }
}
