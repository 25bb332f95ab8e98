use pad_interface::{
    program,
    state::pre_authorization::PreAuthorization,
    utils::owned_by,
};
use pinocchio::{
    account::AccountView,
    error::ProgramError,
    ProgramResult,
};

#[derive(Clone)]
pub struct PreAuthorizationView<'a> {
    /// The account as a private field, so a view can only be built through [`Self::new`].
    account: &'a AccountView,
    /// A copy of the state at load time. Changes are written back with [`Self::store`].
    pub state: PreAuthorization,
}

impl<'a> PreAuthorizationView<'a> {
    #[inline(always)]
    pub fn account(&self) -> &'a AccountView {
        self.account
    }

    /// Checks that the account is an initialized pre-authorization owned by this program and
    /// copies out its state.
    ///
    /// # Safety
    ///
    /// Caller guarantees:
    /// - WRITE accounts are not currently borrowed in *any* capacity.
    /// - READ accounts are not currently mutably borrowed.
    ///
    /// ### Accounts
    ///   0. `[READ]` Pre-authorization account
    #[inline(always)]
    pub unsafe fn new(account: &'a AccountView) -> Result<PreAuthorizationView<'a>, ProgramError> {
        if !owned_by(account, &program::ID) {
            return Err(ProgramError::InvalidAccountOwner);
        }

        // Safety: Scoped immutable borrow of the pre-authorization's data.
        let data = unsafe { account.borrow_unchecked() };
        let state = PreAuthorization::unpack(data).or(Err(ProgramError::InvalidAccountData))?;

        Ok(Self { account, state })
    }

    /// Writes [`Self::state`] back into the account data.
    ///
    /// # Safety
    ///
    /// Caller guarantees:
    /// - WRITE accounts are not currently borrowed in *any* capacity.
    ///
    /// ### Accounts
    ///   0. `[WRITE]` Pre-authorization account
    #[inline(always)]
    pub unsafe fn store(&self) -> ProgramResult {
        // Safety: Scoped mutable borrow of the pre-authorization's data.
        let data = unsafe { self.account.borrow_unchecked_mut() };
        self.state.pack_into(data)
    }
}
