//! PDA derivations for the smart delegate and pre-authorization accounts.

use pad_interface::{
    pre_authorization_seeds,
    smart_delegate_seeds,
};
use solana_address::Address;

/// A program derived address and its canonical bump.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pda {
    pub address: Address,
    pub bump: u8,
}

impl From<(Address, u8)> for Pda {
    fn from((address, bump): (Address, u8)) -> Self {
        Self { address, bump }
    }
}

pub fn find_smart_delegate_address(program_id: &Address) -> Pda {
    Address::find_program_address(smart_delegate_seeds!(), program_id).into()
}

pub fn find_pre_authorization_address(
    program_id: &Address,
    token_account: &Address,
    debit_authority: &Address,
) -> Pda {
    Address::find_program_address(
        pre_authorization_seeds!(token_account, debit_authority),
        program_id,
    )
    .into()
}
