use pinocchio::{
    account::AccountView,
    Address,
};

/// The legacy SPL token program, `TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA`.
pub const SPL_TOKEN_ID: Address = Address::new_from_array([
    6, 221, 246, 225, 215, 101, 161, 147, 217, 203, 225, 70, 206, 235, 121, 172, 28, 180, 133, 237,
    95, 91, 55, 145, 58, 140, 245, 133, 126, 255, 0, 169,
]);

/// The token extensions program, `TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb`.
pub const SPL_TOKEN_2022_ID: Address = Address::new_from_array([
    6, 221, 246, 225, 238, 117, 143, 222, 24, 66, 93, 188, 228, 108, 205, 218, 182, 26, 252, 77,
    131, 185, 13, 39, 254, 189, 249, 40, 216, 161, 139, 252,
]);

#[inline(always)]
pub fn owned_by(account: &AccountView, owner: &Address) -> bool {
    account.owned_by(owner)
}

#[inline(always)]
pub fn is_token_program(program_id: &Address) -> bool {
    program_id == &SPL_TOKEN_ID || program_id == &SPL_TOKEN_2022_ID
}

#[inline(always)]
pub fn is_owned_by_spl_token(account: &AccountView) -> bool {
    owned_by(account, &SPL_TOKEN_ID)
}

#[inline(always)]
pub fn is_owned_by_token_program(account: &AccountView) -> bool {
    owned_by(account, &SPL_TOKEN_ID) || owned_by(account, &SPL_TOKEN_2022_ID)
}

/// The system program, `11111111111111111111111111111111`.
pub const SYSTEM_PROGRAM_ID: Address = Address::new_from_array([0; 32]);
