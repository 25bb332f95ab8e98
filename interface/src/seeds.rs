//! PDA seed prefixes and seed-array macros for the smart delegate and pre-authorization accounts.

/// Seed of the single, program-wide smart delegate PDA.
pub const SMART_DELEGATE_SEED: &[u8] = b"smart-delegate";

/// Seed prefix of a pre-authorization PDA, followed by the token account and debit authority.
pub const PRE_AUTHORIZATION_SEED: &[u8] = b"pre-authorization";

/// Expands to the seeds of the smart delegate PDA, without a bump.
#[macro_export]
macro_rules! smart_delegate_seeds {
    () => {
        &[$crate::seeds::SMART_DELEGATE_SEED]
    };
}

/// Expands to the seeds of a pre-authorization PDA, without a bump.
#[macro_export]
macro_rules! pre_authorization_seeds {
    ($token_account:expr, $debit_authority:expr) => {
        &[
            $crate::seeds::PRE_AUTHORIZATION_SEED,
            $token_account.as_ref(),
            $debit_authority.as_ref(),
        ]
    };
}
