//! CPI signer macros for the program's PDAs.

/// Expands to the [`pinocchio::cpi::Signer`] of the smart delegate PDA.
#[macro_export]
macro_rules! smart_delegate_signer {
    ($bump:expr) => {
        pinocchio::cpi::Signer::from(&[
            pinocchio::cpi::Seed::from(pad_interface::seeds::SMART_DELEGATE_SEED),
            pinocchio::cpi::Seed::from(&[$bump]),
        ])
    };
}

/// Expands to the [`pinocchio::cpi::Signer`] of a pre-authorization PDA.
#[macro_export]
macro_rules! pre_authorization_signer {
    ($token_account:expr, $debit_authority:expr, $bump:expr) => {
        pinocchio::cpi::Signer::from(&[
            pinocchio::cpi::Seed::from(pad_interface::seeds::PRE_AUTHORIZATION_SEED),
            pinocchio::cpi::Seed::from($token_account.as_ref()),
            pinocchio::cpi::Seed::from($debit_authority.as_ref()),
            pinocchio::cpi::Seed::from(&[$bump]),
        ])
    };
}
