//! Token program CPIs that dispatch on SPL Token vs Token-2022.

use pad_interface::utils::SPL_TOKEN_ID;
use pinocchio::{
    account::AccountView,
    cpi::Signer,
    Address,
    ProgramResult,
};

/// Approves `delegate` to move up to `amount` from `source`.
///
/// ### Accounts
///   0. `[WRITE]` Source token account
///   1. `[READ]` Delegate
///   2. `[READ, SIGNER]` Source token account owner
pub fn approve(
    token_program: &Address,
    source: &AccountView,
    delegate: &AccountView,
    authority: &AccountView,
    amount: u64,
) -> ProgramResult {
    if token_program == &SPL_TOKEN_ID {
        pinocchio_token::instructions::Approve {
            source,    // WRITE
            delegate,  // READ
            authority, // READ
            amount,
        }
        .invoke()
    } else {
        pinocchio_token_2022::instructions::Approve {
            source,    // WRITE
            delegate,  // READ
            authority, // READ
            amount,
            token_program,
        }
        .invoke()
    }
}

/// Transfers `amount` from `from` to `to` with `TransferChecked`, signed by `signer`.
///
/// ### Accounts
///   0. `[WRITE]` Source token account
///   1. `[READ]` Mint
///   2. `[WRITE]` Destination token account
///   3. `[READ, SIGNER]` Delegate authority
#[allow(clippy::too_many_arguments)]
pub fn transfer_checked_signed(
    token_program: &Address,
    from: &AccountView,
    mint: &AccountView,
    to: &AccountView,
    authority: &AccountView,
    amount: u64,
    decimals: u8,
    signer: Signer,
) -> ProgramResult {
    if token_program == &SPL_TOKEN_ID {
        pinocchio_token::instructions::TransferChecked {
            from,      // WRITE
            mint,      // READ
            to,        // WRITE
            authority, // READ
            amount,
            decimals,
        }
        .invoke_signed(&[signer])
    } else {
        pinocchio_token_2022::instructions::TransferChecked {
            from,      // WRITE
            mint,      // READ
            to,        // WRITE
            authority, // READ
            amount,
            decimals,
            token_program,
        }
        .invoke_signed(&[signer])
    }
}
