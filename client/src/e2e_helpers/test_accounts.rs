//! Deterministic keypairs shared by end-to-end tests and scripts, so repeated runs against the
//! same local validator reuse already funded accounts.

use std::sync::LazyLock;

use solana_keypair::Keypair;

static DEFAULT_PAYER: LazyLock<Keypair> = LazyLock::new(|| Keypair::new_from_array([7; 32]));
static TOKEN_ACCOUNT_OWNER: LazyLock<Keypair> = LazyLock::new(|| Keypair::new_from_array([11; 32]));
static DEBIT_AUTHORITY: LazyLock<Keypair> = LazyLock::new(|| Keypair::new_from_array([13; 32]));

/// Pays for mints, token accounts and the smart delegate.
pub fn default_payer() -> &'static Keypair {
    &DEFAULT_PAYER
}

pub fn token_account_owner() -> &'static Keypair {
    &TOKEN_ACCOUNT_OWNER
}

pub fn debit_authority() -> &'static Keypair {
    &DEBIT_AUTHORITY
}
