//! Public interface layer for the pre-authorized debit program: account state, instruction and
//! event encodings, debit accounting and shared utilities for on-chain and client integration.

#![no_std]

#[cfg(feature = "std")]
extern crate std;

pub mod cycles;
pub mod error;
pub mod events;
pub mod instructions;
pub mod pack;
pub mod seeds;
pub mod state;
pub mod syscalls;
pub mod utils;

pub mod program {
    use pinocchio::Address;

    /// `PadV1i1My8wazb6vi37UJ2s1yBDkFN5MYivYN6XgaaR`, deployed at the same address on mainnet and
    /// devnet.
    pub const ID: Address = Address::new_from_array([
        5, 200, 205, 96, 66, 144, 11, 211, 56, 248, 172, 55, 179, 147, 61, 81, 185, 104, 195, 5, 6,
        195, 177, 121, 133, 190, 126, 24, 244, 152, 45, 14,
    ]);
}
