//! The pre-authorized debit program.
//!
//! Token account owners create pre-authorizations that let a debit authority pull tokens from
//! their token account, once or on a recurring schedule. Transfers are signed by a single
//! program-wide smart delegate that every participating token account approves.

#![no_std]

#[cfg(feature = "std")]
extern crate std;

pub mod context;
pub mod debug;
#[cfg(not(feature = "no-entrypoint"))]
pub mod entrypoint;
pub mod events;
pub mod instructions;
pub mod shared;
pub mod signers;
pub mod validation;

pub use pad_interface::program::ID;
