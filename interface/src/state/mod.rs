//! Program-owned account state and its borsh-compatible byte layouts.

pub mod pre_authorization;
pub mod smart_delegate;

pub const U8_SIZE: usize = core::mem::size_of::<u8>();
pub const U64_SIZE: usize = core::mem::size_of::<u64>();
pub const ADDRESS_SIZE: usize = core::mem::size_of::<pinocchio::Address>();

/// The byte length of every account, event and instruction discriminator.
pub const DISCRIMINATOR_SIZE: usize = 8;

static_assertions::const_assert_eq!(ADDRESS_SIZE, 32);
