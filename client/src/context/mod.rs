//! Helpers that wrap on-chain state the SDK commonly works with.

pub mod token;
