//! Helpers shared between instruction handlers.

pub mod token_utils;
