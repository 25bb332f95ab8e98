//! Client SDK for the pre-authorized debit program.
//!
//! Includes a read client for program accounts, instruction and transaction builders, RPC and
//! logging helpers, and harnesses for mollusk and local validator tests.

pub mod context;
pub mod e2e_helpers;
pub mod errors;
pub mod instruction_factory;
pub mod logs;
pub mod mollusk_helpers;
pub mod pda;
pub mod read_client;
pub mod time;
pub mod transaction_factory;
pub mod transactions;

pub use errors::{
    SdkError,
    SdkResult,
};
pub use logs::LogColor;
pub use read_client::PreAuthorizedDebitReadClient;
pub use transaction_factory::TransactionFactory;
