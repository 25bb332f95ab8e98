//! Parsing for transactions that invoke the pre-authorized debit program: invocation frames from
//! log messages, `Program data:` events, and custom program errors.

pub mod client_rpc;
pub mod errors;
pub mod events;
