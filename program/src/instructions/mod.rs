//! Instruction handlers for the pre-authorized debit program.
//!
//! Routes decoded instructions to their corresponding handlers and encapsulates all on-chain logic
//! for each supported operation.

pub mod close_pre_authorization;
pub mod debit;
pub mod init_pre_authorization;
pub mod init_smart_delegate;
pub mod update_pause_pre_authorization;

pub use close_pre_authorization::process_close_pre_authorization;
pub use debit::process_debit;
pub use init_pre_authorization::process_init_pre_authorization;
pub use init_smart_delegate::process_init_smart_delegate;
pub use update_pause_pre_authorization::process_update_pause_pre_authorization;
