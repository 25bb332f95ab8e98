//! Validated views over raw accounts. Constructing a view performs the ownership and layout
//! checks, so handlers can rely on them afterwards.

pub mod mint_view;
pub mod pre_authorization_view;
pub mod smart_delegate_view;
pub mod token_account_view;
