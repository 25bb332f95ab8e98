//! Errors surfaced by the SDK. Every message ends with the endpoint of the RPC client that
//! produced it.

use solana_address::Address;
use solana_client::client_error::ClientError;

#[derive(Debug, thiserror::Error)]
pub enum SdkError {
    #[error("Token account doesn't exist: {token_account} (rpc: {rpc})")]
    TokenAccountDoesNotExist { rpc: String, token_account: Address },

    #[error(
        "Pre-authorization not found for (tokenAccount: {token_account}, debitAuthority: \
         {debit_authority}) (rpc: {rpc})"
    )]
    NoPreAuthorizationFound {
        rpc: String,
        token_account: Address,
        debit_authority: Address,
    },

    #[error("Pre-authorization not found: {pre_authorization} (rpc: {rpc})")]
    PreAuthorizationNotFoundAt {
        rpc: String,
        pre_authorization: Address,
    },

    #[error("Smart delegate is not the delegate of token account {token_account} (rpc: {rpc})")]
    SmartDelegateNotSet { rpc: String, token_account: Address },

    #[error(
        "Smart delegated amount {delegated_amount} is less than {required} for token account \
         {token_account} (rpc: {rpc})"
    )]
    SmartDelegatedAmountNotEnough {
        rpc: String,
        token_account: Address,
        delegated_amount: u64,
        required: u64,
    },

    #[error("Transaction fees payer not provided (rpc: {rpc})")]
    TransactionFeesPayerNotProvided { rpc: String },

    #[error("Invalid account data for {address}: {reason} (rpc: {rpc})")]
    InvalidAccountData {
        rpc: String,
        address: Address,
        reason: String,
    },

    #[error("Failed to parse program events: {reason} (rpc: {rpc})")]
    EventParse { rpc: String, reason: String },

    #[error("Failed to build transaction: {reason} (rpc: {rpc})")]
    TransactionBuild { rpc: String, reason: String },

    #[error("{source} (rpc: {rpc})")]
    Rpc {
        rpc: String,
        #[source]
        source: Box<ClientError>,
    },
}

pub type SdkResult<T> = Result<T, SdkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_include_rpc() {
        let token_account = Address::new_from_array([1; 32]);
        let debit_authority = Address::new_from_array([2; 32]);
        let rpc = "http://localhost:8899".to_string();

        let err = SdkError::TokenAccountDoesNotExist {
            rpc: rpc.clone(),
            token_account,
        };
        assert_eq!(
            err.to_string(),
            format!("Token account doesn't exist: {token_account} (rpc: http://localhost:8899)")
        );

        let err = SdkError::NoPreAuthorizationFound {
            rpc: rpc.clone(),
            token_account,
            debit_authority,
        };
        assert_eq!(
            err.to_string(),
            format!(
                "Pre-authorization not found for (tokenAccount: {token_account}, debitAuthority: \
                 {debit_authority}) (rpc: http://localhost:8899)"
            )
        );

        let err = SdkError::TransactionFeesPayerNotProvided { rpc };
        assert!(err.to_string().ends_with("(rpc: http://localhost:8899)"));
    }
}
