use std::{
    str::FromStr,
    sync::LazyLock,
};

use anyhow::Context;
use pad_client::transactions::DEFAULT_RPC_URL;
use solana_address::Address;
use solana_sdk::signature::Keypair;

pub fn rpc_url() -> &'static str {
    static URL: LazyLock<String> = LazyLock::new(|| {
        std::env::var("SOLANA_RPC_URL").unwrap_or_else(|_| DEFAULT_RPC_URL.to_string())
    });

    URL.as_str()
}

/// The program to query, overridable with `PAD_PROGRAM_ID`.
pub fn program_id() -> anyhow::Result<Address> {
    static PROGRAM_ID: LazyLock<Option<String>> =
        LazyLock::new(|| std::env::var("PAD_PROGRAM_ID").ok());

    match PROGRAM_ID.as_deref() {
        Some(id) => Address::from_str(id)
            .with_context(|| format!("PAD_PROGRAM_ID is not a valid address: {id}")),
        None => Ok(pad_interface::program::ID),
    }
}

/// Loads the keypair stored at `SOLANA_KEYPAIR_PATH` as a JSON byte array, the format written by
/// `solana-keygen`.
pub fn payer_keypair() -> anyhow::Result<Keypair> {
    static PATH: LazyLock<Option<String>> =
        LazyLock::new(|| std::env::var("SOLANA_KEYPAIR_PATH").ok());

    let path = PATH
        .as_deref()
        .context("Environment variable SOLANA_KEYPAIR_PATH must be set.")?;
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("Couldn't read keypair at {path}"))?;

    keypair_from_json(&contents).with_context(|| format!("Invalid keypair file {path}"))
}

pub fn keypair_from_json(json: &str) -> anyhow::Result<Keypair> {
    let bytes: Vec<u8> = serde_json::from_str(json).context("Invalid JSON keypair")?;

    Keypair::try_from(bytes.as_slice()).context("Invalid keypair bytes")
}

#[cfg(test)]
mod tests {
    use solana_sdk::signature::Signer;

    use super::*;

    #[test]
    fn keypair_json_round_trips() {
        let keypair = Keypair::new();
        let json = serde_json::to_string(&keypair.to_bytes().to_vec()).unwrap();

        let loaded = keypair_from_json(&json).unwrap();
        assert_eq!(loaded.pubkey(), keypair.pubkey());
    }

    #[test]
    fn rejects_malformed_keypairs() {
        assert!(keypair_from_json("not json").is_err());
        assert!(keypair_from_json("[1, 2, 3]").is_err());
    }
}
