use std::path::PathBuf;

use clap::{
    command,
    ArgGroup,
    Parser,
    Subcommand,
};
use pad_client::read_client::PreAuthorizationKind;
use solana_address::Address;

#[derive(Parser)]
#[command(name = "pad", about = "Operational scripts for the pre-authorized debit program")]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Decodes the program's events from raw transaction log lines.
    ParseLogs {
        /// A file with one log line per line, or `-` for stdin.
        input: PathBuf,
    },

    /// Fetches the program's most recent transactions and decodes their events.
    VerifyEvents {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Blocks until the RPC endpoint reports healthy.
    WaitForValidator {
        #[arg(long, default_value_t = 30)]
        timeout_secs: u64,
    },

    /// Lists pre-authorizations for a token account or a debit authority.
    #[command(group(
        ArgGroup::new("target")
            .required(true)
            .args(["token_account", "debit_authority"]),
    ))]
    PreAuthorizations {
        #[arg(long)]
        token_account: Option<Address>,

        #[arg(long)]
        debit_authority: Option<Address>,

        /// `all`, `one-time` or `recurring`.
        #[arg(long, default_value_t = PreAuthorizationKind::All)]
        kind: PreAuthorizationKind,
    },

    /// Shows the smart delegate account.
    SmartDelegate {
        /// Initializes it with the `SOLANA_KEYPAIR_PATH` keypair as the payer if it doesn't exist.
        #[arg(long)]
        init: bool,
    },

    /// Airdrops SOL to an address.
    Fund { address: Address },
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn verify_cli() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn pre_authorizations_requires_exactly_one_target() {
        let address = Address::new_unique().to_string();

        let parsed = CliArgs::try_parse_from([
            "pad",
            "pre-authorizations",
            "--token-account",
            &address,
            "--kind",
            "one-time",
        ])
        .unwrap();
        let Command::PreAuthorizations {
            token_account,
            debit_authority,
            kind,
        } = parsed.command
        else {
            panic!("expected the pre-authorizations subcommand");
        };
        assert_eq!(token_account.map(|a| a.to_string()), Some(address.clone()));
        assert!(debit_authority.is_none());
        assert_eq!(kind, PreAuthorizationKind::OneTime);

        assert!(CliArgs::try_parse_from(["pad", "pre-authorizations"]).is_err());
        assert!(CliArgs::try_parse_from([
            "pad",
            "pre-authorizations",
            "--token-account",
            &address,
            "--debit-authority",
            &address,
        ])
        .is_err());
    }

    #[test]
    fn defaults() {
        let parsed = CliArgs::try_parse_from(["pad", "verify-events"]).unwrap();
        assert!(matches!(parsed.command, Command::VerifyEvents { limit: 10 }));

        let parsed = CliArgs::try_parse_from(["pad", "parse-logs", "-"]).unwrap();
        assert!(matches!(parsed.command, Command::ParseLogs { input } if input == PathBuf::from("-")));
    }
}
