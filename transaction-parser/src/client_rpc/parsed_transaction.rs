//! High-level parsed transaction type that aggregates logs, errors, compute usage and the
//! program's events.

use std::str::FromStr;

use anyhow::Context;
use pad_interface::error::PadError;
use solana_address::Address;
use solana_sdk::{
    clock::UnixTimestamp,
    signature::Signature,
};
use solana_transaction_error::TransactionError;
use solana_transaction_status::{
    option_serializer::OptionSerializer,
    EncodedConfirmedTransactionWithStatusMeta,
    EncodedTransaction,
    UiTransaction,
};

use crate::{
    client_rpc::{
        parse_program_invocations,
        ProgramInvocation,
    },
    errors::{
        pad_error_from_logs,
        pad_error_from_transaction_error,
    },
    events::{
        events_from_invocations,
        PadEvent,
    },
};

#[derive(Debug)]
pub struct ParsedTransaction {
    pub signature: Signature,
    pub slot: u64,
    pub block_time: Option<UnixTimestamp>,
    pub err: Option<TransactionError>,
    pub fee: u64,
    pub log_messages: Vec<String>,
    pub compute_units_consumed: Option<u64>,
    pub invocations: Vec<ProgramInvocation>,
    pub events: Vec<PadEvent>,
}

impl ParsedTransaction {
    /// Parses `encoded`, decoding the events emitted directly by `program_id`.
    pub fn from_encoded_transaction(
        encoded: EncodedConfirmedTransactionWithStatusMeta,
        program_id: &Address,
    ) -> Result<Self, anyhow::Error> {
        let EncodedConfirmedTransactionWithStatusMeta {
            slot,
            block_time,
            transaction,
        } = encoded;

        let meta = transaction
            .meta
            .ok_or(anyhow::Error::msg("Expected transaction meta"))?;
        let log_messages = meta.log_messages.unwrap_or(vec![]);
        let invocations = parse_program_invocations(&log_messages)?;
        let events = events_from_invocations(&invocations, program_id)?;

        let signature = match transaction.transaction {
            EncodedTransaction::Json(UiTransaction { signatures, .. }) => {
                let first = signatures.first().context("Transaction has no signatures")?;
                Signature::from_str(first).context("Invalid transaction signature")?
            }
            encoded => {
                let versioned = encoded.decode().context("Failed to decode transaction")?;
                *versioned
                    .signatures
                    .first()
                    .context("Transaction has no signatures")?
            }
        };

        Ok(Self {
            signature,
            slot,
            block_time,
            err: meta.err.map(TransactionError::from),
            fee: meta.fee,
            log_messages,
            compute_units_consumed: match meta.compute_units_consumed {
                OptionSerializer::Some(units) => Some(units),
                _ => None,
            },
            invocations,
            events,
        })
    }

    pub fn is_success(&self) -> bool {
        self.err.is_none()
    }

    /// The program error the transaction failed with, if it failed with one of the program's
    /// custom error codes.
    pub fn pad_error(&self) -> Option<PadError> {
        self.err
            .as_ref()
            .and_then(pad_error_from_transaction_error)
            .or_else(|| pad_error_from_logs(&self.log_messages))
    }

    /// Compute units consumed by each top-level invocation of `program_id`.
    pub fn program_compute_units(&self, program_id: &Address) -> Vec<u64> {
        self.invocations
            .iter()
            .filter(|invocation| invocation.is_top_level() && &invocation.program_id == program_id)
            .filter_map(|invocation| invocation.units_consumed)
            .collect()
    }
}
