//! Maps failed transactions back to [`PadError`] variants.

use lazy_regex::regex_captures;
use pad_interface::error::PadError;
use solana_instruction_error::InstructionError;
use solana_transaction_error::TransactionError;

/// Extracts the first `custom program error: 0x..` code from `log_messages` and maps it to a
/// [`PadError`].
///
/// Returns `None` if there's no custom error in the logs or the code isn't one of the program's.
pub fn pad_error_from_logs<S: AsRef<str>>(log_messages: &[S]) -> Option<PadError> {
    log_messages.iter().find_map(|line| {
        let (_, hex) = regex_captures!(r"custom program error: 0x([0-9a-fA-F]+)", line.as_ref())?;
        u32::from_str_radix(hex, 16).ok().and_then(PadError::from_code)
    })
}

/// Maps an `InstructionError(_, Custom(code))` to a [`PadError`], if the code is the program's.
pub fn pad_error_from_transaction_error(err: &TransactionError) -> Option<PadError> {
    match err {
        TransactionError::InstructionError(_, InstructionError::Custom(code)) => {
            PadError::from_code(*code)
        }
        _ => None,
    }
}
