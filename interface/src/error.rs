//! Program error codes and conversion helpers to represent them as error message strings.
//!
//! The numeric codes start at 6000 and match the codes returned by the deployed program, so a
//! `custom program error: 0x1770` in a transaction log maps back to
//! [`PadError::PreAuthorizationNotActive`].

use pinocchio::error::ProgramError;

/// The first custom error code.
pub const ERROR_CODE_OFFSET: u32 = 6000;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(
    any(test, feature = "client"),
    derive(strum_macros::FromRepr, strum_macros::EnumIter)
)]
#[repr(u32)]
pub enum PadError {
    PreAuthorizationNotActive = ERROR_CODE_OFFSET,
    CannotDebitMoreThanAvailable,
    LastDebitedCycleBeforeCurrentCycle,
    InvalidTimestamp,
    PreAuthorizationPaused,
    OnlyTokenAccountOwnerCanReceiveClosePreAuthFunds,
    PreAuthorizationTokenAccountMismatch,
    PreAuthorizationCloseUnauthorized,
    SmartDelegateCloseUnauthorized,
    PausePreAuthorizationUnauthorized,
    DebitUnauthorized,
    InitPreAuthorizationUnauthorized,
    InitSmartDelegateUnauthorized,
    ArithmeticOverflow,
}

impl PadError {
    pub const LAST: PadError = PadError::ArithmeticOverflow;

    #[inline(always)]
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Maps a custom program error code back to its variant. Codes outside of this program's range
    /// return `None` and should be passed along unmodified.
    pub const fn from_code(code: u32) -> Option<PadError> {
        let err = match code {
            6000 => PadError::PreAuthorizationNotActive,
            6001 => PadError::CannotDebitMoreThanAvailable,
            6002 => PadError::LastDebitedCycleBeforeCurrentCycle,
            6003 => PadError::InvalidTimestamp,
            6004 => PadError::PreAuthorizationPaused,
            6005 => PadError::OnlyTokenAccountOwnerCanReceiveClosePreAuthFunds,
            6006 => PadError::PreAuthorizationTokenAccountMismatch,
            6007 => PadError::PreAuthorizationCloseUnauthorized,
            6008 => PadError::SmartDelegateCloseUnauthorized,
            6009 => PadError::PausePreAuthorizationUnauthorized,
            6010 => PadError::DebitUnauthorized,
            6011 => PadError::InitPreAuthorizationUnauthorized,
            6012 => PadError::InitSmartDelegateUnauthorized,
            6013 => PadError::ArithmeticOverflow,
            _ => return None,
        };
        Some(err)
    }

    pub const fn name(self) -> &'static str {
        match self {
            PadError::PreAuthorizationNotActive => "PreAuthorizationNotActive",
            PadError::CannotDebitMoreThanAvailable => "CannotDebitMoreThanAvailable",
            PadError::LastDebitedCycleBeforeCurrentCycle => "LastDebitedCycleBeforeCurrentCycle",
            PadError::InvalidTimestamp => "InvalidTimestamp",
            PadError::PreAuthorizationPaused => "PreAuthorizationPaused",
            PadError::OnlyTokenAccountOwnerCanReceiveClosePreAuthFunds => {
                "OnlyTokenAccountOwnerCanReceiveClosePreAuthFunds"
            }
            PadError::PreAuthorizationTokenAccountMismatch => {
                "PreAuthorizationTokenAccountMismatch"
            }
            PadError::PreAuthorizationCloseUnauthorized => "PreAuthorizationCloseUnauthorized",
            PadError::SmartDelegateCloseUnauthorized => "SmartDelegateCloseUnauthorized",
            PadError::PausePreAuthorizationUnauthorized => "PausePreAuthorizationUnauthorized",
            PadError::DebitUnauthorized => "DebitUnauthorized",
            PadError::InitPreAuthorizationUnauthorized => "InitPreAuthorizationUnauthorized",
            PadError::InitSmartDelegateUnauthorized => "InitSmartDelegateUnauthorized",
            PadError::ArithmeticOverflow => "ArithmeticOverflow",
        }
    }
}

impl From<PadError> for ProgramError {
    #[inline(always)]
    fn from(e: PadError) -> Self {
        ProgramError::Custom(e as u32)
    }
}

impl From<PadError> for &'static str {
    fn from(value: PadError) -> Self {
        match value {
            PadError::PreAuthorizationNotActive => "Pre-Authorization not active",
            PadError::CannotDebitMoreThanAvailable => "Cannot debit more than authorized",
            PadError::LastDebitedCycleBeforeCurrentCycle => {
                "Last debited cycle is after current debited cycle (invalid state)"
            }
            PadError::InvalidTimestamp => "Invalid timestamp value provided",
            PadError::PreAuthorizationPaused => "Pre-Authorization paused",
            PadError::OnlyTokenAccountOwnerCanReceiveClosePreAuthFunds => {
                "Only token account owner can receive funds from closing pre-authorization account"
            }
            PadError::PreAuthorizationTokenAccountMismatch => {
                "Pre-authorization and token account mismatch"
            }
            PadError::PreAuthorizationCloseUnauthorized => {
                "Pre-authorization can only be closed by debit_authority or token_account.owner"
            }
            PadError::SmartDelegateCloseUnauthorized => {
                "Smart delegate can only be closed by token account owner"
            }
            PadError::PausePreAuthorizationUnauthorized => {
                "Only token account owner can pause a pre-authorization"
            }
            PadError::DebitUnauthorized => {
                "Only pre_authorization.debit_authority is authorized to debit funds using \
                 pre-authorizations"
            }
            PadError::InitPreAuthorizationUnauthorized => {
                "Only token account owner can initialize a pre-authorization"
            }
            PadError::InitSmartDelegateUnauthorized => {
                "Only token account owner can initialize a smart delegate"
            }
            PadError::ArithmeticOverflow => "Arithmetic overflow in pre-authorization accounting",
        }
    }
}

#[cfg(not(target_os = "solana"))]
impl core::fmt::Display for PadError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg: &'static str = (*self).into();
        write!(f, "{} ({}): {}", self.name(), self.code(), msg)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PadError {}

pub type PadResult<T = ()> = Result<T, PadError>;
