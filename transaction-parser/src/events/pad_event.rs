//! Defines an enum for all pre-authorized debit events that facilitates unpacking them from the
//! raw `Program data:` payloads in a transaction's logs.

use pad_interface::{
    events::{
        DebitEvent,
        OneTimePreAuthorizationClosed,
        OneTimePreAuthorizationCreated,
        PadEventData,
        PadEventTag,
        PreAuthorizationPaused,
        PreAuthorizationUnpaused,
        RecurringPreAuthorizationClosed,
        RecurringPreAuthorizationCreated,
        SmartDelegateInitialized,
    },
    pack::UnpackError,
};
use solana_address::Address;

use crate::client_rpc::{
    parse_program_invocations,
    ProgramInvocation,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::VariantNames)]
pub enum PadEvent {
    SmartDelegateInitialized(SmartDelegateInitialized),
    OneTimePreAuthorizationCreated(OneTimePreAuthorizationCreated),
    RecurringPreAuthorizationCreated(RecurringPreAuthorizationCreated),
    OneTimePreAuthorizationClosed(OneTimePreAuthorizationClosed),
    RecurringPreAuthorizationClosed(RecurringPreAuthorizationClosed),
    Debit(DebitEvent),
    PreAuthorizationPaused(PreAuthorizationPaused),
    PreAuthorizationUnpaused(PreAuthorizationUnpaused),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventError {
    DataTooShort,
    InvalidDiscriminator,
    UnpackError(PadEventTag, UnpackError),
}

impl core::fmt::Display for EventError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::DataTooShort => f.write_str("Event data is shorter than a discriminator"),
            Self::InvalidDiscriminator => f.write_str("Unknown event discriminator"),
            Self::UnpackError(tag, e) => write!(f, "Failed to unpack {}: {e}", tag.name()),
        }
    }
}

impl std::error::Error for EventError {}

impl PadEvent {
    pub fn tag(&self) -> PadEventTag {
        match self {
            Self::SmartDelegateInitialized(_) => PadEventTag::SmartDelegateInitialized,
            Self::OneTimePreAuthorizationCreated(_) => PadEventTag::OneTimePreAuthorizationCreated,
            Self::RecurringPreAuthorizationCreated(_) => {
                PadEventTag::RecurringPreAuthorizationCreated
            }
            Self::OneTimePreAuthorizationClosed(_) => PadEventTag::OneTimePreAuthorizationClosed,
            Self::RecurringPreAuthorizationClosed(_) => PadEventTag::RecurringPreAuthorizationClosed,
            Self::Debit(_) => PadEventTag::Debit,
            Self::PreAuthorizationPaused(_) => PadEventTag::PreAuthorizationPaused,
            Self::PreAuthorizationUnpaused(_) => PadEventTag::PreAuthorizationUnpaused,
        }
    }

    /// The pre-authorization the event refers to, if any.
    pub fn pre_authorization(&self) -> Option<Address> {
        match self {
            Self::SmartDelegateInitialized(_) => None,
            Self::OneTimePreAuthorizationCreated(e) => Some(e.data.pre_authorization),
            Self::RecurringPreAuthorizationCreated(e) => Some(e.data.pre_authorization),
            Self::OneTimePreAuthorizationClosed(e) => Some(e.data.pre_authorization),
            Self::RecurringPreAuthorizationClosed(e) => Some(e.data.pre_authorization),
            Self::Debit(e) => Some(e.pre_authorization),
            Self::PreAuthorizationPaused(e) => Some(e.data.pre_authorization),
            Self::PreAuthorizationUnpaused(e) => Some(e.data.pre_authorization),
        }
    }

    /// Unpacks an event from its full log data, discriminator included.
    pub fn unpack(data: &[u8]) -> Result<PadEvent, EventError> {
        let Some(discriminator) = data.first_chunk::<8>() else {
            return Err(EventError::DataTooShort);
        };
        let tag =
            PadEventTag::from_discriminator(discriminator).ok_or(EventError::InvalidDiscriminator)?;
        let err = |e| EventError::UnpackError(tag, e);

        match tag {
            PadEventTag::SmartDelegateInitialized => SmartDelegateInitialized::unpack(data)
                .map(Self::SmartDelegateInitialized)
                .map_err(err),
            PadEventTag::OneTimePreAuthorizationCreated => {
                OneTimePreAuthorizationCreated::unpack(data)
                    .map(Self::OneTimePreAuthorizationCreated)
                    .map_err(err)
            }
            PadEventTag::RecurringPreAuthorizationCreated => {
                RecurringPreAuthorizationCreated::unpack(data)
                    .map(Self::RecurringPreAuthorizationCreated)
                    .map_err(err)
            }
            PadEventTag::OneTimePreAuthorizationClosed => OneTimePreAuthorizationClosed::unpack(data)
                .map(Self::OneTimePreAuthorizationClosed)
                .map_err(err),
            PadEventTag::RecurringPreAuthorizationClosed => {
                RecurringPreAuthorizationClosed::unpack(data)
                    .map(Self::RecurringPreAuthorizationClosed)
                    .map_err(err)
            }
            PadEventTag::Debit => DebitEvent::unpack(data).map(Self::Debit).map_err(err),
            PadEventTag::PreAuthorizationPaused => PreAuthorizationPaused::unpack(data)
                .map(Self::PreAuthorizationPaused)
                .map_err(err),
            PadEventTag::PreAuthorizationUnpaused => PreAuthorizationUnpaused::unpack(data)
                .map(Self::PreAuthorizationUnpaused)
                .map_err(err),
        }
    }
}

/// Decodes the events in `invocations` that were emitted directly by `program_id`.
///
/// Payloads with an unknown discriminator are skipped. A known discriminator followed by a
/// malformed payload is an error.
pub fn events_from_invocations(
    invocations: &[ProgramInvocation],
    program_id: &Address,
) -> Result<Vec<PadEvent>, EventError> {
    let mut res = vec![];
    for data in invocations
        .iter()
        .filter(|invocation| &invocation.program_id == program_id)
        .flat_map(|invocation| invocation.data.iter())
    {
        match PadEvent::unpack(data) {
            Ok(event) => res.push(event),
            Err(EventError::DataTooShort | EventError::InvalidDiscriminator) => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(res)
}

/// Parses `log_messages` and decodes every event emitted directly by `program_id`.
pub fn parse_pad_events<S: AsRef<str>>(
    log_messages: &[S],
    program_id: &Address,
) -> anyhow::Result<Vec<PadEvent>> {
    let invocations = parse_program_invocations(log_messages)?;
    Ok(events_from_invocations(&invocations, program_id)?)
}
