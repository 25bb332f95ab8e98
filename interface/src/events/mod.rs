//! Event payloads emitted by the program through `sol_log_data`.
//!
//! Every event is logged as a single `Program data:` segment: the 8-byte event discriminator
//! followed by the borsh-encoded fields. The program only ever packs events, so unpacking is only
//! compiled for the `client` feature.

#[cfg(test)]
mod tests;

use pinocchio::Address;

#[cfg(any(test, feature = "client"))]
use crate::pack::{
    ByteReader,
    UnpackError,
};
use crate::{
    instructions::InitPreAuthorizationParams,
    pack::ByteWriter,
    state::{
        ADDRESS_SIZE,
        DISCRIMINATOR_SIZE,
        U64_SIZE,
        U8_SIZE,
    },
};

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(any(test, feature = "client"), derive(strum_macros::EnumIter))]
#[cfg_attr(feature = "client", derive(strum_macros::Display))]
pub enum PadEventTag {
    SmartDelegateInitialized,
    OneTimePreAuthorizationCreated,
    RecurringPreAuthorizationCreated,
    OneTimePreAuthorizationClosed,
    RecurringPreAuthorizationClosed,
    Debit,
    PreAuthorizationPaused,
    PreAuthorizationUnpaused,
}

impl PadEventTag {
    pub const fn discriminator(self) -> [u8; 8] {
        match self {
            Self::SmartDelegateInitialized => [136, 72, 57, 213, 203, 214, 232, 114],
            Self::OneTimePreAuthorizationCreated => [83, 226, 207, 27, 96, 101, 142, 162],
            Self::RecurringPreAuthorizationCreated => [131, 243, 208, 39, 49, 184, 179, 195],
            Self::OneTimePreAuthorizationClosed => [168, 192, 106, 27, 114, 240, 149, 162],
            Self::RecurringPreAuthorizationClosed => [215, 162, 236, 18, 248, 148, 84, 47],
            Self::Debit => [2, 198, 88, 210, 93, 229, 139, 189],
            Self::PreAuthorizationPaused => [46, 188, 211, 88, 247, 195, 188, 147],
            Self::PreAuthorizationUnpaused => [8, 81, 96, 87, 92, 44, 191, 189],
        }
    }

    pub fn from_discriminator(discriminator: &[u8; 8]) -> Option<Self> {
        match *discriminator {
            [136, 72, 57, 213, 203, 214, 232, 114] => Some(Self::SmartDelegateInitialized),
            [83, 226, 207, 27, 96, 101, 142, 162] => Some(Self::OneTimePreAuthorizationCreated),
            [131, 243, 208, 39, 49, 184, 179, 195] => Some(Self::RecurringPreAuthorizationCreated),
            [168, 192, 106, 27, 114, 240, 149, 162] => Some(Self::OneTimePreAuthorizationClosed),
            [215, 162, 236, 18, 248, 148, 84, 47] => Some(Self::RecurringPreAuthorizationClosed),
            [2, 198, 88, 210, 93, 229, 139, 189] => Some(Self::Debit),
            [46, 188, 211, 88, 247, 195, 188, 147] => Some(Self::PreAuthorizationPaused),
            [8, 81, 96, 87, 92, 44, 191, 189] => Some(Self::PreAuthorizationUnpaused),
            _ => None,
        }
    }

    /// The name the event is registered under, e.g. `"DebitEvent"`.
    pub const fn name(self) -> &'static str {
        match self {
            Self::SmartDelegateInitialized => "SmartDelegateInitialized",
            Self::OneTimePreAuthorizationCreated => "OneTimePreAuthorizationCreated",
            Self::RecurringPreAuthorizationCreated => "RecurringPreAuthorizationCreated",
            Self::OneTimePreAuthorizationClosed => "OneTimePreAuthorizationClosed",
            Self::RecurringPreAuthorizationClosed => "RecurringPreAuthorizationClosed",
            Self::Debit => "DebitEvent",
            Self::PreAuthorizationPaused => "PreAuthorizationPaused",
            Self::PreAuthorizationUnpaused => "PreAuthorizationUnpaused",
        }
    }
}

/// The length of the largest event with its discriminator, a [`DebitEvent`].
pub const MAX_EVENT_LEN: usize = DISCRIMINATOR_SIZE + DebitEvent::LEN;

pub trait PadEventData: Sized {
    const TAG: PadEventTag;

    fn pack_fields(&self, writer: &mut ByteWriter);

    #[cfg(any(test, feature = "client"))]
    fn unpack_fields(reader: &mut ByteReader) -> Result<Self, UnpackError>;

    /// Packs the discriminator and fields into `buf` and returns the packed bytes.
    fn pack<'b>(&self, buf: &'b mut [u8; MAX_EVENT_LEN]) -> &'b [u8] {
        let len = {
            let mut writer = ByteWriter::new(buf);
            writer.write(&Self::TAG.discriminator());
            self.pack_fields(&mut writer);
            writer.position()
        };
        &buf[..len]
    }

    /// Unpacks an event from its full log data, discriminator included.
    #[cfg(any(test, feature = "client"))]
    fn unpack(data: &[u8]) -> Result<Self, UnpackError> {
        let mut reader = ByteReader::new(data);
        reader.expect_discriminator(&Self::TAG.discriminator())?;
        Self::unpack_fields(&mut reader)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SmartDelegateInitialized {
    pub payer: Address,
    pub smart_delegate: Address,
}

impl PadEventData for SmartDelegateInitialized {
    const TAG: PadEventTag = PadEventTag::SmartDelegateInitialized;

    fn pack_fields(&self, writer: &mut ByteWriter) {
        writer.write_address(&self.payer);
        writer.write_address(&self.smart_delegate);
    }

    #[cfg(any(test, feature = "client"))]
    fn unpack_fields(reader: &mut ByteReader) -> Result<Self, UnpackError> {
        Ok(Self {
            payer: reader.read_address()?,
            smart_delegate: reader.read_address()?,
        })
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PreAuthorizationCreatedEventData {
    pub debit_authority: Address,
    pub owner: Address,
    pub payer: Address,
    pub token_account: Address,
    pub pre_authorization: Address,
    pub init_params: InitPreAuthorizationParams,
}

impl PreAuthorizationCreatedEventData {
    fn pack(&self, writer: &mut ByteWriter) {
        writer.write_address(&self.debit_authority);
        writer.write_address(&self.owner);
        writer.write_address(&self.payer);
        writer.write_address(&self.token_account);
        writer.write_address(&self.pre_authorization);
        self.init_params.pack(writer);
    }

    #[cfg(any(test, feature = "client"))]
    fn unpack(reader: &mut ByteReader) -> Result<Self, UnpackError> {
        Ok(Self {
            debit_authority: reader.read_address()?,
            owner: reader.read_address()?,
            payer: reader.read_address()?,
            token_account: reader.read_address()?,
            pre_authorization: reader.read_address()?,
            init_params: InitPreAuthorizationParams::unpack(reader)?,
        })
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PreAuthorizationClosedEventData {
    pub debit_authority: Address,
    pub closing_authority: Address,
    pub token_account_owner: Address,
    pub receiver: Address,
    pub token_account: Address,
    pub pre_authorization: Address,
}

impl PreAuthorizationClosedEventData {
    fn pack(&self, writer: &mut ByteWriter) {
        writer.write_address(&self.debit_authority);
        writer.write_address(&self.closing_authority);
        writer.write_address(&self.token_account_owner);
        writer.write_address(&self.receiver);
        writer.write_address(&self.token_account);
        writer.write_address(&self.pre_authorization);
    }

    #[cfg(any(test, feature = "client"))]
    fn unpack(reader: &mut ByteReader) -> Result<Self, UnpackError> {
        Ok(Self {
            debit_authority: reader.read_address()?,
            closing_authority: reader.read_address()?,
            token_account_owner: reader.read_address()?,
            receiver: reader.read_address()?,
            token_account: reader.read_address()?,
            pre_authorization: reader.read_address()?,
        })
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PausePreAuthorizationEventData {
    pub owner: Address,
    pub token_account: Address,
    pub pre_authorization: Address,
    pub new_paused_value: bool,
}

impl PausePreAuthorizationEventData {
    fn pack(&self, writer: &mut ByteWriter) {
        writer.write_address(&self.owner);
        writer.write_address(&self.token_account);
        writer.write_address(&self.pre_authorization);
        writer.write_bool(self.new_paused_value);
    }

    #[cfg(any(test, feature = "client"))]
    fn unpack(reader: &mut ByteReader) -> Result<Self, UnpackError> {
        Ok(Self {
            owner: reader.read_address()?,
            token_account: reader.read_address()?,
            pre_authorization: reader.read_address()?,
            new_paused_value: reader.read_bool()?,
        })
    }
}

/// Declares an event whose only field is a shared `data` payload.
macro_rules! data_event {
    ($(#[$meta:meta])* $name:ident, $data:ty, $tag:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Eq, PartialEq)]
        pub struct $name {
            pub data: $data,
        }

        impl PadEventData for $name {
            const TAG: PadEventTag = $tag;

            fn pack_fields(&self, writer: &mut ByteWriter) {
                self.data.pack(writer);
            }

            #[cfg(any(test, feature = "client"))]
            fn unpack_fields(reader: &mut ByteReader) -> Result<Self, UnpackError> {
                Ok(Self {
                    data: <$data>::unpack(reader)?,
                })
            }
        }
    };
}

data_event!(
    OneTimePreAuthorizationCreated,
    PreAuthorizationCreatedEventData,
    PadEventTag::OneTimePreAuthorizationCreated
);
data_event!(
    RecurringPreAuthorizationCreated,
    PreAuthorizationCreatedEventData,
    PadEventTag::RecurringPreAuthorizationCreated
);
data_event!(
    OneTimePreAuthorizationClosed,
    PreAuthorizationClosedEventData,
    PadEventTag::OneTimePreAuthorizationClosed
);
data_event!(
    RecurringPreAuthorizationClosed,
    PreAuthorizationClosedEventData,
    PadEventTag::RecurringPreAuthorizationClosed
);
data_event!(
    PreAuthorizationPaused,
    PausePreAuthorizationEventData,
    PadEventTag::PreAuthorizationPaused
);
data_event!(
    PreAuthorizationUnpaused,
    PausePreAuthorizationEventData,
    PadEventTag::PreAuthorizationUnpaused
);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DebitEventVariant {
    OneTime { debit_amount: u64 },
    /// `cycle` is the 1-indexed cycle the debit was recorded in.
    Recurring { debit_amount: u64, cycle: u64 },
}

impl DebitEventVariant {
    pub const MAX_LEN: usize = U8_SIZE + 2 * U64_SIZE;

    pub fn debit_amount(&self) -> u64 {
        match *self {
            Self::OneTime { debit_amount } | Self::Recurring { debit_amount, .. } => debit_amount,
        }
    }

    fn pack(&self, writer: &mut ByteWriter) {
        match *self {
            Self::OneTime { debit_amount } => {
                writer.write_u8(0);
                writer.write_u64(debit_amount);
            }
            Self::Recurring {
                debit_amount,
                cycle,
            } => {
                writer.write_u8(1);
                writer.write_u64(debit_amount);
                writer.write_u64(cycle);
            }
        }
    }

    #[cfg(any(test, feature = "client"))]
    fn unpack(reader: &mut ByteReader) -> Result<Self, UnpackError> {
        match reader.read_u8()? {
            0 => Ok(Self::OneTime {
                debit_amount: reader.read_u64()?,
            }),
            1 => Ok(Self::Recurring {
                debit_amount: reader.read_u64()?,
                cycle: reader.read_u64()?,
            }),
            tag => Err(UnpackError::InvalidVariantTag(tag)),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DebitEvent {
    pub pre_authorization: Address,
    pub debit_authority: Address,
    pub smart_delegate: Address,
    pub mint: Address,
    pub token_program: Address,
    pub source_token_account_owner: Address,
    pub destination_token_account_owner: Address,
    pub source_token_account: Address,
    pub destination_token_account: Address,
    pub debit_variant: DebitEventVariant,
}

impl DebitEvent {
    pub const LEN: usize = 9 * ADDRESS_SIZE + DebitEventVariant::MAX_LEN;
}

impl PadEventData for DebitEvent {
    const TAG: PadEventTag = PadEventTag::Debit;

    fn pack_fields(&self, writer: &mut ByteWriter) {
        writer.write_address(&self.pre_authorization);
        writer.write_address(&self.debit_authority);
        writer.write_address(&self.smart_delegate);
        writer.write_address(&self.mint);
        writer.write_address(&self.token_program);
        writer.write_address(&self.source_token_account_owner);
        writer.write_address(&self.destination_token_account_owner);
        writer.write_address(&self.source_token_account);
        writer.write_address(&self.destination_token_account);
        self.debit_variant.pack(writer);
    }

    #[cfg(any(test, feature = "client"))]
    fn unpack_fields(reader: &mut ByteReader) -> Result<Self, UnpackError> {
        Ok(Self {
            pre_authorization: reader.read_address()?,
            debit_authority: reader.read_address()?,
            smart_delegate: reader.read_address()?,
            mint: reader.read_address()?,
            token_program: reader.read_address()?,
            source_token_account_owner: reader.read_address()?,
            destination_token_account_owner: reader.read_address()?,
            source_token_account: reader.read_address()?,
            destination_token_account: reader.read_address()?,
            debit_variant: DebitEventVariant::unpack(reader)?,
        })
    }
}

static_assertions::const_assert!(
    DISCRIMINATOR_SIZE + 5 * ADDRESS_SIZE + InitPreAuthorizationParams::MAX_LEN <= MAX_EVENT_LEN
);
