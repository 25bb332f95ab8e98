use pinocchio::{
    error::ProgramError,
    Address,
};

use crate::{
    pack::{
        ByteReader,
        ByteWriter,
        UnpackError,
    },
    state::{
        ADDRESS_SIZE,
        DISCRIMINATOR_SIZE,
        U64_SIZE,
        U8_SIZE,
    },
};

/// An owner-signed authorization letting `debit_authority` pull tokens out of `token_account`
/// through the smart delegate, either once or on a recurring schedule.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PreAuthorization {
    pub bump: u8,
    pub paused: bool,
    pub token_account: Address,
    pub variant: PreAuthorizationVariant,
    pub debit_authority: Address,
    pub activation_unix_timestamp: i64,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PreAuthorizationVariant {
    OneTime {
        amount_authorized: u64,
        expiry_unix_timestamp: i64,
        amount_debited: u64,
    },
    Recurring {
        repeat_frequency_seconds: u64,
        recurring_amount_authorized: u64,
        amount_debited_last_cycle: u64,
        amount_debited_total: u64,
        /// Cycles are 1-indexed.
        last_debited_cycle: u64,
        /// `None` means the pre-authorization recurs indefinitely.
        num_cycles: Option<u64>,
        /// Whether unused allowance is forfeited at the end of each cycle.
        reset_every_cycle: bool,
    },
}

pub const ONE_TIME_VARIANT_TAG: u8 = 0;
pub const RECURRING_VARIANT_TAG: u8 = 1;

impl PreAuthorizationVariant {
    /// The encoded length of the largest variant: a recurring one with `num_cycles` set.
    pub const MAX_LEN: usize = U8_SIZE + 6 * U64_SIZE + U8_SIZE + U8_SIZE;

    #[inline(always)]
    pub fn tag(&self) -> u8 {
        match self {
            Self::OneTime { .. } => ONE_TIME_VARIANT_TAG,
            Self::Recurring { .. } => RECURRING_VARIANT_TAG,
        }
    }

    pub fn pack(&self, writer: &mut ByteWriter) {
        writer.write_u8(self.tag());
        match *self {
            Self::OneTime {
                amount_authorized,
                expiry_unix_timestamp,
                amount_debited,
            } => {
                writer.write_u64(amount_authorized);
                writer.write_i64(expiry_unix_timestamp);
                writer.write_u64(amount_debited);
            }
            Self::Recurring {
                repeat_frequency_seconds,
                recurring_amount_authorized,
                amount_debited_last_cycle,
                amount_debited_total,
                last_debited_cycle,
                num_cycles,
                reset_every_cycle,
            } => {
                writer.write_u64(repeat_frequency_seconds);
                writer.write_u64(recurring_amount_authorized);
                writer.write_u64(amount_debited_last_cycle);
                writer.write_u64(amount_debited_total);
                writer.write_u64(last_debited_cycle);
                writer.write_option_u64(num_cycles);
                writer.write_bool(reset_every_cycle);
            }
        }
    }

    pub fn unpack(reader: &mut ByteReader) -> Result<Self, UnpackError> {
        match reader.read_u8()? {
            ONE_TIME_VARIANT_TAG => Ok(Self::OneTime {
                amount_authorized: reader.read_u64()?,
                expiry_unix_timestamp: reader.read_i64()?,
                amount_debited: reader.read_u64()?,
            }),
            RECURRING_VARIANT_TAG => Ok(Self::Recurring {
                repeat_frequency_seconds: reader.read_u64()?,
                recurring_amount_authorized: reader.read_u64()?,
                amount_debited_last_cycle: reader.read_u64()?,
                amount_debited_total: reader.read_u64()?,
                last_debited_cycle: reader.read_u64()?,
                num_cycles: reader.read_option_u64()?,
                reset_every_cycle: reader.read_bool()?,
            }),
            tag => Err(UnpackError::InvalidVariantTag(tag)),
        }
    }
}

impl PreAuthorization {
    pub const DISCRIMINATOR: [u8; 8] = [94, 236, 32, 243, 45, 211, 69, 50];

    /// The allocated account size. Only the recurring variant with `num_cycles` set fills all of
    /// it; shorter encodings leave zeroed trailing bytes.
    pub const LEN: usize = DISCRIMINATOR_SIZE
        + U8_SIZE
        + U8_SIZE
        + ADDRESS_SIZE
        + PreAuthorizationVariant::MAX_LEN
        + ADDRESS_SIZE
        + U64_SIZE;

    pub const BUMP_OFFSET: usize = DISCRIMINATOR_SIZE;
    pub const PAUSED_OFFSET: usize = Self::BUMP_OFFSET + U8_SIZE;
    pub const TOKEN_ACCOUNT_OFFSET: usize = Self::PAUSED_OFFSET + U8_SIZE;
    pub const VARIANT_TAG_OFFSET: usize = Self::TOKEN_ACCOUNT_OFFSET + ADDRESS_SIZE;
    /// Offset of the `num_cycles` option tag, only meaningful for recurring pre-authorizations.
    pub const NUM_CYCLES_TAG_OFFSET: usize = Self::VARIANT_TAG_OFFSET + U8_SIZE + 5 * U64_SIZE;

    /// Offsets of `debit_authority`, which moves with the variant's encoded length.
    pub const ONE_TIME_DEBIT_AUTHORITY_OFFSET: usize =
        Self::VARIANT_TAG_OFFSET + U8_SIZE + 3 * U64_SIZE;
    pub const RECURRING_UNBOUNDED_DEBIT_AUTHORITY_OFFSET: usize =
        Self::NUM_CYCLES_TAG_OFFSET + U8_SIZE + U8_SIZE;
    pub const RECURRING_BOUNDED_DEBIT_AUTHORITY_OFFSET: usize =
        Self::NUM_CYCLES_TAG_OFFSET + U8_SIZE + U64_SIZE + U8_SIZE;

    pub fn is_one_time(&self) -> bool {
        matches!(self.variant, PreAuthorizationVariant::OneTime { .. })
    }

    pub fn is_recurring(&self) -> bool {
        matches!(self.variant, PreAuthorizationVariant::Recurring { .. })
    }

    /// Writes the discriminator and all fields into `dst` and zeroes any trailing bytes.
    pub fn pack_into(&self, dst: &mut [u8]) -> Result<(), ProgramError> {
        if dst.len() < Self::LEN {
            return Err(ProgramError::AccountDataTooSmall);
        }
        let written = {
            let mut writer = ByteWriter::new(dst);
            writer.write(&Self::DISCRIMINATOR);
            writer.write_u8(self.bump);
            writer.write_bool(self.paused);
            writer.write_address(&self.token_account);
            self.variant.pack(&mut writer);
            writer.write_address(&self.debit_authority);
            writer.write_i64(self.activation_unix_timestamp);
            writer.position()
        };
        dst[written..Self::LEN].fill(0);
        Ok(())
    }

    pub fn unpack(data: &[u8]) -> Result<Self, UnpackError> {
        let mut reader = ByteReader::new(data);
        reader.expect_discriminator(&Self::DISCRIMINATOR)?;
        Ok(Self {
            bump: reader.read_u8()?,
            paused: reader.read_bool()?,
            token_account: reader.read_address()?,
            variant: PreAuthorizationVariant::unpack(&mut reader)?,
            debit_authority: reader.read_address()?,
            activation_unix_timestamp: reader.read_i64()?,
        })
    }
}

static_assertions::const_assert_eq!(PreAuthorization::LEN, 133);
static_assertions::const_assert_eq!(PreAuthorization::TOKEN_ACCOUNT_OFFSET, 10);
static_assertions::const_assert_eq!(PreAuthorization::VARIANT_TAG_OFFSET, 42);
static_assertions::const_assert_eq!(PreAuthorization::ONE_TIME_DEBIT_AUTHORITY_OFFSET, 67);
static_assertions::const_assert_eq!(
    PreAuthorization::RECURRING_UNBOUNDED_DEBIT_AUTHORITY_OFFSET,
    85
);
static_assertions::const_assert_eq!(PreAuthorization::RECURRING_BOUNDED_DEBIT_AUTHORITY_OFFSET, 93);
